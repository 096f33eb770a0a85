//! External command execution and direct removal.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How often a running child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Captured result of an external command. Never an error: spawn failures
/// and timeouts are folded into `exit_code == -1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            exit_code: -1,
            stdout: String::new(),
            stderr: reason.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Short description of a failure for reporting.
    pub fn error_message(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            format!("exit code {}", self.exit_code)
        } else {
            format!("exit code {}: {}", self.exit_code, stderr)
        }
    }
}

/// Which tool grants elevated rights to privileged commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscalationPolicy {
    /// Already root: nothing. Otherwise pkexec, then `sudo -n`, then nothing.
    #[default]
    Auto,
    Pkexec,
    Sudo,
    None,
}

impl FromStr for EscalationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(EscalationPolicy::Auto),
            "pkexec" => Ok(EscalationPolicy::Pkexec),
            "sudo" => Ok(EscalationPolicy::Sudo),
            "none" => Ok(EscalationPolicy::None),
            other => Err(format!(
                "unknown escalation '{}' (expected auto, pkexec, sudo or none)",
                other
            )),
        }
    }
}

/// Seam between cleaners and the processes they launch.
pub trait CommandRunner: Send + Sync {
    /// Whether `program` can be found on `PATH`.
    fn is_available(&self, program: &str) -> bool;

    /// Run `argv`, optionally through the escalation tool.
    fn run(&self, argv: &[&str], elevate: bool) -> CommandOutput;
}

/// Runs real processes with a uniform timeout.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout: Duration,
    escalation: EscalationPolicy,
}

impl SystemRunner {
    pub fn new(timeout: Duration, escalation: EscalationPolicy) -> Self {
        Self {
            timeout,
            escalation,
        }
    }

    fn escalation_prefix(&self) -> Option<&'static [&'static str]> {
        match self.escalation {
            EscalationPolicy::None => None,
            EscalationPolicy::Pkexec => Some(&["pkexec"]),
            EscalationPolicy::Sudo => Some(&["sudo", "-n"]),
            EscalationPolicy::Auto => {
                if nix::unistd::geteuid().is_root() {
                    None
                } else if find_program("pkexec").is_some() {
                    Some(&["pkexec"])
                } else if find_program("sudo").is_some() {
                    Some(&["sudo", "-n"])
                } else {
                    None
                }
            }
        }
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new(Duration::from_secs(60), EscalationPolicy::Auto)
    }
}

impl CommandRunner for SystemRunner {
    fn is_available(&self, program: &str) -> bool {
        find_program(program).is_some()
    }

    fn run(&self, argv: &[&str], elevate: bool) -> CommandOutput {
        let mut full: Vec<String> = Vec::with_capacity(argv.len() + 2);

        if elevate {
            match self.escalation_prefix() {
                Some(prefix) => full.extend(prefix.iter().map(|s| s.to_string())),
                None if self.escalation == EscalationPolicy::Auto
                    && !nix::unistd::geteuid().is_root() =>
                {
                    tracing::warn!(
                        "No privilege escalation tool available for: {}",
                        argv.join(" ")
                    );
                }
                None => {}
            }
        }
        full.extend(argv.iter().map(|s| s.to_string()));

        tracing::debug!("Running: {}", full.join(" "));
        run_with_timeout(&full, self.timeout)
    }
}

fn run_with_timeout(argv: &[String], timeout: Duration) -> CommandOutput {
    let Some((program, args)) = argv.split_first() else {
        return CommandOutput::failed("Empty command");
    };

    let mut child = match Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(err) => {
            tracing::debug!("Failed to start {}: {}", program, err);
            return CommandOutput::failed(err.to_string());
        }
    };

    let stdout_reader = spawn_reader(child.stdout.take());
    let stderr_reader = spawn_reader(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                tracing::warn!("Command timed out after {:?}: {}", timeout, argv.join(" "));
                // Readers are left detached: a surviving grandchild may still
                // hold the pipes open.
                return CommandOutput::failed("Timeout");
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(err) => {
                let _ = child.kill();
                return CommandOutput::failed(err.to_string());
            }
        }
    };

    CommandOutput {
        exit_code: status.code().unwrap_or(-1),
        stdout: join_reader(stdout_reader),
        stderr: join_reader(stderr_reader),
    }
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn join_reader(reader: Option<JoinHandle<String>>) -> String {
    reader.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// Locate an executable the way `which` does.
pub fn find_program(program: &str) -> Option<PathBuf> {
    if program.contains('/') {
        let path = PathBuf::from(program);
        return is_executable(&path).then_some(path);
    }

    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Delete a file, symlink or directory tree. Symlinks are removed, never
/// followed.
pub fn remove_path(path: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::{HashMap, HashSet, VecDeque};
    use std::sync::Mutex;

    pub fn ok(stdout: &str) -> CommandOutput {
        CommandOutput {
            exit_code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    pub fn fail(stderr: &str) -> CommandOutput {
        CommandOutput {
            exit_code: 1,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    /// Runner answering from a script keyed by the joined command line.
    #[derive(Default)]
    pub struct FakeRunner {
        available: HashSet<String>,
        responses: Mutex<HashMap<String, VecDeque<CommandOutput>>>,
        calls: Mutex<Vec<(String, bool)>>,
    }

    impl FakeRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_program(mut self, program: &str) -> Self {
            self.available.insert(program.to_string());
            self
        }

        /// Queue a response; the last queued response repeats.
        pub fn respond(self, command: &str, output: CommandOutput) -> Self {
            self.responses
                .lock()
                .unwrap()
                .entry(command.to_string())
                .or_default()
                .push_back(output);
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
        }

        pub fn elevated_calls(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, e)| *e)
                .map(|(c, _)| c.clone())
                .collect()
        }
    }

    impl CommandRunner for FakeRunner {
        fn is_available(&self, program: &str) -> bool {
            self.available.contains(program)
        }

        fn run(&self, argv: &[&str], elevate: bool) -> CommandOutput {
            let command = argv.join(" ");
            self.calls.lock().unwrap().push((command.clone(), elevate));

            let mut responses = self.responses.lock().unwrap();
            match responses.get_mut(&command) {
                Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
                Some(queue) => queue.front().cloned().unwrap(),
                None => CommandOutput {
                    exit_code: 127,
                    stdout: String::new(),
                    stderr: format!("unscripted command: {}", command),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn runner(timeout: Duration) -> SystemRunner {
        SystemRunner::new(timeout, EscalationPolicy::None)
    }

    #[test]
    fn test_run_captures_stdout_and_exit_code() {
        let out = runner(Duration::from_secs(5)).run(&["sh", "-c", "echo hello; echo oops >&2; exit 3"], false);
        assert_eq!(out.exit_code, 3);
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.stderr.trim(), "oops");
        assert!(!out.success());
    }

    #[test]
    fn test_run_success() {
        let out = runner(Duration::from_secs(5)).run(&["true"], false);
        assert!(out.success());
    }

    #[test]
    fn test_missing_binary_does_not_panic() {
        let out = runner(Duration::from_secs(5)).run(&["definitely-not-a-real-binary-xyz"], false);
        assert_eq!(out.exit_code, -1);
        assert!(!out.stderr.is_empty());
    }

    #[test]
    fn test_timeout_synthesizes_failure() {
        let start = Instant::now();
        let out = runner(Duration::from_millis(200)).run(&["sleep", "5"], false);
        assert_eq!(out.exit_code, -1);
        assert_eq!(out.stderr, "Timeout");
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_empty_command() {
        let out = run_with_timeout(&[], Duration::from_secs(1));
        assert_eq!(out.exit_code, -1);
    }

    #[test]
    fn test_escalation_none_runs_plain() {
        let out = runner(Duration::from_secs(5)).run(&["sh", "-c", "echo plain"], true);
        assert_eq!(out.stdout.trim(), "plain");
    }

    #[test]
    fn test_find_program() {
        assert!(find_program("sh").is_some());
        assert!(find_program("definitely-not-a-real-binary-xyz").is_none());
    }

    #[test]
    fn test_escalation_policy_from_str() {
        assert_eq!("auto".parse::<EscalationPolicy>(), Ok(EscalationPolicy::Auto));
        assert_eq!("PKEXEC".parse::<EscalationPolicy>(), Ok(EscalationPolicy::Pkexec));
        assert_eq!("sudo".parse::<EscalationPolicy>(), Ok(EscalationPolicy::Sudo));
        assert_eq!("none".parse::<EscalationPolicy>(), Ok(EscalationPolicy::None));
        assert!("doas".parse::<EscalationPolicy>().is_err());
    }

    #[test]
    fn test_error_message() {
        assert_eq!(CommandOutput::failed("Timeout").error_message(), "exit code -1: Timeout");
        let bare = CommandOutput {
            exit_code: 2,
            stdout: String::new(),
            stderr: "  ".into(),
        };
        assert_eq!(bare.error_message(), "exit code 2");
    }

    #[test]
    fn test_remove_path_file_and_dir() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("f");
        let dir = tmp.path().join("d");
        fs::write(&file, "x").unwrap();
        fs::create_dir_all(dir.join("inner")).unwrap();
        fs::write(dir.join("inner/g"), "y").unwrap();

        remove_path(&file).unwrap();
        remove_path(&dir).unwrap();

        assert!(!file.exists());
        assert!(!dir.exists());
    }

    #[test]
    fn test_remove_path_does_not_follow_symlinks() {
        let target = TempDir::new().unwrap();
        fs::write(target.path().join("keep"), "x").unwrap();
        let tmp = TempDir::new().unwrap();
        let link = tmp.path().join("link");
        std::os::unix::fs::symlink(target.path(), &link).unwrap();

        remove_path(&link).unwrap();

        assert!(!link.exists());
        assert!(target.path().join("keep").exists());
    }

    #[test]
    fn test_remove_missing_path_errors() {
        let tmp = TempDir::new().unwrap();
        assert!(remove_path(&tmp.path().join("gone")).is_err());
    }
}
