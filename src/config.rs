use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cleaner::{CleanerKind, EscalationPolicy};
use crate::error::{ConfigError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cleaners: CleanersConfig,
    pub logs: LogsConfig,
    pub command: CommandConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanersConfig {
    /// Cleaner ids to register, in scan order
    pub enabled: Vec<String>,
    /// Run cleaner scans on a thread pool (results keep registration order)
    pub parallel_scan: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsConfig {
    /// Only logs not modified for this many days are reported
    pub max_age_days: u32,
    /// Additional log files or directories to probe
    pub extra_paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Timeout for every external tool invocation
    pub timeout_secs: u64,
    /// Privilege escalation: auto, pkexec, sudo, none
    pub escalation: String,
}

impl Default for CleanersConfig {
    fn default() -> Self {
        Self {
            enabled: CleanerKind::ALL.iter().map(|k| k.id().to_string()).collect(),
            parallel_scan: false,
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            max_age_days: 30,
            extra_paths: vec![],
        }
    }
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            escalation: "auto".to_string(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// used when present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (Some(p.to_path_buf()), true),
            None => (Self::default_path(), false),
        };

        let config = match path {
            Some(path) if required || path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// `$XDG_CONFIG_HOME/echo-cleaner/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("echo-cleaner").join("config.toml"))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for id in &self.cleaners.enabled {
            id.parse::<CleanerKind>().map_err(ConfigError::Invalid)?;
            if !seen.insert(id.as_str()) {
                return Err(ConfigError::Invalid(format!("cleaner '{}' enabled twice", id)).into());
            }
        }

        if self.logs.max_age_days == 0 {
            return Err(ConfigError::Invalid("logs.max_age_days must be at least 1".into()).into());
        }

        if self.command.timeout_secs == 0 {
            return Err(
                ConfigError::Invalid("command.timeout_secs must be at least 1".into()).into(),
            );
        }

        self.command
            .escalation
            .parse::<EscalationPolicy>()
            .map_err(ConfigError::Invalid)?;

        Ok(())
    }

    /// Enabled cleaners in configured order.
    pub fn enabled_kinds(&self) -> Vec<CleanerKind> {
        self.cleaners
            .enabled
            .iter()
            .filter_map(|id| id.parse().ok())
            .collect()
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command.timeout_secs)
    }

    pub fn log_max_age(&self) -> Duration {
        Duration::from_secs(u64::from(self.logs.max_age_days) * 24 * 60 * 60)
    }

    pub fn escalation_policy(&self) -> EscalationPolicy {
        self.command.escalation.parse().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.logs.max_age_days, 30);
        assert_eq!(config.command.timeout_secs, 60);
    }

    #[test]
    fn config_serializes_to_toml() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[cleaners]"));
        assert!(toml_str.contains("[logs]"));
        assert!(toml_str.contains("[command]"));
    }

    #[test]
    fn default_enables_every_cleaner_in_order() {
        let config = Config::default();
        assert_eq!(config.enabled_kinds(), CleanerKind::ALL.to_vec());
    }

    #[test]
    fn unknown_cleaner_is_rejected() {
        let mut config = Config::default();
        config.cleaners.enabled.push("flatpak".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn duplicate_cleaner_is_rejected() {
        let mut config = Config::default();
        config.cleaners.enabled = vec!["trash".into(), "trash".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = Config::default();
        config.command.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_escalation_is_rejected() {
        let mut config = Config::default();
        config.command.escalation = "doas".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn log_age_converts_to_duration() {
        let config = Config::default();
        assert_eq!(config.log_max_age(), Duration::from_secs(30 * 86_400));
    }
}
