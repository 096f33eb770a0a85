//! Core trait and shared plumbing for cleaners.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::cleaner::executor::{remove_path, CommandRunner, SystemRunner};
use crate::cleaner::cleaners::{
    DevDependenciesCleaner, DockerCleaner, KubernetesCleaner, LogCleaner, PackageManagerCleaner,
    SystemCacheCleaner, TrashCleaner,
};
use crate::config::Config;
use crate::error::{EchoError, Result};
use crate::model::{CleanOutcome, ItemKind, ScanItem};
use crate::scanner::{dir_size, escapes_upward};

/// Capability to find and remove one category of reclaimable space.
///
/// `scan` is read-only and tolerates missing or unreadable sub-paths.
/// `clean` receives items from this cleaner's own `scan`, keeps going past
/// per-item failures and reports them in the returned outcome. An `Err`
/// from either call means the cleaner itself broke and aborts the whole
/// orchestrated operation.
pub trait Cleaner: Send + Sync {
    /// Stable identifier used to key categories and selections.
    fn id(&self) -> &str;

    /// Human-readable name (e.g., "Dev Dependencies").
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn scan(&self) -> Result<Vec<ScanItem>>;

    fn clean(&self, items: &[ScanItem]) -> Result<CleanOutcome>;
}

/// The fixed set of built-in cleaners, in default registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CleanerKind {
    SystemCache,
    Trash,
    Logs,
    PackageManager,
    Docker,
    DevDependencies,
    Kubernetes,
}

impl CleanerKind {
    pub const ALL: [CleanerKind; 7] = [
        CleanerKind::SystemCache,
        CleanerKind::Trash,
        CleanerKind::Logs,
        CleanerKind::PackageManager,
        CleanerKind::Docker,
        CleanerKind::DevDependencies,
        CleanerKind::Kubernetes,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            CleanerKind::SystemCache => "system-cache",
            CleanerKind::Trash => "trash",
            CleanerKind::Logs => "logs",
            CleanerKind::PackageManager => "package-manager",
            CleanerKind::Docker => "docker",
            CleanerKind::DevDependencies => "dev-dependencies",
            CleanerKind::Kubernetes => "kubernetes",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CleanerKind::SystemCache => "System Cache",
            CleanerKind::Trash => "Trash",
            CleanerKind::Logs => "Logs",
            CleanerKind::PackageManager => "Package Manager",
            CleanerKind::Docker => "Docker",
            CleanerKind::DevDependencies => "Dev Dependencies",
            CleanerKind::Kubernetes => "Kubernetes",
        }
    }

    /// Instantiate the cleaner against the given environment.
    pub fn build(&self, ctx: &CleanerContext) -> Box<dyn Cleaner> {
        match self {
            CleanerKind::SystemCache => Box::new(SystemCacheCleaner::new(ctx.cache_dir.clone())),
            CleanerKind::Trash => Box::new(TrashCleaner::new(&ctx.home)),
            CleanerKind::Logs => Box::new(
                LogCleaner::new(&ctx.home, ctx.log_max_age)
                    .with_extra_paths(ctx.extra_log_paths.clone()),
            ),
            CleanerKind::PackageManager => {
                Box::new(PackageManagerCleaner::new(Arc::clone(&ctx.runner)))
            }
            CleanerKind::Docker => Box::new(DockerCleaner::new(Arc::clone(&ctx.runner))),
            CleanerKind::DevDependencies => Box::new(DevDependenciesCleaner::new(
                &ctx.home,
                Arc::clone(&ctx.runner),
            )),
            CleanerKind::Kubernetes => Box::new(KubernetesCleaner::new(&ctx.home)),
        }
    }
}

impl fmt::Display for CleanerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for CleanerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        CleanerKind::ALL
            .iter()
            .copied()
            .find(|k| k.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let valid: Vec<&str> = CleanerKind::ALL.iter().map(|k| k.id()).collect();
                format!("unknown cleaner '{}' (valid: {})", s, valid.join(", "))
            })
    }
}

/// Environment the built-in cleaners probe.
#[derive(Clone)]
pub struct CleanerContext {
    pub home: PathBuf,
    /// User cache root, normally `~/.cache`.
    pub cache_dir: PathBuf,
    pub runner: Arc<dyn CommandRunner>,
    pub log_max_age: Duration,
    pub extra_log_paths: Vec<PathBuf>,
}

impl CleanerContext {
    pub fn new(home: impl Into<PathBuf>, runner: Arc<dyn CommandRunner>) -> Self {
        let home = home.into();
        Self {
            cache_dir: home.join(".cache"),
            home,
            runner,
            log_max_age: Duration::from_secs(30 * 24 * 60 * 60),
            extra_log_paths: Vec::new(),
        }
    }

    /// Resolve the real user environment.
    pub fn from_config(config: &Config) -> Result<Self> {
        let home = dirs::home_dir().ok_or(EchoError::NoHomeDir)?;
        let runner = Arc::new(SystemRunner::new(
            config.command_timeout(),
            config.escalation_policy(),
        ));

        let mut ctx = Self::new(home, runner);
        if let Some(cache_dir) = dirs::cache_dir() {
            ctx.cache_dir = cache_dir;
        }
        ctx.log_max_age = config.log_max_age();
        ctx.extra_log_paths = config.logs.extra_paths.clone();
        Ok(ctx)
    }
}

/// A well-known cache directory reported as one item when non-empty.
#[derive(Debug, Clone)]
pub(crate) struct CacheDir {
    pub name: &'static str,
    pub kind: ItemKind,
    pub path: PathBuf,
}

impl CacheDir {
    pub fn new(name: &'static str, kind: ItemKind, path: PathBuf) -> Self {
        Self { name, kind, path }
    }

    pub fn probe(&self) -> Option<ScanItem> {
        if !self.path.is_dir() {
            return None;
        }
        let size = dir_size(&self.path);
        (size > 0).then(|| ScanItem::from_path(self.name, &self.path, size, self.kind))
    }
}

/// Why `item` must not be touched by a cleaner owning `kinds`, given the
/// predicate deciding which paths it may delete.
pub(crate) fn reject_reason(
    item: &ScanItem,
    kinds: &[ItemKind],
    allowed: impl Fn(&Path) -> bool,
) -> Option<String> {
    if !kinds.contains(&item.kind) {
        return Some(format!("item kind '{}' not handled by this cleaner", item.kind));
    }
    if !allowed(item.fs_path()) {
        return Some("path lies outside the scanned locations".to_string());
    }
    None
}

/// Whether `path` sits directly inside one of `roots`.
pub(crate) fn is_child_of(path: &Path, roots: &[PathBuf]) -> bool {
    if escapes_upward(path) {
        return false;
    }
    path.parent()
        .map_or(false, |parent| roots.iter().any(|root| root == parent))
}

/// Remove one scanned path and record the result.
pub(crate) fn remove_item(outcome: &mut CleanOutcome, item: &ScanItem) {
    match remove_path(Path::new(&item.path)) {
        Ok(()) => outcome.record_removed(item),
        Err(err) => outcome.record_failure(item, err.to_string()),
    }
}

/// Direct removal of every item the predicate allows.
pub(crate) fn remove_items(
    items: &[ScanItem],
    kinds: &[ItemKind],
    allowed: impl Fn(&Path) -> bool,
) -> CleanOutcome {
    let mut outcome = CleanOutcome::default();
    for item in items {
        match reject_reason(item, kinds, &allowed) {
            Some(reason) => outcome.record_failure(item, reason),
            None => remove_item(&mut outcome, item),
        }
    }
    outcome
}
