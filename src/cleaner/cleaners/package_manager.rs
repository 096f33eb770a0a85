//! System package manager cache cleaner.

use std::path::PathBuf;
use std::sync::Arc;

use crate::cleaner::base::{reject_reason, Cleaner};
use crate::cleaner::executor::CommandRunner;
use crate::error::Result;
use crate::model::{CleanOutcome, ItemKind, ScanItem};
use crate::scanner::{matching_size, name_matcher};

/// One package manager's download cache.
#[derive(Debug, Clone)]
pub struct PackageCache {
    pub name: &'static str,
    pub kind: ItemKind,
    /// Binary whose presence enables the probe.
    pub program: &'static str,
    pub path: PathBuf,
    /// File-name pattern of downloaded package archives.
    pub archive_pattern: &'static str,
    /// The manager's own clean subcommand, run elevated.
    pub clean_command: &'static [&'static str],
}

impl PackageCache {
    /// apt, dnf and pacman at their standard cache locations.
    pub fn defaults() -> Vec<PackageCache> {
        vec![
            PackageCache {
                name: "APT Cache",
                kind: ItemKind::AptCache,
                program: "apt-get",
                path: PathBuf::from("/var/cache/apt/archives"),
                archive_pattern: "*.deb",
                clean_command: &["apt-get", "clean"],
            },
            PackageCache {
                name: "DNF Cache",
                kind: ItemKind::DnfCache,
                program: "dnf",
                path: PathBuf::from("/var/cache/dnf"),
                archive_pattern: "*.rpm",
                clean_command: &["dnf", "clean", "all"],
            },
            PackageCache {
                name: "Pacman Cache",
                kind: ItemKind::PacmanCache,
                program: "pacman",
                path: PathBuf::from("/var/cache/pacman/pkg"),
                archive_pattern: "*.pkg.tar.*",
                clean_command: &["pacman", "-Sc", "--noconfirm"],
            },
        ]
    }
}

/// Reports one item per installed package manager with cached archives.
///
/// Only package archives are counted; lock files and repository metadata
/// are not. Cleaning always goes through the manager itself.
pub struct PackageManagerCleaner {
    runner: Arc<dyn CommandRunner>,
    caches: Vec<PackageCache>,
}

impl PackageManagerCleaner {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            caches: PackageCache::defaults(),
        }
    }

    pub fn with_caches(mut self, caches: Vec<PackageCache>) -> Self {
        self.caches = caches;
        self
    }

    fn cache_for(&self, item: &ScanItem) -> Option<&PackageCache> {
        self.caches
            .iter()
            .find(|c| c.kind == item.kind && c.path == item.fs_path())
    }
}

impl Cleaner for PackageManagerCleaner {
    fn id(&self) -> &str {
        "package-manager"
    }

    fn name(&self) -> &str {
        "Package Manager"
    }

    fn description(&self) -> &str {
        "Package manager cache files"
    }

    fn scan(&self) -> Result<Vec<ScanItem>> {
        let mut items = Vec::new();

        for cache in &self.caches {
            if !self.runner.is_available(cache.program) || !cache.path.is_dir() {
                continue;
            }

            let matcher = name_matcher(&[cache.archive_pattern])?;
            let size = matching_size(&cache.path, &matcher);
            if size > 0 {
                items.push(ScanItem::from_path(cache.name, &cache.path, size, cache.kind).privileged());
            }
        }

        Ok(items)
    }

    fn clean(&self, items: &[ScanItem]) -> Result<CleanOutcome> {
        let kinds: Vec<ItemKind> = self.caches.iter().map(|c| c.kind).collect();
        let mut outcome = CleanOutcome::default();

        for item in items {
            if let Some(reason) = reject_reason(item, &kinds, |_| true) {
                outcome.record_failure(item, reason);
                continue;
            }
            let Some(cache) = self.cache_for(item) else {
                outcome.record_failure(item, "path lies outside the scanned locations");
                continue;
            };

            let output = self.runner.run(cache.clean_command, true);
            if output.success() {
                outcome.record_removed(item);
            } else {
                outcome.record_failure(
                    item,
                    format!("{} failed: {}", cache.clean_command.join(" "), output.error_message()),
                );
            }
        }

        Ok(outcome)
    }
}
