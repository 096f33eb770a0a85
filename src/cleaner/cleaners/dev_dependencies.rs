//! Language toolchain cache cleaner.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cleaner::base::{reject_reason, remove_item, CacheDir, Cleaner};
use crate::cleaner::executor::CommandRunner;
use crate::error::Result;
use crate::model::{CleanOutcome, ItemKind, ScanItem};

/// A toolchain cache and the tool's own purge command, if it has one.
struct DevCache {
    dir: CacheDir,
    native: Option<&'static [&'static str]>,
}

impl DevCache {
    fn new(name: &'static str, kind: ItemKind, path: PathBuf) -> Self {
        Self {
            dir: CacheDir::new(name, kind, path),
            native: None,
        }
    }

    fn native(mut self, command: &'static [&'static str]) -> Self {
        self.native = Some(command);
        self
    }
}

/// Reports npm, yarn, pip, maven, gradle, go module and cargo registry
/// caches under the home directory.
pub struct DevDependenciesCleaner {
    runner: Arc<dyn CommandRunner>,
    caches: Vec<DevCache>,
}

impl DevDependenciesCleaner {
    pub fn new(home: &Path, runner: Arc<dyn CommandRunner>) -> Self {
        let caches = vec![
            DevCache::new("npm Cache", ItemKind::NpmCache, home.join(".npm"))
                .native(&["npm", "cache", "clean", "--force"]),
            DevCache::new("Yarn Cache", ItemKind::YarnCache, home.join(".yarn/cache"))
                .native(&["yarn", "cache", "clean"]),
            DevCache::new("pip Cache", ItemKind::PipCache, home.join(".cache/pip"))
                .native(&["pip", "cache", "purge"]),
            DevCache::new("Maven Repository", ItemKind::MavenCache, home.join(".m2/repository")),
            DevCache::new("Gradle Caches", ItemKind::GradleCache, home.join(".gradle/caches"))
                .native(&["gradle", "cleanBuildCache"]),
            DevCache::new("Go Modules", ItemKind::GoCache, home.join("go/pkg/mod"))
                .native(&["go", "clean", "-modcache"]),
            // Cargo has no cache purge subcommand.
            DevCache::new("Cargo Registry", ItemKind::CargoCache, home.join(".cargo/registry")),
        ];
        Self { runner, caches }
    }

    fn cache_for(&self, item: &ScanItem) -> Option<&DevCache> {
        self.caches
            .iter()
            .find(|c| c.dir.kind == item.kind && c.dir.path == item.fs_path())
    }

    /// Try the tool's purge command; `false` means fall back to removal.
    fn try_native(&self, cache: &DevCache) -> bool {
        let Some(command) = cache.native else {
            return false;
        };
        if !self.runner.is_available(command[0]) {
            return false;
        }

        let output = self.runner.run(command, false);
        if output.success() {
            return true;
        }
        tracing::warn!(
            "{} failed ({}), removing {} directly",
            command.join(" "),
            output.error_message(),
            cache.dir.path.display()
        );
        false
    }
}

impl Cleaner for DevDependenciesCleaner {
    fn id(&self) -> &str {
        "dev-dependencies"
    }

    fn name(&self) -> &str {
        "Dev Dependencies"
    }

    fn description(&self) -> &str {
        "Language dependency caches (npm, pip, maven, gradle)"
    }

    fn scan(&self) -> Result<Vec<ScanItem>> {
        Ok(self.caches.iter().filter_map(|c| c.dir.probe()).collect())
    }

    fn clean(&self, items: &[ScanItem]) -> Result<CleanOutcome> {
        let kinds: Vec<ItemKind> = self.caches.iter().map(|c| c.dir.kind).collect();
        let mut outcome = CleanOutcome::default();

        for item in items {
            let cache = match self.cache_for(item) {
                Some(cache) => cache,
                None => {
                    let reason = reject_reason(item, &kinds, |_| false)
                        .unwrap_or_else(|| "path lies outside the scanned locations".into());
                    outcome.record_failure(item, reason);
                    continue;
                }
            };

            if self.try_native(cache) {
                outcome.record_removed(item);
            } else {
                remove_item(&mut outcome, item);
            }
        }

        Ok(outcome)
    }
}
