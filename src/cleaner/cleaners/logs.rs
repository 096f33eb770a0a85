//! Old log file cleaner.

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};
use globset::GlobSet;

use crate::cleaner::base::{remove_items, Cleaner};
use crate::error::Result;
use crate::model::{CleanOutcome, ItemKind, ScanItem};
use crate::scanner::{matching_files, name_matcher, within_roots};

const LOG_PATTERNS: &[&str] = &["*.log*"];

/// Reports log files whose last modification is older than a threshold.
///
/// Each location is either a single file or a directory searched
/// recursively for `*.log*`.
pub struct LogCleaner {
    locations: Vec<PathBuf>,
    max_age: Duration,
    description: String,
}

impl LogCleaner {
    pub fn new(home: &Path, max_age: Duration) -> Self {
        let days = max_age.as_secs() / (24 * 60 * 60);
        Self {
            locations: vec![
                home.join(".local/share/xorg"),
                home.join(".xsession-errors"),
            ],
            max_age,
            description: format!("Log files older than {} days", days),
        }
    }

    pub fn with_extra_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.locations.extend(paths);
        self
    }

    fn is_stale(&self, meta: &Metadata, cutoff: SystemTime) -> Option<SystemTime> {
        let modified = meta.modified().ok()?;
        (modified < cutoff).then_some(modified)
    }

    fn to_item(path: &Path, meta: &Metadata, modified: SystemTime) -> ScanItem {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let date: DateTime<Local> = modified.into();
        ScanItem::from_path(name, path, meta.len(), ItemKind::LogFile)
            .with_details(format!("Modified {}", date.format("%Y-%m-%d")))
    }

    fn probe(&self, location: &Path, matcher: &GlobSet, cutoff: SystemTime) -> Vec<ScanItem> {
        let meta = match location.symlink_metadata() {
            Ok(meta) => meta,
            Err(err) => {
                tracing::debug!("Skipping {}: {}", location.display(), err);
                return Vec::new();
            }
        };

        if meta.is_file() {
            return self
                .is_stale(&meta, cutoff)
                .filter(|_| meta.len() > 0)
                .map(|modified| Self::to_item(location, &meta, modified))
                .into_iter()
                .collect();
        }

        if !meta.is_dir() {
            return Vec::new();
        }

        matching_files(location, matcher)
            .into_iter()
            .filter(|(_, meta)| meta.len() > 0)
            .filter_map(|(path, meta)| {
                let modified = self.is_stale(&meta, cutoff)?;
                Some(Self::to_item(&path, &meta, modified))
            })
            .collect()
    }
}

impl Cleaner for LogCleaner {
    fn id(&self) -> &str {
        "logs"
    }

    fn name(&self) -> &str {
        "Logs"
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn scan(&self) -> Result<Vec<ScanItem>> {
        let matcher = name_matcher(LOG_PATTERNS)?;
        let cutoff = SystemTime::now()
            .checked_sub(self.max_age)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        Ok(self
            .locations
            .iter()
            .flat_map(|location| self.probe(location, &matcher, cutoff))
            .collect())
    }

    fn clean(&self, items: &[ScanItem]) -> Result<CleanOutcome> {
        Ok(remove_items(items, &[ItemKind::LogFile], |p| {
            within_roots(p, &self.locations)
        }))
    }
}
