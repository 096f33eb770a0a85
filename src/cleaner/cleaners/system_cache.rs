//! User cache directory cleaner.

use std::path::PathBuf;

use rayon::prelude::*;

use crate::cleaner::base::{is_child_of, remove_items, Cleaner};
use crate::error::{EchoError, Result};
use crate::model::{CleanOutcome, ItemKind, ScanItem};
use crate::scanner::{dir_size, list_entries};

/// Reports each first-level directory of the user cache root
/// (`~/.cache`) as one item.
pub struct SystemCacheCleaner {
    root: PathBuf,
}

impl SystemCacheCleaner {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl Cleaner for SystemCacheCleaner {
    fn id(&self) -> &str {
        "system-cache"
    }

    fn name(&self) -> &str {
        "System Cache"
    }

    fn description(&self) -> &str {
        "User cache files (~/.cache)"
    }

    fn scan(&self) -> Result<Vec<ScanItem>> {
        let entries = list_entries(&self.root).map_err(|e| EchoError::io(&self.root, e))?;

        let dirs: Vec<PathBuf> = entries
            .into_iter()
            .filter(|p| p.symlink_metadata().map(|m| m.is_dir()).unwrap_or(false))
            .collect();

        // Sizing runs in parallel; collect keeps name order.
        let sized: Vec<(PathBuf, u64)> = dirs
            .into_par_iter()
            .map(|dir| {
                let size = dir_size(&dir);
                (dir, size)
            })
            .collect();

        Ok(sized
            .into_iter()
            .filter(|(_, size)| *size > 0)
            .map(|(dir, size)| {
                let name = dir
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                ScanItem::from_path(name, &dir, size, ItemKind::Directory)
            })
            .collect())
    }

    fn clean(&self, items: &[ScanItem]) -> Result<CleanOutcome> {
        let roots = [self.root.clone()];
        Ok(remove_items(items, &[ItemKind::Directory], |p| {
            is_child_of(p, &roots)
        }))
    }
}
