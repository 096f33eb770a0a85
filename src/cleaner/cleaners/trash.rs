//! Desktop trash cleaner.

use std::fs;
use std::path::{Path, PathBuf};

use crate::cleaner::base::{is_child_of, reject_reason, remove_item, Cleaner};
use crate::error::{EchoError, Result};
use crate::model::{CleanOutcome, ItemKind, ScanItem};
use crate::scanner::{dir_size, list_entries};

/// Reports every non-empty entry of the freedesktop trash (and the legacy `~/.Trash`)
/// as one item.
pub struct TrashCleaner {
    roots: Vec<PathBuf>,
}

impl TrashCleaner {
    pub fn new(home: &Path) -> Self {
        Self {
            roots: vec![
                home.join(".local/share/Trash/files"),
                home.join(".Trash"),
            ],
        }
    }

    /// The `.trashinfo` record describing a trashed `files/` entry.
    fn info_file(path: &Path) -> Option<PathBuf> {
        let files_dir = path.parent()?;
        if files_dir.file_name()? != "files" {
            return None;
        }
        let name = path.file_name()?.to_string_lossy();
        Some(
            files_dir
                .parent()?
                .join("info")
                .join(format!("{}.trashinfo", name)),
        )
    }
}

impl Cleaner for TrashCleaner {
    fn id(&self) -> &str {
        "trash"
    }

    fn name(&self) -> &str {
        "Trash"
    }

    fn description(&self) -> &str {
        "Empty trash bin"
    }

    fn scan(&self) -> Result<Vec<ScanItem>> {
        let mut items = Vec::new();

        for root in &self.roots {
            if !root.is_dir() {
                continue;
            }
            for entry in list_entries(root).map_err(|e| EchoError::io(root, e))? {
                let name = entry
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                let size = dir_size(&entry);
                if size == 0 {
                    continue;
                }
                items.push(ScanItem::from_path(name, &entry, size, ItemKind::TrashItem));
            }
        }

        Ok(items)
    }

    fn clean(&self, items: &[ScanItem]) -> Result<CleanOutcome> {
        let mut outcome = CleanOutcome::default();

        for item in items {
            if let Some(reason) =
                reject_reason(item, &[ItemKind::TrashItem], |p| is_child_of(p, &self.roots))
            {
                outcome.record_failure(item, reason);
                continue;
            }

            let before = outcome.removed;
            remove_item(&mut outcome, item);
            if outcome.removed == before {
                continue;
            }

            if let Some(info) = Self::info_file(item.fs_path()) {
                match fs::remove_file(&info) {
                    Ok(()) => {}
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                    Err(err) => {
                        tracing::debug!("Could not remove {}: {}", info.display(), err);
                    }
                }
            }
        }

        Ok(outcome)
    }
}
