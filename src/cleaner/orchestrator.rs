//! Scan and clean passes over a cleaner registry.
//!
//! Both passes report progress as a share of cleaners (or categories)
//! processed and stop at the first cleaner that returns an error.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::cleaner::registry::CleanerRegistry;
use crate::cleaner::selection::CleanSelection;
use crate::error::{EchoError, Result};
use crate::model::{Category, CleanResult, ScanItem, ScanResult};

pub const SCAN_COMPLETE: &str = "Scan complete!";
pub const CLEAN_COMPLETE: &str = "Cleaning complete!";

/// Percentage of `done` out of `total`, floored.
fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    (done * 100 / total).min(100) as u8
}

/// Run every registered cleaner's scan and aggregate non-empty results
/// into categories, in registration order.
///
/// With `parallel`, cleaners run concurrently on the rayon pool; the
/// resulting category order is the same as a sequential run.
pub fn scan_all(
    registry: &CleanerRegistry,
    parallel: bool,
    progress: impl Fn(u8, &str) + Sync,
) -> Result<ScanResult> {
    let total = registry.len();
    let cleaners: Vec<_> = registry.iter().collect();

    let scanned: Vec<Result<Vec<ScanItem>>> = if parallel {
        let started = AtomicUsize::new(0);
        cleaners
            .par_iter()
            .map(|(_, cleaner)| {
                let idx = started.fetch_add(1, Ordering::SeqCst);
                progress(percent(idx, total), &format!("Scanning {}...", cleaner.name()));
                cleaner.scan()
            })
            .collect()
    } else {
        let mut scanned = Vec::with_capacity(total);
        for (idx, (_, cleaner)) in cleaners.iter().enumerate() {
            progress(percent(idx, total), &format!("Scanning {}...", cleaner.name()));
            let items = cleaner.scan();
            let failed = items.is_err();
            scanned.push(items);
            if failed {
                break;
            }
        }
        scanned
    };

    let mut result = ScanResult::default();
    for ((handle, cleaner), items) in cleaners.iter().zip(scanned) {
        let items = items.map_err(|e| EchoError::Scan {
            cleaner: cleaner.name().to_string(),
            source: Box::new(e),
        })?;

        tracing::debug!("{}: {} item(s)", cleaner.id(), items.len());
        if !items.is_empty() {
            result.push(Category::new(cleaner.id(), cleaner.name(), items, *handle));
        }
    }

    progress(100, SCAN_COMPLETE);
    tracing::info!(
        "Scan found {} item(s) in {} categories",
        result.item_count(),
        result.categories.len()
    );
    Ok(result)
}

/// Clean each selected category with the cleaner that produced it, in
/// selection order.
///
/// Items a cleaner could not remove are reported in the result; an error
/// from a cleaner aborts the whole pass.
pub fn clean_selected(
    registry: &CleanerRegistry,
    selection: &CleanSelection,
    progress: impl Fn(u8, &str),
) -> Result<CleanResult> {
    if selection.is_empty() {
        return Err(EchoError::EmptySelection);
    }

    let total = selection.len();
    let mut result = CleanResult::default();

    for (idx, selected) in selection.iter().enumerate() {
        progress(percent(idx, total), &format!("Cleaning {}...", selected.name));

        let cleaner = registry
            .get(selected.cleaner)
            .ok_or(EchoError::InvalidHandle(selected.cleaner.index()))?;
        if cleaner.id() != selected.category_id {
            return Err(EchoError::UnknownCategory(selected.category_id.clone()));
        }

        let outcome = cleaner.clean(&selected.items).map_err(|e| EchoError::Clean {
            category: selected.name.clone(),
            source: Box::new(e),
        })?;

        tracing::info!(
            "{}: removed {}/{} item(s)",
            selected.name,
            outcome.removed,
            selected.items.len()
        );
        result.add(&selected.name, outcome);
    }

    progress(100, CLEAN_COMPLETE);
    Ok(result)
}
