use serde::Serialize;

use super::item::ScanItem;
use crate::cleaner::CleanerHandle;

/// Aggregated scan output of one cleaner.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    /// Stable cleaner id, used to key clean selections.
    pub id: String,
    /// Display name.
    pub name: String,
    pub items: Vec<ScanItem>,
    /// Sum of item sizes, fixed at aggregation time.
    pub total_size: u64,
    /// Registry slot of the cleaner that produced this category.
    #[serde(skip)]
    pub cleaner: CleanerHandle,
}

impl Category {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        items: Vec<ScanItem>,
        cleaner: CleanerHandle,
    ) -> Self {
        let total_size = items.iter().map(|i| i.size).sum();
        Self {
            id: id.into(),
            name: name.into(),
            items,
            total_size,
            cleaner,
        }
    }

    /// Whether `item` was produced by this category's scan.
    pub fn contains(&self, item: &ScanItem) -> bool {
        self.items.iter().any(|i| i.same_identity(item))
    }
}

/// Result of a whole scan, categories in cleaner registration order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanResult {
    pub total_size: u64,
    pub categories: Vec<Category>,
}

impl ScanResult {
    pub fn push(&mut self, category: Category) {
        self.total_size += category.total_size;
        self.categories.push(category);
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// An item a cleaner could not remove.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub name: String,
    pub path: String,
    pub reason: String,
}

impl ItemFailure {
    pub fn new(item: &ScanItem, reason: impl Into<String>) -> Self {
        Self {
            name: item.name.clone(),
            path: item.path.clone(),
            reason: reason.into(),
        }
    }
}

/// What a single `Cleaner::clean` call achieved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanOutcome {
    pub freed_bytes: u64,
    pub removed: usize,
    pub failures: Vec<ItemFailure>,
}

impl CleanOutcome {
    pub fn record_removed(&mut self, item: &ScanItem) {
        self.freed_bytes += item.size;
        self.removed += 1;
    }

    pub fn record_failure(&mut self, item: &ScanItem, reason: impl Into<String>) {
        let failure = ItemFailure::new(item, reason);
        tracing::warn!("Could not remove {} ({}): {}", failure.name, failure.path, failure.reason);
        self.failures.push(failure);
    }
}

/// Per-category list of items that were not removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryFailures {
    pub category: String,
    pub items: Vec<ItemFailure>,
}

/// Result of a clean operation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanResult {
    pub total_cleaned: u64,
    /// Items actually removed, not items requested.
    pub items_removed: usize,
    /// Every category that was processed, fully or partially.
    pub categories_cleaned: Vec<String>,
    pub failures: Vec<CategoryFailures>,
}

impl CleanResult {
    pub fn add(&mut self, category: &str, outcome: CleanOutcome) {
        self.total_cleaned += outcome.freed_bytes;
        self.items_removed += outcome.removed;
        self.categories_cleaned.push(category.to_string());
        if !outcome.failures.is_empty() {
            self.failures.push(CategoryFailures {
                category: category.to_string(),
                items: outcome.failures,
            });
        }
    }

    /// Categories with at least one item left behind.
    pub fn failed_categories(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.category.as_str()).collect()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.iter().map(|f| f.items.len()).sum()
    }

    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}
