//! Caller-chosen subset of a scan to clean.

use crate::cleaner::registry::CleanerHandle;
use crate::error::{EchoError, Result};
use crate::model::{Category, ScanItem, ScanResult};

/// Items chosen from one category.
#[derive(Debug, Clone)]
pub struct SelectedCategory {
    pub category_id: String,
    pub name: String,
    pub cleaner: CleanerHandle,
    pub items: Vec<ScanItem>,
}

impl SelectedCategory {
    pub fn requested_size(&self) -> u64 {
        self.items.iter().map(|i| i.size).sum()
    }
}

/// Ordered selection keyed by stable category id.
///
/// Every item must come from the category it is filed under; items are
/// matched by path and kind.
#[derive(Debug, Clone, Default)]
pub struct CleanSelection {
    categories: Vec<SelectedCategory>,
}

impl CleanSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select everything a scan found.
    pub fn all_from(result: &ScanResult) -> Self {
        Self {
            categories: result
                .categories
                .iter()
                .map(|c| SelectedCategory {
                    category_id: c.id.clone(),
                    name: c.name.clone(),
                    cleaner: c.cleaner,
                    items: c.items.clone(),
                })
                .collect(),
        }
    }

    /// Select `items` from `category`, replacing any earlier choice for it.
    /// An empty `items` removes the category from the selection.
    ///
    /// The category's own copies of the items are stored, in scan order.
    pub fn insert(&mut self, category: &Category, items: Vec<ScanItem>) -> Result<()> {
        if let Some(foreign) = items.iter().find(|i| !category.contains(i)) {
            return Err(EchoError::ForeignItem {
                category: category.id.clone(),
                path: foreign.path.clone(),
            });
        }

        let items: Vec<ScanItem> = category
            .items
            .iter()
            .filter(|scanned| items.iter().any(|i| i.same_identity(scanned)))
            .cloned()
            .collect();

        self.categories.retain(|c| c.category_id != category.id);
        if !items.is_empty() {
            self.categories.push(SelectedCategory {
                category_id: category.id.clone(),
                name: category.name.clone(),
                cleaner: category.cleaner,
                items,
            });
        }
        Ok(())
    }

    /// Select items of the category `id` in `result` matching `pick`.
    pub fn insert_where(
        &mut self,
        result: &ScanResult,
        id: &str,
        pick: impl Fn(&ScanItem) -> bool,
    ) -> Result<()> {
        let category = result
            .category(id)
            .ok_or_else(|| EchoError::UnknownCategory(id.to_string()))?;
        let items = category.items.iter().filter(|i| pick(i)).cloned().collect();
        self.insert(category, items)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedCategory> {
        self.categories.iter()
    }

    pub fn get(&self, id: &str) -> Option<&SelectedCategory> {
        self.categories.iter().find(|c| c.category_id == id)
    }

    /// Number of selected categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }

    pub fn requested_size(&self) -> u64 {
        self.categories.iter().map(|c| c.requested_size()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemKind;

    fn scan_result() -> ScanResult {
        let mut result = ScanResult::default();
        result.push(Category::new(
            "trash",
            "Trash",
            vec![
                ScanItem::new("a", "/t/a", 10, ItemKind::TrashItem),
                ScanItem::new("b", "/t/b", 20, ItemKind::TrashItem),
            ],
            CleanerHandle::default(),
        ));
        result.push(Category::new(
            "logs",
            "Logs",
            vec![ScanItem::new("x.log", "/l/x.log", 5, ItemKind::LogFile)],
            CleanerHandle::default(),
        ));
        result
    }

    #[test]
    fn test_all_from_keeps_scan_order() {
        let selection = CleanSelection::all_from(&scan_result());

        let ids: Vec<&str> = selection.iter().map(|c| c.category_id.as_str()).collect();
        assert_eq!(ids, vec!["trash", "logs"]);
        assert_eq!(selection.item_count(), 3);
        assert_eq!(selection.requested_size(), 35);
    }

    #[test]
    fn test_insert_subset() {
        let result = scan_result();
        let mut selection = CleanSelection::new();

        selection
            .insert_where(&result, "trash", |i| i.name == "b")
            .unwrap();

        assert_eq!(selection.len(), 1);
        assert_eq!(selection.get("trash").unwrap().requested_size(), 20);
    }

    #[test]
    fn test_insert_rejects_foreign_item() {
        let result = scan_result();
        let mut selection = CleanSelection::new();
        let stray = ScanItem::new("a", "/t/a", 10, ItemKind::LogFile);

        let err = selection
            .insert(result.category("trash").unwrap(), vec![stray])
            .unwrap_err();

        assert!(matches!(err, EchoError::ForeignItem { .. }));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_insert_keeps_scanned_copy() {
        let result = scan_result();
        let mut selection = CleanSelection::new();
        let inflated = ScanItem::new("renamed", "/t/b", 9_000, ItemKind::TrashItem);

        selection
            .insert(result.category("trash").unwrap(), vec![inflated.clone(), inflated])
            .unwrap();

        let selected = selection.get("trash").unwrap();
        assert_eq!(selected.items.len(), 1);
        assert_eq!(selected.items[0].name, "b");
        assert_eq!(selected.requested_size(), 20);
    }

    #[test]
    fn test_insert_empty_clears_category() {
        let result = scan_result();
        let mut selection = CleanSelection::all_from(&result);

        selection.insert(result.category("logs").unwrap(), Vec::new()).unwrap();

        assert_eq!(selection.len(), 1);
        assert!(selection.get("logs").is_none());
    }

    #[test]
    fn test_unknown_category() {
        let mut selection = CleanSelection::new();
        let err = selection
            .insert_where(&scan_result(), "dev", |_| true)
            .unwrap_err();
        assert!(matches!(err, EchoError::UnknownCategory(id) if id == "dev"));
    }
}
