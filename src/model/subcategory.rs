//! Presentation-time grouping of a category's items.

use std::collections::{BTreeMap, HashSet};

use super::item::ScanItem;

/// Items sharing one subcategory label, in scan order.
#[derive(Debug, Clone, PartialEq)]
pub struct SubcategoryGroup<'a> {
    pub name: &'a str,
    pub items: Vec<&'a ScanItem>,
}

impl SubcategoryGroup<'_> {
    pub fn total_size(&self) -> u64 {
        self.items.iter().map(|i| i.size).sum()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

/// Partition items by subcategory, groups sorted by name.
pub fn group_by_subcategory(items: &[ScanItem]) -> Vec<SubcategoryGroup<'_>> {
    let mut groups: BTreeMap<&str, Vec<&ScanItem>> = BTreeMap::new();
    for item in items {
        groups.entry(item.subcategory_name()).or_default().push(item);
    }

    groups
        .into_iter()
        .map(|(name, items)| SubcategoryGroup { name, items })
        .collect()
}

/// True when at least two distinct explicit subcategories are present.
pub fn has_subcategories(items: &[ScanItem]) -> bool {
    let distinct: HashSet<&str> = items
        .iter()
        .filter_map(|i| i.subcategory.as_deref())
        .filter(|s| !s.is_empty())
        .collect();
    distinct.len() > 1
}

/// Items explicitly labelled `name`.
pub fn subcategory_summary<'a>(items: &'a [ScanItem], name: &'a str) -> SubcategoryGroup<'a> {
    SubcategoryGroup {
        name,
        items: items
            .iter()
            .filter(|i| i.subcategory.as_deref() == Some(name))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemKind;

    fn item(path: &str, size: u64, subcategory: Option<&str>) -> ScanItem {
        let item = ScanItem::new(path, path, size, ItemKind::DockerImage);
        match subcategory {
            Some(s) => item.with_subcategory(s),
            None => item,
        }
    }

    #[test]
    fn test_groups_sorted_lexicographically() {
        let items = vec![
            item("3", 1, Some("B")),
            item("1", 1, Some("A")),
            item("2", 1, Some("A")),
        ];
        let groups = group_by_subcategory(&items);

        let names: Vec<&str> = groups.iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_group_keeps_scan_order() {
        let items = vec![
            item("z", 1, Some("A")),
            item("a", 1, Some("A")),
            item("m", 1, Some("A")),
        ];
        let groups = group_by_subcategory(&items);
        let paths: Vec<&str> = groups[0].items.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_missing_subcategory_goes_to_general() {
        let items = vec![item("1", 10, None), item("2", 20, Some("Build Cache"))];
        let groups = group_by_subcategory(&items);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "Build Cache");
        assert_eq!(groups[1].name, "General");
        assert_eq!(groups[1].total_size(), 10);
    }

    #[test]
    fn test_has_subcategories_requires_two_distinct() {
        let same = vec![item("1", 1, Some("A")), item("2", 1, Some("A"))];
        assert!(!has_subcategories(&same));

        let two = vec![item("1", 1, Some("A")), item("2", 1, Some("A")), item("3", 1, Some("B"))];
        assert!(has_subcategories(&two));

        let with_blank = vec![item("1", 1, Some("A")), item("2", 1, Some("")), item("3", 1, None)];
        assert!(!has_subcategories(&with_blank));

        assert!(!has_subcategories(&[]));
    }

    #[test]
    fn test_subcategory_summary() {
        let items = vec![
            item("1", 100, Some("Dangling Images")),
            item("2", 50, Some("Stopped Containers")),
            item("3", 25, Some("Dangling Images")),
        ];
        let summary = subcategory_summary(&items, "Dangling Images");

        assert_eq!(summary.item_count(), 2);
        assert_eq!(summary.total_size(), 125);
    }
}
