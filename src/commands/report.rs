//! Plain-text rendering of scan and clean results.

use crate::model::{group_by_subcategory, has_subcategories, CleanResult, ScanItem, ScanResult};
use crate::scanner::format_size;

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn push_item(output: &mut String, item: &ScanItem, indent: &str) {
    output.push_str(&format!("{}{:>10}  {}", indent, format_size(item.size), item.name));
    if !item.details.is_empty() {
        output.push_str(&format!(" ({})", item.details));
    }
    if item.requires_privilege {
        output.push_str(" [root]");
    }
    output.push('\n');
}

/// Categories with their items, grouped by subcategory where a category
/// has more than one.
pub fn format_scan_report(result: &ScanResult) -> String {
    if result.is_empty() {
        return "Nothing to clean.\n".to_string();
    }

    let mut output = String::new();

    for category in &result.categories {
        output.push_str(&format!(
            "{} [{}]  {}\n",
            category.name,
            category.id,
            format_size(category.total_size)
        ));

        if has_subcategories(&category.items) {
            for group in group_by_subcategory(&category.items) {
                output.push_str(&format!("  {}  {}\n", group.name, format_size(group.total_size())));
                for item in &group.items {
                    push_item(&mut output, item, "    ");
                }
            }
        } else {
            for item in &category.items {
                push_item(&mut output, item, "  ");
            }
        }
    }

    let count = result.item_count();
    output.push_str(&format!(
        "\nTotal: {} in {} item{}\n",
        format_size(result.total_size),
        count,
        plural(count)
    ));
    output
}

/// Totals of a clean, followed by every item left behind.
pub fn format_clean_summary(result: &CleanResult) -> String {
    let mut output = format!(
        "Removed: {} item{}\nFreed:   {}\n",
        result.items_removed,
        plural(result.items_removed),
        format_size(result.total_cleaned)
    );

    if result.is_partial() {
        let failed = result.failed_count();
        output.push_str(&format!(
            "Failed:  {} item{} in {}\n",
            failed,
            plural(failed),
            result.failed_categories().join(", ")
        ));
        for group in &result.failures {
            for item in &group.items {
                output.push_str(&format!("  {}: {} ({})\n", group.category, item.name, item.reason));
            }
        }
    }

    output
}
