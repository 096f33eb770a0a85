//! Data shapes flowing between cleaners, orchestrators and callers.

mod item;
mod result;
mod subcategory;

pub use item::{ItemKind, ScanItem, DEFAULT_SUBCATEGORY};
pub use result::{
    Category, CategoryFailures, CleanOutcome, CleanResult, ItemFailure, ScanResult,
};
pub use subcategory::{group_by_subcategory, has_subcategories, subcategory_summary, SubcategoryGroup};
