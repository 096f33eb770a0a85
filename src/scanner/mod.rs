//! Filesystem probing and size helpers shared by the cleaners.

mod size;
mod walker;

pub use size::{format_size, parse_tool_size};
pub use walker::{
    dir_size, escapes_upward, is_skippable, list_entries, matching_files, matching_size, name_matcher,
    within_roots,
};
