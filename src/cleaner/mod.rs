//! Cleaners and the passes that drive them.
//!
//! This module provides:
//! - The `Cleaner` capability and the seven built-in implementations
//! - External command execution with timeout and privilege escalation
//! - An ordered registry with stable handles
//! - Scan and clean orchestration over that registry

mod base;
pub mod cleaners;
mod executor;
mod orchestrator;
mod registry;
mod selection;

pub use base::{Cleaner, CleanerContext, CleanerKind};
pub use executor::{
    find_program, remove_path, CommandOutput, CommandRunner, EscalationPolicy, SystemRunner,
};
pub use orchestrator::{clean_selected, scan_all, CLEAN_COMPLETE, SCAN_COMPLETE};
pub use registry::{CleanerHandle, CleanerRegistry};
pub use selection::{CleanSelection, SelectedCategory};
