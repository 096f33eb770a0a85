//! Echo Cleaner - find and remove reclaimable disk space on Linux
//!
//! This crate provides:
//! - Cleaners for caches, trash, logs, package archives, Docker artifacts,
//!   language toolchain caches and local Kubernetes tooling
//! - Scan and clean orchestration with per-item failure reporting
//! - A background service emitting progress events over a channel

pub mod cleaner;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod scanner;
pub mod service;

// Re-export commonly used types
pub use cleaner::{Cleaner, CleanerHandle, CleanerKind, CleanerRegistry, CleanSelection};
pub use config::Config;
pub use error::{EchoError, Result};
pub use model::{Category, CleanResult, ScanItem, ScanResult};
pub use scanner::{format_size, parse_tool_size};
pub use service::{CleaningService, ServiceEvent};
