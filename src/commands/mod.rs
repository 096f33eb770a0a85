//! Subcommand implementations.

pub mod clean;
pub mod list;
pub mod report;
pub mod scan;

use std::sync::mpsc::Receiver;

use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::cleaner::{CleanerContext, CleanerKind, CleanerRegistry};
use crate::config::Config;
use crate::model::{CleanResult, ScanResult};
use crate::service::{CleaningService, ServiceEvent};

/// Exit code for invalid `--only` ids.
pub const EXIT_USAGE: i32 = 2;
/// Exit code when some selected items could not be removed.
pub const EXIT_PARTIAL: i32 = 5;

/// Cleaners named by `--only`, or the configured ones.
pub fn selected_kinds(
    config: &Config,
    only: Option<&[String]>,
) -> std::result::Result<Vec<CleanerKind>, String> {
    match only {
        Some(ids) => ids.iter().map(|id| id.trim().parse()).collect(),
        None => Ok(config.enabled_kinds()),
    }
}

/// Resolve `--only` or exit with a usage error.
pub(crate) fn kinds_or_exit(config: &Config, only: Option<&[String]>) -> Vec<CleanerKind> {
    match selected_kinds(config, only) {
        Ok(kinds) => kinds,
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(EXIT_USAGE);
        }
    }
}

/// A service over the given cleaners in the user's real environment.
pub fn build_service(
    config: &Config,
    kinds: &[CleanerKind],
) -> Result<(CleaningService, Receiver<ServiceEvent>)> {
    let ctx = CleanerContext::from_config(config)?;
    let registry = CleanerRegistry::from_kinds(kinds, &ctx);
    let (service, events) = CleaningService::with_registry(registry);
    Ok((service.with_parallel_scan(config.cleaners.parallel_scan), events))
}

pub(crate) fn progress_bar(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .map(|style| style.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb
}

/// Follow service events until the running scan finishes.
pub fn wait_for_scan(events: &Receiver<ServiceEvent>, pb: &ProgressBar) -> Result<ScanResult> {
    for event in events.iter() {
        match event {
            ServiceEvent::ScanProgress { percent, message } => {
                pb.set_position(u64::from(percent));
                pb.set_message(message);
            }
            ServiceEvent::ScanCompleted(result) => {
                pb.finish_and_clear();
                return Ok(result);
            }
            ServiceEvent::ScanFailed(message) => {
                pb.abandon();
                bail!(message);
            }
            _ => {}
        }
    }
    bail!("Scan worker stopped without reporting a result")
}

/// Follow service events until the running clean finishes.
pub fn wait_for_clean(events: &Receiver<ServiceEvent>, pb: &ProgressBar) -> Result<CleanResult> {
    for event in events.iter() {
        match event {
            ServiceEvent::CleanProgress { percent, message } => {
                pb.set_position(u64::from(percent));
                pb.set_message(message);
            }
            ServiceEvent::CleanCompleted(result) => {
                pb.finish_and_clear();
                return Ok(result);
            }
            ServiceEvent::CleanFailed(message) => {
                pb.abandon();
                bail!(message);
            }
            _ => {}
        }
    }
    bail!("Clean worker stopped without reporting a result")
}
