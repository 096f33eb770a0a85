//! List command implementation.

use anyhow::Result;

use crate::cleaner::{CleanerContext, CleanerRegistry};
use crate::config::Config;

/// Print every built-in cleaner, marking those disabled in the config.
pub fn run(config: &Config) -> Result<()> {
    let ctx = CleanerContext::from_config(config)?;
    let registry = CleanerRegistry::with_all(&ctx);
    let enabled: Vec<&str> = config.enabled_kinds().iter().map(|k| k.id()).collect();

    println!("{:<18} {:<18} {}", "ID", "NAME", "DESCRIPTION");
    for (_, cleaner) in registry.iter() {
        let marker = if enabled.contains(&cleaner.id()) {
            ""
        } else {
            " (disabled)"
        };
        println!(
            "{:<18} {:<18} {}{}",
            cleaner.id(),
            cleaner.name(),
            cleaner.description(),
            marker
        );
    }

    Ok(())
}
