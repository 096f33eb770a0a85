//! Clean command implementation.

use std::io::{self, Write};

use anyhow::Result;

use super::report::{format_clean_summary, format_scan_report};
use super::{build_service, kinds_or_exit, progress_bar, wait_for_clean, wait_for_scan, EXIT_PARTIAL};
use crate::cleaner::CleanSelection;
use crate::cli::CleanArgs;
use crate::config::Config;

/// Run the clean command.
pub fn run(args: CleanArgs, config: &Config, quiet: bool) -> Result<()> {
    let kinds = kinds_or_exit(config, args.only.as_deref());
    let (service, events) = build_service(config, &kinds)?;

    service.start_scan();
    let scan = wait_for_scan(&events, &progress_bar(quiet))?;

    if scan.is_empty() {
        println!("Nothing to clean.");
        return Ok(());
    }

    print!("{}", format_scan_report(&scan));

    if args.dry_run {
        println!("\n[DRY RUN] Nothing was removed.");
        return Ok(());
    }

    if !args.force {
        print!("\nProceed with cleanup? [y/N] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    let selection = CleanSelection::all_from(&scan);
    tracing::info!(
        categories = selection.len(),
        items = selection.item_count(),
        "Cleaning"
    );
    service.start_clean(selection);
    let result = wait_for_clean(&events, &progress_bar(quiet))?;

    println!();
    print!("{}", format_clean_summary(&result));

    if result.is_partial() {
        drop(service);
        std::process::exit(EXIT_PARTIAL);
    }

    Ok(())
}
