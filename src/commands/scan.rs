//! Scan command implementation

use anyhow::Result;

use super::report::format_scan_report;
use super::{build_service, kinds_or_exit, progress_bar, wait_for_scan};
use crate::cli::ScanArgs;
use crate::config::Config;

/// Run the scan command
pub fn run(args: ScanArgs, config: &Config, quiet: bool) -> Result<()> {
    let kinds = kinds_or_exit(config, args.only.as_deref());
    let (service, events) = build_service(config, &kinds)?;

    tracing::info!(cleaners = kinds.len(), "Scanning");
    service.start_scan();

    let pb = progress_bar(quiet || args.json);
    let result = wait_for_scan(&events, &pb)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", format_scan_report(&result));
    }

    Ok(())
}
