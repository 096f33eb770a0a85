use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Echo Cleaner - find and remove reclaimable disk space on Linux
#[derive(Parser, Debug)]
#[command(name = "echo-cleaner")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report reclaimable space without removing anything
    Scan(ScanArgs),

    /// Scan, then remove what was found
    Clean(CleanArgs),

    /// List available cleaners
    List,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Cleaners to run (comma-separated ids, default: all enabled)
    #[arg(short, long, value_delimiter = ',', value_name = "IDS")]
    pub only: Option<Vec<String>>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Cleaners to run (comma-separated ids, default: all enabled)
    #[arg(short, long, value_delimiter = ',', value_name = "IDS")]
    pub only: Option<Vec<String>>,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub force: bool,

    /// Show what would be cleaned without doing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}
