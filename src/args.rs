use std::path::PathBuf;

use clap::Parser;

/// Interactive disk cleanup for macOS
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Display the log in the terminal as a split screen.
    #[arg(long)]
    pub ui_logger: bool,

    /// Measure and report everything without deleting anything.
    #[arg(short, long)]
    pub dry_run: bool,

    /// Minimum size in MB for the large-file scan.
    #[arg(long, default_value_t = 100)]
    pub min_size_mb: u64,

    /// Age threshold in days for the stale-file scan.
    #[arg(long, default_value_t = 90)]
    pub older_than_days: u64,

    /// Additional directories to include in the file scans.
    /// The usual home folders (Documents, Downloads, ...) are always scanned.
    #[arg(short, long, verbatim_doc_comment)]
    pub root: Vec<PathBuf>,
}
