use clap::Parser;
use std::path::PathBuf;

use crate::marker::MarkerColor;

#[derive(Parser, Debug, Default)]
#[command(
    name = "knockmap",
    about = "Group canvassing contacts into map markers and report territory coverage",
    version,
    long_about = None
)]
pub struct Args {
    /// Path to the contact store (SQLite)
    #[arg(short, long)]
    pub database: Option<PathBuf>,

    /// Custom temporary file path for database copy
    #[arg(long)]
    pub temp_path: Option<PathBuf>,

    /// Number of most-knocked markers to display
    #[arg(short, long)]
    pub top: Option<usize>,

    /// Number of least-knocked markers to display
    #[arg(long)]
    pub bottom: Option<usize>,

    /// Only list markers of this color
    #[arg(short, long, value_enum)]
    pub color: Option<MarkerColor>,

    /// Group addresses case-insensitively
    #[arg(long)]
    pub fold_case: bool,

    /// Print markers as JSON instead of a report
    #[arg(long)]
    pub json: bool,

    /// Redact street names for privacy
    #[arg(long)]
    pub redact: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Create an empty contact store at --database (or the default path)
    #[arg(long)]
    pub init: bool,
}
