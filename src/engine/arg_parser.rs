use clap::Parser;
use std::path::PathBuf;

use crate::DuplicateHeaders;

/// Count per-store product availability across a tree of CSV files.
#[derive(Clone, Parser)]
#[command(name = "stockcount")]
#[command(about = "Walk DIR, count in-stock / out-of-stock rows per store in every CSV file, write one report.")]
pub struct Cli {
    /// Directory to scan recursively.
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Name of the stock-quantity column. Default: `stock`.
    #[arg(long)]
    pub stock: Option<String>,

    /// Name of the store-identifier column. Default: `store_id`.
    #[arg(long, alias = "store_id")]
    pub store_id: Option<String>,

    /// Report file. Default: `count_output.csv` in the working directory.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Worker threads. Default: available parallelism (capped by the open-file limit).
    #[arg(long, short = 'w', value_parser = clap::value_parser!(usize))]
    pub workers: Option<usize>,

    /// Capacity of the queue feeding workers.
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub task_queue_cap: Option<usize>,

    /// Capacity of the queue feeding the writer.
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub result_queue_cap: Option<usize>,

    /// Field delimiter (single ASCII character). Default: `,`.
    #[arg(long, short = 'd', value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,

    /// How to resolve a header that names the same column twice.
    #[arg(long, value_enum)]
    pub duplicate_headers: Option<DuplicateHeaders>,

    /// Exclude patterns (glob syntax). Can specify multiple: -e pattern1 pattern2
    #[arg(long, short = 'e', num_args = 1..)]
    pub exclude: Vec<String>,

    /// Follow symbolic links.
    #[arg(long, short = 'f', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub follow_links: Option<bool>,

    /// Walk directories in parallel.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub parallel_walk: Option<bool>,

    /// Strict mode: fail the run if any file fails or any path cannot be walked.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub strict: Option<bool>,

    /// Verbose output (debug logs, progress bar, skipped path list).
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}

/// Accept exactly one ASCII character (`\t` for tab).
pub fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "\\t" | "tab" => Ok(b'\t'),
        _ => match s.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(format!("delimiter must be a single ASCII character, got {:?}", s)),
        },
    }
}
