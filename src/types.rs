//! Public and internal types for the stockcount API and pipeline.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::FileError;
use crate::utils::config::{PackagePaths, QueueCaps};

/// Key written for a file that has no data rows.
pub const DEGENERATE_KEY: &str = "NAN";

/// Count triple for one aggregation key. `total == in_stock + out_of_stock` once a file is done.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StockCounts {
    pub total: u64,
    pub in_stock: u64,
    pub out_of_stock: u64,
}

impl StockCounts {
    /// Count one row in the bucket given by `class`.
    pub fn record(&mut self, class: StockClass) {
        self.total += 1;
        match class {
            StockClass::InStock => self.in_stock += 1,
            StockClass::OutOfStock => self.out_of_stock += 1,
        }
    }
}

/// Bucket a data row falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StockClass {
    InStock,
    OutOfStock,
}

/// Per-file map of aggregation key → counts. Sorted so one file's rows come out in key order.
pub type Summary = BTreeMap<String, StockCounts>;

/// A file waiting to be processed. Owned by discovery, then by exactly one worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    pub path: PathBuf,
}

impl Task {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Attach the outcome. Consumes the pending task so it cannot be processed twice.
    pub fn complete(self, result: Result<Summary, FileError>) -> CompletedTask {
        CompletedTask {
            path: self.path,
            result,
        }
    }
}

/// A processed file on its way to the writer: summary xor error.
#[derive(Debug)]
pub struct CompletedTask {
    pub path: PathBuf,
    pub result: Result<Summary, FileError>,
}

/// Names of the two columns every input file must carry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnNames {
    /// Aggregation key column.
    pub store: String,
    /// Numeric quantity column.
    pub stock: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            store: "store_id".to_string(),
            stock: "stock".to_string(),
        }
    }
}

/// What to do when a header names the same column twice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateHeaders {
    /// Last occurrence wins (historical behavior). A warning is logged.
    #[default]
    LastWins,
    /// First occurrence wins. A warning is logged.
    FirstWins,
    /// Fail the file with [`FileError::DuplicateColumn`] if a required column is duplicated.
    Reject,
}

/// Everything one File Processor invocation needs. Cloned into each worker.
#[derive(Clone, Debug)]
pub struct CountSettings {
    pub columns: ColumnNames,
    pub delimiter: u8,
    pub duplicate_headers: DuplicateHeaders,
}

impl Default for CountSettings {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            delimiter: b',',
            duplicate_headers: DuplicateHeaders::default(),
        }
    }
}

/// Shared cancellation flag. Tripping it stops discovery; queued tasks drain as cancelled.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Full options (CLI and lib).
#[derive(Clone, Debug)]
pub struct Opts {
    /// Output report path.
    pub output: PathBuf,
    /// Per-file parsing settings.
    pub settings: CountSettings,
    /// Worker count. When None, available parallelism capped by the FD limit.
    pub num_workers: Option<usize>,
    /// Task Queue capacity (discovery → workers).
    pub task_queue_cap: usize,
    /// Result Queue capacity (workers → writer).
    pub result_queue_cap: usize,
    /// Use the parallel walker (jwalk) for discovery.
    pub parallel_walk: bool,
    /// Follow symbolic links.
    pub follow_links: bool,
    /// Exclude patterns (glob syntax, e.g. `archive`, `*.bak`).
    pub exclude: Vec<String>,
    /// Show progress bar and list skipped paths.
    pub verbose: bool,
    /// Strict mode: any traversal error or failed file fails the run.
    pub strict: bool,
    /// Optional cancellation hook.
    pub cancel: Option<CancelToken>,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            output: PathBuf::from(PackagePaths::get().output_filename()),
            settings: CountSettings::default(),
            num_workers: None,
            task_queue_cap: QueueCaps::TASK,
            result_queue_cap: QueueCaps::RESULT,
            parallel_walk: false,
            follow_links: false,
            exclude: Vec::new(),
            verbose: false,
            strict: false,
            cancel: None,
        }
    }
}

/// What happened during a run. Returned by [`count_dir`](crate::count_dir) and [`count_into`](crate::count_into).
#[derive(Debug, Default)]
pub struct RunReport {
    /// Files handed to the Task Queue by discovery.
    pub paths_discovered: usize,
    /// Files whose summary reached the output.
    pub files_written: usize,
    /// Data rows written (one per file/key pair).
    pub rows_written: usize,
    /// Files that failed, with the error message.
    pub failed_files: Vec<(PathBuf, String)>,
    /// Files dequeued after cancellation and never opened.
    pub cancelled_files: usize,
    /// Traversal errors reported by the walker.
    pub skipped_paths: Vec<(PathBuf, String)>,
}
