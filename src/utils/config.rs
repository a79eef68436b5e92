//! Application configuration constants.
//! Tuning and thresholds in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    output_filename: String,
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                output_filename: "count_output.csv".to_string(),
                config_filename: format!(".{pkg}.toml"),
            }
        })
    }

    /// Default report filename, created in the working directory.
    pub fn output_filename(&self) -> &str {
        &self.output_filename
    }

    /// Per-directory config file read by the CLI.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// File names excluded from discovery by default. The output file is excluded separately
    /// by canonical path.
    pub fn default_exclude_patterns(&self) -> Vec<String> {
        vec![self.config_filename().to_string()]
    }
}

// ---- Worker threads ----

/// Worker pool limits.
pub struct WorkerThreadLimits;

impl WorkerThreadLimits {
    /// Never run with fewer workers than this, even under a tight FD limit.
    pub const FLOOR_THREADS: usize = 1;

    /// Available parallelism (from rayon's global pool size).
    pub fn available() -> usize {
        rayon::current_num_threads()
    }
}

// ---- Queues ----

/// Default channel capacities. Inbound stays small because parsing is the slow stage;
/// outbound is larger because serialization drains quickly.
pub struct QueueCaps;

impl QueueCaps {
    /// Task Queue: discovery → workers.
    pub const TASK: usize = 50;
    /// Result Queue: workers → writer.
    pub const RESULT: usize = 200;
}

// ---- Input / output format ----

/// Output header row.
pub const OUTPUT_HEADER: [&str; 5] = [
    "filepath",
    "store_id",
    "inStock",
    "outOfStock",
    "totalProducts",
];

/// UTF-8 byte-order mark stripped from the start of every input file.
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
