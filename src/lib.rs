//! Stockcount: walk a tree of CSV files in parallel and count per-store product availability
//! into one consolidated report.
//!
//! Each file is summarized independently (store key → in stock / out of stock / total) by a
//! bounded worker pool; a single writer serializes summaries as they complete.

pub mod count;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use count::{count_dir, count_into};
pub use error::{FileError, StockValueError};

/// Result alias used by public stockcount API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;
