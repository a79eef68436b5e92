//! Engine module: per-file counting, CLI, progress and path helpers

pub mod arg_parser;
pub mod classify;
pub mod cli;
pub mod header;
pub mod processor;
pub mod progress;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use classify::{RowClassifier, classify_stock};
pub use cli::handle_run;
pub use header::HeaderIndex;
pub use processor::{degenerate_summary, process_file, process_reader, strip_bom};
pub use tools::{glob_match, is_os_hidden_file, should_include_in_walk};
