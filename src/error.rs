//! Per-file error taxonomy.
//!
//! A [`FileError`] is contained in the task of the file that produced it: the file contributes
//! no output rows, the failure is logged by the writer, and the run continues. Run-level
//! failures (output sink, thread panics, strict mode) use `anyhow` instead.

use std::num::ParseFloatError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileError {
    /// File could not be opened or read.
    #[error("could not read file: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed delimited-text structure (unequal row lengths, bad quoting, ...).
    #[error("could not decode rows: {0}")]
    Decode(#[source] csv::Error),

    /// A configured column is absent from the header.
    #[error("column {0} not present in file")]
    MissingColumn(String),

    /// A configured column appears more than once and the policy is `reject`.
    #[error("column {0} appears more than once in header")]
    DuplicateColumn(String),

    /// Stock value is not a single-precision number. `row` is the 0-based data-row index.
    #[error("could not parse record line {row} (value {value:?}): {source}")]
    Parse {
        row: usize,
        value: String,
        #[source]
        source: StockValueError,
    },

    /// Task was dequeued after cancellation; the file was never opened.
    #[error("cancelled before processing")]
    Cancelled,
}

/// Why a stock field failed to parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StockValueError {
    #[error(transparent)]
    Invalid(#[from] ParseFloatError),

    /// Finite literal that overflows `f32`.
    #[error("value out of range")]
    OutOfRange,
}

impl From<csv::Error> for FileError {
    fn from(err: csv::Error) -> Self {
        if !err.is_io_error() {
            return FileError::Decode(err);
        }
        match err.into_kind() {
            csv::ErrorKind::Io(e) => FileError::Io(e),
            kind => FileError::Io(std::io::Error::other(format!("{kind:?}"))),
        }
    }
}
