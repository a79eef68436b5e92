//! Row classifier: aggregation key and stock bucket for one data row.

use std::borrow::Cow;
use csv::ByteRecord;

use crate::engine::header::HeaderIndex;
use crate::error::{FileError, StockValueError};
use crate::{CountSettings, StockClass};

/// Classify a raw stock value: `> 0` is in stock, anything else (zero, negative, NaN) is out.
/// Values are read as `f32`; a finite literal that overflows it is rejected.
pub fn classify_stock(value: &str) -> Result<StockClass, StockValueError> {
    let qty: f32 = value.parse()?;
    if qty.is_infinite() && !is_infinity_literal(value) {
        return Err(StockValueError::OutOfRange);
    }
    Ok(if qty > 0.0 {
        StockClass::InStock
    } else {
        StockClass::OutOfStock
    })
}

fn is_infinity_literal(value: &str) -> bool {
    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

/// Column positions resolved for one file. Built once per file, then applied to every row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowClassifier {
    store_idx: usize,
    stock_idx: usize,
}

impl RowClassifier {
    /// Fails with `MissingColumn` (or `DuplicateColumn` under `reject`) before any row is read.
    pub fn new(header: &HeaderIndex, settings: &CountSettings) -> Result<Self, FileError> {
        let (store_idx, stock_idx) =
            header.resolve(&settings.columns, settings.duplicate_headers)?;
        Ok(Self {
            store_idx,
            stock_idx,
        })
    }

    /// Key and bucket for data row `row_index` (0-based among data rows).
    /// Fields are decoded lossily; a missing field reads as empty.
    pub fn classify<'r>(
        &self,
        row: &'r ByteRecord,
        row_index: usize,
    ) -> Result<(Cow<'r, str>, StockClass), FileError> {
        let key = String::from_utf8_lossy(row.get(self.store_idx).unwrap_or_default());
        let raw = String::from_utf8_lossy(row.get(self.stock_idx).unwrap_or_default());
        let class = classify_stock(&raw).map_err(|source| FileError::Parse {
            row: row_index,
            value: raw.into_owned(),
            source,
        })?;
        Ok((key, class))
    }
}
