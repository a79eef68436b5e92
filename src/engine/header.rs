//! Header index: column name → position, built once per file from its first row.

use std::collections::HashMap;

use crate::error::FileError;
use crate::{ColumnNames, DuplicateHeaders};

/// Column positions for one file. Never shared across files.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderIndex {
    positions: HashMap<String, usize>,
    duplicates: Vec<String>,
}

impl HeaderIndex {
    /// Map each header name to its index. Repeated names resolve per `policy`; under
    /// [`DuplicateHeaders::Reject`] every name is kept (last position) and callers check
    /// [`Self::is_duplicated`].
    pub fn build<I, S>(header: I, policy: DuplicateHeaders) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut duplicates: Vec<String> = Vec::new();
        for (index, name) in header.into_iter().enumerate() {
            let name = name.as_ref();
            match positions.get(name) {
                Some(_) => {
                    if !duplicates.iter().any(|d| d == name) {
                        duplicates.push(name.to_string());
                    }
                    if policy != DuplicateHeaders::FirstWins {
                        positions.insert(name.to_string(), index);
                    }
                }
                None => {
                    positions.insert(name.to_string(), index);
                }
            }
        }
        Self {
            positions,
            duplicates,
        }
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn is_duplicated(&self, name: &str) -> bool {
        self.duplicates.iter().any(|d| d == name)
    }

    /// Names that appeared more than once, in order of first repeat.
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    /// Resolve the required columns to `(store, stock)` positions.
    /// Missing columns fail first (store before stock), then duplicates under `Reject`.
    pub fn resolve(
        &self,
        columns: &ColumnNames,
        policy: DuplicateHeaders,
    ) -> Result<(usize, usize), FileError> {
        let store = self
            .position(&columns.store)
            .ok_or_else(|| FileError::MissingColumn(columns.store.clone()))?;
        let stock = self
            .position(&columns.stock)
            .ok_or_else(|| FileError::MissingColumn(columns.stock.clone()))?;
        if policy == DuplicateHeaders::Reject {
            for name in [&columns.store, &columns.stock] {
                if self.is_duplicated(name) {
                    return Err(FileError::DuplicateColumn(name.clone()));
                }
            }
        }
        Ok((store, stock))
    }
}
