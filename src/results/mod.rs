// Race results dataset and its loader

pub mod loader;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::NikromeError;

pub use loader::{DatasetSource, load_dataset};

/// Tabular race results: column names plus rows aligned positionally to them.
///
/// Created once from a JSON document (`{"headers": [...], "data": [[...]]}`)
/// and never mutated afterwards.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RunnerDataset {
    pub headers: Vec<String>,
    pub data: Vec<Vec<String>>,
}

impl RunnerDataset {
    pub fn new(headers: Vec<String>, data: Vec<Vec<String>>) -> Self {
        Self { headers, data }
    }

    /// Position of a column by exact name
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    pub fn total_runners(&self) -> usize {
        self.data.len()
    }

    /// Check that headers are unique and every row has one cell per header
    pub fn validate(&self) -> Result<(), NikromeError> {
        let mut seen = HashSet::new();
        for header in &self.headers {
            if !seen.insert(header.as_str()) {
                return Err(NikromeError::DuplicateColumn {
                    column: header.clone(),
                });
            }
        }

        for (row, cells) in self.data.iter().enumerate() {
            if cells.len() != self.headers.len() {
                return Err(NikromeError::DataIntegrityError {
                    row,
                    expected: self.headers.len(),
                    found: cells.len(),
                });
            }
        }

        Ok(())
    }
}
