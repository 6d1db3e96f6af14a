// Checkpoint filter: turns the raw results table into the per-checkpoint view
// shown in the modal (selected columns, split by gender, completion count)

use std::fmt;

use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::NikromeError;
use crate::results::RunnerDataset;

/// Columns shown for every checkpoint, in display order
pub const RELEVANT_HEADERS: [&str; 5] = ["Nom", "Temps", "Class/Sx", "Class/Cat", "Vit."];
pub const TIME_HEADER: &str = "Temps";
pub const GENDER_HEADER: &str = "Class/Sx";
pub const MALE_MARKER: &str = "(M)";
pub const FEMALE_MARKER: &str = "(F)";
/// Cell value used by the timing system when a runner has not passed a checkpoint
pub const NO_TIME_PLACEHOLDER: &str = "--";

/// Everything the results modal needs for one checkpoint
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ModalViewState {
    pub title: String,
    pub headers: Vec<String>,
    pub men_rows: Vec<Vec<String>>,
    pub women_rows: Vec<Vec<String>>,
}

/// Completion count for a checkpoint
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CheckpointSummary {
    pub checkpoint: String,
    pub runners_with_time: usize,
    pub total_runners: usize,
}

impl CheckpointSummary {
    pub fn title(&self) -> String {
        format!(
            "{} - {}/{}",
            self.checkpoint, self.runners_with_time, self.total_runners
        )
    }
}

/// Column selection and gender partition rules for checkpoint views
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CheckpointFilter {
    pub relevant_headers: Vec<String>,
    /// Relevant column replaced by the checkpoint's own column
    pub time_header: String,
    pub gender_header: String,
    pub male_marker: String,
    pub female_marker: String,
    pub no_time_placeholder: String,
}

impl Default for CheckpointFilter {
    fn default() -> Self {
        Self {
            relevant_headers: RELEVANT_HEADERS.iter().map(|h| h.to_string()).collect(),
            time_header: TIME_HEADER.to_string(),
            gender_header: GENDER_HEADER.to_string(),
            male_marker: MALE_MARKER.to_string(),
            female_marker: FEMALE_MARKER.to_string(),
            no_time_placeholder: NO_TIME_PLACEHOLDER.to_string(),
        }
    }
}

impl CheckpointFilter {
    /// Build the modal view for `checkpoint`.
    ///
    /// Returns `Ok(None)` when the checkpoint is not a column of the dataset,
    /// so callers can treat an unknown checkpoint as a no-op.
    ///
    /// Rows whose gender cell contains neither marker appear in neither group.
    pub fn apply(
        &self,
        dataset: &RunnerDataset,
        checkpoint: &str,
    ) -> Result<Option<ModalViewState>, NikromeError> {
        let Some(checkpoint_index) = dataset.column_index(checkpoint) else {
            debug!("Checkpoint {} not found in results headers", checkpoint);
            return Ok(None);
        };
        check_rows(dataset)?;

        let column_indices = self.resolve_columns(dataset, checkpoint_index)?;
        let gender_index = resolve(dataset, &self.gender_header)?;

        let mut men_rows = Vec::new();
        let mut women_rows = Vec::new();
        let mut dropped = 0;
        for row in &dataset.data {
            let projected: Vec<String> = column_indices.iter().map(|&i| row[i].clone()).collect();
            let gender = &row[gender_index];
            let is_man = gender.contains(&self.male_marker);
            let is_woman = gender.contains(&self.female_marker);

            if is_man {
                men_rows.push(projected.clone());
            }
            if is_woman {
                women_rows.push(projected);
            }
            if !is_man && !is_woman {
                dropped += 1;
            }
        }
        if dropped > 0 {
            debug!(
                "{} runners at {} have no gender marker and are not displayed",
                dropped, checkpoint
            );
        }

        let summary = self.count(dataset, checkpoint, checkpoint_index);
        Ok(Some(ModalViewState {
            title: summary.title(),
            headers: self.relevant_headers.clone(),
            men_rows,
            women_rows,
        }))
    }

    /// Completion count for `checkpoint`, `Ok(None)` if it is not a column
    pub fn summary(
        &self,
        dataset: &RunnerDataset,
        checkpoint: &str,
    ) -> Result<Option<CheckpointSummary>, NikromeError> {
        let Some(checkpoint_index) = dataset.column_index(checkpoint) else {
            return Ok(None);
        };
        check_rows(dataset)?;
        Ok(Some(self.count(dataset, checkpoint, checkpoint_index)))
    }

    /// Whether a checkpoint cell holds a recorded time: anything but an
    /// empty cell or the placeholder, surrounding whitespace ignored
    pub fn has_time(&self, cell: &str) -> bool {
        !cell.is_empty() && cell.trim() != self.no_time_placeholder
    }

    fn count(
        &self,
        dataset: &RunnerDataset,
        checkpoint: &str,
        checkpoint_index: usize,
    ) -> CheckpointSummary {
        let runners_with_time = dataset
            .data
            .iter()
            .filter(|row| self.has_time(&row[checkpoint_index]))
            .count();

        CheckpointSummary {
            checkpoint: checkpoint.to_string(),
            runners_with_time,
            total_runners: dataset.total_runners(),
        }
    }

    fn resolve_columns(
        &self,
        dataset: &RunnerDataset,
        checkpoint_index: usize,
    ) -> Result<Vec<usize>, NikromeError> {
        self.relevant_headers
            .iter()
            .map(|header| {
                if *header == self.time_header {
                    Ok(checkpoint_index)
                } else {
                    resolve(dataset, header)
                }
            })
            .collect()
    }
}

/// Build the modal view for `checkpoint` with the default race columns
pub fn filter_checkpoint(
    dataset: &RunnerDataset,
    checkpoint: &str,
) -> Result<Option<ModalViewState>, NikromeError> {
    CheckpointFilter::default().apply(dataset, checkpoint)
}

fn resolve(dataset: &RunnerDataset, column: &str) -> Result<usize, NikromeError> {
    dataset
        .column_index(column)
        .ok_or_else(|| NikromeError::MissingColumn {
            column: column.to_string(),
        })
}

// Rows are indexed positionally below, a misaligned one must not be read
fn check_rows(dataset: &RunnerDataset) -> Result<(), NikromeError> {
    let expected = dataset.headers.len();
    match dataset.data.iter().position(|row| row.len() != expected) {
        Some(row) => Err(NikromeError::DataIntegrityError {
            row,
            expected,
            found: dataset.data[row].len(),
        }),
        None => Ok(()),
    }
}

impl fmt::Display for ModalViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        for (label, rows) in [("Hommes", &self.men_rows), ("Femmes", &self.women_rows)] {
            writeln!(f)?;
            writeln!(f, "{} ({})", label, rows.len())?;

            let widths: Vec<usize> = (0..self.headers.len())
                .map(|col| {
                    rows.iter()
                        .filter_map(|row| row.get(col))
                        .map(|cell| cell.chars().count())
                        .chain(std::iter::once(self.headers[col].chars().count()))
                        .max()
                        .unwrap_or(0)
                })
                .collect();

            let format_row = |cells: &[String]| {
                cells
                    .iter()
                    .zip(&widths)
                    .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                    .join("  ")
            };
            writeln!(f, "{}", format_row(&self.headers).trim_end())?;
            for row in rows {
                writeln!(f, "{}", format_row(row).trim_end())?;
            }
        }
        Ok(())
    }
}
