//! Stock projection from the trailing sales window

use crate::metrics::category::{Category, CATEGORY_COUNT};
use thiserror::Error;

/// Number of most recent periods averaged per category
pub const HISTORY_WINDOW: usize = 5;

/// Extra stock carried on top of average sales (10%)
pub const STOCK_BUFFER: f64 = 1.1;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("only {available} of {required} periods of sales recorded for {category}")]
    InsufficientHistory {
        category: Category,
        available: usize,
        required: usize,
    },

    #[error("projected stock for {category} is out of range")]
    OutOfRange { category: Category },

    #[error("expected history for 6 categories, got {actual}")]
    CategoryCount { actual: usize },
}

/// Most recent sales per category, one row per category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryWindow {
    rows: Vec<Vec<i64>>,
}

impl HistoryWindow {
    /// Keep at most the last `HISTORY_WINDOW` values of each column.
    ///
    /// `columns` are oldest-first, as they appear in the sales table.
    pub fn from_columns(columns: Vec<Vec<i64>>) -> Self {
        let rows = columns
            .into_iter()
            .map(|mut column| {
                let start = column.len().saturating_sub(HISTORY_WINDOW);
                column.drain(..start);
                column
            })
            .collect();

        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<i64>] {
        &self.rows
    }

    /// Shortest category history in the window
    pub fn depth(&self) -> usize {
        self.rows.iter().map(Vec::len).min().unwrap_or(0)
    }

    /// Every category must have `HISTORY_WINDOW` periods of sales
    pub fn require_full(&self) -> Result<(), ProjectionError> {
        if self.rows.len() != CATEGORY_COUNT {
            return Err(ProjectionError::CategoryCount {
                actual: self.rows.len(),
            });
        }

        match Category::all()
            .zip(&self.rows)
            .find(|(_, values)| values.len() < HISTORY_WINDOW)
        {
            Some((category, values)) => Err(ProjectionError::InsufficientHistory {
                category,
                available: values.len(),
                required: HISTORY_WINDOW,
            }),
            None => Ok(()),
        }
    }
}

/// Round to the nearest integer, ties to even. `None` when the result does
/// not fit in an `i64`.
pub fn round_stock(value: f64) -> Option<i64> {
    let rounded = value.round_ties_even();
    if !rounded.is_finite() || rounded >= i64::MAX as f64 || rounded < i64::MIN as f64 {
        return None;
    }
    Some(rounded as i64)
}

/// Recommended stock per category: mean of its history plus 10%, rounded.
///
/// Fails instead of dividing by zero when a category has no history, and
/// instead of saturating when the result does not fit in an `i64`.
pub fn project(history: &[Vec<i64>]) -> Result<Vec<i64>, ProjectionError> {
    if history.len() != CATEGORY_COUNT {
        return Err(ProjectionError::CategoryCount {
            actual: history.len(),
        });
    }

    Category::all()
        .zip(history)
        .map(|(category, values)| {
            if values.is_empty() {
                return Err(ProjectionError::InsufficientHistory {
                    category,
                    available: 0,
                    required: 1,
                });
            }
            let total: i128 = values.iter().map(|&v| i128::from(v)).sum();
            let mean = total as f64 / values.len() as f64;
            round_stock(mean * STOCK_BUFFER).ok_or(ProjectionError::OutOfRange { category })
        })
        .collect()
}
