//! Common spreadsheet types

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of cells as text
pub type Row = Vec<String>;

/// The three worksheets the stall keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Sales,
    Surplus,
    Stock,
}

impl Table {
    /// Worksheet title in the spreadsheet
    pub fn worksheet(self) -> &'static str {
        match self {
            Table::Sales => "sales",
            Table::Surplus => "surplus",
            Table::Stock => "stock",
        }
    }

    pub fn all() -> [Table; 3] {
        [Table::Sales, Table::Surplus, Table::Stock]
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.worksheet())
    }
}

/// Values range as returned by `spreadsheets.values.get`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    pub range: Option<String>,
    pub major_dimension: Option<String>,
    #[serde(default)]
    pub values: Vec<Row>,
}

/// Request body for `spreadsheets.values.append`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendRequest {
    pub major_dimension: &'static str,
    pub values: Vec<Vec<i64>>,
}

impl AppendRequest {
    pub fn single_row(values: &[i64]) -> Self {
        Self {
            major_dimension: "ROWS",
            values: vec![values.to_vec()],
        }
    }
}

/// Response of `spreadsheets.values.append`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendResponse {
    pub spreadsheet_id: Option<String>,
    pub table_range: Option<String>,
    pub updates: Option<UpdatedValues>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedValues {
    pub updated_range: Option<String>,
    pub updated_rows: Option<u32>,
    pub updated_cells: Option<u32>,
}

/// Google API error envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: Option<u16>,
    pub message: String,
    pub status: Option<String>,
}

/// Parse a row of cells as integers
pub fn parse_cells(table: Table, row: &[String]) -> Result<Vec<i64>> {
    row.iter()
        .enumerate()
        .map(|(i, cell)| {
            cell.trim().parse::<i64>().map_err(|_| {
                AppError::Sheets(format!(
                    "Non-numeric cell '{}' in column {} of '{}'",
                    cell,
                    i + 1,
                    table
                ))
            })
        })
        .collect()
}
