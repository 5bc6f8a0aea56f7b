//! Schema Service
//!
//! Verifies that the sales, surplus and stock worksheets share one header of
//! six categories in the same order, and checks data rows against it.

use crate::error::{AppError, Result};
use crate::metrics::{Categories, CATEGORY_COUNT};
use crate::sheets::types::{parse_cells, Row, Table};
use crate::state::AppState;
use tracing::{debug, info};

/// Schema service for business logic
pub struct SchemaService;

impl SchemaService {
    /// Load and compare the header rows of all three worksheets.
    ///
    /// Returns the stock worksheet's labels for display.
    pub async fn load(state: &AppState) -> Result<Categories> {
        let mut headers: Vec<(Table, Row)> = Vec::with_capacity(3);

        for table in Table::all() {
            let header = normalize(state.sheets().read_header(table).await?);
            debug!("Header of '{}': {:?}", table, header);

            if header.len() != CATEGORY_COUNT {
                return Err(AppError::SchemaMismatch(format!(
                    "'{}' has {} columns, expected {}",
                    table,
                    header.len(),
                    CATEGORY_COUNT
                )));
            }
            headers.push((table, header));
        }

        let (_, stock_header) = &headers[2];
        for (table, header) in &headers[..2] {
            let differs = header
                .iter()
                .zip(stock_header)
                .position(|(a, b)| !a.eq_ignore_ascii_case(b));

            if let Some(i) = differs {
                return Err(AppError::SchemaMismatch(format!(
                    "column {} is '{}' in '{}' but '{}' in 'stock'",
                    i + 1,
                    header[i],
                    table,
                    stock_header[i]
                )));
            }
        }

        info!("Worksheet headers agree: {}", stock_header.join(", "));
        Ok(Categories::from_header(stock_header))
    }

    /// Parse a data row, requiring one numeric cell per category
    pub fn check_row(table: Table, row: &[String]) -> Result<Vec<i64>> {
        if row.len() != CATEGORY_COUNT {
            return Err(AppError::SchemaMismatch(format!(
                "row in '{}' has {} cells, expected {}",
                table,
                row.len(),
                CATEGORY_COUNT
            )));
        }
        parse_cells(table, row)
    }
}

/// Trim cells and drop trailing blanks
fn normalize(row: Row) -> Row {
    let mut row: Row = row.into_iter().map(|c| c.trim().to_string()).collect();
    while row.last().is_some_and(|c| c.is_empty()) {
        row.pop();
    }
    row
}
