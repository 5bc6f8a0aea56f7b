//! Spreadsheet gateway module

pub mod google;
pub mod memory;
pub mod types;

use crate::error::{AppError, Result};
use async_trait::async_trait;
use types::*;

pub use google::GoogleSheets;
pub use memory::MemorySheets;

/// Access to the sales, surplus and stock worksheets.
///
/// Every call is a single round-trip; implementations do not retry.
#[async_trait]
pub trait SheetGateway: Send + Sync {
    /// Gateway ID (e.g., "google", "memory")
    fn id(&self) -> &'static str;

    /// Every row of a worksheet, header included
    async fn read_all_rows(&self, table: Table) -> Result<Vec<Row>>;

    /// Every cell of a 1-based column, header included
    async fn read_column(&self, table: Table, column: usize) -> Result<Vec<String>>;

    /// First row of a worksheet
    async fn read_header(&self, table: Table) -> Result<Row>;

    /// Append one row after the last row with data
    async fn append_row(&self, table: Table, values: &[i64]) -> Result<()>;

    /// Last row of a worksheet, if it has any data below the header
    async fn last_row(&self, table: Table) -> Result<Option<Row>> {
        let mut rows = self.read_all_rows(table).await?;
        if rows.len() < 2 {
            return Ok(None);
        }
        Ok(rows.pop())
    }

    /// Data cells of a column (header dropped), oldest first
    async fn column_values(&self, table: Table, column: usize) -> Result<Vec<String>> {
        let mut cells = self.read_column(table, column).await?;
        if cells.is_empty() {
            return Err(AppError::Sheets(format!(
                "Column {} of '{}' has no header",
                column, table
            )));
        }
        cells.remove(0);
        Ok(cells)
    }
}
