//! In-process spreadsheet, used for offline runs and tests

use crate::error::{AppError, Result};
use crate::sheets::types::{Row, Table};
use crate::sheets::SheetGateway;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

/// Worksheets held in memory
#[derive(Default)]
pub struct MemorySheets {
    tables: RwLock<HashMap<Table, Vec<Row>>>,
    failing_appends: RwLock<HashSet<Table>>,
}

impl MemorySheets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same header on all three worksheets, no data
    pub fn with_header(header: &[&str]) -> Self {
        let sheets = Self::new();
        for table in Table::all() {
            sheets.set_rows(table, vec![to_row(header)]);
        }
        sheets
    }

    /// Replace every row of a worksheet, header included
    pub fn set_rows(&self, table: Table, rows: Vec<Row>) {
        self.tables.write().insert(table, rows);
    }

    /// Add numeric data rows below the existing ones
    pub fn push_rows(&self, table: Table, rows: &[Vec<i64>]) {
        let mut tables = self.tables.write();
        let sheet = tables.entry(table).or_default();
        sheet.extend(rows.iter().map(|r| r.iter().map(i64::to_string).collect()));
    }

    /// Snapshot of a worksheet
    pub fn rows(&self, table: Table) -> Vec<Row> {
        self.tables.read().get(&table).cloned().unwrap_or_default()
    }

    /// Make appends to `table` fail, as a remote store outage would
    pub fn fail_appends_to(&self, table: Table) {
        self.failing_appends.write().insert(table);
    }
}

fn to_row(cells: &[&str]) -> Row {
    cells.iter().map(|c| c.to_string()).collect()
}

#[async_trait]
impl SheetGateway for MemorySheets {
    fn id(&self) -> &'static str {
        "memory"
    }

    async fn read_all_rows(&self, table: Table) -> Result<Vec<Row>> {
        Ok(self.rows(table))
    }

    async fn read_column(&self, table: Table, column: usize) -> Result<Vec<String>> {
        if column == 0 {
            return Err(AppError::Sheets("Column numbers start at 1".to_string()));
        }

        let tables = self.tables.read();
        let rows = tables.get(&table).map(Vec::as_slice).unwrap_or_default();

        // Trailing blanks are omitted, as the Sheets API does.
        let mut cells: Vec<String> = rows
            .iter()
            .map(|row| row.get(column - 1).cloned().unwrap_or_default())
            .collect();
        while cells.last().is_some_and(|c| c.is_empty()) {
            cells.pop();
        }
        Ok(cells)
    }

    async fn read_header(&self, table: Table) -> Result<Row> {
        Ok(self
            .tables
            .read()
            .get(&table)
            .and_then(|rows| rows.first().cloned())
            .unwrap_or_default())
    }

    async fn append_row(&self, table: Table, values: &[i64]) -> Result<()> {
        if self.failing_appends.read().contains(&table) {
            return Err(AppError::Sheets(format!(
                "503 UNAVAILABLE: append to '{}' rejected",
                table
            )));
        }

        self.push_rows(table, &[values.to_vec()]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_and_read_back() {
        let sheets = MemorySheets::with_header(&["a", "b"]);
        sheets.append_row(Table::Sales, &[1, 2]).await.unwrap();
        sheets.append_row(Table::Sales, &[3, 4]).await.unwrap();

        let rows = sheets.read_all_rows(Table::Sales).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], vec!["3", "4"]);

        let column = sheets.read_column(Table::Sales, 2).await.unwrap();
        assert_eq!(column, vec!["b", "2", "4"]);

        let values = sheets.column_values(Table::Sales, 1).await.unwrap();
        assert_eq!(values, vec!["1", "3"]);
    }

    #[tokio::test]
    async fn test_last_row_skips_header_only_table() {
        let sheets = MemorySheets::with_header(&["a"]);
        assert!(sheets.last_row(Table::Stock).await.unwrap().is_none());

        sheets.push_rows(Table::Stock, &[vec![9]]);
        assert_eq!(sheets.last_row(Table::Stock).await.unwrap(), Some(vec!["9".to_string()]));
    }

    #[tokio::test]
    async fn test_failing_append_leaves_table_untouched() {
        let sheets = MemorySheets::with_header(&["a"]);
        sheets.fail_appends_to(Table::Stock);

        assert!(sheets.append_row(Table::Stock, &[1]).await.is_err());
        assert_eq!(sheets.rows(Table::Stock).len(), 1);
        assert!(sheets.append_row(Table::Sales, &[1]).await.is_ok());
    }

    #[tokio::test]
    async fn test_header_of_missing_table_is_empty() {
        let sheets = MemorySheets::new();
        assert!(sheets.read_header(Table::Surplus).await.unwrap().is_empty());
        assert!(sheets.column_values(Table::Surplus, 1).await.is_err());
    }
}
