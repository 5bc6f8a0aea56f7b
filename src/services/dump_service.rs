//! Dump Service
//!
//! Reads every row of the three worksheets for inspection.

use crate::error::Result;
use crate::sheets::types::{Row, Table};
use crate::state::AppState;
use tracing::info;

/// Contents of one worksheet
#[derive(Debug, Clone)]
pub struct TableDump {
    pub table: Table,
    pub rows: Vec<Row>,
}

impl TableDump {
    /// Plain-text rendering, one row per line
    pub fn render(&self) -> String {
        let mut out = format!("[{}] {} rows\n", self.table, self.rows.len());
        for row in &self.rows {
            out.push_str("  ");
            out.push_str(&row.join(", "));
            out.push('\n');
        }
        out
    }
}

/// Dump service for business logic
pub struct DumpService;

impl DumpService {
    pub async fn dump(state: &AppState) -> Result<Vec<TableDump>> {
        let mut dumps = Vec::with_capacity(3);

        for table in Table::all() {
            let rows = state.sheets().read_all_rows(table).await?;
            info!("DumpService::dump - '{}' has {} rows", table, rows.len());
            dumps.push(TableDump { table, rows });
        }

        Ok(dumps)
    }
}
