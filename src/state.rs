//! Application state management

use crate::auth::SheetSession;
use crate::config::Config;
use crate::error::Result;
use crate::sheets::types::Table;
use crate::sheets::{GoogleSheets, MemorySheets, SheetGateway};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Header used by the offline sample spreadsheet
pub const SAMPLE_HEADER: [&str; 6] = ["bacon", "egg", "chicken", "tuna", "turkey", "ham"];

/// State shared by every service for one run
pub struct AppState {
    /// Resolved configuration
    pub config: Config,

    /// Spreadsheet gateway
    pub sheets: Arc<dyn SheetGateway>,
}

impl AppState {
    /// Authorize and open the configured spreadsheet
    pub async fn connect(config: Config) -> Result<Self> {
        if config.offline {
            tracing::info!("Offline mode: using the in-memory sample spreadsheet");
            return Ok(Self::with_gateway(config, Arc::new(sample_sheets())));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let session = SheetSession::authorize(&client, &config.credentials).await?;

        let sheets = match &config.spreadsheet_id {
            Some(id) => GoogleSheets::new(client, session, id.clone()),
            None => GoogleSheets::open_by_title(client, session, &config.spreadsheet).await?,
        };

        tracing::info!("Spreadsheet {} ready", sheets.spreadsheet_id());

        Ok(Self::with_gateway(config, Arc::new(sheets)))
    }

    /// State around an existing gateway
    pub fn with_gateway(config: Config, sheets: Arc<dyn SheetGateway>) -> Self {
        Self { config, sheets }
    }

    pub fn sheets(&self) -> &dyn SheetGateway {
        self.sheets.as_ref()
    }
}

/// Sample spreadsheet with one stock allocation and five periods of sales
pub fn sample_sheets() -> MemorySheets {
    let sheets = MemorySheets::with_header(&SAMPLE_HEADER);

    sheets.push_rows(
        Table::Sales,
        &[
            vec![13, 50, 27, 24, 20, 16],
            vec![9, 45, 20, 19, 15, 10],
            vec![12, 39, 25, 21, 17, 14],
            vec![15, 42, 22, 23, 19, 11],
            vec![11, 48, 24, 20, 16, 13],
        ],
    );
    sheets.push_rows(Table::Surplus, &[vec![1, -3, 2, 0, 4, 1]]);
    sheets.push_rows(Table::Stock, &[vec![12, 50, 26, 24, 20, 14]]);

    sheets
}
