//! Command-line and environment configuration

use crate::services::session_service::RetryPolicy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Love Sandwiches data automation
#[derive(Debug, Clone, Parser)]
#[command(name = "love-sandwiches")]
#[command(about = "Record market sales and plan the next stock run")]
pub struct Config {
    /// Service-account key file
    #[arg(long, env = "GOOGLE_CREDENTIALS", default_value = "creds.json")]
    pub credentials: PathBuf,

    /// Spreadsheet title, as shared with the service account
    #[arg(long, env = "SPREADSHEET_NAME", default_value = "love_sandwiches")]
    pub spreadsheet: String,

    /// Spreadsheet id; skips the lookup by title
    #[arg(long, env = "SPREADSHEET_ID")]
    pub spreadsheet_id: Option<String>,

    /// Give up after this many invalid entries (default: keep asking)
    #[arg(long, env = "MAX_INPUT_ATTEMPTS")]
    pub max_attempts: Option<u32>,

    /// Work on an in-memory sample spreadsheet instead of Google Sheets
    #[arg(long, default_value_t = false)]
    pub offline: bool,

    /// HTTP timeout in seconds for spreadsheet calls
    #[arg(long, env = "SHEETS_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Enter this market's sales and record surplus and next stock (default)
    Run,
    /// Print every row of the sales, surplus and stock worksheets
    Dump,
}

impl Config {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Run)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        match self.max_attempts {
            Some(n) => RetryPolicy::Bounded(n.max(1)),
            None => RetryPolicy::Unbounded,
        }
    }

    /// Offline configuration with defaults, for tests and dry runs
    pub fn offline() -> Self {
        Self {
            credentials: PathBuf::from("creds.json"),
            spreadsheet: "love_sandwiches".to_string(),
            spreadsheet_id: None,
            max_attempts: None,
            offline: true,
            timeout_secs: 30,
            command: None,
        }
    }
}
