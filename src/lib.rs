//! Love Sandwiches - market sales automation
//!
//! Records each market's sales in a Google spreadsheet, works out the
//! surplus against the stock that was made, and recommends how much of each
//! sandwich to make for the next market.

pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod services;
pub mod sheets;
pub mod state;
pub mod terminal;

use config::{Command, Config};
use error::{AppError, ErrorResponse, Result};
use services::{DumpService, SessionService};
use state::AppState;
use terminal::{StdTerminal, Terminal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const WELCOME: &str = "Welcome to Love Sandwiches Data Automation";

/// Initialize tracing/logging on stderr, away from the prompts
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "love_sandwiches=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Run the configured command against the interactive terminal
pub async fn run(config: Config) -> Result<()> {
    let terminal = StdTerminal::new();
    run_with(config, &terminal).await
}

/// Run the configured command, reporting any failure on `terminal`
pub async fn run_with(config: Config, terminal: &dyn Terminal) -> Result<()> {
    tracing::info!("Starting Love Sandwiches ({:?})...", config.command());

    let command = config.command();
    let result = match AppState::connect(config).await {
        Ok(state) => execute(&state, command, terminal).await,
        Err(e) => Err(e),
    };

    if let Err(e) = &result {
        report_failure(terminal, e).await;
    }
    result
}

async fn execute(state: &AppState, command: Command, terminal: &dyn Terminal) -> Result<()> {
    match command {
        Command::Run => {
            terminal.report(WELCOME).await?;
            let outcome = SessionService::run(state, terminal).await?;
            match &outcome.stock {
                Some(stock) => tracing::info!(
                    "Session complete after {} attempt(s); next stock {:?}",
                    outcome.attempts,
                    stock
                ),
                None => tracing::info!(
                    "Session complete after {} attempt(s); not enough history for stock",
                    outcome.attempts
                ),
            }
        }
        Command::Dump => {
            for dump in DumpService::dump(state).await? {
                terminal.report(&dump.render()).await?;
            }
        }
    }
    Ok(())
}

async fn report_failure(terminal: &dyn Terminal, err: &AppError) {
    let response = ErrorResponse::from(err);
    tracing::error!(code = %response.code, "{}", response.message);

    let mut message = match &response.step {
        Some(step) => format!("Stopped while {}: {}", step, err_root(err)),
        None => format!("Stopped: {}", response.message),
    };
    if err.is_remote() {
        message.push_str("\nRows written before this point remain in the spreadsheet.");
    }

    if let Err(e) = terminal.report(&message).await {
        tracing::warn!("Failed to report error to terminal: {}", e);
    }
}

/// Innermost error of a step failure
fn err_root(err: &AppError) -> &AppError {
    match err {
        AppError::StepFailed { source, .. } => err_root(source),
        other => other,
    }
}
