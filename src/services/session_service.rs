//! Session Service
//!
//! One data-entry run: ask for this market's sales, record them, record the
//! surplus against the last stock allocation, then project and record the
//! next allocation from the trailing sales window.
//!
//! Each `Recording*` step is a single append. Nothing is rolled back when a
//! later step fails; rows already appended stay in the spreadsheet. A stock
//! row is only projected once every category has `HISTORY_WINDOW` periods of
//! sales; before that the run ends after the surplus row.

use crate::error::{AppError, Result};
use crate::metrics::{
    parse_sales_input, project, surplus, Categories, Category, HistoryWindow, ProjectionError,
    SalesRecord, HISTORY_WINDOW,
};
use crate::services::schema_service::SchemaService;
use crate::sheets::types::{parse_cells, Table};
use crate::state::AppState;
use crate::terminal::Terminal;
use std::fmt;
use tracing::{debug, info, warn};

const INSTRUCTIONS: &str = "Please enter sales data from the last market.\n\
Data should be six numbers, separated by commas.\n\
Example: 10,20,30,40,50,60\n";

const INPUT_PROMPT: &str = "Enter your data here: ";

/// Where a run is, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStep {
    CheckingSchema,
    AwaitingInput,
    Validating,
    RecordingSales,
    ComputingSurplus,
    RecordingSurplus,
    FetchingHistory,
    ProjectingStock,
    RecordingStock,
    ReportingRecommendation,
    Done,
}

impl fmt::Display for SessionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStep::CheckingSchema => "checking worksheet headers",
            SessionStep::AwaitingInput => "reading input",
            SessionStep::Validating => "validating input",
            SessionStep::RecordingSales => "recording sales",
            SessionStep::ComputingSurplus => "computing surplus",
            SessionStep::RecordingSurplus => "recording surplus",
            SessionStep::FetchingHistory => "fetching sales history",
            SessionStep::ProjectingStock => "projecting stock",
            SessionStep::RecordingStock => "recording stock",
            SessionStep::ReportingRecommendation => "reporting recommendation",
            SessionStep::Done => "done",
        };
        f.write_str(name)
    }
}

/// How many invalid entries the operator may make
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    Unbounded,
    Bounded(u32),
}

impl RetryPolicy {
    fn allows_another(self, attempts: u32) -> bool {
        match self {
            RetryPolicy::Unbounded => true,
            RetryPolicy::Bounded(max) => attempts < max,
        }
    }
}

/// Everything a completed run wrote
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub sales: SalesRecord,
    pub surplus: Vec<i64>,
    /// `None` while the sales history is shorter than the window
    pub stock: Option<Vec<i64>>,
    pub recommendation: Vec<(String, i64)>,
    pub attempts: u32,
}

/// Session service for business logic
pub struct SessionService;

impl SessionService {
    /// Run one full data-entry session
    pub async fn run(state: &AppState, terminal: &dyn Terminal) -> Result<SessionOutcome> {
        info!("SessionService::run");

        let categories = at(SessionStep::CheckingSchema, SchemaService::load(state).await)?;

        let (sales, attempts) = Self::read_sales(terminal, state.config.retry_policy()).await?;

        let step = SessionStep::RecordingSales;
        enter(step);
        say(terminal, step, "Updating sales worksheet...").await?;
        at(step, state.sheets().append_row(Table::Sales, sales.values()).await)?;
        info!("Recorded sales {:?}", sales.values());
        say(terminal, step, "Sales worksheet updated successfully.\n").await?;

        let step = SessionStep::ComputingSurplus;
        enter(step);
        let surplus_row = at(step, Self::compute_surplus(state, &sales).await)?;

        let step = SessionStep::RecordingSurplus;
        enter(step);
        say(terminal, step, "Updating surplus worksheet...").await?;
        at(step, state.sheets().append_row(Table::Surplus, &surplus_row).await)?;
        info!("Recorded surplus {:?}", surplus_row);
        say(terminal, step, "Surplus worksheet updated successfully.\n").await?;

        enter(SessionStep::FetchingHistory);
        let window = at(SessionStep::FetchingHistory, Self::fetch_history(state).await)?;

        let step = SessionStep::ProjectingStock;
        enter(step);
        let stock_row = match window.require_full() {
            Ok(()) => Some(at(step, project(window.rows()).map_err(AppError::from))?),
            Err(ProjectionError::InsufficientHistory {
                category,
                available,
                required,
            }) => {
                warn!(
                    "Not projecting stock: {} has {} of {} periods",
                    category, available, required
                );
                let message = format!(
                    "Not enough sales history to plan the next market: \
                     only {} of {} periods recorded for {}. No stock row was written.\n",
                    available,
                    required,
                    categories.label(category)
                );
                say(terminal, step, &message).await?;
                None
            }
            Err(e) => return at(step, Err(e.into())),
        };

        let mut recommendation = Vec::new();
        if let Some(stock_row) = &stock_row {
            let step = SessionStep::RecordingStock;
            enter(step);
            say(terminal, step, "Updating stock worksheet...").await?;
            at(step, state.sheets().append_row(Table::Stock, stock_row).await)?;
            info!("Recorded stock {:?}", stock_row);
            say(terminal, step, "Stock worksheet updated successfully.\n").await?;

            let step = SessionStep::ReportingRecommendation;
            enter(step);
            recommendation = categories.pair(stock_row.as_slice());
            say(terminal, step, &render_recommendation(&categories, stock_row)).await?;
        }

        enter(SessionStep::Done);
        Ok(SessionOutcome {
            sales,
            surplus: surplus_row,
            stock: stock_row,
            recommendation,
            attempts,
        })
    }

    /// Prompt until a valid line arrives or the policy gives up
    async fn read_sales(
        terminal: &dyn Terminal,
        policy: RetryPolicy,
    ) -> Result<(SalesRecord, u32)> {
        let mut attempts = 0u32;

        loop {
            let step = SessionStep::AwaitingInput;
            enter(step);
            say(terminal, step, INSTRUCTIONS).await?;
            let line = at(step, terminal.prompt(INPUT_PROMPT).await)?;
            attempts += 1;

            let step = SessionStep::Validating;
            enter(step);
            match parse_sales_input(&line) {
                Ok(record) => {
                    say(terminal, step, "Data is valid!\n").await?;
                    return Ok((record, attempts));
                }
                Err(e) => {
                    warn!("Rejected sales input {:?}: {}", line, e);
                    let message = format!("Invalid data: {}, please try again.\n", e);
                    say(terminal, step, &message).await?;

                    if !policy.allows_another(attempts) {
                        return Err(AppError::RetriesExhausted { attempts });
                    }
                }
            }
        }
    }

    /// Surplus of the new sales against the last recorded stock row
    async fn compute_surplus(state: &AppState, sales: &SalesRecord) -> Result<Vec<i64>> {
        let last = state
            .sheets()
            .last_row(Table::Stock)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("No stock allocation recorded in 'stock'".to_string())
            })?;

        let stock = SchemaService::check_row(Table::Stock, &last)?;
        Ok(surplus(sales.values(), &stock)?)
    }

    /// Last `HISTORY_WINDOW` sales per category, read column by column
    async fn fetch_history(state: &AppState) -> Result<HistoryWindow> {
        let mut columns = Vec::new();

        for category in Category::all() {
            let cells = state
                .sheets()
                .column_values(Table::Sales, category.column())
                .await?;
            columns.push(parse_cells(Table::Sales, &cells)?);
        }

        let window = HistoryWindow::from_columns(columns);
        debug!(
            "History window holds {} of {} periods",
            window.depth(),
            HISTORY_WINDOW
        );

        Ok(window)
    }
}

fn enter(step: SessionStep) {
    debug!(%step, "session step");
}

/// Tag a failure with the step it happened in
fn at<T>(step: SessionStep, result: Result<T>) -> Result<T> {
    result.map_err(|e| AppError::StepFailed {
        step,
        source: Box::new(e),
    })
}

/// Report to the operator, tagging a terminal failure with the current step
async fn say(terminal: &dyn Terminal, step: SessionStep, message: &str) -> Result<()> {
    at(step, terminal.report(message).await)
}

fn render_recommendation(categories: &Categories, stock: &[i64]) -> String {
    let mut out = String::from("Make the following numbers of sandwiches for next market:\n");
    for (label, value) in categories.pair(stock) {
        out.push_str(&format!("  {}: {}\n", label, value));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::sheets::MemorySheets;
    use crate::terminal::ScriptedTerminal;
    use async_trait::async_trait;
    use std::sync::Arc;

    const HEADER: [&str; 6] = ["bacon", "egg", "chicken", "tuna", "turkey", "ham"];

    fn sheets_with_history() -> Arc<MemorySheets> {
        let sheets = MemorySheets::with_header(&HEADER);
        sheets.push_rows(
            Table::Sales,
            &[
                vec![10, 50, 20, 20, 15, 10],
                vec![10, 50, 20, 20, 15, 10],
                vec![10, 50, 20, 20, 15, 10],
                vec![10, 50, 20, 20, 15, 10],
            ],
        );
        sheets.push_rows(Table::Stock, &[vec![27, 49, 36, 35, 28, 27]]);
        Arc::new(sheets)
    }

    fn state(sheets: Arc<MemorySheets>, config: Config) -> AppState {
        AppState::with_gateway(config, sheets)
    }

    fn rows_as_numbers(sheets: &MemorySheets, table: Table) -> Vec<Vec<i64>> {
        sheets
            .rows(table)
            .iter()
            .skip(1)
            .map(|r| parse_cells(table, r).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_full_run_appends_all_three_rows() {
        let sheets = sheets_with_history();
        let state = state(sheets.clone(), Config::offline());
        let terminal = ScriptedTerminal::new(["10,53,23,21,15,12"]);

        let outcome = SessionService::run(&state, &terminal).await.unwrap();

        let sales = rows_as_numbers(&sheets, Table::Sales);
        assert_eq!(sales.last().unwrap(), &vec![10, 53, 23, 21, 15, 12]);

        let surplus = rows_as_numbers(&sheets, Table::Surplus);
        assert_eq!(surplus, vec![vec![17, -4, 13, 14, 13, 15]]);

        // egg: (200 + 53) / 5 = 50.6 -> 55.66 -> 56; turkey: 15 -> 16.5 -> 16 (ties to even)
        let stock = rows_as_numbers(&sheets, Table::Stock);
        assert_eq!(stock.len(), 2);
        assert_eq!(stock[1], vec![11, 56, 23, 22, 16, 11]);

        assert_eq!(outcome.stock.as_deref(), Some(&stock[1][..]));
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.recommendation[1], ("egg".to_string(), 56));

        let output = terminal.output().join("");
        assert!(output.contains("Make the following numbers of sandwiches"));
        assert!(output.contains("  egg: 56\n"));
    }

    #[tokio::test]
    async fn test_invalid_input_is_reprompted() {
        let sheets = sheets_with_history();
        let state = state(sheets.clone(), Config::offline());
        let terminal = ScriptedTerminal::new(["1,2,3", "1,two,3,4,5,6", "1,2,3,4,5,6"]);

        let outcome = SessionService::run(&state, &terminal).await.unwrap();
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.sales.values(), &[1, 2, 3, 4, 5, 6]);

        let output = terminal.output().join("");
        assert!(output.contains("Invalid data: exactly 6 values required, you provided 3"));
        assert!(output.contains("Invalid data: 'two' (value 2) is not a whole number"));

        // only the valid entry reached the sheet
        assert_eq!(rows_as_numbers(&sheets, Table::Sales).len(), 5);
    }

    #[tokio::test]
    async fn test_bounded_retries_give_up_without_writing() {
        let sheets = sheets_with_history();
        let mut config = Config::offline();
        config.max_attempts = Some(2);
        let state = state(sheets.clone(), config);
        let terminal = ScriptedTerminal::new(["x", "y", "1,2,3,4,5,6"]);

        let err = SessionService::run(&state, &terminal).await.unwrap_err();
        assert!(matches!(err, AppError::RetriesExhausted { attempts: 2 }));
        assert_eq!(terminal.remaining(), 1);
        assert_eq!(rows_as_numbers(&sheets, Table::Sales).len(), 4);
    }

    #[tokio::test]
    async fn test_failed_stock_append_keeps_earlier_rows() {
        let sheets = sheets_with_history();
        sheets.fail_appends_to(Table::Stock);
        let state = state(sheets.clone(), Config::offline());
        let terminal = ScriptedTerminal::new(["10,53,23,21,15,12"]);

        let err = SessionService::run(&state, &terminal).await.unwrap_err();
        match &err {
            AppError::StepFailed { step, .. } => assert_eq!(*step, SessionStep::RecordingStock),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.is_remote());

        assert_eq!(rows_as_numbers(&sheets, Table::Sales).len(), 5);
        assert_eq!(rows_as_numbers(&sheets, Table::Surplus).len(), 1);
        assert_eq!(rows_as_numbers(&sheets, Table::Stock).len(), 1);
    }

    #[tokio::test]
    async fn test_missing_stock_row_fails_at_surplus() {
        let sheets = Arc::new(MemorySheets::with_header(&HEADER));
        let state = state(sheets.clone(), Config::offline());
        let terminal = ScriptedTerminal::new(["1,2,3,4,5,6"]);

        let err = SessionService::run(&state, &terminal).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::StepFailed { step: SessionStep::ComputingSurplus, .. }
        ));
        assert_eq!(rows_as_numbers(&sheets, Table::Sales).len(), 1);
        assert!(rows_as_numbers(&sheets, Table::Surplus).is_empty());
    }

    #[tokio::test]
    async fn test_short_stock_row_is_schema_mismatch() {
        let sheets = sheets_with_history();
        sheets.push_rows(Table::Stock, &[vec![1, 2, 3]]);
        let state = state(sheets, Config::offline());
        let terminal = ScriptedTerminal::new(["1,2,3,4,5,6"]);

        let err = SessionService::run(&state, &terminal).await.unwrap_err();
        assert_eq!(err.code(), "SCHEMA_MISMATCH");
    }

    #[tokio::test]
    async fn test_header_mismatch_stops_before_prompting() {
        let sheets = sheets_with_history();
        sheets.set_rows(Table::Surplus, vec![vec!["bacon".to_string()]]);
        let state = state(sheets, Config::offline());
        let terminal = ScriptedTerminal::new(["1,2,3,4,5,6"]);

        let err = SessionService::run(&state, &terminal).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::StepFailed { step: SessionStep::CheckingSchema, .. }
        ));
        assert_eq!(terminal.remaining(), 1);
    }

    #[tokio::test]
    async fn test_short_history_records_surplus_but_no_stock() {
        let sheets = Arc::new(MemorySheets::with_header(&HEADER));
        sheets.push_rows(Table::Stock, &[vec![5, 5, 5, 5, 5, 5]]);
        let state = state(sheets.clone(), Config::offline());
        let terminal = ScriptedTerminal::new(["1,2,3,4,5,6"]);

        let outcome = SessionService::run(&state, &terminal).await.unwrap();
        assert!(outcome.stock.is_none());
        assert!(outcome.recommendation.is_empty());

        assert_eq!(rows_as_numbers(&sheets, Table::Sales), vec![vec![1, 2, 3, 4, 5, 6]]);
        assert_eq!(
            rows_as_numbers(&sheets, Table::Surplus),
            vec![vec![4, 3, 2, 1, 0, -1]]
        );
        assert_eq!(rows_as_numbers(&sheets, Table::Stock).len(), 1);

        let output = terminal.output().join("");
        assert!(output.contains("only 1 of 5 periods recorded for bacon"));
        assert!(!output.contains("Make the following numbers"));
    }

    #[tokio::test]
    async fn test_extreme_sales_fail_at_surplus_without_writing_it() {
        let sheets = sheets_with_history();
        let state = state(sheets.clone(), Config::offline());
        let terminal = ScriptedTerminal::new(["-9223372036854775808,0,0,0,0,0"]);

        let err = SessionService::run(&state, &terminal).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::StepFailed { step: SessionStep::ComputingSurplus, .. }
        ));
        assert_eq!(err.code(), "OUT_OF_RANGE");
        assert!(rows_as_numbers(&sheets, Table::Surplus).is_empty());
    }

    /// Accepts one entry, then fails to display the given message
    struct FailingReport {
        on: &'static str,
    }

    #[async_trait]
    impl Terminal for FailingReport {
        async fn prompt(&self, _message: &str) -> Result<String> {
            Ok("10,53,23,21,15,12".to_string())
        }

        async fn report(&self, message: &str) -> Result<()> {
            if message.starts_with(self.on) {
                return Err(AppError::Io(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "terminal closed",
                )));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_terminal_failure_names_its_step() {
        let sheets = sheets_with_history();
        let state = state(sheets.clone(), Config::offline());
        let terminal = FailingReport {
            on: "Sales worksheet updated",
        };

        let err = SessionService::run(&state, &terminal).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::StepFailed { step: SessionStep::RecordingSales, .. }
        ));
        assert_eq!(err.code(), "IO_ERROR");
        assert_eq!(rows_as_numbers(&sheets, Table::Sales).len(), 5);
        assert!(rows_as_numbers(&sheets, Table::Surplus).is_empty());

        let terminal = FailingReport { on: "Make the following" };
        let err = SessionService::run(&state, &terminal).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::StepFailed { step: SessionStep::ReportingRecommendation, .. }
        ));
    }

    #[test]
    fn test_retry_policy() {
        assert!(RetryPolicy::Unbounded.allows_another(1_000));
        assert!(RetryPolicy::Bounded(3).allows_another(2));
        assert!(!RetryPolicy::Bounded(3).allows_another(3));
    }
}
