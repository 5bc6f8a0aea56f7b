//! Services Layer
//!
//! Business logic run by the command-line entry point. Services take the
//! shared `AppState` and talk to the spreadsheet only through its gateway.
//!
//! # Architecture
//!
//! ```text
//! Terminal --> SessionService ──┐
//!                               ├──> metrics (pure) + SheetGateway --> Google Sheets
//! CLI dump --> DumpService ─────┘
//! ```
//!
//! # Services
//!
//! - `SessionService` - Enter sales, record surplus, project stock
//! - `SchemaService` - Check worksheet headers and row widths
//! - `DumpService` - Read every worksheet

pub mod dump_service;
pub mod schema_service;
pub mod session_service;

// Re-export commonly used types and services
pub use dump_service::{DumpService, TableDump};
pub use schema_service::SchemaService;
pub use session_service::{RetryPolicy, SessionOutcome, SessionService, SessionStep};
