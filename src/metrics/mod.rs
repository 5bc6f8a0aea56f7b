//! Sales metrics
//!
//! Pure computations over the six positional item categories:
//!
//! - `validator` - turn raw terminal input into a `SalesRecord`
//! - `surplus` - stock minus sales for the period just recorded
//! - `projector` - next period's stock from the trailing sales window
//!
//! Nothing here touches the spreadsheet; the services layer feeds these
//! functions with rows it has already read and schema-checked.

pub mod category;
pub mod projector;
pub mod surplus;
pub mod validator;

pub use category::{Categories, Category, CATEGORY_COUNT};
pub use projector::{project, HistoryWindow, ProjectionError, HISTORY_WINDOW};
pub use surplus::{surplus, SurplusOverflow};
pub use validator::{parse_sales_input, validate, SalesRecord, ValidationError};
