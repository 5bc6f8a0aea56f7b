//! Sales input validation

use crate::metrics::category::CATEGORY_COUNT;
use thiserror::Error;

/// Why a line of sales input was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("'{token}' (value {position}) is not a whole number")]
    InvalidToken { position: usize, token: String },

    #[error("exactly 6 values required, you provided {actual}")]
    WrongCount { actual: usize },
}

/// Units sold per category for one market period
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesRecord([i64; CATEGORY_COUNT]);

impl SalesRecord {
    pub fn values(&self) -> &[i64] {
        &self.0
    }
}

/// Validate comma-split sales tokens.
///
/// Tokens are checked in order and the first one that is not a base-10
/// integer is reported. Only once every token parses is the count checked.
/// Sign and magnitude are not restricted.
pub fn validate<S: AsRef<str>>(raw: &[S]) -> Result<SalesRecord, ValidationError> {
    let mut values = Vec::with_capacity(raw.len());

    for (i, token) in raw.iter().enumerate() {
        let token = token.as_ref().trim();
        let value = token
            .parse::<i64>()
            .map_err(|_| ValidationError::InvalidToken {
                position: i + 1,
                token: token.to_string(),
            })?;
        values.push(value);
    }

    let record: [i64; CATEGORY_COUNT] = values
        .try_into()
        .map_err(|v: Vec<i64>| ValidationError::WrongCount { actual: v.len() })?;

    Ok(SalesRecord(record))
}

/// Split a raw line on commas and validate it
pub fn parse_sales_input(line: &str) -> Result<SalesRecord, ValidationError> {
    let tokens: Vec<&str> = line.trim().split(',').collect();
    validate(tokens.as_slice())
}
