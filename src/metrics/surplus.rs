//! Surplus calculation

use thiserror::Error;

/// A surplus that does not fit in a sheet integer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("surplus in column {position} is out of range ({stock} - {sold})")]
pub struct SurplusOverflow {
    pub position: usize,
    pub stock: i64,
    pub sold: i64,
}

/// Surplus per category: `stock[i] - sales[i]`.
///
/// Positive values are unsold stock, negative values mean the category sold
/// out with demand left over. Pairing is positional and stops at the shorter
/// input.
pub fn surplus(sales: &[i64], stock: &[i64]) -> Result<Vec<i64>, SurplusOverflow> {
    stock
        .iter()
        .zip(sales.iter())
        .enumerate()
        .map(|(i, (&stock, &sold))| {
            stock.checked_sub(sold).ok_or(SurplusOverflow {
                position: i + 1,
                stock,
                sold,
            })
        })
        .collect()
}
