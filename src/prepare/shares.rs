//! Inside and outside market shares.
//!
//! Shares are checked, never clipped: a value outside its range means the
//! household table and the counts disagree, which is a data problem.
use std::collections::HashMap;

use crate::{
    market::MarketRow,
    prepare::errors::{PrepareError, PrepareResult},
};

/// `shares = quantity / market_size` for every row.
///
/// # Errors
/// [`PrepareError::ShareOutOfRange`] if a share is not in `[0, 1]`.
pub fn assign_shares(rows: &mut [MarketRow]) -> PrepareResult<()> {
    for row in rows.iter_mut() {
        let share = row.quantity / row.market_size;
        if !(0.0..=1.0).contains(&share) {
            return Err(PrepareError::ShareOutOfRange {
                market: row.market_ids.clone(),
                product: row.product_ids.clone(),
                share,
            });
        }
        row.shares = share;
    }
    Ok(())
}

/// `outside_share = 1 − Σ shares` per market, written to every row of the
/// market.
///
/// # Errors
/// [`PrepareError::OutsideShareOutOfRange`] if a market's outside share is
/// not in `(0, 1)`.
pub fn assign_outside_shares(rows: &mut [MarketRow]) -> PrepareResult<()> {
    let mut inside: HashMap<&str, f64> = HashMap::new();
    for row in rows.iter() {
        *inside.entry(row.market_ids.as_str()).or_insert(0.0) += row.shares;
    }
    let outside: HashMap<String, f64> =
        inside.into_iter().map(|(market, total)| (market.to_string(), 1.0 - total)).collect();

    for row in rows.iter_mut() {
        let s0 = outside[&row.market_ids];
        if !(s0 > 0.0 && s0 < 1.0) {
            return Err(PrepareError::OutsideShareOutOfRange {
                market: row.market_ids.clone(),
                outside_share: s0,
            });
        }
        row.outside_share = s0;
    }
    Ok(())
}
