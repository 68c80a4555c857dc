//! The discrete-choice estimator seam.
use serde::Deserialize;

use crate::{
    estimation::{
        errors::{EstimationError, EstimationResult},
        specification::Formulation,
    },
    market::MarketTable,
};

/// One named coefficient with its standard error.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamEstimate {
    pub name: String,
    pub value: f64,
    pub se: f64,
}

/// Coefficients in design-column order.
pub type Estimates = Vec<ParamEstimate>;

/// Fits a logit demand formulation to a prepared table.
///
/// Implementations must be deterministic for identical inputs and must not
/// log above `debug`; the runner reports progress.
pub trait DemandEstimator {
    fn name(&self) -> &'static str;

    fn estimate(
        &self, formulation: &Formulation, table: &MarketTable,
    ) -> EstimationResult<Estimates>;
}

/// Selectable backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimatorKind {
    #[default]
    IvLogit,
    MleLogit,
}

/// Mean utilities `δ = ln s − ln s₀` for every row.
///
/// # Errors
/// [`EstimationError::DegenerateColumn`] when a share or outside share is not
/// strictly positive.
pub fn mean_utilities(table: &MarketTable) -> EstimationResult<Vec<f64>> {
    table
        .rows
        .iter()
        .enumerate()
        .map(|(row, r)| {
            if !(r.shares > 0.0) {
                return Err(EstimationError::DegenerateColumn {
                    name: "shares".to_string(),
                    row,
                    value: r.shares,
                });
            }
            if !(r.outside_share > 0.0) {
                return Err(EstimationError::DegenerateColumn {
                    name: "outside_share".to_string(),
                    row,
                    value: r.outside_share,
                });
            }
            Ok(r.shares.ln() - r.outside_share.ln())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{table::tests::row, MarketDefinition};

    #[test]
    fn mean_utilities_are_log_share_ratios() {
        let mut zero = row("2019", "b", 0.0);
        zero.outside_share = 0.5;
        let table = MarketTable::new(MarketDefinition::ModelYear, 2, vec![row("2019", "a", 0.25)]);

        let delta = mean_utilities(&table).expect("positive shares");

        assert!((delta[0] - (0.25_f64 / 0.5).ln()).abs() < 1e-12);
        let bad = MarketTable::new(MarketDefinition::ModelYear, 2, vec![zero]);
        assert!(matches!(
            mean_utilities(&bad),
            Err(EstimationError::DegenerateColumn { row: 0, .. })
        ));
    }
}
