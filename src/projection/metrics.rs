//! Summary investment metrics derived from a yearly projection

use serde::{Deserialize, Serialize};

use super::cashflows::YearlyProjectionRow;
use super::irr::{calculate_irr_pct, IrrSettings};
use crate::error::{FeasibilityError, Result};
use crate::params::ParameterSet;
use crate::range::{CostLevel, Range};

/// Headline metrics of a projection.
///
/// Every range is `{lower bound, upper bound}` of the value. Numeric failures
/// (undefined IRR, no payback, ROI on a zero investment) are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub total_initial_cost: Range<f64>,
    /// First-year revenue
    pub annual_revenue: f64,
    /// First-year revenue less first-year operating costs
    pub annual_profit: Range<f64>,
    pub roi_pct: Range<Option<f64>>,
    pub npv: Range<f64>,
    pub irr_pct: Range<Option<f64>>,
    pub payback_years: Range<Option<f64>>,
}

impl SummaryMetrics {
    /// Derive the metrics from projected rows (year 0 first)
    pub fn derive(params: &ParameterSet, rows: &[YearlyProjectionRow], irr_settings: &IrrSettings) -> Self {
        let horizon_years = rows.len().saturating_sub(1) as u32;
        let total_initial_cost = params.initial_cost_range();

        // Keyed by cost level; reordered by value below. Profit, NPV and IRR fall
        // as costs rise. ROI is not monotone in cost and is ordered by value.
        let annual_profit = Range::evaluate(|level| rows.get(1).map(|r| r.net_cash_flow_at(level)).unwrap_or(0.0));

        let roi_pct = Range::evaluate(|level| {
            let cost = *total_initial_cost.at(level);
            (cost > 0.0).then(|| annual_profit.at(level) / cost * 100.0)
        });

        let npv = Range::evaluate(|level| rows.iter().map(|r| r.discounted_cash_flow_at(level)).sum::<f64>());

        let irr_pct = Range::evaluate(|level| {
            let cashflows: Vec<f64> = rows.iter().map(|r| r.net_cash_flow_at(level)).collect();
            irr_pct_or_none(&cashflows, irr_settings, level)
        });

        let payback_years = Range::evaluate(|level| {
            let net: Vec<f64> = rows.iter().map(|r| r.net_cash_flow_at(level)).collect();
            let cumulative: Vec<f64> = rows.iter().map(|r| r.cumulative_cash_flow_at(level)).collect();
            payback_or_none(&cumulative, &net, level)
        });

        if irr_pct.min.is_none() && irr_pct.max.is_none() {
            log::warn!("IRR undefined for both cost levels over {} years", horizon_years);
        }

        Self {
            total_initial_cost,
            annual_revenue: params.annual_revenue(),
            annual_profit: annual_profit.swapped(),
            roi_pct: roi_pct.ordered(),
            npv: npv.swapped(),
            irr_pct: irr_pct.swapped(),
            payback_years,
        }
    }

    /// IRR under a cost level
    pub fn irr_pct_at(&self, level: CostLevel) -> Option<f64> {
        *self.irr_pct.at_inverse(level)
    }
}

/// IRR in percent, `None` (logged) when it is undefined
pub(super) fn irr_pct_or_none(cashflows: &[f64], settings: &IrrSettings, level: CostLevel) -> Option<f64> {
    match calculate_irr_pct(cashflows, settings) {
        Ok(irr) => Some(irr),
        Err(e) => {
            log::debug!("IRR undefined under {} cost: {}", level.as_str(), e);
            None
        }
    }
}

pub(super) fn payback_or_none(cumulative: &[f64], net: &[f64], level: CostLevel) -> Option<f64> {
    match payback_period(cumulative, net) {
        Ok(years) => Some(years),
        Err(e) => {
            log::debug!("payback undefined under {} cost: {}", level.as_str(), e);
            None
        }
    }
}

/// Fractional years until the cumulative cash flow first turns non-negative.
///
/// `cumulative[t]` and `net[t]` are the values at the end of year `t`, year 0
/// being the initial outflow. The crossing is interpolated linearly inside the
/// year in which it happens.
pub fn payback_period(cumulative: &[f64], net: &[f64]) -> Result<f64> {
    let horizon_years = cumulative.len().saturating_sub(1) as u32;

    match cumulative.first() {
        None => return Err(FeasibilityError::UndefinedPayback { horizon_years }),
        Some(&start) if start >= 0.0 => return Ok(0.0),
        Some(_) => {}
    }

    for t in 1..cumulative.len() {
        let before = cumulative[t - 1];
        let after = cumulative[t];
        if before < 0.0 && after >= 0.0 {
            let recovered = net.get(t).copied().unwrap_or(after - before);
            return Ok((t - 1) as f64 + (-before) / recovered);
        }
    }

    Err(FeasibilityError::UndefinedPayback { horizon_years })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_payback_interpolates() {
        let net = [-1000.0, 400.0, 400.0, 400.0];
        let cumulative = [-1000.0, -600.0, -200.0, 200.0];
        let payback = payback_period(&cumulative, &net).unwrap();
        assert_relative_eq!(payback, 2.5);
    }

    #[test]
    fn test_payback_exact_year() {
        let net = [-800.0, 400.0, 400.0];
        let cumulative = [-800.0, -400.0, 0.0];
        assert_relative_eq!(payback_period(&cumulative, &net).unwrap(), 2.0);
    }

    #[test]
    fn test_payback_zero_investment() {
        assert_eq!(payback_period(&[0.0, 10.0], &[0.0, 10.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_payback_never_recovers() {
        let net = [-1000.0, 100.0, 100.0];
        let cumulative = [-1000.0, -900.0, -800.0];
        match payback_period(&cumulative, &net) {
            Err(FeasibilityError::UndefinedPayback { horizon_years }) => assert_eq!(horizon_years, 2),
            other => panic!("expected UndefinedPayback, got {:?}", other),
        }
        assert!(payback_period(&[], &[]).is_err());
    }

    #[test]
    fn test_payback_uses_first_crossing() {
        let net = [-100.0, 150.0, -100.0, 100.0];
        let cumulative = [-100.0, 50.0, -50.0, 50.0];
        assert_relative_eq!(payback_period(&cumulative, &net).unwrap(), 100.0 / 150.0);
    }
}
