//! Capital subsidy view of a projection
//!
//! A grant on the villa construction cost, received together with the initial
//! outlay. The unsubsidised metrics stay the headline figures; the subsidised
//! ones are reported next to them.

use serde::{Deserialize, Serialize};

use super::cashflows::ProjectionResult;
use super::irr::IrrSettings;
use super::metrics::{irr_pct_or_none, payback_or_none};
use crate::params::ParameterSet;
use crate::range::Range;

/// Metrics with the capital grant added to the year-0 flow.
///
/// Every range is ordered by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsidySummary {
    /// Subsidy rate range as entered [%]
    pub subsidy_pct: Range<f64>,
    pub grant: Range<f64>,
    /// Initial cost less the grant
    pub net_initial_cost: Range<f64>,
    pub roi_pct: Range<Option<f64>>,
    pub npv: Range<f64>,
    pub irr_pct: Range<Option<f64>>,
    pub payback_years: Range<Option<f64>>,
}

impl SubsidySummary {
    /// Subsidised metrics of a finished projection, `None` without a subsidy
    pub fn derive(params: &ParameterSet, result: &ProjectionResult, irr_settings: &IrrSettings) -> Option<Self> {
        if !params.has_capital_subsidy() {
            return None;
        }

        // Keyed by cost level until the final ordering
        let grant = Range::evaluate(|level| params.capital_subsidy(level));
        let net_initial_cost = Range::evaluate(|level| params.total_initial_cost(level) - grant.at(level));

        let flows = Range::evaluate(|level| {
            let mut flows = result.net_cash_flows(level);
            if let Some(first) = flows.first_mut() {
                *first += grant.at(level);
            }
            flows
        });
        let cumulative = Range::evaluate(|level| {
            result
                .cumulative_cash_flows(level)
                .into_iter()
                .map(|c| c + grant.at(level))
                .collect::<Vec<f64>>()
        });

        // Year 0 is undiscounted
        let npv = Range::evaluate(|level| result.summary.npv.at_inverse(level) + grant.at(level));

        let roi_pct = Range::evaluate(|level| {
            let cost = *net_initial_cost.at(level);
            let first_year = flows.at(level).get(1).copied().unwrap_or(0.0);
            (cost > 0.0).then(|| first_year / cost * 100.0)
        });
        let irr_pct = Range::evaluate(|level| irr_pct_or_none(flows.at(level), irr_settings, level));
        let payback_years = Range::evaluate(|level| payback_or_none(cumulative.at(level), flows.at(level), level));

        log::debug!(
            "capital subsidy {:.1}..{:.1}%: grant {:.0}..{:.0}",
            params.capital_subsidy_pct.min,
            params.capital_subsidy_pct.max,
            grant.min,
            grant.max
        );

        Some(Self {
            subsidy_pct: params.capital_subsidy_pct,
            grant: grant.ordered(),
            net_initial_cost: net_initial_cost.ordered(),
            roi_pct: roi_pct.ordered(),
            npv: npv.ordered(),
            irr_pct: irr_pct.ordered(),
            payback_years: payback_years.ordered(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::ProjectionEngine;
    use approx::assert_relative_eq;

    fn subsidised() -> ParameterSet {
        ParameterSet {
            capital_subsidy_pct: Range::new(20.0, 30.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_subsidy_by_default() {
        let result = ProjectionEngine::default().project(&ParameterSet::default()).unwrap();
        assert!(result.subsidy.is_none());
    }

    #[test]
    fn test_grant_added_to_initial_flow() {
        let result = ProjectionEngine::default().project(&subsidised()).unwrap();
        let subsidy = result.subsidy.as_ref().unwrap();
        let s = &result.summary;

        // 30% of 16M under min cost, 20% of 30M under max cost
        assert_eq!(subsidy.grant, Range::new(4_800_000.0, 6_000_000.0));
        assert_relative_eq!(subsidy.net_initial_cost.min, 24_350_000.0 - 4_800_000.0);
        assert_relative_eq!(subsidy.net_initial_cost.max, 38_350_000.0 - 6_000_000.0);

        assert_relative_eq!(subsidy.npv.min, s.npv.min + 6_000_000.0, epsilon = 1e-6);
        assert_relative_eq!(subsidy.npv.max, s.npv.max + 4_800_000.0, epsilon = 1e-6);
        assert_relative_eq!(subsidy.roi_pct.min.unwrap(), s.annual_profit.min / 32_350_000.0 * 100.0, epsilon = 1e-9);
        assert_relative_eq!(subsidy.roi_pct.max.unwrap(), s.annual_profit.max / 19_550_000.0 * 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_subsidy_improves_returns() {
        let result = ProjectionEngine::default().project(&subsidised()).unwrap();
        let subsidy = result.subsidy.as_ref().unwrap();
        let s = &result.summary;

        assert!(subsidy.irr_pct.min.unwrap() > s.irr_pct.min.unwrap());
        assert!(subsidy.irr_pct.max.unwrap() > s.irr_pct.max.unwrap());
        assert!(subsidy.payback_years.min.unwrap() < s.payback_years.min.unwrap());
        assert!(subsidy.payback_years.max.unwrap() < s.payback_years.max.unwrap());
        assert!(subsidy.payback_years.min.unwrap() <= subsidy.payback_years.max.unwrap());
    }

    #[test]
    fn test_headline_metrics_unchanged() {
        let plain = ProjectionEngine::default().project(&ParameterSet::default()).unwrap();
        let with_subsidy = ProjectionEngine::default().project(&subsidised()).unwrap();
        assert_eq!(plain.summary, with_subsidy.summary);
        assert_eq!(plain.yearly, with_subsidy.yearly);
    }
}
