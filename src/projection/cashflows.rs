//! Cashflow output structures for projections

use serde::{Deserialize, Serialize};

use super::metrics::SummaryMetrics;
use super::subsidy::SubsidySummary;
use crate::financing::FinancingSummary;
use crate::range::{CostLevel, Range};

/// A single row of projection output for one year.
///
/// `min`/`max` are the lower and upper bound of each value. Costs take their
/// lower bound from the min-cost assumption; cash flows fall as costs rise, so
/// theirs comes from the max-cost assumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyProjectionRow {
    /// 0 = construction (initial outflow), 1.. = operating years
    pub year: u32,

    /// Nominal revenue, inflated from year 1
    pub revenue: f64,

    /// Operating costs including property tax
    pub operating_costs: Range<f64>,

    pub net_cash_flow: Range<f64>,
    pub cumulative_cash_flow: Range<f64>,
    pub discounted_cash_flow: Range<f64>,

    /// Loan payments falling in this year (not part of the project cash flow)
    pub debt_service: Range<f64>,
}

impl YearlyProjectionRow {
    /// Create a row with every amount at zero
    pub fn new(year: u32) -> Self {
        Self {
            year,
            revenue: 0.0,
            operating_costs: Range::default(),
            net_cash_flow: Range::default(),
            cumulative_cash_flow: Range::default(),
            discounted_cash_flow: Range::default(),
            debt_service: Range::default(),
        }
    }

    /// Net cash flow under a cost level
    pub fn net_cash_flow_at(&self, level: CostLevel) -> f64 {
        *self.net_cash_flow.at_inverse(level)
    }

    pub fn cumulative_cash_flow_at(&self, level: CostLevel) -> f64 {
        *self.cumulative_cash_flow.at_inverse(level)
    }

    pub fn discounted_cash_flow_at(&self, level: CostLevel) -> f64 {
        *self.discounted_cash_flow.at_inverse(level)
    }
}

/// One point of the revenue/cost/profit chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub year: u32,
    pub revenue: f64,
    pub costs_min: f64,
    pub costs_max: f64,
    pub profit_min: f64,
    pub profit_max: f64,
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Number of operating years simulated
    pub horizon_years: u32,

    /// Annual rate used for discounting, as a percentage
    pub discount_rate_pct: f64,

    /// Headline investment metrics
    pub summary: SummaryMetrics,

    /// Loan sizing and debt service
    pub financing: FinancingSummary,

    /// Metrics with the capital grant, when a subsidy is configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsidy: Option<SubsidySummary>,

    /// One row per year, year 0 first
    pub yearly: Vec<YearlyProjectionRow>,
}

impl ProjectionResult {
    /// Net cash flows `[year 0, year 1, ..]` under a cost level, as fed to NPV and IRR
    pub fn net_cash_flows(&self, level: CostLevel) -> Vec<f64> {
        self.yearly.iter().map(|r| r.net_cash_flow_at(level)).collect()
    }

    pub fn cumulative_cash_flows(&self, level: CostLevel) -> Vec<f64> {
        self.yearly.iter().map(|r| r.cumulative_cash_flow_at(level)).collect()
    }

    /// Operating years only
    pub fn operating_years(&self) -> impl Iterator<Item = &YearlyProjectionRow> {
        self.yearly.iter().filter(|r| r.year > 0)
    }

    /// Series for the revenue/cost/profit line chart, keyed by operating year
    pub fn chart_series(&self) -> Vec<ChartPoint> {
        self.operating_years()
            .map(|row| ChartPoint {
                year: row.year,
                revenue: row.revenue,
                costs_min: row.operating_costs.min,
                costs_max: row.operating_costs.max,
                profit_min: row.net_cash_flow.min,
                profit_max: row.net_cash_flow.max,
            })
            .collect()
    }
}
