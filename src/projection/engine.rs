//! Core projection engine for yearly project cash flows

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::cashflows::{ProjectionResult, YearlyProjectionRow};
use super::discount::DiscountCurve;
use super::irr::IrrSettings;
use super::metrics::SummaryMetrics;
use super::state::ProjectionState;
use super::subsidy::SubsidySummary;
use crate::error::{FeasibilityError, Result};
use crate::financing::{loan_schedules, FinancingSummary, LoanSchedule};
use crate::params::{ParameterIssue, ParameterSet, MONTHS_PER_YEAR};
use crate::range::{CostLevel, Range};

/// Operating years projected when nothing else is configured
pub const DEFAULT_HORIZON_YEARS: u32 = 15;

/// Longest supported horizon
pub const MAX_HORIZON_YEARS: u32 = 100;

/// Rate used to discount project cash flows for NPV
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountBasis {
    /// The investor's hurdle rate (`discount_rate_pct`)
    #[default]
    Hurdle,
    /// Borrowing rate: prime plus the additional spread
    CostOfDebt,
    /// Hurdle rate plus the full borrowing rate
    HurdlePlusDebtSpread,
}

impl DiscountBasis {
    pub const ALL: [DiscountBasis; 3] = [
        DiscountBasis::Hurdle,
        DiscountBasis::CostOfDebt,
        DiscountBasis::HurdlePlusDebtSpread,
    ];

    /// Annual discount rate as a decimal
    pub fn annual_rate(&self, params: &ParameterSet) -> f64 {
        match self {
            DiscountBasis::Hurdle => params.discount_rate(),
            DiscountBasis::CostOfDebt => params.financing_rate(),
            DiscountBasis::HurdlePlusDebtSpread => params.discount_rate() + params.financing_rate(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountBasis::Hurdle => "hurdle",
            DiscountBasis::CostOfDebt => "cost_of_debt",
            DiscountBasis::HurdlePlusDebtSpread => "hurdle_plus_debt_spread",
        }
    }
}

impl fmt::Display for DiscountBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscountBasis {
    type Err = FeasibilityError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        DiscountBasis::ALL
            .into_iter()
            .find(|basis| basis.as_str() == normalized)
            .ok_or_else(|| FeasibilityError::InvalidConfig {
                message: format!(
                    "unknown discount basis '{}' (expected hurdle, cost_of_debt or hurdle_plus_debt_spread)",
                    s
                ),
            })
    }
}

/// Configuration for a projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Number of operating years to project after construction
    pub horizon_years: u32,

    /// Which rate discounts the cash flows
    pub discount_basis: DiscountBasis,

    /// IRR root-finder settings
    pub irr: IrrSettings,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            horizon_years: DEFAULT_HORIZON_YEARS,
            discount_basis: DiscountBasis::Hurdle,
            irr: IrrSettings::default(),
        }
    }
}

impl ProjectionConfig {
    pub fn with_horizon(horizon_years: u32) -> Self {
        Self {
            horizon_years,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(FeasibilityError::InvalidConfig { message });

        if self.horizon_years == 0 || self.horizon_years > MAX_HORIZON_YEARS {
            return invalid(format!(
                "horizon_years must be between 1 and {}, got {}",
                MAX_HORIZON_YEARS, self.horizon_years
            ));
        }

        let irr = &self.irr;
        if !(irr.tolerance > 0.0 && irr.tolerance.is_finite()) {
            return invalid(format!("irr.tolerance must be positive, got {}", irr.tolerance));
        }
        if irr.max_iterations == 0 {
            return invalid("irr.max_iterations must be at least 1".to_string());
        }
        if !(irr.lower_bound > -1.0 && irr.lower_bound < irr.upper_bound && irr.upper_bound.is_finite()) {
            return invalid(format!(
                "irr bounds must satisfy -1 < lower < upper, got [{}, {}]",
                irr.lower_bound, irr.upper_bound
            ));
        }

        Ok(())
    }
}

/// Main projection engine
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Project a parameter set, rejecting it if any input is invalid
    pub fn project(&self, params: &ParameterSet) -> Result<ProjectionResult> {
        self.config.validate()?;
        params.validate()?;
        Ok(self.run(params))
    }

    /// Project after pulling every invalid input to its nearest valid value.
    /// Returns the corrections alongside the result.
    pub fn project_clamped(&self, params: &ParameterSet) -> Result<(ProjectionResult, Vec<ParameterIssue>)> {
        self.config.validate()?;
        let (clamped, issues) = params.clamped();
        Ok((self.run(&clamped), issues))
    }

    /// Simulate the construction year and every operating year
    fn run(&self, params: &ParameterSet) -> ProjectionResult {
        let horizon_years = self.config.horizon_years;
        let discount_rate = self.config.discount_basis.annual_rate(params);
        let curve = DiscountCurve::single_rate(discount_rate);
        let initial_cost = params.initial_cost_range();
        let schedules = loan_schedules(params);

        log::debug!(
            "projecting {} villas over {} years, initial cost {:.0}..{:.0}, discount {:.2}% ({})",
            params.villa_count,
            horizon_years,
            initial_cost.min,
            initial_cost.max,
            discount_rate * 100.0,
            self.config.discount_basis
        );

        let mut state = ProjectionState::after_construction(initial_cost, params.inflation_rate());
        let mut yearly = Vec::with_capacity(horizon_years as usize + 1);
        yearly.push(construction_row(initial_cost));

        for _year in 1..=horizon_years {
            state.advance_year();
            let row = self.calculate_year(params, &initial_cost, &curve, &schedules, &mut state);
            yearly.push(row);
        }

        let summary = SummaryMetrics::derive(params, &yearly, &self.config.irr);
        let first_year_net = yearly
            .get(1)
            .map(|row| Range::evaluate(|level| row.net_cash_flow_at(level)))
            .unwrap_or_default();
        let financing = FinancingSummary::from_schedules(params, &schedules, first_year_net);

        let mut result = ProjectionResult {
            horizon_years,
            discount_rate_pct: discount_rate * 100.0,
            summary,
            financing,
            subsidy: None,
            yearly,
        };
        result.subsidy = SubsidySummary::derive(params, &result, &self.config.irr);
        result
    }

    /// Cash flows of one operating year under both cost levels
    fn calculate_year(
        &self,
        params: &ParameterSet,
        initial_cost: &Range<f64>,
        curve: &DiscountCurve,
        schedules: &Range<LoanSchedule>,
        state: &mut ProjectionState,
    ) -> YearlyProjectionRow {
        let year = state.year;
        let mut row = YearlyProjectionRow::new(year);

        row.revenue = params.annual_revenue() * state.growth_factor;

        let operating_costs = Range::evaluate(|level| {
            annual_operating_cost(params, level, state.growth_factor, *initial_cost.at(level))
        });
        let net = Range::evaluate(|level| row.revenue - operating_costs.at(level));
        let cumulative = Range::evaluate(|level| state.accumulate(level, *net.at(level)));
        let discounted = net.map(|amount| curve.discount(amount, year));

        log::trace!(
            "year {}: revenue {:.0}, net {:.0}..{:.0}",
            year,
            row.revenue,
            net.max,
            net.min
        );

        // Costs are keyed by level; cash flows fall as costs rise
        row.operating_costs = operating_costs;
        row.net_cash_flow = net.swapped();
        row.cumulative_cash_flow = cumulative.swapped();
        row.discounted_cash_flow = discounted.swapped();
        row.debt_service = Range::evaluate(|level| schedules.at(level).annual_debt_service(year));

        row
    }
}

/// Year 0: the initial outflow, undiscounted
fn construction_row(initial_cost: Range<f64>) -> YearlyProjectionRow {
    let outflow = initial_cost.map(|cost| -cost).swapped();
    let mut row = YearlyProjectionRow::new(0);
    row.net_cash_flow = outflow;
    row.cumulative_cash_flow = outflow;
    row.discounted_cash_flow = outflow;
    row
}

/// Operating costs of one year. Running costs grow with `growth_factor`;
/// property tax is levied on the initial cost.
fn annual_operating_cost(params: &ParameterSet, level: CostLevel, growth_factor: f64, initial_cost: f64) -> f64 {
    let villas = params.villas();

    let operations = villas * MONTHS_PER_YEAR * params.operating_cost_per_villa_per_month.at(level);
    let per_night = params.occupied_nights() * (params.cleaning_cost_per_night + params.amenities_cost_per_night);
    let per_villa = villas * (params.maintenance_cost_per_year_per_villa + params.insurance_cost_per_year_per_villa);
    let property_tax = params.property_tax_rate() * initial_cost;

    (operations + per_night + per_villa) * growth_factor + property_tax
}
