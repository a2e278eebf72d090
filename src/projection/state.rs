//! Running state carried from one projection year to the next

use crate::range::{CostLevel, Range};

/// State of the project at the end of a simulated year.
/// Ranges here are keyed by cost level, not ordered by value.
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Current projection year (0 = construction)
    pub year: u32,

    /// Cumulative price growth since year 1: (1 + inflation)^(year - 1)
    pub growth_factor: f64,

    /// Annual inflation as a decimal
    inflation_rate: f64,

    /// Cumulative net cash flow per cost level
    pub cumulative: Range<f64>,
}

impl ProjectionState {
    /// State after the construction year, with the initial outflow booked
    pub fn after_construction(initial_cost: Range<f64>, inflation_rate: f64) -> Self {
        Self {
            year: 0,
            growth_factor: 1.0,
            inflation_rate,
            cumulative: initial_cost.map(|c| -c),
        }
    }

    /// Advance to the next operating year
    pub fn advance_year(&mut self) {
        self.year += 1;

        // Year 1 is nominal; prices grow from year 2 onwards
        if self.year > 1 {
            self.growth_factor *= 1.0 + self.inflation_rate;
        }
    }

    /// Book the net cash flow of the current year and return the new cumulative total
    pub fn accumulate(&mut self, level: CostLevel, net_cash_flow: f64) -> f64 {
        let total = self.cumulative.at_mut(level);
        *total += net_cash_flow;
        *total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_growth_factor_starts_at_year_two() {
        let mut state = ProjectionState::after_construction(Range::new(100.0, 200.0), 0.02);
        assert_eq!(state.cumulative, Range::new(-100.0, -200.0));

        state.advance_year();
        assert_eq!(state.year, 1);
        assert_relative_eq!(state.growth_factor, 1.0);

        state.advance_year();
        state.advance_year();
        assert_eq!(state.year, 3);
        assert_relative_eq!(state.growth_factor, 1.02_f64.powi(2));
    }

    #[test]
    fn test_accumulate_per_level() {
        let mut state = ProjectionState::after_construction(Range::new(100.0, 200.0), 0.0);
        assert_relative_eq!(state.accumulate(CostLevel::Min, 60.0), -40.0);
        assert_relative_eq!(state.accumulate(CostLevel::Max, 60.0), -140.0);
        assert_relative_eq!(state.accumulate(CostLevel::Min, 60.0), 20.0);
    }
}
