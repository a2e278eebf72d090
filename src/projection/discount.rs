//! Discounting for annual project cash flows
//!
//! Supports:
//! - A single annual discount rate (the hurdle rate by default)
//! - Present value of a year-indexed cash-flow series, year 0 undiscounted
//! - Level annuity payment for loan schedules

use serde::{Deserialize, Serialize};

/// Below this magnitude a periodic rate is treated as zero
const ZERO_RATE_EPSILON: f64 = 1e-12;

/// Annual discount curve with a single flat rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountCurve {
    /// Annual discount rate as a decimal (0.08 for 8%)
    pub annual_rate: f64,
}

impl DiscountCurve {
    pub fn single_rate(annual_rate: f64) -> Self {
        Self { annual_rate }
    }

    /// Discount factor from the end of `year` back to year 0
    pub fn discount_factor(&self, year: u32) -> f64 {
        (1.0 + self.annual_rate).powi(-(year as i32))
    }

    /// Present value of an amount received at the end of `year`
    pub fn discount(&self, amount: f64, year: u32) -> f64 {
        amount * self.discount_factor(year)
    }
}

/// NPV of `cashflows` (index = period) at a periodic `rate`
pub fn npv_at_rate(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// Helper functions for level-payment annuities
pub struct AnnuityCalculator;

impl AnnuityCalculator {
    /// Level payment that repays `principal` over `periods` at `periodic_rate`,
    /// payments at the end of each period
    pub fn level_payment(principal: f64, periods: u32, periodic_rate: f64) -> f64 {
        if periods == 0 {
            return principal;
        }
        if periodic_rate.abs() < ZERO_RATE_EPSILON {
            return principal / periods as f64;
        }

        principal * periodic_rate / (1.0 - (1.0 + periodic_rate).powi(-(periods as i32)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_discount_factors() {
        let curve = DiscountCurve::single_rate(0.08);
        assert_relative_eq!(curve.discount_factor(0), 1.0);
        assert_relative_eq!(curve.discount_factor(1), 1.0 / 1.08, epsilon = 1e-12);
        assert_relative_eq!(curve.discount_factor(10), 1.08_f64.powi(-10), epsilon = 1e-12);
    }

    #[test]
    fn test_npv_year_zero_undiscounted() {
        let npv = npv_at_rate(&[-1000.0, 1100.0], 0.10);
        assert_relative_eq!(npv, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_npv_zero_rate_is_plain_sum() {
        let flows = [-500.0, 100.0, 200.0, 300.0];
        assert_relative_eq!(npv_at_rate(&flows, 0.0), 100.0);
    }

    #[test]
    fn test_level_payment() {
        // 100k over 12 months at 6% annual
        let payment = AnnuityCalculator::level_payment(100_000.0, 12, 0.005);
        assert!((payment - 8_606.64).abs() < 0.01);

        // The payments discount back to the principal
        let mut flows = vec![-100_000.0];
        flows.extend(vec![payment; 12]);
        assert_relative_eq!(npv_at_rate(&flows, 0.005), 0.0, epsilon = 1e-6);

        assert_relative_eq!(AnnuityCalculator::level_payment(1_200.0, 12, 0.0), 100.0);
    }
}
