//! Internal Rate of Return (IRR) calculation
//!
//! Solves NPV(r) = 0 for annual project cash flows with Newton-Raphson, falling
//! back to bisection over a wide bracket. Both stages are capped so the solver
//! always terminates.

use serde::{Deserialize, Serialize};

use super::discount::npv_at_rate;
use crate::error::{FeasibilityError, Result};

/// Flows smaller than this are treated as zero when looking for a sign change
const SIGN_EPSILON: f64 = 1e-10;

/// Root-finder settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IrrSettings {
    /// Newton step tolerance on the rate. Also scales the accepted NPV
    /// residual: a root must satisfy |NPV| <= tolerance * max|cash flow|.
    pub tolerance: f64,
    /// Iteration cap for each of the Newton and bisection stages
    pub max_iterations: u32,
    /// Lowest rate searched (-99%)
    pub lower_bound: f64,
    /// Highest rate searched (1000%)
    pub upper_bound: f64,
    /// Newton starting point
    pub initial_guess: f64,
}

impl Default for IrrSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-7,
            max_iterations: 100,
            lower_bound: -0.99,
            upper_bound: 10.0,
            initial_guess: 0.10,
        }
    }
}

/// Calculate the IRR of a series of annual cash flows.
///
/// # Arguments
/// * `cashflows` - Flow at the end of each year, index 0 = initial investment
///
/// # Returns
/// Annual IRR as a decimal (0.05 for 5%), or `NonConvergentIrr` when the flows
/// never change sign, no root is bracketed, or the iteration caps are hit.
pub fn calculate_irr(cashflows: &[f64], settings: &IrrSettings) -> Result<f64> {
    if cashflows.is_empty() {
        return Err(non_convergent("no cash flows"));
    }

    let has_positive = cashflows.iter().any(|&cf| cf > SIGN_EPSILON);
    let has_negative = cashflows.iter().any(|&cf| cf < -SIGN_EPSILON);
    if !has_positive || !has_negative {
        return Err(non_convergent("cash flows never change sign"));
    }

    let scale = cashflows.iter().fold(0.0_f64, |acc, cf| acc.max(cf.abs()));
    let residual_limit = settings.tolerance * scale;

    if let Some(rate) = newton_raphson(cashflows, settings, residual_limit) {
        return Ok(rate);
    }

    log::trace!("Newton-Raphson did not converge, falling back to bisection");
    bisection(cashflows, settings, residual_limit)
}

/// IRR as a percentage (8.5 for 8.5%)
pub fn calculate_irr_pct(cashflows: &[f64], settings: &IrrSettings) -> Result<f64> {
    calculate_irr(cashflows, settings).map(|r| r * 100.0)
}

fn newton_raphson(cashflows: &[f64], settings: &IrrSettings, residual_limit: f64) -> Option<f64> {
    let mut rate = settings.initial_guess;

    for iteration in 0..settings.max_iterations {
        let (npv, dnpv) = npv_and_derivative(cashflows, rate);

        if dnpv.abs() < 1e-20 || !dnpv.is_finite() {
            return None;
        }

        let new_rate = (rate - npv / dnpv).clamp(settings.lower_bound, settings.upper_bound);
        log::trace!("newton iteration {}: rate={:.10} npv={:.4}", iteration, new_rate, npv);

        if (new_rate - rate).abs() < settings.tolerance {
            let residual = npv_at_rate(cashflows, new_rate);
            return (residual.abs() <= residual_limit).then_some(new_rate);
        }

        rate = new_rate;
    }

    None
}

/// Calculate NPV and its derivative with respect to rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        npv += cf / (1.0 + rate).powi(t as i32);
        if t > 0 {
            dnpv -= (t as f64) * cf / (1.0 + rate).powi(t as i32 + 1);
        }
    }

    (npv, dnpv)
}

/// Fallback IRR calculation using bisection
fn bisection(cashflows: &[f64], settings: &IrrSettings, residual_limit: f64) -> Result<f64> {
    let mut low = settings.lower_bound;
    let mut high = settings.upper_bound;
    let mut npv_low = npv_at_rate(cashflows, low);
    let npv_high = npv_at_rate(cashflows, high);

    if npv_low * npv_high > 0.0 {
        return Err(non_convergent(format!(
            "no sign change in NPV between {:.0}% and {:.0}%",
            low * 100.0,
            high * 100.0
        )));
    }

    // Bisection halves the bracket each step, so it needs more steps than Newton
    let max_iterations = settings.max_iterations.saturating_mul(2);
    for _ in 0..max_iterations {
        let mid = (low + high) / 2.0;
        let npv_mid = npv_at_rate(cashflows, mid);

        if npv_mid.abs() <= residual_limit {
            return Ok(mid);
        }

        // The bracket can no longer shrink: NPV jumps across the root faster
        // than the residual allows
        if mid <= low || mid >= high {
            return Err(non_convergent(format!(
                "bracket collapsed at {:.6}% with NPV residual {:.4e}",
                mid * 100.0,
                npv_mid
            )));
        }

        if npv_mid * npv_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    Err(non_convergent(format!("bisection exceeded {} iterations", max_iterations)))
}

fn non_convergent(reason: impl Into<String>) -> FeasibilityError {
    FeasibilityError::NonConvergentIrr { reason: reason.into() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_simple_irr() {
        // Invest 1000, get 1100 back after one year
        let irr = calculate_irr(&[-1000.0, 1100.0], &IrrSettings::default()).unwrap();
        assert_abs_diff_eq!(irr, 0.10, epsilon = 1e-6);
    }

    #[test]
    fn test_level_cashflows() {
        // 10 years of 1627.45 on 10000 is ~10%
        let mut cashflows = vec![-10_000.0];
        cashflows.extend(vec![1_627.45; 10]);

        let irr = calculate_irr(&cashflows, &IrrSettings::default()).unwrap();
        assert_abs_diff_eq!(irr, 0.10, epsilon = 1e-4);
        assert_abs_diff_eq!(npv_at_rate(&cashflows, irr), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_negative_irr() {
        let irr = calculate_irr(&[-1000.0, 300.0, 300.0, 300.0], &IrrSettings::default()).unwrap();
        assert!(irr < 0.0);
        assert_abs_diff_eq!(npv_at_rate(&[-1000.0, 300.0, 300.0, 300.0], irr), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_no_sign_change() {
        let err = calculate_irr(&[-1000.0, -50.0, -50.0], &IrrSettings::default()).unwrap_err();
        assert!(matches!(err, FeasibilityError::NonConvergentIrr { .. }));

        assert!(calculate_irr(&[], &IrrSettings::default()).is_err());
        assert!(calculate_irr(&[0.0, 0.0], &IrrSettings::default()).is_err());
    }

    #[test]
    fn test_bisection_fallback() {
        let flows = [-1000.0, 1100.0];
        let irr = bisection(&flows, &IrrSettings::default(), 1e-7 * 1100.0).unwrap();
        assert_abs_diff_eq!(irr, 0.10, epsilon = 1e-5);

        // One Newton step from far away and two bisection steps cannot reach the root
        let capped = IrrSettings {
            initial_guess: 9.0,
            max_iterations: 1,
            ..IrrSettings::default()
        };
        match calculate_irr(&flows, &capped) {
            Err(FeasibilityError::NonConvergentIrr { reason }) => assert!(reason.contains("2 iterations"), "{}", reason),
            other => panic!("expected NonConvergentIrr, got {:?}", other),
        }
    }

    #[test]
    fn test_bisection_meets_residual_on_long_series() {
        // Fifteen years of income: NPV is steep in the rate, so a bracket narrower
        // than the rate tolerance is not yet a root
        let mut flows = vec![-24_350_000.0];
        flows.extend(vec![3_771_500.0; 15]);
        let scale = 24_350_000.0;
        let settings = IrrSettings::default();

        let irr = bisection(&flows, &settings, settings.tolerance * scale).unwrap();
        assert!(npv_at_rate(&flows, irr).abs() <= settings.tolerance * scale);
    }

    #[test]
    fn test_bisection_reports_collapsed_bracket() {
        // No residual passes a negative limit, so the bracket narrows to adjacent floats
        match bisection(&[-1000.0, 1100.0], &IrrSettings::default(), -1.0) {
            Err(FeasibilityError::NonConvergentIrr { reason }) => assert!(reason.contains("collapsed"), "{}", reason),
            other => panic!("expected NonConvergentIrr, got {:?}", other),
        }
    }

    #[test]
    fn test_irr_pct() {
        let pct = calculate_irr_pct(&[-1000.0, 1100.0], &IrrSettings::default()).unwrap();
        assert_abs_diff_eq!(pct, 10.0, epsilon = 1e-4);
    }
}
