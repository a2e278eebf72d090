//! Monthly loan amortisation schedules

use serde::{Deserialize, Serialize};

use super::RepaymentType;
use crate::projection::AnnuityCalculator;

/// Balances below this are treated as fully repaid
const BALANCE_EPSILON: f64 = 1e-6;

/// One monthly loan payment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanPayment {
    /// Payment number, 1-indexed
    pub number: u32,
    pub principal: f64,
    pub interest: f64,
    /// principal + interest
    pub payment: f64,
    /// Outstanding balance after this payment
    pub balance: f64,
}

/// Full repayment schedule of a loan
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LoanSchedule {
    pub principal: f64,
    pub annual_rate: f64,
    pub term_years: u32,
    pub payments: Vec<LoanPayment>,
}

impl LoanSchedule {
    /// Build the monthly schedule for a loan.
    ///
    /// A non-positive principal or a zero term yields an empty schedule.
    pub fn build(principal: f64, annual_rate: f64, term_years: u32, repayment: RepaymentType) -> Self {
        let mut schedule = Self {
            principal: principal.max(0.0),
            annual_rate,
            term_years,
            payments: Vec::new(),
        };
        if principal <= 0.0 || term_years == 0 {
            return schedule;
        }

        let monthly_rate = annual_rate / 12.0;
        let months = term_years * 12;
        let mut balance = principal;
        schedule.payments.reserve(months as usize);

        let level_payment = AnnuityCalculator::level_payment(principal, months, monthly_rate);
        let level_principal = principal / months as f64;

        for number in 1..=months {
            let interest = balance * monthly_rate;
            let is_last = number == months;

            let mut principal_part = match repayment {
                RepaymentType::Annuity => level_payment - interest,
                RepaymentType::EqualPrincipal => level_principal,
                RepaymentType::Bullet => {
                    if is_last {
                        balance
                    } else {
                        0.0
                    }
                }
            };

            // Absorb rounding drift so the loan closes exactly
            if is_last || principal_part > balance {
                principal_part = balance;
            }

            balance -= principal_part;
            if balance.abs() < BALANCE_EPSILON {
                balance = 0.0;
            }

            schedule.payments.push(LoanPayment {
                number,
                principal: principal_part,
                interest,
                payment: principal_part + interest,
                balance,
            });
        }

        schedule
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }

    /// Total paid during loan year `year` (1-indexed); zero outside the term
    pub fn annual_debt_service(&self, year: u32) -> f64 {
        if year == 0 {
            return 0.0;
        }
        let first = (year - 1) * 12 + 1;
        let last = year * 12;
        self.payments
            .iter()
            .filter(|p| p.number >= first && p.number <= last)
            .map(|p| p.payment)
            .sum()
    }

    pub fn total_interest(&self) -> f64 {
        self.payments.iter().map(|p| p.interest).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_annuity_schedule() {
        let schedule = LoanSchedule::build(100_000.0, 0.06, 1, RepaymentType::Annuity);
        assert_eq!(schedule.payments.len(), 12);

        let first = schedule.payments[0];
        assert_relative_eq!(first.interest, 500.0, epsilon = 1e-9);
        assert!((first.payment - 8_606.64).abs() < 0.01);

        // Level payments throughout, balance closes at zero
        for p in &schedule.payments {
            assert!((p.payment - first.payment).abs() < 1e-6);
        }
        assert_eq!(schedule.payments.last().unwrap().balance, 0.0);
        let principal: f64 = schedule.payments.iter().map(|p| p.principal).sum();
        assert_relative_eq!(principal, 100_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_equal_principal_schedule() {
        let schedule = LoanSchedule::build(120_000.0, 0.12, 1, RepaymentType::EqualPrincipal);
        assert_relative_eq!(schedule.payments[0].principal, 10_000.0, epsilon = 1e-9);
        assert_relative_eq!(schedule.payments[0].interest, 1_200.0, epsilon = 1e-9);
        assert_relative_eq!(schedule.payments[1].interest, 1_100.0, epsilon = 1e-9);
        assert_relative_eq!(schedule.payments[11].payment, 10_100.0, epsilon = 1e-9);
        assert_eq!(schedule.payments[11].balance, 0.0);
    }

    #[test]
    fn test_bullet_schedule() {
        let schedule = LoanSchedule::build(50_000.0, 0.06, 2, RepaymentType::Bullet);
        assert_eq!(schedule.payments.len(), 24);
        assert_relative_eq!(schedule.payments[0].payment, 250.0, epsilon = 1e-9);
        assert_relative_eq!(schedule.payments[22].balance, 50_000.0, epsilon = 1e-9);
        assert_relative_eq!(schedule.payments[23].payment, 50_250.0, epsilon = 1e-9);
        assert_relative_eq!(schedule.total_interest(), 6_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_rate_and_empty() {
        let schedule = LoanSchedule::build(24_000.0, 0.0, 2, RepaymentType::Annuity);
        assert_relative_eq!(schedule.annual_debt_service(1), 12_000.0, epsilon = 1e-9);
        assert_relative_eq!(schedule.annual_debt_service(2), 12_000.0, epsilon = 1e-9);
        assert_eq!(schedule.annual_debt_service(3), 0.0);
        assert_eq!(schedule.total_interest(), 0.0);

        assert!(LoanSchedule::build(0.0, 0.05, 10, RepaymentType::Annuity).is_empty());
        assert!(LoanSchedule::build(-5.0, 0.05, 10, RepaymentType::Bullet).is_empty());
    }
}
