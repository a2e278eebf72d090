//! Debt financing of the initial capital cost
//!
//! The project cash flows stay unlevered. Financing only sizes a loan for the
//! part of the initial cost not covered by equity and reports its debt service.

mod loan;

pub use loan::{LoanPayment, LoanSchedule};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FeasibilityError;
use crate::params::ParameterSet;
use crate::range::Range;

/// How the loan principal is repaid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepaymentType {
    /// Constant monthly payment (Spitzer)
    #[default]
    Annuity,
    /// Constant principal plus interest on the outstanding balance
    EqualPrincipal,
    /// Interest only, principal repaid with the last payment
    Bullet,
}

impl RepaymentType {
    pub const ALL: [RepaymentType; 3] = [
        RepaymentType::Annuity,
        RepaymentType::EqualPrincipal,
        RepaymentType::Bullet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RepaymentType::Annuity => "annuity",
            RepaymentType::EqualPrincipal => "equal_principal",
            RepaymentType::Bullet => "bullet",
        }
    }
}

impl fmt::Display for RepaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepaymentType {
    type Err = FeasibilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "annuity" | "level" | "spitzer" => Ok(RepaymentType::Annuity),
            "equal_principal" | "linear" => Ok(RepaymentType::EqualPrincipal),
            "bullet" | "balloon" => Ok(RepaymentType::Bullet),
            other => Err(FeasibilityError::invalid_parameter(
                "repayment",
                format!("unknown repayment type '{}'", other),
            )),
        }
    }
}

/// Equity contribution and loan terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancingTerms {
    /// Own capital put into the project before borrowing
    pub equity_amount: f64,
    pub loan_term_years: u32,
    pub repayment: RepaymentType,
}

impl Default for FinancingTerms {
    fn default() -> Self {
        Self {
            equity_amount: 1_000_000.0,
            loan_term_years: 15,
            repayment: RepaymentType::Annuity,
        }
    }
}

impl FinancingTerms {
    /// Amount borrowed to cover an initial cost
    pub fn loan_amount(&self, initial_cost: f64) -> f64 {
        (initial_cost - self.equity_amount).max(0.0)
    }
}

/// Loan schedule under each cost level, keyed by level
pub fn loan_schedules(params: &ParameterSet) -> Range<LoanSchedule> {
    let terms = &params.financing;
    let rate = params.financing_rate();
    Range::evaluate(|level| {
        LoanSchedule::build(
            terms.loan_amount(params.total_initial_cost(level)),
            rate,
            terms.loan_term_years,
            terms.repayment,
        )
    })
}

/// Loan sizing and debt service of a projection.
///
/// Loan amount, debt service and interest grow with cost, so their ranges are
/// keyed by cost level. Coverage is a ratio of two cost-dependent amounts and is
/// ordered by value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FinancingSummary {
    pub equity_amount: f64,
    /// Annual borrowing rate, as a percentage
    pub interest_rate_pct: f64,
    pub loan_term_years: u32,
    pub repayment: RepaymentType,
    pub loan_amount: Range<f64>,
    pub annual_debt_service_year1: Range<f64>,
    pub total_interest: Range<f64>,
    /// Year-1 net cash flow over year-1 debt service; `None` without debt
    pub debt_service_coverage_year1: Range<Option<f64>>,
}

impl FinancingSummary {
    /// Summarise the loan schedules.
    ///
    /// `first_year_net` is the year-1 net cash flow keyed by cost level.
    pub fn from_schedules(params: &ParameterSet, schedules: &Range<LoanSchedule>, first_year_net: Range<f64>) -> Self {
        let debt_service = Range::evaluate(|level| schedules.at(level).annual_debt_service(1));

        let coverage = Range::evaluate(|level| {
            let service = *debt_service.at(level);
            (service > 0.0).then(|| first_year_net.at(level) / service)
        });

        Self {
            equity_amount: params.financing.equity_amount,
            interest_rate_pct: params.prime_rate_pct + params.additional_interest_rate_pct,
            loan_term_years: params.financing.loan_term_years,
            repayment: params.financing.repayment,
            loan_amount: Range::evaluate(|level| schedules.at(level).principal),
            annual_debt_service_year1: debt_service,
            total_interest: Range::evaluate(|level| schedules.at(level).total_interest()),
            debt_service_coverage_year1: coverage.ordered(),
        }
    }

    pub fn has_debt(&self) -> bool {
        self.loan_amount.max > 0.0
    }
}
