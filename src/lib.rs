//! Villa Feasibility - financial projection engine for resort-villa projects
//!
//! This library provides:
//! - Typed, validated project parameters with form descriptors
//! - Yearly cash-flow projection under low/high cost assumptions
//! - Investment metrics (ROI, NPV, IRR, payback), debt financing and capital subsidy
//! - Batch runs, villa-count sweeps and scenario comparison
//! - A reactive session and text/CSV/JSON reports

pub mod error;
pub mod range;
pub mod params;
pub mod financing;
pub mod projection;
pub mod scenario;
pub mod session;
pub mod report;

// Re-export commonly used types
pub use error::{FeasibilityError, Result};
pub use range::{CostLevel, Range};
pub use params::{Field, ParameterIssue, ParameterSet};
pub use financing::{FinancingSummary, FinancingTerms, LoanSchedule, RepaymentType};
pub use projection::{
    DiscountBasis, ProjectionConfig, ProjectionEngine, ProjectionResult, SubsidySummary, SummaryMetrics,
    YearlyProjectionRow,
};
pub use scenario::{ScenarioComparison, ScenarioRunner, Verdict};
pub use session::FeasibilitySession;
