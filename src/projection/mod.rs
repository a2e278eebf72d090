//! Projection engine for yearly project cash flows and investment metrics

mod state;
mod engine;
mod cashflows;
mod discount;
mod irr;
mod metrics;
mod subsidy;

pub use state::ProjectionState;
pub use engine::{DiscountBasis, ProjectionConfig, ProjectionEngine, DEFAULT_HORIZON_YEARS, MAX_HORIZON_YEARS};
pub use cashflows::{ChartPoint, ProjectionResult, YearlyProjectionRow};
pub use discount::{npv_at_rate, AnnuityCalculator, DiscountCurve};
pub use irr::{calculate_irr, calculate_irr_pct, IrrSettings};
pub use metrics::{payback_period, SummaryMetrics};
pub use subsidy::SubsidySummary;
