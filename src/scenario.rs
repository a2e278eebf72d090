//! Scenario runner for batch projections, villa-count sweeps and comparisons
//!
//! Holds one projection config and applies it to many parameter sets. Batches
//! and sweeps run in parallel; each projection is independent.

use std::fmt;
use std::ops::RangeInclusive;

use rayon::prelude::*;
use serde::Serialize;

use crate::error::Result;
use crate::params::{NamedParameters, ParameterSet};
use crate::projection::{ProjectionConfig, ProjectionEngine, ProjectionResult};
use crate::range::Range;

/// Villa counts swept when no range is given
pub const DEFAULT_VILLA_SWEEP: RangeInclusive<u32> = 5..=40;

/// Overall judgement of a projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// NPV positive and IRR above the discount rate even at maximum cost
    Profitable,
    /// Only the minimum-cost case clears both hurdles
    Marginal,
    Unprofitable,
}

impl Verdict {
    pub fn evaluate(result: &ProjectionResult) -> Self {
        let summary = &result.summary;
        let hurdle = result.discount_rate_pct;
        let clears = |npv: f64, irr: Option<f64>| npv > 0.0 && irr.is_some_and(|irr| irr > hurdle);

        if clears(summary.npv.min, summary.irr_pct.min) {
            Verdict::Profitable
        } else if clears(summary.npv.max, summary.irr_pct.max) {
            Verdict::Marginal
        } else {
            Verdict::Unprofitable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Profitable => "profitable",
            Verdict::Marginal => "marginal",
            Verdict::Unprofitable => "unprofitable",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Projection of one named scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub params: ParameterSet,
    pub result: ProjectionResult,
    pub verdict: Verdict,
}

/// Headline metrics for one villa count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint {
    pub villa_count: u32,
    pub total_initial_cost: Range<f64>,
    pub annual_revenue: f64,
    pub roi_pct: Range<Option<f64>>,
    pub npv: Range<f64>,
    pub irr_pct: Range<Option<f64>>,
    pub payback_years: Range<Option<f64>>,
    pub verdict: Verdict,
}

impl SweepPoint {
    fn from_result(villa_count: u32, result: &ProjectionResult) -> Self {
        let summary = &result.summary;
        Self {
            villa_count,
            total_initial_cost: summary.total_initial_cost,
            annual_revenue: summary.annual_revenue,
            roi_pct: summary.roi_pct,
            npv: summary.npv,
            irr_pct: summary.irr_pct,
            payback_years: summary.payback_years,
            verdict: Verdict::evaluate(result),
        }
    }
}

/// One metric of two scenarios side by side
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub metric: &'static str,
    pub baseline: Range<Option<f64>>,
    pub alternative: Range<Option<f64>>,
}

/// Two scenarios projected under the same config
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioComparison {
    pub baseline: ScenarioOutcome,
    pub alternative: ScenarioOutcome,
}

fn some(range: Range<f64>) -> Range<Option<f64>> {
    range.map(Some)
}

impl ScenarioComparison {
    /// Metric table in display order
    pub fn rows(&self) -> Vec<ComparisonRow> {
        let a = &self.baseline.result.summary;
        let b = &self.alternative.result.summary;
        let row = |metric, baseline, alternative| ComparisonRow {
            metric,
            baseline,
            alternative,
        };

        vec![
            row("total_initial_cost", some(a.total_initial_cost), some(b.total_initial_cost)),
            row("annual_revenue", some(Range::point(a.annual_revenue)), some(Range::point(b.annual_revenue))),
            row("annual_profit", some(a.annual_profit), some(b.annual_profit)),
            row("roi_pct", a.roi_pct, b.roi_pct),
            row("npv", some(a.npv), some(b.npv)),
            row("irr_pct", a.irr_pct, b.irr_pct),
            row("payback_years", a.payback_years, b.payback_years),
        ]
    }

    /// Alternative NPV less baseline NPV, bound by bound
    pub fn npv_difference(&self) -> Range<f64> {
        let a = self.baseline.result.summary.npv;
        let b = self.alternative.result.summary.npv;
        b.zip(a).map(|(b, a)| b - a)
    }

    /// Name of the scenario with the higher pessimistic NPV
    pub fn preferred(&self) -> &str {
        if self.alternative.result.summary.npv.min > self.baseline.result.summary.npv.min {
            &self.alternative.name
        } else {
            &self.baseline.name
        }
    }
}

/// Runs projections for many parameter sets with one config
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(ProjectionConfig::with_horizon(20));
/// let sweep = runner.villa_sweep(&ParameterSet::default(), 5..=40)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    engine: ProjectionEngine,
}

impl ScenarioRunner {
    pub fn new(config: ProjectionConfig) -> Self {
        Self {
            engine: ProjectionEngine::new(config),
        }
    }

    pub fn config(&self) -> &ProjectionConfig {
        self.engine.config()
    }

    /// Run a single projection
    pub fn run(&self, params: &ParameterSet) -> Result<ProjectionResult> {
        self.engine.project(params)
    }

    /// Run projections for many parameter sets, in input order
    pub fn run_batch(&self, params: &[ParameterSet]) -> Vec<Result<ProjectionResult>> {
        params.par_iter().map(|p| self.engine.project(p)).collect()
    }

    /// Run named scenarios, failing on the first invalid one
    pub fn run_named(&self, scenarios: &[NamedParameters]) -> Result<Vec<ScenarioOutcome>> {
        scenarios.par_iter().map(|scenario| self.outcome(scenario)).collect()
    }

    /// Project the base parameters once for every villa count in `counts`
    pub fn villa_sweep(&self, base: &ParameterSet, counts: RangeInclusive<u32>) -> Result<Vec<SweepPoint>> {
        log::debug!("sweeping villa counts {}..={}", counts.start(), counts.end());

        counts
            .into_par_iter()
            .map(|villa_count| {
                let params = ParameterSet {
                    villa_count,
                    ..base.clone()
                };
                let result = self.engine.project(&params)?;
                Ok(SweepPoint::from_result(villa_count, &result))
            })
            .collect()
    }

    /// Project two scenarios side by side
    pub fn compare(&self, baseline: &NamedParameters, alternative: &NamedParameters) -> Result<ScenarioComparison> {
        let (baseline, alternative) = rayon::join(|| self.outcome(baseline), || self.outcome(alternative));
        Ok(ScenarioComparison {
            baseline: baseline?,
            alternative: alternative?,
        })
    }

    fn outcome(&self, scenario: &NamedParameters) -> Result<ScenarioOutcome> {
        let result = self.engine.project(&scenario.params)?;
        let verdict = Verdict::evaluate(&result);
        log::debug!("scenario '{}': {}", scenario.name, verdict);

        Ok(ScenarioOutcome {
            name: scenario.name.clone(),
            params: scenario.params.clone(),
            result,
            verdict,
        })
    }
}
