//! AWS Lambda handler for feasibility projections
//!
//! Accepts `{ "params": {...}, "config": {...}, "clamp": bool }` (every key
//! optional) and returns the JSON report with the profitability verdict.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};

use villa_feasibility::params::ParameterIssue;
use villa_feasibility::report::FeasibilityReport;
use villa_feasibility::{ParameterSet, ProjectionConfig, ProjectionEngine, Verdict};

/// Input payload
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProjectionRequest {
    /// Project inputs; missing keys keep their defaults
    pub params: ParameterSet,

    /// Horizon, discount basis and IRR settings
    pub config: ProjectionConfig,

    /// Clamp invalid inputs instead of rejecting them
    pub clamp: bool,
}

/// Output payload
#[derive(Debug, Default, Serialize)]
pub struct ProjectionResponse {
    /// Full report, absent when the request was rejected
    pub report: Option<serde_json::Value>,
    pub verdict: Option<Verdict>,
    /// Inputs that were clamped (lenient mode) or rejected (strict mode)
    pub issues: Vec<ParameterIssue>,
    pub execution_time_ms: u64,
    pub error: Option<String>,
}

fn rejected(message: String, issues: Vec<ParameterIssue>, start: std::time::Instant) -> ProjectionResponse {
    ProjectionResponse {
        issues,
        execution_time_ms: start.elapsed().as_millis() as u64,
        error: Some(message),
        ..Default::default()
    }
}

/// Lambda handler function
async fn handler(event: LambdaEvent<ProjectionRequest>) -> Result<ProjectionResponse, Error> {
    let start = std::time::Instant::now();
    let request = event.payload;
    let engine = ProjectionEngine::new(request.config.clone());

    let (params, result, issues) = if request.clamp {
        let (clamped, issues) = request.params.clamped();
        match engine.project(&clamped) {
            Ok(result) => (clamped, result, issues),
            Err(e) => return Ok(rejected(e.to_string(), issues, start)),
        }
    } else {
        match engine.project(&request.params) {
            Ok(result) => (request.params, result, Vec::new()),
            Err(e) => return Ok(rejected(e.to_string(), request.params.issues(), start)),
        }
    };

    let verdict = Verdict::evaluate(&result);
    let report = FeasibilityReport::new(&params, &request.config, &result).to_value()?;
    log::info!(
        "projected {} villas over {} years: {} in {:?}",
        params.villa_count,
        result.horizon_years,
        verdict,
        start.elapsed()
    );

    Ok(ProjectionResponse {
        report: Some(report),
        verdict: Some(verdict),
        issues,
        execution_time_ms: start.elapsed().as_millis() as u64,
        error: None,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
