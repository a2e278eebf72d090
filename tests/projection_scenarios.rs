//! End-to-end projection scenarios through the public API

use approx::{assert_abs_diff_eq, assert_relative_eq};

use villa_feasibility::params::apply_overrides;
use villa_feasibility::params::loader::load_params_from_reader;
use villa_feasibility::projection::npv_at_rate;
use villa_feasibility::{
    CostLevel, FeasibilityError, FeasibilitySession, Field, ParameterSet, ProjectionConfig, ProjectionEngine, Range,
    RepaymentType,
};

fn project(params: &ParameterSet) -> villa_feasibility::ProjectionResult {
    ProjectionEngine::default().project(params).unwrap()
}

/// Reference project without fixed one-time costs
fn reference_project() -> ParameterSet {
    let mut params = ParameterSet::default();
    for field in [
        Field::LandDevelopment,
        Field::PublicArea,
        Field::ReceptionBuilding,
        Field::EventHall,
        Field::Planning,
        Field::Marketing,
    ] {
        params.set(field, 0.0).unwrap();
    }
    params
}

#[test]
fn reference_scenario_costs_and_revenue() {
    let summary = project(&reference_project()).summary;

    assert_relative_eq!(summary.total_initial_cost.min, 21_000_000.0);
    assert_relative_eq!(summary.total_initial_cost.max, 35_000_000.0);
    assert_relative_eq!(summary.annual_revenue, 5_110_000.0);
}

#[test]
fn zero_occupancy_has_no_payback() {
    let mut params = ParameterSet::default();
    params.occupancy_rate_pct = 0.0;
    let summary = project(&params).summary;

    assert_eq!(summary.annual_revenue, 0.0);
    assert!(summary.annual_profit.min < 0.0 && summary.annual_profit.max < 0.0);
    assert!(summary.roi_pct.min.unwrap() < 0.0 && summary.roi_pct.max.unwrap() < 0.0);
    assert_eq!(summary.payback_years, Range::new(None, None));
}

#[test]
fn loss_making_ratios_stay_ordered() {
    let mut params = ParameterSet::default();
    params.occupancy_rate_pct = 0.0;
    params.operating_cost_per_villa_per_month = Range::point(4_000.0);
    assert!(params.is_valid());

    let result = project(&params);
    let roi = result.summary.roi_pct;
    let coverage = result.financing.debt_service_coverage_year1;

    assert!(roi.min.unwrap() <= roi.max.unwrap(), "{:?}", roi);
    assert!(coverage.min.unwrap() <= coverage.max.unwrap(), "{:?}", coverage);
}

#[test]
fn npv_without_operating_costs_or_discounting() {
    let params = ParameterSet {
        operating_cost_per_villa_per_month: Range::point(0.0),
        cleaning_cost_per_night: 0.0,
        amenities_cost_per_night: 0.0,
        maintenance_cost_per_year_per_villa: 0.0,
        insurance_cost_per_year_per_villa: 0.0,
        property_tax_rate_pct: 0.0,
        inflation_rate_pct: 0.0,
        discount_rate_pct: 0.0,
        ..Default::default()
    };

    for horizon in [10, 15, 20] {
        let result = ProjectionEngine::new(ProjectionConfig::with_horizon(horizon))
            .project(&params)
            .unwrap();
        let s = &result.summary;
        let horizon = horizon as f64;

        assert_relative_eq!(s.npv.min, horizon * s.annual_profit.min - s.total_initial_cost.max);
        assert_relative_eq!(s.npv.max, horizon * s.annual_profit.max - s.total_initial_cost.min);
    }
}

#[test]
fn ranges_stay_ordered_across_inputs() {
    let edits: [&[&str]; 4] = [
        &[],
        &["villa_count=25", "nightly_rate=5000"],
        &["build_cost_per_sqm_min=12000", "build_cost_per_sqm_max=12000"],
        &["occupancy_rate_pct=75", "inflation_rate_pct=4.5", "discount_rate_pct=6"],
    ];

    for edit in edits {
        let mut params = ParameterSet::default();
        apply_overrides(&mut params, edit).unwrap();
        let s = project(&params).summary;

        assert!(s.total_initial_cost.min <= s.total_initial_cost.max, "{:?}", edit);
        assert!(s.annual_profit.min <= s.annual_profit.max, "{:?}", edit);
        assert!(s.roi_pct.min.unwrap() <= s.roi_pct.max.unwrap(), "{:?}", edit);
        assert!(s.npv.min <= s.npv.max, "{:?}", edit);
    }
}

#[test]
fn irr_and_payback_properties_hold() {
    let mut params = ParameterSet::default();
    params.occupancy_rate_pct = 60.0;
    let result = ProjectionEngine::new(ProjectionConfig::with_horizon(20))
        .project(&params)
        .unwrap();

    for level in CostLevel::ALL {
        let cashflows = result.net_cash_flows(level);
        let scale = cashflows.iter().fold(0.0_f64, |m, cf| m.max(cf.abs()));

        let irr = result.summary.irr_pct_at(level).expect("IRR defined");
        assert!(npv_at_rate(&cashflows, irr / 100.0).abs() <= 1e-6 * scale);

        let payback = result.summary.payback_years.at(level).expect("payback defined");
        let cumulative = result.cumulative_cash_flows(level);
        let whole = payback.floor() as usize;
        let crossing = cumulative[whole] + (payback - whole as f64) * cashflows.get(whole + 1).copied().unwrap_or(0.0);
        assert_abs_diff_eq!(crossing, 0.0, epsilon = 1e-3);
        assert!(cumulative[whole] < 0.0 || payback.fract() == 0.0);
    }
}

#[test]
fn financing_does_not_change_project_cash_flows() {
    let base = project(&ParameterSet::default());

    let mut bullet = ParameterSet::default();
    bullet.financing.repayment = RepaymentType::Bullet;
    bullet.financing.equity_amount = 10_000_000.0;
    let levered = project(&bullet);

    assert_eq!(base.summary, levered.summary);
    assert!(levered.financing.total_interest.min > base.financing.total_interest.min);
    assert!(levered.financing.loan_amount.max < base.financing.loan_amount.max);
}

#[test]
fn capital_subsidy_reported_beside_plain_metrics() {
    let mut params = ParameterSet::default();
    apply_overrides(&mut params, &["capital_subsidy_pct_min=20", "capital_subsidy_pct_max=30"]).unwrap();
    let result = project(&params);

    assert_eq!(result.summary, project(&ParameterSet::default()).summary);

    let subsidy = result.subsidy.expect("subsidy configured");
    assert_relative_eq!(subsidy.grant.min, 4_800_000.0);
    assert_relative_eq!(subsidy.grant.max, 6_000_000.0);
    assert!(subsidy.npv.min > result.summary.npv.min);
    assert!(subsidy.roi_pct.min.unwrap() <= subsidy.roi_pct.max.unwrap());
    assert!(subsidy.payback_years.max.unwrap() < result.summary.payback_years.max.unwrap());
}

#[test]
fn partial_json_and_invalid_input() {
    let json = r#"{ "villa_count": 12, "build_cost_per_sqm": { "min": 9000, "max": 8000 } }"#;
    let params = load_params_from_reader(json.as_bytes()).unwrap();
    assert_eq!(params.villa_count, 12);
    assert_eq!(params.nightly_rate, 3_500.0);

    match ProjectionEngine::default().project(&params) {
        Err(FeasibilityError::InvalidParameter { field, .. }) => assert_eq!(field, "build_cost_per_sqm_min"),
        other => panic!("expected InvalidParameter, got {:?}", other.map(|r| r.summary)),
    }

    let (result, issues) = ProjectionEngine::default().project_clamped(&params).unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(result.summary.total_initial_cost.min, result.summary.total_initial_cost.max);
}

#[test]
fn session_recomputes_fresh_results() {
    let mut session = FeasibilitySession::new(ParameterSet::default(), ProjectionConfig::default()).unwrap();
    let first = session.result().cloned().unwrap();

    session.set_field(Field::OccupancyRatePct, 55.0).unwrap();
    let second = session.result().unwrap();

    assert!(second.summary.npv.min > first.summary.npv.min);
    assert_relative_eq!(first.summary.annual_revenue, 5_110_000.0);
}
