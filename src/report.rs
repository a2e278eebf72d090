//! Report rendering: summary text, CSV exports and the JSON document
//!
//! - **Text**: every summary range, one per line, for a terminal or a log
//! - **CSV**: yearly rows and the monthly loan schedule
//! - **JSON**: inputs, config, summary, financing, subsidy, yearly rows and chart series

use std::fmt::Write as _;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{FeasibilityError, Result};
use crate::financing::{FinancingSummary, LoanSchedule};
use crate::params::ParameterSet;
use crate::projection::{
    ChartPoint, ProjectionConfig, ProjectionResult, SubsidySummary, SummaryMetrics, YearlyProjectionRow,
};
use crate::range::Range;
use crate::scenario::{ScenarioComparison, SweepPoint};

/// Shown in place of an undefined metric
const UNDEFINED: &str = "n/a";

/// Complete JSON report of one projection
#[derive(Debug, Clone, Serialize)]
pub struct FeasibilityReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub config: &'a ProjectionConfig,
    pub params: &'a ParameterSet,
    pub summary: &'a SummaryMetrics,
    pub financing: &'a FinancingSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subsidy: Option<&'a SubsidySummary>,
    pub discount_rate_pct: f64,
    pub yearly: &'a [YearlyProjectionRow],
    pub chart: Vec<ChartPoint>,
}

impl<'a> FeasibilityReport<'a> {
    pub fn new(params: &'a ParameterSet, config: &'a ProjectionConfig, result: &'a ProjectionResult) -> Self {
        Self {
            generated_at: Utc::now(),
            config,
            params,
            summary: &result.summary,
            financing: &result.financing,
            subsidy: result.subsidy.as_ref(),
            discount_rate_pct: result.discount_rate_pct,
            yearly: &result.yearly,
            chart: result.chart_series(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Whole-currency amount with thousands separators
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

fn amount_range(range: &Range<f64>) -> String {
    format!("{} - {}", format_amount(range.min), format_amount(range.max))
}

fn optional(value: Option<f64>, decimals: usize, suffix: &str) -> String {
    match value {
        Some(v) => format!("{:.*}{}", decimals, v, suffix),
        None => UNDEFINED.to_string(),
    }
}

fn optional_range(range: &Range<Option<f64>>, decimals: usize, suffix: &str) -> String {
    format!(
        "{} - {}",
        optional(range.min, decimals, suffix),
        optional(range.max, decimals, suffix)
    )
}

/// Summary lines for a terminal
pub fn render_summary(result: &ProjectionResult) -> String {
    let s = &result.summary;
    let f = &result.financing;
    let mut out = String::new();

    let _ = writeln!(out, "Horizon:            {} years, discounted at {:.2}%", result.horizon_years, result.discount_rate_pct);
    let _ = writeln!(out, "Initial cost:       {}", amount_range(&s.total_initial_cost));
    let _ = writeln!(out, "Annual revenue:     {}", format_amount(s.annual_revenue));
    let _ = writeln!(out, "Annual profit:      {}", amount_range(&s.annual_profit));
    let _ = writeln!(out, "ROI:                {}", optional_range(&s.roi_pct, 2, "%"));
    let _ = writeln!(out, "NPV:                {}", amount_range(&s.npv));
    let _ = writeln!(out, "IRR:                {}", optional_range(&s.irr_pct, 2, "%"));
    let _ = writeln!(out, "Payback:            {}", optional_range(&s.payback_years, 1, " years"));

    if f.has_debt() {
        let _ = writeln!(
            out,
            "Loan:               {} at {:.2}% over {} years ({})",
            amount_range(&f.loan_amount),
            f.interest_rate_pct,
            f.loan_term_years,
            f.repayment
        );
        let _ = writeln!(out, "Debt service yr 1:  {}", amount_range(&f.annual_debt_service_year1));
        let _ = writeln!(out, "Total interest:     {}", amount_range(&f.total_interest));
        let _ = writeln!(out, "DSCR yr 1:          {}", optional_range(&f.debt_service_coverage_year1, 2, "x"));
    } else {
        let _ = writeln!(out, "Loan:               none (equity covers the initial cost)");
    }

    if let Some(sub) = &result.subsidy {
        let _ = writeln!(
            out,
            "Capital subsidy:    {} ({:.1}% - {:.1}% of construction)",
            amount_range(&sub.grant),
            sub.subsidy_pct.min,
            sub.subsidy_pct.max
        );
        let _ = writeln!(out, "ROI w/ subsidy:     {}", optional_range(&sub.roi_pct, 2, "%"));
        let _ = writeln!(out, "NPV w/ subsidy:     {}", amount_range(&sub.npv));
        let _ = writeln!(out, "IRR w/ subsidy:     {}", optional_range(&sub.irr_pct, 2, "%"));
        let _ = writeln!(out, "Payback w/ subsidy: {}", optional_range(&sub.payback_years, 1, " years"));
    }

    out
}

/// Villa-count sweep as a fixed-width table
pub fn render_sweep(points: &[SweepPoint]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>6} {:>27} {:>21} {:>27} {:>21} {:>13}",
        "villas", "ROI %", "NPV (max cost)", "NPV", "IRR %", "verdict"
    );
    for p in points {
        let _ = writeln!(
            out,
            "{:>6} {:>27} {:>21} {:>27} {:>21} {:>13}",
            p.villa_count,
            optional_range(&p.roi_pct, 2, ""),
            format_amount(p.npv.min),
            amount_range(&p.npv),
            optional_range(&p.irr_pct, 2, ""),
            p.verdict
        );
    }
    out
}

/// Two scenarios side by side
pub fn render_comparison(comparison: &ScenarioComparison) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<20} {:>34} {:>34}",
        "metric", comparison.baseline.name, comparison.alternative.name
    );
    for row in comparison.rows() {
        let (decimals, suffix) = match row.metric {
            "roi_pct" | "irr_pct" => (2, "%"),
            "payback_years" => (1, ""),
            _ => (0, ""),
        };
        let cell = |range: &Range<Option<f64>>| {
            if decimals == 0 {
                format!(
                    "{} - {}",
                    range.min.map(format_amount).unwrap_or_else(|| UNDEFINED.to_string()),
                    range.max.map(format_amount).unwrap_or_else(|| UNDEFINED.to_string())
                )
            } else {
                optional_range(range, decimals, suffix)
            }
        };
        let _ = writeln!(out, "{:<20} {:>34} {:>34}", row.metric, cell(&row.baseline), cell(&row.alternative));
    }
    let _ = writeln!(
        out,
        "{:<20} {:>34} {:>34}",
        "verdict", comparison.baseline.verdict, comparison.alternative.verdict
    );
    let _ = writeln!(out, "NPV difference:      {}", amount_range(&comparison.npv_difference()));
    let _ = writeln!(out, "Preferred:           {}", comparison.preferred());
    out
}

/// Write one CSV row per projection year, year 0 first
pub fn write_yearly_csv<W: Write>(result: &ProjectionResult, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record([
        "year",
        "revenue",
        "operating_costs_min",
        "operating_costs_max",
        "net_cash_flow_min",
        "net_cash_flow_max",
        "cumulative_cash_flow_min",
        "cumulative_cash_flow_max",
        "discounted_cash_flow_min",
        "discounted_cash_flow_max",
        "debt_service_min",
        "debt_service_max",
    ])?;

    for row in &result.yearly {
        wtr.write_record([
            row.year.to_string(),
            format!("{:.2}", row.revenue),
            format!("{:.2}", row.operating_costs.min),
            format!("{:.2}", row.operating_costs.max),
            format!("{:.2}", row.net_cash_flow.min),
            format!("{:.2}", row.net_cash_flow.max),
            format!("{:.2}", row.cumulative_cash_flow.min),
            format!("{:.2}", row.cumulative_cash_flow.max),
            format!("{:.2}", row.discounted_cash_flow.min),
            format!("{:.2}", row.discounted_cash_flow.max),
            format!("{:.2}", row.debt_service.min),
            format!("{:.2}", row.debt_service.max),
        ])?;
    }

    wtr.flush().map_err(FeasibilityError::from)
}

/// Write one CSV row per monthly loan payment
pub fn write_schedule_csv<W: Write>(schedule: &LoanSchedule, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["payment", "year", "principal", "interest", "payment_amount", "balance"])?;

    for p in &schedule.payments {
        wtr.write_record([
            p.number.to_string(),
            ((p.number - 1) / 12 + 1).to_string(),
            format!("{:.2}", p.principal),
            format!("{:.2}", p.interest),
            format!("{:.2}", p.payment),
            format!("{:.2}", p.balance),
        ])?;
    }

    wtr.flush().map_err(FeasibilityError::from)
}

/// Yearly rows as a CSV string
pub fn yearly_csv(result: &ProjectionResult) -> Result<String> {
    let mut buf = Vec::new();
    write_yearly_csv(result, &mut buf)?;
    String::from_utf8(buf).map_err(|e| FeasibilityError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}
