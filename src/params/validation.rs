//! Parameter validation and clamping
//!
//! Validation never panics: every problem is collected as a [`ParameterIssue`]
//! so a form can show all of them next to the offending inputs. Callers either
//! reject the set ([`ParameterSet::validate`]) or pull each value back to the
//! nearest valid one ([`ParameterSet::clamped`]).

use serde::Serialize;

use super::{Field, ParameterSet};
use crate::error::{FeasibilityError, Result};

/// Smallest villa size used when clamping a non-positive size
pub const MIN_CLAMPED_VILLA_SIZE_SQM: f64 = 1.0;

/// A single problem with one input field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterIssue {
    pub field: Field,
    pub message: String,
}

impl ParameterIssue {
    fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl From<ParameterIssue> for FeasibilityError {
    fn from(issue: ParameterIssue) -> Self {
        FeasibilityError::invalid_parameter(issue.field.key(), issue.message)
    }
}

/// Check one value against the bounds of its field
fn check_bounds(field: Field, value: f64) -> Option<ParameterIssue> {
    let lower = field.lower_bound();

    if !value.is_finite() {
        return Some(ParameterIssue::new(field, "must be a finite number"));
    }
    if field.lower_bound_exclusive() && value <= lower {
        return Some(ParameterIssue::new(field, format!("must be greater than {}, got {}", lower, value)));
    }
    if value < lower {
        return Some(ParameterIssue::new(field, format!("must be at least {}, got {}", lower, value)));
    }
    if let Some(upper) = field.upper_bound() {
        if value > upper {
            return Some(ParameterIssue::new(field, format!("must be at most {}, got {}", upper, value)));
        }
    }
    None
}

/// Nearest value inside the bounds of a field
fn clamp_to_bounds(field: Field, value: f64) -> f64 {
    let lower = field.lower_bound();
    let floor = if field.lower_bound_exclusive() {
        MIN_CLAMPED_VILLA_SIZE_SQM
    } else {
        lower
    };

    if !value.is_finite() {
        return floor;
    }
    if value < lower || (field.lower_bound_exclusive() && value <= lower) {
        return floor;
    }
    match field.upper_bound() {
        Some(upper) if value > upper => upper,
        _ => value,
    }
}

/// Min/max pairs that must satisfy `min <= max`
const RANGE_PAIRS: [(Field, Field); 3] = [
    (Field::BuildCostPerSqmMin, Field::BuildCostPerSqmMax),
    (Field::OperatingCostPerVillaPerMonthMin, Field::OperatingCostPerVillaPerMonthMax),
    (Field::CapitalSubsidyPctMin, Field::CapitalSubsidyPctMax),
];

impl ParameterSet {
    /// All problems with this parameter set, in form order
    pub fn issues(&self) -> Vec<ParameterIssue> {
        let mut issues: Vec<ParameterIssue> = Field::ALL
            .iter()
            .filter_map(|&field| check_bounds(field, self.get(field)))
            .collect();

        for (min_field, max_field) in RANGE_PAIRS {
            let (min, max) = (self.get(min_field), self.get(max_field));
            if min.is_finite() && max.is_finite() && min > max {
                issues.push(ParameterIssue::new(
                    min_field,
                    format!("minimum ({}) exceeds {} ({})", min, max_field.key(), max),
                ));
            }
        }

        issues
    }

    pub fn is_valid(&self) -> bool {
        self.issues().is_empty()
    }

    /// Reject the set if anything is out of range or inconsistent
    pub fn validate(&self) -> Result<()> {
        let mut issues = self.issues();
        if issues.is_empty() {
            return Ok(());
        }

        let remaining = issues.len() - 1;
        let mut first = issues.swap_remove(0);
        if remaining > 0 {
            first.message = format!("{} (and {} more issue(s))", first.message, remaining);
        }
        Err(first.into())
    }

    /// Copy with every invalid value pulled to the nearest valid one, plus the
    /// issues that were corrected
    pub fn clamped(&self) -> (ParameterSet, Vec<ParameterIssue>) {
        let issues = self.issues();
        let mut clamped = self.clone();

        for field in Field::ALL {
            let value = clamped.get(field);
            let fixed = clamp_to_bounds(field, value);
            if fixed != value {
                // Integer fields are whole by construction, so writing back cannot fail
                if clamped.set(field, fixed).is_err() {
                    log::warn!("could not clamp {} to {}", field, fixed);
                }
            }
        }

        for (min_field, max_field) in RANGE_PAIRS {
            let max = clamped.get(max_field);
            if clamped.get(min_field) > max {
                let _ = clamped.set(min_field, max);
            }
        }

        for issue in &issues {
            log::warn!("clamped {}: {}", issue.field, issue.message);
        }

        (clamped, issues)
    }
}
