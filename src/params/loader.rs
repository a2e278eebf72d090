//! Load parameter sets from JSON files, CSV scenario sheets and `key=value` overrides

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::Reader;

use super::{Field, ParameterSet};
use crate::error::{FeasibilityError, Result};
use crate::financing::RepaymentType;

/// Key for the repayment type, which is not numeric and so not a [`Field`]
pub const REPAYMENT_KEY: &str = "repayment";

/// Column holding the scenario name in a scenario sheet
pub const NAME_COLUMN: &str = "name";

/// A named parameter set, e.g. one row of a scenario sheet
#[derive(Debug, Clone, PartialEq)]
pub struct NamedParameters {
    pub name: String,
    pub params: ParameterSet,
}

/// Load a parameter set from a JSON file. Missing keys keep their defaults.
pub fn load_params<P: AsRef<Path>>(path: P) -> Result<ParameterSet> {
    let file = File::open(path)?;
    load_params_from_reader(BufReader::new(file))
}

/// Load a parameter set from any JSON reader
pub fn load_params_from_reader<R: Read>(reader: R) -> Result<ParameterSet> {
    Ok(serde_json::from_reader(reader)?)
}

/// Apply one `key=value` assignment
pub fn apply_override(params: &mut ParameterSet, assignment: &str) -> Result<()> {
    let (key, value) = assignment
        .split_once('=')
        .ok_or_else(|| FeasibilityError::invalid_parameter(assignment, "expected key=value"))?;
    apply_value(params, key.trim(), value.trim())
}

/// Apply several `key=value` assignments in order
pub fn apply_overrides<S: AsRef<str>>(params: &mut ParameterSet, assignments: &[S]) -> Result<()> {
    for assignment in assignments {
        apply_override(params, assignment.as_ref())?;
    }
    Ok(())
}

fn apply_value(params: &mut ParameterSet, key: &str, value: &str) -> Result<()> {
    if key == REPAYMENT_KEY {
        params.financing.repayment = value.parse::<RepaymentType>()?;
        return Ok(());
    }

    let field: Field = key.parse()?;
    let number: f64 = value
        .parse()
        .map_err(|_| FeasibilityError::invalid_parameter(key, format!("'{}' is not a number", value)))?;
    params.set(field, number)
}

/// Load scenarios from a CSV sheet.
///
/// Each row starts from `base`; every non-empty cell whose header is a field key
/// (or `repayment`) overrides it. A `name` column labels the row, otherwise rows
/// are named `scenario_<n>`.
pub fn load_scenarios<P: AsRef<Path>>(path: P, base: &ParameterSet) -> Result<Vec<NamedParameters>> {
    let reader = Reader::from_path(path)?;
    read_scenarios(reader, base)
}

/// Load scenarios from any CSV reader
pub fn load_scenarios_from_reader<R: Read>(reader: R, base: &ParameterSet) -> Result<Vec<NamedParameters>> {
    read_scenarios(Reader::from_reader(reader), base)
}

fn read_scenarios<R: Read>(mut reader: Reader<R>, base: &ParameterSet) -> Result<Vec<NamedParameters>> {
    let mut scenarios = Vec::new();

    for (index, result) in reader.deserialize().enumerate() {
        let row: HashMap<String, String> = result?;
        let mut params = base.clone();

        for (column, cell) in &row {
            let cell = cell.trim();
            if column == NAME_COLUMN || cell.is_empty() {
                continue;
            }
            apply_value(&mut params, column.trim(), cell)?;
        }

        let name = row
            .get(NAME_COLUMN)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("scenario_{}", index + 1));

        scenarios.push(NamedParameters { name, params });
    }

    Ok(scenarios)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        let mut params = ParameterSet::default();
        apply_overrides(
            &mut params,
            &["villa_count=12", "occupancy_rate_pct = 55.5", "repayment=bullet"],
        )
        .unwrap();

        assert_eq!(params.villa_count, 12);
        assert_eq!(params.occupancy_rate_pct, 55.5);
        assert_eq!(params.financing.repayment, RepaymentType::Bullet);
    }

    #[test]
    fn test_bad_overrides() {
        let mut params = ParameterSet::default();
        assert!(apply_override(&mut params, "villa_count").is_err());
        assert!(apply_override(&mut params, "unknown=1").is_err());
        assert!(apply_override(&mut params, "nightly_rate=cheap").is_err());
        assert!(apply_override(&mut params, "villa_count=1.5").is_err());
    }

    #[test]
    fn test_load_params_from_reader() {
        let json = r#"{"villa_count": 8, "build_cost_per_sqm": {"min": 9000, "max": 12000}}"#;
        let params = load_params_from_reader(json.as_bytes()).unwrap();
        assert_eq!(params.villa_count, 8);
        assert_eq!(params.build_cost_per_sqm.min, 9_000.0);
        assert_eq!(params.discount_rate_pct, 8.0);
    }

    #[test]
    fn test_load_scenarios_from_reader() {
        let sheet = "name,villa_count,occupancy_rate_pct,repayment\n\
                     small,10,40,\n\
                     large,20,,equal_principal\n\
                     ,30,50,annuity\n";
        let base = ParameterSet::default();
        let scenarios = load_scenarios_from_reader(sheet.as_bytes(), &base).unwrap();

        assert_eq!(scenarios.len(), 3);
        assert_eq!(scenarios[0].name, "small");
        assert_eq!(scenarios[1].params.villa_count, 20);
        assert_eq!(scenarios[1].params.occupancy_rate_pct, 40.0);
        assert_eq!(scenarios[1].params.financing.repayment, RepaymentType::EqualPrincipal);
        assert_eq!(scenarios[2].name, "scenario_3");
        assert_eq!(scenarios[2].params.occupancy_rate_pct, 50.0);
    }
}
