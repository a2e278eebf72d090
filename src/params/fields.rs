//! Field descriptors for the numeric inputs of a [`ParameterSet`]
//!
//! A form renders one numeric input per [`Field`], using the label, unit, default
//! value, step and bounds described here, and writes edits back with
//! [`ParameterSet::set`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ParameterSet;
use crate::error::FeasibilityError;

/// What kind of number a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Whole number (count or years)
    Integer,
    /// Size or currency amount
    Amount,
    /// Percentage
    Percent,
}

/// One numeric input of the parameter form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    VillaCount,
    VillaSizeSqm,
    NightlyRate,
    OccupancyRatePct,
    LandCostPerVilla,
    BuildCostPerSqmMin,
    BuildCostPerSqmMax,
    LandDevelopment,
    PublicArea,
    ReceptionBuilding,
    EventHall,
    Planning,
    Marketing,
    OperatingCostPerVillaPerMonthMin,
    OperatingCostPerVillaPerMonthMax,
    CleaningCostPerNight,
    AmenitiesCostPerNight,
    MaintenanceCostPerYearPerVilla,
    InsuranceCostPerYearPerVilla,
    PropertyTaxRatePct,
    InflationRatePct,
    DiscountRatePct,
    PrimeRatePct,
    AdditionalInterestRatePct,
    CapitalSubsidyPctMin,
    CapitalSubsidyPctMax,
    EquityAmount,
    LoanTermYears,
}

impl Field {
    /// Form order
    pub const ALL: [Field; 28] = [
        Field::VillaCount,
        Field::VillaSizeSqm,
        Field::NightlyRate,
        Field::OccupancyRatePct,
        Field::LandCostPerVilla,
        Field::BuildCostPerSqmMin,
        Field::BuildCostPerSqmMax,
        Field::LandDevelopment,
        Field::PublicArea,
        Field::ReceptionBuilding,
        Field::EventHall,
        Field::Planning,
        Field::Marketing,
        Field::OperatingCostPerVillaPerMonthMin,
        Field::OperatingCostPerVillaPerMonthMax,
        Field::CleaningCostPerNight,
        Field::AmenitiesCostPerNight,
        Field::MaintenanceCostPerYearPerVilla,
        Field::InsuranceCostPerYearPerVilla,
        Field::PropertyTaxRatePct,
        Field::InflationRatePct,
        Field::DiscountRatePct,
        Field::PrimeRatePct,
        Field::AdditionalInterestRatePct,
        Field::CapitalSubsidyPctMin,
        Field::CapitalSubsidyPctMax,
        Field::EquityAmount,
        Field::LoanTermYears,
    ];

    /// Snake-case key used in JSON, CSV headers and `--set key=value`
    pub fn key(&self) -> &'static str {
        match self {
            Field::VillaCount => "villa_count",
            Field::VillaSizeSqm => "villa_size_sqm",
            Field::NightlyRate => "nightly_rate",
            Field::OccupancyRatePct => "occupancy_rate_pct",
            Field::LandCostPerVilla => "land_cost_per_villa",
            Field::BuildCostPerSqmMin => "build_cost_per_sqm_min",
            Field::BuildCostPerSqmMax => "build_cost_per_sqm_max",
            Field::LandDevelopment => "land_development",
            Field::PublicArea => "public_area",
            Field::ReceptionBuilding => "reception_building",
            Field::EventHall => "event_hall",
            Field::Planning => "planning",
            Field::Marketing => "marketing",
            Field::OperatingCostPerVillaPerMonthMin => "operating_cost_per_villa_per_month_min",
            Field::OperatingCostPerVillaPerMonthMax => "operating_cost_per_villa_per_month_max",
            Field::CleaningCostPerNight => "cleaning_cost_per_night",
            Field::AmenitiesCostPerNight => "amenities_cost_per_night",
            Field::MaintenanceCostPerYearPerVilla => "maintenance_cost_per_year_per_villa",
            Field::InsuranceCostPerYearPerVilla => "insurance_cost_per_year_per_villa",
            Field::PropertyTaxRatePct => "property_tax_rate_pct",
            Field::InflationRatePct => "inflation_rate_pct",
            Field::DiscountRatePct => "discount_rate_pct",
            Field::PrimeRatePct => "prime_rate_pct",
            Field::AdditionalInterestRatePct => "additional_interest_rate_pct",
            Field::CapitalSubsidyPctMin => "capital_subsidy_pct_min",
            Field::CapitalSubsidyPctMax => "capital_subsidy_pct_max",
            Field::EquityAmount => "equity_amount",
            Field::LoanTermYears => "loan_term_years",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::VillaCount => "Number of villas",
            Field::VillaSizeSqm => "Villa size",
            Field::NightlyRate => "Price per night",
            Field::OccupancyRatePct => "Occupancy rate",
            Field::LandCostPerVilla => "Land cost per villa",
            Field::BuildCostPerSqmMin => "Minimum construction cost per m²",
            Field::BuildCostPerSqmMax => "Maximum construction cost per m²",
            Field::LandDevelopment => "Land development",
            Field::PublicArea => "Public area and parking",
            Field::ReceptionBuilding => "Reception and logistics building",
            Field::EventHall => "Small event hall",
            Field::Planning => "Planning and consultants",
            Field::Marketing => "Marketing",
            Field::OperatingCostPerVillaPerMonthMin => "Minimum monthly operating cost per villa",
            Field::OperatingCostPerVillaPerMonthMax => "Maximum monthly operating cost per villa",
            Field::CleaningCostPerNight => "Cleaning cost per night",
            Field::AmenitiesCostPerNight => "Amenities cost per night",
            Field::MaintenanceCostPerYearPerVilla => "Annual maintenance per villa",
            Field::InsuranceCostPerYearPerVilla => "Annual insurance per villa",
            Field::PropertyTaxRatePct => "Annual property tax rate",
            Field::InflationRatePct => "Annual inflation rate",
            Field::DiscountRatePct => "Discount rate",
            Field::PrimeRatePct => "Prime rate",
            Field::AdditionalInterestRatePct => "Interest above prime",
            Field::CapitalSubsidyPctMin => "Minimum capital subsidy",
            Field::CapitalSubsidyPctMax => "Maximum capital subsidy",
            Field::EquityAmount => "Equity",
            Field::LoanTermYears => "Loan term",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self.kind() {
            FieldKind::Percent => "%",
            FieldKind::Integer => match self {
                Field::LoanTermYears => "years",
                _ => "villas",
            },
            FieldKind::Amount => match self {
                Field::VillaSizeSqm => "m²",
                Field::NightlyRate | Field::CleaningCostPerNight | Field::AmenitiesCostPerNight => "currency/night",
                Field::BuildCostPerSqmMin | Field::BuildCostPerSqmMax => "currency/m²",
                Field::OperatingCostPerVillaPerMonthMin | Field::OperatingCostPerVillaPerMonthMax => "currency/villa/month",
                Field::MaintenanceCostPerYearPerVilla | Field::InsuranceCostPerYearPerVilla => "currency/villa/year",
                Field::LandCostPerVilla => "currency/villa",
                _ => "currency",
            },
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::VillaCount | Field::LoanTermYears => FieldKind::Integer,
            Field::OccupancyRatePct
            | Field::PropertyTaxRatePct
            | Field::InflationRatePct
            | Field::DiscountRatePct
            | Field::PrimeRatePct
            | Field::AdditionalInterestRatePct
            | Field::CapitalSubsidyPctMin
            | Field::CapitalSubsidyPctMax => FieldKind::Percent,
            _ => FieldKind::Amount,
        }
    }

    /// Input step: 0.1 for percentages, 1 otherwise
    pub fn step(&self) -> f64 {
        match self.kind() {
            FieldKind::Percent => 0.1,
            _ => 1.0,
        }
    }

    /// Smallest accepted value
    pub fn lower_bound(&self) -> f64 {
        match self {
            Field::VillaCount | Field::LoanTermYears => 1.0,
            _ => 0.0,
        }
    }

    /// Largest accepted value, if bounded
    pub fn upper_bound(&self) -> Option<f64> {
        match self {
            Field::LoanTermYears => Some(40.0),
            _ if self.kind() == FieldKind::Percent => Some(100.0),
            _ => None,
        }
    }

    /// Whether the lower bound itself is rejected (size must be strictly positive)
    pub fn lower_bound_exclusive(&self) -> bool {
        matches!(self, Field::VillaSizeSqm)
    }

    pub fn default_value(&self) -> f64 {
        ParameterSet::default().get(*self)
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.key() == key)
    }

    pub fn descriptor(&self) -> FieldDescriptor {
        FieldDescriptor {
            field: *self,
            key: self.key(),
            label: self.label(),
            unit: self.unit(),
            kind: self.kind(),
            default_value: self.default_value(),
            step: self.step(),
            lower_bound: self.lower_bound(),
            upper_bound: self.upper_bound(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Field {
    type Err = FeasibilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::from_key(s.trim()).ok_or_else(|| FeasibilityError::invalid_parameter(s, "unknown field"))
    }
}

/// Everything a form needs to render one input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub field: Field,
    pub key: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub kind: FieldKind,
    pub default_value: f64,
    pub step: f64,
    pub lower_bound: f64,
    pub upper_bound: Option<f64>,
}

/// Descriptors for every field, in form order
pub fn field_descriptors() -> Vec<FieldDescriptor> {
    Field::ALL.iter().map(Field::descriptor).collect()
}

impl ParameterSet {
    /// Current value of a field as a raw number
    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::VillaCount => self.villa_count as f64,
            Field::VillaSizeSqm => self.villa_size_sqm,
            Field::NightlyRate => self.nightly_rate,
            Field::OccupancyRatePct => self.occupancy_rate_pct,
            Field::LandCostPerVilla => self.land_cost_per_villa,
            Field::BuildCostPerSqmMin => self.build_cost_per_sqm.min,
            Field::BuildCostPerSqmMax => self.build_cost_per_sqm.max,
            Field::LandDevelopment => self.land_development,
            Field::PublicArea => self.public_area,
            Field::ReceptionBuilding => self.reception_building,
            Field::EventHall => self.event_hall,
            Field::Planning => self.planning,
            Field::Marketing => self.marketing,
            Field::OperatingCostPerVillaPerMonthMin => self.operating_cost_per_villa_per_month.min,
            Field::OperatingCostPerVillaPerMonthMax => self.operating_cost_per_villa_per_month.max,
            Field::CleaningCostPerNight => self.cleaning_cost_per_night,
            Field::AmenitiesCostPerNight => self.amenities_cost_per_night,
            Field::MaintenanceCostPerYearPerVilla => self.maintenance_cost_per_year_per_villa,
            Field::InsuranceCostPerYearPerVilla => self.insurance_cost_per_year_per_villa,
            Field::PropertyTaxRatePct => self.property_tax_rate_pct,
            Field::InflationRatePct => self.inflation_rate_pct,
            Field::DiscountRatePct => self.discount_rate_pct,
            Field::PrimeRatePct => self.prime_rate_pct,
            Field::AdditionalInterestRatePct => self.additional_interest_rate_pct,
            Field::CapitalSubsidyPctMin => self.capital_subsidy_pct.min,
            Field::CapitalSubsidyPctMax => self.capital_subsidy_pct.max,
            Field::EquityAmount => self.financing.equity_amount,
            Field::LoanTermYears => self.financing.loan_term_years as f64,
        }
    }

    /// Write a raw number into a field.
    ///
    /// Integer fields reject fractional, negative and non-finite input here since
    /// they cannot hold it; every other range check is left to validation.
    pub fn set(&mut self, field: Field, value: f64) -> Result<(), FeasibilityError> {
        match field {
            Field::VillaCount => self.villa_count = to_whole(field, value)?,
            Field::LoanTermYears => self.financing.loan_term_years = to_whole(field, value)?,
            _ => {
                if let Some(slot) = self.amount_slot(field) {
                    *slot = value;
                }
            }
        }
        Ok(())
    }

    fn amount_slot(&mut self, field: Field) -> Option<&mut f64> {
        let slot = match field {
            Field::VillaSizeSqm => &mut self.villa_size_sqm,
            Field::NightlyRate => &mut self.nightly_rate,
            Field::OccupancyRatePct => &mut self.occupancy_rate_pct,
            Field::LandCostPerVilla => &mut self.land_cost_per_villa,
            Field::BuildCostPerSqmMin => &mut self.build_cost_per_sqm.min,
            Field::BuildCostPerSqmMax => &mut self.build_cost_per_sqm.max,
            Field::LandDevelopment => &mut self.land_development,
            Field::PublicArea => &mut self.public_area,
            Field::ReceptionBuilding => &mut self.reception_building,
            Field::EventHall => &mut self.event_hall,
            Field::Planning => &mut self.planning,
            Field::Marketing => &mut self.marketing,
            Field::OperatingCostPerVillaPerMonthMin => &mut self.operating_cost_per_villa_per_month.min,
            Field::OperatingCostPerVillaPerMonthMax => &mut self.operating_cost_per_villa_per_month.max,
            Field::CleaningCostPerNight => &mut self.cleaning_cost_per_night,
            Field::AmenitiesCostPerNight => &mut self.amenities_cost_per_night,
            Field::MaintenanceCostPerYearPerVilla => &mut self.maintenance_cost_per_year_per_villa,
            Field::InsuranceCostPerYearPerVilla => &mut self.insurance_cost_per_year_per_villa,
            Field::PropertyTaxRatePct => &mut self.property_tax_rate_pct,
            Field::InflationRatePct => &mut self.inflation_rate_pct,
            Field::DiscountRatePct => &mut self.discount_rate_pct,
            Field::PrimeRatePct => &mut self.prime_rate_pct,
            Field::AdditionalInterestRatePct => &mut self.additional_interest_rate_pct,
            Field::CapitalSubsidyPctMin => &mut self.capital_subsidy_pct.min,
            Field::CapitalSubsidyPctMax => &mut self.capital_subsidy_pct.max,
            Field::EquityAmount => &mut self.financing.equity_amount,
            Field::VillaCount | Field::LoanTermYears => return None,
        };
        Some(slot)
    }
}

fn to_whole(field: Field, value: f64) -> Result<u32, FeasibilityError> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(FeasibilityError::invalid_parameter(
            field.key(),
            format!("must be a whole number, got {}", value),
        ));
    }
    Ok(value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_round_trip() {
        for field in Field::ALL {
            assert_eq!(Field::from_key(field.key()), Some(field));
            assert_eq!(field.key().parse::<Field>().unwrap(), field);
        }
        assert!("no_such_field".parse::<Field>().is_err());
    }

    #[test]
    fn test_steps() {
        assert_eq!(Field::OccupancyRatePct.step(), 0.1);
        assert_eq!(Field::PrimeRatePct.step(), 0.1);
        assert_eq!(Field::VillaCount.step(), 1.0);
        assert_eq!(Field::NightlyRate.step(), 1.0);
    }

    #[test]
    fn test_descriptor_defaults() {
        let descriptors = field_descriptors();
        assert_eq!(descriptors.len(), Field::ALL.len());

        let occupancy = Field::OccupancyRatePct.descriptor();
        assert_eq!(occupancy.default_value, 40.0);
        assert_eq!(occupancy.upper_bound, Some(100.0));
        assert_eq!(occupancy.unit, "%");

        assert_eq!(Field::BuildCostPerSqmMax.default_value(), 15_000.0);
        assert_eq!(Field::AdditionalInterestRatePct.default_value(), 1.0);
    }

    #[test]
    fn test_set_and_get() {
        let mut params = ParameterSet::default();
        for field in Field::ALL {
            let value = if field.kind() == FieldKind::Integer { 7.0 } else { 12.5 };
            params.set(field, value).unwrap();
            assert_eq!(params.get(field), value, "field {}", field);
        }
    }

    #[test]
    fn test_integer_fields_reject_fractions() {
        let mut params = ParameterSet::default();
        assert!(params.set(Field::VillaCount, 2.5).is_err());
        assert!(params.set(Field::VillaCount, -1.0).is_err());
        assert!(params.set(Field::LoanTermYears, f64::NAN).is_err());
        assert_eq!(params.villa_count, 10);
    }
}
