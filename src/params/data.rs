//! Parameter set for a resort-villa project

use serde::{Deserialize, Serialize};

use crate::financing::FinancingTerms;
use crate::range::{CostLevel, Range};

/// Nights per year used for revenue and per-night costs
pub const NIGHTS_PER_YEAR: f64 = 365.0;

/// Months per year used for monthly operating costs
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// All project inputs. Rates are stored as percentages and exposed as fractions
/// through the accessor methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    // Counts and sizes
    pub villa_count: u32,
    /// Built area per villa [m²]
    pub villa_size_sqm: f64,

    // Revenue
    /// Nightly rate per villa [currency/night]
    pub nightly_rate: f64,
    /// Share of nights rented [0-100 %]
    pub occupancy_rate_pct: f64,

    // Capital costs
    pub land_cost_per_villa: f64,
    /// Construction cost per m², estimated as a range
    pub build_cost_per_sqm: Range<f64>,
    pub land_development: f64,
    /// Public area and parking
    pub public_area: f64,
    /// Reception and logistics building
    pub reception_building: f64,
    pub event_hall: f64,
    /// Planning and consultants
    pub planning: f64,
    pub marketing: f64,

    // Operating costs
    /// Monthly operating cost per villa, estimated as a range
    pub operating_cost_per_villa_per_month: Range<f64>,
    pub cleaning_cost_per_night: f64,
    pub amenities_cost_per_night: f64,
    pub maintenance_cost_per_year_per_villa: f64,
    pub insurance_cost_per_year_per_villa: f64,

    // Rates [%]
    pub property_tax_rate_pct: f64,
    pub inflation_rate_pct: f64,
    pub discount_rate_pct: f64,
    pub prime_rate_pct: f64,
    pub additional_interest_rate_pct: f64,
    /// Capital grant as a share of the villa construction cost [0-100 %].
    /// The optimistic (min-cost) case receives the upper end.
    pub capital_subsidy_pct: Range<f64>,

    /// Debt financing of the initial cost
    pub financing: FinancingTerms,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            villa_count: 10,
            villa_size_sqm: 200.0,
            nightly_rate: 3_500.0,
            occupancy_rate_pct: 40.0,
            land_cost_per_villa: 500_000.0,
            build_cost_per_sqm: Range::new(8_000.0, 15_000.0),
            land_development: 200_000.0,
            public_area: 1_000_000.0,
            reception_building: 700_000.0,
            event_hall: 700_000.0,
            planning: 150_000.0,
            marketing: 600_000.0,
            operating_cost_per_villa_per_month: Range::new(4_000.0, 9_500.0),
            cleaning_cost_per_night: 200.0,
            amenities_cost_per_night: 50.0,
            maintenance_cost_per_year_per_villa: 20_000.0,
            insurance_cost_per_year_per_villa: 5_000.0,
            property_tax_rate_pct: 1.0,
            inflation_rate_pct: 2.0,
            discount_rate_pct: 8.0,
            prime_rate_pct: 3.5,
            additional_interest_rate_pct: 1.0,
            capital_subsidy_pct: Range::point(0.0),
            financing: FinancingTerms::default(),
        }
    }
}

impl ParameterSet {
    /// Parameter set with every cost, rate and fixed amount at zero.
    /// Useful as a base for isolating a single effect.
    pub fn zeroed() -> Self {
        Self {
            villa_count: 1,
            villa_size_sqm: 1.0,
            nightly_rate: 0.0,
            occupancy_rate_pct: 0.0,
            land_cost_per_villa: 0.0,
            build_cost_per_sqm: Range::point(0.0),
            land_development: 0.0,
            public_area: 0.0,
            reception_building: 0.0,
            event_hall: 0.0,
            planning: 0.0,
            marketing: 0.0,
            operating_cost_per_villa_per_month: Range::point(0.0),
            cleaning_cost_per_night: 0.0,
            amenities_cost_per_night: 0.0,
            maintenance_cost_per_year_per_villa: 0.0,
            insurance_cost_per_year_per_villa: 0.0,
            property_tax_rate_pct: 0.0,
            inflation_rate_pct: 0.0,
            discount_rate_pct: 0.0,
            prime_rate_pct: 0.0,
            additional_interest_rate_pct: 0.0,
            capital_subsidy_pct: Range::point(0.0),
            financing: FinancingTerms::default(),
        }
    }

    pub fn villas(&self) -> f64 {
        self.villa_count as f64
    }

    pub fn occupancy_rate(&self) -> f64 {
        self.occupancy_rate_pct / 100.0
    }

    pub fn property_tax_rate(&self) -> f64 {
        self.property_tax_rate_pct / 100.0
    }

    pub fn inflation_rate(&self) -> f64 {
        self.inflation_rate_pct / 100.0
    }

    pub fn discount_rate(&self) -> f64 {
        self.discount_rate_pct / 100.0
    }

    /// Annual borrowing rate: prime plus the additional spread
    pub fn financing_rate(&self) -> f64 {
        (self.prime_rate_pct + self.additional_interest_rate_pct) / 100.0
    }

    /// One-time costs that do not scale with the number of villas
    pub fn fixed_one_time_costs(&self) -> f64 {
        self.land_development
            + self.public_area
            + self.reception_building
            + self.event_hall
            + self.planning
            + self.marketing
    }

    /// Building cost of the villas, land excluded
    pub fn construction_cost(&self, level: CostLevel) -> f64 {
        self.villas() * self.villa_size_sqm * self.build_cost_per_sqm.at(level)
    }

    /// Initial capital outlay under the given cost level
    pub fn total_initial_cost(&self, level: CostLevel) -> f64 {
        self.villas() * self.land_cost_per_villa + self.construction_cost(level) + self.fixed_one_time_costs()
    }

    pub fn has_capital_subsidy(&self) -> bool {
        self.capital_subsidy_pct.max > 0.0
    }

    /// Capital grant under a cost level. The pessimistic max-cost case is paired
    /// with the lower subsidy rate.
    pub fn capital_subsidy(&self, level: CostLevel) -> f64 {
        self.construction_cost(level) * self.capital_subsidy_pct.at(level.opposite()) / 100.0
    }

    pub fn initial_cost_range(&self) -> Range<f64> {
        Range::evaluate(|level| self.total_initial_cost(level))
    }

    /// Nominal first-year revenue
    pub fn annual_revenue(&self) -> f64 {
        self.villas() * self.nightly_rate * self.occupancy_rate() * NIGHTS_PER_YEAR
    }

    /// Occupied villa-nights per year
    pub fn occupied_nights(&self) -> f64 {
        self.villas() * NIGHTS_PER_YEAR * self.occupancy_rate()
    }
}
