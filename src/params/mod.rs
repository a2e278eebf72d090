//! Project parameters: typed inputs, form descriptors, validation and loading

mod data;
mod fields;
mod validation;
pub mod loader;

pub use data::{ParameterSet, MONTHS_PER_YEAR, NIGHTS_PER_YEAR};
pub use fields::{field_descriptors, Field, FieldDescriptor, FieldKind};
pub use validation::{ParameterIssue, MIN_CLAMPED_VILLA_SIZE_SQM};
pub use loader::{apply_override, apply_overrides, load_params, load_scenarios, NamedParameters};
