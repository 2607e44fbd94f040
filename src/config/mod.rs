//! Config loading, schema, and validation.

pub mod settings;
pub mod validation;

pub use settings::{load_settings, load_settings_from, Settings};
pub use validation::{validate, ValidationResult};
