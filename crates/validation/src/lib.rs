pub mod date_range;
pub mod pattern;

pub use date_range::{validate_date_range, ValidationOutcome};
pub use pattern::is_valid_date_format;
