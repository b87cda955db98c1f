use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationErrors;

use crate::core::error::FieldErrors;

lazy_static! {
    /// Regex for 24h clock times without seconds
    /// - Valid: "9:05", "09:05", "23:59", "0:00"
    /// - Invalid: "24:00", "9:5", "09:60", "9.05", " 09:05"
    pub static ref CLOCK_TIME_REGEX: Regex =
        Regex::new(r"^(([01]?[0-9])|(2[0-3])):[0-5][0-9]$").unwrap();
}

/// Flatten `validator` errors into one message per field.
///
/// The first error recorded for a field wins. Errors without a message fall
/// back to their code so the map never holds an empty message.
pub fn to_field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, field_errors)| {
            field_errors.first().map(|error| {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                (field.to_string(), message)
            })
        })
        .collect()
}
