use crate::{Latitude, Longitude};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("`{0}` is not a decimal number")]
    NotANumber(String),

    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(Latitude),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(Longitude),
}

/// Parses a decimal written with either `.` or `,` as separator.
///
/// Anything carrying more than one separator or a digit-grouping character
/// (`"48,865 546 846"`, `"1.000,5"`) is refused rather than guessed at.
pub fn parse_decimal(text: &str) -> Result<f64, CoordinateError> {
    let markers = text.chars().filter(|c| matches!(c, '.' | ',')).count();
    if markers > 1 {
        return Err(CoordinateError::NotANumber(text.to_string()));
    }
    let value = text
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| CoordinateError::NotANumber(text.to_string()))?;
    if !value.is_finite() {
        return Err(CoordinateError::NotANumber(text.to_string()));
    }
    Ok(value)
}

/// Coerces a wire value (string or JSON number) to a float.
pub fn coerce(value: &Value) -> Result<f64, CoordinateError> {
    match value {
        Value::String(s) => parse_decimal(s),
        Value::Number(n) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| CoordinateError::NotANumber(n.to_string())),
        other => Err(CoordinateError::NotANumber(other.to_string())),
    }
}

pub fn check_range(lat: Latitude, lon: Longitude) -> Result<(), CoordinateError> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(CoordinateError::LatitudeOutOfRange(lat));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(CoordinateError::LongitudeOutOfRange(lon));
    }
    Ok(())
}
