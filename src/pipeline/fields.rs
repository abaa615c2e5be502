use thiserror::Error;

use super::types::RawFields;

/// Token index of the mpal value once `Razem` has been dropped.
pub const MPAL_INDEX: usize = 0;

/// Token index of the stop count once `Razem` has been dropped.
pub const STOPS_INDEX: usize = 5;

/// Which numeric field a token was meant to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Mpal,
    Stops,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mpal => "mpal",
            Self::Stops => "stops",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot parse {field} token {token:?} as {expected}")]
pub struct NumericError {
    pub field: Field,
    pub token: String,
    pub expected: &'static str,
}

/// Pull the raw mpal and stops tokens out of a data row.
///
/// Returns `None` when the row is too short to carry both.
pub fn extract_fields(tokens: &[String]) -> Option<RawFields> {
    let mpal = tokens.get(MPAL_INDEX)?;
    let stops = tokens.get(STOPS_INDEX)?;
    Some(RawFields {
        mpal: mpal.clone(),
        stops: stops.clone(),
    })
}

/// Replace the comma decimal separator used by the export.
pub fn normalize_decimal(token: &str) -> String {
    token.trim().replace(',', ".")
}

pub fn parse_mpal(token: &str) -> Result<f64, NumericError> {
    normalize_decimal(token)
        .parse::<f64>()
        .map_err(|_| NumericError {
            field: Field::Mpal,
            token: token.to_string(),
            expected: "a decimal number",
        })
}

/// Stop counts must be whole numbers; `"2,5"` is rejected, never truncated.
pub fn parse_stops(token: &str) -> Result<i64, NumericError> {
    normalize_decimal(token)
        .parse::<i64>()
        .map_err(|_| NumericError {
            field: Field::Stops,
            token: token.to_string(),
            expected: "an integer",
        })
}
