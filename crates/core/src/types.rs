use std::fmt;

use serde::{Deserialize, Serialize};

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// A scalar arriving in a request payload.
///
/// Clients send identifiers and coordinates as JSON numbers or strings
/// depending on where they came from (a form input yields a string), so
/// comparison against a CSV cell is numeric whenever both sides parse as
/// numbers and textual otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric view of the value, if it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        }
    }

    /// Whether this value equals the raw text of a CSV cell.
    ///
    /// Integers compare exactly as `i64`; only non-integral values fall
    /// back to `f64`. Text that parses as a non-finite float (`NaN`,
    /// `inf`) stays text.
    pub fn matches_cell(&self, cell: &str) -> bool {
        let lhs = match self {
            Self::Int(i) => Scalar::Int(*i),
            Self::Float(f) => Scalar::from_float(*f),
            Self::Text(s) => Scalar::parse(s),
        };
        lhs == Scalar::parse(cell)
    }

    /// Text written into a CSV cell for this value.
    pub fn to_cell(&self) -> String {
        match self {
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.trim().to_string(),
        }
    }
}

/// Comparison form of a key value.
#[derive(Debug)]
enum Scalar<'a> {
    Int(i64),
    Float(f64),
    Text(&'a str),
}

impl<'a> Scalar<'a> {
    fn parse(raw: &'a str) -> Self {
        let raw = raw.trim();
        if let Ok(i) = raw.parse::<i64>() {
            return Self::Int(i);
        }
        match raw.parse::<f64>() {
            Ok(f) if f.is_finite() => Self::from_float(f),
            _ => Self::Text(raw),
        }
    }

    fn from_float(f: f64) -> Self {
        // Integral floats inside the exactly representable range compare as integers.
        const EXACT: f64 = 9_007_199_254_740_992.0;
        if f.fract() == 0.0 && f.abs() <= EXACT {
            Self::Int(f as i64)
        } else {
            Self::Float(f)
        }
    }
}

impl PartialEq for Scalar<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cell())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}
