use std::fmt::{self, Display};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Largest integer an `f64` represents exactly.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// A point value, as configured or as awarded by the grading service.
///
/// Whole numbers display and serialize without a fractional part, so a
/// configured `10` round-trips as `10` rather than `10.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Points(pub f64);

impl Points {
    /// Returns the raw value.
    pub fn value(self) -> f64 {
        self.0
    }

    /// Returns the value as an integer when it has no fractional part and
    /// fits an `f64` exactly.
    pub fn as_whole(self) -> Option<i64> {
        (self.0.is_finite() && self.0.fract() == 0.0 && self.0.abs() <= MAX_EXACT_INT)
            .then_some(self.0 as i64)
    }
}

impl From<f64> for Points {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<i64> for Points {
    fn from(value: i64) -> Self {
        Self(value as f64)
    }
}

impl Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_whole() {
            Some(whole) => write!(f, "{whole}"),
            None => write!(f, "{}", self.0),
        }
    }
}

impl Serialize for Points {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_whole() {
            Some(whole) => serializer.serialize_i64(whole),
            None => serializer.serialize_f64(self.0),
        }
    }
}

impl<'de> Deserialize<'de> for Points {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Self)
    }
}
