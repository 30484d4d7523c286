use ordered_float::OrderedFloat;
use serde_json::{Number, Value as Json};

use crate::error::{CoerceError, Result};

/// Leaf literal of an expression tree.
///
/// `Int` and `Long` are kept apart so a value that started out as an `i32`
/// can still be told from an `i64` after coercion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Datum {
    #[default]
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(OrderedFloat<f64>),
    String(String),
}

impl Datum {
    pub fn is_narrow(&self) -> bool {
        matches!(self, Datum::Int(_))
    }

    pub fn build(&self) -> Result<Json> {
        Ok(match self {
            Datum::Null => Json::Null,
            Datum::Bool(b) => Json::Bool(*b),
            Datum::Int(i) => Json::from(*i),
            Datum::Long(i) => Json::from(*i),
            Datum::Float(f) => match Number::from_f64(f.0) {
                Some(n) => Json::Number(n),
                None => return Err(CoerceError::Encode { what: format!("the float {}", f.0) }),
            },
            Datum::String(s) => Json::String(s.clone()),
        })
    }
}

impl From<i32> for Datum {
    fn from(value: i32) -> Self {
        Datum::Int(value)
    }
}

impl From<i64> for Datum {
    fn from(value: i64) -> Self {
        Datum::Long(value)
    }
}

impl From<f64> for Datum {
    fn from(value: f64) -> Self {
        Datum::Float(OrderedFloat(value))
    }
}

impl From<bool> for Datum {
    fn from(value: bool) -> Self {
        Datum::Bool(value)
    }
}

impl From<String> for Datum {
    fn from(value: String) -> Self {
        Datum::String(value)
    }
}

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Datum::String(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_and_wide_integers_stay_distinct() {
        let narrow = Datum::from(7i32);
        let wide = Datum::from(7i64);
        assert_ne!(narrow, wide);
        assert!(narrow.is_narrow());
        assert!(!wide.is_narrow());
        // same JSON on the wire
        assert_eq!(narrow.build().unwrap(), wide.build().unwrap());
    }

    #[test]
    fn non_finite_float_is_an_encode_error() {
        let err = Datum::from(f64::NAN).build().unwrap_err();
        assert!(err.is_driver());
        assert_eq!(Datum::from(1.5).build().unwrap(), serde_json::json!(1.5));
    }
}
