//! Dynamic input values.
//!
//! Rust has no `Object` to dispatch on at runtime, so callers describe what
//! they want converted with [`Value`]. Most native types convert with `From`.
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value as Json;

use crate::ast::{Expr, Lambda, Term};
use crate::document::Document;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// A date/time value in one of the shapes chrono hands out.
#[derive(Debug, Clone, PartialEq)]
pub enum Temporal {
    /// No zone attached; anchored to a zone before formatting.
    Naive(NaiveDateTime),
    Local(DateTime<Local>),
    Utc(DateTime<Utc>),
    Offset(DateTime<FixedOffset>),
}

#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    /// Narrow integer; survives as `Datum::Int` but is refused as a property.
    Int(i32),
    Long(i64),
    Float(f64),
    String(String),
    DateTime(Temporal),
    Array(Vec<Value>),
    /// Keys are values so non-string keys can be represented, and rejected.
    Map(Vec<(Value, Value)>),
    Lambda(Lambda),
    /// Already an expression tree; passed through untouched.
    Ast(Term),
    /// Opaque structured object, converted through its property snapshot.
    Object(Arc<dyn Document>),
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Value {
    /// Short name of the variant, for error messages and logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "i32",
            Value::Long(_) => "i64",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::DateTime(_) => "date/time",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Lambda(_) => "function",
            Value::Ast(_) => "term",
            Value::Object(_) => "object",
        }
    }

    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<Value>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn object<D: Document + 'static>(doc: D) -> Self {
        Value::Object(Arc::new(doc))
    }

    /// Rewrite every string that parses as RFC 3339 into an offset date/time.
    pub fn with_parsed_dates(self) -> Self {
        match self {
            Value::String(s) => match DateTime::parse_from_rfc3339(&s) {
                Ok(dt) => Value::DateTime(Temporal::Offset(dt)),
                Err(_) => Value::String(s),
            },
            Value::Array(xs) => Value::Array(xs.into_iter().map(Value::with_parsed_dates).collect()),
            Value::Map(entries) => Value::Map(
                entries.into_iter().map(|(k, v)| (k, v.with_parsed_dates())).collect()
            ),
            other => other,
        }
    }
}

// -------------------------------- Scalars --------------------------------- //

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Long(i)
    }
}

macro_rules! widen_to_long {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(i: $t) -> Self {
                Value::Long(i64::from(i))
            }
        })*
    };
}

widen_to_long!(i8, i16, u8, u16, u32);

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        match i64::try_from(u) {
            Ok(i) => Value::Long(i),
            Err(_) => Value::Float(u as f64),
        }
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f64::from(f))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(o: Option<T>) -> Self {
        o.map_or(Value::Null, Into::into)
    }
}

// ------------------------------ Date / time ------------------------------- //

impl From<Temporal> for Value {
    fn from(t: Temporal) -> Self {
        Value::DateTime(t)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(Temporal::Naive(dt))
    }
}

impl From<DateTime<Local>> for Value {
    fn from(dt: DateTime<Local>) -> Self {
        Value::DateTime(Temporal::Local(dt))
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(Temporal::Utc(dt))
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Value::DateTime(Temporal::Offset(dt))
    }
}

// ------------------------------ Containers -------------------------------- //

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(xs: Vec<T>) -> Self {
        Value::Array(xs.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<Value>, V: Into<Value>> From<IndexMap<K, V>> for Value {
    fn from(m: IndexMap<K, V>) -> Self {
        Value::map(m)
    }
}

impl<K: Into<Value>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(m: BTreeMap<K, V>) -> Self {
        Value::map(m)
    }
}

impl<K: Into<Value>, V: Into<Value>, S> From<HashMap<K, V, S>> for Value {
    fn from(m: HashMap<K, V, S>) -> Self {
        Value::map(m)
    }
}

// ------------------------- Terms, callbacks, objects ----------------------- //

impl From<Term> for Value {
    fn from(t: Term) -> Self {
        Value::Ast(t)
    }
}

impl From<Expr> for Value {
    fn from(e: Expr) -> Self {
        Value::Ast(e.into_term())
    }
}

impl From<Lambda> for Value {
    fn from(l: Lambda) -> Self {
        Value::Lambda(l)
    }
}

impl<D: Document + 'static> From<Arc<D>> for Value {
    fn from(doc: Arc<D>) -> Self {
        Value::Object(doc)
    }
}

// --------------------------------- JSON ----------------------------------- //

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Long(i)
                } else if let Some(u) = n.as_u64() {
                    Value::from(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Json::String(s) => Value::String(s),
            Json::Array(xs) => Value::Array(xs.into_iter().map(Value::from).collect()),
            Json::Object(m) => Value::Map(
                m.into_iter().map(|(k, v)| (Value::String(k), Value::from(v))).collect()
            ),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
