//! Expression-tree nodes emitted by the coercer.
//!
//! A [`Term`] is the canonical form of a query fragment. Besides the node
//! types themselves this module knows how to encode a term into the JSON
//! wire form a ReQL server understands:
//!
//! - datum → plain JSON
//! - `[TERM_TYPE, [args…]]` for everything else
//! - `[MAKE_OBJ, [], {k: v…}]` for objects (keys travel as optargs)
pub mod datum;
pub mod func;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value as Json, json};

use crate::error::{CoerceError, Result};

pub use datum::Datum;
pub use func::{Func, Lambda};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Wire codes for the non-datum terms we emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TermType {
    MakeArray = 2,
    MakeObj = 3,
    Var = 10,
    Func = 69,
    Iso8601 = 99,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Datum(Datum),
    MakeArray(Vec<Term>),
    MakeObj(IndexMap<String, Term>),
    Func(Func),
    Iso8601(Iso8601),
    Var(u64),
}

/// A timestamp string already checked to look like ISO 8601.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Iso8601(String);

/// A term usable where a query expects a value.
///
/// Everything except a bare [`Func`] qualifies; functions only make sense
/// as arguments to other terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr(Term);

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

static ISO8601_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}(T\d{2}:\d{2}(:\d{2}(\.\d{1,9})?)?)?(Z|[+-]\d{2}(:?\d{2})?)?$")
        .expect("static regex")
});

impl Iso8601 {
    pub fn from_string(input: impl Into<String>) -> Result<Self> {
        let input = input.into();
        if ISO8601_RE.is_match(&input) {
            Ok(Self(input))
        } else {
            Err(CoerceError::InvalidTimestamp { input })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Term {
    fn default() -> Self {
        Term::Datum(Datum::Null)
    }
}

impl From<Datum> for Term {
    fn from(datum: Datum) -> Self {
        Term::Datum(datum)
    }
}

impl From<Func> for Term {
    fn from(func: Func) -> Self {
        Term::Func(func)
    }
}

impl From<Iso8601> for Term {
    fn from(ts: Iso8601) -> Self {
        Term::Iso8601(ts)
    }
}

impl Term {
    pub fn null() -> Self {
        Term::default()
    }

    /// `None` for datums, which are sent as plain JSON.
    pub fn term_type(&self) -> Option<TermType> {
        match self {
            Term::Datum(_) => None,
            Term::MakeArray(_) => Some(TermType::MakeArray),
            Term::MakeObj(_) => Some(TermType::MakeObj),
            Term::Func(_) => Some(TermType::Func),
            Term::Iso8601(_) => Some(TermType::Iso8601),
            Term::Var(_) => Some(TermType::Var),
        }
    }

    pub fn is_expr(&self) -> bool {
        !matches!(self, Term::Func(_))
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Term::Datum(_) => "datum",
            Term::MakeArray(_) => "array",
            Term::MakeObj(_) => "object",
            Term::Func(_) => "function",
            Term::Iso8601(_) => "timestamp",
            Term::Var(_) => "variable",
        }
    }

    pub fn as_datum(&self) -> Option<&Datum> {
        match self {
            Term::Datum(d) => Some(d),
            _ => None,
        }
    }

    /// Encode into the JSON wire form.
    pub fn build(&self) -> Result<Json> {
        match self {
            Term::Datum(d) => d.build(),
            Term::MakeArray(items) => {
                let args = items.iter().map(Term::build).collect::<Result<Vec<_>>>()?;
                Ok(json!([TermType::MakeArray as u32, args]))
            }
            Term::MakeObj(fields) => {
                let mut optargs = Map::with_capacity(fields.len());
                for (key, value) in fields {
                    optargs.insert(key.clone(), value.build()?);
                }
                Ok(json!([TermType::MakeObj as u32, [], optargs]))
            }
            Term::Func(f) => f.build(),
            Term::Iso8601(ts) => Ok(json!([TermType::Iso8601 as u32, [ts.as_str()]])),
            Term::Var(id) => Ok(json!([TermType::Var as u32, [id]])),
        }
    }
}

impl Expr {
    pub fn as_term(&self) -> &Term {
        &self.0
    }

    pub fn into_term(self) -> Term {
        self.0
    }

    pub fn build(&self) -> Result<Json> {
        self.0.build()
    }
}

impl TryFrom<Term> for Expr {
    type Error = CoerceError;

    fn try_from(term: Term) -> Result<Self> {
        if term.is_expr() {
            Ok(Expr(term))
        } else {
            Err(CoerceError::NotAnExpr { description: format!("a bare {}", term.describe()) })
        }
    }
}

impl From<Expr> for Term {
    fn from(expr: Expr) -> Self {
        expr.0
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_form_of_containers() {
        let mut fields = IndexMap::new();
        fields.insert("b".to_string(), Term::from(Datum::from(true)));
        fields.insert("a".to_string(), Term::MakeArray(vec![Term::from(Datum::from(1i64)), Term::null()]));
        let obj = Term::MakeObj(fields);
        assert_eq!(obj.build().unwrap(), json!([3, [], {"b": true, "a": [2, [1, null]]}]));
        // insertion order survives encoding
        let text = serde_json::to_string(&obj.build().unwrap()).unwrap();
        assert!(text.find("\"b\"").unwrap() < text.find("\"a\"").unwrap());
    }

    #[test]
    fn wire_form_of_timestamp_and_var() {
        let ts = Iso8601::from_string("2021-06-15T10:30:00.000+02:00").unwrap();
        assert_eq!(Term::from(ts).build().unwrap(), json!([99, ["2021-06-15T10:30:00.000+02:00"]]));
        assert_eq!(Term::Var(4).build().unwrap(), json!([10, [4]]));
    }

    #[test]
    fn iso8601_rejects_garbage() {
        assert!(Iso8601::from_string("2021-06-15").is_ok());
        assert!(Iso8601::from_string("2021-06-15T10:30:00Z").is_ok());
        let err = Iso8601::from_string("June 15th").unwrap_err();
        assert!(err.is_driver());
    }

    #[test]
    fn functions_are_not_exprs() {
        let func = Term::from(Func::from_lambda(&Lambda::unary(|x| x)));
        let err = Expr::try_from(func).unwrap_err();
        assert!(err.is_driver());
        let expr = Expr::try_from(Term::from(Datum::from("ok"))).unwrap();
        assert_eq!(expr.as_term().as_datum(), Some(&Datum::from("ok")));
    }
}
