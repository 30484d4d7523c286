//! Value → expression-tree coercion.
//!
//! Dispatch order matters and is fixed:
//! 1. already a term (identity)
//! 2. arrays
//! 3. maps (string keys only)
//! 4. callbacks
//! 5. date/times
//! 6. scalars (`i32` keeps its own datum variant)
//! 7. opaque objects, through their property snapshot
//!
//! Every nested conversion spends one unit of a recursion budget; running out
//! is a compile error rather than a stack overflow on cyclic object graphs.
pub mod temporal;

use indexmap::IndexMap;
use log::{debug, trace};

use crate::ast::{Datum, Expr, Func, Iso8601, Term};
use crate::config::{CoerceOptions, DepthPolicy};
use crate::document;
use crate::error::{CoerceError, Result};
use crate::value::Value;

#[derive(Debug, Clone, Default)]
pub struct Coercer {
    options: CoerceOptions,
}

impl Coercer {
    pub fn new(options: CoerceOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CoerceOptions {
        &self.options
    }

    pub fn to_ast(&self, value: impl Into<Value>) -> Result<Term> {
        self.coerce(value.into(), self.options.max_depth)
    }

    /// Like [`Coercer::to_ast`], but the result must be usable as a value.
    pub fn to_expr(&self, value: impl Into<Value>) -> Result<Expr> {
        let value = value.into();
        let kind = value.kind_name();
        let term = self.to_ast(value)?;
        Expr::try_from(term).map_err(|_| CoerceError::NotAnExpr { description: format!("a {kind} value") })
    }

    fn coerce(&self, value: Value, remaining: u32) -> Result<Term> {
        if remaining == 0 {
            debug!("recursion budget exhausted at a {} value", value.kind_name());
            return Err(CoerceError::RecursionLimit);
        }
        trace!("coercing {} with {remaining} levels left", value.kind_name());

        match value {
            Value::Ast(term) => Ok(term),
            Value::Array(items) => {
                let items = items
                    .into_iter()
                    .map(|item| self.coerce(item, remaining - 1))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Term::MakeArray(items))
            }
            Value::Map(entries) => {
                let child = match self.options.depth_policy {
                    DepthPolicy::Uniform => remaining - 1,
                    DepthPolicy::ArraysOnly => self.options.max_depth,
                };
                self.coerce_map(entries, child)
            }
            Value::Lambda(lambda) => Ok(Term::Func(Func::from_lambda(&lambda))),
            Value::DateTime(dt) => {
                let stamp = temporal::format_timestamp(&dt, self.options.naive_offset);
                Ok(Term::Iso8601(Iso8601::from_string(stamp)?))
            }
            Value::Int(i) => Ok(Term::Datum(Datum::Int(i))),
            Value::Long(i) => Ok(Term::Datum(Datum::Long(i))),
            Value::Float(f) => Ok(Term::Datum(Datum::from(f))),
            Value::Bool(b) => Ok(Term::Datum(Datum::Bool(b))),
            Value::String(s) => Ok(Term::Datum(Datum::String(s))),
            Value::Null => Ok(Term::Datum(Datum::Null)),
            Value::Object(doc) => {
                let snapshot = document::snapshot(doc.as_ref())?;
                // snapshot fields spend budget under every policy, so cyclic objects still stop
                let remaining = remaining - 1;
                if remaining == 0 {
                    return Err(CoerceError::RecursionLimit);
                }
                let entries = snapshot.into_iter().map(|(k, v)| (Value::String(k), v)).collect();
                self.coerce_map(entries, remaining - 1)
            }
        }
    }

    /// `child` is the budget each value starts with.
    fn coerce_map(&self, entries: Vec<(Value, Value)>, child: u32) -> Result<Term> {
        let mut fields = IndexMap::with_capacity(entries.len());
        for (key, value) in entries {
            let Value::String(key) = key else {
                return Err(CoerceError::NonStringKey { found: key.kind_name() });
            };
            fields.insert(key, self.coerce(value, child)?);
        }
        Ok(Term::MakeObj(fields))
    }
}

/// Coerce with the default options (a budget of 100 levels).
pub fn to_ast(value: impl Into<Value>) -> Result<Term> {
    Coercer::default().to_ast(value)
}

/// Coerce with the default options, insisting on a value expression.
pub fn to_expr(value: impl Into<Value>) -> Result<Expr> {
    Coercer::default().to_expr(value)
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
