//! Convert native values into ReQL expression trees.
//!
//! ```
//! use reql_coerce::{Value, to_expr};
//!
//! let expr = to_expr(Value::map([("name", Value::from("kode")), ("money", Value::from(250i64))])).unwrap();
//! assert_eq!(expr.build().unwrap(), serde_json::json!([3, [], {"name": "kode", "money": 250}]));
//! ```
pub mod ast;
pub mod cli;
pub mod coerce;
pub mod config;
pub mod document;
pub mod error;
pub mod jq_exec;
pub mod path_de;
pub mod value;

pub use ast::{Datum, Expr, Func, Iso8601, Lambda, Term, TermType};
pub use coerce::{Coercer, to_ast, to_expr};
pub use config::{CoerceOptions, DepthPolicy};
pub use document::{Document, PropertyError, SerdeDocument, Snapshot};
pub use error::{CoerceError, ErrorKind};
pub use value::{Temporal, Value};
