use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Value as Json, json};

use super::{Term, TermType};
use crate::error::Result;

// Parameter ids are unique per process so nested functions never shadow each other.
static NEXT_VAR_ID: AtomicU64 = AtomicU64::new(1);

fn next_var_id() -> u64 {
    NEXT_VAR_ID.fetch_add(1, Ordering::Relaxed)
}

type LambdaBody = dyn Fn(Vec<Term>) -> Term + Send + Sync;

/// A native callback that builds a query fragment from its parameters.
///
/// Cloning a `Lambda` shares the callback; captured state is never copied.
#[derive(Clone)]
pub struct Lambda {
    arity: usize,
    body: Arc<LambdaBody>,
}

impl Lambda {
    pub fn unary<F>(f: F) -> Self
    where
        F: Fn(Term) -> Term + Send + Sync + 'static,
    {
        Self::with_arity(1, move |args| {
            let mut args = args.into_iter();
            f(args.next().unwrap_or_default())
        })
    }

    pub fn binary<F>(f: F) -> Self
    where
        F: Fn(Term, Term) -> Term + Send + Sync + 'static,
    {
        Self::with_arity(2, move |args| {
            let mut args = args.into_iter();
            let a = args.next().unwrap_or_default();
            let b = args.next().unwrap_or_default();
            f(a, b)
        })
    }

    /// `f` always receives exactly `arity` parameter terms.
    pub fn with_arity<F>(arity: usize, f: F) -> Self
    where
        F: Fn(Vec<Term>) -> Term + Send + Sync + 'static,
    {
        Self { arity, body: Arc::new(f) }
    }

    pub fn arity(&self) -> usize {
        self.arity
    }
}

impl fmt::Debug for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lambda").field("arity", &self.arity).finish_non_exhaustive()
    }
}

/// A callback rewritten into placeholder form: fresh variable ids plus the
/// body the callback produced when handed `Var` terms for those ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Func {
    params: Vec<u64>,
    body: Box<Term>,
}

impl Func {
    pub fn from_lambda(lambda: &Lambda) -> Self {
        let params: Vec<u64> = (0..lambda.arity).map(|_| next_var_id()).collect();
        let args: Vec<Term> = params.iter().map(|id| Term::Var(*id)).collect();
        let body = (lambda.body)(args);
        Self { params, body: Box::new(body) }
    }

    pub fn params(&self) -> &[u64] {
        &self.params
    }

    pub fn body(&self) -> &Term {
        &self.body
    }

    /// `[FUNC, [[MAKE_ARRAY, [ids…]], body]]`
    pub(crate) fn build(&self) -> Result<Json> {
        let ids = json!([TermType::MakeArray as u32, self.params]);
        let body = self.body.build()?;
        Ok(json!([TermType::Func as u32, [ids, body]]))
    }
}
