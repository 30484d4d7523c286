//! Errors raised while coercing native values into expression trees.
use thiserror::Error;

/// Coarse classification of a [`CoerceError`].
///
/// - `Compile`: the input value is structurally invalid (too deep, bad keys).
/// - `Access`: the caller's object model breaks the snapshot contract.
/// - `Driver`: anything else the driver refuses to convert or encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Compile,
    Access,
    Driver,
}

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoerceError {
    #[error("recursion limit reached converting to an expression tree")]
    RecursionLimit,

    #[error("object keys can only be strings, found {found}")]
    NonStringKey { found: &'static str },

    #[error("{type_name} should be public to be converted")]
    NotPublic { type_name: String },

    #[error("make `{property}` of {type_name} an i64 instead of an i32")]
    NarrowInteger { type_name: String, property: String },

    #[error("can't convert {type_name} to an expression tree: {message}")]
    Snapshot { type_name: String, message: String },

    #[error("cannot convert {description} to a value expression")]
    NotAnExpr { description: String },

    #[error("invalid ISO 8601 timestamp: {input:?}")]
    InvalidTimestamp { input: String },

    #[error("cannot encode {what} as JSON")]
    Encode { what: String },
}

impl CoerceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoerceError::RecursionLimit | CoerceError::NonStringKey { .. } => ErrorKind::Compile,
            CoerceError::NotPublic { .. } | CoerceError::NarrowInteger { .. } => ErrorKind::Access,
            CoerceError::Snapshot { .. }
            | CoerceError::NotAnExpr { .. }
            | CoerceError::InvalidTimestamp { .. }
            | CoerceError::Encode { .. } => ErrorKind::Driver,
        }
    }

    pub fn is_compile(&self) -> bool {
        self.kind() == ErrorKind::Compile
    }

    pub fn is_access(&self) -> bool {
        self.kind() == ErrorKind::Access
    }

    pub fn is_driver(&self) -> bool {
        self.kind() == ErrorKind::Driver
    }
}

pub type Result<T, E = CoerceError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_variants() {
        assert_eq!(CoerceError::RecursionLimit.kind(), ErrorKind::Compile);
        assert!(CoerceError::NonStringKey { found: "integer" }.is_compile());
        assert!(CoerceError::NotPublic { type_name: "Secret".into() }.is_access());
        let narrow = CoerceError::NarrowInteger { type_name: "Player".into(), property: "level".into() };
        assert!(narrow.is_access());
        assert_eq!(narrow.to_string(), "make `level` of Player an i64 instead of an i32");
        assert!(CoerceError::NotAnExpr { description: "function".into() }.is_driver());
    }
}
