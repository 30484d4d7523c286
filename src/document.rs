//! Property snapshots of opaque domain objects.
//!
//! Anything the coercer does not recognise structurally is asked for a
//! [`Snapshot`]: a string-keyed map of its readable properties, which is then
//! coerced like any other map. Types opt in by implementing [`Document`];
//! serde types can use [`SerdeDocument`] instead of writing one by hand.
use std::fmt;

use indexmap::IndexMap;
use log::{debug, trace};
use serde::Serialize;
use serde_json::Value as Json;

use crate::error::{CoerceError, Result};
use crate::value::Value;

pub type Snapshot = IndexMap<String, Value>;

/// Failure raised by an accessor or a custom serializer.
pub type PropertyError = Box<dyn std::error::Error + Send + Sync>;

pub trait Document: Send + Sync {
    fn type_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Private types refuse to be snapshotted.
    fn is_public(&self) -> bool {
        true
    }

    /// Escape hatch: return `Some` to bypass property reads entirely.
    fn custom_serialize(&self) -> Option<Result<Snapshot, PropertyError>> {
        None
    }

    /// Readable properties, in declaration order.
    fn property_names(&self) -> Vec<&str>;

    /// Transient properties; their accessors are never called.
    fn excluded_fields(&self) -> &[&str] {
        &[]
    }

    fn read_property(&self, name: &str) -> Result<Value, PropertyError>;
}

impl fmt::Debug for dyn Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Document({})", self.type_name())
    }
}

/// Collect the property snapshot of `doc`.
pub fn snapshot(doc: &dyn Document) -> Result<Snapshot> {
    let type_name = doc.type_name();

    if let Some(custom) = doc.custom_serialize() {
        debug!("{type_name}: delegating to its custom serialization");
        return custom.map_err(|error| wrap(type_name, error));
    }

    if !doc.is_public() {
        return Err(CoerceError::NotPublic { type_name: type_name.to_owned() });
    }

    let excluded = doc.excluded_fields();
    let mut out = Snapshot::new();
    for name in doc.property_names() {
        if excluded.contains(&name) {
            trace!("{type_name}: skipping transient `{name}`");
            continue;
        }
        let value = doc.read_property(name).map_err(|error| wrap(type_name, error))?;
        if let Value::Int(_) = value {
            return Err(CoerceError::NarrowInteger {
                type_name: type_name.to_owned(),
                property: name.to_owned(),
            });
        }
        out.insert(name.to_owned(), value);
    }
    Ok(out)
}

fn wrap(type_name: &str, error: PropertyError) -> CoerceError {
    CoerceError::Snapshot { type_name: type_name.to_owned(), message: error.to_string() }
}

// ------------------------------ serde bridge ------------------------------ //

/// Snapshots `T` through its `Serialize` impl; `#[serde(skip)]` marks
/// transient fields.
#[derive(Debug, Clone)]
pub struct SerdeDocument<T> {
    inner: T,
}

impl<T: Serialize + Send + Sync> SerdeDocument<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Serialize + Send + Sync> Document for SerdeDocument<T> {
    fn type_name(&self) -> &str {
        std::any::type_name::<T>()
    }

    fn custom_serialize(&self) -> Option<Result<Snapshot, PropertyError>> {
        Some(serde_snapshot(&self.inner))
    }

    fn property_names(&self) -> Vec<&str> {
        Vec::new()
    }

    fn read_property(&self, name: &str) -> Result<Value, PropertyError> {
        Err(format!("no readable property `{name}`").into())
    }
}

fn serde_snapshot<T: Serialize>(inner: &T) -> Result<Snapshot, PropertyError> {
    match serde_json::to_value(inner)? {
        Json::Object(fields) => Ok(fields.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        other => Err(format!("expected it to serialize as an object, got `{other}`").into()),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
