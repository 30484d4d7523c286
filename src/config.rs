//! Coercion options and the JSON file they can be loaded from.
//!
//! ```json
//! { "max_depth": 50, "depth_policy": "arrays_only", "naive_offset": "+02:00" }
//! ```
//! Every field is optional; missing ones keep their defaults.
use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::path_de::{PathError, from_slice_with_path, from_str_with_path};

pub const DEFAULT_MAX_DEPTH: u32 = 100;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Which nested containers spend recursion budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthPolicy {
    /// Arrays, maps and object snapshots all count.
    #[default]
    Uniform,
    /// Every map value starts over with the full budget; arrays and object
    /// snapshots still spend it.
    ArraysOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoerceOptions {
    pub max_depth: u32,
    pub depth_policy: DepthPolicy,
    /// Anchor for naive date/times; `None` uses the system's local zone.
    pub naive_offset: Option<FixedOffset>,
}

/// On-disk shape of [`CoerceOptions`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct OptionsFile {
    max_depth: Option<u32>,
    depth_policy: Option<DepthPolicy>,
    naive_offset: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },

    #[error(transparent)]
    Parse(#[from] PathError),

    #[error("max_depth must be at least 1")]
    ZeroDepth,

    #[error("naive_offset must look like Z, +HH:MM or +HHMM, got {0:?}")]
    BadOffset(String),
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Default for CoerceOptions {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH, depth_policy: DepthPolicy::Uniform, naive_offset: None }
    }
}

impl CoerceOptions {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_file(from_slice_with_path(&bytes)?)
    }

    pub fn from_json_str(src: &str) -> Result<Self, ConfigError> {
        Self::from_file(from_str_with_path(src)?)
    }

    fn from_file(file: OptionsFile) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let max_depth = file.max_depth.unwrap_or(defaults.max_depth);
        if max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        let naive_offset = match file.naive_offset {
            None => None,
            Some(raw) => Some(parse_offset(&raw).ok_or(ConfigError::BadOffset(raw))?),
        };
        Ok(Self {
            max_depth,
            depth_policy: file.depth_policy.unwrap_or(defaults.depth_policy),
            naive_offset,
        })
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_depth_policy(mut self, depth_policy: DepthPolicy) -> Self {
        self.depth_policy = depth_policy;
        self
    }

    pub fn with_naive_offset(mut self, offset: FixedOffset) -> Self {
        self.naive_offset = Some(offset);
        self
    }
}

static OFFSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(Z)|([+-])(\d{2}):?(\d{2}))$").expect("static regex")
});

/// Parse `Z`, `±HH:MM` or `±HHMM`.
pub fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let caps = OFFSET_RE.captures(raw.trim())?;
    if caps.get(1).is_some() {
        return FixedOffset::east_opt(0);
    }
    let hours: i32 = caps.get(3)?.as_str().parse().ok()?;
    let minutes: i32 = caps.get(4)?.as_str().parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    let secs = hours * 3600 + minutes * 60;
    match caps.get(2)?.as_str() {
        "-" => FixedOffset::west_opt(secs),
        _ => FixedOffset::east_opt(secs),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(CoerceOptions::from_json_str("{}").unwrap(), CoerceOptions::default());
        assert_eq!(CoerceOptions::default().max_depth, 100);
    }

    #[test]
    fn full_file() {
        let opts = CoerceOptions::from_json_str(
            r#"{"max_depth": 12, "depth_policy": "arrays_only", "naive_offset": "-05:30"}"#,
        ).unwrap();
        assert_eq!(opts.max_depth, 12);
        assert_eq!(opts.depth_policy, DepthPolicy::ArraysOnly);
        assert_eq!(opts.naive_offset, FixedOffset::west_opt(5 * 3600 + 30 * 60));
    }

    #[test]
    fn bad_fields_are_reported() {
        let err = CoerceOptions::from_json_str(r#"{"depth_policy": "sideways"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(ref e) if e.path == "depth_policy"));

        let err = CoerceOptions::from_json_str(r#"{"max_depth": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroDepth));

        let err = CoerceOptions::from_json_str(r#"{"naive_offset": "CEST"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::BadOffset(_)));

        assert!(CoerceOptions::from_json_str(r#"{"depth": 3}"#).is_err());
    }

    #[test]
    fn offsets() {
        assert_eq!(parse_offset("Z"), FixedOffset::east_opt(0));
        assert_eq!(parse_offset("+0200"), FixedOffset::east_opt(7200));
        assert_eq!(parse_offset("-05:30"), FixedOffset::west_opt(5 * 3600 + 30 * 60));
        assert_eq!(parse_offset("+02:75"), None);
        assert_eq!(parse_offset("+2:00"), None);
        assert_eq!(parse_offset("2:00"), None);
    }
}
