use serde::de::DeserializeOwned;
use thiserror::Error;

/// A deserialization failure together with where in the document it happened.
#[derive(Debug, Error)]
#[error("at JSON path {path} → {message}")]
pub struct PathError {
    pub path: String,
    pub message: String,
}

impl<E: std::fmt::Display> From<serde_path_to_error::Error<E>> for PathError {
    fn from(err: serde_path_to_error::Error<E>) -> Self {
        let path = err.path().to_string();
        Self { path, message: err.into_inner().to_string() }
    }
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, PathError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    Ok(serde_path_to_error::deserialize::<_, T>(de)?)
}

pub fn from_slice_with_path<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, PathError> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    Ok(serde_path_to_error::deserialize::<_, T>(de)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Outer {
        #[allow(dead_code)]
        inner: Vec<Inner>,
    }

    #[derive(Debug, Deserialize)]
    struct Inner {
        #[allow(dead_code)]
        depth: u32,
    }

    #[test]
    fn error_names_the_path() {
        let err = from_str_with_path::<Outer>(r#"{"inner": [{"depth": 1}, {"depth": "deep"}]}"#).unwrap_err();
        assert_eq!(err.path, "inner[1].depth");
        assert!(err.to_string().starts_with("at JSON path inner[1].depth"));
    }

    #[test]
    fn slices_decode_too() {
        let ok = from_slice_with_path::<Outer>(br#"{"inner": []}"#);
        assert!(ok.is_ok());
    }
}
