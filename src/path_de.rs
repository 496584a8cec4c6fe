use serde::de::DeserializeOwned;
use thiserror::Error;

/// A decode failure annotated with the JSON path of the offending node.
#[derive(Debug, Error)]
#[error("at JSON path {path} → {message}")]
pub struct PathError {
    pub path: String,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl PathError {
    fn from_tracked(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let path = err.path().to_string();
        let inner = err.into_inner();
        PathError {
            path,
            line: inner.line(),
            column: inner.column(),
            message: inner.to_string(),
        }
    }
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, PathError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(PathError::from_tracked)
}

pub fn from_slice_with_path<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, PathError> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize::<_, T>(de).map_err(PathError::from_tracked)
}
