//! Reading and writing Parcel's JSON files.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Error type for serialization operations.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// The value could not be encoded.
    #[error("cannot encode JSON: {0}")]
    Encode(#[source] serde_json::Error),

    /// The input is not valid JSON for the target type.
    #[error("invalid JSON at line {line}, column {column}: {source}")]
    Decode {
        /// 1-based line of the failure.
        line: usize,
        /// 1-based column of the failure.
        column: usize,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },
}

impl SerializationError {
    fn decode(source: serde_json::Error) -> Self {
        Self::Decode {
            line: source.line(),
            column: source.column(),
            source,
        }
    }
}

/// Encodes `value` the way Parcel writes files: two-space indentation and a
/// final newline. Key order follows field declaration order.
///
/// # Errors
///
/// Returns [`SerializationError::Encode`] if `value` cannot be represented
/// as JSON, e.g. a map with non-string keys.
pub fn to_json_stable<T: Serialize>(value: &T) -> Result<String, SerializationError> {
    let mut json = serde_json::to_string_pretty(value).map_err(SerializationError::Encode)?;
    json.push('\n');
    Ok(json)
}

/// Byte form of [`to_json_stable`], for writers that take raw bytes.
///
/// # Errors
///
/// See [`to_json_stable`].
pub fn to_json_stable_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    let mut bytes = serde_json::to_vec_pretty(value).map_err(SerializationError::Encode)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Decodes a file's text; indentation and key order do not matter.
///
/// # Errors
///
/// Returns [`SerializationError::Decode`] with the failing position.
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T, SerializationError> {
    serde_json::from_str(json).map_err(SerializationError::decode)
}

/// Decodes raw file bytes.
///
/// # Errors
///
/// Returns [`SerializationError::Decode`] with the failing position, also
/// for input that is not UTF-8.
pub fn from_json_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    serde_json::from_slice(bytes).map_err(SerializationError::decode)
}
