//! Stable JSON for files the user may read or diff.
//!
//! Output uses 2-space indentation and ends with a newline; key order
//! follows the source type, so maps that must be sorted should be
//! `BTreeMap`s.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Error type for serialization operations.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// Serialization failed.
    #[error("JSON serialization failed: {0}")]
    Serialize(serde_json::Error),

    /// Deserialization failed.
    #[error("JSON deserialization failed: {0}")]
    Deserialize(serde_json::Error),
}

/// Serializes `value` as stable pretty JSON bytes.
///
/// # Errors
///
/// Returns an error if `value` cannot be represented as JSON.
pub fn to_json_stable_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"  "));
    value
        .serialize(&mut serializer)
        .map_err(SerializationError::Serialize)?;
    buffer.push(b'\n');
    Ok(buffer)
}

/// Deserializes JSON bytes, pretty or minified.
///
/// # Errors
///
/// Returns an error if the bytes are not valid JSON for `T`.
pub fn from_json_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    serde_json::from_slice(bytes).map_err(SerializationError::Deserialize)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    #[test]
    fn test_output_is_indented_sorted_and_newline_terminated() {
        let map: BTreeMap<&str, &str> = [("token", "abc"), ("alpha", "x")].into_iter().collect();

        let text = String::from_utf8(to_json_stable_bytes(&map).unwrap()).unwrap();

        assert_eq!(text, "{\n  \"alpha\": \"x\",\n  \"token\": \"abc\"\n}\n");
    }

    #[test]
    fn test_reads_minified_input() {
        let map: BTreeMap<String, String> = from_json_bytes(br#"{"token":"abc"}"#).unwrap();
        assert_eq!(map.get("token").map(String::as_str), Some("abc"));
    }

    #[test]
    fn test_reports_invalid_input() {
        let result = from_json_bytes::<BTreeMap<String, String>>(b"{not json");
        assert!(matches!(result, Err(SerializationError::Deserialize(_))));
    }
}
