//! Conversions between SDK value types and the JSON the catalog emits or
//! accepts.

use aws_smithy_types::date_time::Format;
use aws_smithy_types::{Blob, DateTime};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::Value;

use crate::error::{BlockError, BlockResult};

/// Render an SDK timestamp as an RFC 3339 string for the emitted event.
pub fn timestamp(value: Option<DateTime>) -> Option<String> {
    value.and_then(|v| v.fmt(Format::DateTime).ok())
}

/// Build an SDK timestamp from the fractional epoch seconds a config carries.
pub fn timestamp_from_secs(value: Option<f64>) -> Option<DateTime> {
    value.map(DateTime::from_secs_f64)
}

/// Decode a base64 config field (zip content, invoke payload) into an SDK
/// blob. `field` names the offending config member on failure.
pub fn blob_from_base64(field: &str, encoded: &str) -> BlockResult<Blob> {
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| BlockError::InvalidConfig(format!("{field} is not valid base64: {e}")))?;
    Ok(Blob::new(bytes))
}

/// Re-emit a response blob: JSON when it parses, a plain string otherwise.
/// Binary payloads that are not UTF-8 come back base64-encoded rather than
/// dropped.
pub fn value_from_blob(blob: Blob) -> Value {
    match String::from_utf8(blob.into_inner()) {
        Ok(text) => match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(_) => Value::String(text),
        },
        Err(err) => Value::String(STANDARD.encode(err.into_bytes())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn timestamp_renders_rfc3339() {
        let rendered = timestamp(Some(DateTime::from_secs(1_577_836_800)));
        assert_eq!(rendered.as_deref(), Some("2020-01-01T00:00:00Z"));
        assert_eq!(timestamp(None), None);
    }

    #[test]
    fn blob_round_trips_base64() {
        let blob = blob_from_base64("ZipFile", "eyJrZXkiOiJ2YWx1ZSJ9").unwrap();
        assert_eq!(blob.as_ref(), br#"{"key":"value"}"#);
    }

    #[test]
    fn blob_rejects_bad_base64() {
        let err = blob_from_base64("ZipFile", "not base64!!!").unwrap_err();
        assert!(err.to_string().contains("ZipFile"));
    }

    #[test]
    fn response_blob_parses_json_payloads() {
        let parsed = value_from_blob(Blob::new(br#"{"ok":true}"#.to_vec()));
        assert_eq!(parsed, json!({"ok": true}));
    }

    #[test]
    fn response_blob_falls_back_to_string() {
        let parsed = value_from_blob(Blob::new(b"plain text".to_vec()));
        assert_eq!(parsed, Value::String("plain text".to_string()));
    }

    #[test]
    fn response_blob_base64_encodes_binary_payloads() {
        let bytes = vec![0u8, 159, 146, 150];
        let parsed = value_from_blob(Blob::new(bytes.clone()));
        let encoded = parsed.as_str().unwrap();
        assert_eq!(STANDARD.decode(encoded).unwrap(), bytes);
    }
}
