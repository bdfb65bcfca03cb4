//! Wire codec.
//!
//! Pure conversions between protocol types and bytes. No I/O happens here.

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

use super::{InboundEvent, OutboundCommand};

// ============================================================================
// Registration
// ============================================================================

/// Registration message sent right after connecting.
#[derive(Debug, Clone, Serialize)]
struct Registration<'a> {
    event: &'a str,
    uuid: &'a str,
}

// ============================================================================
// Functions
// ============================================================================

/// Encodes an outbound command as JSON text.
///
/// # Errors
///
/// Returns [`Error::Json`] if the payload cannot be represented as JSON.
pub fn encode_command(command: &OutboundCommand) -> Result<String> {
    Ok(serde_json::to_string(command)?)
}

/// Encodes the registration message `{event, uuid}`.
///
/// # Errors
///
/// Returns [`Error::Json`] on serialization failure.
pub fn encode_registration(register_event: &str, plugin_uuid: &str) -> Result<String> {
    let registration = Registration {
        event: register_event,
        uuid: plugin_uuid,
    };
    Ok(serde_json::to_string(&registration)?)
}

/// Decodes one complete JSON document into an [`InboundEvent`].
///
/// Unknown fields are ignored.
///
/// # Errors
///
/// Returns [`Error::MalformedDocument`] if the bytes are not a JSON object
/// or the `event` field is missing.
pub fn decode_document(bytes: &[u8]) -> Result<InboundEvent> {
    // Derived struct decoding also accepts arrays, so require an object first.
    let object: Map<String, Value> =
        serde_json::from_slice(bytes).map_err(|e| Error::malformed(e.to_string()))?;

    serde_json::from_value(Value::Object(object)).map_err(|e| Error::malformed(e.to_string()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_encode_command_exact_fields() {
        let command = OutboundCommand::new(
            "setTitle",
            Some("ctx1".into()),
            Some(json!({"title": "5", "target": 0})),
        );

        let text = encode_command(&command).expect("encode");
        let value: Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(
            value,
            json!({"event": "setTitle", "context": "ctx1", "payload": {"title": "5", "target": 0}})
        );
    }

    #[test]
    fn test_encode_registration() {
        let text = encode_registration("registerPlugin", "ABC-123").expect("encode");
        assert_eq!(text, r#"{"event":"registerPlugin","uuid":"ABC-123"}"#);
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let event = decode_document(br#"{"event":"keyUp","context":"c","extra":[1,2]}"#)
            .expect("decode");
        assert_eq!(event.kind, "keyUp");
        assert_eq!(event.context(), Some("c"));
    }

    #[test]
    fn test_decode_missing_event_is_malformed() {
        let err = decode_document(br#"{"context":"c"}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { .. }));
    }

    #[test]
    fn test_decode_array_shaped_event_is_malformed() {
        let err = decode_document(br#"["keyDown","ctx1"]"#).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { .. }));
    }

    #[test]
    fn test_decode_non_object_is_malformed() {
        assert!(decode_document(b"[1,2,3]").is_err());
        assert!(decode_document(b"{\"event\":").is_err());
        assert!(decode_document(b"{\"event\": 5}").is_err());
    }
}
