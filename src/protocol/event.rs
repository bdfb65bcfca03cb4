//! Inbound event types.
//!
//! Events are notifications sent from the hosting application to the
//! plugin when hardware or application state changes.
//!
//! # Event Kinds
//!
//! | Group | Kinds |
//! |-------|-------|
//! | Key | `keyDown`, `keyUp` |
//! | Action | `willAppear`, `willDisappear`, `titleParametersDidChange` |
//! | Device | `deviceDidConnect`, `deviceDidDisconnect` |
//! | Application | `applicationDidLaunch`, `applicationDidTerminate` |
//!
//! Kinds outside this table still decode into an [`InboundEvent`]; only
//! [`InboundEvent::known_kind`] returns `None` for them.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

// ============================================================================
// InboundEvent
// ============================================================================

/// An event notification from the hosting application.
///
/// # Format
///
/// ```json
/// {
///   "action": "com.example.counter.action",
///   "event": "keyDown",
///   "context": "opaque-context",
///   "device": "device-id",
///   "payload": { "settings": {}, "coordinates": {"column": 0, "row": 1} }
/// }
/// ```
///
/// Unknown fields are ignored. `payload` is kept as an opaque JSON value
/// because its shape varies by kind; see [`InboundEvent::action_payload`]
/// for the common action shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InboundEvent {
    /// Event kind tag.
    #[serde(rename = "event")]
    pub kind: String,

    /// Action instance the event refers to, absent for device and
    /// application events.
    #[serde(default)]
    pub context: Option<String>,

    /// Device identifier.
    #[serde(default)]
    pub device: Option<String>,

    /// Action UUID.
    #[serde(default)]
    pub action: Option<String>,

    /// Kind-specific payload.
    #[serde(default)]
    pub payload: Value,
}

impl InboundEvent {
    /// Returns the kind if it is one of the recognized kinds.
    #[inline]
    #[must_use]
    pub fn known_kind(&self) -> Option<EventKind> {
        EventKind::parse(&self.kind)
    }

    /// Returns the context, if any.
    #[inline]
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Decodes the payload as the common action payload.
    ///
    /// Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if a present field has
    /// the wrong type.
    pub fn action_payload(&self) -> Result<ActionPayload> {
        if self.payload.is_null() {
            return Ok(ActionPayload::default());
        }
        Ok(serde_json::from_value(self.payload.clone())?)
    }

    /// Decodes `payload.settings` into a caller-defined type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if the settings do not
    /// match `T`.
    pub fn settings<T: DeserializeOwned>(&self) -> Result<T> {
        let settings = self.payload.get("settings").cloned().unwrap_or(Value::Null);
        Ok(serde_json::from_value(settings)?)
    }
}

// ============================================================================
// EventKind
// ============================================================================

/// Recognized inbound event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A key was pressed.
    KeyDown,
    /// A key was released.
    KeyUp,
    /// An action instance became visible.
    WillAppear,
    /// An action instance is no longer visible.
    WillDisappear,
    /// The user changed the title or its parameters.
    TitleParametersDidChange,
    /// A device was plugged in.
    DeviceDidConnect,
    /// A device was unplugged.
    DeviceDidDisconnect,
    /// A monitored application launched.
    ApplicationDidLaunch,
    /// A monitored application terminated.
    ApplicationDidTerminate,
}

impl EventKind {
    /// All recognized kinds.
    pub const ALL: [EventKind; 9] = [
        Self::KeyDown,
        Self::KeyUp,
        Self::WillAppear,
        Self::WillDisappear,
        Self::TitleParametersDidChange,
        Self::DeviceDidConnect,
        Self::DeviceDidDisconnect,
        Self::ApplicationDidLaunch,
        Self::ApplicationDidTerminate,
    ];

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::KeyDown => "keyDown",
            Self::KeyUp => "keyUp",
            Self::WillAppear => "willAppear",
            Self::WillDisappear => "willDisappear",
            Self::TitleParametersDidChange => "titleParametersDidChange",
            Self::DeviceDidConnect => "deviceDidConnect",
            Self::DeviceDidDisconnect => "deviceDidDisconnect",
            Self::ApplicationDidLaunch => "applicationDidLaunch",
            Self::ApplicationDidTerminate => "applicationDidTerminate",
        }
    }

    /// Parses a wire name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        kind.as_str().to_string()
    }
}

// ============================================================================
// ActionPayload
// ============================================================================

/// Payload shape shared by action events (`keyDown`, `willAppear`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionPayload {
    /// Persisted action settings, shape defined by the plugin.
    pub settings: Value,
    /// Key position on the device.
    pub coordinates: Option<Coordinates>,
    /// Current state index for multi-state actions.
    pub state: i64,
    /// State the user asked for in a multi action.
    pub user_desired_state: i64,
    /// Whether the action is part of a multi action.
    pub is_in_multi_action: bool,
}

/// Key position on a device grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Zero-based column.
    pub column: u32,
    /// Zero-based row.
    pub row: u32,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_key_down_parsing() {
        let json_str = r#"{
            "action": "com.example.counter",
            "event": "keyDown",
            "context": "ctx1",
            "device": "dev1",
            "payload": {
                "settings": {"count": 3},
                "coordinates": {"column": 2, "row": 1},
                "state": 1,
                "userDesiredState": 0,
                "isInMultiAction": false
            }
        }"#;

        let event: InboundEvent = serde_json::from_str(json_str).expect("parse event");
        assert_eq!(event.known_kind(), Some(EventKind::KeyDown));
        assert_eq!(event.context(), Some("ctx1"));
        assert_eq!(event.device.as_deref(), Some("dev1"));

        let payload = event.action_payload().expect("action payload");
        assert_eq!(payload.coordinates, Some(Coordinates { column: 2, row: 1 }));
        assert_eq!(payload.state, 1);
        assert!(!payload.is_in_multi_action);
        assert_eq!(payload.settings, json!({"count": 3}));
    }

    #[test]
    fn test_device_event_without_context() {
        let json_str = r#"{"event": "deviceDidConnect", "device": "dev1", "deviceInfo": {"type": 0}}"#;

        let event: InboundEvent = serde_json::from_str(json_str).expect("parse event");
        assert_eq!(event.known_kind(), Some(EventKind::DeviceDidConnect));
        assert!(event.context.is_none());
        assert!(event.payload.is_null());
        assert_eq!(event.action_payload().expect("defaults"), ActionPayload::default());
    }

    #[test]
    fn test_unknown_kind_still_parses() {
        let json_str = r#"{"event": "systemDidWakeUp"}"#;

        let event: InboundEvent = serde_json::from_str(json_str).expect("parse event");
        assert_eq!(event.kind, "systemDidWakeUp");
        assert!(event.known_kind().is_none());
    }

    #[test]
    fn test_typed_settings() {
        #[derive(Deserialize)]
        struct CounterSettings {
            count: u64,
        }

        let event: InboundEvent = serde_json::from_value(json!({
            "event": "willAppear",
            "context": "ctx",
            "payload": {"settings": {"count": 7}}
        }))
        .expect("parse event");

        let settings: CounterSettings = event.settings().expect("settings");
        assert_eq!(settings.count, 7);
    }

    #[test]
    fn test_event_kind_round_trip_names() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(EventKind::parse("keydown"), None);
        assert_eq!(String::from(EventKind::TitleParametersDidChange), "titleParametersDidChange");
    }
}
