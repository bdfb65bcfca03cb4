//! Outbound command definitions.
//!
//! Every command is sent as one JSON object:
//!
//! ```json
//! { "event": "setTitle", "context": "ctx", "payload": { "title": "5", "target": 0 } }
//! ```
//!
//! `context` and `payload` are omitted when a command has none.
//!
//! # Commands
//!
//! | Kind | Context | Payload |
//! |------|---------|---------|
//! | `setTitle` | yes | `title`, `target` |
//! | `setImage` | yes | `image`, `target` |
//! | `showAlert` | yes | - |
//! | `showOk` | yes | - |
//! | `setSettings` | yes | arbitrary object |
//! | `setState` | yes | `state` |
//! | `sendToPropertyInspector` | yes | arbitrary object |
//! | `switchToProfile` | yes | `profile` (device at top level) |
//! | `openUrl` | no | `url` |

// ============================================================================
// Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Serialize, Serializer};
use serde_json::{Value, json};

// ============================================================================
// OutboundCommand
// ============================================================================

/// Wire form of a command, ready for encoding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundCommand {
    /// Command kind.
    pub event: String,

    /// Target action instance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Target device, only used by device-scoped commands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,

    /// Kind-specific payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl OutboundCommand {
    /// Creates a command from its parts.
    #[inline]
    #[must_use]
    pub fn new(event: impl Into<String>, context: Option<String>, payload: Option<Value>) -> Self {
        Self {
            event: event.into(),
            context,
            device: None,
            payload,
        }
    }

    /// Sets the top-level device field.
    #[inline]
    #[must_use]
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }
}

// ============================================================================
// Target
// ============================================================================

/// Where a title or image is displayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Target {
    /// Hardware and software.
    #[default]
    Both,
    /// Only the physical key.
    Hardware,
    /// Only the on-screen preview.
    Software,
}

impl Target {
    /// Returns the wire value.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Both => 0,
            Self::Hardware => 1,
            Self::Software => 2,
        }
    }
}

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

// ============================================================================
// Command
// ============================================================================

/// Typed outbound commands.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Set the title of an action instance. `None` clears it.
    SetTitle {
        /// Action instance.
        context: String,
        /// New title.
        title: Option<String>,
        /// Display target.
        target: Target,
    },

    /// Set the image of an action instance. `None` restores the default.
    SetImage {
        /// Action instance.
        context: String,
        /// Base64 image or data URI.
        image: Option<String>,
        /// Display target.
        target: Target,
    },

    /// Flash the alert indicator on the key.
    ShowAlert {
        /// Action instance.
        context: String,
    },

    /// Flash the OK indicator on the key.
    ShowOk {
        /// Action instance.
        context: String,
    },

    /// Persist settings for an action instance.
    SetSettings {
        /// Action instance.
        context: String,
        /// Settings object.
        settings: Value,
    },

    /// Change the state of a multi-state action.
    SetState {
        /// Action instance.
        context: String,
        /// Zero-based state index.
        state: i64,
    },

    /// Send data to the property inspector.
    SendToPropertyInspector {
        /// Action instance.
        context: String,
        /// Payload object.
        payload: Value,
    },

    /// Switch a device to a profile bundled with the plugin.
    SwitchToProfile {
        /// Plugin context.
        context: String,
        /// Device to switch.
        device: String,
        /// Profile name.
        profile: String,
    },

    /// Open a URL in the default browser.
    OpenUrl {
        /// URL to open.
        url: String,
    },
}

impl Command {
    /// Builds a `setImage` command from raw image bytes.
    ///
    /// The image is sent as a `data:` URI.
    #[must_use]
    pub fn set_image_data(
        context: impl Into<String>,
        mime: &str,
        bytes: &[u8],
        target: Target,
    ) -> Self {
        Self::SetImage {
            context: context.into(),
            image: Some(format!("data:{mime};base64,{}", STANDARD.encode(bytes))),
            target,
        }
    }

    /// Returns the wire kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SetTitle { .. } => "setTitle",
            Self::SetImage { .. } => "setImage",
            Self::ShowAlert { .. } => "showAlert",
            Self::ShowOk { .. } => "showOk",
            Self::SetSettings { .. } => "setSettings",
            Self::SetState { .. } => "setState",
            Self::SendToPropertyInspector { .. } => "sendToPropertyInspector",
            Self::SwitchToProfile { .. } => "switchToProfile",
            Self::OpenUrl { .. } => "openUrl",
        }
    }
}

impl From<Command> for OutboundCommand {
    fn from(command: Command) -> Self {
        let kind = command.kind();

        match command {
            Command::SetTitle {
                context,
                title,
                target,
            } => OutboundCommand::new(
                kind,
                Some(context),
                Some(json!({ "title": title.unwrap_or_default(), "target": target })),
            ),

            Command::SetImage {
                context,
                image,
                target,
            } => OutboundCommand::new(
                kind,
                Some(context),
                Some(json!({ "image": image.unwrap_or_default(), "target": target })),
            ),

            Command::ShowAlert { context } | Command::ShowOk { context } => {
                OutboundCommand::new(kind, Some(context), None)
            }

            Command::SetSettings { context, settings } => {
                OutboundCommand::new(kind, Some(context), Some(settings))
            }

            Command::SetState { context, state } => {
                OutboundCommand::new(kind, Some(context), Some(json!({ "state": state })))
            }

            Command::SendToPropertyInspector { context, payload } => {
                OutboundCommand::new(kind, Some(context), Some(payload))
            }

            Command::SwitchToProfile {
                context,
                device,
                profile,
            } => OutboundCommand::new(kind, Some(context), Some(json!({ "profile": profile })))
                .with_device(device),

            Command::OpenUrl { url } => OutboundCommand::new(kind, None, Some(json!({ "url": url }))),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(command: Command) -> Value {
        serde_json::to_value(OutboundCommand::from(command)).expect("serialize")
    }

    #[test]
    fn test_set_title_wire_shape() {
        let value = wire(Command::SetTitle {
            context: "ctx1".into(),
            title: Some("5".into()),
            target: Target::Both,
        });

        assert_eq!(
            value,
            json!({"event": "setTitle", "context": "ctx1", "payload": {"title": "5", "target": 0}})
        );
    }

    #[test]
    fn test_missing_title_is_empty_string() {
        let value = wire(Command::SetTitle {
            context: "ctx".into(),
            title: None,
            target: Target::Software,
        });

        assert_eq!(value["payload"]["title"], "");
        assert_eq!(value["payload"]["target"], 2);
    }

    #[test]
    fn test_show_ok_has_no_payload() {
        let value = wire(Command::ShowOk {
            context: "ctx".into(),
        });

        assert_eq!(value, json!({"event": "showOk", "context": "ctx"}));
    }

    #[test]
    fn test_open_url_has_no_context() {
        let value = wire(Command::OpenUrl {
            url: "https://example.com".into(),
        });

        assert_eq!(
            value,
            json!({"event": "openUrl", "payload": {"url": "https://example.com"}})
        );
    }

    #[test]
    fn test_switch_to_profile_carries_device() {
        let value = wire(Command::SwitchToProfile {
            context: "plugin".into(),
            device: "dev1".into(),
            profile: "Gaming".into(),
        });

        assert_eq!(value["device"], "dev1");
        assert_eq!(value["payload"], json!({"profile": "Gaming"}));
    }

    #[test]
    fn test_set_settings_passes_object_through() {
        let settings = json!({"count": 4, "nested": {"on": true}});
        let value = wire(Command::SetSettings {
            context: "ctx".into(),
            settings: settings.clone(),
        });

        assert_eq!(value["payload"], settings);
    }

    #[test]
    fn test_set_image_data_uri() {
        let command = Command::set_image_data("ctx", "image/png", b"abc", Target::Hardware);
        let value = wire(command);

        assert_eq!(value["payload"]["image"], "data:image/png;base64,YWJj");
        assert_eq!(value["payload"]["target"], 1);
    }
}
