//! WebSocket protocol message types.
//!
//! This module defines the message format exchanged between the plugin
//! and the hosting application.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | Registration | Plugin → Host | First message, identifies the plugin |
//! | [`InboundEvent`] | Host → Plugin | Hardware and state notifications |
//! | [`OutboundCommand`] | Plugin → Host | Imperative commands |
//!
//! Several inbound events may arrive back to back in one WebSocket
//! message with no separator between them.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `codec` | Encode/decode functions |
//! | `command` | Outbound command definitions |
//! | `event` | Inbound event types |
//! | `info` | Launch-time registration info |

// ============================================================================
// Submodules
// ============================================================================

/// Encode and decode functions.
pub mod codec;

/// Outbound command definitions.
pub mod command;

/// Inbound event types.
pub mod event;

/// Registration info from the `-info` launch argument.
pub mod info;

// ============================================================================
// Re-exports
// ============================================================================

pub use codec::{decode_document, encode_command, encode_registration};
pub use command::{Command, OutboundCommand, Target};
pub use event::{ActionPayload, Coordinates, EventKind, InboundEvent};
pub use info::{ApplicationInfo, DeviceInfo, DeviceSize, PluginInfo, RegistrationInfo};
