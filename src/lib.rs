//! Stream Deck plugin SDK - Event-driven WebSocket client.
//!
//! This library connects a plugin process to the Stream Deck application,
//! registers it, and dispatches the application's events to async
//! subscribers while exposing a handle for sending commands back.
//!
//! # Architecture
//!
//! The plugin is the client side of a local WebSocket connection:
//!
//! - **Hosting application**: listens on `127.0.0.1:<port>`, emits events
//! - **Plugin (Rust)**: registers, receives events, sends commands
//!
//! Key design principles:
//!
//! - One [`Plugin`] owns one connection and runs until cancelled
//! - Ingestion, parsing and dispatch are separate loops joined by a
//!   bounded channel, so a slow subscriber pauses reading instead of
//!   dropping events
//! - Several JSON documents in one WebSocket message are split and
//!   dispatched in arrival order
//! - Subscribers for one event run one after another, kind-specific
//!   subscribers before catch-all ones
//!
//! # Quick Start
//!
//! ```no_run
//! use streamdeck_plugin::{EventKind, LaunchArgs, PluginBuilder, Result, Target};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let plugin = PluginBuilder::from_launch_args(LaunchArgs::from_env()?).build()?;
//!     let sender = plugin.sender();
//!
//!     plugin.on(EventKind::KeyDown, move |event| {
//!         let sender = sender.clone();
//!         async move {
//!             if let Some(context) = event.context {
//!                 sender.set_title(context, "Hello", Target::Both).await?;
//!             }
//!             Ok(())
//!         }
//!     });
//!
//!     plugin.run().await
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error types and [`Result`] alias |
//! | [`events`] | Subscriber trait and [`Dispatcher`] |
//! | [`plugin`] | [`Plugin`], [`PluginBuilder`], [`LaunchArgs`] |
//! | [`protocol`] | Wire message types and codec |
//! | [`transport`] | Ingestion, parsing and writer loops |

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Event subscription and ordered dispatch.
pub mod events;

/// Plugin entry point and connection controller.
///
/// Use [`Plugin::builder()`] or [`PluginBuilder::from_launch_args`] to
/// create a configured plugin.
pub mod plugin;

/// WebSocket protocol message types.
///
/// Defines inbound events, outbound commands and the codec between them
/// and JSON text.
pub mod protocol;

/// WebSocket transport layer.
///
/// Frame reassembly, document splitting and the writer task.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Error types
pub use error::{Error, Result};

// Event types
pub use events::{DispatchOutcome, Dispatcher, EventHandler, Subscriber, handler_fn};

// Plugin types
pub use plugin::{ConnectionState, LaunchArgs, Plugin, PluginBuilder, PluginConfig};

// Protocol types
pub use protocol::{
    ActionPayload, Command, Coordinates, EventKind, InboundEvent, OutboundCommand,
    RegistrationInfo, Target,
};

// Transport types
pub use transport::{PipelineStats, Sender};
