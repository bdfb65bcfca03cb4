//! Error types for the Stream Deck plugin client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use streamdeck_plugin::{Result, Sender};
//!
//! async fn example(sender: &Sender, context: &str) -> Result<()> {
//!     sender.show_ok(context).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants | Fatal |
//! |----------|----------|-------|
//! | Configuration | [`Error::Config`], [`Error::AlreadyRunning`] | yes |
//! | Connection | [`Error::Connection`], [`Error::ConnectionTimeout`], [`Error::ConnectionClosed`] | yes |
//! | Document | [`Error::MalformedDocument`] | no, skipped per document |
//! | Subscriber | [`Error::Handler`] | no, reported per handler |
//! | External | [`Error::Json`], [`Error::WebSocket`] | depends |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when plugin configuration or launch arguments are invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// The run loop was started a second time.
    ///
    /// A plugin owns exactly one connection per process lifetime.
    #[error("Plugin is already running or has already run")]
    AlreadyRunning,

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket connection failed.
    ///
    /// Returned when connect, upgrade, registration or a send on the
    /// control channel fails.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Connection timeout while connecting to the hosting application.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// WebSocket connection closed.
    ///
    /// Returned when the peer closes the socket or a command is sent after
    /// the session ended.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Document Errors
    // ========================================================================
    /// A received document is not a well-formed event.
    ///
    /// The document is discarded; scanning continues with the next one.
    #[error("Malformed document: {message}")]
    MalformedDocument {
        /// Description of the decode failure.
        message: String,
    },

    // ========================================================================
    // Subscriber Errors
    // ========================================================================
    /// A subscriber failed while handling an event.
    #[error("Handler for '{kind}' failed: {message}")]
    Handler {
        /// Event kind being dispatched.
        kind: String,
        /// Failure description.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates a malformed document error.
    #[inline]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDocument {
            message: message.into(),
        }
    }

    /// Creates a handler error.
    #[inline]
    pub fn handler(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Handler {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionTimeout { .. }
                | Self::ConnectionClosed
                | Self::WebSocket(_)
        )
    }

    /// Returns `true` if this error ends the session.
    ///
    /// Only fatal errors are returned from [`Plugin::run`](crate::Plugin::run).
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.is_connection_error() || matches!(self, Self::Config { .. } | Self::AlreadyRunning)
    }

    /// Returns `true` if this error is absorbed by the session.
    ///
    /// Recoverable errors are reported and processing continues.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MalformedDocument { .. } | Self::Handler { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::connection("failed to connect");
        assert_eq!(err.to_string(), "Connection failed: failed to connect");
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("missing -port");
        assert_eq!(err.to_string(), "Configuration error: missing -port");
    }

    #[test]
    fn test_handler_error_display() {
        let err = Error::handler("keyDown", "boom");
        assert_eq!(err.to_string(), "Handler for 'keyDown' failed: boom");
    }

    #[test]
    fn test_is_connection_error() {
        let conn_err = Error::connection("test");
        let timeout_err = Error::connection_timeout(1000);
        let closed_err = Error::ConnectionClosed;
        let other_err = Error::config("test");

        assert!(conn_err.is_connection_error());
        assert!(timeout_err.is_connection_error());
        assert!(closed_err.is_connection_error());
        assert!(!other_err.is_connection_error());
    }

    #[test]
    fn test_fatal_and_recoverable_are_disjoint() {
        let errors = [
            Error::config("x"),
            Error::AlreadyRunning,
            Error::connection("x"),
            Error::ConnectionClosed,
            Error::malformed("x"),
            Error::handler("keyUp", "x"),
        ];

        for err in &errors {
            assert!(!(err.is_fatal() && err.is_recoverable()), "{err}");
        }
        assert!(Error::malformed("x").is_recoverable());
        assert!(Error::ConnectionClosed.is_fatal());
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
