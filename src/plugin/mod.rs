//! Plugin entry point and connection controller.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `builder` | [`PluginBuilder`] and validated [`PluginConfig`] |
//! | `core` | [`Plugin`] and its [`ConnectionState`] lifecycle |
//! | `launch` | [`LaunchArgs`] command-line parsing |

// ============================================================================
// Submodules
// ============================================================================

/// Fluent configuration and validation.
pub mod builder;

/// Connection controller.
pub mod core;

/// Launch argument parsing.
pub mod launch;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::{
    DEFAULT_CHANNEL_CAPACITY, DEFAULT_CONNECT_TIMEOUT, DEFAULT_HOST, PluginBuilder, PluginConfig,
};
pub use core::{ConnectionState, Plugin};
pub use launch::LaunchArgs;
