//! Builder pattern for plugin configuration.
//!
//! Provides a fluent API for configuring and creating [`Plugin`] instances.
//!
//! # Example
//!
//! ```no_run
//! use streamdeck_plugin::Plugin;
//!
//! # fn example() -> streamdeck_plugin::Result<()> {
//! let plugin = Plugin::builder()
//!     .port(28196)
//!     .plugin_uuid("7B5B1A7E-0000-0000-0000-000000000000")
//!     .register_event("registerPlugin")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::protocol::RegistrationInfo;

use super::core::Plugin;
use super::launch::LaunchArgs;

// ============================================================================
// Constants
// ============================================================================

/// Default host of the hosting application.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default capacity of the ingestion → parser channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 32;

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// PluginConfig
// ============================================================================

/// Validated plugin configuration.
#[derive(Debug, Clone)]
pub struct PluginConfig {
    /// WebSocket endpoint.
    pub url: Url,
    /// Port of the endpoint.
    pub port: u16,
    /// Identifier to register with.
    pub plugin_uuid: String,
    /// Event name of the registration message.
    pub register_event: String,
    /// Parsed `-info` blob.
    pub info: RegistrationInfo,
    /// Capacity of the ingestion → parser channel.
    pub channel_capacity: usize,
    /// Connect timeout.
    pub connect_timeout: Duration,
}

// ============================================================================
// PluginBuilder
// ============================================================================

/// Builder for configuring a [`Plugin`] instance.
///
/// Use [`Plugin::builder()`] to create a new builder.
#[derive(Debug, Clone)]
pub struct PluginBuilder {
    host: String,
    port: Option<u16>,
    plugin_uuid: Option<String>,
    register_event: Option<String>,
    info: Option<String>,
    channel_capacity: usize,
    connect_timeout: Duration,
}

impl Default for PluginBuilder {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: None,
            plugin_uuid: None,
            register_event: None,
            info: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl PluginBuilder {
    /// Creates a new builder with defaults.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder seeded from launch arguments.
    #[must_use]
    pub fn from_launch_args(args: LaunchArgs) -> Self {
        let builder = Self::new()
            .port(args.port)
            .plugin_uuid(args.plugin_uuid)
            .register_event(args.register_event);

        match args.info {
            Some(info) => builder.info(info),
            None => builder,
        }
    }

    /// Sets the host. Defaults to `127.0.0.1`.
    #[inline]
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the port the hosting application listens on.
    #[inline]
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the plugin identifier sent at registration.
    #[inline]
    #[must_use]
    pub fn plugin_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.plugin_uuid = Some(uuid.into());
        self
    }

    /// Sets the registration event name.
    #[inline]
    #[must_use]
    pub fn register_event(mut self, event: impl Into<String>) -> Self {
        self.register_event = Some(event.into());
        self
    }

    /// Sets the raw `-info` JSON blob.
    #[inline]
    #[must_use]
    pub fn info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }

    /// Sets the capacity of the ingestion → parser channel.
    #[inline]
    #[must_use]
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Sets the connect timeout.
    #[inline]
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Builds the plugin with validation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a required field is missing, the
    /// channel capacity is zero, the endpoint is not a valid URL, or the
    /// info blob is not valid JSON.
    pub fn build(self) -> Result<Plugin> {
        Ok(Plugin::new(self.into_config()?))
    }

    /// Validates the builder into a [`PluginConfig`].
    pub(crate) fn into_config(self) -> Result<PluginConfig> {
        let port = self.port.ok_or_else(|| Error::config("port not set"))?;

        let plugin_uuid = self
            .plugin_uuid
            .filter(|uuid| !uuid.is_empty())
            .ok_or_else(|| Error::config("plugin UUID not set"))?;

        let register_event = self
            .register_event
            .filter(|event| !event.is_empty())
            .ok_or_else(|| Error::config("register event not set"))?;

        if self.channel_capacity == 0 {
            return Err(Error::config("channel capacity must be greater than zero"));
        }

        let url = Url::parse(&format!("ws://{}:{}/", self.host, port))
            .map_err(|e| Error::config(format!("invalid endpoint: {e}")))?;

        let info = match self.info {
            Some(raw) => RegistrationInfo::parse(&raw)?,
            None => RegistrationInfo::default(),
        };

        Ok(PluginConfig {
            url,
            port,
            plugin_uuid,
            register_event,
            info,
            channel_capacity: self.channel_capacity,
            connect_timeout: self.connect_timeout,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
