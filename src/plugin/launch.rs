//! Launch arguments from the hosting application.
//!
//! The hosting application starts the plugin executable with:
//!
//! ```text
//! plugin -port 28196 -pluginUUID <uuid> -registerEvent registerPlugin -info '{...}'
//! ```
//!
//! Flags may use one or two dashes and `-flag value` or `--flag=value`.
//! Unknown flags are ignored so binaries can add their own.

// ============================================================================
// Imports
// ============================================================================

use tracing::debug;

use crate::error::{Error, Result};

// ============================================================================
// LaunchArgs
// ============================================================================

/// Connection parameters passed on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchArgs {
    /// Port the hosting application listens on.
    pub port: u16,
    /// Identifier to register with.
    pub plugin_uuid: String,
    /// Event name of the registration message.
    pub register_event: String,
    /// Raw `-info` JSON, if given.
    pub info: Option<String>,
}

impl LaunchArgs {
    /// Parses the current process arguments.
    ///
    /// # Errors
    ///
    /// See [`LaunchArgs::parse`].
    pub fn from_env() -> Result<Self> {
        Self::parse(std::env::args().skip(1))
    }

    /// Parses an argument list (without the program name).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a required flag is missing, has no
    /// value, or the port is not a valid number.
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut port = None;
        let mut plugin_uuid = None;
        let mut register_event = None;
        let mut info = None;

        let mut args = args.into_iter().map(Into::into).peekable();

        while let Some(arg) = args.next() {
            let Some(flag) = arg.strip_prefix("--").or_else(|| arg.strip_prefix('-')) else {
                debug!(%arg, "Ignoring positional argument");
                continue;
            };

            let (name, inline_value) = match flag.split_once('=') {
                Some((name, value)) => (name.to_string(), Some(value.to_string())),
                None => (flag.to_string(), None),
            };

            let slot = match name.as_str() {
                "port" => &mut port,
                "pluginUUID" => &mut plugin_uuid,
                "registerEvent" => &mut register_event,
                "info" => &mut info,
                _ => {
                    debug!(flag = %name, "Ignoring unknown flag");
                    continue;
                }
            };

            let value = match inline_value {
                Some(value) => value,
                None => args
                    .next_if(|next| !is_flag(next))
                    .ok_or_else(|| Error::config(format!("missing value for -{name}")))?,
            };

            *slot = Some(value);
        }

        let port = port.ok_or_else(|| Error::config("missing -port"))?;
        let port = port
            .parse::<u16>()
            .map_err(|_| Error::config(format!("invalid -port: {port}")))?;

        Ok(Self {
            port,
            plugin_uuid: plugin_uuid.ok_or_else(|| Error::config("missing -pluginUUID"))?,
            register_event: register_event
                .ok_or_else(|| Error::config("missing -registerEvent"))?,
            info,
        })
    }
}

/// A value never starts with a dash followed by a letter.
fn is_flag(arg: &str) -> bool {
    arg.strip_prefix('-')
        .and_then(|rest| rest.trim_start_matches('-').chars().next())
        .is_some_and(|c| c.is_ascii_alphabetic())
}

// ============================================================================
// Tests
// ============================================================================
