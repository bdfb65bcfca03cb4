//! Registration info passed by the hosting application at launch.
//!
//! The `-info` launch argument carries a JSON blob describing the
//! application, the plugin and the connected devices. The transport never
//! reads it; it is parsed for the surrounding plugin code.

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;

use crate::error::{Error, Result};

// ============================================================================
// RegistrationInfo
// ============================================================================

/// Parsed `-info` blob. Every field defaults when absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationInfo {
    /// Hosting application.
    pub application: ApplicationInfo,
    /// This plugin.
    pub plugin: PluginInfo,
    /// Display scale factor.
    pub device_pixel_ratio: u32,
    /// Devices known at launch.
    pub devices: Vec<DeviceInfo>,
}

impl RegistrationInfo {
    /// Parses the raw `-info` JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the blob is not valid JSON.
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::config(format!("invalid -info: {e}")))
    }

    /// Looks up a device by id.
    #[must_use]
    pub fn device(&self, id: &str) -> Option<&DeviceInfo> {
        self.devices.iter().find(|device| device.id == id)
    }
}

/// Hosting application details.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApplicationInfo {
    /// UI language code.
    pub language: String,
    /// `mac` or `windows`.
    pub platform: String,
    /// Application version.
    pub version: String,
}

/// Plugin details.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PluginInfo {
    /// Plugin version from the manifest.
    pub version: String,
}

/// A connected device.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    /// Device identifier used in events and commands.
    pub id: String,
    /// User-visible name.
    pub name: String,
    /// Key grid size.
    pub size: DeviceSize,
    /// Hardware model code.
    #[serde(rename = "type")]
    pub device_type: u32,
}

/// Key grid size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeviceSize {
    /// Number of key columns.
    pub columns: u32,
    /// Number of key rows.
    pub rows: u32,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_info() {
        let raw = r##"{
            "application": {"language": "en", "platform": "mac", "version": "6.4.0"},
            "plugin": {"version": "1.0"},
            "devicePixelRatio": 2,
            "devices": [
                {"id": "DEV1", "name": "Stream Deck", "size": {"columns": 5, "rows": 3}, "type": 0}
            ],
            "colors": {"buttonPressedTextColor": "#969696"}
        }"##;

        let info = RegistrationInfo::parse(raw).expect("parse info");
        assert_eq!(info.application.platform, "mac");
        assert_eq!(info.device_pixel_ratio, 2);

        let device = info.device("DEV1").expect("device present");
        assert_eq!(device.size, DeviceSize { columns: 5, rows: 3 });
        assert!(info.device("missing").is_none());
    }

    #[test]
    fn test_parse_empty_object_defaults() {
        let info = RegistrationInfo::parse("{}").expect("parse info");
        assert_eq!(info, RegistrationInfo::default());
    }

    #[test]
    fn test_parse_invalid_is_config_error() {
        let err = RegistrationInfo::parse("not json").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
