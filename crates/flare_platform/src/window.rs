//! # Window Configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PlatformError, PlatformResult};

/// Requested window properties.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Client area width in pixels.
    pub width: u32,
    /// Client area height in pixels.
    pub height: u32,
    /// Title bar text.
    pub title: String,
    /// Borderless fullscreen instead of a decorated window.
    pub fullscreen: bool,
    /// Sync presentation to the display refresh.
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: String::from("FLARE"),
            fullscreen: false,
            vsync: true,
        }
    }
}

impl WindowConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::InvalidConfig`] on malformed TOML.
    pub fn from_toml_str(text: &str) -> PlatformResult<Self> {
        toml::from_str(text).map_err(|e| PlatformError::InvalidConfig(e.to_string()))
    }

    /// Reads a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::InvalidConfig`] if the file cannot be read
    /// or parsed.
    pub fn load(path: impl AsRef<Path>) -> PlatformResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| PlatformError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = WindowConfig::from_toml_str("width = 320\nheight = 240\n").unwrap();
        assert_eq!(config.width, 320);
        assert_eq!(config.height, 240);
        assert_eq!(config.title, "FLARE");
        assert!(config.vsync);
        assert!(!config.fullscreen);
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let err = WindowConfig::from_toml_str("width = \"wide\"\n").unwrap_err();
        assert!(matches!(err, PlatformError::InvalidConfig(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = WindowConfig::load("/nonexistent/flare/window.toml").unwrap_err();
        assert!(matches!(err, PlatformError::InvalidConfig(msg) if msg.contains("window.toml")));
    }
}
