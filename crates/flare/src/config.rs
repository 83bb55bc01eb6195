//! # Engine Configuration
//!
//! One TOML file for the whole engine:
//!
//! ```toml
//! max_frames = 600
//! clear_color = [0.1, 0.1, 0.1, 1.0]
//!
//! [core.memory]
//! size_classes = [64, 256, 1024, 4096, 16384]
//!
//! [window]
//! width = 800
//! height = 600
//! title = "FLARE"
//! ```

use std::path::Path;

use flare_core::CoreConfig;
use flare_platform::WindowConfig;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Engine-wide configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Allocator and object settings.
    pub core: CoreConfig,
    /// Window requested from the platform.
    pub window: WindowConfig,
    /// Stop after this many frames; run until the window closes if unset.
    pub max_frames: Option<u64>,
    /// Color every frame is cleared to.
    pub clear_color: [f32; 4],
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            core: CoreConfig::default(),
            window: WindowConfig::default(),
            max_frames: None,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] on malformed TOML and
    /// [`EngineError::Core`] on unusable size classes.
    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| EngineError::Config(e.to_string()))?;
        config.core.memory.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if the file cannot be read, plus
    /// everything [`EngineConfig::from_toml_str`] can return.
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flare_core::CoreError;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_nested_sections() {
        let config = EngineConfig::from_toml_str(
            "max_frames = 10\n\
             clear_color = [0.5, 0.5, 0.5, 1.0]\n\
             [core.memory]\n\
             size_classes = [32, 512]\n\
             [window]\n\
             title = \"probe\"\n",
        )
        .unwrap();

        assert_eq!(config.max_frames, Some(10));
        assert_eq!(config.core.memory.size_classes, vec![32, 512]);
        assert_eq!(config.window.title, "probe");
        assert_eq!(config.window.width, 800);
    }

    #[test]
    fn test_invalid_classes_surface_as_core_error() {
        let err = EngineConfig::from_toml_str("[core.memory]\nsize_classes = []\n").unwrap_err();
        assert!(matches!(err, EngineError::Core(CoreError::InvalidSizeClasses { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flare.toml");
        std::fs::write(&path, "max_frames = 3\n").unwrap();

        assert_eq!(EngineConfig::load(&path).unwrap().max_frames, Some(3));
        assert!(matches!(
            EngineConfig::load(dir.path().join("missing.toml")),
            Err(EngineError::Config(_))
        ));
    }
}
