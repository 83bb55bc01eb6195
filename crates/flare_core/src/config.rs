//! # Core Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! file yields the stock configuration.
//!
//! ```toml
//! [memory]
//! size_classes = [64, 256, 1024, 4096, 16384]
//! initial_blocks = 0
//!
//! [objects]
//! initial_capacity = 1024
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Default pool size classes in bytes.
pub const DEFAULT_SIZE_CLASSES: [usize; 5] = [64, 256, 1024, 4096, 16384];

/// Allocator configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Block sizes of the pools, strictly ascending.
    pub size_classes: Vec<usize>,
    /// Blocks created up front in every pool.
    pub initial_blocks: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            size_classes: DEFAULT_SIZE_CLASSES.to_vec(),
            initial_blocks: 0,
        }
    }
}

impl MemoryConfig {
    /// Checks that the size classes are usable.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidSizeClasses`] if the list is empty,
    /// contains zero, or is not strictly ascending.
    pub fn validate(&self) -> CoreResult<()> {
        let reject = |reason| {
            Err(CoreError::InvalidSizeClasses {
                classes: self.size_classes.clone(),
                reason,
            })
        };

        if self.size_classes.is_empty() {
            return reject("at least one size class is required");
        }
        if self.size_classes.contains(&0) {
            return reject("size classes must be non-zero");
        }
        if self.size_classes.windows(2).any(|w| w[0] >= w[1]) {
            return reject("size classes must be strictly ascending");
        }
        Ok(())
    }
}

/// Object arena configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectConfig {
    /// Registry slots reserved up front.
    pub initial_capacity: usize,
}

impl Default for ObjectConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 1024,
        }
    }
}

/// Configuration for the whole core.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Allocator settings.
    pub memory: MemoryConfig,
    /// Object arena settings.
    pub objects: ObjectConfig,
}

impl CoreConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] on malformed TOML and
    /// [`CoreError::InvalidSizeClasses`] on unusable size classes.
    pub fn from_toml_str(text: &str) -> CoreResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| CoreError::InvalidConfig(e.to_string()))?;
        config.memory.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if the file cannot be read, plus
    /// everything [`CoreConfig::from_toml_str`] can return.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| CoreError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}
