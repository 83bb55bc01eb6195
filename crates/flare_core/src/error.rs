//! # Core Error Types
//!
//! Errors surfaced by the core. Most failures inside the core are absorbed
//! and logged instead; these are the ones a caller can act on.

use thiserror::Error;

use crate::object::ObjectId;

/// Errors that can occur in the core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Size classes must be non-empty, non-zero and strictly ascending.
    #[error("invalid size classes {classes:?}: {reason}")]
    InvalidSizeClasses {
        /// The rejected class list.
        classes: Vec<usize>,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The object was already torn down (its registry slot is a tombstone).
    #[error("object {0} is dead")]
    DeadObject(ObjectId),

    /// The id was never issued by this arena.
    #[error("unknown object {0}")]
    UnknownObject(ObjectId),

    /// No constructor is registered under this class name.
    #[error("class not registered: {0}")]
    UnknownClass(String),

    /// An asset failed to load from its path.
    #[error("failed to load resource {path}: {reason}")]
    ResourceLoad {
        /// The path that was requested.
        path: String,
        /// The loader's diagnostic.
        reason: String,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
