//! # Engine Error Types

use flare_core::CoreError;
use flare_platform::PlatformError;
use thiserror::Error;

/// Errors that stop the engine from starting or running.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Core construction failed.
    #[error("core: {0}")]
    Core(#[from] CoreError),

    /// The platform refused an operation.
    #[error("platform: {0}")]
    Platform(#[from] PlatformError),

    /// Engine configuration could not be read or parsed.
    #[error("invalid engine configuration: {0}")]
    Config(String),

    /// The frame loop was started before [`crate::Engine::init`].
    #[error("engine not initialized")]
    NotInitialized,
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
