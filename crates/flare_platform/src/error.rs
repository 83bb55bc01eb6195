//! # Platform Error Types

use thiserror::Error;

use crate::shader::ShaderStage;

/// Errors reported across the platform boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The window or its graphics context could not be created.
    #[error("window initialization failed: {0}")]
    WindowInit(String),

    /// The operation needs an open window and its graphics context.
    #[error("no window is open")]
    NoWindow,

    /// A shader stage failed to compile.
    #[error("{stage} shader compilation failed: {log}")]
    ShaderCompile {
        /// The stage that failed.
        stage: ShaderStage,
        /// Native compiler diagnostic.
        log: String,
    },

    /// The compiled stages failed to link into a program.
    #[error("shader program linking failed: {0}")]
    ShaderLink(String),

    /// Window configuration could not be read or parsed.
    #[error("invalid window configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;
