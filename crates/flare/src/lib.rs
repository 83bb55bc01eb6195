//! # FLARE
//!
//! The engine orchestrator: builds the core [`Context`], opens a window
//! through a [`flare_platform::Platform`], runs the frame loop and prints
//! the memory report at shutdown.
//!
//! ## Example
//!
//! ```rust
//! use flare::{Engine, EngineConfig};
//! use flare_platform::HeadlessPlatform;
//!
//! let mut engine = Engine::new(EngineConfig::default(), HeadlessPlatform::new()).unwrap();
//! engine.init().unwrap();
//! engine.run(Some(3)).unwrap();
//! let report = engine.shutdown();
//! assert_eq!(report.stats.frames_recorded, 3);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
mod engine;
mod error;
pub mod stats;

pub use config::EngineConfig;
pub use engine::{Engine, ShutdownReport};
pub use error::{EngineError, EngineResult};
pub use stats::{FrameStats, FrameStatsAccumulator};

/// Re-export of the core for engine users.
pub use flare_core as core;
/// Re-export of the platform boundary.
pub use flare_platform as platform;

pub use flare_core::Context;
