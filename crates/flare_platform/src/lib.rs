//! # FLARE Platform
//!
//! The narrow synchronous boundary between the engine and its host:
//! window lifecycle, frame timing, clearing, shader programs and process
//! diagnostics. The engine drives it once per frame and never reaches
//! past it.
//!
//! [`HeadlessPlatform`] implements the boundary without a display.
//!
//! ## Example
//!
//! ```rust
//! use flare_platform::{HeadlessPlatform, Platform, WindowConfig};
//!
//! let mut platform = HeadlessPlatform::new().close_after(1);
//! platform.init_window(&WindowConfig::default()).unwrap();
//! while platform.is_window_open() {
//!     platform.update_frame();
//!     platform.clear(0.0, 0.0, 0.0, 1.0);
//!     platform.present();
//! }
//! platform.destroy_window();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

mod error;
mod headless;
mod platform;
pub mod process;
mod shader;
mod window;

pub use error::{PlatformError, PlatformResult};
pub use headless::HeadlessPlatform;
pub use platform::Platform;
pub use shader::{ShaderHandle, ShaderStage};
pub use window::WindowConfig;
