//! # The Platform Boundary
//!
//! Everything the engine needs from the host, driven once per frame:
//!
//! ```text
//! init_window ──► [ update_frame ─► clear ─► draw ─► present ]* ──► destroy_window
//!                        │
//!                        └─ delta_time, is_window_open
//! ```

use crate::error::PlatformResult;
use crate::shader::ShaderHandle;
use crate::window::WindowConfig;

/// Window, frame timing, shader and diagnostics services of a host.
///
/// # Thread Safety
///
/// Implementations are driven from the thread that created the window.
/// Nothing here requires `Send`.
pub trait Platform {
    /// Opens the window and its graphics context.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PlatformError::WindowInit`] if the host refuses the
    /// window; the caller must not proceed with a frame loop.
    fn init_window(&mut self, config: &WindowConfig) -> PlatformResult<()>;

    /// Closes the window and releases the graphics context. No-op if no
    /// window is open.
    fn destroy_window(&mut self);

    /// Polls host events and samples the frame clock.
    fn update_frame(&mut self);

    /// Shows the frame drawn since the last present.
    fn present(&mut self);

    /// Whether the window exists and nobody asked it to close.
    fn is_window_open(&self) -> bool;

    /// Client area size in pixels; `(0, 0)` without a window.
    fn window_size(&self) -> (u32, u32);

    /// Seconds between the two most recent [`Platform::update_frame`] calls.
    fn delta_time(&self) -> f64;

    /// Fills the back buffer with one color.
    fn clear(&mut self, r: f32, g: f32, b: f32, a: f32);

    /// Compiles and links a vertex/fragment program.
    ///
    /// # Errors
    ///
    /// Returns a compile or link error carrying the native diagnostic,
    /// which implementations also log.
    fn compile_shader(&mut self, vertex: &str, fragment: &str) -> PlatformResult<ShaderHandle>;

    /// Binds a program for subsequent draws.
    fn use_shader(&mut self, shader: ShaderHandle);

    /// Releases a program.
    fn delete_shader(&mut self, shader: ShaderHandle);

    /// Resident memory of the process in bytes.
    fn process_memory_usage(&self) -> usize;

    /// Monotonic seconds since the platform was created.
    fn wall_clock_time(&self) -> f64;
}
