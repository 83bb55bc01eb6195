//! # Headless Platform
//!
//! A [`Platform`] with no display: servers, CI and tests. It keeps the
//! window state machine, frame clock and shader bookkeeping of a real host
//! so engine code runs unchanged.
//!
//! Shader "compilation" only checks that each stage is non-empty and
//! declares a `main` entry point.

use std::collections::HashSet;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::error::{PlatformError, PlatformResult};
use crate::platform::Platform;
use crate::process::{self, Clock};
use crate::shader::{ShaderHandle, ShaderStage};
use crate::window::WindowConfig;

#[derive(Debug)]
struct HeadlessWindow {
    config: WindowConfig,
    close_requested: bool,
}

/// Display-less [`Platform`] implementation.
#[derive(Debug)]
pub struct HeadlessPlatform {
    window: Option<HeadlessWindow>,
    clock: Clock,
    last_sample: Option<Duration>,
    delta: f64,
    fixed_step: Option<Duration>,
    close_after: Option<u64>,
    frames_presented: u64,
    clear_color: [f32; 4],
    shaders: HashSet<ShaderHandle>,
    next_shader: u32,
    bound_shader: Option<ShaderHandle>,
}

impl HeadlessPlatform {
    /// Creates a platform with a real-time frame clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            window: None,
            clock: Clock::start(),
            last_sample: None,
            delta: 0.0,
            fixed_step: None,
            close_after: None,
            frames_presented: 0,
            clear_color: [0.0; 4],
            shaders: HashSet::new(),
            next_shader: 1,
            bound_shader: None,
        }
    }

    /// Reports `step` as the delta of every frame instead of measuring it.
    #[must_use]
    pub fn with_fixed_step(mut self, step: Duration) -> Self {
        self.fixed_step = Some(step);
        self
    }

    /// Requests a window close after `frames` presents, as a user would.
    #[must_use]
    pub fn close_after(mut self, frames: u64) -> Self {
        self.close_after = Some(frames);
        self
    }

    /// Marks the window as asked to close.
    pub fn request_close(&mut self) {
        if let Some(window) = self.window.as_mut() {
            window.close_requested = true;
        }
    }

    /// Frames presented since creation.
    #[inline]
    #[must_use]
    pub const fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Last color passed to [`Platform::clear`].
    #[inline]
    #[must_use]
    pub const fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    /// Currently bound program.
    #[inline]
    #[must_use]
    pub const fn bound_shader(&self) -> Option<ShaderHandle> {
        self.bound_shader
    }

    /// Programs compiled and not yet deleted.
    #[inline]
    #[must_use]
    pub fn shader_count(&self) -> usize {
        self.shaders.len()
    }

    /// Title of the open window.
    #[must_use]
    pub fn window_title(&self) -> Option<&str> {
        self.window.as_ref().map(|w| w.config.title.as_str())
    }

    fn check_stage(stage: ShaderStage, source: &str) -> PlatformResult<()> {
        let log = if source.trim().is_empty() {
            "empty source"
        } else if !source.contains("main") {
            "no entry point 'main'"
        } else {
            return Ok(());
        };

        error!(%stage, log, "shader compilation failed");
        Err(PlatformError::ShaderCompile {
            stage,
            log: log.to_owned(),
        })
    }
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for HeadlessPlatform {
    fn init_window(&mut self, config: &WindowConfig) -> PlatformResult<()> {
        if self.window.is_some() {
            return Err(PlatformError::WindowInit("a window is already open".into()));
        }
        if config.width == 0 || config.height == 0 {
            return Err(PlatformError::WindowInit(format!(
                "zero-sized window {}x{}",
                config.width, config.height
            )));
        }

        info!(
            width = config.width,
            height = config.height,
            title = %config.title,
            fullscreen = config.fullscreen,
            vsync = config.vsync,
            "headless window opened"
        );

        self.window = Some(HeadlessWindow {
            config: config.clone(),
            close_requested: false,
        });
        self.last_sample = Some(self.clock.elapsed());
        self.delta = 0.0;
        Ok(())
    }

    fn destroy_window(&mut self) {
        if self.window.take().is_some() {
            // Programs die with the context.
            self.shaders.clear();
            self.bound_shader = None;
            info!(frames = self.frames_presented, "headless window destroyed");
        }
    }

    fn update_frame(&mut self) {
        let now = self.clock.elapsed();
        self.delta = match (self.fixed_step, self.last_sample) {
            (Some(step), _) => step.as_secs_f64(),
            (None, Some(last)) => now.saturating_sub(last).as_secs_f64(),
            (None, None) => 0.0,
        };
        self.last_sample = Some(now);
    }

    fn present(&mut self) {
        let Some(window) = self.window.as_mut() else {
            return;
        };
        self.frames_presented += 1;
        if self.close_after.is_some_and(|limit| self.frames_presented >= limit) {
            window.close_requested = true;
        }
    }

    fn is_window_open(&self) -> bool {
        self.window.as_ref().is_some_and(|w| !w.close_requested)
    }

    fn window_size(&self) -> (u32, u32) {
        self.window
            .as_ref()
            .map_or((0, 0), |w| (w.config.width, w.config.height))
    }

    fn delta_time(&self) -> f64 {
        self.delta
    }

    fn clear(&mut self, r: f32, g: f32, b: f32, a: f32) {
        if self.window.is_some() {
            self.clear_color = [r, g, b, a];
        }
    }

    fn compile_shader(&mut self, vertex: &str, fragment: &str) -> PlatformResult<ShaderHandle> {
        if self.window.is_none() {
            error!("shader compiled without a graphics context");
            return Err(PlatformError::NoWindow);
        }
        Self::check_stage(ShaderStage::Vertex, vertex)?;
        Self::check_stage(ShaderStage::Fragment, fragment)?;

        let handle = ShaderHandle::new(self.next_shader).ok_or_else(|| {
            error!("shader handles exhausted");
            PlatformError::ShaderLink("shader handles exhausted".into())
        })?;
        self.next_shader = self.next_shader.wrapping_add(1);
        self.shaders.insert(handle);

        debug!(shader = handle.raw(), "shader program linked");
        Ok(handle)
    }

    fn use_shader(&mut self, shader: ShaderHandle) {
        if self.shaders.contains(&shader) {
            self.bound_shader = Some(shader);
        } else {
            warn!(shader = shader.raw(), "use of unknown shader ignored");
        }
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        if !self.shaders.remove(&shader) {
            warn!(shader = shader.raw(), "delete of unknown shader ignored");
            return;
        }
        if self.bound_shader == Some(shader) {
            self.bound_shader = None;
        }
    }

    fn process_memory_usage(&self) -> usize {
        process::resident_memory()
    }

    fn wall_clock_time(&self) -> f64 {
        self.clock.seconds()
    }
}
