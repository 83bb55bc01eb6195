//! # FLARE Engine Loop
//!
//! ```text
//! Frame N:
//! ┌─────────────────────────────────────────────────────────────┐
//! │ 1. UPDATE FRAME   platform polls events, samples the clock  │
//! │ 2. UPDATE         caller logic against the core Context     │
//! │ 3. CLEAR          back buffer to the configured color       │
//! │ 4. PRESENT        platform shows the frame                  │
//! │ 5. RECORD         frame stats, slow-frame warning           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The loop ends when the platform reports the window closed or the frame
//! limit is reached. [`Engine::shutdown`] consumes the engine and returns
//! the final memory report.

use std::fmt;
use std::time::Instant;

use flare_core::{Context, MemoryReport};
use flare_platform::Platform;
use tracing::{error, info, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::stats::{FrameStats, FrameStatsAccumulator, MAX_FRAME_TIME};

/// Everything known about a run once the engine stops.
#[derive(Clone, Debug)]
pub struct ShutdownReport {
    /// Allocator state at shutdown.
    pub memory: MemoryReport,
    /// Resident memory of the process in bytes.
    pub process_memory: usize,
    /// Frame timing over the run.
    pub stats: FrameStatsAccumulator,
}

impl fmt::Display for ShutdownReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.memory)?;
        writeln!(f, "Process memory: {} bytes", self.process_memory)?;
        write!(f, "{}", self.stats)
    }
}

/// The orchestrator: owns the core [`Context`] and drives a [`Platform`].
#[derive(Debug)]
pub struct Engine<P: Platform> {
    platform: P,
    context: Context,
    config: EngineConfig,
    frame_count: u64,
    stats: FrameStatsAccumulator,
    initialized: bool,
}

impl<P: Platform> Engine<P> {
    /// Builds the core. The window is not opened until [`Engine::init`].
    ///
    /// # Errors
    ///
    /// Fails if the core configuration is invalid.
    pub fn new(config: EngineConfig, platform: P) -> EngineResult<Self> {
        let context = Context::new(&config.core)?;
        Ok(Self {
            platform,
            context,
            config,
            frame_count: 0,
            stats: FrameStatsAccumulator::new(),
            initialized: false,
        })
    }

    /// Opens the window.
    ///
    /// # Errors
    ///
    /// Returns the platform's error if the window cannot be created; the
    /// frame loop must not run in that case.
    pub fn init(&mut self) -> EngineResult<()> {
        if self.initialized {
            return Ok(());
        }

        if let Err(e) = self.platform.init_window(&self.config.window) {
            error!(error = %e, "platform initialization failed");
            return Err(e.into());
        }

        self.initialized = true;
        let (width, height) = self.platform.window_size();
        info!(width, height, "engine initialized");
        Ok(())
    }

    /// Runs one frame with no caller logic.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotInitialized`] before [`Engine::init`].
    pub fn run_frame(&mut self) -> EngineResult<FrameStats> {
        self.run_frame_with(|_, _| {})
    }

    /// Runs one frame, calling `update` with the context and the frame
    /// delta in seconds between polling and clearing.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotInitialized`] before [`Engine::init`].
    pub fn run_frame_with<F>(&mut self, update: F) -> EngineResult<FrameStats>
    where
        F: FnOnce(&mut Context, f64),
    {
        if !self.initialized {
            return Err(EngineError::NotInitialized);
        }

        let start = Instant::now();

        self.platform.update_frame();
        let delta_seconds = self.platform.delta_time();

        update(&mut self.context, delta_seconds);

        let [r, g, b, a] = self.config.clear_color;
        self.platform.clear(r, g, b, a);
        self.platform.present();

        let elapsed = start.elapsed();
        let stats = FrameStats {
            frame: self.frame_count,
            delta_seconds,
            frame_us: u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
        };
        self.stats.record(stats);
        self.frame_count += 1;

        if elapsed > MAX_FRAME_TIME {
            warn!(
                frame = stats.frame,
                frame_ms = elapsed.as_secs_f64() * 1000.0,
                "frame exceeded budget"
            );
        }

        Ok(stats)
    }

    /// Runs frames until the window closes or `max_frames` have run.
    /// Returns the number of frames run.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotInitialized`] before [`Engine::init`].
    pub fn run(&mut self, max_frames: Option<u64>) -> EngineResult<u64> {
        self.run_with(max_frames, |_, _| {})
    }

    /// [`Engine::run`] with per-frame caller logic.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotInitialized`] before [`Engine::init`].
    pub fn run_with<F>(&mut self, max_frames: Option<u64>, mut update: F) -> EngineResult<u64>
    where
        F: FnMut(&mut Context, f64),
    {
        if !self.initialized {
            return Err(EngineError::NotInitialized);
        }

        let mut ran = 0;
        while self.platform.is_window_open() && !max_frames.is_some_and(|limit| ran >= limit) {
            self.run_frame_with(&mut update)?;
            ran += 1;
        }

        info!(frames = ran, "frame loop finished");
        Ok(ran)
    }

    /// Closes the window, tears down the core and reports memory usage.
    pub fn shutdown(mut self) -> ShutdownReport {
        self.platform.destroy_window();

        let process_memory = self.platform.process_memory_usage();
        let uptime_seconds = self.platform.wall_clock_time();
        let memory = self.context.shutdown();

        info!(
            frames = self.frame_count,
            process_memory,
            uptime_seconds,
            "engine shut down\n{memory}"
        );

        ShutdownReport {
            memory,
            process_memory,
            stats: self.stats,
        }
    }

    /// The core state.
    #[inline]
    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.context
    }

    /// Mutable core state, for work outside the frame loop.
    #[inline]
    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    /// The driven platform.
    #[inline]
    #[must_use]
    pub const fn platform(&self) -> &P {
        &self.platform
    }

    /// Mutable platform access, e.g. to compile shaders.
    #[inline]
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// The configuration the engine was built with.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Frames run so far.
    #[inline]
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Accumulated frame timing.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> &FrameStatsAccumulator {
        &self.stats
    }

    /// Whether [`Engine::init`] has succeeded.
    #[inline]
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flare_platform::{HeadlessPlatform, PlatformError, WindowConfig};
    use std::time::Duration;

    fn engine(platform: HeadlessPlatform) -> Engine<HeadlessPlatform> {
        Engine::new(EngineConfig::default(), platform).unwrap()
    }

    #[test]
    fn test_engine_creation() {
        let engine = engine(HeadlessPlatform::new());
        assert_eq!(engine.frame_count(), 0);
        assert!(!engine.is_initialized());
    }

    #[test]
    fn test_frames_require_init() {
        let mut engine = engine(HeadlessPlatform::new());
        assert_eq!(engine.run_frame(), Err(EngineError::NotInitialized));
        assert_eq!(engine.run(Some(1)), Err(EngineError::NotInitialized));
    }

    #[test]
    fn test_failed_init_stops_the_engine() {
        let config = EngineConfig {
            window: WindowConfig {
                height: 0,
                ..WindowConfig::default()
            },
            ..EngineConfig::default()
        };
        let mut engine = Engine::new(config, HeadlessPlatform::new()).unwrap();

        assert!(matches!(
            engine.init(),
            Err(EngineError::Platform(PlatformError::WindowInit(_)))
        ));
        assert!(!engine.is_initialized());
        assert_eq!(engine.run(None), Err(EngineError::NotInitialized));
    }

    #[test]
    fn test_run_frame_clears_and_presents() {
        let platform = HeadlessPlatform::new().with_fixed_step(Duration::from_millis(16));
        let mut engine = engine(platform);
        engine.init().unwrap();

        let stats = engine.run_frame().unwrap();
        assert_eq!(stats.frame, 0);
        assert!((stats.delta_seconds - 0.016).abs() < 1e-12);
        assert_eq!(engine.platform().frames_presented(), 1);
        assert_eq!(engine.platform().clear_color(), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(engine.frame_count(), 1);
    }

    #[test]
    fn test_run_respects_frame_limit() {
        let mut engine = engine(HeadlessPlatform::new());
        engine.init().unwrap();
        assert_eq!(engine.run(Some(5)).unwrap(), 5);
        assert_eq!(engine.stats().frames_recorded, 5);
    }

    #[test]
    fn test_run_stops_when_window_closes() {
        let mut engine = engine(HeadlessPlatform::new().close_after(3));
        engine.init().unwrap();
        assert_eq!(engine.run(None).unwrap(), 3);
    }

    #[test]
    fn test_update_sees_context() {
        let mut engine = engine(HeadlessPlatform::new());
        engine.init().unwrap();

        engine
            .run_with(Some(4), |ctx, _| {
                let block = ctx.allocator.allocate(100);
                ctx.allocator.free(block, 256);
            })
            .unwrap();

        assert_eq!(engine.context().allocator.total_allocations(), 4);
    }

    #[test]
    fn test_shutdown_reports_memory() {
        let mut engine = engine(HeadlessPlatform::new());
        engine.init().unwrap();
        engine.run(Some(2)).unwrap();

        let block = engine.context_mut().allocator.allocate(100);
        let report = engine.shutdown();

        assert_eq!(report.memory.total_allocations, 1);
        assert_eq!(report.memory.current_bytes, block.len());
        assert_eq!(report.stats.frames_recorded, 2);
        assert!(report.to_string().contains("=== Memory Report ==="));
    }
}
