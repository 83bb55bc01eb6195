//! # FLARE Headless Runner
//!
//! Runs the engine loop with no display and prints the memory report at
//! exit. Useful on servers and in CI to watch allocator behavior under a
//! synthetic workload.
//!
//! ```bash
//! RUST_LOG=debug ./flare_headless flare.toml
//! ```

use std::cell::Cell;
use std::process::ExitCode;
use std::rc::Rc;

use flare::core::object::BaseObject;
use flare::core::{Handler, Signal};
use flare::platform::{HeadlessPlatform, Platform};
use flare::{Engine, EngineConfig, EngineResult};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Frames run when the configuration sets no limit.
const DEFAULT_FRAMES: u64 = 600;

/// Emitted once a second of simulated time.
const HEARTBEAT: Signal<u64> = Signal::new("heartbeat");

const VERTEX: &str = "void main() { gl_Position = vec4(0.0, 0.0, 0.0, 1.0); }";
const FRAGMENT: &str = "void main() { frag_color = vec4(1.0); }";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn run(config: EngineConfig) -> EngineResult<()> {
    let frames = config.max_frames.unwrap_or(DEFAULT_FRAMES);
    let mut engine = Engine::new(config, HeadlessPlatform::new())?;
    engine.init()?;

    let shader = engine.platform_mut().compile_shader(VERTEX, FRAGMENT)?;
    engine.platform_mut().use_shader(shader);

    let beats = Rc::new(Cell::new(0_u64));
    let clock = engine.context_mut().objects.create(BaseObject);
    {
        let beats = Rc::clone(&beats);
        let on_beat = Handler::new(move |_: &u64| {
            beats.set(beats.get() + 1);
            Ok(())
        });
        engine.context_mut().objects.connect(clock, HEARTBEAT, &on_beat)?;
    }

    let mut elapsed = 0.0;
    let mut frame = 0_u64;
    engine.run_with(Some(frames), |ctx, delta| {
        // Scratch memory that lives for one frame.
        let size = 32 + usize::try_from(frame % 4096).unwrap_or(0);
        let mut scratch = ctx.allocator.allocate(size);
        scratch.as_bytes_mut()[..8].copy_from_slice(&frame.to_le_bytes());
        if let Some(class) = ctx.allocator.class_for(size) {
            ctx.allocator.free(scratch, class);
        }

        elapsed += delta;
        if elapsed >= 1.0 {
            elapsed -= 1.0;
            ctx.objects.emit(clock, HEARTBEAT, &frame);
        }
        frame += 1;
    })?;

    engine.platform_mut().delete_shader(shader);
    engine.context_mut().objects.unreference(clock)?;
    info!(heartbeats = beats.get(), "workload finished");

    let report = engine.shutdown();
    println!("{report}");
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => match EngineConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                error!(%path, error = %e, "failed to load configuration");
                return ExitCode::FAILURE;
            }
        },
        None => EngineConfig::default(),
    };

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "engine stopped");
            ExitCode::FAILURE
        }
    }
}
