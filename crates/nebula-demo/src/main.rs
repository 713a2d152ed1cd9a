//! Headless demo host for the effect scheduler.
//!
//! Loads `config.ron` (overridable from the command line), drives a
//! fixed-timestep loop for a number of frames and draws into a recording
//! backend. Fireworks spawn embers from their tick, flares spawn gateway
//! motes from their draw call, and the observer walks away from the action so
//! distance culling kicks in.
//!
//! Run with `cargo run -p nebula-demo -- --frames 600 --particles decreased`.

mod effects;
mod game_loop;

use clap::Parser;
use glam::{Quat, Vec3};
use nebula_config::{CliArgs, Config, default_config_dir};
use nebula_particles::{EffectScheduler, HostState, RecordingBackend, ViewBasis};
use tracing::{debug, info, warn};

use crate::game_loop::GameLoop;

/// Steps between firework launches.
const FIREWORK_INTERVAL: u64 = 45;
/// Steps between overlay flares.
const FLARE_INTERVAL: u64 = 120;

#[derive(Parser, Debug)]
#[command(name = "nebula-demo", about = "Headless Nebula effects demo")]
struct DemoArgs {
    #[command(flatten)]
    common: CliArgs,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Simulated frame time in milliseconds.
    #[arg(long, default_value_t = 16.0)]
    frame_ms: f64,
}

struct Demo {
    effects: EffectScheduler<HostState>,
    backend: RecordingBackend,
    steps: u64,
    submissions: usize,
    quads: usize,
}

impl Demo {
    fn step(&mut self) {
        let host = self.effects.host_mut();
        // The observer only exists from the second step on, and drifts away.
        host.viewpoint =
            (self.steps > 0).then(|| Vec3::new(0.0, 1.5, 6.0 + self.steps as f32 * 0.02));

        let origin = Vec3::new((self.steps / FIREWORK_INTERVAL) as f32 % 5.0 - 2.0, 0.0, 0.0);
        if self.steps % FIREWORK_INTERVAL == 0
            && let Err(e) = self.effects.register(effects::firework(origin, self.steps))
        {
            warn!("Firework rejected: {e}");
        }
        if self.steps % FLARE_INTERVAL == 0
            && let Err(e) = self.effects.register(effects::flare(Vec3::new(0.0, 3.0, 0.0)))
        {
            warn!("Flare rejected: {e}");
        }

        self.effects.tick();
        self.steps += 1;
    }

    fn render(&mut self, partial_tick: f32) {
        let camera = self
            .effects
            .host()
            .viewpoint
            .unwrap_or(Vec3::new(0.0, 1.5, 6.0));
        let view = ViewBasis::from_camera(camera, Quat::IDENTITY);

        self.backend.clear();
        self.effects
            .render_world(partial_tick, &view, &mut self.backend);
        self.effects
            .render_overlay(partial_tick, &view, &mut self.backend);

        self.submissions += self.backend.submissions().len();
        self.quads += self
            .backend
            .submissions()
            .iter()
            .map(|s| s.quad_count())
            .sum::<usize>();
    }
}

fn main() {
    let args = DemoArgs::parse();

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_from(args.common.config.as_deref()).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args.common);

    let log_dir = args
        .common
        .config
        .clone()
        .or_else(default_config_dir)
        .map(|dir| dir.join("logs"));
    if let Err(e) = nebula_log::init_logging(log_dir.as_deref(), Some(&config)) {
        eprintln!("Failed to initialize logging: {e}");
    }

    info!(
        particles = ?config.effects.particles,
        cull_distance_sq = config.effects.cull_distance_sq,
        frames = args.frames,
        "Starting effects demo"
    );

    let mut demo = Demo {
        effects: EffectScheduler::new(HostState::from_config(&config.effects), &config.effects),
        backend: RecordingBackend::new(),
        steps: 0,
        submissions: 0,
        quads: 0,
    };

    let mut game_loop = GameLoop::new();
    let frame_time = args.frame_ms / 1000.0;
    for frame in 0..args.frames {
        game_loop.frame(&mut demo, frame_time, Demo::step, |demo, partial| {
            demo.render(partial)
        });
        if frame % 60 == 0 {
            debug!(
                frame,
                live = demo.effects.debug_count(),
                particles = demo.effects.particle_count(),
                gateway = demo.effects.gateway_count(),
                "Frame"
            );
        }
    }

    // End of session: retire everything still alive.
    demo.effects.request_clear();
    demo.effects.tick();

    info!(
        frames = game_loop.frame_count(),
        steps = game_loop.step_count(),
        submissions = demo.submissions,
        quads = demo.quads,
        live = demo.effects.debug_count(),
        "Effects demo finished"
    );
    let stats = demo.effects.stats();
    info!(
        placed = stats.placed,
        deferred = stats.deferred,
        throttled = stats.throttled,
        culled = stats.culled,
        expired = stats.expired,
        failures = stats.failures,
        cleared = stats.cleared,
        "Scheduler stats"
    );
}
