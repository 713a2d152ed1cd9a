//! Fixed-timestep loop driving the effect scheduler.
//!
//! Simulation runs at a fixed 60 Hz out of an accumulator. Each frame renders
//! once with the leftover fraction of a step as the partial tick, so effects can
//! interpolate between the last two simulation states.

use tracing::warn;

/// Fixed simulation timestep: 60 Hz.
pub const FIXED_DT: f64 = 1.0 / 60.0;

/// Longest frame accepted before clamping, in seconds.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Accumulator state for a headless fixed-timestep loop.
///
/// Frame times are passed in explicitly so runs are reproducible.
#[derive(Debug, Default)]
pub struct GameLoop {
    accumulator: f64,
    frame_count: u64,
    step_count: u64,
}

impl GameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one frame of `frame_time` seconds over `state`.
    ///
    /// `step` runs zero or more times at the fixed rate, then `render` runs
    /// exactly once with the partial tick in `[0, 1)`.
    pub fn frame<S>(
        &mut self,
        state: &mut S,
        frame_time: f64,
        mut step: impl FnMut(&mut S),
        render: impl FnOnce(&mut S, f32),
    ) {
        let mut frame_time = frame_time.max(0.0);
        if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            frame_time = MAX_FRAME_TIME;
        }

        self.accumulator += frame_time;
        while self.accumulator >= FIXED_DT {
            step(state);
            self.accumulator -= FIXED_DT;
            self.step_count += 1;
        }

        render(state, self.partial_tick());
        self.frame_count += 1;
    }

    /// Fraction of a step accumulated but not yet simulated.
    pub fn partial_tick(&self) -> f32 {
        (self.accumulator / FIXED_DT).clamp(0.0, 1.0) as f32
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }
}
