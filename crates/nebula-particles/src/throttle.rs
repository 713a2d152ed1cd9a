//! Registration throttle driven by the global particle setting.
//!
//! Evaluated exactly once per registration attempt. Entries that were admitted
//! and buffered are not re-evaluated when the buffer is drained.

use nebula_config::ParticleSetting;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Pseudo-random admission filter.
#[derive(Clone, Debug)]
pub struct ThrottlePolicy {
    rng: ChaCha8Rng,
    accept_fraction: f32,
}

impl ThrottlePolicy {
    /// Create a policy accepting `accept_fraction` of attempts at
    /// [`ParticleSetting::Decreased`]. The fraction is clamped into `[0, 1]`.
    pub fn new(seed: u64, accept_fraction: f32) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            accept_fraction: clamp_fraction(accept_fraction),
        }
    }

    /// Fraction accepted at [`ParticleSetting::Decreased`].
    pub fn accept_fraction(&self) -> f32 {
        self.accept_fraction
    }

    /// Change the accepted fraction without reseeding.
    pub fn set_accept_fraction(&mut self, accept_fraction: f32) {
        self.accept_fraction = clamp_fraction(accept_fraction);
    }

    /// Decide whether one registration attempt is admitted.
    ///
    /// Exempt registrations pass at every setting.
    pub fn admits(&mut self, setting: ParticleSetting, exempt: bool) -> bool {
        if exempt {
            return true;
        }
        match setting {
            ParticleSetting::All => true,
            ParticleSetting::Decreased => self.rng.random_bool(f64::from(self.accept_fraction)),
            ParticleSetting::Minimal => false,
        }
    }
}

fn clamp_fraction(fraction: f32) -> f32 {
    if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    }
}
