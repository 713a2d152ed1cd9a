//! Oracles the host application provides to the scheduler.

use glam::Vec3;
use nebula_config::{EffectsConfig, ParticleSetting};

/// Read-only view of host state consulted by the scheduler.
pub trait EffectHost {
    /// Observer position, or `None` before the observer exists in the world.
    fn viewpoint(&self) -> Option<Vec3>;

    /// Whether the simulation is paused. Registrations are ignored while paused.
    fn is_paused(&self) -> bool;

    /// Current global particle setting.
    fn particle_setting(&self) -> ParticleSetting;
}

/// Plain-data host that the application updates every frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HostState {
    /// Observer position.
    pub viewpoint: Option<Vec3>,
    /// Pause flag.
    pub paused: bool,
    /// Particle setting.
    pub particles: ParticleSetting,
}

impl HostState {
    /// Host state seeded from configuration, with no viewpoint yet.
    pub fn from_config(config: &EffectsConfig) -> Self {
        Self {
            viewpoint: None,
            paused: false,
            particles: config.particles,
        }
    }

    /// Host state with an observer at `viewpoint` and everything else default.
    pub fn at(viewpoint: Vec3) -> Self {
        Self {
            viewpoint: Some(viewpoint),
            ..Self::default()
        }
    }
}

impl EffectHost for HostState {
    fn viewpoint(&self) -> Option<Vec3> {
        self.viewpoint
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn particle_setting(&self) -> ParticleSetting {
        self.particles
    }
}
