//! Command-line argument parsing shared by effect hosts.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, ParticleSetting};

/// Common command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "nebula", about = "Nebula effects runtime")]
pub struct CliArgs {
    /// Particle volume (all, decreased, minimal).
    #[arg(long, value_enum)]
    pub particles: Option<ParticleSetting>,

    /// Squared cull distance for far-away particles.
    #[arg(long)]
    pub cull_distance_sq: Option<f32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(particles) = args.particles {
            self.effects.particles = particles;
        }
        if let Some(cull) = args.cull_distance_sq {
            self.effects.cull_distance_sq = cull;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
