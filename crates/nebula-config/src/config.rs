//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Visual effect scheduling settings.
    pub effects: EffectsConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Global particle volume setting, as exposed in the video options.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[derive(clap::ValueEnum)]
pub enum ParticleSetting {
    /// Accept every registration.
    #[default]
    All,
    /// Accept roughly [`EffectsConfig::decreased_accept_fraction`] of registrations.
    Decreased,
    /// Accept only registrations marked exempt.
    Minimal,
}

/// Visual effect scheduling configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EffectsConfig {
    /// Initial particle setting handed to the host.
    pub particles: ParticleSetting,
    /// Fraction of registrations accepted at [`ParticleSetting::Decreased`] (0.0 - 1.0).
    pub decreased_accept_fraction: f32,
    /// Squared distance from the viewpoint beyond which cullable particles are dropped.
    pub cull_distance_sq: f32,
    /// Seed for the throttle's pseudo-random acceptance.
    pub throttle_seed: u64,
    /// Initial particle capacity of each billboard batch.
    pub particle_capacity: usize,
    /// Material key used for the main billboard batch.
    pub particle_material: u64,
    /// Material key used for the gateway billboard batch.
    pub gateway_material: u64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Also write JSON logs to a file in the log directory.
    pub log_to_file: bool,
}

// --- Default implementations ---

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            particles: ParticleSetting::All,
            decreased_accept_fraction: 0.5,
            cull_distance_sq: 256.0,
            throttle_seed: 0x5EED_F00D,
            particle_capacity: 1024,
            particle_material: 1,
            gateway_material: 2,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: false,
        }
    }
}

/// Platform config directory for the runtime, e.g. `~/.config/nebula`.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("nebula"))
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from `config_dir` if given, else from [`default_config_dir`].
    pub fn load_from(config_dir: Option<&Path>) -> Result<Self, ConfigError> {
        match config_dir {
            Some(dir) => Self::load_or_create(dir),
            None => {
                let dir = default_config_dir().ok_or(ConfigError::NoConfigDir)?;
                Self::load_or_create(&dir)
            }
        }
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
