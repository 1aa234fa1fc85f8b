//! Demo configuration.
//!
//! Settings are read from a JSON file at `$MATDEMO_CONFIG`, falling back to
//! `<config dir>/matdemo/config.json`. Every field is optional. A missing per-user file means
//! defaults, while a missing `$MATDEMO_CONFIG` file is an error.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use glam::Vec3;
use serde::{Deserialize, Serialize};

pub const CONFIG_ENV_VAR: &str = "MATDEMO_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown log level '{0}'")]
    LogLevel(String),
}

/// Which flavour of the demo to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Third sphere uses the opaque program, water normals come from an image file.
    #[default]
    Textured,
    /// Third sphere reuses the metal program, water normals are generated from noise.
    Procedural,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub variant: Variant,
    pub assets_dir: PathBuf,
    pub log_level: String,
    pub unbind_textures: bool,
    /// Units per second.
    pub camera_speed: f32,
    /// Degrees per pixel of mouse motion.
    pub mouse_sensitivity: f32,
    pub light_position: [f32; 3],
    pub fov: f32,
    pub noise_seed: i32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            title: "Material Demo".to_string(),
            width: 1000,
            height: 800,
            fullscreen: false,
            variant: Variant::default(),
            assets_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/assets")),
            log_level: "info".to_string(),
            unbind_textures: true,
            camera_speed: 2.0,
            mouse_sensitivity: 0.1,
            light_position: [3.0, 3.0, 3.0],
            fov: 45.0,
            noise_seed: 1337,
        }
    }
}

impl DemoConfig {
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let config: DemoConfig = serde_json::from_str(s)?;
        config.log_level()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// The per-user config file, `<config dir>/matdemo/config.json`.
    pub fn user_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("matdemo").join("config.json"))
    }

    /// Loads the file named by `$MATDEMO_CONFIG`, or else the per-user file, or else returns the
    /// defaults.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let explicit = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        Self::resolve(explicit.as_deref(), Self::user_path())
    }

    /// An explicit path must load. The per-user path is optional.
    fn resolve(explicit: Option<&Path>, user: Option<PathBuf>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match user {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn log_level(&self) -> Result<log::LevelFilter, ConfigError> {
        log::LevelFilter::from_str(&self.log_level)
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }

    pub fn light_position(&self) -> Vec3 {
        Vec3::from(self.light_position)
    }
}
