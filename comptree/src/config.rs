//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/comptree/comptree.toml`
//! 3. Explicit config file passed to [`Settings::load`]
//! 4. Environment variables: `COMPTREE_*` prefix, `__` between sections

use std::path::{Path, PathBuf};

use config::{Config, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::ports::DirectionPolicy;

/// Errors raised while loading or rendering settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {message}")]
    Parse { message: String },

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Port admission settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct PortSettings {
    /// Rule a port vec applies to the direction of its ports
    pub direction_policy: DirectionPolicy,
}

/// Tree shape limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TreeSettings {
    /// Deepest allowed node, counting the root as 1
    pub max_depth: usize,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

/// Raw settings for intermediate parsing (fields are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub ports: RawPortSettings,
    pub tree: RawTreeSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawPortSettings {
    pub direction_policy: Option<DirectionPolicy>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawTreeSettings {
    pub max_depth: Option<usize>,
}

/// Unified configuration for comptree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    pub ports: PortSettings,
    pub tree: TreeSettings,
}

/// Get the XDG config directory for comptree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "comptree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("comptree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_raw_settings(&content)
}

fn parse_raw_settings(content: &str) -> Result<RawSettings, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::Parse {
        message: e.to_string(),
    })
}

fn config_err(e: config::ConfigError) -> ConfigError {
    ConfigError::Parse {
        message: e.to_string(),
    }
}

impl Settings {
    /// Overlay wins for every field it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            ports: PortSettings {
                direction_policy: overlay
                    .ports
                    .direction_policy
                    .unwrap_or(self.ports.direction_policy),
            },
            tree: TreeSettings {
                max_depth: overlay.tree.max_depth.unwrap_or(self.tree.max_depth),
            },
        }
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.tree.max_depth == 0 {
            return Err(ConfigError::InvalidValue {
                key: "tree.max_depth".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(self)
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file, must exist if given
    #[instrument(level = "debug")]
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!(path = %global_path.display(), "loading global config");
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        // 3. Explicit config file
        if let Some(path) = config_file {
            debug!(path = %path.display(), "loading config file");
            current = current.merge_with(&load_raw_settings(path)?);
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.validate()
    }

    /// Parse settings from a TOML string on top of the defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::default()
            .merge_with(&parse_raw_settings(content)?)
            .validate()
    }

    /// Apply COMPTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("COMPTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("ports.direction_policy") {
            settings.ports.direction_policy =
                val.parse().map_err(|message| ConfigError::InvalidValue {
                    key: "ports.direction_policy".to_string(),
                    message,
                })?;
        }
        if let Ok(val) = config.get_string("tree.max_depth") {
            settings.tree.max_depth = val.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    key: "tree.max_depth".to_string(),
                    message: e.to_string(),
                }
            })?;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            message: format!("serialize config: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_default_settings_when_created_then_uses_opposite_policy() {
        let settings = Settings::default();
        assert_eq!(settings.ports.direction_policy, DirectionPolicy::Opposite);
        assert_eq!(settings.tree.max_depth, 64);
    }

    #[test]
    fn given_partial_toml_when_parsing_then_keeps_other_defaults() {
        let settings = Settings::from_toml_str("[ports]\ndirection_policy = \"same\"\n").unwrap();
        assert_eq!(settings.ports.direction_policy, DirectionPolicy::Same);
        assert_eq!(settings.tree.max_depth, 64);
    }

    #[test]
    fn given_zero_depth_when_parsing_then_rejects() {
        let err = Settings::from_toml_str("[tree]\nmax_depth = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn given_settings_when_rendering_then_round_trips_through_toml() {
        let settings = Settings {
            ports: PortSettings {
                direction_policy: DirectionPolicy::Same,
            },
            tree: TreeSettings { max_depth: 8 },
        };
        let rendered = settings.to_toml().unwrap();
        assert!(rendered.contains("direction_policy = \"same\""));
        assert_eq!(Settings::from_toml_str(&rendered).unwrap(), settings);
    }
}
