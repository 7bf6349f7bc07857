//! Configuration loading for Ember.
//!
//! Reads `~/.ember/config.toml` (or the file named by `EMBER_CONFIG`). A
//! missing file is not an error; every section falls back to its defaults.

use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use ember_types::PromptSettings;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "EMBER_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: Option<String>,
}

/// Parsed config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EmberConfig {
    #[serde(flatten)]
    pub prompts: PromptSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EmberConfig {
    /// Load from the default location. Defaults when the file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::debug!("No home directory; using default config");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found; using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| {
            tracing::warn!("Failed to read config at {:?}: {}", path, source);
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        Self::parse(&content).map_err(|source| {
            tracing::warn!("Failed to parse config at {:?}: {}", path, source);
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// `$EMBER_CONFIG` if set, else `~/.ember/config.toml`.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_PATH_ENV).filter(|value| !value.is_empty()) {
        return Some(PathBuf::from(path));
    }
    ember_dir().map(|dir| dir.join("config.toml"))
}

/// `~/.ember`, where config and logs live.
#[must_use]
pub fn ember_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".ember"))
}
