use serde::{Deserialize, Serialize};
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "lifeline.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid value for {var}: {value}")]
    Env { var: &'static str, value: String },
    #[error("invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LifelineConfig {
    pub db_path: PathBuf,
    pub bind: IpAddr,
    pub port: u16,
    pub event_capacity: usize,
    pub busy_timeout_ms: u64,
    pub nearby_radius_km: f64,
    pub log_level: String,
}

impl Default for LifelineConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(".lifeline/lifeline.db"),
            bind: IpAddr::from([127, 0, 0, 1]),
            port: 4830,
            event_capacity: 1024,
            busy_timeout_ms: 5000,
            nearby_radius_km: 50.0,
            log_level: "info".to_string(),
        }
    }
}

impl LifelineConfig {
    /// Reads `path`, or `lifeline.toml` in the working directory when no path
    /// is given and that file exists, then applies `LIFELINE_*` overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::from_file(fallback)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.event_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "event_capacity",
                message: "must be at least 1".to_string(),
            });
        }
        if !self.nearby_radius_km.is_finite() || self.nearby_radius_km < 0.0 {
            return Err(ConfigError::Invalid {
                field: "nearby_radius_km",
                message: format!("{} is not a distance", self.nearby_radius_km),
            });
        }
        Ok(())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("LIFELINE_DB_PATH") {
            self.db_path = PathBuf::from(value);
        }
        if let Some(value) = lookup("LIFELINE_PORT") {
            self.port = value.parse().map_err(|_| ConfigError::Env {
                var: "LIFELINE_PORT",
                value,
            })?;
        }
        if let Some(value) = lookup("LIFELINE_LOG") {
            self.log_level = value;
        }
        Ok(())
    }
}
