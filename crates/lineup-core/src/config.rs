// Configuration loading and parsing (lineup.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::engine::partition::BalanceParams;
use crate::engine::provision::ProvisionDefaults;
use crate::player::{MAX_LEVEL, MIN_LEVEL};

/// File name looked up under `config/` and the per-user config directory.
pub const CONFIG_FILE_NAME: &str = "lineup.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

/// Fully assembled configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub storage: StorageConfig,
    pub balance: BalanceParams,
    pub provisioning: ProvisionDefaults,
    /// File the config was read from; `None` when built-in defaults are used.
    pub source: Option<PathBuf>,
}

/// Raw deserialization target for the entire lineup.toml file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    storage: StorageConfig,
    balance: BalanceParams,
    provisioning: ProvisionDefaults,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file. When unset, `lineup.db` in the per-user data directory.
    pub db_path: Option<String>,
    /// Key holding the roster JSON array.
    pub roster_key: String,
    /// Key holding the participant set ("next game") JSON array.
    pub participants_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            db_path: None,
            roster_key: "Players".into(),
            participants_key: "NextGame".into(),
        }
    }
}

impl StorageConfig {
    /// Resolve the database path, falling back to the per-user data directory
    /// and finally to `lineup.db` in the working directory.
    pub fn resolved_db_path(&self) -> PathBuf {
        if let Some(path) = &self.db_path {
            return PathBuf::from(path);
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().join("lineup.db"))
            .unwrap_or_else(|| PathBuf::from("lineup.db"))
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "lineup")
}

/// Parse and validate a config file at an explicit path.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let text = read_file(path)?;
    let file: ConfigFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = Config {
        storage: file.storage,
        balance: file.balance,
        provisioning: file.provisioning,
        source: Some(path.to_path_buf()),
    };
    validate(&config)?;
    Ok(config)
}

/// Load `config/lineup.toml` relative to `base_dir`. A missing file means
/// built-in defaults.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE_NAME);
    if path.exists() {
        load_config_file(&path)
    } else {
        Ok(Config::default())
    }
}

/// Convenience wrapper: `config/lineup.toml` under the working directory, then
/// `lineup.toml` in the per-user config directory, then built-in defaults.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    if cwd.join("config").join(CONFIG_FILE_NAME).exists() {
        return load_config_from(&cwd);
    }
    if let Some(dirs) = project_dirs() {
        let user_path = dirs.config_dir().join(CONFIG_FILE_NAME);
        if user_path.exists() {
            return load_config_file(&user_path);
        }
    }
    Ok(Config::default())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let storage = &config.storage;
    let key_fields: &[(&str, &str)] = &[
        ("storage.roster_key", &storage.roster_key),
        ("storage.participants_key", &storage.participants_key),
    ];
    for (name, val) in key_fields {
        if val.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }
    if storage.roster_key == storage.participants_key {
        return Err(ConfigError::ValidationError {
            field: "storage.participants_key".into(),
            message: "must differ from storage.roster_key".into(),
        });
    }

    let balance = &config.balance;
    if balance.skill_margin_with_fitness < balance.skill_margin {
        return Err(ConfigError::ValidationError {
            field: "balance.skill_margin_with_fitness".into(),
            message: format!(
                "must be >= balance.skill_margin ({}), got {}",
                balance.skill_margin, balance.skill_margin_with_fitness
            ),
        });
    }
    let range_fields: &[(&str, u32)] = &[
        ("balance.skill_variation", balance.skill_variation),
        ("balance.fitness_variation", balance.fitness_variation),
    ];
    for (name, val) in range_fields {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }
    let p = balance.fallback_probability;
    if !(0.0..=1.0).contains(&p) {
        return Err(ConfigError::ValidationError {
            field: "balance.fallback_probability".into(),
            message: format!("must be between 0.0 and 1.0 inclusive, got {p}"),
        });
    }

    let defaults = &config.provisioning;
    let level_fields: &[(&str, u8)] = &[
        ("provisioning.skill_level", defaults.skill_level),
        ("provisioning.fitness_level", defaults.fitness_level),
    ];
    for (name, val) in level_fields {
        if !(MIN_LEVEL..=MAX_LEVEL).contains(val) {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be between {MIN_LEVEL} and {MAX_LEVEL}, got {val}"),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
