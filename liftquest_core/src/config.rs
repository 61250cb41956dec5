//! Configuration file support for Liftquest.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/liftquest/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub advisor: AdvisorConfig,

    #[serde(default)]
    pub certification: CertificationConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Progression advisor parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Days of history the advisor analyzes
    #[serde(default = "default_history_days")]
    pub history_days: u32,

    /// sets x reps above this triggers an overwork warning
    #[serde(default = "default_volume_ceiling")]
    pub volume_ceiling: u32,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            history_days: default_history_days(),
            volume_ceiling: default_volume_ceiling(),
        }
    }
}

/// Certification workflow parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CertificationConfig {
    /// Approve passing submissions immediately, without manual review
    #[serde(default = "default_auto_approve")]
    pub auto_approve: bool,

    /// Floor for generated required weights (kg)
    #[serde(default = "default_min_required_weight")]
    pub min_required_weight_kg: f64,

    /// When true, experience banks up and levels advance only through
    /// approved certification attempts. When false, level-ups apply
    /// automatically as experience crosses each gate.
    #[serde(default)]
    pub gate_level_ups: bool,
}

impl Default for CertificationConfig {
    fn default() -> Self {
        Self {
            auto_approve: default_auto_approve(),
            min_required_weight_kg: default_min_required_weight(),
            gate_level_ups: false,
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME")
            .expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("liftquest")
}

fn default_history_days() -> u32 {
    28
}

fn default_volume_ceiling() -> u32 {
    25
}

fn default_auto_approve() -> bool {
    true
}

fn default_min_required_weight() -> f64 {
    5.0
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.advisor.history_days == 0 {
            return Err(Error::Config("advisor.history_days must be positive".into()));
        }
        if self.certification.min_required_weight_kg < 0.0 {
            return Err(Error::Config(
                "certification.min_required_weight_kg must be non-negative".into(),
            ));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME")
                .expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("liftquest").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Path of the workout record WAL inside the data directory
    pub fn wal_path(&self) -> PathBuf {
        self.data.data_dir.join("records.wal")
    }

    /// Path of the archived CSV record log
    pub fn csv_path(&self) -> PathBuf {
        self.data.data_dir.join("records.csv")
    }

    /// Path of the game state file
    pub fn state_path(&self) -> PathBuf {
        self.data.data_dir.join("state.json")
    }
}
