//! Configuration management for parkit
//!
//! Config stored at: ~/.config/parkit/config.json

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use parkit_domain::service::FarePolicy;
use parkit_types::{ConfigError, OutputFormat, ParkingType, Result};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding spots.json and tickets.json
    #[serde(default)]
    pub store_dir: Option<PathBuf>,

    /// Facility layout TOML used to seed the spot store
    #[serde(default)]
    pub layout_path: Option<PathBuf>,

    /// Default output format (json, table)
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Pricing parameters
    #[serde(default)]
    pub fare: FarePolicy,
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("parkit");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Get the store directory path
    pub fn store_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.store_dir {
            return Ok(dir.clone());
        }

        let store_dir = dirs::data_dir()
            .ok_or(ConfigError::NotFound)?
            .join("parkit");
        Ok(store_dir)
    }

    /// Load config from `path`, falling back to defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            Config::default()
        };
        config.fare.validate()?;
        Ok(config)
    }

    /// Save config to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.fare.validate()?;

        // Ensure directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Parkit Configuration")?;
        writeln!(f, "====================")?;
        writeln!(f)?;
        writeln!(
            f,
            "Store dir:      {}",
            self.store_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "(error)".to_string())
        )?;
        writeln!(
            f,
            "Layout file:    {}",
            self.layout_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(built-in)".to_string())
        )?;
        writeln!(f, "Output format:  {}", self.output_format)?;
        writeln!(
            f,
            "Free duration:  {} min",
            self.fare.free_duration_hours * 60.0
        )?;
        writeln!(f, "Discount rate:  {}", self.fare.discount_rate)?;
        for parking_type in ParkingType::ALL {
            match self.fare.rate_per_hour(parking_type) {
                Some(rate) => writeln!(f, "Rate {:<5}      {:.2} /h", parking_type, rate)?,
                None => writeln!(f, "Rate {:<5}      (missing)", parking_type)?,
            }
        }

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:    {}", path.display())?;
        }

        Ok(())
    }
}
