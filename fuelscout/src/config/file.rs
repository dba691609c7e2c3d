//! Configuration file handling for ~/.fuelscout/config.ini.
//!
//! Section structs live in [`super::settings`], defaults in
//! [`super::defaults`], parsing in [`super::parser`] and serialization in
//! [`super::writer`].

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use super::settings::ConfigFile;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load from the default path. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load from a specific path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Write the default file if none exists. Returns its path.
    pub fn ensure_exists() -> Result<PathBuf, ConfigFileError> {
        let path = config_file_path();
        if !path.exists() {
            Self::default().save_to(&path)?;
        }
        Ok(path)
    }
}

/// ~/.fuelscout
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".fuelscout")
}

/// ~/.fuelscout/config.ini
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station::{FuelType, SortOption};
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("missing.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.service.base_url = "https://prices.example.com".to_string();
        config.fetch.poll_interval = Duration::from_secs(120);
        config.search.fuel_types = vec![FuelType::Gasoline98, FuelType::Lpg];
        config.search.sort = SortOption::Distance;
        config.filter.excluded_brands = vec!["BrandA".to_string(), "Brand B".to_string()];
        config.layout.debounce = Duration::from_millis(80);
        config.logging.file = dir.path().join("out.log");

        config.save_to(&path).unwrap();
        let loaded = ConfigFile::load_from(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_file_reports_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[search]\nsort = cheapest\n").unwrap();

        let err = ConfigFile::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("search.sort"));
    }

    #[test]
    fn test_orchestrator_config_mapping() {
        let mut config = ConfigFile::default();
        config.fetch.poll_interval = Duration::from_secs(30);
        config.location.fix_timeout = Duration::from_secs(5);
        config.layout.scroll_correction_px = 4.0;

        let orchestrator = config.orchestrator_config();
        assert_eq!(orchestrator.fetch.poll_interval, Duration::from_secs(30));
        assert_eq!(orchestrator.fix_timeout, Duration::from_secs(5));
        assert_eq!(orchestrator.scroll_correction_px, 4.0);
    }

    #[test]
    fn test_settings_mapping() {
        let mut config = ConfigFile::default();
        config.filter.excluded_brands = vec!["X".to_string()];
        config.search.radius_m = 1200;

        let settings = config.settings();
        assert!(settings.excluded_brands.contains("X"));
        assert_eq!(settings.radius_m, 1200);
        assert_eq!(settings.default_fuel_type(), FuelType::Diesel);
    }

    #[test]
    fn test_config_path_layout() {
        let path = config_file_path();
        assert!(path.ends_with(".fuelscout/config.ini"));
    }
}
