//! User configuration.
//!
//! `~/.fuelscout/config.ini` seeds both the [`OrchestratorConfig`] tunables
//! and the initial [`Settings`] context.
//!
//! # Example
//!
//! ```no_run
//! use fuelscout::config::ConfigFile;
//!
//! let config = ConfigFile::load().unwrap_or_default();
//! let tunables = config.orchestrator_config();
//! let settings = config.settings();
//! # let _ = (tunables, settings);
//! ```
//!
//! [`OrchestratorConfig`]: crate::orchestrator::OrchestratorConfig
//! [`Settings`]: crate::orchestrator::Settings

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::{
    default_log_file, DEFAULT_BASE_URL, DEFAULT_FUEL_TYPES, DEFAULT_LOG_FILE, DEFAULT_SORT,
};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    ConfigFile, FetchSettings, FilterSettings, LayoutSettings, LocationSettings, LoggingSettings,
    SearchSettings, ServiceSettings,
};
