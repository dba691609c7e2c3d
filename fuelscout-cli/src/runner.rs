//! CLI runner for common setup.
//!
//! Loads the config file, installs logging and builds the service and
//! runtime so command handlers don't repeat it.

use std::sync::Arc;

use tokio::runtime::Runtime;
use tracing::info;

use fuelscout::config::ConfigFile;
use fuelscout::logging::{init_logging, LoggingGuard};
use fuelscout::station::HttpStationService;

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Keeps the log writer alive while the runner exists
    _logging_guard: LoggingGuard,
    config: ConfigFile,
}

impl CliRunner {
    /// Load config and initialize logging.
    ///
    /// With `verbose`, log lines are mirrored to stdout when it is a
    /// terminal. Piped output stays clean.
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let stdout_enabled = verbose && atty::is(atty::Stream::Stdout);
        let logging_guard = init_logging(&config.logging.file, stdout_enabled)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            _logging_guard: logging_guard,
            config,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("fuelscout v{}", fuelscout::VERSION);
        info!("fuelscout CLI: {} command", command);
    }

    /// HTTP station service configured from `[service]`.
    pub fn create_service(&self) -> Result<Arc<HttpStationService>, CliError> {
        let service = HttpStationService::with_reqwest(
            self.config.service.base_url.clone(),
            self.config.service.timeout_secs,
        )?;
        info!(base_url = service.base_url(), "Station service created");
        Ok(Arc::new(service))
    }

    /// Multi-threaded tokio runtime for the orchestrator.
    pub fn runtime(&self) -> Result<Runtime, CliError> {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("fuelscout")
            .build()
            .map_err(CliError::Runtime)
    }
}
