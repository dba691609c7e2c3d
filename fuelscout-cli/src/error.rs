//! CLI error handling with user-friendly messages.
//!
//! Every command returns `Result<(), CliError>`; `main` turns the error into
//! a message on stderr and exit code 1.

use std::fmt;
use std::process;

use fuelscout::config::ConfigFileError;
use fuelscout::station::FetchError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Config file could not be read or written
    ConfigFile(ConfigFileError),
    /// Station service could not be created or queried
    Service(FetchError),
    /// Location track could not be loaded
    Track { path: String, reason: String },
    /// Async runtime could not be started
    Runtime(std::io::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Service(_) => {
                eprintln!();
                eprintln!("Check that:");
                eprintln!("  1. base_url in the [service] section points at the price feed");
                eprintln!("  2. The feed is reachable from this machine");
                eprintln!(
                    "  3. timeout_secs is long enough (see: fuelscout config list)"
                );
            }
            CliError::Track { .. } => {
                eprintln!();
                eprintln!("Track files hold one fix per line: lat,lng[,delay_ms]");
                eprintln!("Blank lines and lines starting with '#' are ignored.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Service(e) => write!(f, "Station service error: {}", e),
            CliError::Track { path, reason } => {
                write!(f, "Failed to load track '{}': {}", path, reason)
            }
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Service(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<FetchError> for CliError {
    fn from(e: FetchError) -> Self {
        CliError::Service(e)
    }
}
