//! Configuration CLI commands.
//!
//! `config path` shows where the file lives, `config list` the effective
//! values after defaults are applied, `config init` writes a commented file.

use clap::Subcommand;

use fuelscout::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// List the effective configuration
    List,

    /// Write a default configuration file if none exists
    Init,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(),
        ConfigCommands::List => run_list(),
        ConfigCommands::Init => run_init(),
    }
}

fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path().display());
    Ok(())
}

fn run_list() -> Result<(), CliError> {
    let config = ConfigFile::load()?;

    println!("Configuration Settings");
    println!("======================");
    println!();

    for (section, entries) in entries(&config) {
        println!("[{}]", section);
        for (key, value) in entries {
            if value.is_empty() {
                println!("  {} = (not set)", key);
            } else {
                println!("  {} = {}", key, value);
            }
        }
        println!();
    }

    Ok(())
}

fn run_init() -> Result<(), CliError> {
    let existed = config_file_path().exists();
    let path = ConfigFile::ensure_exists()?;

    if existed {
        println!("Configuration file already exists: {}", path.display());
    } else {
        println!("Created configuration file: {}", path.display());
    }
    println!();
    println!("CLI arguments override config file values when specified.");
    Ok(())
}

type Section = (&'static str, Vec<(&'static str, String)>);

/// Effective values grouped by INI section, in file order.
fn entries(config: &ConfigFile) -> Vec<Section> {
    let fuel_types = config
        .search
        .fuel_types
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    vec![
        (
            "service",
            vec![
                ("base_url", config.service.base_url.clone()),
                ("timeout_secs", config.service.timeout_secs.to_string()),
            ],
        ),
        (
            "fetch",
            vec![
                (
                    "poll_interval_secs",
                    config.fetch.poll_interval.as_secs().to_string(),
                ),
                (
                    "min_forced_spacing_ms",
                    config.fetch.min_forced_spacing.as_millis().to_string(),
                ),
            ],
        ),
        (
            "location",
            vec![
                (
                    "min_interval_secs",
                    config.location.min_interval.as_secs().to_string(),
                ),
                ("min_distance_m", config.location.min_distance_m.to_string()),
                (
                    "fix_timeout_secs",
                    config.location.fix_timeout.as_secs().to_string(),
                ),
            ],
        ),
        (
            "search",
            vec![
                ("radius_m", config.search.radius_m.to_string()),
                ("fuel_types", fuel_types),
                ("sort", config.search.sort.to_string()),
            ],
        ),
        (
            "filter",
            vec![(
                "excluded_brands",
                config.filter.excluded_brands.join(", "),
            )],
        ),
        (
            "layout",
            vec![
                ("map_biased", config.layout.map_biased.to_string()),
                ("list_biased", config.layout.list_biased.to_string()),
                (
                    "scroll_threshold_px",
                    config.layout.scroll_threshold_px.to_string(),
                ),
                ("debounce_ms", config.layout.debounce.as_millis().to_string()),
                ("animation_ms", config.layout.animation.as_millis().to_string()),
                (
                    "scroll_correction_px",
                    config.layout.scroll_correction_px.to_string(),
                ),
            ],
        ),
        (
            "logging",
            vec![("file", config.logging.file.display().to_string())],
        ),
    ]
}
