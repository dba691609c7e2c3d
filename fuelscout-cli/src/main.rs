//! fuelscout CLI - Command-line interface
//!
//! Drives the fuelscout core against the HTTP price feed, with location
//! supplied as a fixed point or a replayed track.

mod commands;
mod error;
mod render;
mod replay;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fuelscout::station::{FuelType, SortOption};

use commands::config::ConfigCommands;
use commands::follow::FollowArgs;
use commands::search::SearchArgs;

#[derive(Parser)]
#[command(name = "fuelscout")]
#[command(version = fuelscout::VERSION)]
#[command(about = "Nearby fuel prices, following your position", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Follow a position and keep the nearby list up to date
    Follow {
        /// Fixed latitude in decimal degrees
        #[arg(long, requires = "lng", conflicts_with = "track", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Fixed longitude in decimal degrees
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,

        /// CSV track to replay (lat,lng[,delay_ms] per line)
        #[arg(long)]
        track: Option<PathBuf>,

        /// Fuel type (gasoline95, gasoline98, diesel, premium_diesel, lpg)
        #[arg(long)]
        fuel: Option<FuelType>,

        /// Sort order (price or distance)
        #[arg(long)]
        sort: Option<SortOption>,

        /// Search radius in meters
        #[arg(long)]
        radius: Option<u32>,

        /// Stop after this many seconds
        #[arg(long)]
        duration: Option<u64>,

        /// Mirror log output to the terminal
        #[arg(short, long)]
        verbose: bool,
    },

    /// Search an area by district (and municipality) and print the results
    Search {
        /// District name
        #[arg(long)]
        district: String,

        /// Municipality within the district
        #[arg(long)]
        municipality: Option<String>,

        /// Fuel type (gasoline95, gasoline98, diesel, premium_diesel, lpg)
        #[arg(long)]
        fuel: Option<FuelType>,

        /// Sort order (price or distance)
        #[arg(long)]
        sort: Option<SortOption>,

        /// Mirror log output to the terminal
        #[arg(short, long)]
        verbose: bool,
    },

    /// View or create the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Follow {
            lat,
            lng,
            track,
            fuel,
            sort,
            radius,
            duration,
            verbose,
        } => commands::follow::run(FollowArgs {
            lat,
            lng,
            track,
            fuel,
            sort,
            radius,
            duration,
            verbose,
        }),
        Commands::Search {
            district,
            municipality,
            fuel,
            sort,
            verbose,
        } => commands::search::run(SearchArgs {
            district,
            municipality,
            fuel,
            sort,
            verbose,
        }),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_follow_fixed_position() {
        let cli = Cli::try_parse_from([
            "fuelscout", "follow", "--lat", "38.71", "--lng", "-9.14", "--fuel", "lpg",
        ])
        .unwrap();

        match cli.command {
            Commands::Follow { lat, lng, fuel, .. } => {
                assert_eq!(lat, Some(38.71));
                assert_eq!(lng, Some(-9.14));
                assert_eq!(fuel, Some(FuelType::Lpg));
            }
            _ => panic!("expected follow"),
        }
    }

    #[test]
    fn test_follow_rejects_track_with_position() {
        let result = Cli::try_parse_from([
            "fuelscout", "follow", "--lat", "38.7", "--lng", "-9.1", "--track", "a.csv",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_search_rejects_unknown_sort() {
        let result = Cli::try_parse_from([
            "fuelscout", "search", "--district", "Lisboa", "--sort", "cheapest",
        ]);
        assert!(result.is_err());
    }
}
