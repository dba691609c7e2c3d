//! Typed configuration sections.

use std::path::PathBuf;
use std::time::Duration;

use crate::fetch::FetchPolicy;
use crate::layout::LayoutConfig;
use crate::location::WatchOptions;
use crate::orchestrator::{OrchestratorConfig, Settings};
use crate::station::{FuelType, SortOption};

/// Parsed `config.ini`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub service: ServiceSettings,
    pub fetch: FetchSettings,
    pub location: LocationSettings,
    pub search: SearchSettings,
    pub filter: FilterSettings,
    pub layout: LayoutSettings,
    pub logging: LoggingSettings,
}

/// `[service]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

/// `[fetch]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSettings {
    pub poll_interval: Duration,
    pub min_forced_spacing: Duration,
}

/// `[location]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationSettings {
    pub min_interval: Duration,
    pub min_distance_m: f64,
    pub fix_timeout: Duration,
}

/// `[search]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    pub radius_m: u32,
    pub fuel_types: Vec<FuelType>,
    pub sort: SortOption,
}

/// `[filter]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSettings {
    pub excluded_brands: Vec<String>,
}

/// `[layout]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSettings {
    pub map_biased: f64,
    pub list_biased: f64,
    pub scroll_threshold_px: f64,
    pub debounce: Duration,
    pub animation: Duration,
    pub scroll_correction_px: f64,
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub file: PathBuf,
}

impl ConfigFile {
    /// Tunables for the orchestrator.
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        let fetch = FetchPolicy::default()
            .with_poll_interval(self.fetch.poll_interval)
            .with_min_forced_spacing(self.fetch.min_forced_spacing);

        let watch = WatchOptions {
            min_interval: self.location.min_interval,
            min_distance_m: self.location.min_distance_m,
        };

        let layout = LayoutConfig {
            map_biased: self.layout.map_biased,
            list_biased: self.layout.list_biased,
            scroll_threshold_px: self.layout.scroll_threshold_px,
            debounce: self.layout.debounce,
            duration: self.layout.animation,
            ..LayoutConfig::default()
        };

        OrchestratorConfig {
            scroll_correction_px: self.layout.scroll_correction_px,
            ..OrchestratorConfig::default()
        }
        .with_fetch_policy(fetch)
        .with_watch_options(watch)
        .with_layout(layout)
        .with_fix_timeout(self.location.fix_timeout)
    }

    /// Initial user settings seeded from the file.
    pub fn settings(&self) -> Settings {
        Settings {
            excluded_brands: self.filter.excluded_brands.iter().cloned().collect(),
            radius_m: self.search.radius_m,
            fuel_types: self.search.fuel_types.clone(),
            default_sort: self.search.sort,
        }
    }
}
