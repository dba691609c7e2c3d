//! Default values for every configuration setting.

use std::path::PathBuf;
use std::time::Duration;

use super::settings::*;
use crate::fetch::{DEFAULT_MIN_FORCED_SPACING, DEFAULT_POLL_INTERVAL};
use crate::layout::{
    DEFAULT_ANIMATION_DURATION, DEFAULT_DEBOUNCE, DEFAULT_LIST_BIASED, DEFAULT_MAP_BIASED,
    DEFAULT_SCROLL_THRESHOLD_PX,
};
use crate::location::{DEFAULT_MIN_DISTANCE_M, DEFAULT_MIN_INTERVAL};
use crate::orchestrator::{DEFAULT_FIX_TIMEOUT, DEFAULT_RADIUS_M};
use crate::selection::DEFAULT_SCROLL_CORRECTION_PX;
use crate::station::{FuelType, SortOption, DEFAULT_TIMEOUT_SECS};

// =============================================================================
// Service
// =============================================================================

/// Placeholder feed URL; real deployments set `[service] base_url`.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

// =============================================================================
// Search
// =============================================================================

pub const DEFAULT_FUEL_TYPES: [FuelType; 2] = [FuelType::Diesel, FuelType::Gasoline95];

pub const DEFAULT_SORT: SortOption = SortOption::Price;

// =============================================================================
// Logging
// =============================================================================

pub const DEFAULT_LOG_FILE: &str = "fuelscout.log";

/// Default log file (~/.fuelscout/fuelscout.log).
pub fn default_log_file() -> PathBuf {
    super::file::config_directory().join(DEFAULT_LOG_FILE)
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            service: ServiceSettings {
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
            fetch: FetchSettings {
                poll_interval: DEFAULT_POLL_INTERVAL,
                min_forced_spacing: DEFAULT_MIN_FORCED_SPACING,
            },
            location: LocationSettings {
                min_interval: DEFAULT_MIN_INTERVAL,
                min_distance_m: DEFAULT_MIN_DISTANCE_M,
                fix_timeout: DEFAULT_FIX_TIMEOUT,
            },
            search: SearchSettings {
                radius_m: DEFAULT_RADIUS_M,
                fuel_types: DEFAULT_FUEL_TYPES.to_vec(),
                sort: DEFAULT_SORT,
            },
            filter: FilterSettings {
                excluded_brands: Vec::new(),
            },
            layout: LayoutSettings {
                map_biased: DEFAULT_MAP_BIASED,
                list_biased: DEFAULT_LIST_BIASED,
                scroll_threshold_px: DEFAULT_SCROLL_THRESHOLD_PX,
                debounce: DEFAULT_DEBOUNCE,
                animation: DEFAULT_ANIMATION_DURATION,
                scroll_correction_px: DEFAULT_SCROLL_CORRECTION_PX,
            },
            logging: LoggingSettings {
                file: default_log_file(),
            },
        }
    }
}

/// Milliseconds helper shared by the parser and writer.
pub(super) fn millis(duration: Duration) -> u64 {
    duration.as_millis() as u64
}
