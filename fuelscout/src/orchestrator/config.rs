//! Orchestrator configuration and the externally owned settings context.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::fetch::FetchPolicy;
use crate::filter::FilterConfig;
use crate::layout::LayoutConfig;
use crate::location::WatchOptions;
use crate::selection::DEFAULT_SCROLL_CORRECTION_PX;
use crate::station::{FuelType, SortOption};

/// Default search radius around the user.
pub const DEFAULT_RADIUS_M: u32 = 5000;

/// How long live mode may go without a fix before the user is told.
pub const DEFAULT_FIX_TIMEOUT: Duration = Duration::from_secs(15);

/// Capacity of the input event channel.
pub const DEFAULT_EVENT_BUFFER: usize = 64;

/// User settings, owned outside the core and observed read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub excluded_brands: BTreeSet<String>,
    pub radius_m: u32,
    /// Ordered; the first entry is the default selection.
    pub fuel_types: Vec<FuelType>,
    pub default_sort: SortOption,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            excluded_brands: BTreeSet::new(),
            radius_m: DEFAULT_RADIUS_M,
            fuel_types: vec![FuelType::Diesel, FuelType::Gasoline95],
            default_sort: SortOption::Price,
        }
    }
}

impl Settings {
    pub fn default_fuel_type(&self) -> FuelType {
        self.fuel_types.first().copied().unwrap_or(FuelType::Diesel)
    }

    pub fn filter_config(&self) -> FilterConfig {
        FilterConfig {
            excluded_brands: self.excluded_brands.clone(),
        }
    }

    pub fn with_excluded_brands<I, S>(mut self, brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_brands = brands.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_radius(mut self, radius_m: u32) -> Self {
        self.radius_m = radius_m;
        self
    }
}

/// Tunables for the orchestrator and the components it owns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrchestratorConfig {
    pub fetch: FetchPolicy,
    pub watch: WatchOptions,
    pub layout: LayoutConfig,
    pub scroll_correction_px: f64,
    pub fix_timeout: Duration,
    pub event_buffer: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            fetch: FetchPolicy::default(),
            watch: WatchOptions::default(),
            layout: LayoutConfig::default(),
            scroll_correction_px: DEFAULT_SCROLL_CORRECTION_PX,
            fix_timeout: DEFAULT_FIX_TIMEOUT,
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

impl OrchestratorConfig {
    pub fn with_fetch_policy(mut self, fetch: FetchPolicy) -> Self {
        self.fetch = fetch;
        self
    }

    pub fn with_watch_options(mut self, watch: WatchOptions) -> Self {
        self.watch = watch;
        self
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_fix_timeout(mut self, timeout: Duration) -> Self {
        self.fix_timeout = timeout;
        self
    }
}
