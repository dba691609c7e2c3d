//! INI serialization: `ConfigFile` → commented INI string.

use std::path::Path;

use super::defaults::millis;
use super::settings::ConfigFile;

/// Convert a `ConfigFile` to the commented INI written to `config.ini`.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let fuel_types = config
        .search
        .fuel_types
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let excluded_brands = config.filter.excluded_brands.join(", ");

    format!(
        r#"[service]
; Base URL of the station price feed
base_url = {}
; Request timeout in seconds
timeout_secs = {}

[fetch]
; Minimum seconds between location-driven refreshes
poll_interval_secs = {}
; Minimum milliseconds between user-driven refreshes
min_forced_spacing_ms = {}

[location]
; A new position is used when either threshold is met
min_interval_secs = {}
min_distance_m = {}
; Seconds to wait for a first fix before warning
fix_timeout_secs = {}

[search]
; Search radius around your position, in meters
radius_m = {}
; Fuel types offered, first is the default:
;   gasoline95, gasoline98, diesel, premium_diesel, lpg
fuel_types = {}
; price or distance
sort = {}

[filter]
; Comma-separated brands to hide
excluded_brands = {}

[layout]
; Map share of the screen with the list at the top, and scrolled
map_biased = {}
list_biased = {}
scroll_threshold_px = {}
debounce_ms = {}
animation_ms = {}
scroll_correction_px = {}

[logging]
file = {}
"#,
        config.service.base_url,
        config.service.timeout_secs,
        config.fetch.poll_interval.as_secs(),
        millis(config.fetch.min_forced_spacing),
        config.location.min_interval.as_secs(),
        config.location.min_distance_m,
        config.location.fix_timeout.as_secs(),
        config.search.radius_m,
        fuel_types,
        config.search.sort,
        excluded_brands,
        config.layout.map_biased,
        config.layout.list_biased,
        config.layout.scroll_threshold_px,
        millis(config.layout.debounce),
        millis(config.layout.animation),
        config.layout.scroll_correction_px,
        path_to_string(&config.logging.file),
    )
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
