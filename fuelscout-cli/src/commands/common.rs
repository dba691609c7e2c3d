//! Helpers shared across CLI commands.

use fuelscout::orchestrator::Settings;
use fuelscout::station::{FuelType, SortOption};

/// Apply CLI overrides on top of the config-derived settings.
///
/// A chosen fuel type becomes the default by moving it to the front of
/// the offered list.
pub fn apply_overrides(
    mut settings: Settings,
    fuel: Option<FuelType>,
    sort: Option<SortOption>,
    radius_m: Option<u32>,
) -> Settings {
    if let Some(fuel) = fuel {
        settings.fuel_types.retain(|f| *f != fuel);
        settings.fuel_types.insert(0, fuel);
    }
    if let Some(sort) = sort {
        settings.default_sort = sort;
    }
    if let Some(radius_m) = radius_m {
        settings = settings.with_radius(radius_m);
    }
    settings
}
