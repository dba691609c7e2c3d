//! INI parsing: `Ini` → `ConfigFile`.
//!
//! The single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::station::{FuelType, SortOption};

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [service] section
    if let Some(section) = ini.section(Some("service")) {
        if let Some(v) = section.get("base_url") {
            let v = v.trim();
            if !(v.starts_with("http://") || v.starts_with("https://")) {
                return Err(invalid("service", "base_url", v, "must be an http(s) URL"));
            }
            config.service.base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = positive::<u64>(section, "service", "timeout_secs")? {
            config.service.timeout_secs = v;
        }
    }

    // [fetch] section
    if let Some(section) = ini.section(Some("fetch")) {
        if let Some(v) = positive::<u64>(section, "fetch", "poll_interval_secs")? {
            config.fetch.poll_interval = Duration::from_secs(v);
        }
        if let Some(v) = number::<u64>(section, "fetch", "min_forced_spacing_ms")? {
            config.fetch.min_forced_spacing = Duration::from_millis(v);
        }
    }

    // [location] section
    if let Some(section) = ini.section(Some("location")) {
        if let Some(v) = number::<u64>(section, "location", "min_interval_secs")? {
            config.location.min_interval = Duration::from_secs(v);
        }
        if let Some(v) = number::<f64>(section, "location", "min_distance_m")? {
            if !(v.is_finite() && v >= 0.0) {
                return Err(invalid(
                    "location",
                    "min_distance_m",
                    &v.to_string(),
                    "must be zero or positive",
                ));
            }
            config.location.min_distance_m = v;
        }
        if let Some(v) = positive::<u64>(section, "location", "fix_timeout_secs")? {
            config.location.fix_timeout = Duration::from_secs(v);
        }
    }

    // [search] section
    if let Some(section) = ini.section(Some("search")) {
        if let Some(v) = positive::<u32>(section, "search", "radius_m")? {
            config.search.radius_m = v;
        }
        if let Some(v) = section.get("fuel_types") {
            config.search.fuel_types = parse_fuel_types(v)?;
        }
        if let Some(v) = section.get("sort") {
            config.search.sort = SortOption::from_str(v.trim())
                .map_err(|reason| invalid("search", "sort", v, &reason))?;
        }
    }

    // [filter] section
    if let Some(section) = ini.section(Some("filter")) {
        if let Some(v) = section.get("excluded_brands") {
            config.filter.excluded_brands = split_list(v).map(str::to_string).collect();
        }
    }

    // [layout] section
    if let Some(section) = ini.section(Some("layout")) {
        if let Some(v) = fraction(section, "map_biased")? {
            config.layout.map_biased = v;
        }
        if let Some(v) = fraction(section, "list_biased")? {
            config.layout.list_biased = v;
        }
        if config.layout.list_biased >= config.layout.map_biased {
            return Err(invalid(
                "layout",
                "list_biased",
                &config.layout.list_biased.to_string(),
                "must be smaller than map_biased",
            ));
        }
        if let Some(v) = number::<f64>(section, "layout", "scroll_threshold_px")? {
            config.layout.scroll_threshold_px = v.max(0.0);
        }
        if let Some(v) = number::<u64>(section, "layout", "debounce_ms")? {
            config.layout.debounce = Duration::from_millis(v);
        }
        if let Some(v) = number::<u64>(section, "layout", "animation_ms")? {
            config.layout.animation = Duration::from_millis(v);
        }
        if let Some(v) = number::<f64>(section, "layout", "scroll_correction_px")? {
            config.layout.scroll_correction_px = v;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn number<T: FromStr>(
    section: &Properties,
    name: &str,
    key: &str,
) -> Result<Option<T>, ConfigFileError> {
    match section.get(key) {
        Some(v) => v
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| invalid(name, key, v, "must be a number")),
        None => Ok(None),
    }
}

fn positive<T: FromStr + PartialOrd + Default + ToString>(
    section: &Properties,
    name: &str,
    key: &str,
) -> Result<Option<T>, ConfigFileError> {
    match number::<T>(section, name, key)? {
        Some(v) if v <= T::default() => Err(invalid(name, key, &v.to_string(), "must be positive")),
        other => Ok(other),
    }
}

fn fraction(section: &Properties, key: &str) -> Result<Option<f64>, ConfigFileError> {
    match number::<f64>(section, "layout", key)? {
        Some(v) if !(v > 0.0 && v < 1.0) => Err(invalid(
            "layout",
            key,
            &v.to_string(),
            "must be between 0 and 1",
        )),
        other => Ok(other),
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_fuel_types(value: &str) -> Result<Vec<FuelType>, ConfigFileError> {
    let fuel_types = split_list(value)
        .map(|s| FuelType::from_str(s).map_err(|reason| invalid("search", "fuel_types", s, &reason)))
        .collect::<Result<Vec<_>, _>>()?;

    if fuel_types.is_empty() {
        return Err(invalid(
            "search",
            "fuel_types",
            value,
            "must list at least one fuel type",
        ));
    }
    Ok(fuel_types)
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
