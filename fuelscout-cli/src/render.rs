//! Plain-text rendering of the view state.

use std::fmt::Write;

use fuelscout::coord::distance_m;
use fuelscout::orchestrator::{Mode, ViewError, ViewState};

/// Rows printed before the list is cut short.
pub const MAX_ROWS: usize = 20;

/// Render the header line plus one row per shown station.
pub fn render_view(view: &ViewState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", header(view));

    if let Some(ref error) = view.error {
        let _ = writeln!(out, "  ! {}", error_hint(error));
    }

    if view.loading {
        let _ = writeln!(out, "  Loading...");
        return out;
    }
    if view.mode == Mode::PermissionDenied {
        let _ = writeln!(out, "  Location access denied. Pin a search to browse by area.");
        return out;
    }
    if view.stations.is_empty() {
        let _ = writeln!(out, "  No stations.");
        return out;
    }

    for (index, record) in view.stations.iter().take(MAX_ROWS).enumerate() {
        let marker = if view.selected.as_ref() == Some(&record.id) {
            '>'
        } else {
            ' '
        };
        let price = record
            .price(view.fuel_type)
            .map(|p| format!("{:.3}", p))
            .unwrap_or_else(|| "-".to_string());
        let distance = view
            .location
            .map(|here| format_distance(distance_m(here, record.coordinates)))
            .unwrap_or_default();

        let _ = writeln!(
            out,
            "{} {:>2}. {:<28} {:<12} {:>7} {:>8}",
            marker,
            index + 1,
            truncate(&record.name, 28),
            truncate(&record.brand, 12),
            price,
            distance
        );
    }

    if view.stations.len() > MAX_ROWS {
        let _ = writeln!(out, "  ... {} more", view.stations.len() - MAX_ROWS);
    }
    out
}

fn header(view: &ViewState) -> String {
    let place = match (&view.pin_label, view.location) {
        (Some(label), _) => format!("in {}", label),
        (None, Some(here)) => format!("near {:.4}, {:.4}", here.latitude, here.longitude),
        (None, None) => "waiting for location".to_string(),
    };
    let updated = view
        .last_updated
        .map(|t| format!(" | updated {}", t.format("%H:%M:%S")))
        .unwrap_or_default();
    let refreshing = if view.refreshing { " | refreshing" } else { "" };
    let stale = if view.stale_parameters {
        " | results from previous query"
    } else {
        ""
    };

    format!(
        "[{}] {} by {} {}{}{}{}",
        view.mode, view.fuel_type, view.sort, place, updated, refreshing, stale
    )
}

fn error_hint(error: &ViewError) -> String {
    match error {
        ViewError::FetchFailed(_) => format!("{} (will retry on the next update)", error),
        ViewError::LocationUnavailable => format!("{} (still waiting for a fix)", error),
    }
}

fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{:.0} m", meters)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}
