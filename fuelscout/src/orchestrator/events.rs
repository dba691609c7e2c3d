//! Inputs accepted by the orchestrator.
//!
//! Location samples, settings and search pins arrive on their own
//! newest-value channels; everything the user or the presentation layer
//! does arrives as an [`Event`].

use crate::station::{FuelType, SortOption, StationId};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // ─── Presentation ────────────────────────────────────────────────────
    /// A map marker was tapped.
    MarkerTapped(StationId),

    /// A list card was tapped.
    CardTapped(StationId),

    /// Empty map area tapped.
    BackgroundTapped,

    /// The list measured a row.
    RowMeasured { index: usize, height: f64 },

    /// The list scrolled to a new offset, in pixels from the top.
    Scrolled { offset: f64 },

    // ─── Query parameters ────────────────────────────────────────────────
    FuelTypeChanged(FuelType),

    SortChanged(SortOption),

    // ─── Control ─────────────────────────────────────────────────────────
    /// Leave pinned mode and follow the user again.
    ClearPin,

    /// Pull-to-refresh.
    Refresh,

    DismissError,

    Shutdown,
}

impl Event {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Event::MarkerTapped(_) => "marker_tapped",
            Event::CardTapped(_) => "card_tapped",
            Event::BackgroundTapped => "background_tapped",
            Event::RowMeasured { .. } => "row_measured",
            Event::Scrolled { .. } => "scrolled",
            Event::FuelTypeChanged(_) => "fuel_type_changed",
            Event::SortChanged(_) => "sort_changed",
            Event::ClearPin => "clear_pin",
            Event::Refresh => "refresh",
            Event::DismissError => "dismiss_error",
            Event::Shutdown => "shutdown",
        }
    }
}
