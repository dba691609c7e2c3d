//! Observable view state.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::coord::GeoPoint;
use crate::layout::DEFAULT_MAP_BIASED;
use crate::search::LocationLabel;
use crate::station::{FuelType, Snapshot, SortOption, StationId};

/// Top-level mode.
///
/// ```text
///                 pin at mount
///  Initializing ───────────────► PinnedSearch
///       │                         ▲      │
///       │ permission granted  pin │      │ clear pin
///       ▼                         │      ▼
///  LiveTracking ◄─────────────────┴──────┘
///       │
///       └── permission refused ──► PermissionDenied
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Initializing,
    LiveTracking,
    PinnedSearch,
    PermissionDenied,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Initializing => "Initializing",
            Mode::LiveTracking => "LiveTracking",
            Mode::PinnedSearch => "PinnedSearch",
            Mode::PermissionDenied => "PermissionDenied",
        };
        f.write_str(name)
    }
}

/// Dismissible error shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// The last fetch failed; results were cleared.
    FetchFailed(String),
    /// Live mode has waited too long for a fix.
    LocationUnavailable,
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::FetchFailed(msg) => write!(f, "Could not load stations: {}", msg),
            ViewError::LocationUnavailable => write!(f, "Waiting for your location"),
        }
    }
}

/// Everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub mode: Mode,
    /// The filtered snapshot.
    pub stations: Snapshot,
    pub selected: Option<StationId>,
    /// Fetch in flight with nothing on screen.
    pub loading: bool,
    /// Fetch in flight with stations already on screen.
    pub refreshing: bool,
    pub error: Option<ViewError>,
    /// Map share of the vertical split.
    pub layout_fraction: f64,
    pub fuel_type: FuelType,
    pub sort: SortOption,
    pub pin_label: Option<LocationLabel>,
    pub last_updated: Option<DateTime<Utc>>,
    pub location: Option<GeoPoint>,
    /// The stations were fetched for a different fuel type or sort than
    /// the ones shown; a re-query was skipped or is still running.
    pub stale_parameters: bool,
}

impl ViewState {
    pub fn initial(fuel_type: FuelType, sort: SortOption) -> Self {
        Self {
            mode: Mode::Initializing,
            stations: Snapshot::empty(),
            selected: None,
            loading: false,
            refreshing: false,
            error: None,
            layout_fraction: DEFAULT_MAP_BIASED,
            fuel_type,
            sort,
            pin_label: None,
            last_updated: None,
            location: None,
            stale_parameters: false,
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.mode == Mode::PinnedSearch
    }
}
