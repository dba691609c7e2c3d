//! Pinned search state.
//!
//! The search flow publishes a [`SearchPin`] on a [`SearchPinBoard`]; its
//! presence is the mode switch. The orchestrator reads the board through a
//! [`SearchModeGate`] and never keeps a copy of the pin as mode state.
//!
//! ```text
//! search flow ──set/clear──► SearchPinBoard (newest value) ──► SearchModeGate
//!                                                                 │
//!                                  allows_auto_fetch() ◄──────────┘
//! ```

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::coord::GeoBounds;
use crate::station::{AreaQuery, FuelType, Snapshot, SortOption};

/// Administrative place a pinned search was made for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationLabel {
    pub district: String,
    pub municipality: Option<String>,
}

impl LocationLabel {
    pub fn district(district: impl Into<String>) -> Self {
        Self {
            district: district.into(),
            municipality: None,
        }
    }

    pub fn with_municipality(mut self, municipality: impl Into<String>) -> Self {
        self.municipality = Some(municipality.into());
        self
    }

    /// Query for this place with the given parameters.
    pub fn query(&self, fuel_type: FuelType, sort: SortOption) -> AreaQuery {
        AreaQuery {
            district: self.district.clone(),
            municipality: self.municipality.clone(),
            fuel_type,
            sort,
        }
    }
}

impl fmt::Display for LocationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.municipality {
            Some(municipality) => write!(f, "{}, {}", municipality, self.district),
            None => write!(f, "{}", self.district),
        }
    }
}

/// Result of an explicit place search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPin {
    pub results: Snapshot,
    pub fuel_type: FuelType,
    pub sort: SortOption,
    pub label: LocationLabel,
}

impl SearchPin {
    pub fn new(label: LocationLabel, fuel_type: FuelType, sort: SortOption, results: Snapshot) -> Self {
        Self {
            results,
            fuel_type,
            sort,
            label,
        }
    }

    /// Box around every result, if there are any.
    pub fn bounds(&self) -> Option<GeoBounds> {
        GeoBounds::enclosing(self.results.iter().map(|r| r.coordinates))
    }
}

/// Shared newest-value slot for the current pin.
///
/// Cloning yields another handle to the same slot.
#[derive(Debug, Clone)]
pub struct SearchPinBoard {
    sender: Arc<watch::Sender<Option<SearchPin>>>,
}

impl Default for SearchPinBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchPinBoard {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Publish a pin, replacing any existing one.
    pub fn set(&self, pin: SearchPin) {
        info!(label = %pin.label, results = pin.results.len(), "Search pin set");
        self.sender.send_replace(Some(pin));
    }

    /// Remove the pin. Returns whether one was set.
    pub fn clear(&self) -> bool {
        let had_pin = self.sender.send_replace(None).is_some();
        if had_pin {
            info!("Search pin cleared");
        }
        had_pin
    }

    pub fn current(&self) -> Option<SearchPin> {
        self.sender.borrow().clone()
    }

    pub fn is_set(&self) -> bool {
        self.sender.borrow().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<SearchPin>> {
        self.sender.subscribe()
    }
}

/// Read side of the board used by the orchestrator.
#[derive(Debug, Clone)]
pub struct SearchModeGate {
    board: SearchPinBoard,
}

impl SearchModeGate {
    pub fn new(board: SearchPinBoard) -> Self {
        Self { board }
    }

    pub fn is_pinned(&self) -> bool {
        self.board.is_set()
    }

    /// Location-driven fetching runs only while unpinned.
    pub fn allows_auto_fetch(&self) -> bool {
        !self.is_pinned()
    }

    pub fn pin(&self) -> Option<SearchPin> {
        self.board.current()
    }

    pub fn clear_pin(&self) -> bool {
        self.board.clear()
    }

    pub fn board(&self) -> &SearchPinBoard {
        &self.board
    }
}
