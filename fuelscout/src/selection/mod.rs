//! Map ⇄ list selection synchronization.
//!
//! ```text
//!  marker tap ──► select_from_map ──► ToList: ScrollTo { offset }
//!  card tap   ──► select_from_list ─► ToMap:  Recenter(coords)
//!  refresh    ──► reconcile ────────► heights cleared, stale selection dropped
//! ```
//!
//! Scroll offsets come from measured row heights: the sum of every
//! preceding row plus a fixed correction, never negative.

mod commands;
mod heights;

pub use commands::{command_channels, CommandSink, ListCommand, MapCommand};
pub use heights::RowHeightTable;

use tracing::debug;

use crate::coord::{GeoBounds, GeoPoint};
use crate::station::{Snapshot, StationId};

/// Extra pixels added to every computed scroll offset.
pub const DEFAULT_SCROLL_CORRECTION_PX: f64 = 12.0;

/// Owns the selected id and the row-height table.
#[derive(Debug)]
pub struct SelectionCoordinator {
    selected: Option<StationId>,
    heights: RowHeightTable,
    correction_px: f64,
    commands: CommandSink,
}

impl SelectionCoordinator {
    pub fn new(commands: CommandSink) -> Self {
        Self {
            selected: None,
            heights: RowHeightTable::new(),
            correction_px: DEFAULT_SCROLL_CORRECTION_PX,
            commands,
        }
    }

    pub fn with_correction(mut self, correction_px: f64) -> Self {
        self.correction_px = correction_px;
        self
    }

    pub fn selected(&self) -> Option<&StationId> {
        self.selected.as_ref()
    }

    pub fn heights(&self) -> &RowHeightTable {
        &self.heights
    }

    /// Scroll offset that brings row `index` into view.
    pub fn scroll_offset(&self, index: usize) -> f64 {
        (self.heights.offset_before(index) + self.correction_px).max(0.0)
    }

    /// A marker was tapped. Returns the offset sent to the list, or `None`
    /// if the id is not on display.
    pub fn select_from_map(&mut self, id: &StationId, display: &Snapshot) -> Option<f64> {
        let Some(index) = display.position_of(id) else {
            debug!(id = %id, "Selection: marker id not on display, ignoring");
            return None;
        };

        let offset = self.scroll_offset(index);
        self.selected = Some(id.clone());
        self.commands.to_list(ListCommand::ScrollTo { index, offset });
        debug!(id = %id, index, offset, "Selection: from map");
        Some(offset)
    }

    /// A list card was tapped. Returns whether the map was recentred.
    pub fn select_from_list(&mut self, id: &StationId, display: &Snapshot) -> bool {
        let Some(record) = display.get(id) else {
            debug!(id = %id, "Selection: card id not on display, ignoring");
            return false;
        };

        self.selected = Some(id.clone());
        self.commands.to_map(MapCommand::Recenter(record.coordinates));
        debug!(id = %id, "Selection: from list");
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn record_row_height(&mut self, index: usize, height: f64) {
        self.heights.record(index, height);
    }

    /// The display snapshot changed: forget row measurements and drop a
    /// selection that no longer exists. Returns `true` if the selection
    /// was dropped.
    pub fn reconcile(&mut self, display: &Snapshot) -> bool {
        self.heights.clear();
        match &self.selected {
            Some(id) if !display.contains(id) => {
                debug!(id = %id, "Selection: selected station gone after refresh");
                self.selected = None;
                true
            }
            _ => false,
        }
    }

    /// Frame a fresh set of pinned results on both surfaces.
    pub fn frame_results(&self, results: &Snapshot) {
        if let Some(bounds) = GeoBounds::enclosing(results.iter().map(|r| r.coordinates)) {
            self.commands.to_map(MapCommand::FitBounds(bounds));
        }
        self.commands.to_list(ListCommand::ScrollToTop);
    }

    pub fn recenter(&self, point: GeoPoint) {
        self.commands.to_map(MapCommand::Recenter(point));
    }
}
