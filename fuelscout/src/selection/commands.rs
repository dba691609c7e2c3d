//! Command channels towards the presentation surfaces.

use tokio::sync::mpsc;
use tracing::trace;

use crate::coord::{GeoBounds, GeoPoint};

/// Instructions for the map surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapCommand {
    /// Move the viewport centre to a point.
    Recenter(GeoPoint),
    /// Fit the viewport around a set of results.
    FitBounds(GeoBounds),
}

/// Instructions for the list surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListCommand {
    /// Scroll so the row at `index` sits at `offset` pixels from the top.
    ScrollTo { index: usize, offset: f64 },
    ScrollToTop,
}

/// Sending half of the `ToMap` / `ToList` channels.
///
/// A surface that has gone away simply stops receiving; sends never fail
/// from the caller's point of view.
#[derive(Debug, Clone)]
pub struct CommandSink {
    to_map: mpsc::UnboundedSender<MapCommand>,
    to_list: mpsc::UnboundedSender<ListCommand>,
}

impl CommandSink {
    pub fn to_map(&self, command: MapCommand) {
        trace!(?command, "ToMap");
        let _ = self.to_map.send(command);
    }

    pub fn to_list(&self, command: ListCommand) {
        trace!(?command, "ToList");
        let _ = self.to_list.send(command);
    }
}

/// Create the sink plus the map and list receivers.
pub fn command_channels() -> (
    CommandSink,
    mpsc::UnboundedReceiver<MapCommand>,
    mpsc::UnboundedReceiver<ListCommand>,
) {
    let (to_map, map_rx) = mpsc::unbounded_channel();
    let (to_list, list_rx) = mpsc::unbounded_channel();
    (CommandSink { to_map, to_list }, map_rx, list_rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_reach_their_surface() {
        let (sink, mut map_rx, mut list_rx) = command_channels();

        sink.to_map(MapCommand::Recenter(GeoPoint::new(1.0, 2.0)));
        sink.to_list(ListCommand::ScrollToTop);

        assert_eq!(
            map_rx.try_recv().unwrap(),
            MapCommand::Recenter(GeoPoint::new(1.0, 2.0))
        );
        assert_eq!(list_rx.try_recv().unwrap(), ListCommand::ScrollToTop);
        assert!(map_rx.try_recv().is_err());
    }

    #[test]
    fn test_send_after_surface_dropped_is_silent() {
        let (sink, map_rx, _list_rx) = command_channels();
        drop(map_rx);
        sink.to_map(MapCommand::Recenter(GeoPoint::new(0.0, 0.0)));
    }
}
