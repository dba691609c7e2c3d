//! OrchestratorHandle - client interface for the presentation layer

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use super::events::Event;
use crate::station::{FuelType, SortOption, StationId};

/// The orchestrator task has stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Orchestrator is no longer running")]
pub struct HandleClosed;

/// Cloneable sender for orchestrator inputs.
///
/// Dropping every handle stops the run loop.
#[derive(Debug, Clone)]
pub struct OrchestratorHandle {
    tx: mpsc::Sender<Event>,
}

impl OrchestratorHandle {
    pub(crate) fn new(tx: mpsc::Sender<Event>) -> Self {
        Self { tx }
    }

    pub async fn send(&self, event: Event) -> Result<(), HandleClosed> {
        debug!(event = event.name(), "OrchestratorHandle: send");
        self.tx.send(event).await.map_err(|_| HandleClosed)
    }

    pub async fn marker_tapped(&self, id: impl Into<StationId>) -> Result<(), HandleClosed> {
        self.send(Event::MarkerTapped(id.into())).await
    }

    pub async fn card_tapped(&self, id: impl Into<StationId>) -> Result<(), HandleClosed> {
        self.send(Event::CardTapped(id.into())).await
    }

    pub async fn background_tapped(&self) -> Result<(), HandleClosed> {
        self.send(Event::BackgroundTapped).await
    }

    pub async fn row_measured(&self, index: usize, height: f64) -> Result<(), HandleClosed> {
        self.send(Event::RowMeasured { index, height }).await
    }

    pub async fn scrolled(&self, offset: f64) -> Result<(), HandleClosed> {
        self.send(Event::Scrolled { offset }).await
    }

    pub async fn set_fuel_type(&self, fuel_type: FuelType) -> Result<(), HandleClosed> {
        self.send(Event::FuelTypeChanged(fuel_type)).await
    }

    pub async fn set_sort(&self, sort: SortOption) -> Result<(), HandleClosed> {
        self.send(Event::SortChanged(sort)).await
    }

    pub async fn clear_pin(&self) -> Result<(), HandleClosed> {
        self.send(Event::ClearPin).await
    }

    pub async fn refresh(&self) -> Result<(), HandleClosed> {
        self.send(Event::Refresh).await
    }

    pub async fn dismiss_error(&self) -> Result<(), HandleClosed> {
        self.send(Event::DismissError).await
    }

    /// Ask the run loop to exit.
    pub async fn shutdown(&self) -> Result<(), HandleClosed> {
        self.send(Event::Shutdown).await
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_are_forwarded() {
        let (tx, mut rx) = mpsc::channel(8);
        let handle = OrchestratorHandle::new(tx);

        handle.marker_tapped("42").await.unwrap();
        handle.scrolled(120.0).await.unwrap();

        assert_eq!(rx.recv().await, Some(Event::MarkerTapped(StationId::new("42"))));
        assert_eq!(rx.recv().await, Some(Event::Scrolled { offset: 120.0 }));
    }

    #[tokio::test]
    async fn test_send_after_close_fails() {
        let (tx, rx) = mpsc::channel(8);
        let handle = OrchestratorHandle::new(tx);
        drop(rx);

        assert!(handle.is_closed());
        assert_eq!(handle.refresh().await, Err(HandleClosed));
    }
}
