//! Station query service abstraction.

use std::future::Future;

use thiserror::Error;

use super::types::{FuelType, Snapshot, SortOption};
use crate::coord::GeoPoint;

/// Any failure of the station query service.
///
/// The core does not distinguish transport, server or decoding failures;
/// the message is carried for logging only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Station query failed: {0}")]
    FetchFailed(String),
}

impl FetchError {
    pub fn failed(message: impl Into<String>) -> Self {
        FetchError::FetchFailed(message.into())
    }
}

/// Parameters for a radius query around a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyQuery {
    pub center: GeoPoint,
    pub radius_m: u32,
    pub fuel_type: FuelType,
    pub sort: SortOption,
}

/// Parameters for a query by administrative area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaQuery {
    pub district: String,
    pub municipality: Option<String>,
    pub fuel_type: FuelType,
    pub sort: SortOption,
}

/// Backend that returns full, backend-ordered snapshots.
///
/// Implementations own their transport concerns (timeouts, connection
/// retries). Every failure surfaces as [`FetchError::FetchFailed`].
pub trait StationQueryService: Send + Sync {
    /// Stations within `radius_m` of a point.
    fn get_nearby(
        &self,
        query: &NearbyQuery,
    ) -> impl Future<Output = Result<Snapshot, FetchError>> + Send;

    /// Stations in a district (optionally narrowed to a municipality).
    fn get_by_location(
        &self,
        query: &AreaQuery,
    ) -> impl Future<Output = Result<Snapshot, FetchError>> + Send;
}
