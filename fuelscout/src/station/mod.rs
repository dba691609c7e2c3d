//! Station data and the query service boundary
//!
//! Records arrive only as full snapshots; there is no incremental update
//! path. [`HttpStationService`] is the production implementation of
//! [`StationQueryService`].

mod http;
mod service;
mod types;

pub use http::{decode_snapshot, AsyncHttpClient, HttpStationService, ReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use service::{AreaQuery, FetchError, NearbyQuery, StationQueryService};
pub use types::{FuelType, ScheduleInfo, Snapshot, SortOption, StationId, StationRecord};
