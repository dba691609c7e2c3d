//! Live location observation
//!
//! [`LocationSource`] owns the single resource in the core that needs
//! explicit acquire/release discipline: the platform watch handle. It is
//! released on stop, on drop, and whenever the orchestrator switches to a
//! pinned search.
//!
//! # Update rate
//!
//! ```text
//! platform fix ──► SampleGate (interval OR distance) ──► watch channel (newest only)
//! ```

mod platform;
mod sample;
mod source;

pub use platform::{
    LocationError, LocationPlatform, LocationSubscription, PermissionStatus, SampleCallback,
};
pub use sample::{
    LocationSample, SampleGate, WatchOptions, DEFAULT_MIN_DISTANCE_M, DEFAULT_MIN_INTERVAL,
};
pub use source::LocationSource;
