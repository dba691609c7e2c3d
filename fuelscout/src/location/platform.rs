//! Location platform abstraction.

use std::future::Future;

use thiserror::Error;

use super::sample::{LocationSample, WatchOptions};

/// Location failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// The user refused location access. Not retried automatically.
    #[error("Location permission denied")]
    PermissionDenied,

    /// Permission granted but no fix could be obtained (yet).
    #[error("Location unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

/// Callback invoked by the platform on every new fix.
pub type SampleCallback = Box<dyn Fn(LocationSample) + Send + Sync>;

/// Live handle to a platform location watch.
///
/// `cancel` must be safe to call more than once.
pub trait LocationSubscription: Send {
    fn cancel(&mut self);
}

/// Platform location services.
pub trait LocationPlatform: Send + Sync {
    /// Ask for (or confirm) location access.
    fn request_permission(&self) -> impl Future<Output = PermissionStatus> + Send;

    /// One-shot current fix.
    fn current_sample(&self) -> impl Future<Output = Result<LocationSample, LocationError>> + Send;

    /// Begin continuous updates, invoking `on_sample` for each fix.
    ///
    /// `options` is a hint; the caller re-applies the thresholds itself.
    fn watch(
        &self,
        options: WatchOptions,
        on_sample: SampleCallback,
    ) -> Result<Box<dyn LocationSubscription>, LocationError>;
}
