//! Location samples and the update-rate gate.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use crate::coord::{distance_m, GeoPoint};

/// Default minimum interval between emitted samples.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(10);

/// Default minimum movement between emitted samples, in meters.
pub const DEFAULT_MIN_DISTANCE_M: f64 = 50.0;

/// A single position fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationSample {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// When the platform captured the fix.
    pub captured_at: DateTime<Utc>,
}

impl LocationSample {
    /// Create a sample captured now.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self::captured(latitude, longitude, Utc::now())
    }

    /// Create a sample with explicit capture time.
    pub fn captured(latitude: f64, longitude: f64, captured_at: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            captured_at,
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Update-rate thresholds requested from the platform.
///
/// A sample is emitted when *either* threshold is met.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchOptions {
    pub min_interval: Duration,
    pub min_distance_m: f64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            min_interval: DEFAULT_MIN_INTERVAL,
            min_distance_m: DEFAULT_MIN_DISTANCE_M,
        }
    }
}

/// Enforces [`WatchOptions`] on the delivered sample stream.
///
/// The first sample after [`reset`](Self::reset) always passes.
#[derive(Debug)]
pub struct SampleGate {
    options: WatchOptions,
    last_emitted: Option<(Instant, GeoPoint)>,
}

impl SampleGate {
    pub fn new(options: WatchOptions) -> Self {
        Self {
            options,
            last_emitted: None,
        }
    }

    /// Returns true if the sample should be emitted, recording it if so.
    pub fn admit(&mut self, sample: &LocationSample, now: Instant) -> bool {
        let point = sample.point();

        if let Some((at, last)) = self.last_emitted {
            let elapsed = now.saturating_duration_since(at);
            let moved = distance_m(last, point);
            if elapsed < self.options.min_interval && moved < self.options.min_distance_m {
                return false;
            }
        }

        self.last_emitted = Some((now, point));
        true
    }

    /// Forget the last emitted sample.
    pub fn reset(&mut self) {
        self.last_emitted = None;
    }
}
