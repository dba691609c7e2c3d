//! Replayed location platform.
//!
//! Stands in for device location services on the command line: either a
//! fixed position or a CSV track of `lat,lng[,delay_ms]` lines played back
//! in real time.

use std::path::Path;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use fuelscout::coord::GeoPoint;
use fuelscout::location::{
    LocationError, LocationPlatform, LocationSample, LocationSubscription, PermissionStatus,
    SampleCallback, WatchOptions,
};

use crate::error::CliError;

/// Delay before a track point that doesn't give one.
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_secs(1);

/// One fix in a replayed track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub point: GeoPoint,
    /// Wait before delivering this point.
    pub delay: Duration,
}

/// Parse a CSV track.
///
/// Blank lines and `#` comments are skipped. Errors name the 1-based line.
pub fn parse_track(content: &str) -> Result<Vec<TrackPoint>, String> {
    let mut points = Vec::new();

    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let point = parse_line(line).map_err(|reason| format!("line {}: {}", number + 1, reason))?;
        points.push(point);
    }

    if points.is_empty() {
        return Err("track contains no points".to_string());
    }
    Ok(points)
}

fn parse_line(line: &str) -> Result<TrackPoint, String> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if !(2..=3).contains(&fields.len()) {
        return Err(format!("expected lat,lng[,delay_ms], got '{}'", line));
    }

    let latitude: f64 = fields[0]
        .parse()
        .map_err(|_| format!("invalid latitude '{}'", fields[0]))?;
    let longitude: f64 = fields[1]
        .parse()
        .map_err(|_| format!("invalid longitude '{}'", fields[1]))?;
    let point = GeoPoint::checked(latitude, longitude).map_err(|e| e.to_string())?;

    let delay = match fields.get(2) {
        Some(ms) => Duration::from_millis(
            ms.parse()
                .map_err(|_| format!("invalid delay '{}'", ms))?,
        ),
        None => DEFAULT_STEP_DELAY,
    };

    Ok(TrackPoint { point, delay })
}

/// Read and parse a track file.
pub fn load_track(path: &Path) -> Result<Vec<TrackPoint>, CliError> {
    let track_error = |reason: String| CliError::Track {
        path: path.display().to_string(),
        reason,
    };
    let content = std::fs::read_to_string(path).map_err(|e| track_error(e.to_string()))?;
    parse_track(&content).map_err(track_error)
}

/// [`LocationPlatform`] that always grants permission and plays back a
/// fixed list of points.
///
/// The first point is the immediate fix; the watch delivers the rest.
#[derive(Debug, Clone)]
pub struct ReplayPlatform {
    track: Vec<TrackPoint>,
}

impl ReplayPlatform {
    pub fn fixed(point: GeoPoint) -> Self {
        Self::from_track(vec![TrackPoint {
            point,
            delay: Duration::ZERO,
        }])
    }

    pub fn from_track(track: Vec<TrackPoint>) -> Self {
        Self { track }
    }

    /// Permission granted, but no fix ever arrives.
    pub fn without_fix() -> Self {
        Self { track: Vec::new() }
    }

    /// Number of fixes, the immediate one included.
    pub fn len(&self) -> usize {
        self.track.len()
    }
}

struct ReplaySubscription {
    token: CancellationToken,
}

impl LocationSubscription for ReplaySubscription {
    fn cancel(&mut self) {
        self.token.cancel();
    }
}

impl LocationPlatform for ReplayPlatform {
    async fn request_permission(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn current_sample(&self) -> Result<LocationSample, LocationError> {
        self.track
            .first()
            .map(|p| LocationSample::new(p.point.latitude, p.point.longitude))
            .ok_or_else(|| LocationError::Unavailable("empty track".to_string()))
    }

    fn watch(
        &self,
        _options: WatchOptions,
        on_sample: SampleCallback,
    ) -> Result<Box<dyn LocationSubscription>, LocationError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        let token = CancellationToken::new();
        let child = token.clone();
        let remaining: Vec<TrackPoint> = self.track.iter().skip(1).copied().collect();
        info!(points = remaining.len(), "Replay: watch started");

        runtime.spawn(async move {
            for step in remaining {
                tokio::select! {
                    _ = child.cancelled() => {
                        debug!("Replay: watch cancelled");
                        return;
                    }
                    _ = tokio::time::sleep(step.delay) => {
                        on_sample(LocationSample::new(step.point.latitude, step.point.longitude));
                    }
                }
            }
            debug!("Replay: track finished");
        });

        Ok(Box::new(ReplaySubscription { token }))
    }
}
