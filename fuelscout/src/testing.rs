//! In-memory test doubles for the core's external collaborators.
//!
//! Mirrors the `NeverThrottle`/`AlwaysThrottle` approach: small, public
//! implementations of the boundary traits so both unit tests and
//! integration tests can drive the orchestrator deterministically.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use crate::coord::GeoPoint;
use crate::location::{
    LocationError, LocationPlatform, LocationSample, LocationSubscription, PermissionStatus,
    SampleCallback, WatchOptions,
};
use crate::station::{
    AreaQuery, FetchError, FuelType, NearbyQuery, ScheduleInfo, Snapshot, StationId,
    StationQueryService, StationRecord,
};

// ─────────────────────────────────────────────────────────────────────────────
// Station service
// ─────────────────────────────────────────────────────────────────────────────

/// Permits handed out by [`MockStationService::resume`].
const RESUME_PERMITS: usize = 1024;

/// A call observed by [`MockStationService`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Nearby(NearbyQuery),
    Area(AreaQuery),
}

/// Scriptable station service.
///
/// Responses come from a FIFO script, falling back to a default. While
/// [`hold`](Self::hold) is active every call parks until
/// [`release`](Self::release) hands out a permit.
pub struct MockStationService {
    default_response: Mutex<Result<Snapshot, FetchError>>,
    script: Mutex<VecDeque<Result<Snapshot, FetchError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    held: AtomicBool,
    permits: Semaphore,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl Default for MockStationService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStationService {
    /// Service answering every call with an empty snapshot.
    pub fn new() -> Self {
        Self::returning(Snapshot::empty())
    }

    /// Service answering every call with `snapshot`.
    pub fn returning(snapshot: Snapshot) -> Self {
        Self {
            default_response: Mutex::new(Ok(snapshot)),
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            held: AtomicBool::new(false),
            permits: Semaphore::new(0),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Replace the default response.
    pub fn respond_with(&self, snapshot: Snapshot) {
        *self.default_response.lock() = Ok(snapshot);
    }

    /// Make the default response a failure.
    pub fn fail_with(&self, message: &str) {
        *self.default_response.lock() = Err(FetchError::failed(message));
    }

    /// Queue a one-off response for the next call.
    pub fn push_response(&self, response: Result<Snapshot, FetchError>) {
        self.script.lock().push_back(response);
    }

    /// Park subsequent calls until released.
    pub fn hold(&self) {
        self.held.store(true, Ordering::SeqCst);
    }

    /// Let one parked call complete.
    pub fn release(&self) {
        self.permits.add_permits(1);
    }

    /// Stop parking calls and release any that are waiting.
    pub fn resume(&self) {
        self.held.store(false, Ordering::SeqCst);
        self.permits.add_permits(RESUME_PERMITS);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls.lock().last().cloned()
    }

    /// Requests started but neither finished nor abandoned.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously outstanding requests observed.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn answer(&self, call: RecordedCall) -> Result<Snapshot, FetchError> {
        self.calls.lock().push(call);
        let _guard = InFlightGuard::enter(&self.in_flight, &self.peak_in_flight);

        if self.held.load(Ordering::SeqCst) {
            if let Ok(permit) = self.permits.acquire().await {
                permit.forget();
            }
        }

        match self.script.lock().pop_front() {
            Some(response) => response,
            None => self.default_response.lock().clone(),
        }
    }
}

impl StationQueryService for MockStationService {
    async fn get_nearby(&self, query: &NearbyQuery) -> Result<Snapshot, FetchError> {
        self.answer(RecordedCall::Nearby(*query)).await
    }

    async fn get_by_location(&self, query: &AreaQuery) -> Result<Snapshot, FetchError> {
        self.answer(RecordedCall::Area(query.clone())).await
    }
}

/// Counts a request as outstanding until it finishes or its future is dropped.
struct InFlightGuard {
    counter: Arc<AtomicUsize>,
}

impl InFlightGuard {
    fn enter(counter: &Arc<AtomicUsize>, peak: &Arc<AtomicUsize>) -> Self {
        let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self {
            counter: Arc::clone(counter),
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Location platform
// ─────────────────────────────────────────────────────────────────────────────

struct WatchSlot {
    callback: Arc<dyn Fn(LocationSample) + Send + Sync>,
    cancelled: Arc<AtomicBool>,
}

struct MockSubscription {
    cancelled: Arc<AtomicBool>,
}

impl LocationSubscription for MockSubscription {
    fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

/// Location platform driven by the test.
pub struct MockLocationPlatform {
    permission: Mutex<PermissionStatus>,
    fix: Mutex<Option<LocationSample>>,
    watches: Mutex<Vec<WatchSlot>>,
    watch_failure: Mutex<Option<String>>,
    permission_requests: AtomicUsize,
}

impl MockLocationPlatform {
    fn with(permission: PermissionStatus, fix: Option<LocationSample>) -> Self {
        Self {
            permission: Mutex::new(permission),
            fix: Mutex::new(fix),
            watches: Mutex::new(Vec::new()),
            watch_failure: Mutex::new(None),
            permission_requests: AtomicUsize::new(0),
        }
    }

    /// Permission granted with a current fix at the given point.
    pub fn granted_at(latitude: f64, longitude: f64) -> Self {
        Self::with(
            PermissionStatus::Granted,
            Some(LocationSample::new(latitude, longitude)),
        )
    }

    /// Permission granted but no fix yet.
    pub fn granted_without_fix() -> Self {
        Self::with(PermissionStatus::Granted, None)
    }

    /// Permission refused.
    pub fn denied() -> Self {
        Self::with(PermissionStatus::Denied, None)
    }

    pub fn set_permission(&self, permission: PermissionStatus) {
        *self.permission.lock() = permission;
    }

    /// Change the fix returned by `current_sample` without notifying watchers.
    pub fn set_fix(&self, sample: Option<LocationSample>) {
        *self.fix.lock() = sample;
    }

    /// Make `watch` fail with `Unavailable` until [`allow_watch`](Self::allow_watch).
    pub fn fail_watch_with(&self, reason: &str) {
        *self.watch_failure.lock() = Some(reason.to_string());
    }

    pub fn allow_watch(&self) {
        *self.watch_failure.lock() = None;
    }

    /// Deliver a fix to every live watcher.
    pub fn emit(&self, sample: LocationSample) {
        *self.fix.lock() = Some(sample);
        for callback in self.callbacks(false) {
            callback(sample);
        }
    }

    /// Deliver a fix to every watcher, cancelled ones included.
    pub fn emit_to_cancelled(&self, sample: LocationSample) {
        for callback in self.callbacks(true) {
            callback(sample);
        }
    }

    /// Watches started and not yet cancelled.
    pub fn active_watches(&self) -> usize {
        self.watches
            .lock()
            .iter()
            .filter(|w| !w.cancelled.load(Ordering::SeqCst))
            .count()
    }

    pub fn permission_requests(&self) -> usize {
        self.permission_requests.load(Ordering::SeqCst)
    }

    fn callbacks(&self, include_cancelled: bool) -> Vec<Arc<dyn Fn(LocationSample) + Send + Sync>> {
        self.watches
            .lock()
            .iter()
            .filter(|w| include_cancelled || !w.cancelled.load(Ordering::SeqCst))
            .map(|w| Arc::clone(&w.callback))
            .collect()
    }
}

impl LocationPlatform for MockLocationPlatform {
    async fn request_permission(&self) -> PermissionStatus {
        self.permission_requests.fetch_add(1, Ordering::SeqCst);
        *self.permission.lock()
    }

    async fn current_sample(&self) -> Result<LocationSample, LocationError> {
        let fix = *self.fix.lock();
        fix.ok_or_else(|| LocationError::Unavailable("no fix yet".to_string()))
    }

    fn watch(
        &self,
        _options: WatchOptions,
        on_sample: SampleCallback,
    ) -> Result<Box<dyn LocationSubscription>, LocationError> {
        if !self.permission.lock().is_granted() {
            return Err(LocationError::PermissionDenied);
        }
        if let Some(reason) = self.watch_failure.lock().clone() {
            return Err(LocationError::Unavailable(reason));
        }
        let cancelled = Arc::new(AtomicBool::new(false));
        self.watches.lock().push(WatchSlot {
            callback: Arc::from(on_sample),
            cancelled: Arc::clone(&cancelled),
        });
        Ok(Box::new(MockSubscription { cancelled }))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fixtures
// ─────────────────────────────────────────────────────────────────────────────

/// Build a station record with a single diesel price.
pub fn station(id: &str, brand: &str, latitude: f64, longitude: f64) -> StationRecord {
    StationRecord {
        id: StationId::new(id),
        name: format!("{} {}", brand, id),
        brand: brand.to_string(),
        coordinates: GeoPoint::new(latitude, longitude),
        prices_by_fuel_type: [(FuelType::Diesel, 1.6)].into_iter().collect(),
        schedule_info: ScheduleInfo::default(),
        last_updated: Utc
            .with_ymd_and_hms(2025, 3, 1, 8, 0, 0)
            .single()
            .unwrap_or_default(),
    }
}

/// Snapshot of stations `(id, brand)` spread along a short line.
pub fn snapshot_of(entries: &[(&str, &str)]) -> Snapshot {
    Snapshot::new(
        entries
            .iter()
            .enumerate()
            .map(|(i, (id, brand))| station(id, brand, 38.72 + i as f64 * 0.001, -9.14))
            .collect(),
    )
}
