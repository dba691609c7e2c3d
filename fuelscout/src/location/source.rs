//! Continuous location observation with explicit acquire/release.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::platform::{LocationError, LocationPlatform, LocationSubscription, SampleCallback};
use super::sample::{LocationSample, SampleGate, WatchOptions};

/// An active platform watch plus its liveness flag.
///
/// The flag is cleared before cancelling so a platform that still delivers
/// a late callback cannot publish into a stopped source.
struct ActiveWatch {
    handle: Box<dyn LocationSubscription>,
    live: Arc<AtomicBool>,
}

/// Wraps a [`LocationPlatform`] watch behind `start`/`stop`.
///
/// Samples are published on a newest-value channel; nothing is queued.
pub struct LocationSource<P> {
    platform: Arc<P>,
    options: WatchOptions,
    gate: Arc<Mutex<SampleGate>>,
    sender: Arc<watch::Sender<Option<LocationSample>>>,
    receiver: watch::Receiver<Option<LocationSample>>,
    active: Option<ActiveWatch>,
}

impl<P> std::fmt::Debug for LocationSource<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationSource")
            .field("options", &self.options)
            .field("active", &self.active.is_some())
            .field("latest", &*self.receiver.borrow())
            .finish()
    }
}

impl<P: LocationPlatform> LocationSource<P> {
    pub fn new(platform: Arc<P>, options: WatchOptions) -> Self {
        let (sender, receiver) = watch::channel(None);
        Self {
            platform,
            options,
            gate: Arc::new(Mutex::new(SampleGate::new(options))),
            sender: Arc::new(sender),
            receiver,
            active: None,
        }
    }

    /// Begin observing.
    ///
    /// Checks permission, publishes a fresh one-shot fix when one is
    /// available, then subscribes to continuous updates. Calling `start`
    /// while already active is a no-op.
    pub async fn start(&mut self) -> Result<(), LocationError> {
        if self.active.is_some() {
            debug!("LocationSource: already active");
            return Ok(());
        }

        if !self.platform.request_permission().await.is_granted() {
            warn!("LocationSource: permission denied");
            return Err(LocationError::PermissionDenied);
        }

        self.gate.lock().reset();

        match self.platform.current_sample().await {
            Ok(sample) => {
                if self.gate.lock().admit(&sample, Instant::now()) {
                    self.sender.send_replace(Some(sample));
                }
            }
            // Transient; the watch below will deliver the first fix.
            Err(e) => warn!(error = %e, "LocationSource: no immediate fix"),
        }

        let live = Arc::new(AtomicBool::new(true));
        let handle = self
            .platform
            .watch(self.options, self.callback(Arc::clone(&live)))?;

        self.active = Some(ActiveWatch { handle, live });
        info!(
            min_interval_secs = self.options.min_interval.as_secs_f64(),
            min_distance_m = self.options.min_distance_m,
            "LocationSource: started"
        );
        Ok(())
    }

    /// Release the platform watch. Safe to call in any state.
    pub fn stop(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.live.store(false, Ordering::Release);
            active.handle.cancel();
            info!("LocationSource: stopped");
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Newest sample seen, if any.
    pub fn latest(&self) -> Option<LocationSample> {
        *self.receiver.borrow()
    }

    /// Receiver that observes every published sample.
    pub fn subscribe(&self) -> watch::Receiver<Option<LocationSample>> {
        self.sender.subscribe()
    }

    fn callback(&self, live: Arc<AtomicBool>) -> SampleCallback {
        let gate = Arc::clone(&self.gate);
        let sender = Arc::clone(&self.sender);
        Box::new(move |sample| {
            if !live.load(Ordering::Acquire) {
                return;
            }
            if gate.lock().admit(&sample, Instant::now()) {
                sender.send_replace(Some(sample));
            }
        })
    }
}

impl<P> Drop for LocationSource<P> {
    fn drop(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.live.store(false, Ordering::Release);
            active.handle.cancel();
        }
    }
}
