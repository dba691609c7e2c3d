//! Orchestrator - owns the view state and reacts to every input in order.

use std::future;
use std::sync::Arc;

use chrono::Utc;
use futures::future::BoxFuture;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::{OrchestratorConfig, Settings};
use super::events::Event;
use super::handle::OrchestratorHandle;
use super::state::{Mode, ViewError, ViewState};
use crate::coord::GeoPoint;
use crate::fetch::{FetchDecision, FetchQuery, FetchScheduler};
use crate::filter::filter;
use crate::layout::LayoutAnimator;
use crate::location::{LocationError, LocationPlatform, LocationSample, LocationSource};
use crate::search::{LocationLabel, SearchModeGate, SearchPin, SearchPinBoard};
use crate::selection::{command_channels, ListCommand, MapCommand, SelectionCoordinator};
use crate::station::{FetchError, FuelType, Snapshot, SortOption, StationId, StationQueryService};

type FetchResult = Result<Snapshot, FetchError>;

/// Fuel type and sort a request was made with.
type QueryParams = (FuelType, SortOption);

/// The one outstanding request, tagged with its generation.
struct InFlight {
    generation: u64,
    future: BoxFuture<'static, FetchResult>,
}

/// Everything the caller needs to talk to a running orchestrator.
pub struct OrchestratorChannels {
    pub handle: OrchestratorHandle,
    pub view: watch::Receiver<ViewState>,
    pub to_map: mpsc::UnboundedReceiver<MapCommand>,
    pub to_list: mpsc::UnboundedReceiver<ListCommand>,
}

/// Composes location, fetching, filtering, selection and layout into a
/// single observable [`ViewState`].
///
/// Drive it with [`run`](Self::run), or step it by hand with
/// [`mount`](Self::mount), [`handle_event`](Self::handle_event),
/// [`sync_inputs`](Self::sync_inputs), [`settle`](Self::settle) and
/// [`tick`](Self::tick).
pub struct Orchestrator<S, P> {
    config: OrchestratorConfig,
    service: Arc<S>,
    location: LocationSource<P>,
    gate: SearchModeGate,
    scheduler: FetchScheduler,
    selection: SelectionCoordinator,
    layout: LayoutAnimator,

    events: mpsc::Receiver<Event>,
    samples: watch::Receiver<Option<LocationSample>>,
    pins: watch::Receiver<Option<SearchPin>>,
    settings_rx: watch::Receiver<Settings>,
    settings_open: bool,
    view: watch::Sender<ViewState>,

    mode: Mode,
    settings: Settings,
    fuel_type: FuelType,
    sort: SortOption,
    snapshot: Snapshot,
    display: Snapshot,
    error: Option<ViewError>,
    pin_label: Option<LocationLabel>,
    last_fix: Option<GeoPoint>,
    last_updated: Option<chrono::DateTime<Utc>>,
    /// Parameters of the request behind `snapshot`.
    shown_params: Option<QueryParams>,
    requested_params: Option<QueryParams>,

    in_flight: Option<InFlight>,
    /// Forced fetch owed to the first fix after returning to live mode.
    pending_forced: bool,
    /// Recenter the map on the first fix after returning to live mode.
    pending_recenter: bool,
    /// Retry for a return-to-live fetch that hit the forced spacing.
    forced_retry_at: Option<Instant>,
    fix_deadline: Option<Instant>,
}

impl<S, P> Orchestrator<S, P>
where
    S: StationQueryService + 'static,
    P: LocationPlatform + 'static,
{
    pub fn new(
        service: Arc<S>,
        platform: Arc<P>,
        settings: watch::Receiver<Settings>,
        board: SearchPinBoard,
        config: OrchestratorConfig,
    ) -> (Self, OrchestratorChannels) {
        let (event_tx, events) = mpsc::channel(config.event_buffer.max(1));
        let (sink, to_map, to_list) = command_channels();

        let current = settings.borrow().clone();
        let fuel_type = current.default_fuel_type();
        let sort = current.default_sort;
        let (view, view_rx) = watch::channel(ViewState::initial(fuel_type, sort));

        let location = LocationSource::new(platform, config.watch);
        let samples = location.subscribe();
        let pins = board.subscribe();

        let orchestrator = Self {
            config,
            service,
            location,
            gate: SearchModeGate::new(board),
            scheduler: FetchScheduler::new(config.fetch),
            selection: SelectionCoordinator::new(sink).with_correction(config.scroll_correction_px),
            layout: LayoutAnimator::new(config.layout),
            events,
            samples,
            pins,
            settings_rx: settings,
            settings_open: true,
            view,
            mode: Mode::Initializing,
            settings: current,
            fuel_type,
            sort,
            snapshot: Snapshot::empty(),
            display: Snapshot::empty(),
            error: None,
            pin_label: None,
            last_fix: None,
            last_updated: None,
            shown_params: None,
            requested_params: None,
            in_flight: None,
            pending_forced: false,
            pending_recenter: false,
            forced_retry_at: None,
            fix_deadline: None,
        };

        let channels = OrchestratorChannels {
            handle: OrchestratorHandle::new(event_tx),
            view: view_rx,
            to_map,
            to_list,
        };

        (orchestrator, channels)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Latest published state.
    pub fn view(&self) -> ViewState {
        self.view.borrow().clone()
    }

    pub fn is_fetch_in_flight(&self) -> bool {
        self.scheduler.is_in_flight()
    }

    /// Run until cancelled, told to shut down, or every handle is dropped.
    /// The location watch is released on every exit path.
    pub async fn run(mut self, shutdown: CancellationToken) {
        self.mount().await;

        loop {
            let deadline = self.next_deadline();

            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Orchestrator: cancelled");
                    break;
                }

                event = self.events.recv() => match event {
                    Some(event) => {
                        if !self.apply_event(event).await {
                            break;
                        }
                    }
                    None => {
                        info!("Orchestrator: all handles dropped");
                        break;
                    }
                },

                (generation, result) = next_completion(&mut self.in_flight) => {
                    self.in_flight = None;
                    self.complete_fetch(generation, result);
                }

                changed = self.pins.changed() => {
                    if changed.is_ok() {
                        self.pins.borrow_and_update();
                        self.sync_search_mode().await;
                    }
                }

                changed = self.settings_rx.changed(), if self.settings_open => {
                    match changed {
                        Ok(()) => self.apply_settings(),
                        Err(_) => {
                            debug!("Orchestrator: settings source closed");
                            self.settings_open = false;
                        }
                    }
                }

                changed = self.samples.changed() => {
                    if changed.is_ok() {
                        let sample = *self.samples.borrow_and_update();
                        if let Some(sample) = sample {
                            self.on_sample(sample);
                        }
                    }
                }

                _ = sleep_until_opt(deadline) => {
                    self.on_timers(Instant::now());
                }
            }

            self.publish();
        }

        self.shutdown();
    }

    // ─── Manual stepping ─────────────────────────────────────────────────

    /// Resolve `Initializing` into a working mode. Later calls are no-ops.
    pub async fn mount(&mut self) {
        if self.mode != Mode::Initializing {
            return;
        }
        self.layout.mount();
        self.pins.borrow_and_update();

        if let Some(pin) = self.gate.pin() {
            self.adopt_pin(pin);
        } else {
            self.start_live(false).await;
        }
        self.publish();
    }

    /// Handle one input. Returns `false` once the orchestrator should stop.
    pub async fn handle_event(&mut self, event: Event) -> bool {
        let keep_running = self.apply_event(event).await;
        self.publish();
        keep_running
    }

    /// Process any pending pin, settings and location changes.
    pub async fn sync_inputs(&mut self) {
        if self.pins.has_changed().unwrap_or(false) {
            self.pins.borrow_and_update();
            self.sync_search_mode().await;
        }

        if self.settings_open && self.settings_rx.has_changed().unwrap_or(false) {
            self.apply_settings();
        }

        if self.samples.has_changed().unwrap_or(false) {
            let sample = *self.samples.borrow_and_update();
            if let Some(sample) = sample {
                self.on_sample(sample);
            }
        }

        self.publish();
    }

    /// Wait for the outstanding fetch, if any, and apply its result.
    pub async fn settle(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            let result = in_flight.future.await;
            self.complete_fetch(in_flight.generation, result);
            self.publish();
        }
    }

    /// Fire any timers due at `now`.
    pub fn tick(&mut self, now: Instant) {
        self.on_timers(now);
        self.publish();
    }

    /// Release the location watch and drop any outstanding request.
    pub fn shutdown(&mut self) {
        self.location.stop();
        self.in_flight = None;
        self.scheduler.abandon();
        info!(mode = %self.mode, "Orchestrator: stopped");
    }

    // ─── Inputs ──────────────────────────────────────────────────────────

    async fn apply_event(&mut self, event: Event) -> bool {
        debug!(event = event.name(), mode = %self.mode, "Orchestrator: event");
        let now = Instant::now();

        match event {
            Event::MarkerTapped(id) => self.on_marker_tapped(&id, now),
            Event::CardTapped(id) => {
                self.selection.select_from_list(&id, &self.display);
            }
            Event::BackgroundTapped => self.selection.clear_selection(),
            Event::RowMeasured { index, height } => {
                self.selection.record_row_height(index, height);
            }
            Event::Scrolled { offset } => self.layout.on_scroll(offset, now),
            Event::FuelTypeChanged(fuel_type) => {
                if fuel_type != self.fuel_type {
                    self.fuel_type = fuel_type;
                    self.requery();
                }
            }
            Event::SortChanged(sort) => {
                if sort != self.sort {
                    self.sort = sort;
                    self.requery();
                }
            }
            Event::ClearPin => {
                if self.gate.clear_pin() {
                    self.pins.borrow_and_update();
                    self.sync_search_mode().await;
                }
            }
            Event::Refresh => match self.mode {
                Mode::PermissionDenied => self.start_live(false).await,
                Mode::LiveTracking if !self.location.is_active() => {
                    info!("Orchestrator: retrying location watch");
                    self.start_live(true).await;
                }
                _ => self.requery(),
            },
            Event::DismissError => self.error = None,
            Event::Shutdown => {
                info!("Orchestrator: shutdown requested");
                return false;
            }
        }
        true
    }

    fn on_marker_tapped(&mut self, id: &StationId, now: Instant) {
        if !self.display.contains(id) {
            debug!(id = %id, "Orchestrator: tapped marker not on display");
            return;
        }
        let offset = self.selection.select_from_map(id, &self.display);
        self.layout.on_marker_selected(offset, now);
    }

    fn on_sample(&mut self, sample: LocationSample) {
        self.last_fix = Some(sample.point());
        self.fix_deadline = None;
        if self.error == Some(ViewError::LocationUnavailable) {
            self.error = None;
        }

        if self.mode != Mode::LiveTracking || !self.gate.allows_auto_fetch() {
            debug!(mode = %self.mode, "Orchestrator: sample ignored outside live mode");
            return;
        }

        if std::mem::take(&mut self.pending_recenter) {
            self.selection.recenter(sample.point());
        }

        let owed = std::mem::take(&mut self.pending_forced);
        if let Some(FetchDecision::TooSoon { remaining }) = self.fetch_nearby(owed) {
            if owed {
                debug!(
                    remaining_ms = remaining.as_millis() as u64,
                    "Orchestrator: live fetch retry scheduled"
                );
                self.forced_retry_at = Some(Instant::now() + remaining);
            }
        }
    }

    fn apply_settings(&mut self) {
        let next = self.settings_rx.borrow_and_update().clone();
        let previous = std::mem::replace(&mut self.settings, next);

        if previous.excluded_brands != self.settings.excluded_brands {
            info!(
                excluded = self.settings.excluded_brands.len(),
                "Orchestrator: brand exclusions changed"
            );
            self.refilter();
        }

        if previous.radius_m != self.settings.radius_m && self.mode == Mode::LiveTracking {
            info!(radius_m = self.settings.radius_m, "Orchestrator: radius changed");
            self.fetch_nearby(true);
        }
    }

    fn on_timers(&mut self, now: Instant) {
        self.layout.poll(now);

        if self.fix_deadline.is_some_and(|d| now >= d) {
            self.fix_deadline = None;
            if self.mode == Mode::LiveTracking {
                warn!("Orchestrator: no location fix within timeout");
                self.error = Some(ViewError::LocationUnavailable);
            }
        }

        if self.forced_retry_at.is_some_and(|d| now >= d) {
            self.forced_retry_at = None;
            if self.mode == Mode::LiveTracking {
                self.fetch_nearby(true);
            }
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        [self.layout.next_deadline(), self.fix_deadline, self.forced_retry_at]
            .into_iter()
            .flatten()
            .min()
    }

    // ─── Mode transitions ────────────────────────────────────────────────

    /// Bring the orchestrator in line with the pin board.
    async fn sync_search_mode(&mut self) {
        match self.gate.pin() {
            Some(pin) => self.adopt_pin(pin),
            None if self.mode == Mode::PinnedSearch => self.return_to_live().await,
            None => {}
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            info!(from = %self.mode, to = %mode, "Orchestrator: mode change");
            self.mode = mode;
        }
    }

    fn adopt_pin(&mut self, pin: SearchPin) {
        self.location.stop();
        self.drop_in_flight();
        self.pending_forced = false;
        self.pending_recenter = false;
        self.forced_retry_at = None;
        self.fix_deadline = None;

        self.set_mode(Mode::PinnedSearch);
        self.fuel_type = pin.fuel_type;
        self.sort = pin.sort;
        self.pin_label = Some(pin.label.clone());
        self.error = None;
        self.last_updated = Some(Utc::now());
        self.shown_params = Some((pin.fuel_type, pin.sort));
        self.snapshot = pin.results;
        self.refilter();
        self.selection.frame_results(&self.display);

        info!(
            label = ?self.pin_label,
            results = self.snapshot.len(),
            shown = self.display.len(),
            "Orchestrator: pinned results adopted"
        );
    }

    async fn return_to_live(&mut self) {
        self.drop_in_flight();
        self.pin_label = None;
        self.error = None;
        self.snapshot = Snapshot::empty();
        self.shown_params = None;
        self.refilter();
        self.start_live(true).await;
    }

    /// Acquire location and enter live mode. With `forced`, the first fix
    /// triggers a forced fetch and recenters the map.
    async fn start_live(&mut self, forced: bool) {
        match self.location.start().await {
            Ok(()) => {
                self.set_mode(Mode::LiveTracking);
                self.pending_forced = forced;
                self.pending_recenter = forced;

                let fresh = self.samples.has_changed().unwrap_or(false);
                let sample = *self.samples.borrow_and_update();
                match sample {
                    Some(sample) if fresh => self.on_sample(sample),
                    _ => {
                        debug!("Orchestrator: waiting for first fix");
                        self.fix_deadline = Some(Instant::now() + self.config.fix_timeout);
                    }
                }
            }
            Err(LocationError::PermissionDenied) => {
                self.set_mode(Mode::PermissionDenied);
                self.snapshot = Snapshot::empty();
                self.shown_params = None;
                self.refilter();
            }
            Err(e @ LocationError::Unavailable(_)) => {
                warn!(error = %e, "Orchestrator: location unavailable");
                self.set_mode(Mode::LiveTracking);
                self.error = Some(ViewError::LocationUnavailable);
            }
        }
    }

    // ─── Fetching ────────────────────────────────────────────────────────

    /// User changed a query parameter or asked for a refresh.
    fn requery(&mut self) {
        match self.mode {
            Mode::LiveTracking => {
                self.fetch_nearby(true);
            }
            Mode::PinnedSearch => self.fetch_pinned(),
            Mode::Initializing | Mode::PermissionDenied => {
                debug!(mode = %self.mode, "Orchestrator: nothing to query");
            }
        }
    }

    fn fetch_nearby(&mut self, forced: bool) -> Option<FetchDecision> {
        let Some(center) = self.last_fix else {
            if forced {
                debug!("Orchestrator: forced fetch deferred until first fix");
                self.pending_forced = true;
            }
            return None;
        };

        let decision = self.scheduler.try_begin(forced, Instant::now());
        let FetchDecision::Accepted { generation } = decision else {
            debug!(?decision, forced, "Orchestrator: nearby fetch not started");
            return Some(decision);
        };

        let query = FetchQuery::new(center, self.settings.radius_m, self.fuel_type, self.sort);
        let query = if forced { query.forced() } else { query };
        info!(
            generation,
            forced,
            lat = query.latitude,
            lng = query.longitude,
            radius_m = query.radius_m,
            fuel = %query.fuel_type,
            sort = %query.sort,
            "Orchestrator: fetching nearby stations"
        );

        let service = Arc::clone(&self.service);
        let nearby = query.to_nearby();
        self.begin(generation, Box::pin(async move { service.get_nearby(&nearby).await }));
        Some(decision)
    }

    fn fetch_pinned(&mut self) {
        let Some(pin) = self.gate.pin() else {
            return;
        };

        let decision = self.scheduler.try_begin(true, Instant::now());
        let FetchDecision::Accepted { generation } = decision else {
            debug!(?decision, "Orchestrator: pinned re-query not started");
            return;
        };

        let query = pin.label.query(self.fuel_type, self.sort);
        info!(
            generation,
            label = %pin.label,
            fuel = %query.fuel_type,
            sort = %query.sort,
            "Orchestrator: re-querying pinned location"
        );

        let service = Arc::clone(&self.service);
        self.begin(generation, Box::pin(async move { service.get_by_location(&query).await }));
    }

    /// Install a new request. A previous one is dropped unpolled.
    fn begin(&mut self, generation: u64, future: BoxFuture<'static, FetchResult>) {
        self.requested_params = Some((self.fuel_type, self.sort));
        if let Some(old) = self.in_flight.replace(InFlight { generation, future }) {
            debug!(superseded = old.generation, "Orchestrator: request superseded");
        }
    }

    fn drop_in_flight(&mut self) {
        self.in_flight = None;
        self.requested_params = None;
        self.scheduler.abandon();
    }

    fn complete_fetch(&mut self, generation: u64, result: FetchResult) {
        if !self.scheduler.finish(generation) {
            return;
        }

        match result {
            Ok(snapshot) => {
                info!(generation, stations = snapshot.len(), "Orchestrator: fetch succeeded");
                self.snapshot = snapshot;
                self.shown_params = self.requested_params.take();
                self.last_updated = Some(Utc::now());
                if matches!(self.error, Some(ViewError::FetchFailed(_))) {
                    self.error = None;
                }
            }
            Err(e) => {
                warn!(generation, error = %e, "Orchestrator: fetch failed");
                self.snapshot = Snapshot::empty();
                self.shown_params = None;
                self.requested_params = None;
                self.error = Some(ViewError::FetchFailed(e.to_string()));
            }
        }
        self.refilter();
    }

    fn refilter(&mut self) {
        self.display = filter(&self.snapshot, &self.settings.filter_config());
        self.selection.reconcile(&self.display);
    }

    // ─── Output ──────────────────────────────────────────────────────────

    fn publish(&self) {
        let in_flight = self.scheduler.is_in_flight();
        let next = ViewState {
            mode: self.mode,
            stations: self.display.clone(),
            selected: self.selection.selected().cloned(),
            loading: in_flight && self.snapshot.is_empty(),
            refreshing: in_flight && !self.snapshot.is_empty(),
            error: self.error.clone(),
            layout_fraction: self.layout.fraction_at(Instant::now()),
            fuel_type: self.fuel_type,
            sort: self.sort,
            pin_label: self.pin_label.clone(),
            last_updated: self.last_updated,
            location: self.last_fix,
            stale_parameters: self
                .shown_params
                .is_some_and(|shown| shown != (self.fuel_type, self.sort)),
        };

        self.view.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

async fn next_completion(slot: &mut Option<InFlight>) -> (u64, FetchResult) {
    match slot {
        Some(in_flight) => {
            let result = (&mut in_flight.future).await;
            (in_flight.generation, result)
        }
        None => future::pending().await,
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => future::pending().await,
    }
}
