//! Integration tests for the orchestration core.
//!
//! These drive the orchestrator against the in-memory station service and
//! location platform, with tokio's clock paused so cooldowns, debounces and
//! timeouts are deterministic:
//! - fetch cooldown and forced spacing
//! - live ⇄ pinned mode switching
//! - brand filtering and selection consistency across refreshes
//! - the run loop's lifecycle
//!
//! Run with: `cargo test --test orchestrator_integration`

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{advance, Instant};
use tokio_util::sync::CancellationToken;

use fuelscout::layout::{DEFAULT_LIST_BIASED, DEFAULT_MAP_BIASED};
use fuelscout::location::{LocationSample, PermissionStatus};
use fuelscout::orchestrator::{
    Event, Mode, Orchestrator, OrchestratorChannels, OrchestratorConfig, Settings, ViewError,
};
use fuelscout::search::{LocationLabel, SearchPin, SearchPinBoard};
use fuelscout::selection::{ListCommand, MapCommand, DEFAULT_SCROLL_CORRECTION_PX};
use fuelscout::station::{FuelType, Snapshot, SortOption, StationId};
use fuelscout::testing::{
    snapshot_of, MockLocationPlatform, MockStationService, RecordedCall,
};

// ============================================================================
// Helper Functions
// ============================================================================

/// Baixa, Lisbon.
const HOME: (f64, f64) = (38.7110, -9.1390);

struct Harness {
    orch: Orchestrator<MockStationService, MockLocationPlatform>,
    channels: OrchestratorChannels,
    service: Arc<MockStationService>,
    platform: Arc<MockLocationPlatform>,
    board: SearchPinBoard,
    settings: watch::Sender<Settings>,
}

fn harness(platform: MockLocationPlatform, settings: Settings) -> Harness {
    let service = Arc::new(MockStationService::returning(nearby_stations()));
    let platform = Arc::new(platform);
    let board = SearchPinBoard::new();
    let (settings_tx, settings_rx) = watch::channel(settings);

    let (orch, channels) = Orchestrator::new(
        Arc::clone(&service),
        Arc::clone(&platform),
        settings_rx,
        board.clone(),
        OrchestratorConfig::default(),
    );

    Harness {
        orch,
        channels,
        service,
        platform,
        board,
        settings: settings_tx,
    }
}

fn live() -> Harness {
    harness(
        MockLocationPlatform::granted_at(HOME.0, HOME.1),
        Settings::default(),
    )
}

fn nearby_stations() -> Snapshot {
    snapshot_of(&[("1", "Galp"), ("2", "Repsol"), ("3", "BP")])
}

/// A sample `meters_north` of home; 0.001° latitude ≈ 111 m.
fn sample_north(meters_north: f64) -> LocationSample {
    LocationSample::new(HOME.0 + meters_north / 111_000.0, HOME.1)
}

fn lisbon_pin() -> SearchPin {
    SearchPin::new(
        LocationLabel::district("Lisboa").with_municipality("Sintra"),
        FuelType::Diesel,
        SortOption::Price,
        snapshot_of(&[
            ("10", "Galp"),
            ("11", "X"),
            ("12", "Repsol"),
            ("13", "BP"),
            ("14", "Cepsa"),
        ]),
    )
}

async fn mounted(mut h: Harness) -> Harness {
    h.orch.mount().await;
    h.orch.settle().await;
    h
}

/// Let spawned tasks run without letting the paused clock auto-advance.
async fn run_pending() {
    for _ in 0..64 {
        tokio::task::yield_now().await;
    }
}

/// Advance the clock in 100 ms steps, firing timers after each.
async fn run_timers(h: &mut Harness, steps: usize) {
    for _ in 0..steps {
        advance(Duration::from_millis(100)).await;
        h.orch.tick(Instant::now());
    }
}

fn is_near(fraction: f64, target: f64) -> bool {
    (fraction - target).abs() < 1e-9
}

fn drain<T>(rx: &mut tokio::sync::mpsc::UnboundedReceiver<T>) -> Vec<T> {
    let mut out = Vec::new();
    while let Ok(item) = rx.try_recv() {
        out.push(item);
    }
    out
}

// ============================================================================
// Fetch gating
// ============================================================================

/// Samples at 0 s, 10 s and 61 s: the middle one falls inside the poll
/// interval and must not reach the network.
#[tokio::test(start_paused = true)]
async fn test_cooldown_between_location_driven_fetches() {
    let mut h = mounted(live()).await;
    assert_eq!(h.service.call_count(), 1);
    assert_eq!(h.orch.mode(), Mode::LiveTracking);

    advance(Duration::from_secs(10)).await;
    h.platform.emit(sample_north(200.0));
    h.orch.sync_inputs().await;
    h.orch.settle().await;
    assert_eq!(h.service.call_count(), 1);

    advance(Duration::from_secs(51)).await;
    h.platform.emit(sample_north(400.0));
    h.orch.sync_inputs().await;
    h.orch.settle().await;
    assert_eq!(h.service.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_many_samples_within_interval_issue_one_call() {
    let mut h = mounted(live()).await;

    for step in 1..=5 {
        advance(Duration::from_secs(11)).await;
        h.platform.emit(sample_north(step as f64 * 100.0));
        h.orch.sync_inputs().await;
        h.orch.settle().await;
    }

    assert_eq!(h.service.call_count(), 1);
}

/// Fuel toggle at 0 s is fetched, a sort toggle 0.3 s later is rejected,
/// another at 1.2 s is fetched.
#[tokio::test(start_paused = true)]
async fn test_forced_fetch_spacing() {
    let mut h = mounted(live()).await;
    advance(Duration::from_secs(5)).await;

    h.orch
        .handle_event(Event::FuelTypeChanged(FuelType::Gasoline95))
        .await;
    h.orch.settle().await;
    assert_eq!(h.service.call_count(), 2);

    advance(Duration::from_millis(300)).await;
    h.orch
        .handle_event(Event::SortChanged(SortOption::Distance))
        .await;
    h.orch.settle().await;
    assert_eq!(h.service.call_count(), 2);
    assert!(h.orch.view().stale_parameters);

    advance(Duration::from_millis(900)).await;
    h.orch.handle_event(Event::SortChanged(SortOption::Price)).await;
    h.orch.settle().await;
    assert_eq!(h.service.call_count(), 3);
    assert!(!h.orch.view().stale_parameters);

    match h.service.last_call() {
        Some(RecordedCall::Nearby(query)) => {
            assert_eq!(query.fuel_type, FuelType::Gasoline95);
            assert_eq!(query.sort, SortOption::Price);
        }
        other => panic!("unexpected call: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_radius_change_forces_fetch() {
    let mut h = mounted(live()).await;
    advance(Duration::from_secs(2)).await;

    h.settings.send_modify(|s| s.radius_m = 12_000);
    h.orch.sync_inputs().await;
    h.orch.settle().await;

    assert_eq!(h.service.call_count(), 2);
    match h.service.last_call() {
        Some(RecordedCall::Nearby(query)) => assert_eq!(query.radius_m, 12_000),
        other => panic!("unexpected call: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_brand_exclusion_change_refilters_without_fetch() {
    let mut h = mounted(live()).await;
    assert_eq!(h.orch.view().stations.len(), 3);

    h.settings
        .send_modify(|s| s.excluded_brands = ["repsol".to_string()].into_iter().collect());
    h.orch.sync_inputs().await;

    let view = h.orch.view();
    assert_eq!(view.stations.len(), 2);
    assert!(view.stations.iter().all(|r| r.brand != "Repsol"));
    assert_eq!(h.service.call_count(), 1);
}

// ============================================================================
// Exclusivity (run loop)
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_superseding_fetch_keeps_single_request_outstanding() {
    let h = live();
    h.service.hold();
    let service = Arc::clone(&h.service);
    let handle = h.channels.handle.clone();
    let view = h.channels.view.clone();
    let token = CancellationToken::new();

    let task = tokio::spawn(h.orch.run(token.clone()));
    run_pending().await;

    assert_eq!(service.in_flight(), 1);
    assert!(view.borrow().loading);

    advance(Duration::from_secs(2)).await;
    handle.set_fuel_type(FuelType::Lpg).await.unwrap();
    run_pending().await;

    assert_eq!(service.call_count(), 2);
    assert_eq!(service.in_flight(), 1);
    assert_eq!(service.peak_in_flight(), 1);

    service.resume();
    run_pending().await;

    assert_eq!(service.in_flight(), 0);
    let state = view.borrow().clone();
    assert!(!state.loading && !state.refreshing);
    assert_eq!(state.fuel_type, FuelType::Lpg);
    assert_eq!(state.stations.len(), 3);

    token.cancel();
    task.await.unwrap();
}

// ============================================================================
// Pinned mode
// ============================================================================

/// Five pinned results, brand "X" excluded: four are shown.
#[tokio::test(start_paused = true)]
async fn test_pin_adoption_filters_and_frames_results() {
    let settings = Settings::default().with_excluded_brands(["X"]);
    let mut h = mounted(harness(
        MockLocationPlatform::granted_at(HOME.0, HOME.1),
        settings,
    ))
    .await;
    drain(&mut h.channels.to_map);

    h.board.set(lisbon_pin());
    h.orch.sync_inputs().await;

    let view = h.orch.view();
    assert_eq!(view.mode, Mode::PinnedSearch);
    assert_eq!(view.stations.len(), 4);
    assert!(view.stations.iter().all(|r| r.brand != "X"));
    assert_eq!(view.pin_label.as_ref().map(|l| l.district.as_str()), Some("Lisboa"));
    assert_eq!(h.platform.active_watches(), 0);

    assert!(matches!(
        drain(&mut h.channels.to_map).as_slice(),
        [MapCommand::FitBounds(_)]
    ));
    assert_eq!(
        drain(&mut h.channels.to_list),
        vec![ListCommand::ScrollToTop]
    );
}

#[tokio::test(start_paused = true)]
async fn test_pinned_mode_ignores_location() {
    let mut h = mounted(live()).await;
    h.board.set(lisbon_pin());
    h.orch.sync_inputs().await;
    let calls = h.service.call_count();

    for step in 1..=4 {
        advance(Duration::from_secs(90)).await;
        h.platform.emit(sample_north(step as f64 * 500.0));
        h.platform.emit_to_cancelled(sample_north(step as f64 * 700.0));
        h.orch.sync_inputs().await;
        h.orch.settle().await;
    }

    assert_eq!(h.service.call_count(), calls);
    assert_eq!(h.orch.mode(), Mode::PinnedSearch);
}

#[tokio::test(start_paused = true)]
async fn test_pinned_parameter_change_requeries_area() {
    let mut h = mounted(live()).await;
    h.board.set(lisbon_pin());
    h.orch.sync_inputs().await;
    advance(Duration::from_secs(2)).await;

    h.orch
        .handle_event(Event::SortChanged(SortOption::Distance))
        .await;
    h.orch.settle().await;

    match h.service.last_call() {
        Some(RecordedCall::Area(query)) => {
            assert_eq!(query.district, "Lisboa");
            assert_eq!(query.municipality.as_deref(), Some("Sintra"));
            assert_eq!(query.sort, SortOption::Distance);
        }
        other => panic!("unexpected call: {other:?}"),
    }
    assert_eq!(h.orch.view().stations.len(), 3);
    assert_eq!(h.orch.mode(), Mode::PinnedSearch);
}

#[tokio::test(start_paused = true)]
async fn test_failed_pinned_requery_clears_results() {
    let mut h = mounted(live()).await;
    h.board.set(lisbon_pin());
    h.orch.sync_inputs().await;
    advance(Duration::from_secs(2)).await;

    h.service.fail_with("gateway timeout");
    h.orch
        .handle_event(Event::FuelTypeChanged(FuelType::Lpg))
        .await;
    h.orch.settle().await;

    let view = h.orch.view();
    assert!(view.stations.is_empty());
    assert!(matches!(view.error, Some(ViewError::FetchFailed(_))));
}

/// Clearing the pin restarts tracking and fetches right away, even though
/// the last fetch started well inside the poll interval.
#[tokio::test(start_paused = true)]
async fn test_clear_pin_forces_immediate_fetch() {
    let mut h = mounted(live()).await;
    advance(Duration::from_secs(5)).await;
    h.board.set(lisbon_pin());
    h.orch.sync_inputs().await;
    drain(&mut h.channels.to_map);
    advance(Duration::from_secs(2)).await;

    h.orch.handle_event(Event::ClearPin).await;
    h.orch.settle().await;

    assert_eq!(h.orch.mode(), Mode::LiveTracking);
    assert_eq!(h.platform.active_watches(), 1);
    assert_eq!(h.service.call_count(), 2);
    assert!(matches!(h.service.last_call(), Some(RecordedCall::Nearby(q)) if q.radius_m > 0));
    assert!(!h.board.is_set());
    assert!(h.orch.view().pin_label.is_none());
    assert!(matches!(
        drain(&mut h.channels.to_map).as_slice(),
        [MapCommand::Recenter(_)]
    ));
}

#[tokio::test(start_paused = true)]
async fn test_clear_pin_without_fix_defers_fetch() {
    let mut h = mounted(live()).await;
    h.board.set(lisbon_pin());
    h.orch.sync_inputs().await;
    h.platform.set_fix(None);

    h.orch.handle_event(Event::ClearPin).await;
    h.orch.settle().await;
    assert_eq!(h.service.call_count(), 1);

    advance(Duration::from_secs(2)).await;
    h.platform.emit(sample_north(0.0));
    h.orch.sync_inputs().await;
    h.orch.settle().await;
    assert_eq!(h.service.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_clear_pin_inside_forced_spacing_retries() {
    let mut h = mounted(live()).await;
    h.board.set(lisbon_pin());
    h.orch.sync_inputs().await;

    // Mount fetch started under a second ago
    advance(Duration::from_millis(400)).await;
    h.orch.handle_event(Event::ClearPin).await;
    h.orch.settle().await;
    assert_eq!(h.service.call_count(), 1);

    advance(Duration::from_millis(700)).await;
    h.orch.tick(Instant::now());
    h.orch.settle().await;
    assert_eq!(h.service.call_count(), 2);
}

// ============================================================================
// Selection
// ============================================================================

/// Marker "42" at row 3 with rows 0–2 measured 80, 80, 90.
#[tokio::test(start_paused = true)]
async fn test_marker_tap_scrolls_list_past_measured_rows() {
    let h = live();
    h.service.respond_with(snapshot_of(&[
        ("7", "Galp"),
        ("8", "BP"),
        ("9", "Repsol"),
        ("42", "Cepsa"),
    ]));
    let mut h = mounted(h).await;

    for (index, height) in [(0, 80.0), (1, 80.0), (2, 90.0)] {
        h.orch
            .handle_event(Event::RowMeasured { index, height })
            .await;
    }
    h.orch
        .handle_event(Event::MarkerTapped(StationId::new("42")))
        .await;

    assert_eq!(
        drain(&mut h.channels.to_list),
        vec![ListCommand::ScrollTo {
            index: 3,
            offset: 80.0 + 80.0 + 90.0 + DEFAULT_SCROLL_CORRECTION_PX,
        }]
    );
    assert_eq!(h.orch.view().selected, Some(StationId::new("42")));
}

/// The list reports the scroll a marker tap commanded, passing through an
/// intermediate offset. The split must stay map-biased.
#[tokio::test(start_paused = true)]
async fn test_marker_tap_scroll_keeps_map_biased_split() {
    let h = live();
    h.service.respond_with(snapshot_of(&[
        ("7", "Galp"),
        ("8", "BP"),
        ("9", "Repsol"),
        ("42", "Cepsa"),
    ]));
    let mut h = mounted(h).await;
    for (index, height) in [(0, 80.0), (1, 80.0), (2, 90.0)] {
        h.orch
            .handle_event(Event::RowMeasured { index, height })
            .await;
    }

    h.orch.handle_event(Event::Scrolled { offset: 400.0 }).await;
    run_timers(&mut h, 5).await;
    assert!(is_near(h.orch.view().layout_fraction, DEFAULT_LIST_BIASED));

    h.orch
        .handle_event(Event::MarkerTapped(StationId::new("42")))
        .await;
    let offset = match drain(&mut h.channels.to_list).as_slice() {
        [ListCommand::ScrollTo { offset, .. }] => *offset,
        other => panic!("unexpected list commands: {other:?}"),
    };
    h.orch.handle_event(Event::Scrolled { offset: 330.0 }).await;
    h.orch.handle_event(Event::Scrolled { offset }).await;

    run_timers(&mut h, 12).await;
    assert!(is_near(h.orch.view().layout_fraction, DEFAULT_MAP_BIASED));

    h.orch
        .handle_event(Event::Scrolled {
            offset: offset + 200.0,
        })
        .await;
    run_timers(&mut h, 5).await;
    assert!(is_near(h.orch.view().layout_fraction, DEFAULT_LIST_BIASED));
}

/// Scroll events every 60 ms keep the split where it is; it moves once
/// scrolling pauses for the debounce.
#[tokio::test(start_paused = true)]
async fn test_split_waits_for_scrolling_to_pause() {
    let mut h = mounted(live()).await;

    for step in 0..6 {
        h.orch
            .handle_event(Event::Scrolled {
                offset: 60.0 + 40.0 * step as f64,
            })
            .await;
        advance(Duration::from_millis(60)).await;
        h.orch.tick(Instant::now());
        assert!(is_near(h.orch.view().layout_fraction, DEFAULT_MAP_BIASED));
    }

    run_timers(&mut h, 4).await;
    assert!(is_near(h.orch.view().layout_fraction, DEFAULT_LIST_BIASED));
}

#[tokio::test(start_paused = true)]
async fn test_refresh_drops_vanished_selection_and_heights() {
    let mut h = mounted(live()).await;
    h.orch
        .handle_event(Event::CardTapped(StationId::new("2")))
        .await;
    h.orch
        .handle_event(Event::RowMeasured {
            index: 0,
            height: 80.0,
        })
        .await;
    assert_eq!(h.orch.view().selected, Some(StationId::new("2")));

    h.service
        .respond_with(snapshot_of(&[("1", "Galp"), ("3", "BP")]));
    advance(Duration::from_secs(2)).await;
    h.orch.handle_event(Event::Refresh).await;
    h.orch.settle().await;
    assert_eq!(h.orch.view().selected, None);

    drain(&mut h.channels.to_list);
    h.orch
        .handle_event(Event::MarkerTapped(StationId::new("3")))
        .await;
    assert_eq!(
        drain(&mut h.channels.to_list),
        vec![ListCommand::ScrollTo {
            index: 1,
            offset: DEFAULT_SCROLL_CORRECTION_PX,
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn test_card_tap_recenters_and_background_clears() {
    let mut h = mounted(live()).await;
    drain(&mut h.channels.to_map);

    h.orch
        .handle_event(Event::CardTapped(StationId::new("3")))
        .await;
    assert!(matches!(
        drain(&mut h.channels.to_map).as_slice(),
        [MapCommand::Recenter(_)]
    ));

    h.orch.handle_event(Event::BackgroundTapped).await;
    assert_eq!(h.orch.view().selected, None);
    assert!(drain(&mut h.channels.to_map).is_empty());
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_fetch_failure_clears_and_next_success_recovers() {
    let mut h = mounted(live()).await;
    assert_eq!(h.orch.view().stations.len(), 3);

    h.service.fail_with("connection reset");
    advance(Duration::from_secs(2)).await;
    h.orch.handle_event(Event::Refresh).await;
    h.orch.settle().await;

    let view = h.orch.view();
    assert!(view.stations.is_empty());
    assert!(matches!(view.error, Some(ViewError::FetchFailed(_))));
    assert!(!h.orch.is_fetch_in_flight());

    h.service.respond_with(nearby_stations());
    advance(Duration::from_secs(2)).await;
    h.orch.handle_event(Event::Refresh).await;
    h.orch.settle().await;

    let view = h.orch.view();
    assert_eq!(view.stations.len(), 3);
    assert!(view.error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_error_is_dismissible() {
    let mut h = mounted(live()).await;
    h.service.fail_with("boom");
    advance(Duration::from_secs(2)).await;
    h.orch.handle_event(Event::Refresh).await;
    h.orch.settle().await;
    assert!(h.orch.view().error.is_some());

    h.orch.handle_event(Event::DismissError).await;
    assert!(h.orch.view().error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_permission_denied_is_terminal_until_pin() {
    let mut h = mounted(harness(MockLocationPlatform::denied(), Settings::default())).await;

    let view = h.orch.view();
    assert_eq!(view.mode, Mode::PermissionDenied);
    assert!(view.stations.is_empty());
    assert_eq!(h.service.call_count(), 0);

    h.board.set(lisbon_pin());
    h.orch.sync_inputs().await;
    assert_eq!(h.orch.mode(), Mode::PinnedSearch);

    h.orch.handle_event(Event::ClearPin).await;
    assert_eq!(h.orch.mode(), Mode::PermissionDenied);
    assert_eq!(h.platform.permission_requests(), 2);
    assert!(h.orch.view().stations.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_refresh_after_regrant_enters_live_mode() {
    let mut h = mounted(harness(MockLocationPlatform::denied(), Settings::default())).await;
    h.platform.set_permission(PermissionStatus::Granted);
    h.platform.set_fix(Some(sample_north(0.0)));

    h.orch.handle_event(Event::Refresh).await;
    h.orch.settle().await;

    assert_eq!(h.orch.mode(), Mode::LiveTracking);
    assert_eq!(h.service.call_count(), 1);
}

/// Location services refuse the watch at mount; a refresh once they are
/// back must start observing and fetch.
#[tokio::test(start_paused = true)]
async fn test_refresh_restarts_failed_location_watch() {
    let platform = MockLocationPlatform::granted_without_fix();
    platform.fail_watch_with("location services off");
    let mut h = mounted(harness(platform, Settings::default())).await;

    assert_eq!(h.orch.mode(), Mode::LiveTracking);
    assert_eq!(h.orch.view().error, Some(ViewError::LocationUnavailable));
    assert_eq!(h.platform.active_watches(), 0);

    h.orch.handle_event(Event::Refresh).await;
    assert_eq!(h.platform.active_watches(), 0);
    assert_eq!(h.service.call_count(), 0);

    h.platform.allow_watch();
    h.platform.set_fix(Some(sample_north(0.0)));
    h.orch.handle_event(Event::Refresh).await;
    h.orch.settle().await;

    assert_eq!(h.platform.active_watches(), 1);
    assert_eq!(h.service.call_count(), 1);
    let view = h.orch.view();
    assert_eq!(view.mode, Mode::LiveTracking);
    assert!(view.error.is_none());
    assert_eq!(view.stations.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_missing_fix_surfaces_after_timeout() {
    let mut h = mounted(harness(
        MockLocationPlatform::granted_without_fix(),
        Settings::default(),
    ))
    .await;
    assert_eq!(h.orch.mode(), Mode::LiveTracking);
    assert_eq!(h.service.call_count(), 0);

    advance(Duration::from_secs(14)).await;
    h.orch.tick(Instant::now());
    assert!(h.orch.view().error.is_none());

    advance(Duration::from_secs(1)).await;
    h.orch.tick(Instant::now());
    assert_eq!(h.orch.view().error, Some(ViewError::LocationUnavailable));

    h.platform.emit(sample_north(0.0));
    h.orch.sync_inputs().await;
    h.orch.settle().await;
    assert!(h.orch.view().error.is_none());
    assert_eq!(h.service.call_count(), 1);
}

// ============================================================================
// Run loop
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_run_loop_animates_split_on_scroll() {
    let h = live();
    let handle = h.channels.handle.clone();
    let view = h.channels.view.clone();
    let token = CancellationToken::new();
    let task = tokio::spawn(h.orch.run(token.clone()));
    run_pending().await;
    assert!((view.borrow().layout_fraction - DEFAULT_MAP_BIASED).abs() < 1e-9);

    handle.scrolled(200.0).await.unwrap();
    for _ in 0..10 {
        run_pending().await;
        advance(Duration::from_millis(100)).await;
    }
    run_pending().await;
    assert!((view.borrow().layout_fraction - DEFAULT_LIST_BIASED).abs() < 1e-9);

    handle.marker_tapped("1").await.unwrap();
    for _ in 0..10 {
        run_pending().await;
        advance(Duration::from_millis(100)).await;
    }
    run_pending().await;
    let state = view.borrow().clone();
    assert!((state.layout_fraction - DEFAULT_MAP_BIASED).abs() < 1e-9);
    assert_eq!(state.selected, Some(StationId::new("1")));

    token.cancel();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_run_loop_picks_up_pin_and_location() {
    let h = live();
    let platform = Arc::clone(&h.platform);
    let service = Arc::clone(&h.service);
    let board = h.board.clone();
    let view = h.channels.view.clone();
    let _handle = h.channels.handle.clone();
    let token = CancellationToken::new();
    let task = tokio::spawn(h.orch.run(token.clone()));
    run_pending().await;
    assert_eq!(service.call_count(), 1);

    advance(Duration::from_secs(61)).await;
    platform.emit(sample_north(300.0));
    run_pending().await;
    assert_eq!(service.call_count(), 2);

    board.set(lisbon_pin());
    run_pending().await;
    assert_eq!(view.borrow().mode, Mode::PinnedSearch);
    assert_eq!(platform.active_watches(), 0);

    token.cancel();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_run_loop_releases_location_on_cancel() {
    let h = live();
    let platform = Arc::clone(&h.platform);
    let _handle = h.channels.handle.clone();
    let token = CancellationToken::new();
    let task = tokio::spawn(h.orch.run(token.clone()));
    run_pending().await;
    assert_eq!(platform.active_watches(), 1);

    token.cancel();
    task.await.unwrap();
    assert_eq!(platform.active_watches(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_run_loop_stops_when_handles_dropped() {
    let h = live();
    let platform = Arc::clone(&h.platform);
    let Harness { orch, channels, .. } = h;
    let task = tokio::spawn(orch.run(CancellationToken::new()));
    run_pending().await;

    drop(channels);
    task.await.unwrap();
    assert_eq!(platform.active_watches(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_run_loop_shutdown_event() {
    let h = live();
    let platform = Arc::clone(&h.platform);
    let handle = h.channels.handle.clone();
    let task = tokio::spawn(h.orch.run(CancellationToken::new()));
    run_pending().await;

    handle.shutdown().await.unwrap();
    task.await.unwrap();
    assert_eq!(platform.active_watches(), 0);
    assert!(handle.is_closed());
}
