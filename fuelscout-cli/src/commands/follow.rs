//! Follow command - live nearby results from a fixed or replayed position.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::info;

use fuelscout::coord::GeoPoint;
use fuelscout::orchestrator::{Orchestrator, ViewState};
use fuelscout::search::SearchPinBoard;
use fuelscout::station::{FuelType, SortOption};

use super::common::apply_overrides;
use crate::error::CliError;
use crate::render::render_view;
use crate::replay::{load_track, ReplayPlatform};
use crate::runner::CliRunner;

/// Arguments for the follow command.
pub struct FollowArgs {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub track: Option<PathBuf>,
    pub fuel: Option<FuelType>,
    pub sort: Option<SortOption>,
    pub radius: Option<u32>,
    pub duration: Option<u64>,
    pub verbose: bool,
}

/// Run the follow command.
pub fn run(args: FollowArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.verbose)?;
    runner.log_startup("follow");
    let config = runner.config();

    let platform = match (&args.track, args.lat, args.lng) {
        (Some(path), _, _) => ReplayPlatform::from_track(load_track(path)?),
        (None, Some(lat), Some(lng)) => {
            let point = GeoPoint::checked(lat, lng).map_err(|e| CliError::Config(e.to_string()))?;
            ReplayPlatform::fixed(point)
        }
        _ => {
            return Err(CliError::Config(
                "Either --track or both --lat and --lng are required".to_string(),
            ))
        }
    };

    let settings = apply_overrides(config.settings(), args.fuel, args.sort, args.radius);

    println!("fuelscout v{}", fuelscout::VERSION);
    println!("================");
    println!();
    match args.track {
        Some(ref path) => println!("Track:  {} ({} fixes)", path.display(), platform.len()),
        None => println!("Position: fixed"),
    }
    println!("Radius: {} m", settings.radius_m);
    println!("Feed:   {}", config.service.base_url);
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let service = runner.create_service()?;
    let runtime = runner.runtime()?;

    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    ctrlc::set_handler(move || {
        println!();
        println!("Received shutdown signal, stopping...");
        on_signal.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let orchestrator_config = config.orchestrator_config();

    runtime.block_on(async move {
        let (_settings_tx, settings_rx) = watch::channel(settings);
        let (orchestrator, channels) = Orchestrator::new(
            service,
            Arc::new(platform),
            settings_rx,
            SearchPinBoard::new(),
            orchestrator_config,
        );

        if let Some(secs) = args.duration {
            let deadline = shutdown.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(secs)).await;
                info!(secs, "Follow: duration elapsed");
                deadline.cancel();
            });
        }

        let task = tokio::spawn(orchestrator.run(shutdown.clone()));
        let _handle = channels.handle;
        print_updates(channels.view).await;

        if let Err(e) = task.await {
            tracing::error!(error = %e, "Follow: orchestrator task failed");
        }
    });

    println!();
    println!("Stopped.");
    Ok(())
}

/// Print the list every time the station set, mode or error changes.
///
/// Layout-only changes are skipped. Returns once the orchestrator is gone.
async fn print_updates(mut view: watch::Receiver<ViewState>) {
    let mut last_printed: Option<ViewState> = None;

    while view.changed().await.is_ok() {
        let current = view.borrow_and_update().clone();
        if last_printed
            .as_ref()
            .is_some_and(|prev| !worth_printing(prev, &current))
        {
            continue;
        }
        print!("{}", render_view(&current));
        println!();
        last_printed = Some(current);
    }
}

fn worth_printing(prev: &ViewState, next: &ViewState) -> bool {
    prev.mode != next.mode
        || prev.stations != next.stations
        || prev.error != next.error
        || prev.loading != next.loading
        || prev.fuel_type != next.fuel_type
        || prev.sort != next.sort
        || prev.stale_parameters != next.stale_parameters
}
