//! Search command - query an administrative area and show it pinned.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use fuelscout::orchestrator::Orchestrator;
use fuelscout::search::{LocationLabel, SearchPin, SearchPinBoard};
use fuelscout::station::{FuelType, SortOption, StationQueryService};

use super::common::apply_overrides;
use crate::error::CliError;
use crate::render::render_view;
use crate::replay::ReplayPlatform;
use crate::runner::CliRunner;

/// Arguments for the search command.
pub struct SearchArgs {
    pub district: String,
    pub municipality: Option<String>,
    pub fuel: Option<FuelType>,
    pub sort: Option<SortOption>,
    pub verbose: bool,
}

/// Run the search command.
pub fn run(args: SearchArgs) -> Result<(), CliError> {
    if args.district.trim().is_empty() {
        return Err(CliError::Config("--district must not be empty".to_string()));
    }

    let runner = CliRunner::new(args.verbose)?;
    runner.log_startup("search");
    let config = runner.config();

    let settings = apply_overrides(config.settings(), args.fuel, args.sort, None);
    let fuel_type = settings.default_fuel_type();
    let sort = settings.default_sort;

    let mut label = LocationLabel::district(args.district.trim());
    if let Some(municipality) = args.municipality.as_deref().map(str::trim) {
        if !municipality.is_empty() {
            label = label.with_municipality(municipality);
        }
    }

    let service = runner.create_service()?;
    let runtime = runner.runtime()?;
    let orchestrator_config = config.orchestrator_config();

    let view = runtime.block_on(async move {
        info!(%label, fuel = %fuel_type, sort = %sort, "Search: querying area");
        let results = service
            .get_by_location(&label.query(fuel_type, sort))
            .await?;

        let board = SearchPinBoard::new();
        board.set(SearchPin::new(label, fuel_type, sort, results));

        let (_settings_tx, settings_rx) = watch::channel(settings);
        let (mut orchestrator, channels) = Orchestrator::new(
            service,
            Arc::new(ReplayPlatform::without_fix()),
            settings_rx,
            board,
            orchestrator_config,
        );
        orchestrator.mount().await;
        orchestrator.shutdown();

        let view = channels.view.borrow().clone();
        Ok::<_, CliError>(view)
    })?;

    print!("{}", render_view(&view));
    Ok(())
}
