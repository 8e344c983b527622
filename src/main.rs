use rescue_dispatch::config::AppConfig;
use rescue_dispatch::routing::{OsrmClient, RouteCache, RouteProvider};
use rescue_dispatch::simulation::{spawn_simulation, SimulationState};
use rescue_dispatch::{console, fleet};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config = AppConfig::load()?;

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .init();

    info!("Starting Rescue Dispatch Simulation...");

    let fleet = match &config.fleet_file {
        Some(path) => fleet::load_fleet(path)?,
        None => fleet::default_fleet(),
    };

    let provider = if config.routing_enabled {
        let client = OsrmClient::new(&config.osrm_base_url, config.routing_timeout())?;
        info!("Street routing via {}", config.osrm_base_url);
        RouteProvider::new(
            Arc::new(client),
            RouteCache::new(config.route_cache_capacity, config.route_cache_ttl()),
        )
    } else {
        info!("Street routing disabled, boats travel in straight lines");
        RouteProvider::disabled()
    };

    let mut state = SimulationState::new(config.simulation_settings(), fleet);
    state.set_running(!config.start_paused);

    let (handle, simulation) = spawn_simulation(state, provider);
    let clock = config.clock().start(handle.clone());

    tokio::select! {
        result = console::run_console(handle) => {
            if let Err(e) = result {
                warn!("Console stopped: {}", e);
            }
            info!("Running until Ctrl-C");
            tokio::signal::ctrl_c().await?;
        }
        _ = tokio::signal::ctrl_c() => {}
    }

    info!("Shutting down");
    clock.abort();
    simulation.abort();
    Ok(())
}
