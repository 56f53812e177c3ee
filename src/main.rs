mod aggregator;
mod catalog;
mod config;
mod freshness;
mod model;
mod normalizer;
mod server;
mod sources;
mod utils;

use std::sync::Arc;

use tokio::time::{Duration, sleep};
use tracing::{error, info};

use aggregator::Aggregator;
use config::AppConfig;
use freshness::FreshnessTracker;
use server::AppState;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    info!(
        "🚀 gpuprice starting: {} of 5 keyed sources configured",
        config.configured_source_count()
    );

    let freshness = Arc::new(FreshnessTracker::new());
    let sources = sources::build_sources(&config);
    let aggregator = Arc::new(Aggregator::new(sources, Arc::clone(&freshness)));

    // Periodic revalidation loop, alongside on-demand aggregation per request.
    let refresh_aggregator = Arc::clone(&aggregator);
    let interval = config.refresh_interval_seconds;
    tokio::spawn(async move {
        loop {
            info!("Starting scheduled refresh pass...");
            let offers = refresh_aggregator.aggregate().await;
            info!("Refresh pass complete: {} offers", offers.len());
            sleep(Duration::from_secs(interval)).await;
        }
    });

    let state = AppState {
        aggregator,
        freshness,
    };
    let app = server::routes(state);

    let listener = match tokio::net::TcpListener::bind(&config.listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", config.listen_addr, e);
            return;
        }
    };
    info!("Listening on {}", config.listen_addr);
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
    }
}
