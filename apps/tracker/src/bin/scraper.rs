//! Discovery batch job: fetch every configured source once, classify, store.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use tracker::config::Config;
use tracker::db::connect_store;
use tracker::pipeline::{DiscoveryPipeline, FetchPolicy};
use tracker::sources::{GreenhouseClient, HostRateLimiter, SourceRegistry};
use tracker::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    telemetry::init(config.log_level);

    info!("Starting tracker scraper v{}", env!("CARGO_PKG_VERSION"));

    let registry = SourceRegistry::load_or_empty(&config.sources_path);
    if registry.is_empty() {
        warn!("No sources configured in {}", config.sources_path);
    }

    let store = match connect_store(&config.database_url).await {
        Ok(store) => store,
        Err(e) => {
            error!("Startup failed: {e:#}");
            return Err(e);
        }
    };

    let limiter = HostRateLimiter::new(config.courtesy_delay)
        .context("Courtesy delay must be greater than zero")?;
    let greenhouse = GreenhouseClient::new(&config.greenhouse_api_base, config.fetch_timeout)?;

    let pipeline = DiscoveryPipeline::new(
        Arc::new(store),
        limiter,
        FetchPolicy {
            timeout: config.fetch_timeout,
            max_retries: config.fetch_max_retries,
            ..FetchPolicy::default()
        },
    )
    .with_client(Arc::new(greenhouse));

    let summary = pipeline.run(&registry).await;
    for (source, e) in &summary.sources_failed {
        warn!("Skipped {source}: {e}");
    }

    Ok(())
}
