use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use tracker::config::Config;
use tracker::db::connect_store;
use tracker::routes::build_router;
use tracker::state::AppState;
use tracker::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    telemetry::init(config.log_level);

    info!("Starting tracker API v{}", env!("CARGO_PKG_VERSION"));

    let store = match connect_store(&config.database_url).await {
        Ok(store) => store,
        Err(e) => {
            error!("Startup failed: {e:#}");
            return Err(e);
        }
    };

    let state = AppState::new(Arc::new(store));

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
