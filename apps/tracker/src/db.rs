use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::store::{JobStore, PgJobStore};

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Connects and applies the schema. Any failure here is fatal for the process.
pub async fn connect_store(database_url: &str) -> Result<PgJobStore> {
    let store = PgJobStore::new(create_pool(database_url).await?);
    store
        .ensure_schema()
        .await
        .context("Failed to apply database schema")?;
    Ok(store)
}
