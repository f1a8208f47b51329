//! Early-career job tracker: discovers postings from listing providers,
//! classifies them, stores them idempotently and serves paginated views.

pub mod classifier;
pub mod config;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod pipeline;
pub mod query;
pub mod routes;
pub mod sources;
pub mod state;
pub mod store;
pub mod telemetry;
