use std::time::Duration;

use axum::Router;
use sqlx::SqlitePool;

use crate::app::gate::cache::GateCaches;

/// Human-readable application name, used in templates and UI.
/// Change this constant to rename the app across all pages.
pub const APP_NAME: &str = "Lokera";

/// Shared state available to all handlers via Axum's state extractor.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: config::Config,
    pub caches: GateCaches,
}

impl AppState {
    /// Build state from a pool and config, wiring the gate caches to the
    /// configured TTL.
    pub fn new(db: SqlitePool, config: config::Config) -> Self {
        let caches = GateCaches::new(Duration::from_secs(config.auth_cache_ttl_secs));
        Self { db, config, caches }
    }
}

/// App routes (auth, onboarding, tenant pages, admin, billing, API).
/// Merged with site routes in lib.rs.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(features::auth::routes())
        .merge(features::setup::routes())
        .merge(features::dashboard::routes())
        .merge(features::portfolio::routes())
        .merge(features::billing::routes())
        .merge(features::admin::routes())
        .merge(features::api::routes())
}

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod features;
pub mod gate;
pub mod identity;
pub mod permissions;
pub mod session;
pub mod single_writer;
pub mod subscription_status;
pub mod tenant;
