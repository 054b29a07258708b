pub mod extract;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod sse;

use axum::Router;
use ll_core::config::LifelineConfig;
use ll_core::{Lifeline, LifelineError};
use ll_db::DbStore;
use ll_db::schema;
use ll_events::bus::EventBus;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct AppState {
    pub db_path: PathBuf,
    pub busy_timeout_ms: u64,
    pub nearby_radius_km: f64,
    pub event_bus: EventBus,
}

impl AppState {
    pub fn new(db_path: impl Into<PathBuf>, event_bus: EventBus) -> Self {
        Self {
            db_path: db_path.into(),
            busy_timeout_ms: schema::DEFAULT_BUSY_TIMEOUT_MS,
            nearby_radius_km: ll_core::lifeline::DEFAULT_NEARBY_RADIUS_KM,
            event_bus,
        }
    }

    pub fn from_config(config: &LifelineConfig) -> Self {
        Self {
            db_path: config.db_path.clone(),
            busy_timeout_ms: config.busy_timeout_ms,
            nearby_radius_km: config.nearby_radius_km,
            event_bus: EventBus::new(config.event_capacity),
        }
    }
}

/// Opens a fresh connection for one request. A failure to open the database is
/// reported as the store being unavailable.
pub fn build_lifeline(state: &AppState) -> Result<Lifeline<DbStore>, LifelineError> {
    let conn = schema::open_and_migrate(&state.db_path, state.busy_timeout_ms)
        .map_err(LifelineError::store)?;
    Ok(
        Lifeline::new(DbStore::new(conn), state.event_bus.clone())
            .with_nearby_radius(state.nearby_radius_km),
    )
}

pub fn app(state: AppState) -> Router {
    routes::router(state)
}

pub async fn serve(state: AppState, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, db = %state.db_path.display(), "lifeline api listening");
    axum::serve(listener, app(state)).await
}
