pub mod auth;
pub mod communications;
pub mod error;
pub mod events;
pub mod requests;
pub mod volunteers;

use crate::middleware::correlation::correlation_middleware;
use crate::{AppState, openapi};
use axum::Router;
use axum::middleware;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(auth::router(state.clone()))
        .merge(requests::router(state.clone()))
        .merge(volunteers::router(state.clone()))
        .merge(communications::router(state.clone()))
        .merge(events::router(state))
        .merge(openapi::router())
        .route_layer(middleware::from_fn(correlation_middleware));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
