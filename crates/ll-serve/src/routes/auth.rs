use crate::extract::Authenticated;
use crate::middleware::correlation::CorrelationId;
use crate::routes::error::error_response;
use crate::{AppState, build_lifeline};
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use ll_core::{LifelineError, RequestContext};
use ll_core::types::{Profile, RegisterInput, Session, SignInInput};
use ll_events::types::EventSource;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/sign-out", post(sign_out))
        .route("/auth/me", get(me))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterInput,
    responses((status = 200, body = Profile))
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(input): Json<RegisterInput>,
) -> Response {
    let lifeline = match build_lifeline(&state) {
        Ok(lifeline) => lifeline,
        Err(err) => return error_response(&err, Some(correlation.0)),
    };
    let ctx = RequestContext::new(EventSource::Api, Some(correlation.0));
    let correlation_id = ctx.correlation_id.clone();
    let result = off_runtime(move || lifeline.sessions().register(&ctx, input)).await;
    match result {
        Ok(profile) => Json(profile).into_response(),
        Err(err) => error_response(&err, correlation_id),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/sign-in",
    request_body = SignInInput,
    responses((status = 200, body = Session), (status = 401))
)]
pub(crate) async fn sign_in(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(input): Json<SignInInput>,
) -> Response {
    let lifeline = match build_lifeline(&state) {
        Ok(lifeline) => lifeline,
        Err(err) => return error_response(&err, Some(correlation.0)),
    };
    match off_runtime(move || lifeline.sessions().sign_in(input)).await {
        Ok(session) => Json(session).into_response(),
        Err(err) => error_response(&err, Some(correlation.0)),
    }
}

#[utoipa::path(post, path = "/api/auth/sign-out", responses((status = 200)))]
pub(crate) async fn sign_out(State(state): State<AppState>, auth: Authenticated) -> Response {
    let lifeline = match build_lifeline(&state) {
        Ok(lifeline) => lifeline,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    match lifeline.sessions().sign_out(&auth.token) {
        Ok(()) => Json(serde_json::json!({ "ok": true })).into_response(),
        Err(err) => error_response(&err, auth.correlation_id),
    }
}

#[utoipa::path(get, path = "/api/auth/me", responses((status = 200, body = Profile)))]
pub(crate) async fn me(State(state): State<AppState>, auth: Authenticated) -> Response {
    let lifeline = match build_lifeline(&state) {
        Ok(lifeline) => lifeline,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    match lifeline.sessions().profile(&auth.actor) {
        Ok(profile) => Json(profile).into_response(),
        Err(err) => error_response(&err, auth.correlation_id),
    }
}

/// Runs argon2 work on the blocking pool.
async fn off_runtime<T, F>(work: F) -> Result<T, LifelineError>
where
    F: FnOnce() -> Result<T, LifelineError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .unwrap_or_else(|err| Err(LifelineError::internal(err)))
}
