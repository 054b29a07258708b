use crate::extract::Authenticated;
use crate::routes::error::{error_response, parse_id};
use crate::{AppState, build_lifeline};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use ll_core::types::{
    AlertOutcome, Communication, CommunicationId, EmergencyAlertInput, RequestId,
    SendMessageInput,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/communications", post(send).get(inbox))
        .route("/communications/{id}/read", post(mark_read))
        .route("/requests/{id}/communications", get(for_request))
        .route("/alerts/emergency", post(emergency_alert))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/communications",
    request_body = SendMessageInput,
    responses((status = 200, body = Communication))
)]
pub(crate) async fn send(
    State(state): State<AppState>,
    auth: Authenticated,
    Json(input): Json<SendMessageInput>,
) -> Response {
    let lifeline = match build_lifeline(&state) {
        Ok(lifeline) => lifeline,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    let ctx = auth.context();
    match lifeline.communications().send(&ctx, &auth.actor, input) {
        Ok(communication) => Json(communication).into_response(),
        Err(err) => error_response(&err, ctx.correlation_id),
    }
}

/// Messages sent or received by the caller, newest first.
#[utoipa::path(
    get,
    path = "/api/communications",
    responses((status = 200, body = Vec<Communication>))
)]
pub(crate) async fn inbox(State(state): State<AppState>, auth: Authenticated) -> Response {
    let lifeline = match build_lifeline(&state) {
        Ok(lifeline) => lifeline,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    match lifeline.communications().for_user(&auth.actor) {
        Ok(messages) => Json(messages).into_response(),
        Err(err) => error_response(&err, auth.correlation_id),
    }
}

#[utoipa::path(
    get,
    path = "/api/requests/{id}/communications",
    params(("id" = String, Path, description = "Request ID")),
    responses((status = 200, body = Vec<Communication>))
)]
pub(crate) async fn for_request(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Response {
    let lifeline = match build_lifeline(&state) {
        Ok(lifeline) => lifeline,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    let request_id: RequestId = match parse_id(&id) {
        Ok(value) => value,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    match lifeline.communications().for_request(&request_id) {
        Ok(messages) => Json(messages).into_response(),
        Err(err) => error_response(&err, auth.correlation_id),
    }
}

#[utoipa::path(
    post,
    path = "/api/communications/{id}/read",
    params(("id" = String, Path, description = "Communication ID")),
    responses((status = 200, body = Communication))
)]
pub(crate) async fn mark_read(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Response {
    let lifeline = match build_lifeline(&state) {
        Ok(lifeline) => lifeline,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    let communication_id: CommunicationId = match parse_id(&id) {
        Ok(value) => value,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    let ctx = auth.context();
    match lifeline
        .communications()
        .mark_read(&ctx, &auth.actor, &communication_id)
    {
        Ok(communication) => Json(communication).into_response(),
        Err(err) => error_response(&err, ctx.correlation_id),
    }
}

#[utoipa::path(
    post,
    path = "/api/alerts/emergency",
    request_body = EmergencyAlertInput,
    responses((status = 200, body = AlertOutcome), (status = 503))
)]
pub(crate) async fn emergency_alert(
    State(state): State<AppState>,
    auth: Authenticated,
    Json(input): Json<EmergencyAlertInput>,
) -> Response {
    let lifeline = match build_lifeline(&state) {
        Ok(lifeline) => lifeline,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    let ctx = auth.context();
    match lifeline.alerts().emergency(&ctx, &auth.actor, input) {
        Ok(outcome) => Json(outcome).into_response(),
        Err(err) => error_response(&err, ctx.correlation_id),
    }
}
