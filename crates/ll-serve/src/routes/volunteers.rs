use crate::extract::Authenticated;
use crate::routes::error::{error_response, parse_id};
use crate::{AppState, build_lifeline};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use ll_core::LifelineError;
use ll_core::error::VolunteerError;
use ll_core::types::{
    Assignment, AssignmentId, AvailabilityInput, Profile, UserId, VolunteerStats,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/volunteers", get(list_volunteers))
        .route("/volunteers/availability", post(set_availability))
        .route("/volunteers/{id}", get(get_volunteer))
        .route("/volunteers/{id}/stats", get(stats))
        .route("/volunteers/{id}/assignments", get(assignments))
        .route("/assignments/{id}/accept", post(accept_assignment))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/volunteers",
    responses((status = 200, body = Vec<Profile>))
)]
pub(crate) async fn list_volunteers(
    State(state): State<AppState>,
    auth: Authenticated,
) -> Response {
    let lifeline = match build_lifeline(&state) {
        Ok(lifeline) => lifeline,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    match lifeline.volunteers().list() {
        Ok(volunteers) => Json(volunteers).into_response(),
        Err(err) => error_response(&err, auth.correlation_id),
    }
}

#[utoipa::path(
    get,
    path = "/api/volunteers/{id}",
    params(("id" = String, Path, description = "Volunteer user ID")),
    responses((status = 200, body = Profile), (status = 404))
)]
pub(crate) async fn get_volunteer(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Response {
    let lifeline = match build_lifeline(&state) {
        Ok(lifeline) => lifeline,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    let volunteer_id: UserId = match parse_id(&id) {
        Ok(value) => value,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    match lifeline.volunteers().get(&volunteer_id) {
        Ok(Some(profile)) => Json(profile).into_response(),
        Ok(None) => error_response(
            &LifelineError::from(VolunteerError::NotFound),
            auth.correlation_id,
        ),
        Err(err) => error_response(&err, auth.correlation_id),
    }
}

#[utoipa::path(
    get,
    path = "/api/volunteers/{id}/stats",
    params(("id" = String, Path, description = "Volunteer user ID")),
    responses((status = 200, body = VolunteerStats))
)]
pub(crate) async fn stats(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Response {
    let lifeline = match build_lifeline(&state) {
        Ok(lifeline) => lifeline,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    let volunteer_id: UserId = match parse_id(&id) {
        Ok(value) => value,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    match lifeline.volunteers().stats(&volunteer_id) {
        Ok(stats) => Json(stats).into_response(),
        Err(err) => error_response(&err, auth.correlation_id),
    }
}

#[utoipa::path(
    get,
    path = "/api/volunteers/{id}/assignments",
    params(("id" = String, Path, description = "Volunteer user ID")),
    responses((status = 200, body = Vec<Assignment>))
)]
pub(crate) async fn assignments(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Response {
    let lifeline = match build_lifeline(&state) {
        Ok(lifeline) => lifeline,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    let volunteer_id: UserId = match parse_id(&id) {
        Ok(value) => value,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    match lifeline.volunteers().assignments(&volunteer_id) {
        Ok(assignments) => Json(assignments).into_response(),
        Err(err) => error_response(&err, auth.correlation_id),
    }
}

/// Sets the calling volunteer's own availability.
#[utoipa::path(
    post,
    path = "/api/volunteers/availability",
    request_body = AvailabilityInput,
    responses((status = 200, body = Profile))
)]
pub(crate) async fn set_availability(
    State(state): State<AppState>,
    auth: Authenticated,
    Json(input): Json<AvailabilityInput>,
) -> Response {
    let lifeline = match build_lifeline(&state) {
        Ok(lifeline) => lifeline,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    let ctx = auth.context();
    match lifeline
        .volunteers()
        .set_availability(&ctx, &auth.actor, &auth.actor.id, input.availability)
    {
        Ok(profile) => Json(profile).into_response(),
        Err(err) => error_response(&err, ctx.correlation_id),
    }
}

#[utoipa::path(
    post,
    path = "/api/assignments/{id}/accept",
    params(("id" = String, Path, description = "Assignment ID")),
    responses((status = 200, body = Assignment))
)]
pub(crate) async fn accept_assignment(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Response {
    let lifeline = match build_lifeline(&state) {
        Ok(lifeline) => lifeline,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    let assignment_id: AssignmentId = match parse_id(&id) {
        Ok(value) => value,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    let ctx = auth.context();
    match lifeline
        .volunteers()
        .accept_assignment(&ctx, &auth.actor, &assignment_id)
    {
        Ok(assignment) => Json(assignment).into_response(),
        Err(err) => error_response(&err, ctx.correlation_id),
    }
}
