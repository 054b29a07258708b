use crate::extract::Authenticated;
use crate::routes::error::{error_response, parse_id};
use crate::{AppState, build_lifeline};
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use ll_core::LifelineError;
use ll_core::error::RequestError;
use ll_core::types::{
    ActionInput, Bounds, Category, CreateRequestInput, DashboardStats, NearbyRequest, Priority,
    Request, RequestFilter, RequestId, RequestStatus, Role,
};
use ll_events::types::EventRecord;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, serde::Deserialize, ToSchema, IntoParams)]
pub struct RequestsQuery {
    status: Option<RequestStatus>,
    category: Option<Category>,
    priority: Option<Priority>,
}

impl RequestsQuery {
    fn filter(&self) -> RequestFilter {
        RequestFilter {
            status: self.status.map(|status| vec![status]),
            category: self.category,
            priority: self.priority,
            ..RequestFilter::default()
        }
    }
}

#[derive(Debug, serde::Deserialize, ToSchema, IntoParams)]
pub struct MapQuery {
    south: f64,
    west: f64,
    north: f64,
    east: f64,
}

#[derive(Debug, serde::Deserialize, ToSchema, IntoParams)]
pub struct NearbyQuery {
    max_km: Option<f64>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/requests", post(create_request).get(list_requests))
        .route("/requests/mine", get(my_requests))
        .route("/requests/map", get(map_requests))
        .route("/requests/nearby", get(nearby_requests))
        .route("/requests/dashboard", get(dashboard))
        .route("/requests/{id}", get(get_request))
        .route("/requests/{id}/history", get(history))
        .route("/requests/{id}/actions", post(act))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/requests",
    request_body = CreateRequestInput,
    responses((status = 200, body = Request))
)]
pub(crate) async fn create_request(
    State(state): State<AppState>,
    auth: Authenticated,
    Json(input): Json<CreateRequestInput>,
) -> Response {
    let lifeline = match build_lifeline(&state) {
        Ok(lifeline) => lifeline,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    let ctx = auth.context();
    match lifeline.requests().create(&ctx, &auth.actor, input) {
        Ok(request) => Json(request).into_response(),
        Err(err) => error_response(&err, ctx.correlation_id),
    }
}

/// Requests visible to the caller, narrowed by the query.
#[utoipa::path(
    get,
    path = "/api/requests",
    params(RequestsQuery),
    responses((status = 200, body = Vec<Request>))
)]
pub(crate) async fn list_requests(
    State(state): State<AppState>,
    auth: Authenticated,
    Query(query): Query<RequestsQuery>,
) -> Response {
    let lifeline = match build_lifeline(&state) {
        Ok(lifeline) => lifeline,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    let filter = query.filter();
    match lifeline.requests().list_for_actor(&auth.actor) {
        Ok(mut requests) => {
            requests.retain(|request| filter.matches(request));
            Json(requests).into_response()
        }
        Err(err) => error_response(&err, auth.correlation_id),
    }
}

/// What the caller submitted (victims) or holds (volunteers).
#[utoipa::path(
    get,
    path = "/api/requests/mine",
    responses((status = 200, body = Vec<Request>))
)]
pub(crate) async fn my_requests(State(state): State<AppState>, auth: Authenticated) -> Response {
    let lifeline = match build_lifeline(&state) {
        Ok(lifeline) => lifeline,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    let filter = match auth.actor.role {
        Role::Victim => RequestFilter {
            requester_id: Some(auth.actor.id.clone()),
            ..RequestFilter::default()
        },
        Role::Volunteer => RequestFilter {
            assigned_volunteer: Some(auth.actor.id.clone()),
            ..RequestFilter::default()
        },
        Role::NgoAdmin => {
            let err = RequestError::NotPermitted {
                message: "admins hold no requests of their own".to_string(),
            };
            return error_response(&LifelineError::from(err), auth.correlation_id);
        }
    };
    match lifeline.requests().list(&filter) {
        Ok(requests) => Json(requests).into_response(),
        Err(err) => error_response(&err, auth.correlation_id),
    }
}

#[utoipa::path(
    get,
    path = "/api/requests/map",
    params(MapQuery),
    responses((status = 200, body = Vec<Request>))
)]
pub(crate) async fn map_requests(
    State(state): State<AppState>,
    auth: Authenticated,
    Query(query): Query<MapQuery>,
) -> Response {
    let lifeline = match build_lifeline(&state) {
        Ok(lifeline) => lifeline,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    let bounds = Bounds {
        south: query.south,
        west: query.west,
        north: query.north,
        east: query.east,
    };
    match lifeline.requests().within_bounds(&bounds) {
        Ok(requests) => Json(requests).into_response(),
        Err(err) => error_response(&err, auth.correlation_id),
    }
}

#[utoipa::path(
    get,
    path = "/api/requests/nearby",
    params(NearbyQuery),
    responses((status = 200, body = Vec<NearbyRequest>))
)]
pub(crate) async fn nearby_requests(
    State(state): State<AppState>,
    auth: Authenticated,
    Query(query): Query<NearbyQuery>,
) -> Response {
    let lifeline = match build_lifeline(&state) {
        Ok(lifeline) => lifeline,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    match lifeline.requests().nearby(&auth.actor, query.max_km) {
        Ok(requests) => Json(requests).into_response(),
        Err(err) => error_response(&err, auth.correlation_id),
    }
}

#[utoipa::path(
    get,
    path = "/api/requests/dashboard",
    responses((status = 200, body = DashboardStats))
)]
pub(crate) async fn dashboard(State(state): State<AppState>, auth: Authenticated) -> Response {
    let lifeline = match build_lifeline(&state) {
        Ok(lifeline) => lifeline,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    match lifeline.requests().dashboard(&auth.actor) {
        Ok(stats) => Json(stats).into_response(),
        Err(err) => error_response(&err, auth.correlation_id),
    }
}

#[utoipa::path(
    get,
    path = "/api/requests/{id}",
    params(("id" = String, Path, description = "Request ID")),
    responses((status = 200, body = Request), (status = 404))
)]
pub(crate) async fn get_request(
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
    match lifeline.requests().get(&request_id) {
        Ok(Some(request)) => Json(request).into_response(),
        Ok(None) => error_response(&LifelineError::from(RequestError::NotFound), auth.correlation_id),
        Err(err) => error_response(&err, auth.correlation_id),
    }
}

#[utoipa::path(
    get,
    path = "/api/requests/{id}/history",
    params(("id" = String, Path, description = "Request ID")),
    responses((status = 200, body = Vec<EventRecord>))
)]
pub(crate) async fn history(
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
    match lifeline.requests().history(&request_id) {
        Ok(events) => Json(events).into_response(),
        Err(err) => error_response(&err, auth.correlation_id),
    }
}

/// Applies one lifecycle action. The body is a tagged action, for example
/// `{"action": {"type": "claim"}, "expected_version": 3}`.
#[utoipa::path(
    post,
    path = "/api/requests/{id}/actions",
    params(("id" = String, Path, description = "Request ID")),
    request_body = ActionInput,
    responses(
        (status = 200, body = Request),
        (status = 403),
        (status = 409),
        (status = 422)
    )
)]
pub(crate) async fn act(
    State(state): State<AppState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(input): Json<ActionInput>,
) -> Response {
    let lifeline = match build_lifeline(&state) {
        Ok(lifeline) => lifeline,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    let request_id: RequestId = match parse_id(&id) {
        Ok(value) => value,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    let ctx = auth.context();
    match lifeline.requests().act(&ctx, &auth.actor, &request_id, input) {
        Ok(request) => Json(request).into_response(),
        Err(err) => error_response(&err, ctx.correlation_id),
    }
}
