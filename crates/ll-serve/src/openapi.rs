use utoipa::OpenApi;

use crate::routes::error::ErrorEnvelope;
use crate::routes::events::{EventsQuery, SubscribeQuery};
use crate::routes::requests::{MapQuery, NearbyQuery, RequestsQuery};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use ll_core::types::{
    ActionInput, ActionKind, Actor, AlertKind, AlertOutcome, Assignment, AssignmentId,
    Availability, AvailabilityInput, Category, Channel, Communication, CommunicationId,
    CreateRequestInput, DashboardStats, DispatchReceipt, EmergencyAlertInput, GeoFix, Location,
    NearbyRequest, Note, Priority, Profile, RegisterInput, Request, RequestAction, RequestId,
    RequestStatus, Role, SendMessageInput, Session, SessionToken, SignInInput, UserId,
    VolunteerStats,
};
use ll_events::types::{ChangeKind, EventRecord, EventSource, Table};

#[derive(OpenApi)]
#[openapi(
    info(title = "Lifeline API", description = "Emergency request lifecycle service"),
    paths(
        crate::routes::auth::register,
        crate::routes::auth::sign_in,
        crate::routes::auth::sign_out,
        crate::routes::auth::me,
        crate::routes::requests::create_request,
        crate::routes::requests::list_requests,
        crate::routes::requests::my_requests,
        crate::routes::requests::map_requests,
        crate::routes::requests::nearby_requests,
        crate::routes::requests::dashboard,
        crate::routes::requests::get_request,
        crate::routes::requests::history,
        crate::routes::requests::act,
        crate::routes::volunteers::list_volunteers,
        crate::routes::volunteers::get_volunteer,
        crate::routes::volunteers::stats,
        crate::routes::volunteers::assignments,
        crate::routes::volunteers::set_availability,
        crate::routes::volunteers::accept_assignment,
        crate::routes::communications::send,
        crate::routes::communications::inbox,
        crate::routes::communications::for_request,
        crate::routes::communications::mark_read,
        crate::routes::communications::emergency_alert,
        crate::routes::events::list_events,
        crate::routes::events::subscribe,
        crate::routes::events::stream
    ),
    components(schemas(
        Request,
        Location,
        GeoFix,
        Note,
        CreateRequestInput,
        ActionInput,
        RequestAction,
        RequestsQuery,
        MapQuery,
        NearbyQuery,
        NearbyRequest,
        DashboardStats,
        Profile,
        Actor,
        Session,
        RegisterInput,
        SignInInput,
        AvailabilityInput,
        Assignment,
        VolunteerStats,
        Communication,
        SendMessageInput,
        EmergencyAlertInput,
        AlertOutcome,
        DispatchReceipt,
        EventRecord,
        EventsQuery,
        SubscribeQuery,
        ErrorEnvelope,
        RequestId,
        UserId,
        AssignmentId,
        CommunicationId,
        SessionToken,
        Role,
        RequestStatus,
        Priority,
        Category,
        Availability,
        Channel,
        AlertKind,
        ActionKind,
        EventSource,
        Table,
        ChangeKind
    ))
)]
struct ApiDoc;

pub fn generate_spec() -> String {
    ApiDoc::openapi()
        .to_pretty_json()
        .unwrap_or_else(|_| "{}".to_string())
}

pub fn router() -> Router {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_action_route() {
        let doc: serde_json::Value = serde_json::from_str(&generate_spec()).unwrap();
        assert!(doc["paths"]["/api/requests/{id}/actions"]["post"].is_object());
        assert!(doc["components"]["schemas"]["RequestAction"].is_object());
    }
}
