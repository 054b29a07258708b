use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ll_core::error::{AuthError, CommunicationError, RequestError, VolunteerError};
use ll_core::types::IdError;
use ll_core::LifelineError;
use serde::Serialize;
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    pub code: &'static str,
    pub message: String,
    pub correlation_id: Option<String>,
}

pub fn map_error(
    err: &LifelineError,
    correlation_id: Option<String>,
) -> (StatusCode, Json<ErrorEnvelope>) {
    let (status, code, message) = match err {
        LifelineError::Request(request) => map_request_error(request),
        LifelineError::Volunteer(volunteer) => map_volunteer_error(volunteer),
        LifelineError::Communication(communication) => map_communication_error(communication),
        LifelineError::Auth(auth) => map_auth_error(auth),
        LifelineError::Store { .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            "store_unavailable",
            err.to_string(),
        ),
        LifelineError::Internal { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            err.to_string(),
        ),
    };
    if status.is_server_error() {
        tracing::error!(
            correlation_id = correlation_id.as_deref().unwrap_or("-"),
            error = %err,
            "request failed"
        );
    }

    (
        status,
        Json(ErrorEnvelope {
            code,
            message,
            correlation_id,
        }),
    )
}

pub fn error_response(err: &LifelineError, correlation_id: Option<String>) -> Response {
    map_error(err, correlation_id).into_response()
}

/// Parses a path id. A malformed id is reported as invalid input, not as a
/// missing row.
pub fn parse_id<T>(raw: &str) -> Result<T, LifelineError>
where
    T: FromStr<Err = IdError>,
{
    T::from_str(raw).map_err(|err| {
        RequestError::Invalid {
            message: err.to_string(),
        }
        .into()
    })
}

fn map_request_error(err: &RequestError) -> (StatusCode, &'static str, String) {
    match err {
        RequestError::NotFound => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        RequestError::Invalid { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
        RequestError::NotPermitted { .. } | RequestError::Forbidden { .. } => {
            (StatusCode::FORBIDDEN, "forbidden", err.to_string())
        }
        RequestError::InvalidTransition { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_state",
            err.to_string(),
        ),
        RequestError::Conflict { .. } => (StatusCode::CONFLICT, "conflict", err.to_string()),
    }
}

fn map_volunteer_error(err: &VolunteerError) -> (StatusCode, &'static str, String) {
    match err {
        VolunteerError::NotFound | VolunteerError::AssignmentNotFound => {
            (StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        VolunteerError::Inactive => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_state",
            err.to_string(),
        ),
        VolunteerError::Forbidden { .. } => (StatusCode::FORBIDDEN, "forbidden", err.to_string()),
        VolunteerError::Invalid { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

fn map_communication_error(err: &CommunicationError) -> (StatusCode, &'static str, String) {
    match err {
        CommunicationError::NotFound | CommunicationError::RecipientNotFound => {
            (StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        CommunicationError::Forbidden { .. } => {
            (StatusCode::FORBIDDEN, "forbidden", err.to_string())
        }
        CommunicationError::Invalid { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

fn map_auth_error(err: &AuthError) -> (StatusCode, &'static str, String) {
    match err {
        AuthError::InvalidCredentials { .. } | AuthError::SessionNotFound => {
            (StatusCode::UNAUTHORIZED, "unauthenticated", err.to_string())
        }
        AuthError::EmailTaken => (StatusCode::CONFLICT, "conflict", err.to_string()),
        AuthError::Invalid { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ll_core::types::{ActionKind, RequestStatus};

    #[test]
    fn lifecycle_errors_map_to_distinct_statuses() {
        let transition = LifelineError::from(RequestError::InvalidTransition {
            action: ActionKind::Complete,
            from: RequestStatus::Completed,
        });
        let (status, body) = map_error(&transition, Some("corr_1".to_string()));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.code, "invalid_state");
        assert_eq!(body.correlation_id.as_deref(), Some("corr_1"));

        let conflict = LifelineError::from(RequestError::Conflict {
            message: "stale".to_string(),
        });
        assert_eq!(map_error(&conflict, None).0, StatusCode::CONFLICT);
        assert_eq!(
            map_error(&LifelineError::store("locked"), None).0,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            map_error(&LifelineError::from(AuthError::SessionNotFound), None).0,
            StatusCode::UNAUTHORIZED
        );
    }
}
