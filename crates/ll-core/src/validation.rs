use crate::error::{AuthError, CommunicationError, RequestError};
use crate::types::{CreateRequestInput, GeoFix, Location, RegisterInput};

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_DESCRIPTION_CHARS: usize = 5000;
pub const MAX_NOTE_CHARS: usize = 2000;
pub const MAX_MESSAGE_CHARS: usize = 1600;
pub const MIN_PASSWORD_CHARS: usize = 8;

fn invalid(message: &str) -> RequestError {
    RequestError::Invalid {
        message: message.to_string(),
    }
}

pub fn validate_create_request(input: &CreateRequestInput) -> Result<(), RequestError> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(invalid("title is required"));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(invalid("title must be at most 200 characters"));
    }
    if input.description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(invalid("description must be at most 5000 characters"));
    }
    if input.people_affected == Some(0) {
        return Err(invalid("people_affected must be at least 1"));
    }
    validate_location(&input.location)
}

pub fn validate_location(location: &Location) -> Result<(), RequestError> {
    match (location.latitude, location.longitude) {
        (Some(latitude), Some(longitude)) => {
            validate_coordinates(latitude, longitude, location.accuracy_m)
        }
        (None, None) => Ok(()),
        _ => Err(invalid("latitude and longitude must be given together")),
    }
}

pub fn validate_geo_fix(fix: &GeoFix) -> Result<(), RequestError> {
    validate_coordinates(fix.latitude, fix.longitude, fix.accuracy_m)
}

pub fn validate_coordinates(
    latitude: f64,
    longitude: f64,
    accuracy_m: Option<f64>,
) -> Result<(), RequestError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(invalid("latitude must be within [-90, 90]"));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(invalid("longitude must be within [-180, 180]"));
    }
    if accuracy_m.is_some_and(|accuracy| accuracy.is_nan() || accuracy < 0.0) {
        return Err(invalid("accuracy must be non-negative"));
    }
    Ok(())
}

/// Returns the trimmed note body.
pub fn validate_note(note: &str) -> Result<String, RequestError> {
    let body = note.trim();
    if body.is_empty() {
        return Err(invalid("note must not be empty"));
    }
    if body.chars().count() > MAX_NOTE_CHARS {
        return Err(invalid("note must be at most 2000 characters"));
    }
    Ok(body.to_string())
}

pub fn validate_message(message: &str) -> Result<String, CommunicationError> {
    let body = message.trim();
    if body.is_empty() {
        return Err(CommunicationError::Invalid {
            message: "message must not be empty".to_string(),
        });
    }
    if body.chars().count() > MAX_MESSAGE_CHARS {
        return Err(CommunicationError::Invalid {
            message: "message must be at most 1600 characters".to_string(),
        });
    }
    Ok(body.to_string())
}

pub fn validate_registration(input: &RegisterInput) -> Result<(), AuthError> {
    if input.full_name.trim().is_empty() {
        return Err(AuthError::Invalid {
            message: "full_name is required".to_string(),
        });
    }
    let email = input.email.trim();
    let valid_email = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid_email {
        return Err(AuthError::Invalid {
            message: "email is not valid".to_string(),
        });
    }
    if input.password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AuthError::Invalid {
            message: "password must be at least 8 characters".to_string(),
        });
    }
    match (input.latitude, input.longitude) {
        (Some(latitude), Some(longitude)) => {
            validate_coordinates(latitude, longitude, None).map_err(|err| AuthError::Invalid {
                message: err.to_string(),
            })
        }
        (None, None) => Ok(()),
        _ => Err(AuthError::Invalid {
            message: "latitude and longitude must be given together".to_string(),
        }),
    }
}
