use crate::types::enums::{ActionKind, RequestStatus, Role};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("request not found")]
    NotFound,
    #[error("invalid input: {message}")]
    Invalid { message: String },
    #[error("not permitted: {message}")]
    NotPermitted { message: String },
    #[error("{role} may not {action} this request")]
    Forbidden { action: ActionKind, role: Role },
    #[error("cannot {action} a request that is {from}")]
    InvalidTransition {
        action: ActionKind,
        from: RequestStatus,
    },
    #[error("conflict: {message}")]
    Conflict { message: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum VolunteerError {
    #[error("volunteer not found")]
    NotFound,
    #[error("assignment not found")]
    AssignmentNotFound,
    #[error("volunteer is inactive")]
    Inactive,
    #[error("not permitted: {message}")]
    Forbidden { message: String },
    #[error("invalid input: {message}")]
    Invalid { message: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum CommunicationError {
    #[error("communication not found")]
    NotFound,
    #[error("recipient not found")]
    RecipientNotFound,
    #[error("not permitted: {message}")]
    Forbidden { message: String },
    #[error("invalid input: {message}")]
    Invalid { message: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("invalid credentials for {role} role")]
    InvalidCredentials { role: Role },
    #[error("session not found")]
    SessionNotFound,
    #[error("email already registered")]
    EmailTaken,
    #[error("invalid input: {message}")]
    Invalid { message: String },
}

#[derive(Debug, Error)]
pub enum LifelineError {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Volunteer(#[from] VolunteerError),
    #[error(transparent)]
    Communication(#[from] CommunicationError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("store unavailable: {message}")]
    Store { message: String },
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl LifelineError {
    pub fn store(err: impl std::fmt::Display) -> Self {
        Self::Store {
            message: err.to_string(),
        }
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal {
            message: err.to_string(),
        }
    }

    /// Failures of the backing store may succeed on a later attempt; nothing
    /// else will without a change of input or state. A version conflict is
    /// retryable after re-fetching.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Store { .. } | Self::Request(RequestError::Conflict { .. })
        )
    }
}
