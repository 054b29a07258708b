//! `Authenticated` extractor: resolves `Authorization: Bearer sess_…` to the
//! acting profile.

use crate::middleware::correlation::CorrelationId;
use crate::routes::error::error_response;
use crate::{AppState, build_lifeline};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::response::Response;
use ll_core::error::AuthError;
use ll_core::types::{Actor, SessionToken};
use ll_core::{LifelineError, RequestContext};
use ll_events::types::EventSource;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Authenticated {
    pub actor: Actor,
    pub token: SessionToken,
    pub correlation_id: Option<String>,
}

impl Authenticated {
    pub fn context(&self) -> RequestContext {
        RequestContext::new(EventSource::Api, self.correlation_id.clone())
    }
}

fn bearer(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let correlation_id = CorrelationId::from_parts(parts);
        let reject = |err: LifelineError| error_response(&err, correlation_id.clone());

        let token = bearer(parts)
            .and_then(|value| SessionToken::from_str(value).ok())
            .ok_or_else(|| reject(AuthError::SessionNotFound.into()))?;
        let lifeline = build_lifeline(state).map_err(reject)?;
        let actor = lifeline.sessions().resolve(&token).map_err(reject)?;

        Ok(Self {
            actor,
            token,
            correlation_id,
        })
    }
}
