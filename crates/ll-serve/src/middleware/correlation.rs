use axum::body::Body;
use axum::http::request::Parts;
use axum::http::{HeaderName, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use ulid::Ulid;

#[derive(Clone, Debug)]
pub struct CorrelationId(pub String);

impl CorrelationId {
    pub fn from_parts(parts: &Parts) -> Option<String> {
        parts.extensions.get::<Self>().map(|value| value.0.clone())
    }
}

pub const HEADER_NAME: &str = "x-correlation-id";

/// Echoes the caller's `x-correlation-id` or mints `corr_<ulid>`, and makes it
/// available to handlers as an extension.
pub async fn correlation_middleware(mut request: Request<Body>, next: Next) -> Response {
    let header = HeaderName::from_static(HEADER_NAME);
    let id = request
        .headers()
        .get(&header)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty() && value.len() <= 128)
        .map(ToString::to_string)
        .unwrap_or_else(|| format!("corr_{}", Ulid::new()));

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    request.extensions_mut().insert(CorrelationId(id.clone()));
    let mut response = next.run(request).await;
    tracing::debug!(
        correlation_id = %id,
        %method,
        %path,
        status = response.status().as_u16(),
        "handled"
    );
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(header, value);
    }
    response
}
