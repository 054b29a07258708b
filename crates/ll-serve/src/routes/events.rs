use crate::extract::Authenticated;
use crate::routes::error::error_response;
use crate::sse::{Feed, live};
use crate::{AppState, build_lifeline};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures::StreamExt;
use ll_core::LifelineError;
use ll_core::error::RequestError;
use ll_core::types::Actor;
use ll_events::bus::ChangeNotice;
use ll_events::types::{ColumnFilter, EventRecord, Table};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, serde::Deserialize, ToSchema, IntoParams)]
pub struct EventsQuery {
    after: Option<i64>,
    limit: Option<u32>,
}

/// `table` narrows the feed to one table; `column` and `value` further narrow
/// it to rows whose column equals the value.
#[derive(Debug, serde::Deserialize, ToSchema, IntoParams)]
pub struct SubscribeQuery {
    table: Option<String>,
    column: Option<String>,
    value: Option<String>,
    after: Option<i64>,
}

impl SubscribeQuery {
    fn interest(&self) -> Result<(Option<Table>, Option<ColumnFilter>), LifelineError> {
        let invalid = |message: &str| {
            LifelineError::from(RequestError::Invalid {
                message: message.to_string(),
            })
        };
        let table = match self.table.as_deref() {
            Some(name) => Some(Table::parse(name).ok_or_else(|| invalid("unknown table"))?),
            None => None,
        };
        let filter = match (&self.column, &self.value) {
            (Some(column), Some(value)) => Some(ColumnFilter::eq(column.as_str(), value.as_str())),
            (None, None) => None,
            _ => return Err(invalid("column and value must be given together")),
        };
        if table.is_none() && filter.is_some() {
            return Err(invalid("a column filter needs a table"));
        }
        Ok((table, filter))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/events", get(list_events))
        .route("/events/subscribe", get(subscribe))
        .route("/events/stream", get(stream))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/events",
    params(EventsQuery),
    responses((status = 200, body = Vec<EventRecord>))
)]
pub(crate) async fn list_events(
    State(state): State<AppState>,
    auth: Authenticated,
    Query(query): Query<EventsQuery>,
) -> Response {
    let lifeline = match build_lifeline(&state) {
        Ok(lifeline) => lifeline,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    match lifeline
        .events()
        .list_for_actor(&auth.actor, query.after, query.limit)
    {
        Ok(events) => Json(events).into_response(),
        Err(err) => error_response(&err, auth.correlation_id),
    }
}

/// Server-sent change notices. Each `change` event carries an `EventRecord`;
/// a `resync` event means notices were dropped and the client should re-fetch.
#[utoipa::path(
    get,
    path = "/api/events/subscribe",
    params(SubscribeQuery),
    responses((status = 200))
)]
pub(crate) async fn subscribe(
    State(state): State<AppState>,
    auth: Authenticated,
    Query(query): Query<SubscribeQuery>,
) -> Response {
    let (table, filter) = match query.interest() {
        Ok(interest) => interest,
        Err(err) => return error_response(&err, auth.correlation_id),
    };
    let subscription = match table {
        Some(table) => state.event_bus.subscribe(table, filter.clone()),
        None => state.event_bus.subscribe_all(),
    };
    tracing::debug!(
        subscription = subscription.id().get(),
        user_id = %auth.actor.id,
        table = table.map_or("*", Table::as_str),
        "change feed opened"
    );
    let feed = Feed::new(subscription, state.event_bus.clone(), auth.actor.clone())
        .with_filter(filter.clone());
    let accepts = move |record: &EventRecord| {
        table.is_none_or(|table| record.table == table)
            && filter.as_ref().is_none_or(|filter| filter.matches(&record.row))
    };
    crate::sse::subscribe(&state, feed, accepts, query.after, auth.correlation_id)
}

#[utoipa::path(get, path = "/api/events/stream", responses((status = 101)))]
pub(crate) async fn stream(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    auth: Authenticated,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_stream(socket, state, auth.actor))
}

async fn handle_stream(mut socket: WebSocket, state: AppState, viewer: Actor) {
    let feed = Feed::new(
        state.event_bus.subscribe_all(),
        state.event_bus.clone(),
        viewer,
    );
    let mut notices = Box::pin(live(feed));
    while let Some(notice) = notices.next().await {
        let json = match &notice {
            ChangeNotice::Changed(record) => {
                serde_json::to_string(record).unwrap_or_else(|_| "{}".to_string())
            }
            ChangeNotice::Resync => r#"{"type":"resync"}"#.to_string(),
        };
        if socket.send(Message::Text(json.into())).await.is_err() {
            break;
        }
    }
}
