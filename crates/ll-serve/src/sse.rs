use crate::routes::error::error_response;
use crate::{AppState, build_lifeline};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::stream::{self, Stream, StreamExt};
use ll_core::types::Actor;
use ll_core::visibility::scope_record;
use ll_events::bus::{ChangeNotice, EventBus, Subscription};
use ll_events::types::{ColumnFilter, EventRecord};
use std::convert::Infallible;

/// A bus subscription seen through one caller's eyes. Records the caller may
/// not see are skipped; the rest arrive redacted. The subscription leaves the
/// registry when the consumer goes away.
pub struct Feed {
    subscription: Subscription,
    bus: EventBus,
    viewer: Actor,
    filter: Option<ColumnFilter>,
}

impl Feed {
    pub fn new(subscription: Subscription, bus: EventBus, viewer: Actor) -> Self {
        Self {
            subscription,
            bus,
            viewer,
            filter: None,
        }
    }

    /// Re-applies `filter` to the redacted row, so a predicate on a hidden
    /// column never matches.
    pub fn with_filter(mut self, filter: Option<ColumnFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn viewer(&self) -> &Actor {
        &self.viewer
    }

    pub async fn next(&mut self) -> Option<ChangeNotice> {
        loop {
            match self.subscription.recv().await? {
                ChangeNotice::Changed(record) => {
                    let Some(record) = scope_record(&self.viewer, record) else {
                        continue;
                    };
                    if self
                        .filter
                        .as_ref()
                        .is_none_or(|filter| filter.matches(&record.row))
                    {
                        return Some(ChangeNotice::Changed(record));
                    }
                }
                ChangeNotice::Resync => return Some(ChangeNotice::Resync),
            }
        }
    }
}

impl Drop for Feed {
    fn drop(&mut self) {
        if self.bus.unsubscribe(self.subscription.id()) {
            tracing::debug!(
                subscription = self.subscription.id().get(),
                "change feed closed"
            );
        }
    }
}

fn change_event(record: &EventRecord) -> Event {
    let json = serde_json::to_string(record).unwrap_or_else(|_| "{}".to_string());
    Event::default()
        .event("change")
        .id(record.seq.to_string())
        .data(json)
}

fn notice_event(notice: &ChangeNotice) -> Event {
    match notice {
        ChangeNotice::Changed(record) => change_event(record),
        ChangeNotice::Resync => Event::default().event("resync").data("{}"),
    }
}

pub fn live(feed: Feed) -> impl Stream<Item = ChangeNotice> + Send {
    stream::unfold(feed, |mut feed| async move {
        let notice = feed.next().await?;
        Some((notice, feed))
    })
}

/// Replays stored events after `after` (when given) that the feed would have
/// delivered, then follows the feed.
pub fn subscribe(
    state: &AppState,
    feed: Feed,
    accepts: impl Fn(&EventRecord) -> bool,
    after: Option<i64>,
    correlation_id: Option<String>,
) -> Response {
    let history = match after {
        Some(after) => {
            let lifeline = match build_lifeline(state) {
                Ok(lifeline) => lifeline,
                Err(err) => return error_response(&err, correlation_id),
            };
            match lifeline.events().list_for_actor(feed.viewer(), Some(after), None) {
                Ok(events) => events,
                Err(err) => return error_response(&err, correlation_id),
            }
        }
        None => Vec::new(),
    };
    let history = history
        .into_iter()
        .filter(|record| accepts(record))
        .map(|record| Ok::<Event, Infallible>(change_event(&record)))
        .collect::<Vec<_>>();

    let live_stream = live(feed).map(|notice| Ok::<Event, Infallible>(notice_event(&notice)));
    Sse::new(stream::iter(history).chain(live_stream))
        .keep_alive(KeepAlive::default())
        .into_response()
}
