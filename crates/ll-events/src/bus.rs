use crate::types::{ColumnFilter, EventRecord, Table};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Interest {
    table: Option<Table>,
    filter: Option<ColumnFilter>,
}

impl Interest {
    fn accepts(&self, event: &EventRecord) -> bool {
        if let Some(table) = self.table {
            if event.table != table {
                return false;
            }
        }
        match &self.filter {
            Some(filter) => filter.matches(&event.row),
            None => true,
        }
    }
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    entries: HashMap<SubscriptionId, Interest>,
}

/// In-process fan-out of committed change events.
///
/// Every subscription is an entry in the bus registry and stays there until it
/// is explicitly unsubscribed. Dropping a [`Subscription`] does not remove it.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventRecord>,
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            registry: Arc::new(Mutex::new(Registry::default())),
        }
    }

    pub fn subscribe(&self, table: Table, filter: Option<ColumnFilter>) -> Subscription {
        self.register(Interest {
            table: Some(table),
            filter,
        })
    }

    pub fn subscribe_all(&self) -> Subscription {
        self.register(Interest {
            table: None,
            filter: None,
        })
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        lock(&self.registry).entries.remove(&id).is_some()
    }

    pub fn active_subscriptions(&self) -> usize {
        lock(&self.registry).entries.len()
    }

    pub fn publish(
        &self,
        event: EventRecord,
    ) -> Result<(), broadcast::error::SendError<EventRecord>> {
        self.sender.send(event).map(|_| ())
    }

    fn register(&self, interest: Interest) -> Subscription {
        let receiver = self.sender.subscribe();
        let id = {
            let mut registry = lock(&self.registry);
            registry.next_id += 1;
            let id = SubscriptionId(registry.next_id);
            registry.entries.insert(id, interest.clone());
            id
        };
        Subscription {
            id,
            interest,
            receiver,
            registry: Arc::clone(&self.registry),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeNotice {
    Changed(EventRecord),
    /// Events were dropped because the consumer fell behind; re-fetch.
    Resync,
}

pub struct Subscription {
    id: SubscriptionId,
    interest: Interest,
    receiver: broadcast::Receiver<EventRecord>,
    registry: Arc<Mutex<Registry>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        lock(&self.registry).entries.contains_key(&self.id)
    }

    /// Waits for the next matching notice. Returns `None` once the
    /// subscription has been removed from the bus or the bus is gone.
    pub async fn recv(&mut self) -> Option<ChangeNotice> {
        loop {
            if !self.is_active() {
                return None;
            }
            match self.receiver.recv().await {
                Ok(event) => {
                    if !self.is_active() {
                        return None;
                    }
                    if self.interest.accepts(&event) {
                        return Some(ChangeNotice::Changed(event));
                    }
                }
                Err(RecvError::Lagged(_)) => return Some(ChangeNotice::Resync),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    pub fn unsubscribe(self) {
        lock(&self.registry).entries.remove(&self.id);
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    match registry.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChangeKind, EventSource};
    use chrono::Utc;
    use serde_json::json;

    fn record(table: Table, row: serde_json::Value) -> EventRecord {
        EventRecord {
            id: "evt_test".to_string(),
            seq: 1,
            at: Utc::now(),
            correlation_id: None,
            source: EventSource::Api,
            table,
            change: ChangeKind::Insert,
            row_id: "row".to_string(),
            kind: "Test".to_string(),
            row,
            detail: None,
        }
    }

    #[tokio::test]
    async fn filtered_subscription_skips_other_rows_and_tables() {
        let bus = EventBus::new(16);
        let mut sub = bus.subscribe(
            Table::Communications,
            Some(ColumnFilter::eq("recipient_id", "usr_a")),
        );

        bus.publish(record(Table::Requests, json!({ "recipient_id": "usr_a" })))
            .unwrap();
        bus.publish(record(Table::Communications, json!({ "recipient_id": "usr_b" })))
            .unwrap();
        bus.publish(record(Table::Communications, json!({ "recipient_id": "usr_a" })))
            .unwrap();

        let Some(ChangeNotice::Changed(event)) = sub.recv().await else {
            panic!("expected a change notice");
        };
        assert_eq!(event.table, Table::Communications);
        assert_eq!(event.row["recipient_id"], "usr_a");
    }

    #[tokio::test]
    async fn unsubscribe_removes_registry_entry_and_ends_stream() {
        let bus = EventBus::new(16);
        let mut sub = bus.subscribe_all();
        let other = bus.subscribe(Table::Requests, None);
        assert_eq!(bus.active_subscriptions(), 2);

        assert!(bus.unsubscribe(sub.id()));
        assert!(!bus.unsubscribe(sub.id()));
        bus.publish(record(Table::Requests, json!({}))).unwrap();
        assert_eq!(sub.recv().await, None);

        other.unsubscribe();
        assert_eq!(bus.active_subscriptions(), 0);
    }

    #[tokio::test]
    async fn dropped_handle_stays_registered_until_unsubscribed() {
        let bus = EventBus::new(16);
        let sub = bus.subscribe(Table::Profiles, None);
        let id = sub.id();
        drop(sub);
        assert_eq!(bus.active_subscriptions(), 1);
        assert!(bus.unsubscribe(id));
    }

    #[tokio::test]
    async fn lagging_consumer_gets_resync() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe_all();
        for _ in 0..5 {
            bus.publish(record(Table::Requests, json!({}))).unwrap();
        }
        assert_eq!(sub.recv().await, Some(ChangeNotice::Resync));
        assert!(matches!(sub.recv().await, Some(ChangeNotice::Changed(_))));
    }
}
