pub mod bus;
pub mod types;

pub use bus::{ChangeNotice, EventBus, Subscription, SubscriptionId};
pub use types::{ChangeKind, ColumnFilter, EventRecord, EventSource, Table};
