use crate::error::LifelineError;
use ll_events::types::{EventRecord, Table};

pub trait EventRepository {
    fn append(&self, event: EventRecord) -> Result<EventRecord, LifelineError>;
    fn list(&self, after: Option<i64>, limit: Option<u32>)
    -> Result<Vec<EventRecord>, LifelineError>;
    fn list_for_row(&self, table: Table, row_id: &str) -> Result<Vec<EventRecord>, LifelineError>;
}
