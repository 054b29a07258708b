use crate::util::{
    column, decode_enum, decode_json, encode_enum, encode_json, from_rfc3339, query_all,
    to_rfc3339,
};
use ll_core::error::LifelineError;
use ll_core::events::EventRepository;
use ll_events::types::{EventRecord, Table};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, Row, params, params_from_iter};
use ulid::Ulid;

const COLUMNS: &str =
    "id, seq, at, correlation_id, source, table_name, change, row_id, kind, row_json, detail_json";

pub struct EventRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> EventRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn next_seq(&self) -> Result<i64, LifelineError> {
        let seq: i64 = self
            .conn
            .query_row("SELECT COALESCE(MAX(seq), 0) FROM events", [], |row| {
                row.get(0)
            })
            .map_err(LifelineError::store)?;
        Ok(seq + 1)
    }
}

impl EventRepository for EventRepo<'_> {
    fn append(&self, mut event: EventRecord) -> Result<EventRecord, LifelineError> {
        event.seq = self.next_seq()?;
        event.id = format!("evt_{}", Ulid::new());
        self.conn
            .execute(
                "INSERT INTO events (id, seq, at, correlation_id, source, table_name, change, row_id, kind, row_json, detail_json) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    event.id,
                    event.seq,
                    to_rfc3339(&event.at),
                    event.correlation_id,
                    encode_enum(&event.source)?,
                    event.table.as_str(),
                    encode_enum(&event.change)?,
                    event.row_id,
                    event.kind,
                    encode_json(&event.row)?,
                    event.detail.as_ref().map(encode_json).transpose()?,
                ],
            )
            .map_err(LifelineError::store)?;
        Ok(event)
    }

    fn list(
        &self,
        after: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<EventRecord>, LifelineError> {
        let mut sql = format!("SELECT {COLUMNS} FROM events");
        let mut values: Vec<SqlValue> = Vec::new();
        if let Some(after) = after {
            values.push(SqlValue::Integer(after));
            sql.push_str(" WHERE seq > ?1");
        }
        sql.push_str(" ORDER BY seq ASC");
        if let Some(limit) = limit {
            values.push(SqlValue::Integer(i64::from(limit)));
            sql.push_str(&format!(" LIMIT ?{}", values.len()));
        }
        query_all(self.conn, &sql, params_from_iter(values), map_event_row)
    }

    fn list_for_row(&self, table: Table, row_id: &str) -> Result<Vec<EventRecord>, LifelineError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM events WHERE table_name = ?1 AND row_id = ?2 ORDER BY seq ASC"
        );
        query_all(self.conn, &sql, params![table.as_str(), row_id], map_event_row)
    }
}

fn map_event_row(row: &Row<'_>) -> Result<EventRecord, LifelineError> {
    let at: String = column(row, 2)?;
    let source: String = column(row, 4)?;
    let table: String = column(row, 5)?;
    let change: String = column(row, 6)?;
    let row_json: String = column(row, 9)?;
    let detail_json: Option<String> = column(row, 10)?;
    Ok(EventRecord {
        id: column(row, 0)?,
        seq: column(row, 1)?,
        at: from_rfc3339(&at)?,
        correlation_id: column(row, 3)?,
        source: decode_enum(&source)?,
        table: Table::parse(&table)
            .ok_or_else(|| LifelineError::internal(format!("unknown table: {table}")))?,
        change: decode_enum(&change)?,
        row_id: column(row, 7)?,
        kind: column(row, 8)?,
        row: decode_json(&row_json)?,
        detail: detail_json.as_deref().map(decode_json).transpose()?,
    })
}
