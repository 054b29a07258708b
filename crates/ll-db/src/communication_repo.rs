use crate::util::{
    column, decode_enum, encode_enum, from_rfc3339, opt_rfc3339, query_all, query_one, to_rfc3339,
};
use chrono::{DateTime, Utc};
use ll_core::communications::CommunicationRepository;
use ll_core::error::{CommunicationError, LifelineError};
use ll_core::types::{Communication, CommunicationId, NewCommunication, RequestId, UserId};
use rusqlite::{Connection, Row, params};

const COLUMNS: &str = "id, request_id, sender_id, recipient_id, message, channel, sent_at, read_at";

pub struct CommunicationRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> CommunicationRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn require(&self, id: &CommunicationId) -> Result<Communication, LifelineError> {
        self.get(id)?
            .ok_or_else(|| CommunicationError::NotFound.into())
    }
}

impl CommunicationRepository for CommunicationRepo<'_> {
    fn create(&self, input: NewCommunication) -> Result<Communication, LifelineError> {
        let id = CommunicationId::generate();
        self.conn
            .execute(
                "INSERT INTO communications (id, request_id, sender_id, recipient_id, message, channel, sent_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    id.as_str(),
                    input.request_id.as_str(),
                    input.sender_id.as_str(),
                    input.recipient_id.as_str(),
                    input.message,
                    encode_enum(&input.channel)?,
                    to_rfc3339(&Utc::now()),
                ],
            )
            .map_err(LifelineError::store)?;
        self.require(&id)
    }

    fn get(&self, id: &CommunicationId) -> Result<Option<Communication>, LifelineError> {
        let sql = format!("SELECT {COLUMNS} FROM communications WHERE id = ?1");
        query_one(self.conn, &sql, [id.as_str()], map_communication_row)
    }

    fn list_for_request(&self, request_id: &RequestId) -> Result<Vec<Communication>, LifelineError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM communications WHERE request_id = ?1 ORDER BY sent_at ASC, rowid ASC"
        );
        query_all(self.conn, &sql, [request_id.as_str()], map_communication_row)
    }

    fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Communication>, LifelineError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM communications WHERE sender_id = ?1 OR recipient_id = ?1 ORDER BY sent_at DESC, rowid DESC"
        );
        query_all(self.conn, &sql, [user_id.as_str()], map_communication_row)
    }

    fn mark_read(
        &self,
        id: &CommunicationId,
        at: DateTime<Utc>,
    ) -> Result<Communication, LifelineError> {
        self.conn
            .execute(
                "UPDATE communications SET read_at = ?1 WHERE id = ?2 AND read_at IS NULL",
                params![to_rfc3339(&at), id.as_str()],
            )
            .map_err(LifelineError::store)?;
        self.require(id)
    }
}

fn map_communication_row(row: &Row<'_>) -> Result<Communication, LifelineError> {
    let id: String = column(row, 0)?;
    let request_id: String = column(row, 1)?;
    let sender_id: String = column(row, 2)?;
    let recipient_id: String = column(row, 3)?;
    let channel: String = column(row, 5)?;
    let sent_at: String = column(row, 6)?;
    Ok(Communication {
        id: CommunicationId::new(id).map_err(LifelineError::internal)?,
        request_id: RequestId::new(request_id).map_err(LifelineError::internal)?,
        sender_id: UserId::new(sender_id).map_err(LifelineError::internal)?,
        recipient_id: UserId::new(recipient_id).map_err(LifelineError::internal)?,
        message: column(row, 4)?,
        channel: decode_enum(&channel)?,
        sent_at: from_rfc3339(&sent_at)?,
        read_at: opt_rfc3339(column(row, 7)?)?,
    })
}
