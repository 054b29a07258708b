use crate::util::{
    column, decode_enum, decode_json, encode_enum, encode_json, from_rfc3339, opt_rfc3339,
    query_all, query_one, to_rfc3339,
};
use chrono::Utc;
use ll_core::error::{LifelineError, RequestError};
use ll_core::requests::RequestRepository;
use ll_core::types::{
    CreateRequestInput, Location, Priority, Request, RequestFilter, RequestId, RequestPatch,
    RequestStatus, UserId,
};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, Row, params, params_from_iter};

const COLUMNS: &str = "id, requester_id, title, description, category, priority, status, people_affected, address, latitude, longitude, accuracy_m, captured_at, assigned_volunteer, rejection_reason, escalated_from, notes_json, version, created_at, updated_at, acknowledged_at, assigned_at, started_at, completed_at, rejected_at, cancelled_at";

pub struct RequestRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> RequestRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl RequestRepository for RequestRepo<'_> {
    fn create(
        &self,
        requester: &UserId,
        input: CreateRequestInput,
    ) -> Result<Request, LifelineError> {
        let id = RequestId::generate();
        let now = to_rfc3339(&Utc::now());
        let sql = "INSERT INTO requests (id, requester_id, title, description, category, priority, status, people_affected, address, latitude, longitude, accuracy_m, captured_at, notes_json, version, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, '[]', 1, ?14, ?14)";
        self.conn
            .execute(
                sql,
                params![
                    id.as_str(),
                    requester.as_str(),
                    input.title,
                    input.description,
                    encode_enum(&input.category)?,
                    encode_enum(&input.priority.unwrap_or(Priority::Medium))?,
                    encode_enum(&RequestStatus::Pending)?,
                    input.people_affected.unwrap_or(1),
                    input.location.address,
                    input.location.latitude,
                    input.location.longitude,
                    input.location.accuracy_m,
                    input.location.captured_at.map(|at| to_rfc3339(&at)),
                    now,
                ],
            )
            .map_err(LifelineError::store)?;
        self.get(&id)?
            .ok_or_else(|| LifelineError::internal("inserted request vanished"))
    }

    fn get(&self, id: &RequestId) -> Result<Option<Request>, LifelineError> {
        let sql = format!("SELECT {COLUMNS} FROM requests WHERE id = ?1");
        query_one(self.conn, &sql, [id.as_str()], map_request_row)
    }

    fn list(&self, filter: &RequestFilter) -> Result<Vec<Request>, LifelineError> {
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<SqlValue> = Vec::new();

        if let Some(statuses) = &filter.status {
            if statuses.is_empty() {
                return Ok(Vec::new());
            }
            let mut marks = Vec::with_capacity(statuses.len());
            for status in statuses {
                values.push(SqlValue::Text(encode_enum(status)?));
                marks.push(format!("?{}", values.len()));
            }
            clauses.push(format!("status IN ({})", marks.join(", ")));
        }
        if let Some(category) = &filter.category {
            values.push(SqlValue::Text(encode_enum(category)?));
            clauses.push(format!("category = ?{}", values.len()));
        }
        if let Some(priority) = &filter.priority {
            values.push(SqlValue::Text(encode_enum(priority)?));
            clauses.push(format!("priority = ?{}", values.len()));
        }
        if let Some(requester) = &filter.requester_id {
            values.push(SqlValue::Text(requester.to_string()));
            clauses.push(format!("requester_id = ?{}", values.len()));
        }
        if let Some(volunteer) = &filter.assigned_volunteer {
            values.push(SqlValue::Text(volunteer.to_string()));
            clauses.push(format!("assigned_volunteer = ?{}", values.len()));
        }

        let mut sql = format!("SELECT {COLUMNS} FROM requests");
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC, rowid DESC");
        query_all(self.conn, &sql, params_from_iter(values), map_request_row)
    }

    fn apply_patch(
        &self,
        id: &RequestId,
        expected_version: i64,
        patch: &RequestPatch,
    ) -> Result<Request, LifelineError> {
        let Some(mut request) = self.get(id)? else {
            return Err(RequestError::NotFound.into());
        };
        if request.version != expected_version {
            return Err(stale(expected_version, request.version));
        }
        patch.apply_to(&mut request);
        request.updated_at = Utc::now();

        let sql = "UPDATE requests SET priority = ?1, status = ?2, address = ?3, latitude = ?4, longitude = ?5, accuracy_m = ?6, captured_at = ?7, assigned_volunteer = ?8, rejection_reason = ?9, escalated_from = ?10, notes_json = ?11, updated_at = ?12, acknowledged_at = ?13, assigned_at = ?14, started_at = ?15, completed_at = ?16, rejected_at = ?17, cancelled_at = ?18, version = version + 1 WHERE id = ?19 AND version = ?20";
        let changed = self
            .conn
            .execute(
                sql,
                params![
                    encode_enum(&request.priority)?,
                    encode_enum(&request.status)?,
                    request.location.address,
                    request.location.latitude,
                    request.location.longitude,
                    request.location.accuracy_m,
                    request.location.captured_at.map(|at| to_rfc3339(&at)),
                    request.assigned_volunteer.as_ref().map(UserId::as_str),
                    request.rejection_reason,
                    request
                        .escalated_from
                        .as_ref()
                        .map(encode_enum)
                        .transpose()?,
                    encode_json(&request.notes)?,
                    to_rfc3339(&request.updated_at),
                    request.acknowledged_at.map(|at| to_rfc3339(&at)),
                    request.assigned_at.map(|at| to_rfc3339(&at)),
                    request.started_at.map(|at| to_rfc3339(&at)),
                    request.completed_at.map(|at| to_rfc3339(&at)),
                    request.rejected_at.map(|at| to_rfc3339(&at)),
                    request.cancelled_at.map(|at| to_rfc3339(&at)),
                    id.as_str(),
                    expected_version,
                ],
            )
            .map_err(LifelineError::store)?;
        if changed == 0 {
            let current = self.get(id)?.map_or(expected_version, |row| row.version);
            return Err(stale(expected_version, current));
        }
        self.get(id)?
            .ok_or_else(|| LifelineError::internal("updated request vanished"))
    }
}

fn stale(expected: i64, found: i64) -> LifelineError {
    RequestError::Conflict {
        message: format!("request is at version {found}, expected {expected}"),
    }
    .into()
}

fn map_request_row(row: &Row<'_>) -> Result<Request, LifelineError> {
    let id: String = column(row, 0)?;
    let requester_id: String = column(row, 1)?;
    let category: String = column(row, 4)?;
    let priority: String = column(row, 5)?;
    let status: String = column(row, 6)?;
    let assigned_volunteer: Option<String> = column(row, 13)?;
    let escalated_from: Option<String> = column(row, 15)?;
    let notes_json: String = column(row, 16)?;
    let created_at: String = column(row, 18)?;
    let updated_at: String = column(row, 19)?;

    Ok(Request {
        id: RequestId::new(id).map_err(LifelineError::internal)?,
        requester_id: UserId::new(requester_id).map_err(LifelineError::internal)?,
        title: column(row, 2)?,
        description: column(row, 3)?,
        category: decode_enum(&category)?,
        priority: decode_enum(&priority)?,
        status: decode_enum(&status)?,
        people_affected: column(row, 7)?,
        location: Location {
            address: column(row, 8)?,
            latitude: column(row, 9)?,
            longitude: column(row, 10)?,
            accuracy_m: column(row, 11)?,
            captured_at: opt_rfc3339(column(row, 12)?)?,
        },
        assigned_volunteer: assigned_volunteer
            .map(UserId::new)
            .transpose()
            .map_err(LifelineError::internal)?,
        rejection_reason: column(row, 14)?,
        escalated_from: escalated_from
            .as_deref()
            .map(decode_enum)
            .transpose()?,
        notes: decode_json(&notes_json)?,
        version: column(row, 17)?,
        created_at: from_rfc3339(&created_at)?,
        updated_at: from_rfc3339(&updated_at)?,
        acknowledged_at: opt_rfc3339(column(row, 20)?)?,
        assigned_at: opt_rfc3339(column(row, 21)?)?,
        started_at: opt_rfc3339(column(row, 22)?)?,
        completed_at: opt_rfc3339(column(row, 23)?)?,
        rejected_at: opt_rfc3339(column(row, 24)?)?,
        cancelled_at: opt_rfc3339(column(row, 25)?)?,
    })
}
