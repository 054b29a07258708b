use crate::util::{column, from_rfc3339, opt_rfc3339, query_all, query_one, to_rfc3339};
use chrono::{DateTime, Utc};
use ll_core::assignments::AssignmentRepository;
use ll_core::error::{LifelineError, VolunteerError};
use ll_core::types::{Assignment, AssignmentId, RequestId, UserId};
use rusqlite::{Connection, Row, params};

const COLUMNS: &str =
    "id, request_id, volunteer_id, notes, assigned_at, accepted_at, completed_at, released_at";

pub struct AssignmentRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> AssignmentRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn require(&self, id: &AssignmentId) -> Result<Assignment, LifelineError> {
        self.get(id)?
            .ok_or_else(|| VolunteerError::AssignmentNotFound.into())
    }

    /// Sets `column` on a still-active assignment. Closed rows are left alone.
    fn close(
        &self,
        id: &AssignmentId,
        column: &str,
        at: DateTime<Utc>,
    ) -> Result<Assignment, LifelineError> {
        let sql = format!(
            "UPDATE assignments SET {column} = ?1 WHERE id = ?2 AND completed_at IS NULL AND released_at IS NULL"
        );
        self.conn
            .execute(&sql, params![to_rfc3339(&at), id.as_str()])
            .map_err(LifelineError::store)?;
        self.require(id)
    }
}

impl AssignmentRepository for AssignmentRepo<'_> {
    fn open(
        &self,
        request_id: &RequestId,
        volunteer_id: &UserId,
        accepted: bool,
        at: DateTime<Utc>,
    ) -> Result<Assignment, LifelineError> {
        let id = AssignmentId::generate();
        let at = to_rfc3339(&at);
        self.conn
            .execute(
                "INSERT INTO assignments (id, request_id, volunteer_id, assigned_at, accepted_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    id.as_str(),
                    request_id.as_str(),
                    volunteer_id.as_str(),
                    at,
                    accepted.then_some(at.as_str()),
                ],
            )
            .map_err(LifelineError::store)?;
        self.require(&id)
    }

    fn get(&self, id: &AssignmentId) -> Result<Option<Assignment>, LifelineError> {
        let sql = format!("SELECT {COLUMNS} FROM assignments WHERE id = ?1");
        query_one(self.conn, &sql, [id.as_str()], map_assignment_row)
    }

    fn active_for_request(
        &self,
        request_id: &RequestId,
    ) -> Result<Option<Assignment>, LifelineError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM assignments WHERE request_id = ?1 AND completed_at IS NULL AND released_at IS NULL"
        );
        query_one(self.conn, &sql, [request_id.as_str()], map_assignment_row)
    }

    fn list_for_volunteer(&self, volunteer_id: &UserId) -> Result<Vec<Assignment>, LifelineError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM assignments WHERE volunteer_id = ?1 ORDER BY assigned_at DESC, rowid DESC"
        );
        query_all(self.conn, &sql, [volunteer_id.as_str()], map_assignment_row)
    }

    fn accept(&self, id: &AssignmentId, at: DateTime<Utc>) -> Result<Assignment, LifelineError> {
        self.conn
            .execute(
                "UPDATE assignments SET accepted_at = ?1 WHERE id = ?2 AND accepted_at IS NULL",
                params![to_rfc3339(&at), id.as_str()],
            )
            .map_err(LifelineError::store)?;
        self.require(id)
    }

    fn release(&self, id: &AssignmentId, at: DateTime<Utc>) -> Result<Assignment, LifelineError> {
        self.close(id, "released_at", at)
    }

    fn complete(&self, id: &AssignmentId, at: DateTime<Utc>) -> Result<Assignment, LifelineError> {
        self.close(id, "completed_at", at)
    }

    fn count_active_for_volunteer(&self, volunteer_id: &UserId) -> Result<u32, LifelineError> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM assignments WHERE volunteer_id = ?1 AND completed_at IS NULL AND released_at IS NULL",
                [volunteer_id.as_str()],
                |row| row.get(0),
            )
            .map_err(LifelineError::store)
    }
}

fn map_assignment_row(row: &Row<'_>) -> Result<Assignment, LifelineError> {
    let id: String = column(row, 0)?;
    let request_id: String = column(row, 1)?;
    let volunteer_id: String = column(row, 2)?;
    let assigned_at: String = column(row, 4)?;
    Ok(Assignment {
        id: AssignmentId::new(id).map_err(LifelineError::internal)?,
        request_id: RequestId::new(request_id).map_err(LifelineError::internal)?,
        volunteer_id: UserId::new(volunteer_id).map_err(LifelineError::internal)?,
        notes: column(row, 3)?,
        assigned_at: from_rfc3339(&assigned_at)?,
        accepted_at: opt_rfc3339(column(row, 5)?)?,
        completed_at: opt_rfc3339(column(row, 6)?)?,
        released_at: opt_rfc3339(column(row, 7)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::request_repo::RequestRepo;
    use crate::schema::with_test_db;
    use ll_core::requests::RequestRepository;
    use ll_core::types::{Category, CreateRequestInput, Location, Role};

    fn request(conn: &Connection, requester: &UserId) -> RequestId {
        RequestRepo::new(conn)
            .create(
                requester,
                CreateRequestInput {
                    title: "Medicine".to_string(),
                    description: String::new(),
                    category: Category::Medical,
                    priority: None,
                    people_affected: None,
                    location: Location::default(),
                },
            )
            .unwrap()
            .id
    }

    #[test]
    fn open_release_reopen_keeps_one_active_row() {
        let conn = with_test_db().unwrap();
        let victim = fixtures::profile(&conn, "Amina Begum", Role::Victim);
        let volunteer = fixtures::profile(&conn, "Rafi Hasan", Role::Volunteer);
        let request_id = request(&conn, &victim.id);
        let repo = AssignmentRepo::new(&conn);

        let first = repo.open(&request_id, &volunteer.id, true, Utc::now()).unwrap();
        assert!(first.accepted_at.is_some());
        assert_eq!(repo.count_active_for_volunteer(&volunteer.id).unwrap(), 1);
        assert!(repo.open(&request_id, &volunteer.id, false, Utc::now()).is_err());

        let released = repo.release(&first.id, Utc::now()).unwrap();
        assert!(released.released_at.is_some());
        assert!(!released.is_active());
        assert!(repo.active_for_request(&request_id).unwrap().is_none());

        let second = repo.open(&request_id, &volunteer.id, false, Utc::now()).unwrap();
        assert!(second.accepted_at.is_none());
        assert_eq!(
            repo.active_for_request(&request_id).unwrap().map(|a| a.id),
            Some(second.id.clone())
        );
        assert_eq!(repo.list_for_volunteer(&volunteer.id).unwrap().len(), 2);
    }

    #[test]
    fn closed_assignment_is_not_reclosed() {
        let conn = with_test_db().unwrap();
        let victim = fixtures::profile(&conn, "Amina Begum", Role::Victim);
        let volunteer = fixtures::profile(&conn, "Rafi Hasan", Role::Volunteer);
        let request_id = request(&conn, &victim.id);
        let repo = AssignmentRepo::new(&conn);

        let open = repo.open(&request_id, &volunteer.id, false, Utc::now()).unwrap();
        let completed = repo.complete(&open.id, Utc::now()).unwrap();
        let again = repo.release(&open.id, Utc::now()).unwrap();
        assert_eq!(again.completed_at, completed.completed_at);
        assert_eq!(again.released_at, None);
        assert_eq!(repo.count_active_for_volunteer(&volunteer.id).unwrap(), 0);
    }

    #[test]
    fn accept_sets_timestamp_once() {
        let conn = with_test_db().unwrap();
        let victim = fixtures::profile(&conn, "Amina Begum", Role::Victim);
        let volunteer = fixtures::profile(&conn, "Rafi Hasan", Role::Volunteer);
        let request_id = request(&conn, &victim.id);
        let repo = AssignmentRepo::new(&conn);

        let open = repo.open(&request_id, &volunteer.id, false, Utc::now()).unwrap();
        let accepted = repo.accept(&open.id, Utc::now()).unwrap();
        let later = repo.accept(&open.id, Utc::now()).unwrap();
        assert!(accepted.accepted_at.is_some());
        assert_eq!(accepted.accepted_at, later.accepted_at);
    }
}
