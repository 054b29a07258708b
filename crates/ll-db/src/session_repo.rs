use crate::util::{column, decode_enum, query_one, to_rfc3339};
use chrono::{DateTime, Utc};
use ll_core::error::LifelineError;
use ll_core::sessions::SessionRepository;
use ll_core::types::{Actor, Profile, UserId};
use rusqlite::{Connection, params};

pub struct SessionRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> SessionRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl SessionRepository for SessionRepo<'_> {
    fn create(
        &self,
        token_digest: &str,
        profile: &Profile,
        at: DateTime<Utc>,
    ) -> Result<(), LifelineError> {
        self.conn
            .execute(
                "INSERT INTO sessions (token_digest, user_id, created_at) VALUES (?1, ?2, ?3)",
                params![token_digest, profile.id.as_str(), to_rfc3339(&at)],
            )
            .map_err(LifelineError::store)?;
        Ok(())
    }

    /// Sessions of deactivated profiles no longer resolve.
    fn actor(&self, token_digest: &str) -> Result<Option<Actor>, LifelineError> {
        query_one(
            self.conn,
            "SELECT p.id, p.role FROM sessions s JOIN profiles p ON p.id = s.user_id WHERE s.token_digest = ?1 AND p.is_active = 1",
            [token_digest],
            |row| {
                let id: String = column(row, 0)?;
                let role: String = column(row, 1)?;
                Ok(Actor::new(
                    UserId::new(id).map_err(LifelineError::internal)?,
                    decode_enum(&role)?,
                ))
            },
        )
    }

    fn delete(&self, token_digest: &str) -> Result<bool, LifelineError> {
        let removed = self
            .conn
            .execute("DELETE FROM sessions WHERE token_digest = ?1", [token_digest])
            .map_err(LifelineError::store)?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::schema::with_test_db;
    use ll_core::types::Role;

    #[test]
    fn create_resolve_delete() {
        let conn = with_test_db().unwrap();
        let admin = fixtures::profile(&conn, "Nadia Islam", Role::NgoAdmin);
        let repo = SessionRepo::new(&conn);

        repo.create("digest-1", &admin, Utc::now()).unwrap();
        assert_eq!(
            repo.actor("digest-1").unwrap(),
            Some(Actor::new(admin.id.clone(), Role::NgoAdmin))
        );
        assert_eq!(repo.actor("digest-2").unwrap(), None);

        assert!(repo.delete("digest-1").unwrap());
        assert!(!repo.delete("digest-1").unwrap());
        assert_eq!(repo.actor("digest-1").unwrap(), None);
    }

    #[test]
    fn deactivated_profile_loses_sessions() {
        let conn = with_test_db().unwrap();
        let volunteer = fixtures::profile(&conn, "Rafi Hasan", Role::Volunteer);
        let repo = SessionRepo::new(&conn);
        repo.create("digest", &volunteer, Utc::now()).unwrap();
        conn.execute(
            "UPDATE profiles SET is_active = 0 WHERE id = ?1",
            [volunteer.id.as_str()],
        )
        .unwrap();
        assert_eq!(repo.actor("digest").unwrap(), None);
    }
}
