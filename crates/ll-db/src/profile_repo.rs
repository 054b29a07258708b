use crate::util::{column, decode_enum, encode_enum, from_rfc3339, query_all, query_one, to_rfc3339};
use chrono::Utc;
use ll_core::error::{AuthError, LifelineError, VolunteerError};
use ll_core::profiles::ProfileRepository;
use ll_core::types::{Availability, NewProfile, Profile, Role, UserId};
use rusqlite::{Connection, Row, params};

const COLUMNS: &str = "id, full_name, email, phone, role, availability, latitude, longitude, completed_tasks, is_active, created_at, updated_at";

pub struct ProfileRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> ProfileRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn require(&self, id: &UserId) -> Result<Profile, LifelineError> {
        self.get(id)?
            .ok_or_else(|| VolunteerError::NotFound.into())
    }
}

impl ProfileRepository for ProfileRepo<'_> {
    fn create(&self, input: NewProfile) -> Result<Profile, LifelineError> {
        let id = UserId::generate();
        let now = to_rfc3339(&Utc::now());
        let availability = match input.role {
            Role::Volunteer => Availability::Available,
            _ => Availability::Offline,
        };
        let sql = "INSERT INTO profiles (id, full_name, email, phone, role, availability, latitude, longitude, completed_tasks, is_active, password_hash, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, 1, ?9, ?10, ?10)";
        let inserted = self.conn.execute(
            sql,
            params![
                id.as_str(),
                input.full_name,
                input.email,
                input.phone,
                encode_enum(&input.role)?,
                encode_enum(&availability)?,
                input.latitude,
                input.longitude,
                input.password_hash,
                now,
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(AuthError::EmailTaken.into());
            }
            Err(err) => return Err(LifelineError::store(err)),
        }
        self.require(&id)
    }

    fn get(&self, id: &UserId) -> Result<Option<Profile>, LifelineError> {
        let sql = format!("SELECT {COLUMNS} FROM profiles WHERE id = ?1");
        query_one(self.conn, &sql, [id.as_str()], map_profile_row)
    }

    fn get_by_email(&self, email: &str) -> Result<Option<Profile>, LifelineError> {
        let sql = format!("SELECT {COLUMNS} FROM profiles WHERE email = ?1");
        query_one(self.conn, &sql, [email], map_profile_row)
    }

    fn credentials(&self, email: &str) -> Result<Option<(Profile, String)>, LifelineError> {
        let sql = format!("SELECT {COLUMNS}, password_hash FROM profiles WHERE email = ?1");
        query_one(self.conn, &sql, [email], |row| {
            Ok((map_profile_row(row)?, column(row, 12)?))
        })
    }

    fn list_volunteers(&self, active_only: bool) -> Result<Vec<Profile>, LifelineError> {
        let mut sql = format!("SELECT {COLUMNS} FROM profiles WHERE role = ?1");
        if active_only {
            sql.push_str(" AND is_active = 1");
        }
        sql.push_str(" ORDER BY full_name ASC, id ASC");
        query_all(
            self.conn,
            &sql,
            [encode_enum(&Role::Volunteer)?],
            map_profile_row,
        )
    }

    fn set_availability(
        &self,
        id: &UserId,
        availability: Availability,
    ) -> Result<Profile, LifelineError> {
        let changed = self
            .conn
            .execute(
                "UPDATE profiles SET availability = ?1, updated_at = ?2 WHERE id = ?3",
                params![
                    encode_enum(&availability)?,
                    to_rfc3339(&Utc::now()),
                    id.as_str()
                ],
            )
            .map_err(LifelineError::store)?;
        if changed == 0 {
            return Err(VolunteerError::NotFound.into());
        }
        self.require(id)
    }

    fn increment_completed(&self, id: &UserId) -> Result<Profile, LifelineError> {
        let changed = self
            .conn
            .execute(
                "UPDATE profiles SET completed_tasks = completed_tasks + 1, updated_at = ?1 WHERE id = ?2",
                params![to_rfc3339(&Utc::now()), id.as_str()],
            )
            .map_err(LifelineError::store)?;
        if changed == 0 {
            return Err(VolunteerError::NotFound.into());
        }
        self.require(id)
    }
}

fn map_profile_row(row: &Row<'_>) -> Result<Profile, LifelineError> {
    let id: String = column(row, 0)?;
    let role: String = column(row, 4)?;
    let availability: String = column(row, 5)?;
    let created_at: String = column(row, 10)?;
    let updated_at: String = column(row, 11)?;
    Ok(Profile {
        id: UserId::new(id).map_err(LifelineError::internal)?,
        full_name: column(row, 1)?,
        email: column(row, 2)?,
        phone: column(row, 3)?,
        role: decode_enum(&role)?,
        availability: decode_enum(&availability)?,
        latitude: column(row, 6)?,
        longitude: column(row, 7)?,
        completed_tasks: column(row, 8)?,
        is_active: column(row, 9)?,
        created_at: from_rfc3339(&created_at)?,
        updated_at: from_rfc3339(&updated_at)?,
    })
}
