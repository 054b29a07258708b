use ll_core::LifelineError;
use ll_core::store::Store;
use rusqlite::Connection;

use crate::assignment_repo::AssignmentRepo;
use crate::communication_repo::CommunicationRepo;
use crate::event_repo::EventRepo;
use crate::profile_repo::ProfileRepo;
use crate::request_repo::RequestRepo;
use crate::session_repo::SessionRepo;

pub struct DbStore {
    conn: Connection,
}

impl DbStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Store for DbStore {
    type Requests<'a>
        = RequestRepo<'a>
    where
        Self: 'a;
    type Profiles<'a>
        = ProfileRepo<'a>
    where
        Self: 'a;
    type Assignments<'a>
        = AssignmentRepo<'a>
    where
        Self: 'a;
    type Communications<'a>
        = CommunicationRepo<'a>
    where
        Self: 'a;
    type Sessions<'a>
        = SessionRepo<'a>
    where
        Self: 'a;
    type Events<'a>
        = EventRepo<'a>
    where
        Self: 'a;

    fn requests(&self) -> Self::Requests<'_> {
        RequestRepo::new(&self.conn)
    }

    fn profiles(&self) -> Self::Profiles<'_> {
        ProfileRepo::new(&self.conn)
    }

    fn assignments(&self) -> Self::Assignments<'_> {
        AssignmentRepo::new(&self.conn)
    }

    fn communications(&self) -> Self::Communications<'_> {
        CommunicationRepo::new(&self.conn)
    }

    fn sessions(&self) -> Self::Sessions<'_> {
        SessionRepo::new(&self.conn)
    }

    fn events(&self) -> Self::Events<'_> {
        EventRepo::new(&self.conn)
    }

    /// `BEGIN IMMEDIATE` takes the write lock up front, so two writers never
    /// both read a row version and then race to update it.
    fn with_tx<F, T>(&self, f: F) -> Result<T, LifelineError>
    where
        F: FnOnce(&Self) -> Result<T, LifelineError>,
    {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(LifelineError::store)?;
        match f(self) {
            Ok(value) => {
                self.conn
                    .execute_batch("COMMIT")
                    .map_err(LifelineError::store)?;
                Ok(value)
            }
            Err(err) => {
                self.conn
                    .execute_batch("ROLLBACK")
                    .map_err(LifelineError::store)?;
                Err(err)
            }
        }
    }
}
