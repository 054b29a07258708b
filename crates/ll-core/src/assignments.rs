use crate::error::LifelineError;
use crate::types::{Assignment, AssignmentId, RequestId, UserId};
use chrono::{DateTime, Utc};

pub trait AssignmentRepository {
    fn open(
        &self,
        request_id: &RequestId,
        volunteer_id: &UserId,
        accepted: bool,
        at: DateTime<Utc>,
    ) -> Result<Assignment, LifelineError>;
    fn get(&self, id: &AssignmentId) -> Result<Option<Assignment>, LifelineError>;
    fn active_for_request(&self, request_id: &RequestId)
    -> Result<Option<Assignment>, LifelineError>;
    fn list_for_volunteer(&self, volunteer_id: &UserId) -> Result<Vec<Assignment>, LifelineError>;
    fn accept(&self, id: &AssignmentId, at: DateTime<Utc>) -> Result<Assignment, LifelineError>;
    fn release(&self, id: &AssignmentId, at: DateTime<Utc>) -> Result<Assignment, LifelineError>;
    fn complete(&self, id: &AssignmentId, at: DateTime<Utc>) -> Result<Assignment, LifelineError>;
    fn count_active_for_volunteer(&self, volunteer_id: &UserId) -> Result<u32, LifelineError>;
}
