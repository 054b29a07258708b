use crate::error::LifelineError;
use crate::types::{Communication, CommunicationId, NewCommunication, RequestId, UserId};
use chrono::{DateTime, Utc};

pub trait CommunicationRepository {
    fn create(&self, input: NewCommunication) -> Result<Communication, LifelineError>;
    fn get(&self, id: &CommunicationId) -> Result<Option<Communication>, LifelineError>;
    /// Oldest first.
    fn list_for_request(&self, request_id: &RequestId) -> Result<Vec<Communication>, LifelineError>;
    /// Sent or received by the user, newest first.
    fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Communication>, LifelineError>;
    /// Keeps the first `read_at` if already set.
    fn mark_read(
        &self,
        id: &CommunicationId,
        at: DateTime<Utc>,
    ) -> Result<Communication, LifelineError>;
}
