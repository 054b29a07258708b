use crate::error::LifelineError;
use crate::types::{CreateRequestInput, Request, RequestFilter, RequestId, RequestPatch, UserId};

pub trait RequestRepository {
    fn create(&self, requester: &UserId, input: CreateRequestInput)
    -> Result<Request, LifelineError>;
    fn get(&self, id: &RequestId) -> Result<Option<Request>, LifelineError>;
    /// Newest first.
    fn list(&self, filter: &RequestFilter) -> Result<Vec<Request>, LifelineError>;
    /// Writes `patch` only if the row is still at `expected_version`, bumping
    /// the version. A stale version yields `RequestError::Conflict`.
    fn apply_patch(
        &self,
        id: &RequestId,
        expected_version: i64,
        patch: &RequestPatch,
    ) -> Result<Request, LifelineError>;
}
