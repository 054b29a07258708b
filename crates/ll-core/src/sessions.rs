use crate::error::LifelineError;
use crate::types::{Actor, Profile};
use chrono::{DateTime, Utc};

/// Sessions are keyed by a digest of the bearer token, never the token itself.
pub trait SessionRepository {
    fn create(
        &self,
        token_digest: &str,
        profile: &Profile,
        at: DateTime<Utc>,
    ) -> Result<(), LifelineError>;
    fn actor(&self, token_digest: &str) -> Result<Option<Actor>, LifelineError>;
    fn delete(&self, token_digest: &str) -> Result<bool, LifelineError>;
}
