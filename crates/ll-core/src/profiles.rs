use crate::error::LifelineError;
use crate::types::{Availability, NewProfile, Profile, UserId};

pub trait ProfileRepository {
    fn create(&self, input: NewProfile) -> Result<Profile, LifelineError>;
    fn get(&self, id: &UserId) -> Result<Option<Profile>, LifelineError>;
    fn get_by_email(&self, email: &str) -> Result<Option<Profile>, LifelineError>;
    /// The profile and its stored password hash.
    fn credentials(&self, email: &str) -> Result<Option<(Profile, String)>, LifelineError>;
    fn list_volunteers(&self, active_only: bool) -> Result<Vec<Profile>, LifelineError>;
    fn set_availability(
        &self,
        id: &UserId,
        availability: Availability,
    ) -> Result<Profile, LifelineError>;
    fn increment_completed(&self, id: &UserId) -> Result<Profile, LifelineError>;
}
