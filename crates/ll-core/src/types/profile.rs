use crate::types::enums::{Availability, Role};
use crate::types::ids::{SessionToken, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub availability: Availability,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub completed_tasks: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn actor(&self) -> Actor {
        Actor {
            id: self.id.clone(),
            role: self.role,
        }
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

/// The identity on whose behalf an operation runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::NgoAdmin
    }
}

/// Created at sign-in, destroyed at sign-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Session {
    pub token: SessionToken,
    pub actor: Actor,
    pub created_at: DateTime<Utc>,
}
