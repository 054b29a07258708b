use crate::types::ids::{AssignmentId, RequestId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Assignment {
    pub id: AssignmentId,
    pub request_id: RequestId,
    pub volunteer_id: UserId,
    pub notes: Option<String>,
    pub assigned_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub released_at: Option<DateTime<Utc>>,
}

impl Assignment {
    pub fn is_active(&self) -> bool {
        self.completed_at.is_none() && self.released_at.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct VolunteerStats {
    pub total_assignments: u32,
    pub completed_assignments: u32,
    pub active_assignments: u32,
}
