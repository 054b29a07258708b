use crate::types::enums::{
    ActionKind, AlertKind, Availability, Category, Channel, Priority, RequestStatus, Role,
};
use crate::types::ids::{RequestId, UserId};
use crate::types::request::{GeoFix, Location, Note, Request};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreateRequestInput {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Option<Priority>,
    pub people_affected: Option<u32>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct RequestFilter {
    pub status: Option<Vec<RequestStatus>>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub requester_id: Option<UserId>,
    pub assigned_volunteer: Option<UserId>,
}

impl RequestFilter {
    pub fn matches(&self, request: &Request) -> bool {
        if let Some(statuses) = &self.status {
            if !statuses.contains(&request.status) {
                return false;
            }
        }
        if self.category.is_some_and(|category| category != request.category) {
            return false;
        }
        if self.priority.is_some_and(|priority| priority != request.priority) {
            return false;
        }
        if let Some(requester) = &self.requester_id {
            if *requester != request.requester_id {
                return false;
            }
        }
        if let Some(volunteer) = &self.assigned_volunteer {
            if request.assigned_volunteer.as_ref() != Some(volunteer) {
                return false;
            }
        }
        true
    }
}

/// A lifecycle action issued against a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RequestAction {
    Claim,
    Accept { volunteer_id: Option<UserId> },
    Assign { volunteer_id: UserId },
    Reject { reason: String },
    Cancel,
    Start,
    #[serde(alias = "unclaim")]
    Release,
    Reassign { volunteer_id: UserId },
    Complete,
    Escalate { fix: Option<GeoFix> },
    Resolve,
    Update {
        priority: Option<Priority>,
        note: Option<String>,
    },
}

impl RequestAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Claim => ActionKind::Claim,
            Self::Accept { .. } => ActionKind::Accept,
            Self::Assign { .. } => ActionKind::Assign,
            Self::Reject { .. } => ActionKind::Reject,
            Self::Cancel => ActionKind::Cancel,
            Self::Start => ActionKind::Start,
            Self::Release => ActionKind::Release,
            Self::Reassign { .. } => ActionKind::Reassign,
            Self::Complete => ActionKind::Complete,
            Self::Escalate { .. } => ActionKind::Escalate,
            Self::Resolve => ActionKind::Resolve,
            Self::Update { .. } => ActionKind::Update,
        }
    }

    /// The volunteer an admin action hands the request to, if any.
    pub fn target_volunteer(&self) -> Option<&UserId> {
        match self {
            Self::Accept {
                volunteer_id: Some(id),
            }
            | Self::Assign { volunteer_id: id }
            | Self::Reassign { volunteer_id: id } => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ActionInput {
    pub action: RequestAction,
    /// When set, the action only applies if the request is still at this version.
    pub expected_version: Option<i64>,
}

impl From<RequestAction> for ActionInput {
    fn from(action: RequestAction) -> Self {
        Self {
            action,
            expected_version: None,
        }
    }
}

/// Field-level changes to a request row. `None` leaves a field untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestPatch {
    pub status: Option<RequestStatus>,
    pub priority: Option<Priority>,
    pub assigned_volunteer: Option<Option<UserId>>,
    pub assigned_at: Option<Option<DateTime<Utc>>>,
    pub started_at: Option<Option<DateTime<Utc>>>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub escalated_from: Option<Option<RequestStatus>>,
    pub location: Option<Location>,
    pub note: Option<Note>,
}

impl RequestPatch {
    pub fn apply_to(&self, request: &mut Request) {
        if let Some(status) = self.status {
            request.status = status;
        }
        if let Some(priority) = self.priority {
            request.priority = priority;
        }
        if let Some(volunteer) = &self.assigned_volunteer {
            request.assigned_volunteer.clone_from(volunteer);
        }
        if let Some(at) = self.assigned_at {
            request.assigned_at = at;
        }
        if let Some(at) = self.started_at {
            request.started_at = at;
        }
        if let Some(at) = self.acknowledged_at {
            request.acknowledged_at.get_or_insert(at);
        }
        if let Some(at) = self.completed_at {
            request.completed_at.get_or_insert(at);
        }
        if let Some(at) = self.rejected_at {
            request.rejected_at.get_or_insert(at);
        }
        if let Some(reason) = &self.rejection_reason {
            request.rejection_reason = Some(reason.clone());
        }
        if let Some(at) = self.cancelled_at {
            request.cancelled_at.get_or_insert(at);
        }
        if let Some(from) = self.escalated_from {
            request.escalated_from = from;
        }
        if let Some(location) = &self.location {
            request.location = location.clone();
        }
        if let Some(note) = &self.note {
            request.notes.push(note.clone());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RegisterInput {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub role: Option<Role>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProfile {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityInput {
    pub availability: Availability,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SendMessageInput {
    pub request_id: RequestId,
    pub recipient_id: UserId,
    pub message: String,
    pub channel: Option<Channel>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCommunication {
    pub request_id: RequestId,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub message: String,
    pub channel: Channel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EmergencyAlertInput {
    pub request_id: RequestId,
    pub recipient_ids: Vec<UserId>,
    pub message: String,
    pub kind: Option<AlertKind>,
    pub channel: Option<Channel>,
}

/// One addressee handed to the messaging gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AlertRecipient {
    pub user_id: UserId,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AlertInput {
    pub recipients: Vec<AlertRecipient>,
    pub message: String,
    pub kind: AlertKind,
}
