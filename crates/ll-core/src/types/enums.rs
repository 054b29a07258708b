use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Victim,
    Volunteer,
    NgoAdmin,
}

/// Lifecycle status of a help request.
///
/// `accepted` is read as a synonym of `assigned`; it is never written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RequestStatus {
    Pending,
    #[serde(alias = "accepted")]
    Assigned,
    InProgress,
    Completed,
    Rejected,
    Cancelled,
    Emergency,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 7] = [
        Self::Pending,
        Self::Assigned,
        Self::InProgress,
        Self::Completed,
        Self::Rejected,
        Self::Cancelled,
        Self::Emergency,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Rejected | Self::Cancelled)
    }

    /// Statuses in which the request holds a volunteer.
    pub fn holds_volunteer(self) -> bool {
        matches!(self, Self::Assigned | Self::InProgress | Self::Completed)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Emergency => "emergency",
        };
        f.write_str(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Medical,
    Shelter,
    #[serde(alias = "food", alias = "water")]
    FoodSupplies,
    Rescue,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Availability {
    Available,
    Busy,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Channel {
    Sms,
    Call,
    InApp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum AlertKind {
    Emergency,
    Evacuation,
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    Claim,
    Accept,
    Assign,
    Reject,
    Cancel,
    Start,
    Release,
    Reassign,
    Complete,
    Escalate,
    Resolve,
    Update,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::Claim => "claim",
            Self::Accept => "accept",
            Self::Assign => "assign",
            Self::Reject => "reject",
            Self::Cancel => "cancel",
            Self::Start => "start",
            Self::Release => "release",
            Self::Reassign => "reassign",
            Self::Complete => "complete",
            Self::Escalate => "escalate",
            Self::Resolve => "resolve",
            Self::Update => "update",
        };
        f.write_str(value)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Self::Victim => "victim",
            Self::Volunteer => "volunteer",
            Self::NgoAdmin => "ngo-admin",
        };
        f.write_str(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_names() {
        let json = serde_json::to_string(&RequestStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        for status in RequestStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }

    #[test]
    fn accepted_reads_as_assigned() {
        let status: RequestStatus = serde_json::from_str("\"accepted\"").unwrap();
        assert_eq!(status, RequestStatus::Assigned);
    }

    #[test]
    fn admin_role_wire_name() {
        let role: Role = serde_json::from_str("\"ngo-admin\"").unwrap();
        assert_eq!(role, Role::NgoAdmin);
        assert_eq!(Role::NgoAdmin.to_string(), "ngo-admin");
    }

    #[test]
    fn priority_orders_by_urgency() {
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::Low < Priority::Medium);
    }
}
