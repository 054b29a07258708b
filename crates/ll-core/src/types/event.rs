use crate::types::assignment::Assignment;
use crate::types::communication::Communication;
use crate::types::enums::{ActionKind, RequestStatus};
use crate::types::profile::Profile;
use crate::types::request::Request;
use ll_events::types::{ChangeKind, Table};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", content = "payload")]
pub enum EventBody {
    RequestCreated {
        request: Request,
    },
    RequestChanged {
        request: Request,
        action: ActionKind,
        from: RequestStatus,
    },

    AssignmentOpened {
        assignment: Assignment,
    },
    AssignmentAccepted {
        assignment: Assignment,
    },
    AssignmentReleased {
        assignment: Assignment,
    },
    AssignmentCompleted {
        assignment: Assignment,
    },

    ProfileRegistered {
        profile: Profile,
    },
    ProfileUpdated {
        profile: Profile,
    },

    MessageSent {
        communication: Communication,
    },
    MessageRead {
        communication: Communication,
    },
}

impl EventBody {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RequestCreated { .. } => "RequestCreated",
            Self::RequestChanged { .. } => "RequestChanged",
            Self::AssignmentOpened { .. } => "AssignmentOpened",
            Self::AssignmentAccepted { .. } => "AssignmentAccepted",
            Self::AssignmentReleased { .. } => "AssignmentReleased",
            Self::AssignmentCompleted { .. } => "AssignmentCompleted",
            Self::ProfileRegistered { .. } => "ProfileRegistered",
            Self::ProfileUpdated { .. } => "ProfileUpdated",
            Self::MessageSent { .. } => "MessageSent",
            Self::MessageRead { .. } => "MessageRead",
        }
    }

    pub fn table(&self) -> Table {
        match self {
            Self::RequestCreated { .. } | Self::RequestChanged { .. } => Table::Requests,
            Self::AssignmentOpened { .. }
            | Self::AssignmentAccepted { .. }
            | Self::AssignmentReleased { .. }
            | Self::AssignmentCompleted { .. } => Table::Assignments,
            Self::ProfileRegistered { .. } | Self::ProfileUpdated { .. } => Table::Profiles,
            Self::MessageSent { .. } | Self::MessageRead { .. } => Table::Communications,
        }
    }

    pub fn change(&self) -> ChangeKind {
        match self {
            Self::RequestCreated { .. }
            | Self::AssignmentOpened { .. }
            | Self::ProfileRegistered { .. }
            | Self::MessageSent { .. } => ChangeKind::Insert,
            _ => ChangeKind::Update,
        }
    }

    pub fn row_id(&self) -> String {
        match self {
            Self::RequestCreated { request } | Self::RequestChanged { request, .. } => {
                request.id.to_string()
            }
            Self::AssignmentOpened { assignment }
            | Self::AssignmentAccepted { assignment }
            | Self::AssignmentReleased { assignment }
            | Self::AssignmentCompleted { assignment } => assignment.id.to_string(),
            Self::ProfileRegistered { profile } | Self::ProfileUpdated { profile } => {
                profile.id.to_string()
            }
            Self::MessageSent { communication } | Self::MessageRead { communication } => {
                communication.id.to_string()
            }
        }
    }

    pub fn detail(&self) -> Option<Value> {
        match self {
            Self::RequestChanged { action, from, .. } => {
                Some(serde_json::json!({ "action": action, "from": from }))
            }
            _ => None,
        }
    }

    /// Snapshot of the changed row, used for subscription filtering.
    pub fn row(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::RequestCreated { request } | Self::RequestChanged { request, .. } => {
                serde_json::to_value(request)
            }
            Self::AssignmentOpened { assignment }
            | Self::AssignmentAccepted { assignment }
            | Self::AssignmentReleased { assignment }
            | Self::AssignmentCompleted { assignment } => serde_json::to_value(assignment),
            Self::ProfileRegistered { profile } | Self::ProfileUpdated { profile } => {
                serde_json::to_value(profile)
            }
            Self::MessageSent { communication } | Self::MessageRead { communication } => {
                serde_json::to_value(communication)
            }
        }
    }
}
