use crate::types::enums::Channel;
use crate::types::ids::{CommunicationId, RequestId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Communication {
    pub id: CommunicationId,
    pub request_id: RequestId,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub message: String,
    pub channel: Channel,
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DispatchReceipt {
    pub correlation_id: String,
    pub recipients: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AlertOutcome {
    pub receipt: DispatchReceipt,
    pub communications: Vec<Communication>,
}
