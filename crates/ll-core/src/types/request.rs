use crate::types::enums::{Category, Priority, RequestStatus};
use crate::types::ids::{RequestId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Request {
    pub id: RequestId,
    pub requester_id: UserId,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub status: RequestStatus,
    pub people_affected: u32,
    pub location: Location,
    pub assigned_volunteer: Option<UserId>,
    pub rejection_reason: Option<String>,
    pub escalated_from: Option<RequestStatus>,
    pub notes: Vec<Note>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Request {
    /// The status the request is in for assignment purposes: the escalated-from
    /// status while in emergency, otherwise the status itself.
    pub fn effective_status(&self) -> RequestStatus {
        match (self.status, self.escalated_from) {
            (RequestStatus::Emergency, Some(from)) => from,
            (status, _) => status,
        }
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.location.latitude.zip(self.location.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct Location {
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy_m: Option<f64>,
    pub captured_at: Option<DateTime<Utc>>,
}

/// A position reading from the platform location service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoFix {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: Option<f64>,
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Note {
    pub author_id: UserId,
    pub body: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.south
            && latitude <= self.north
            && longitude >= self.west
            && longitude <= self.east
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub total: u32,
    pub pending: u32,
    pub in_progress: u32,
    pub completed: u32,
    pub emergency: u32,
}

/// A pending request paired with its distance from a volunteer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NearbyRequest {
    pub request: Request,
    pub distance_km: f64,
}
