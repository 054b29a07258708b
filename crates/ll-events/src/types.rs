use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// A persisted change to one row of one table.
///
/// `row` is a snapshot of the row after the change. Consumers should treat a
/// record as a cue to re-fetch rather than as an authoritative diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EventRecord {
    pub id: String,
    pub seq: i64,
    pub at: DateTime<Utc>,
    pub correlation_id: Option<String>,
    pub source: EventSource,
    pub table: Table,
    pub change: ChangeKind,
    pub row_id: String,
    pub kind: String,
    pub row: Value,
    pub detail: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub enum EventSource {
    Cli,
    Api,
    Seed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Requests,
    Profiles,
    Assignments,
    Communications,
}

impl Table {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Requests => "requests",
            Self::Profiles => "profiles",
            Self::Assignments => "assignments",
            Self::Communications => "communications",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "requests" => Some(Self::Requests),
            "profiles" => Some(Self::Profiles),
            "assignments" => Some(Self::Assignments),
            "communications" => Some(Self::Communications),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub enum ChangeKind {
    Insert,
    Update,
}

/// Equality predicate on a single top-level column of a row snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ColumnFilter {
    pub column: String,
    pub value: String,
}

impl ColumnFilter {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, row: &Value) -> bool {
        match row.get(&self.column) {
            Some(Value::String(value)) => *value == self.value,
            Some(Value::Null) | None => false,
            Some(other) => other.to_string() == self.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn column_filter_matches_strings_and_scalars() {
        let row = json!({ "recipient_id": "usr_1", "people_affected": 4, "read_at": null });
        assert!(ColumnFilter::eq("recipient_id", "usr_1").matches(&row));
        assert!(!ColumnFilter::eq("recipient_id", "usr_2").matches(&row));
        assert!(ColumnFilter::eq("people_affected", "4").matches(&row));
        assert!(!ColumnFilter::eq("read_at", "null").matches(&row));
        assert!(!ColumnFilter::eq("missing", "x").matches(&row));
    }

    #[test]
    fn table_names_round_trip() {
        for table in [
            Table::Requests,
            Table::Profiles,
            Table::Assignments,
            Table::Communications,
        ] {
            assert_eq!(Table::parse(table.as_str()), Some(table));
        }
        assert_eq!(Table::parse("disaster_requests"), None);
    }
}
