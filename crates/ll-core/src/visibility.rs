//! Which change records an actor may see, and in what form.
//!
//! Admins see every record unchanged. Everyone else sees request rows they
//! could list, their own assignments, and messages they sent or received.
//! Profile rows of other users arrive with contact details removed.

use crate::types::{Actor, Role};
use ll_events::types::{EventRecord, Table};
use serde_json::Value;

const CONTACT_COLUMNS: [&str; 2] = ["email", "phone"];

/// Returns the record as `actor` may see it, or `None` when it is hidden.
pub fn scope_record(actor: &Actor, mut record: EventRecord) -> Option<EventRecord> {
    if actor.role == Role::NgoAdmin {
        return Some(record);
    }
    let me = actor.id.as_str();
    let row = &record.row;
    let visible = match record.table {
        Table::Requests => match actor.role {
            Role::Victim => column_is(row, "requester_id", me),
            _ => column_is(row, "assigned_volunteer", me) || column_is(row, "status", "pending"),
        },
        Table::Assignments => column_is(row, "volunteer_id", me),
        Table::Communications => {
            column_is(row, "sender_id", me) || column_is(row, "recipient_id", me)
        }
        Table::Profiles => true,
    };
    if !visible {
        return None;
    }
    if record.table == Table::Profiles && !column_is(&record.row, "id", me) {
        redact_contact(&mut record.row);
    }
    Some(record)
}

fn column_is(row: &Value, column: &str, expected: &str) -> bool {
    row.get(column).and_then(Value::as_str) == Some(expected)
}

fn redact_contact(row: &mut Value) {
    if let Some(columns) = row.as_object_mut() {
        for column in CONTACT_COLUMNS {
            if let Some(value) = columns.get_mut(column) {
                *value = Value::Null;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserId;
    use chrono::Utc;
    use ll_events::types::{ChangeKind, EventSource};
    use serde_json::json;

    fn actor(id: &str, role: Role) -> Actor {
        Actor {
            id: id.parse::<UserId>().unwrap(),
            role,
        }
    }

    fn record(table: Table, row: Value) -> EventRecord {
        EventRecord {
            id: "evt_1".to_string(),
            seq: 1,
            at: Utc::now(),
            correlation_id: None,
            source: EventSource::Api,
            table,
            change: ChangeKind::Insert,
            row_id: "row".to_string(),
            kind: "Test".to_string(),
            row,
            detail: None,
        }
    }

    const AMINA: &str = "usr_01HZZZZZZZZZZZZZZZZZZZZZZA";
    const RAFI: &str = "usr_01HZZZZZZZZZZZZZZZZZZZZZZB";
    const NADIA: &str = "usr_01HZZZZZZZZZZZZZZZZZZZZZZC";

    #[test]
    fn admins_see_records_unchanged() {
        let profile = record(
            Table::Profiles,
            json!({ "id": AMINA, "email": "amina@example.org", "phone": "+880" }),
        );
        let seen = scope_record(&actor(NADIA, Role::NgoAdmin), profile.clone()).unwrap();
        assert_eq!(seen, profile);
    }

    #[test]
    fn other_profiles_lose_contact_details() {
        let victim = actor(AMINA, Role::Victim);
        let other = record(
            Table::Profiles,
            json!({ "id": NADIA, "full_name": "Nadia", "email": "nadia@example.org", "phone": "+880" }),
        );
        let seen = scope_record(&victim, other).unwrap();
        assert_eq!(seen.row["email"], Value::Null);
        assert_eq!(seen.row["phone"], Value::Null);
        assert_eq!(seen.row["full_name"], "Nadia");

        let own = record(
            Table::Profiles,
            json!({ "id": AMINA, "email": "amina@example.org", "phone": "+880" }),
        );
        assert_eq!(scope_record(&victim, own).unwrap().row["email"], "amina@example.org");
    }

    #[test]
    fn messages_reach_only_their_parties() {
        let message = record(
            Table::Communications,
            json!({ "sender_id": NADIA, "recipient_id": RAFI, "message": "boat at pier 3" }),
        );
        assert!(scope_record(&actor(AMINA, Role::Victim), message.clone()).is_none());
        assert!(scope_record(&actor(RAFI, Role::Volunteer), message.clone()).is_some());
        assert!(scope_record(&actor(NADIA, Role::Volunteer), message).is_some());
    }

    #[test]
    fn request_rows_follow_listing_rules() {
        let held_by_rafi = record(
            Table::Requests,
            json!({ "requester_id": AMINA, "assigned_volunteer": RAFI, "status": "assigned" }),
        );
        let open = record(
            Table::Requests,
            json!({ "requester_id": NADIA, "assigned_volunteer": null, "status": "pending" }),
        );
        let amina = actor(AMINA, Role::Victim);
        let rafi = actor(RAFI, Role::Volunteer);
        let other_volunteer = actor(NADIA, Role::Volunteer);

        assert!(scope_record(&amina, held_by_rafi.clone()).is_some());
        assert!(scope_record(&amina, open.clone()).is_none());
        assert!(scope_record(&rafi, held_by_rafi.clone()).is_some());
        assert!(scope_record(&other_volunteer, held_by_rafi).is_none());
        assert!(scope_record(&other_volunteer, open).is_some());
    }

    #[test]
    fn assignments_reach_their_volunteer_only() {
        let assignment = record(Table::Assignments, json!({ "volunteer_id": RAFI }));
        assert!(scope_record(&actor(RAFI, Role::Volunteer), assignment.clone()).is_some());
        assert!(scope_record(&actor(AMINA, Role::Victim), assignment).is_none());
    }
}
