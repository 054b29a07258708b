//! The request lifecycle: which actor may issue which action from which
//! status, and what each accepted action changes.
//!
//! Planning is pure. [`plan`] inspects a snapshot and returns a [`Transition`]
//! or an error; it never touches storage. The caller persists the patch with a
//! compare-and-swap on the snapshot's version and applies the assignment
//! effect in the same transaction.

use crate::error::RequestError;
use crate::types::{
    ActionKind, Actor, GeoFix, Location, Note, Priority, Request, RequestAction, RequestPatch,
    RequestStatus, Role, UserId,
};
use crate::validation::{validate_geo_fix, validate_note};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentEffect {
    None,
    Open { volunteer_id: UserId, accepted: bool },
    Release { volunteer_id: UserId },
    Handover { from: UserId, to: UserId },
    Complete { volunteer_id: UserId },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub action: ActionKind,
    pub from: RequestStatus,
    pub to: RequestStatus,
    pub patch: RequestPatch,
    pub assignment: AssignmentEffect,
}

pub fn allowed_from(action: ActionKind) -> &'static [RequestStatus] {
    use RequestStatus::{Assigned, Emergency, InProgress, Pending};

    match action {
        ActionKind::Claim
        | ActionKind::Accept
        | ActionKind::Assign
        | ActionKind::Reject
        | ActionKind::Cancel => &[Pending],
        ActionKind::Start | ActionKind::Release => &[Assigned],
        ActionKind::Reassign => &[Assigned, InProgress],
        ActionKind::Complete => &[InProgress],
        ActionKind::Escalate => &[Pending, Assigned, InProgress],
        ActionKind::Resolve => &[Emergency],
        ActionKind::Update => &RequestStatus::ALL,
    }
}

pub fn permitted_roles(action: ActionKind) -> &'static [Role] {
    match action {
        ActionKind::Claim | ActionKind::Start | ActionKind::Release | ActionKind::Complete => {
            &[Role::Volunteer]
        }
        ActionKind::Accept
        | ActionKind::Assign
        | ActionKind::Reject
        | ActionKind::Reassign
        | ActionKind::Resolve => &[Role::NgoAdmin],
        ActionKind::Cancel => &[Role::Victim],
        ActionKind::Escalate => &[Role::Volunteer, Role::NgoAdmin],
        ActionKind::Update => &[Role::Victim, Role::NgoAdmin],
    }
}

pub fn plan(
    request: &Request,
    actor: &Actor,
    action: &RequestAction,
    now: DateTime<Utc>,
) -> Result<Transition, RequestError> {
    let kind = action.kind();
    let from = request.status;

    if !permitted_roles(kind).contains(&actor.role) {
        return Err(RequestError::Forbidden {
            action: kind,
            role: actor.role,
        });
    }
    if !allowed_from(kind).contains(&from) {
        return Err(RequestError::InvalidTransition { action: kind, from });
    }
    authorize_identity(request, actor, action)?;

    let mut patch = RequestPatch::default();
    let mut assignment = AssignmentEffect::None;

    match action {
        RequestAction::Claim => {
            assign_to(&mut patch, &actor.id, now);
            assignment = AssignmentEffect::Open {
                volunteer_id: actor.id.clone(),
                accepted: true,
            };
        }
        RequestAction::Accept {
            volunteer_id: Some(volunteer_id),
        }
        | RequestAction::Assign { volunteer_id } => {
            assign_to(&mut patch, volunteer_id, now);
            assignment = AssignmentEffect::Open {
                volunteer_id: volunteer_id.clone(),
                accepted: false,
            };
        }
        RequestAction::Accept { volunteer_id: None } => {
            if request.acknowledged_at.is_some() {
                return Err(RequestError::Invalid {
                    message: "request already acknowledged".to_string(),
                });
            }
            patch.acknowledged_at = Some(now);
        }
        RequestAction::Reject { reason } => {
            let reason = reason.trim();
            if reason.is_empty() {
                return Err(RequestError::Invalid {
                    message: "rejection reason required".to_string(),
                });
            }
            patch.status = Some(RequestStatus::Rejected);
            patch.rejection_reason = Some(reason.to_string());
            patch.rejected_at = Some(now);
        }
        RequestAction::Cancel => {
            patch.status = Some(RequestStatus::Cancelled);
            patch.cancelled_at = Some(now);
        }
        RequestAction::Start => {
            patch.status = Some(RequestStatus::InProgress);
            patch.started_at = Some(Some(now));
        }
        RequestAction::Release => {
            patch.status = Some(RequestStatus::Pending);
            patch.assigned_volunteer = Some(None);
            patch.assigned_at = Some(None);
            patch.started_at = Some(None);
            assignment = AssignmentEffect::Release {
                volunteer_id: actor.id.clone(),
            };
        }
        RequestAction::Reassign { volunteer_id } => {
            let Some(current) = request.assigned_volunteer.clone() else {
                return Err(RequestError::InvalidTransition { action: kind, from });
            };
            if current == *volunteer_id {
                return Err(RequestError::Invalid {
                    message: "request is already assigned to this volunteer".to_string(),
                });
            }
            assign_to(&mut patch, volunteer_id, now);
            patch.started_at = Some(None);
            assignment = AssignmentEffect::Handover {
                from: current,
                to: volunteer_id.clone(),
            };
        }
        RequestAction::Complete => {
            patch.status = Some(RequestStatus::Completed);
            patch.completed_at = Some(now);
            assignment = AssignmentEffect::Complete {
                volunteer_id: actor.id.clone(),
            };
        }
        RequestAction::Escalate { fix } => {
            patch.status = Some(RequestStatus::Emergency);
            patch.priority = Some(Priority::Critical);
            patch.escalated_from = Some(Some(from));
            if let Some(fix) = fix {
                validate_geo_fix(fix)?;
                patch.location = Some(relocate(&request.location, fix));
            }
        }
        RequestAction::Resolve => {
            let back = request.escalated_from.unwrap_or(if request.assigned_volunteer.is_some() {
                RequestStatus::Assigned
            } else {
                RequestStatus::Pending
            });
            patch.status = Some(back);
            patch.escalated_from = Some(None);
        }
        RequestAction::Update { priority, note } => {
            if priority.is_none() && note.is_none() {
                return Err(RequestError::Invalid {
                    message: "update requires a priority or a note".to_string(),
                });
            }
            patch.priority = *priority;
            if let Some(note) = note {
                let body = validate_note(note)?;
                patch.note = Some(Note {
                    author_id: actor.id.clone(),
                    body,
                    at: now,
                });
            }
        }
    }

    let to = patch.status.unwrap_or(from);
    Ok(Transition {
        action: kind,
        from,
        to,
        patch,
        assignment,
    })
}

fn authorize_identity(
    request: &Request,
    actor: &Actor,
    action: &RequestAction,
) -> Result<(), RequestError> {
    let forbidden = || RequestError::Forbidden {
        action: action.kind(),
        role: actor.role,
    };
    match action {
        RequestAction::Start | RequestAction::Release | RequestAction::Complete => {
            if request.assigned_volunteer.as_ref() != Some(&actor.id) {
                return Err(forbidden());
            }
        }
        RequestAction::Cancel => {
            if request.requester_id != actor.id {
                return Err(forbidden());
            }
        }
        RequestAction::Update { priority, .. } if actor.role == Role::Victim => {
            if request.requester_id != actor.id || priority.is_some() {
                return Err(forbidden());
            }
        }
        _ => {}
    }
    Ok(())
}

fn assign_to(patch: &mut RequestPatch, volunteer_id: &UserId, now: DateTime<Utc>) {
    patch.status = Some(RequestStatus::Assigned);
    patch.assigned_volunteer = Some(Some(volunteer_id.clone()));
    patch.assigned_at = Some(Some(now));
}

fn relocate(current: &Location, fix: &GeoFix) -> Location {
    Location {
        address: current.address.clone(),
        latitude: Some(fix.latitude),
        longitude: Some(fix.longitude),
        accuracy_m: fix.accuracy_m,
        captured_at: Some(fix.captured_at),
    }
}

/// Describes the first broken invariant of a request row, if any.
pub fn invariant_violation(request: &Request) -> Option<&'static str> {
    if request.effective_status().holds_volunteer() != request.assigned_volunteer.is_some() {
        return Some("assigned volunteer does not match status");
    }
    if (request.status == RequestStatus::Completed) != request.completed_at.is_some() {
        return Some("completed_at does not match status");
    }
    if (request.status == RequestStatus::Rejected) != request.rejected_at.is_some() {
        return Some("rejected_at does not match status");
    }
    if (request.status == RequestStatus::Emergency) != request.escalated_from.is_some() {
        return Some("escalated_from does not match status");
    }
    None
}
