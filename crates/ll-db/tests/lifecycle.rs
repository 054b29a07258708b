use ll_core::alerts::AlertDispatcher;
use ll_core::error::{
    AuthError, CommunicationError, LifelineError, RequestError, VolunteerError,
};
use ll_core::profiles::ProfileRepository;
use ll_core::store::Store;
use ll_core::types::{
    ActionInput, ActionKind, Actor, AlertInput, Availability, Bounds, Category, Channel,
    CreateRequestInput, DispatchReceipt, EmergencyAlertInput, GeoFix, Location, NewProfile,
    Priority, RegisterInput, Request, RequestAction, RequestStatus, Role, SendMessageInput,
    SignInInput, UserId,
};
use ll_core::{Lifeline, RequestContext};
use ll_db::DbStore;
use ll_db::schema::{DEFAULT_BUSY_TIMEOUT_MS, open_and_migrate, with_test_db};
use ll_events::bus::{ChangeNotice, EventBus};
use ll_events::types::{ColumnFilter, EventSource, Table};
use std::sync::Arc;

struct World {
    app: Lifeline<DbStore>,
    ctx: RequestContext,
    victim: Actor,
    volunteer: Actor,
    other_volunteer: Actor,
    admin: Actor,
}

fn add_profile(app: &Lifeline<DbStore>, name: &str, role: Role, at: (f64, f64)) -> Actor {
    app.store()
        .profiles()
        .create(NewProfile {
            full_name: name.to_string(),
            email: format!("{}@example.org", name.to_lowercase().replace(' ', ".")),
            phone: Some("+8801711000000".to_string()),
            role,
            latitude: Some(at.0),
            longitude: Some(at.1),
            password_hash: "$argon2id$unused".to_string(),
        })
        .unwrap()
        .actor()
}

fn world_with(store: DbStore, bus: EventBus) -> World {
    let app = Lifeline::new(store, bus);
    let victim = add_profile(&app, "Amina Begum", Role::Victim, (23.80, 90.40));
    let volunteer = add_profile(&app, "Rafi Hasan", Role::Volunteer, (23.81, 90.41));
    let other_volunteer = add_profile(&app, "Tania Akter", Role::Volunteer, (22.35, 91.78));
    let admin = add_profile(&app, "Nadia Islam", Role::NgoAdmin, (23.70, 90.35));
    World {
        app,
        ctx: RequestContext::new(EventSource::Api, Some("corr_test".to_string())),
        victim,
        volunteer,
        other_volunteer,
        admin,
    }
}

fn world() -> World {
    world_with(DbStore::new(with_test_db().unwrap()), EventBus::new(64))
}

fn submit(w: &World, title: &str) -> Request {
    w.app
        .requests()
        .create(
            &w.ctx,
            &w.victim,
            CreateRequestInput {
                title: title.to_string(),
                description: "Water up to the second floor".to_string(),
                category: Category::Rescue,
                priority: Some(Priority::High),
                people_affected: Some(3),
                location: Location {
                    address: "Mirpur 10".to_string(),
                    latitude: Some(23.8069),
                    longitude: Some(90.3687),
                    accuracy_m: Some(15.0),
                    captured_at: None,
                },
            },
        )
        .unwrap()
}

fn act(
    w: &World,
    actor: &Actor,
    request: &Request,
    action: RequestAction,
) -> Result<Request, LifelineError> {
    w.app
        .requests()
        .act(&w.ctx, actor, &request.id, ActionInput::from(action))
}

fn reload(w: &World, request: &Request) -> Request {
    w.app.requests().get(&request.id).unwrap().unwrap()
}

fn availability(w: &World, actor: &Actor) -> Availability {
    w.app
        .volunteers()
        .get(&actor.id)
        .unwrap()
        .unwrap()
        .availability
}

#[test]
fn claim_start_complete_then_every_further_action_is_rejected() {
    let w = world();
    let request = submit(&w, "Trapped family");

    let claimed = act(&w, &w.volunteer, &request, RequestAction::Claim).unwrap();
    assert_eq!(claimed.status, RequestStatus::Assigned);
    assert_eq!(claimed.assigned_volunteer, Some(w.volunteer.id.clone()));
    assert_eq!(availability(&w, &w.volunteer), Availability::Busy);

    act(&w, &w.volunteer, &claimed, RequestAction::Start).unwrap();
    let completed = act(&w, &w.volunteer, &claimed, RequestAction::Complete).unwrap();
    assert_eq!(completed.status, RequestStatus::Completed);
    assert!(completed.completed_at.is_some());

    let profile = w.app.volunteers().get(&w.volunteer.id).unwrap().unwrap();
    assert_eq!(profile.completed_tasks, 1);
    assert_eq!(profile.availability, Availability::Available);

    let stats = w.app.volunteers().stats(&w.volunteer.id).unwrap();
    assert_eq!(stats.total_assignments, 1);
    assert_eq!(stats.completed_assignments, 1);
    assert_eq!(stats.active_assignments, 0);

    for action in [
        RequestAction::Claim,
        RequestAction::Start,
        RequestAction::Complete,
    ] {
        let err = act(&w, &w.volunteer, &completed, action).unwrap_err();
        assert!(matches!(
            err,
            LifelineError::Request(RequestError::InvalidTransition {
                from: RequestStatus::Completed,
                ..
            })
        ));
    }
    assert_eq!(reload(&w, &completed), completed);
}

#[test]
fn completing_twice_errors_and_keeps_the_first_timestamp() {
    let w = world();
    let request = submit(&w, "Insulin");
    act(&w, &w.volunteer, &request, RequestAction::Claim).unwrap();
    act(&w, &w.volunteer, &request, RequestAction::Start).unwrap();
    let completed = act(&w, &w.volunteer, &request, RequestAction::Complete).unwrap();

    assert!(act(&w, &w.volunteer, &request, RequestAction::Complete).is_err());
    let after = reload(&w, &request);
    assert_eq!(after.completed_at, completed.completed_at);
    assert_eq!(after.version, completed.version);
    assert_eq!(
        w.app
            .volunteers()
            .get(&w.volunteer.id)
            .unwrap()
            .unwrap()
            .completed_tasks,
        1
    );
}

#[test]
fn rejected_request_cannot_be_assigned() {
    let w = world();
    let request = submit(&w, "Tarp");
    let rejected = act(
        &w,
        &w.admin,
        &request,
        RequestAction::Reject {
            reason: "insufficient resources".to_string(),
        },
    )
    .unwrap();
    assert_eq!(rejected.status, RequestStatus::Rejected);
    assert_eq!(
        rejected.rejection_reason.as_deref(),
        Some("insufficient resources")
    );

    let err = act(
        &w,
        &w.admin,
        &rejected,
        RequestAction::Assign {
            volunteer_id: w.volunteer.id.clone(),
        },
    )
    .unwrap_err();
    assert!(matches!(
        err,
        LifelineError::Request(RequestError::InvalidTransition {
            action: ActionKind::Assign,
            from: RequestStatus::Rejected
        })
    ));
    assert_eq!(reload(&w, &rejected), rejected);
    assert!(w.app.volunteers().assignments(&w.volunteer.id).unwrap().is_empty());
}

#[test]
fn assign_sets_volunteer_and_opens_unaccepted_assignment() {
    let w = world();
    let request = submit(&w, "Generator");
    let assigned = act(
        &w,
        &w.admin,
        &request,
        RequestAction::Assign {
            volunteer_id: w.volunteer.id.clone(),
        },
    )
    .unwrap();
    assert_eq!(assigned.status, RequestStatus::Assigned);
    assert_eq!(assigned.assigned_volunteer, Some(w.volunteer.id.clone()));
    assert!(assigned.assigned_at.is_some());

    let assignments = w.app.volunteers().assignments(&w.volunteer.id).unwrap();
    assert_eq!(assignments.len(), 1);
    assert!(assignments[0].accepted_at.is_none());

    let accepted = w
        .app
        .volunteers()
        .accept_assignment(&w.ctx, &w.volunteer, &assignments[0].id)
        .unwrap();
    assert!(accepted.accepted_at.is_some());
    assert!(matches!(
        w.app
            .volunteers()
            .accept_assignment(&w.ctx, &w.other_volunteer, &assignments[0].id),
        Err(LifelineError::Volunteer(VolunteerError::Forbidden { .. }))
    ));
}

#[test]
fn assigning_to_a_non_volunteer_rolls_back() {
    let w = world();
    let request = submit(&w, "Food parcels");
    let err = act(
        &w,
        &w.admin,
        &request,
        RequestAction::Assign {
            volunteer_id: w.victim.id.clone(),
        },
    )
    .unwrap_err();
    assert!(matches!(
        err,
        LifelineError::Volunteer(VolunteerError::NotFound)
    ));
    assert_eq!(reload(&w, &request), request);
    assert_eq!(w.app.requests().history(&request.id).unwrap().len(), 1);
}

#[test]
fn stale_expected_version_is_a_conflict() {
    let w = world();
    let request = submit(&w, "Boat");
    act(&w, &w.volunteer, &request, RequestAction::Claim).unwrap();

    let err = w
        .app
        .requests()
        .act(
            &w.ctx,
            &w.volunteer,
            &request.id,
            ActionInput {
                action: RequestAction::Start,
                expected_version: Some(request.version),
            },
        )
        .unwrap_err();
    assert!(err.is_retryable());
    assert!(matches!(
        err,
        LifelineError::Request(RequestError::Conflict { .. })
    ));
    assert_eq!(reload(&w, &request).status, RequestStatus::Assigned);
}

#[test]
fn competing_claims_from_two_connections_have_one_winner() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lifeline.db");
    let bus = EventBus::new(64);
    let first = world_with(
        DbStore::new(open_and_migrate(&path, DEFAULT_BUSY_TIMEOUT_MS).unwrap()),
        bus.clone(),
    );
    let second = Lifeline::new(
        DbStore::new(open_and_migrate(&path, DEFAULT_BUSY_TIMEOUT_MS).unwrap()),
        bus,
    );
    let request = submit(&first, "Roof rescue");

    let seen = second.requests().get(&request.id).unwrap().unwrap();
    act(&first, &first.volunteer, &request, RequestAction::Claim).unwrap();

    let err = second
        .requests()
        .act(
            &first.ctx,
            &first.other_volunteer,
            &seen.id,
            ActionInput {
                action: RequestAction::Claim,
                expected_version: Some(seen.version),
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        LifelineError::Request(RequestError::Conflict { .. })
    ));

    let err = second
        .requests()
        .act(
            &first.ctx,
            &first.other_volunteer,
            &seen.id,
            RequestAction::Claim.into(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        LifelineError::Request(RequestError::InvalidTransition { .. })
    ));
    let stored = reload(&first, &request);
    assert_eq!(stored.assigned_volunteer, Some(first.volunteer.id.clone()));
}

#[test]
fn release_returns_request_to_pool() {
    let w = world();
    let request = submit(&w, "Blankets");
    act(&w, &w.volunteer, &request, RequestAction::Claim).unwrap();
    assert!(matches!(
        act(&w, &w.other_volunteer, &request, RequestAction::Release),
        Err(LifelineError::Request(RequestError::Forbidden { .. }))
    ));
    let released = act(&w, &w.volunteer, &request, RequestAction::Release).unwrap();
    assert_eq!(released.status, RequestStatus::Pending);
    assert_eq!(released.assigned_volunteer, None);
    assert_eq!(availability(&w, &w.volunteer), Availability::Available);

    let reclaimed = act(&w, &w.other_volunteer, &released, RequestAction::Claim).unwrap();
    assert_eq!(reclaimed.assigned_volunteer, Some(w.other_volunteer.id.clone()));
}

#[test]
fn reassign_hands_over_and_frees_previous_volunteer() {
    let w = world();
    let request = submit(&w, "Medical kit");
    act(&w, &w.volunteer, &request, RequestAction::Claim).unwrap();
    act(&w, &w.volunteer, &request, RequestAction::Start).unwrap();

    let reassigned = act(
        &w,
        &w.admin,
        &request,
        RequestAction::Reassign {
            volunteer_id: w.other_volunteer.id.clone(),
        },
    )
    .unwrap();
    assert_eq!(reassigned.status, RequestStatus::Assigned);
    assert_eq!(reassigned.assigned_volunteer, Some(w.other_volunteer.id.clone()));
    assert_eq!(reassigned.started_at, None);
    assert_eq!(availability(&w, &w.volunteer), Availability::Available);
    assert_eq!(availability(&w, &w.other_volunteer), Availability::Busy);

    let old = w.app.volunteers().assignments(&w.volunteer.id).unwrap();
    assert!(old[0].released_at.is_some());
    assert!(matches!(
        act(&w, &w.volunteer, &reassigned, RequestAction::Start),
        Err(LifelineError::Request(RequestError::Forbidden { .. }))
    ));
    act(&w, &w.other_volunteer, &reassigned, RequestAction::Start).unwrap();
}

#[test]
fn escalation_keeps_assignment_and_resolves_back() {
    let w = world();
    let request = submit(&w, "Collapsed wall");
    act(&w, &w.volunteer, &request, RequestAction::Claim).unwrap();

    let escalated = act(
        &w,
        &w.volunteer,
        &request,
        RequestAction::Escalate {
            fix: Some(GeoFix {
                latitude: 23.8103,
                longitude: 90.4125,
                accuracy_m: Some(5.0),
                captured_at: chrono::Utc::now(),
            }),
        },
    )
    .unwrap();
    assert_eq!(escalated.status, RequestStatus::Emergency);
    assert_eq!(escalated.priority, Priority::Critical);
    assert_eq!(escalated.escalated_from, Some(RequestStatus::Assigned));
    assert_eq!(escalated.assigned_volunteer, Some(w.volunteer.id.clone()));
    assert_eq!(escalated.coordinates(), Some((23.8103, 90.4125)));
    assert_eq!(w.app.requests().dashboard(&w.admin).unwrap().emergency, 1);

    let resolved = act(&w, &w.admin, &escalated, RequestAction::Resolve).unwrap();
    assert_eq!(resolved.status, RequestStatus::Assigned);
    assert_eq!(resolved.escalated_from, None);
    act(&w, &w.volunteer, &resolved, RequestAction::Start).unwrap();
}

#[test]
fn cancel_and_notes() {
    let w = world();
    let request = submit(&w, "Clothes");
    let noted = act(
        &w,
        &w.victim,
        &request,
        RequestAction::Update {
            priority: None,
            note: Some("Two children, ages 3 and 5".to_string()),
        },
    )
    .unwrap();
    assert_eq!(noted.notes.len(), 1);
    assert_eq!(noted.notes[0].author_id, w.victim.id);

    let cancelled = act(&w, &w.victim, &noted, RequestAction::Cancel).unwrap();
    assert_eq!(cancelled.status, RequestStatus::Cancelled);
    assert!(cancelled.cancelled_at.is_some());
    assert_eq!(cancelled.notes.len(), 1);
}

#[test]
fn scoped_listings_dashboard_and_nearby() {
    let w = world();
    let mine = submit(&w, "Mine");
    let taken = submit(&w, "Taken");
    act(&w, &w.other_volunteer, &taken, RequestAction::Claim).unwrap();
    let rejected = submit(&w, "Rejected");
    act(
        &w,
        &w.admin,
        &rejected,
        RequestAction::Reject {
            reason: "duplicate".to_string(),
        },
    )
    .unwrap();

    let for_volunteer: Vec<_> = w
        .app
        .requests()
        .list_for_actor(&w.volunteer)
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(for_volunteer, vec![mine.id.clone()]);

    let for_other: Vec<_> = w
        .app
        .requests()
        .list_for_actor(&w.other_volunteer)
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(for_other, vec![taken.id.clone(), mine.id.clone()]);
    assert_eq!(w.app.requests().list_for_actor(&w.victim).unwrap().len(), 3);
    assert_eq!(w.app.requests().list_for_actor(&w.admin).unwrap().len(), 3);

    let admin_stats = w.app.requests().dashboard(&w.admin).unwrap();
    assert_eq!(admin_stats.total, 3);
    assert_eq!(admin_stats.pending, 1);
    let volunteer_stats = w.app.requests().dashboard(&w.other_volunteer).unwrap();
    assert_eq!(volunteer_stats.total, 1);

    let nearby = w.app.requests().nearby(&w.volunteer, None).unwrap();
    assert_eq!(nearby.len(), 1);
    assert_eq!(nearby[0].request.id, mine.id);
    assert!(w.app.requests().nearby(&w.other_volunteer, Some(10.0)).unwrap().is_empty());
    assert!(matches!(
        w.app.requests().nearby(&w.admin, None),
        Err(LifelineError::Request(RequestError::NotPermitted { .. }))
    ));

    let boxed = w
        .app
        .requests()
        .within_bounds(&Bounds {
            south: 23.0,
            west: 90.0,
            north: 24.0,
            east: 91.0,
        })
        .unwrap();
    assert_eq!(boxed.len(), 3);
}

#[test]
fn only_victims_submit_requests() {
    let w = world();
    let err = w
        .app
        .requests()
        .create(
            &w.ctx,
            &w.volunteer,
            CreateRequestInput {
                title: "Not mine to file".to_string(),
                description: String::new(),
                category: Category::Other,
                priority: None,
                people_affected: None,
                location: Location::default(),
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        LifelineError::Request(RequestError::NotPermitted { .. })
    ));
}

#[test]
fn history_records_each_change_in_order() {
    let w = world();
    let request = submit(&w, "History");
    act(&w, &w.volunteer, &request, RequestAction::Claim).unwrap();
    act(&w, &w.volunteer, &request, RequestAction::Start).unwrap();

    let history = w.app.requests().history(&request.id).unwrap();
    let kinds: Vec<_> = history.iter().map(|e| e.kind.as_str()).collect();
    assert_eq!(kinds, vec!["RequestCreated", "RequestChanged", "RequestChanged"]);
    assert_eq!(history[1].detail.as_ref().unwrap()["action"], "claim");
    assert_eq!(history[2].detail.as_ref().unwrap()["from"], "assigned");
    assert!(history.iter().all(|e| e.correlation_id.as_deref() == Some("corr_test")));
}

#[tokio::test]
async fn subscribers_see_committed_changes_only() {
    let bus = EventBus::new(64);
    let w = world_with(DbStore::new(with_test_db().unwrap()), bus.clone());
    let request = submit(&w, "Feed");
    let mut sub = bus.subscribe(
        Table::Requests,
        Some(ColumnFilter::eq("id", request.id.as_str())),
    );

    assert!(act(&w, &w.victim, &request, RequestAction::Claim).is_err());
    act(&w, &w.volunteer, &request, RequestAction::Claim).unwrap();

    let Some(ChangeNotice::Changed(event)) = sub.recv().await else {
        panic!("expected a change notice");
    };
    assert_eq!(event.kind, "RequestChanged");
    assert_eq!(event.row["status"], "assigned");
    assert_eq!(event.detail.unwrap()["action"], "claim");

    let id = sub.id();
    assert!(w.app.events().unsubscribe(id));
    assert_eq!(sub.recv().await, None);
}

#[test]
fn messages_and_read_receipts() {
    let w = world();
    let request = submit(&w, "Messages");
    let sent = w
        .app
        .communications()
        .send(
            &w.ctx,
            &w.volunteer,
            SendMessageInput {
                request_id: request.id.clone(),
                recipient_id: w.victim.id.clone(),
                message: "  Arriving in 20 minutes ".to_string(),
                channel: None,
            },
        )
        .unwrap();
    assert_eq!(sent.message, "Arriving in 20 minutes");
    assert_eq!(sent.channel, Channel::Sms);
    assert_eq!(sent.sender_id, w.volunteer.id);

    assert!(matches!(
        w.app
            .communications()
            .mark_read(&w.ctx, &w.volunteer, &sent.id),
        Err(LifelineError::Communication(CommunicationError::Forbidden { .. }))
    ));
    let read = w
        .app
        .communications()
        .mark_read(&w.ctx, &w.victim, &sent.id)
        .unwrap();
    let again = w
        .app
        .communications()
        .mark_read(&w.ctx, &w.victim, &sent.id)
        .unwrap();
    assert_eq!(read.read_at, again.read_at);

    assert_eq!(w.app.communications().for_request(&request.id).unwrap().len(), 1);
    assert_eq!(w.app.communications().for_user(&w.victim).unwrap().len(), 1);

    let err = w
        .app
        .communications()
        .send(
            &w.ctx,
            &w.volunteer,
            SendMessageInput {
                request_id: request.id.clone(),
                recipient_id: UserId::generate(),
                message: "hello".to_string(),
                channel: Some(Channel::InApp),
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        LifelineError::Communication(CommunicationError::RecipientNotFound)
    ));
}

struct DownGateway;

impl AlertDispatcher for DownGateway {
    fn dispatch(&self, _input: &AlertInput) -> Result<DispatchReceipt, LifelineError> {
        Err(LifelineError::store("sms gateway unreachable"))
    }
}

#[test]
fn emergency_alert_records_one_row_per_recipient() {
    let w = world();
    let request = submit(&w, "Flood");
    let outcome = w
        .app
        .alerts()
        .emergency(
            &w.ctx,
            &w.admin,
            EmergencyAlertInput {
                request_id: request.id.clone(),
                recipient_ids: vec![
                    w.volunteer.id.clone(),
                    w.other_volunteer.id.clone(),
                    w.volunteer.id.clone(),
                ],
                message: "Move to high ground".to_string(),
                kind: None,
                channel: None,
            },
        )
        .unwrap();
    assert_eq!(outcome.communications.len(), 2);
    assert_eq!(outcome.receipt.recipients, 2);
    assert!(outcome.receipt.correlation_id.starts_with("sms_"));

    assert!(matches!(
        w.app.alerts().emergency(
            &w.ctx,
            &w.victim,
            EmergencyAlertInput {
                request_id: request.id.clone(),
                recipient_ids: vec![w.volunteer.id.clone()],
                message: "hi".to_string(),
                kind: None,
                channel: None,
            },
        ),
        Err(LifelineError::Communication(CommunicationError::Forbidden { .. }))
    ));
}

#[test]
fn failed_alert_dispatch_rolls_back_rows() {
    let store = DbStore::new(with_test_db().unwrap());
    let base = world_with(store, EventBus::new(16));
    let World {
        app,
        ctx,
        victim,
        volunteer,
        admin,
        ..
    } = base;
    let app = app.with_dispatcher(Arc::new(DownGateway));
    let request = app
        .requests()
        .create(
            &ctx,
            &victim,
            CreateRequestInput {
                title: "Landslide".to_string(),
                description: String::new(),
                category: Category::Rescue,
                priority: None,
                people_affected: None,
                location: Location::default(),
            },
        )
        .unwrap();
    let err = app
        .alerts()
        .emergency(
            &ctx,
            &admin,
            EmergencyAlertInput {
                request_id: request.id.clone(),
                recipient_ids: vec![volunteer.id.clone()],
                message: "Evacuate".to_string(),
                kind: None,
                channel: None,
            },
        )
        .unwrap_err();
    assert!(err.is_retryable());
    assert!(app.communications().for_request(&request.id).unwrap().is_empty());
}

#[test]
fn register_sign_in_resolve_sign_out() {
    let w = world();
    let ctx = &w.ctx;
    let sessions = w.app.sessions();
    let profile = sessions
        .register(
            ctx,
            RegisterInput {
                full_name: "Joy Das".to_string(),
                email: "Joy.Das@Example.org".to_string(),
                phone: None,
                password: "monsoon-2026".to_string(),
                role: Some(Role::Volunteer),
                latitude: None,
                longitude: None,
            },
        )
        .unwrap();
    assert_eq!(profile.email, "joy.das@example.org");
    assert_eq!(profile.availability, Availability::Available);

    let wrong_role = sessions
        .sign_in(SignInInput {
            email: "joy.das@example.org".to_string(),
            password: "monsoon-2026".to_string(),
            role: Role::NgoAdmin,
        })
        .unwrap_err();
    let wrong_password = sessions
        .sign_in(SignInInput {
            email: "joy.das@example.org".to_string(),
            password: "monsoon-2025".to_string(),
            role: Role::NgoAdmin,
        })
        .unwrap_err();
    assert_eq!(wrong_role.to_string(), wrong_password.to_string());
    assert!(matches!(
        wrong_role,
        LifelineError::Auth(AuthError::InvalidCredentials { .. })
    ));

    let session = sessions
        .sign_in(SignInInput {
            email: "JOY.DAS@example.org ".to_string(),
            password: "monsoon-2026".to_string(),
            role: Role::Volunteer,
        })
        .unwrap();
    assert_eq!(session.actor.id, profile.id);
    assert_eq!(sessions.resolve(&session.token).unwrap(), session.actor);

    sessions.sign_out(&session.token).unwrap();
    assert!(matches!(
        sessions.resolve(&session.token),
        Err(LifelineError::Auth(AuthError::SessionNotFound))
    ));

    assert!(matches!(
        sessions.register(
            ctx,
            RegisterInput {
                full_name: "Joy Again".to_string(),
                email: "joy.das@example.org".to_string(),
                phone: None,
                password: "another-password".to_string(),
                role: None,
                latitude: None,
                longitude: None,
            },
        ),
        Err(LifelineError::Auth(AuthError::EmailTaken))
    ));
}

#[test]
fn volunteers_set_their_own_availability() {
    let w = world();
    let offline = w
        .app
        .volunteers()
        .set_availability(&w.ctx, &w.volunteer, &w.volunteer.id, Availability::Offline)
        .unwrap();
    assert_eq!(offline.availability, Availability::Offline);
    assert!(matches!(
        w.app.volunteers().set_availability(
            &w.ctx,
            &w.other_volunteer,
            &w.volunteer.id,
            Availability::Available
        ),
        Err(LifelineError::Volunteer(VolunteerError::Forbidden { .. }))
    ));
    w.app
        .volunteers()
        .set_availability(&w.ctx, &w.admin, &w.volunteer.id, Availability::Available)
        .unwrap();
    assert_eq!(w.app.volunteers().list().unwrap().len(), 2);
}
