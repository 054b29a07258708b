use crate::alerts::{AlertDispatcher, LogDispatcher};
use crate::assignments::AssignmentRepository;
use crate::auth::{hash_password, token_digest, verify_password};
use crate::communications::CommunicationRepository;
use crate::error::{
    AuthError, CommunicationError, LifelineError, RequestError, VolunteerError,
};
use crate::events::EventRepository;
use crate::geo::rank_nearby;
use crate::lifecycle::{AssignmentEffect, invariant_violation, plan};
use crate::profiles::ProfileRepository;
use crate::requests::RequestRepository;
use crate::sessions::SessionRepository;
use crate::store::Store;
use crate::types::{
    ActionInput, Actor, AlertInput, AlertKind, AlertOutcome, AlertRecipient, Assignment,
    AssignmentId, Availability, Bounds, Channel, Communication, CommunicationId,
    CreateRequestInput, DashboardStats, EmergencyAlertInput, EventBody, NearbyRequest,
    NewCommunication, NewProfile, Priority, Profile, RegisterInput, Request, RequestFilter,
    RequestId, RequestStatus, Role, SendMessageInput, Session, SessionToken, SignInInput, UserId,
    VolunteerStats,
};
use crate::validation::{validate_create_request, validate_message, validate_registration};
use crate::visibility::scope_record;
use chrono::{DateTime, Utc};
use ll_events::bus::{EventBus, Subscription, SubscriptionId};
use ll_events::types::{ColumnFilter, EventRecord, EventSource, Table};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub source: EventSource,
    pub correlation_id: Option<String>,
}

impl RequestContext {
    pub fn new(source: EventSource, correlation_id: Option<String>) -> Self {
        Self {
            source,
            correlation_id,
        }
    }
}

pub const DEFAULT_NEARBY_RADIUS_KM: f64 = 50.0;

pub struct Lifeline<S: Store> {
    store: S,
    event_bus: EventBus,
    dispatcher: Arc<dyn AlertDispatcher>,
    nearby_radius_km: f64,
}

impl<S: Store> Lifeline<S> {
    pub fn new(store: S, event_bus: EventBus) -> Self {
        Self {
            store,
            event_bus,
            dispatcher: Arc::new(LogDispatcher),
            nearby_radius_km: DEFAULT_NEARBY_RADIUS_KM,
        }
    }

    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn AlertDispatcher>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    #[must_use]
    pub fn with_nearby_radius(mut self, km: f64) -> Self {
        self.nearby_radius_km = km;
        self
    }

    pub fn requests(&self) -> RequestsApi<'_, S> {
        RequestsApi { core: self }
    }

    pub fn volunteers(&self) -> VolunteersApi<'_, S> {
        VolunteersApi { core: self }
    }

    pub fn communications(&self) -> CommunicationsApi<'_, S> {
        CommunicationsApi { core: self }
    }

    pub fn alerts(&self) -> AlertsApi<'_, S> {
        AlertsApi { core: self }
    }

    pub fn sessions(&self) -> SessionsApi<'_, S> {
        SessionsApi { core: self }
    }

    pub fn events(&self) -> EventsApi<'_, S> {
        EventsApi { core: self }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn with_events<T, F>(&self, ctx: &RequestContext, f: F) -> Result<T, LifelineError>
    where
        F: FnOnce(&S) -> Result<(T, Vec<EventBody>), LifelineError>,
    {
        let (value, records) = self.store.with_tx(|store| {
            let (value, bodies) = f(store)?;
            let mut records = Vec::new();
            for body in bodies {
                let record = build_event_record(ctx, &body)?;
                let record = store.events().append(record)?;
                records.push(record);
            }
            Ok((value, records))
        })?;
        for record in records {
            let _ = self.event_bus.publish(record);
        }
        Ok(value)
    }
}

pub struct RequestsApi<'a, S: Store> {
    core: &'a Lifeline<S>,
}

impl<S: Store> RequestsApi<'_, S> {
    pub fn create(
        &self,
        ctx: &RequestContext,
        actor: &Actor,
        input: CreateRequestInput,
    ) -> Result<Request, LifelineError> {
        if actor.role != Role::Victim {
            return Err(RequestError::NotPermitted {
                message: format!("{} may not submit requests", actor.role),
            }
            .into());
        }
        validate_create_request(&input)?;
        let input = CreateRequestInput {
            title: input.title.trim().to_string(),
            priority: Some(input.priority.unwrap_or(Priority::Medium)),
            people_affected: Some(input.people_affected.unwrap_or(1)),
            ..input
        };
        let request = self.core.with_events(ctx, |store| {
            let request = store.requests().create(&actor.id, input)?;
            Ok((
                request.clone(),
                vec![EventBody::RequestCreated { request }],
            ))
        })?;
        tracing::info!(
            request_id = %request.id,
            category = ?request.category,
            priority = ?request.priority,
            "request submitted"
        );
        Ok(request)
    }

    pub fn get(&self, id: &RequestId) -> Result<Option<Request>, LifelineError> {
        self.core.store.requests().get(id)
    }

    pub fn list(&self, filter: &RequestFilter) -> Result<Vec<Request>, LifelineError> {
        self.core.store.requests().list(filter)
    }

    /// Victims see their own requests, volunteers see what they hold plus the
    /// open pool, admins see everything. Newest first.
    pub fn list_for_actor(&self, actor: &Actor) -> Result<Vec<Request>, LifelineError> {
        match actor.role {
            Role::Victim => self.list(&RequestFilter {
                requester_id: Some(actor.id.clone()),
                ..RequestFilter::default()
            }),
            Role::Volunteer => {
                let mut requests = self.list(&RequestFilter::default())?;
                requests.retain(|request| {
                    request.status == RequestStatus::Pending
                        || request.assigned_volunteer.as_ref() == Some(&actor.id)
                });
                Ok(requests)
            }
            Role::NgoAdmin => self.list(&RequestFilter::default()),
        }
    }

    pub fn within_bounds(&self, bounds: &Bounds) -> Result<Vec<Request>, LifelineError> {
        let mut requests = self.list(&RequestFilter::default())?;
        requests.retain(|request| {
            request
                .coordinates()
                .is_some_and(|(latitude, longitude)| bounds.contains(latitude, longitude))
        });
        Ok(requests)
    }

    pub fn nearby(
        &self,
        actor: &Actor,
        max_km: Option<f64>,
    ) -> Result<Vec<NearbyRequest>, LifelineError> {
        if actor.role != Role::Volunteer {
            return Err(RequestError::NotPermitted {
                message: "only volunteers have a nearby view".to_string(),
            }
            .into());
        }
        let Some(profile) = self.core.store.profiles().get(&actor.id)? else {
            return Err(VolunteerError::NotFound.into());
        };
        let Some(origin) = profile.coordinates() else {
            return Err(VolunteerError::Invalid {
                message: "volunteer has no location on file".to_string(),
            }
            .into());
        };
        let pending = self.list(&RequestFilter {
            status: Some(vec![RequestStatus::Pending]),
            ..RequestFilter::default()
        })?;
        Ok(rank_nearby(
            origin,
            pending,
            max_km.unwrap_or(self.core.nearby_radius_km),
        ))
    }

    pub fn dashboard(&self, actor: &Actor) -> Result<DashboardStats, LifelineError> {
        let filter = match actor.role {
            Role::Victim => RequestFilter {
                requester_id: Some(actor.id.clone()),
                ..RequestFilter::default()
            },
            Role::Volunteer => RequestFilter {
                assigned_volunteer: Some(actor.id.clone()),
                ..RequestFilter::default()
            },
            Role::NgoAdmin => RequestFilter::default(),
        };
        let requests = self.list(&filter)?;
        let mut stats = DashboardStats::default();
        for request in &requests {
            stats.total += 1;
            match request.status {
                RequestStatus::Pending => stats.pending += 1,
                RequestStatus::InProgress => stats.in_progress += 1,
                RequestStatus::Completed => stats.completed += 1,
                RequestStatus::Emergency => stats.emergency += 1,
                _ => {}
            }
        }
        Ok(stats)
    }

    pub fn history(&self, id: &RequestId) -> Result<Vec<EventRecord>, LifelineError> {
        if self.get(id)?.is_none() {
            return Err(RequestError::NotFound.into());
        }
        self.core
            .store
            .events()
            .list_for_row(Table::Requests, id.as_str())
    }

    /// Applies one lifecycle action. The status write, assignment rows and
    /// volunteer counters commit together or not at all.
    pub fn act(
        &self,
        ctx: &RequestContext,
        actor: &Actor,
        id: &RequestId,
        input: ActionInput,
    ) -> Result<Request, LifelineError> {
        let kind = input.action.kind();
        let result = self.core.with_events(ctx, |store| {
            let Some(request) = store.requests().get(id)? else {
                return Err(RequestError::NotFound.into());
            };
            if let Some(expected) = input.expected_version {
                if expected != request.version {
                    return Err(RequestError::Conflict {
                        message: format!(
                            "request is at version {}, expected {expected}",
                            request.version
                        ),
                    }
                    .into());
                }
            }

            let now = Utc::now();
            let transition = plan(&request, actor, &input.action, now)?;
            match &transition.assignment {
                AssignmentEffect::Open { volunteer_id, .. }
                | AssignmentEffect::Handover {
                    to: volunteer_id, ..
                } => {
                    ensure_assignable(store, volunteer_id)?;
                }
                _ => {}
            }

            let updated = store
                .requests()
                .apply_patch(id, request.version, &transition.patch)?;
            if let Some(broken) = invariant_violation(&updated) {
                return Err(LifelineError::internal(broken));
            }

            let mut events = vec![EventBody::RequestChanged {
                request: updated.clone(),
                action: transition.action,
                from: transition.from,
            }];
            apply_assignment(store, &updated, &transition.assignment, now, &mut events)?;
            Ok((updated, events))
        });

        match &result {
            Ok(request) => tracing::info!(
                request_id = %id,
                action = %kind,
                actor = %actor.id,
                status = %request.status,
                version = request.version,
                "request action applied"
            ),
            Err(LifelineError::Request(RequestError::Conflict { message })) => tracing::warn!(
                request_id = %id,
                action = %kind,
                %message,
                "request action lost a version race"
            ),
            Err(err) => tracing::debug!(
                request_id = %id,
                action = %kind,
                error = %err,
                "request action refused"
            ),
        }
        result
    }
}

fn ensure_assignable<S: Store>(store: &S, volunteer_id: &UserId) -> Result<Profile, LifelineError> {
    let Some(profile) = store.profiles().get(volunteer_id)? else {
        return Err(VolunteerError::NotFound.into());
    };
    if profile.role != Role::Volunteer {
        return Err(VolunteerError::NotFound.into());
    }
    if !profile.is_active {
        return Err(VolunteerError::Inactive.into());
    }
    Ok(profile)
}

fn apply_assignment<S: Store>(
    store: &S,
    request: &Request,
    effect: &AssignmentEffect,
    now: DateTime<Utc>,
    events: &mut Vec<EventBody>,
) -> Result<(), LifelineError> {
    match effect {
        AssignmentEffect::None => {}
        AssignmentEffect::Open {
            volunteer_id,
            accepted,
        } => {
            let assignment = store
                .assignments()
                .open(&request.id, volunteer_id, *accepted, now)?;
            events.push(EventBody::AssignmentOpened { assignment });
            if let Some(profile) = refresh_availability(store, volunteer_id)? {
                events.push(EventBody::ProfileUpdated { profile });
            }
        }
        AssignmentEffect::Release { volunteer_id } => {
            release_active(store, &request.id, now, events)?;
            if let Some(profile) = refresh_availability(store, volunteer_id)? {
                events.push(EventBody::ProfileUpdated { profile });
            }
        }
        AssignmentEffect::Handover { from, to } => {
            release_active(store, &request.id, now, events)?;
            let assignment = store.assignments().open(&request.id, to, false, now)?;
            events.push(EventBody::AssignmentOpened { assignment });
            for volunteer_id in [from, to] {
                if let Some(profile) = refresh_availability(store, volunteer_id)? {
                    events.push(EventBody::ProfileUpdated { profile });
                }
            }
        }
        AssignmentEffect::Complete { volunteer_id } => {
            if let Some(active) = store.assignments().active_for_request(&request.id)? {
                let assignment = store.assignments().complete(&active.id, now)?;
                events.push(EventBody::AssignmentCompleted { assignment });
            }
            let mut profile = store.profiles().increment_completed(volunteer_id)?;
            if let Some(refreshed) = refresh_availability(store, volunteer_id)? {
                profile = refreshed;
            }
            events.push(EventBody::ProfileUpdated { profile });
        }
    }
    Ok(())
}

fn release_active<S: Store>(
    store: &S,
    request_id: &RequestId,
    now: DateTime<Utc>,
    events: &mut Vec<EventBody>,
) -> Result<(), LifelineError> {
    if let Some(active) = store.assignments().active_for_request(request_id)? {
        let assignment = store.assignments().release(&active.id, now)?;
        events.push(EventBody::AssignmentReleased { assignment });
    }
    Ok(())
}

/// Busy while holding any active assignment; back to available once none
/// remain. An offline volunteer stays offline when freed. Returns the profile
/// only if it changed.
fn refresh_availability<S: Store>(
    store: &S,
    volunteer_id: &UserId,
) -> Result<Option<Profile>, LifelineError> {
    let Some(profile) = store.profiles().get(volunteer_id)? else {
        return Err(VolunteerError::NotFound.into());
    };
    let active = store.assignments().count_active_for_volunteer(volunteer_id)?;
    let desired = match (active, profile.availability) {
        (0, Availability::Busy) => Availability::Available,
        (0, current) => current,
        _ => Availability::Busy,
    };
    if desired == profile.availability {
        return Ok(None);
    }
    store
        .profiles()
        .set_availability(volunteer_id, desired)
        .map(Some)
}

pub struct VolunteersApi<'a, S: Store> {
    core: &'a Lifeline<S>,
}

impl<S: Store> VolunteersApi<'_, S> {
    pub fn list(&self) -> Result<Vec<Profile>, LifelineError> {
        self.core.store.profiles().list_volunteers(true)
    }

    pub fn get(&self, id: &UserId) -> Result<Option<Profile>, LifelineError> {
        let profile = self.core.store.profiles().get(id)?;
        Ok(profile.filter(|profile| profile.role == Role::Volunteer))
    }

    pub fn set_availability(
        &self,
        ctx: &RequestContext,
        actor: &Actor,
        volunteer_id: &UserId,
        availability: Availability,
    ) -> Result<Profile, LifelineError> {
        if actor.id != *volunteer_id && !actor.is_admin() {
            return Err(VolunteerError::Forbidden {
                message: "only the volunteer or an admin may change availability".to_string(),
            }
            .into());
        }
        self.core.with_events(ctx, |store| {
            let Some(profile) = store.profiles().get(volunteer_id)? else {
                return Err(VolunteerError::NotFound.into());
            };
            if profile.role != Role::Volunteer {
                return Err(VolunteerError::NotFound.into());
            }
            if profile.availability == availability {
                return Ok((profile, Vec::new()));
            }
            let profile = store.profiles().set_availability(volunteer_id, availability)?;
            Ok((
                profile.clone(),
                vec![EventBody::ProfileUpdated { profile }],
            ))
        })
    }

    /// Newest first.
    pub fn assignments(&self, volunteer_id: &UserId) -> Result<Vec<Assignment>, LifelineError> {
        self.core
            .store
            .assignments()
            .list_for_volunteer(volunteer_id)
    }

    pub fn stats(&self, volunteer_id: &UserId) -> Result<VolunteerStats, LifelineError> {
        if self.get(volunteer_id)?.is_none() {
            return Err(VolunteerError::NotFound.into());
        }
        let assignments = self.assignments(volunteer_id)?;
        let mut stats = VolunteerStats::default();
        for assignment in &assignments {
            stats.total_assignments += 1;
            if assignment.completed_at.is_some() {
                stats.completed_assignments += 1;
            }
            if assignment.is_active() {
                stats.active_assignments += 1;
            }
        }
        Ok(stats)
    }

    /// The assigned volunteer acknowledges an assignment. The first
    /// acknowledgement wins; repeats return the row unchanged.
    pub fn accept_assignment(
        &self,
        ctx: &RequestContext,
        actor: &Actor,
        id: &AssignmentId,
    ) -> Result<Assignment, LifelineError> {
        self.core.with_events(ctx, |store| {
            let Some(assignment) = store.assignments().get(id)? else {
                return Err(VolunteerError::AssignmentNotFound.into());
            };
            if assignment.volunteer_id != actor.id {
                return Err(VolunteerError::Forbidden {
                    message: "assignment belongs to another volunteer".to_string(),
                }
                .into());
            }
            if !assignment.is_active() {
                return Err(VolunteerError::Invalid {
                    message: "assignment is no longer active".to_string(),
                }
                .into());
            }
            if assignment.accepted_at.is_some() {
                return Ok((assignment, Vec::new()));
            }
            let assignment = store.assignments().accept(id, Utc::now())?;
            Ok((
                assignment.clone(),
                vec![EventBody::AssignmentAccepted { assignment }],
            ))
        })
    }
}

pub struct CommunicationsApi<'a, S: Store> {
    core: &'a Lifeline<S>,
}

impl<S: Store> CommunicationsApi<'_, S> {
    pub fn send(
        &self,
        ctx: &RequestContext,
        actor: &Actor,
        input: SendMessageInput,
    ) -> Result<Communication, LifelineError> {
        let message = validate_message(&input.message)?;
        let (communication, recipient) = self.core.with_events(ctx, |store| {
            if store.requests().get(&input.request_id)?.is_none() {
                return Err(RequestError::NotFound.into());
            }
            let Some(recipient) = store.profiles().get(&input.recipient_id)? else {
                return Err(CommunicationError::RecipientNotFound.into());
            };
            let communication = store.communications().create(NewCommunication {
                request_id: input.request_id.clone(),
                sender_id: actor.id.clone(),
                recipient_id: recipient.id.clone(),
                message,
                channel: input.channel.unwrap_or(Channel::Sms),
            })?;
            Ok((
                (communication.clone(), recipient),
                vec![EventBody::MessageSent { communication }],
            ))
        })?;

        if communication.channel == Channel::Sms {
            let alert = AlertInput {
                recipients: vec![AlertRecipient {
                    user_id: recipient.id,
                    phone: recipient.phone,
                }],
                message: communication.message.clone(),
                kind: AlertKind::Update,
            };
            if let Err(err) = self.core.dispatcher.dispatch(&alert) {
                tracing::warn!(
                    communication_id = %communication.id,
                    error = %err,
                    "message stored but sms hand-off failed"
                );
            }
        }
        Ok(communication)
    }

    /// Oldest first.
    pub fn for_request(&self, request_id: &RequestId) -> Result<Vec<Communication>, LifelineError> {
        self.core
            .store
            .communications()
            .list_for_request(request_id)
    }

    /// Sent or received by the actor, newest first.
    pub fn for_user(&self, actor: &Actor) -> Result<Vec<Communication>, LifelineError> {
        self.core.store.communications().list_for_user(&actor.id)
    }

    pub fn mark_read(
        &self,
        ctx: &RequestContext,
        actor: &Actor,
        id: &CommunicationId,
    ) -> Result<Communication, LifelineError> {
        self.core.with_events(ctx, |store| {
            let Some(communication) = store.communications().get(id)? else {
                return Err(CommunicationError::NotFound.into());
            };
            if communication.recipient_id != actor.id {
                return Err(CommunicationError::Forbidden {
                    message: "only the recipient may mark a message read".to_string(),
                }
                .into());
            }
            if communication.read_at.is_some() {
                return Ok((communication, Vec::new()));
            }
            let communication = store.communications().mark_read(id, Utc::now())?;
            Ok((
                communication.clone(),
                vec![EventBody::MessageRead { communication }],
            ))
        })
    }
}

pub struct AlertsApi<'a, S: Store> {
    core: &'a Lifeline<S>,
}

impl<S: Store> AlertsApi<'_, S> {
    /// Records one communication per distinct recipient and hands the alert
    /// to the dispatcher once. A dispatch failure rolls the rows back.
    pub fn emergency(
        &self,
        ctx: &RequestContext,
        actor: &Actor,
        input: EmergencyAlertInput,
    ) -> Result<AlertOutcome, LifelineError> {
        if actor.role == Role::Victim {
            return Err(CommunicationError::Forbidden {
                message: "victims may not broadcast alerts".to_string(),
            }
            .into());
        }
        let message = validate_message(&input.message)?;
        let mut recipient_ids: Vec<UserId> = Vec::new();
        for id in input.recipient_ids {
            if !recipient_ids.contains(&id) {
                recipient_ids.push(id);
            }
        }
        if recipient_ids.is_empty() {
            return Err(CommunicationError::Invalid {
                message: "at least one recipient is required".to_string(),
            }
            .into());
        }
        let kind = input.kind.unwrap_or(AlertKind::Emergency);
        let channel = input.channel.unwrap_or(Channel::Sms);

        let outcome = self.core.with_events(ctx, |store| {
            if store.requests().get(&input.request_id)?.is_none() {
                return Err(RequestError::NotFound.into());
            }
            let mut recipients = Vec::with_capacity(recipient_ids.len());
            let mut communications = Vec::with_capacity(recipient_ids.len());
            for id in &recipient_ids {
                let Some(profile) = store.profiles().get(id)? else {
                    return Err(CommunicationError::RecipientNotFound.into());
                };
                communications.push(store.communications().create(NewCommunication {
                    request_id: input.request_id.clone(),
                    sender_id: actor.id.clone(),
                    recipient_id: profile.id.clone(),
                    message: message.clone(),
                    channel,
                })?);
                recipients.push(AlertRecipient {
                    user_id: profile.id,
                    phone: profile.phone,
                });
            }
            let receipt = self.core.dispatcher.dispatch(&AlertInput {
                recipients,
                message: message.clone(),
                kind,
            })?;
            let events = communications
                .iter()
                .cloned()
                .map(|communication| EventBody::MessageSent { communication })
                .collect();
            Ok((
                AlertOutcome {
                    receipt,
                    communications,
                },
                events,
            ))
        })?;
        tracing::info!(
            request_id = %input.request_id,
            correlation_id = %outcome.receipt.correlation_id,
            recipients = outcome.receipt.recipients,
            "emergency alert dispatched"
        );
        Ok(outcome)
    }
}

pub struct SessionsApi<'a, S: Store> {
    core: &'a Lifeline<S>,
}

impl<S: Store> SessionsApi<'_, S> {
    pub fn register(
        &self,
        ctx: &RequestContext,
        input: RegisterInput,
    ) -> Result<Profile, LifelineError> {
        validate_registration(&input)?;
        let email = input.email.trim().to_lowercase();
        let password_hash = hash_password(&input.password)?;
        self.core.with_events(ctx, |store| {
            if store.profiles().get_by_email(&email)?.is_some() {
                return Err(AuthError::EmailTaken.into());
            }
            let profile = store.profiles().create(NewProfile {
                full_name: input.full_name.trim().to_string(),
                email,
                phone: input.phone,
                role: input.role.unwrap_or(Role::Victim),
                latitude: input.latitude,
                longitude: input.longitude,
                password_hash,
            })?;
            Ok((
                profile.clone(),
                vec![EventBody::ProfileRegistered { profile }],
            ))
        })
    }

    /// Unknown email, wrong password, wrong role and a deactivated account
    /// are indistinguishable to the caller.
    pub fn sign_in(&self, input: SignInInput) -> Result<Session, LifelineError> {
        let rejected = || LifelineError::from(AuthError::InvalidCredentials { role: input.role });
        let email = input.email.trim().to_lowercase();
        let Some((profile, hash)) = self.core.store.profiles().credentials(&email)? else {
            return Err(rejected());
        };
        if !verify_password(&input.password, &hash)? {
            return Err(rejected());
        }
        if profile.role != input.role || !profile.is_active {
            return Err(rejected());
        }
        let token = SessionToken::generate();
        let created_at = Utc::now();
        self.core
            .store
            .sessions()
            .create(&token_digest(&token), &profile, created_at)?;
        tracing::info!(user_id = %profile.id, role = %profile.role, "signed in");
        Ok(Session {
            token,
            actor: profile.actor(),
            created_at,
        })
    }

    pub fn resolve(&self, token: &SessionToken) -> Result<Actor, LifelineError> {
        self.core
            .store
            .sessions()
            .actor(&token_digest(token))?
            .ok_or_else(|| AuthError::SessionNotFound.into())
    }

    pub fn sign_out(&self, token: &SessionToken) -> Result<(), LifelineError> {
        if self.core.store.sessions().delete(&token_digest(token))? {
            Ok(())
        } else {
            Err(AuthError::SessionNotFound.into())
        }
    }

    pub fn profile(&self, actor: &Actor) -> Result<Profile, LifelineError> {
        self.core
            .store
            .profiles()
            .get(&actor.id)?
            .ok_or_else(|| AuthError::SessionNotFound.into())
    }
}

pub struct EventsApi<'a, S: Store> {
    core: &'a Lifeline<S>,
}

impl<S: Store> EventsApi<'_, S> {
    pub fn list(
        &self,
        after: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<EventRecord>, LifelineError> {
        self.core.store.events().list(after, limit)
    }

    /// Like [`list`](Self::list), narrowed and redacted for `actor`.
    pub fn list_for_actor(
        &self,
        actor: &Actor,
        after: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<EventRecord>, LifelineError> {
        let records = self.list(after, limit)?;
        Ok(records
            .into_iter()
            .filter_map(|record| scope_record(actor, record))
            .collect())
    }

    pub fn subscribe(&self, table: Table, filter: Option<ColumnFilter>) -> Subscription {
        self.core.event_bus.subscribe(table, filter)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.core.event_bus.unsubscribe(id)
    }
}

fn build_event_record(ctx: &RequestContext, body: &EventBody) -> Result<EventRecord, LifelineError> {
    let row = body.row().map_err(LifelineError::internal)?;
    Ok(EventRecord {
        id: String::new(),
        seq: 0,
        at: Utc::now(),
        correlation_id: ctx.correlation_id.clone(),
        source: ctx.source,
        table: body.table(),
        change: body.change(),
        row_id: body.row_id(),
        kind: body.name().to_string(),
        row,
        detail: body.detail(),
    })
}
