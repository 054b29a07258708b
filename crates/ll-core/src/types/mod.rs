pub mod assignment;
pub mod communication;
pub mod enums;
pub mod event;
pub mod ids;
pub mod io;
pub mod profile;
pub mod request;

pub use assignment::{Assignment, VolunteerStats};
pub use communication::{AlertOutcome, Communication, DispatchReceipt};
pub use enums::{
    ActionKind, AlertKind, Availability, Category, Channel, Priority, RequestStatus, Role,
};
pub use event::EventBody;
pub use ids::{AssignmentId, CommunicationId, IdError, RequestId, SessionToken, UserId};
pub use io::{
    ActionInput, AlertInput, AlertRecipient, AvailabilityInput, CreateRequestInput,
    EmergencyAlertInput, NewCommunication, NewProfile, RegisterInput, RequestAction,
    RequestFilter, RequestPatch, SendMessageInput, SignInInput,
};
pub use profile::{Actor, Profile, Session};
pub use request::{Bounds, DashboardStats, GeoFix, Location, NearbyRequest, Note, Request};
