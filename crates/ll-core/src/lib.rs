pub mod alerts;
pub mod assignments;
pub mod auth;
pub mod communications;
pub mod config;
pub mod error;
pub mod events;
pub mod geo;
pub mod lifecycle;
pub mod lifeline;
pub mod profiles;
pub mod requests;
pub mod sessions;
pub mod store;
pub mod validation;
pub mod visibility;

pub mod types;

pub use crate::error::LifelineError;
pub use crate::lifeline::{Lifeline, RequestContext};
pub use crate::store::Store;
