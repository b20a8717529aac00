//! `clubroster-core`: domain foundation building blocks.
//!
//! Identifiers, the domain error model and the entity/ownership traits shared
//! by the authorization engine and the resource services.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::{Entity, Owned};
pub use error::{DomainError, DomainResult};
pub use id::{AccountId, EventId, PermissionId, PhoneId};
