//! `clubroster-auth`: attribute-based access control for the membership backend.
//!
//! This crate is decoupled from HTTP and storage: it compiles a
//! principal's permission grants into a [`Ruleset`], evaluates abilities
//! against typed resources and declares the policy checks protected
//! operations require. Fetching the resources is the caller's job.

pub mod ability;
pub mod action;
pub mod compiler;
pub mod condition;
pub mod grants;
pub mod model;
pub mod permissions;
pub mod policy;
pub mod principal;
pub mod resource;
pub mod rule;

pub use ability::can;
pub use action::{Action, ParseActionError};
pub use compiler::compile;
pub use condition::{AccountList, AccountRef, Attributes, Condition, Flag};
pub use grants::{GrantDefinition, GrantRule};
pub use model::{Account, Event, PermissionGrant, PhoneNumber};
pub use permissions::Permission;
pub use policy::{PolicyCheck, RequestParams, ResourceCategory};
pub use principal::Principal;
pub use resource::{ParseResourceTypeError, Resource, ResourceCollection, ResourceType, Subject};
pub use rule::{Rule, RuleSource, Ruleset};
