//! Infrastructure layer: resource services, request-time resolution and
//! policy dispatch.
//!
//! Everything here is async and IO-shaped even when backed by memory, so a
//! database-backed service can replace the in-memory one without touching
//! the dispatcher.

pub mod policy_dispatcher;
pub mod resolver;
pub mod store;

pub use policy_dispatcher::{DEFAULT_RESOLVE_TIMEOUT, Denial, PolicyDispatcher};
pub use resolver::{ResolveError, Resolved, ResourceResolver, ResourceServices};
pub use store::{InMemoryStore, PermissionGrantStore, ResourceService, StoreError};
