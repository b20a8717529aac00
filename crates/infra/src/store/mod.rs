//! Resource services consumed by the authorization core.
//!
//! The core only reads through these traits. Mutation is the business of
//! whoever owns the concrete store (the API wires the in-memory one).

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use clubroster_auth::{Permission, PermissionGrant};
use clubroster_core::{AccountId, DomainError, Owned, PermissionId};

pub mod in_memory;

pub use in_memory::InMemoryStore;

/// Storage-level failure.
///
/// `Unavailable` is the only infrastructure fault the API distinguishes from
/// an ordinary denial.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Read access to one kind of owned resource.
#[async_trait]
pub trait ResourceService<T>: Send + Sync
where
    T: Owned + Send + Sync + 'static,
    T::Id: Send + Sync,
{
    async fn get_by_id(&self, id: T::Id) -> Result<Option<T>, StoreError>;

    /// All instances owned by `owner`, in a stable order.
    async fn list_by_owner(&self, owner: AccountId) -> Result<Vec<T>, StoreError>;
}

#[async_trait]
impl<T, S> ResourceService<T> for Arc<S>
where
    T: Owned + Send + Sync + 'static,
    T::Id: Send + Sync,
    S: ResourceService<T> + ?Sized,
{
    async fn get_by_id(&self, id: T::Id) -> Result<Option<T>, StoreError> {
        (**self).get_by_id(id).await
    }

    async fn list_by_owner(&self, owner: AccountId) -> Result<Vec<T>, StoreError> {
        (**self).list_by_owner(owner).await
    }
}

/// Permission grants held per account. Read-only to the core.
#[async_trait]
pub trait PermissionGrantStore: Send + Sync {
    async fn list_grants(&self, account: AccountId) -> Result<Vec<PermissionGrant>, StoreError>;

    async fn get_grant(&self, id: PermissionId) -> Result<Option<PermissionGrant>, StoreError>;

    /// Grant names in stored order; what a principal is built from.
    async fn grant_names(&self, account: AccountId) -> Result<Vec<Permission>, StoreError> {
        Ok(self
            .list_grants(account)
            .await?
            .into_iter()
            .map(|g| g.name)
            .collect())
    }
}
