use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use clubroster_auth::{Event, Permission, PermissionGrant};
use clubroster_core::{AccountId, DomainError, Owned, PermissionId};

use super::{PermissionGrantStore, ResourceService, StoreError};

/// In-memory resource store for tests/dev.
///
/// Records are keyed by id; ids are UUIDv7 so iteration order follows
/// creation order. The store can be switched offline to exercise the
/// unavailable path.
#[derive(Debug)]
pub struct InMemoryStore<T: Owned> {
    inner: RwLock<BTreeMap<T::Id, T>>,
    online: AtomicBool,
}

impl<T: Owned> InMemoryStore<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
            online: AtomicBool::new(true),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store switched offline".to_string()))
        }
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("in-memory store lock poisoned".to_string())
    }
}

impl<T: Owned> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Owned + Clone> InMemoryStore<T> {
    pub fn get(&self, id: T::Id) -> Result<Option<T>, StoreError> {
        self.ensure_online()?;
        let map = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(map.get(&id).cloned())
    }

    pub fn list(&self) -> Result<Vec<T>, StoreError> {
        self.ensure_online()?;
        let map = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(map.values().cloned().collect())
    }

    pub fn list_owned(&self, owner: AccountId) -> Result<Vec<T>, StoreError> {
        self.ensure_online()?;
        let map = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(map.values().filter(|v| v.owner_id() == owner).cloned().collect())
    }

    /// Insert or replace by id.
    pub fn upsert(&self, value: T) -> Result<(), StoreError> {
        self.ensure_online()?;
        let mut map = self.inner.write().map_err(|_| Self::poisoned())?;
        map.insert(value.id(), value);
        Ok(())
    }

    /// Apply `change` to an existing record and return the updated copy.
    pub fn update(&self, id: T::Id, change: impl FnOnce(&mut T)) -> Result<T, StoreError> {
        self.ensure_online()?;
        let mut map = self.inner.write().map_err(|_| Self::poisoned())?;
        let record = map.get_mut(&id).ok_or(DomainError::NotFound)?;
        change(record);
        Ok(record.clone())
    }

    pub fn remove(&self, id: T::Id) -> Result<Option<T>, StoreError> {
        self.ensure_online()?;
        let mut map = self.inner.write().map_err(|_| Self::poisoned())?;
        Ok(map.remove(&id))
    }

    /// Remove everything owned by `owner`; returns how many records went.
    pub fn remove_owned(&self, owner: AccountId) -> Result<usize, StoreError> {
        self.ensure_online()?;
        let mut map = self.inner.write().map_err(|_| Self::poisoned())?;
        let before = map.len();
        map.retain(|_, v| v.owner_id() != owner);
        Ok(before - map.len())
    }
}

#[async_trait]
impl<T> ResourceService<T> for InMemoryStore<T>
where
    T: Owned + Clone + Send + Sync + 'static,
    T::Id: Send + Sync,
{
    async fn get_by_id(&self, id: T::Id) -> Result<Option<T>, StoreError> {
        self.get(id)
    }

    async fn list_by_owner(&self, owner: AccountId) -> Result<Vec<T>, StoreError> {
        self.list_owned(owner)
    }
}

#[async_trait]
impl PermissionGrantStore for InMemoryStore<PermissionGrant> {
    async fn list_grants(&self, account: AccountId) -> Result<Vec<PermissionGrant>, StoreError> {
        self.list_owned(account)
    }

    async fn get_grant(&self, id: PermissionId) -> Result<Option<PermissionGrant>, StoreError> {
        self.get(id)
    }
}

impl InMemoryStore<PermissionGrant> {
    /// Replace the grants of `account` with `names`.
    ///
    /// Duplicates in `names` collapse; grants already held keep their id;
    /// grants not listed are removed. Returns the resulting grants.
    pub fn set_grants(
        &self,
        account: AccountId,
        names: impl IntoIterator<Item = Permission>,
    ) -> Result<Vec<PermissionGrant>, StoreError> {
        self.ensure_online()?;
        let mut wanted: Vec<Permission> = Vec::new();
        for name in names {
            if !wanted.contains(&name) {
                wanted.push(name);
            }
        }

        let mut map = self.inner.write().map_err(|_| Self::poisoned())?;
        let before = map.len();
        map.retain(|_, g| g.owner_id != account || wanted.contains(&g.name));
        let removed = before - map.len();

        let held: Vec<Permission> = map
            .values()
            .filter(|g| g.owner_id == account)
            .map(|g| g.name.clone())
            .collect();
        let mut added = 0usize;
        for name in wanted.into_iter().filter(|n| !held.contains(n)) {
            let grant = PermissionGrant {
                id: PermissionId::new(),
                name,
                owner_id: account,
            };
            map.insert(grant.id, grant);
            added += 1;
        }

        tracing::info!(account = %account, added, removed, "permission grants replaced");
        Ok(map.values().filter(|g| g.owner_id == account).cloned().collect())
    }
}

impl InMemoryStore<Event> {
    /// Store a new event, listing its creator among the editors.
    pub fn create_event(&self, mut event: Event) -> Result<Event, StoreError> {
        if !event.editor_ids.contains(&event.creator_id) {
            event.editor_ids.push(event.creator_id);
        }
        self.upsert(event.clone())?;
        Ok(event)
    }

    /// Events the account may co-edit (creator or listed editor).
    pub fn list_editable_by(&self, account: AccountId) -> Result<Vec<Event>, StoreError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|e| e.creator_id == account || e.editor_ids.contains(&account))
            .collect())
    }
}
