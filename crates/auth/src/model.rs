//! Resource models the membership backend protects.
//!
//! These are plain records. Storage lives behind the resource services in
//! `clubroster-infra`; this crate only needs their account-reference fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clubroster_core::{AccountId, Entity, EventId, Owned, PermissionId, PhoneId};

use crate::condition::{AccountList, AccountRef, Attributes, Flag};
use crate::Permission;

// ─────────────────────────────────────────────────────────────────────────────
// Account
// ─────────────────────────────────────────────────────────────────────────────

/// Member account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub active: bool,
}

impl Entity for Account {
    type Id = AccountId;

    fn id(&self) -> AccountId {
        self.id
    }
}

impl Owned for Account {
    fn owner_id(&self) -> AccountId {
        self.id
    }
}

impl Attributes for Account {
    fn account_ref(&self, field: AccountRef) -> Option<AccountId> {
        match field {
            AccountRef::Id => Some(self.id),
            AccountRef::Owner | AccountRef::Creator => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Phone number
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber {
    pub id: PhoneId,
    pub owner_id: AccountId,
    pub number: String,
    pub description: Option<String>,
}

impl Entity for PhoneNumber {
    type Id = PhoneId;

    fn id(&self) -> PhoneId {
        self.id
    }
}

impl Owned for PhoneNumber {
    fn owner_id(&self) -> AccountId {
        self.owner_id
    }
}

impl Attributes for PhoneNumber {
    fn account_ref(&self, field: AccountRef) -> Option<AccountId> {
        match field {
            AccountRef::Owner => Some(self.owner_id),
            AccountRef::Id | AccountRef::Creator => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Permission grant
// ─────────────────────────────────────────────────────────────────────────────

/// A named permission granted to one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub id: PermissionId,
    pub name: Permission,
    pub owner_id: AccountId,
}

impl Entity for PermissionGrant {
    type Id = PermissionId;

    fn id(&self) -> PermissionId {
        self.id
    }
}

impl Owned for PermissionGrant {
    fn owner_id(&self) -> AccountId {
        self.owner_id
    }
}

impl Attributes for PermissionGrant {
    fn account_ref(&self, field: AccountRef) -> Option<AccountId> {
        match field {
            AccountRef::Owner => Some(self.owner_id),
            AccountRef::Id | AccountRef::Creator => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Event
// ─────────────────────────────────────────────────────────────────────────────

/// Club event.
///
/// # Invariants
/// - The creator is always listed among the editors (enforced on creation by
///   the event service).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub public: bool,
    pub creator_id: AccountId,
    pub editor_ids: Vec<AccountId>,
}

impl Entity for Event {
    type Id = EventId;

    fn id(&self) -> EventId {
        self.id
    }
}

impl Owned for Event {
    fn owner_id(&self) -> AccountId {
        self.creator_id
    }
}

impl Attributes for Event {
    fn account_ref(&self, field: AccountRef) -> Option<AccountId> {
        match field {
            AccountRef::Creator => Some(self.creator_id),
            AccountRef::Id | AccountRef::Owner => None,
        }
    }

    fn account_list(&self, field: AccountList) -> &[AccountId] {
        match field {
            AccountList::Editors => &self.editor_ids,
        }
    }

    fn flag(&self, field: Flag) -> bool {
        match field {
            Flag::Public => self.public,
        }
    }
}
