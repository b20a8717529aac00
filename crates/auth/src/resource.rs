//! Resource type tags and the typed subjects abilities are checked against.
//!
//! Classification is structural: every [`Resource`] variant and every
//! [`ResourceCollection`] variant carries exactly one [`ResourceType`].

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use clubroster_core::AccountId;

use crate::condition::{AccountList, AccountRef, Attributes};
use crate::model::{Account, Event, PermissionGrant, PhoneNumber};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceType {
    /// Wildcard type; never targeted by compiled rules, only matched.
    All,
    Account,
    PhoneNumber,
    PhoneNumberCollection,
    PermissionGrant,
    PermissionGrantCollection,
    Event,
    EventCollection,
}

impl ResourceType {
    pub const ALL: [ResourceType; 8] = [
        ResourceType::All,
        ResourceType::Account,
        ResourceType::PhoneNumber,
        ResourceType::PhoneNumberCollection,
        ResourceType::PermissionGrant,
        ResourceType::PermissionGrantCollection,
        ResourceType::Event,
        ResourceType::EventCollection,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::All => "all",
            ResourceType::Account => "account",
            ResourceType::PhoneNumber => "phone-number",
            ResourceType::PhoneNumberCollection => "phone-number-collection",
            ResourceType::PermissionGrant => "permission-grant",
            ResourceType::PermissionGrantCollection => "permission-grant-collection",
            ResourceType::Event => "event",
            ResourceType::EventCollection => "event-collection",
        }
    }

    /// Whether a rule targeting `self` applies to the `requested` type.
    pub fn covers(self, requested: ResourceType) -> bool {
        self == ResourceType::All || self == requested
    }

    pub fn is_collection(self) -> bool {
        matches!(
            self,
            ResourceType::PhoneNumberCollection
                | ResourceType::PermissionGrantCollection
                | ResourceType::EventCollection
        )
    }
}

impl core::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown resource type '{0}'")]
pub struct ParseResourceTypeError(pub String);

impl FromStr for ResourceType {
    type Err = ParseResourceTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseResourceTypeError(s.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Instances and collections
// ─────────────────────────────────────────────────────────────────────────────

/// A single protected resource instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Account(Account),
    PhoneNumber(PhoneNumber),
    PermissionGrant(PermissionGrant),
    Event(Event),
}

impl Resource {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            Resource::Account(_) => ResourceType::Account,
            Resource::PhoneNumber(_) => ResourceType::PhoneNumber,
            Resource::PermissionGrant(_) => ResourceType::PermissionGrant,
            Resource::Event(_) => ResourceType::Event,
        }
    }
}

impl Attributes for Resource {
    fn account_ref(&self, field: AccountRef) -> Option<AccountId> {
        match self {
            Resource::Account(a) => a.account_ref(field),
            Resource::PhoneNumber(p) => p.account_ref(field),
            Resource::PermissionGrant(g) => g.account_ref(field),
            Resource::Event(e) => e.account_ref(field),
        }
    }

    fn account_list(&self, field: AccountList) -> &[AccountId] {
        match self {
            Resource::Account(a) => a.account_list(field),
            Resource::PhoneNumber(p) => p.account_list(field),
            Resource::PermissionGrant(g) => g.account_list(field),
            Resource::Event(e) => e.account_list(field),
        }
    }
}

/// A homogeneous collection of instances owned by one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceCollection {
    PhoneNumbers(Vec<PhoneNumber>),
    PermissionGrants(Vec<PermissionGrant>),
    Events(Vec<Event>),
}

impl ResourceCollection {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            ResourceCollection::PhoneNumbers(_) => ResourceType::PhoneNumberCollection,
            ResourceCollection::PermissionGrants(_) => ResourceType::PermissionGrantCollection,
            ResourceCollection::Events(_) => ResourceType::EventCollection,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ResourceCollection::PhoneNumbers(v) => v.len(),
            ResourceCollection::PermissionGrants(v) => v.len(),
            ResourceCollection::Events(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What an ability is checked against: one instance or one collection.
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    Instance(&'a Resource),
    Collection(&'a ResourceCollection),
}

impl Subject<'_> {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            Subject::Instance(r) => r.resource_type(),
            Subject::Collection(c) => c.resource_type(),
        }
    }
}

impl<'a> From<&'a Resource> for Subject<'a> {
    fn from(value: &'a Resource) -> Self {
        Subject::Instance(value)
    }
}

impl<'a> From<&'a ResourceCollection> for Subject<'a> {
    fn from(value: &'a ResourceCollection) -> Self {
        Subject::Collection(value)
    }
}
