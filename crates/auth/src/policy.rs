//! Declared policy checks for protected operations.
//!
//! Each operation statically declares a list of [`PolicyCheck`]s. A check is
//! either a type-level requirement or an instance-level requirement whose
//! category tells the resolver what to fetch and from which request
//! parameters. The dispatcher reads these declarations at request time.

use std::collections::BTreeMap;

use crate::{Action, ResourceType};

/// Kind of resource an instance-level check resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceCategory {
    Account,
    PhoneNumber,
    PermissionGrant,
    Event,
}

impl ResourceCategory {
    /// Request parameter carrying the id of a single instance.
    pub const fn id_param(self) -> &'static str {
        match self {
            ResourceCategory::Account => "account_id",
            ResourceCategory::PhoneNumber => "phone_id",
            ResourceCategory::PermissionGrant => "permission_id",
            ResourceCategory::Event => "event_id",
        }
    }

    /// Request parameter carrying the owning account of a collection.
    ///
    /// Accounts own themselves, so the account category has none.
    pub const fn owner_param(self) -> Option<&'static str> {
        match self {
            ResourceCategory::Account => None,
            ResourceCategory::PhoneNumber
            | ResourceCategory::PermissionGrant
            | ResourceCategory::Event => Some("account_id"),
        }
    }

    pub const fn instance_type(self) -> ResourceType {
        match self {
            ResourceCategory::Account => ResourceType::Account,
            ResourceCategory::PhoneNumber => ResourceType::PhoneNumber,
            ResourceCategory::PermissionGrant => ResourceType::PermissionGrant,
            ResourceCategory::Event => ResourceType::Event,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceCategory::Account => "account",
            ResourceCategory::PhoneNumber => "phone-number",
            ResourceCategory::PermissionGrant => "permission-grant",
            ResourceCategory::Event => "event",
        }
    }
}

impl core::fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyCheck {
    /// Type-level check; no instance needed.
    Static { action: Action, resource: ResourceType },
    /// Instance-level check; the resolver supplies an instance or collection.
    Instance {
        action: Action,
        category: ResourceCategory,
        id_param: Option<&'static str>,
        owner_param: Option<&'static str>,
    },
}

impl PolicyCheck {
    pub const fn on_type(action: Action, resource: ResourceType) -> Self {
        Self::Static { action, resource }
    }

    /// Instance check reading the category's default parameters.
    pub const fn on_instance(action: Action, category: ResourceCategory) -> Self {
        Self::Instance {
            action,
            category,
            id_param: Some(category.id_param()),
            owner_param: category.owner_param(),
        }
    }

    /// Instance check that only resolves the owner's collection, even when a
    /// parameter named like the category's id is present.
    pub const fn on_owned_collection(action: Action, category: ResourceCategory) -> Self {
        Self::Instance {
            action,
            category,
            id_param: None,
            owner_param: category.owner_param(),
        }
    }
}

/// Named identifiers extracted from the request (path parameters).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams(BTreeMap<String, String>);

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
