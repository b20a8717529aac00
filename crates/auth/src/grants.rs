//! Declarative grant table: permission grant name → allowed (actions, types).
//!
//! Adding a grant means adding a row here; neither the compiler nor the
//! evaluator changes. No row may target [`ResourceType::All`].

use crate::{Action, ResourceType};

pub const READ_ACCOUNT: &str = "read-account";
pub const ADD_ACCOUNT: &str = "add-account";
pub const UPDATE_ACCOUNT: &str = "update-account";
pub const DELETE_ACCOUNT: &str = "delete-account";
pub const READ_PERMISSION: &str = "read-permission";
pub const MANAGE_PERMISSION: &str = "manage-permission";
pub const READ_EVENT: &str = "read-event";
pub const UPDATE_EVENT: &str = "update-event";
pub const DELETE_EVENT: &str = "delete-event";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrantRule {
    pub actions: &'static [Action],
    pub resources: &'static [ResourceType],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrantDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub rules: &'static [GrantRule],
}

use Action::*;
use ResourceType as T;

pub static GRANT_TABLE: &[GrantDefinition] = &[
    GrantDefinition {
        name: READ_ACCOUNT,
        description: "View and list every member account",
        rules: &[GrantRule {
            actions: &[Read, List],
            resources: &[T::Account],
        }],
    },
    GrantDefinition {
        name: ADD_ACCOUNT,
        description: "Create member accounts and their phone numbers",
        rules: &[GrantRule {
            actions: &[Create],
            resources: &[T::Account, T::PhoneNumber],
        }],
    },
    GrantDefinition {
        name: UPDATE_ACCOUNT,
        description: "Update any member account and its phone numbers",
        rules: &[GrantRule {
            actions: &[Update],
            resources: &[T::Account, T::PhoneNumber, T::PhoneNumberCollection],
        }],
    },
    GrantDefinition {
        name: DELETE_ACCOUNT,
        description: "Delete any member account and its phone numbers",
        rules: &[GrantRule {
            actions: &[Delete],
            resources: &[T::Account, T::PhoneNumber, T::PhoneNumberCollection],
        }],
    },
    GrantDefinition {
        name: READ_PERMISSION,
        description: "View the permission grants of every member",
        rules: &[GrantRule {
            actions: &[Read],
            resources: &[T::PermissionGrant, T::PermissionGrantCollection],
        }],
    },
    GrantDefinition {
        name: MANAGE_PERMISSION,
        description: "Grant, revoke and view permissions of every member",
        rules: &[GrantRule {
            actions: &[Manage],
            resources: &[T::PermissionGrant, T::PermissionGrantCollection],
        }],
    },
    GrantDefinition {
        name: READ_EVENT,
        description: "View every event, public or not",
        rules: &[GrantRule {
            actions: &[Read, List],
            resources: &[T::Event, T::EventCollection],
        }],
    },
    GrantDefinition {
        name: UPDATE_EVENT,
        description: "Update every event",
        rules: &[GrantRule {
            actions: &[Update],
            resources: &[T::Event],
        }],
    },
    GrantDefinition {
        name: DELETE_EVENT,
        description: "Delete every event",
        rules: &[GrantRule {
            actions: &[Delete],
            resources: &[T::Event],
        }],
    },
];

pub fn lookup(name: &str) -> Option<&'static GrantDefinition> {
    GRANT_TABLE.iter().find(|g| g.name == name)
}

pub fn known_names() -> impl Iterator<Item = &'static str> {
    GRANT_TABLE.iter().map(|g| g.name)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn no_grant_targets_the_wildcard_type() {
        for def in GRANT_TABLE {
            for rule in def.rules {
                assert!(
                    !rule.resources.contains(&ResourceType::All),
                    "{} targets all",
                    def.name
                );
            }
        }
    }

    #[test]
    fn grant_names_are_unique() {
        let names: HashSet<_> = known_names().collect();
        assert_eq!(names.len(), GRANT_TABLE.len());
    }

    #[test]
    fn event_creation_is_not_grant_gated() {
        let gated = GRANT_TABLE
            .iter()
            .flat_map(|def| def.rules)
            .any(|rule| rule.actions.contains(&Create) && rule.resources.contains(&T::Event));

        assert!(!gated);
        assert!(lookup("create-event").is_none());
    }

    #[test]
    fn lookup_is_exact() {
        assert_eq!(lookup(READ_ACCOUNT).map(|g| g.name), Some(READ_ACCOUNT));
        assert!(lookup("READ-ACCOUNT").is_none());
        assert!(lookup("").is_none());
    }
}
