use std::collections::HashSet;

use clubroster_core::AccountId;

use crate::Permission;

/// The authenticated actor of a request.
///
/// Rebuilt per request from the account id and its current grants. Grant
/// order is preserved and duplicates are dropped on construction, so two
/// principals built from the same grant list compile to the same ruleset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    id: AccountId,
    username: Option<String>,
    grants: Vec<Permission>,
}

impl Principal {
    pub fn new(id: AccountId, grants: impl IntoIterator<Item = Permission>) -> Self {
        let mut seen = HashSet::new();
        let grants = grants
            .into_iter()
            .filter(|g| seen.insert(g.clone()))
            .collect();

        Self {
            id,
            username: None,
            grants,
        }
    }

    /// Principal without any grants (self-service rules only).
    pub fn without_grants(id: AccountId) -> Self {
        Self::new(id, [])
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn grants(&self) -> &[Permission] {
        &self.grants
    }
}
