//! Service wiring: in-memory stores, token table and the policy dispatcher.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};

use clubroster_auth::{grants, Account, Event, Permission, PermissionGrant, PhoneNumber};
use clubroster_core::{AccountId, DomainError, EventId, PhoneId};
use clubroster_infra::{
    InMemoryStore, PolicyDispatcher, ResourceResolver, ResourceServices, StoreError,
};

use crate::middleware::{AuthState, StaticTokens};

/// Tokens of the demo members created by [`AppServices::seed_demo`].
pub const DEMO_ADMIN_TOKEN: &str = "demo-admin";
pub const DEMO_MEMBER_TOKEN: &str = "demo-member";

pub struct AppServices {
    pub accounts: Arc<InMemoryStore<Account>>,
    pub phone_numbers: Arc<InMemoryStore<PhoneNumber>>,
    pub grants: Arc<InMemoryStore<PermissionGrant>>,
    pub events: Arc<InMemoryStore<Event>>,
    pub tokens: Arc<StaticTokens>,
    pub dispatcher: PolicyDispatcher,
}

impl AppServices {
    pub fn new(resolve_timeout: Duration) -> Self {
        let accounts: Arc<InMemoryStore<Account>> = Arc::new(InMemoryStore::new());
        let phone_numbers: Arc<InMemoryStore<PhoneNumber>> = Arc::new(InMemoryStore::new());
        let grants: Arc<InMemoryStore<PermissionGrant>> = Arc::new(InMemoryStore::new());
        let events: Arc<InMemoryStore<Event>> = Arc::new(InMemoryStore::new());

        let resolver = ResourceResolver::new(ResourceServices {
            accounts: accounts.clone(),
            phone_numbers: phone_numbers.clone(),
            grants: grants.clone(),
            events: events.clone(),
        });

        Self {
            accounts,
            phone_numbers,
            grants,
            events,
            tokens: Arc::new(StaticTokens::new()),
            dispatcher: PolicyDispatcher::new(resolver).with_resolve_timeout(resolve_timeout),
        }
    }

    pub fn auth_state(&self) -> AuthState {
        AuthState {
            authenticator: self.tokens.clone(),
            accounts: self.accounts.clone(),
            grants: self.grants.clone(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accounts
    // ─────────────────────────────────────────────────────────────────────────

    /// Create an active account; usernames are unique.
    pub fn register_account(
        &self,
        username: String,
        first_name: String,
        last_name: String,
        email: Option<String>,
    ) -> Result<Account, StoreError> {
        if self.accounts.list()?.iter().any(|a| a.username == username) {
            return Err(DomainError::conflict(format!("username '{username}' is taken")).into());
        }

        let account = Account {
            id: AccountId::new(),
            username,
            first_name,
            last_name,
            email,
            active: true,
        };
        self.accounts.upsert(account.clone())?;
        tracing::info!(account = %account.id, username = %account.username, "account registered");
        Ok(account)
    }

    /// Remove an account with its phone numbers, grants and tokens.
    ///
    /// Events it created stay; they are club history.
    pub fn delete_account(&self, id: AccountId) -> Result<(), StoreError> {
        if self.accounts.remove(id)?.is_none() {
            return Err(DomainError::not_found().into());
        }
        let phones = self.phone_numbers.remove_owned(id)?;
        let grants = self.grants.remove_owned(id)?;
        self.tokens.revoke_account(id);
        tracing::info!(account = %id, phones, grants, "account deleted");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Demo data
    // ─────────────────────────────────────────────────────────────────────────

    /// Two members and one event: an administrator holding every grant
    /// (`demo-admin`) and a member without grants (`demo-member`) who is an
    /// editor of the admin's event.
    pub fn seed_demo(&self) -> Result<(), StoreError> {
        let admin = self.register_account(
            "admin".to_string(),
            "Club".to_string(),
            "Admin".to_string(),
            Some("admin@example.org".to_string()),
        )?;
        self.grants
            .set_grants(admin.id, grants::known_names().map(Permission::new))?;
        self.tokens.insert(DEMO_ADMIN_TOKEN, admin.id);

        let member = self.register_account(
            "mmustermann".to_string(),
            "Manfred".to_string(),
            "Mustermann".to_string(),
            None,
        )?;
        self.phone_numbers.upsert(PhoneNumber {
            id: PhoneId::new(),
            owner_id: member.id,
            number: "+49 40 1234567".to_string(),
            description: Some("mobile".to_string()),
        })?;
        self.tokens.insert(DEMO_MEMBER_TOKEN, member.id);

        let starts_at = Utc::now() + ChronoDuration::days(7);
        self.events.create_event(Event {
            id: EventId::new(),
            title: "Spring paddle tour".to_string(),
            description: Some("Meet at the boathouse".to_string()),
            starts_at,
            ends_at: starts_at + ChronoDuration::hours(5),
            public: true,
            creator_id: admin.id,
            editor_ids: vec![member.id],
        })?;

        tracing::info!("demo data seeded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clubroster_auth::compile;

    use super::*;
    use crate::middleware::Authenticator;

    fn services() -> AppServices {
        AppServices::new(Duration::from_secs(1))
    }

    #[test]
    fn usernames_are_unique() {
        let s = services();
        s.register_account("anna".into(), "Anna".into(), "A".into(), None)
            .unwrap();
        let err = s
            .register_account("anna".into(), "Anna".into(), "B".into(), None)
            .unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::Conflict(_))));
    }

    #[test]
    fn deleting_an_account_cascades_to_owned_records() {
        let s = services();
        s.seed_demo().unwrap();
        let admin = s.tokens.authenticate(DEMO_ADMIN_TOKEN).unwrap();

        s.delete_account(admin).unwrap();

        assert!(s.grants.list_owned(admin).unwrap().is_empty());
        assert_eq!(s.tokens.authenticate(DEMO_ADMIN_TOKEN), None);
        assert_eq!(s.events.list().unwrap().len(), 1);
        assert!(matches!(
            s.delete_account(admin),
            Err(StoreError::Domain(DomainError::NotFound))
        ));
    }

    #[test]
    fn demo_admin_holds_every_known_grant() {
        let s = services();
        s.seed_demo().unwrap();
        let admin = s.tokens.authenticate(DEMO_ADMIN_TOKEN).unwrap();

        let names: Vec<_> =
            s.grants.list_owned(admin).unwrap().into_iter().map(|g| g.name).collect();
        assert_eq!(names.len(), grants::known_names().count());
        let ruleset = compile(&clubroster_auth::Principal::new(admin, names));
        assert!(ruleset.can_named("delete", "account"));
    }
}
