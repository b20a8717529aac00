//! Ability evaluation against a compiled [`Ruleset`].
//!
//! A check passes when at least one rule matches the action (or `manage`) and
//! the type (or `all`), and that rule is unconditioned or its condition holds
//! for the subject. Rules only ever allow; there is no deny rule.

use crate::{
    Action, Condition, ResourceCollection, ResourceType, Rule, RuleSource, Ruleset, Subject,
};

/// Free-function form of [`Ruleset::can`].
pub fn can(
    ruleset: &Ruleset,
    action: Action,
    resource_type: ResourceType,
    subject: Option<Subject<'_>>,
) -> bool {
    ruleset.can(action, resource_type, subject)
}

impl Ruleset {
    /// Decide whether `action` on `resource_type` is allowed.
    ///
    /// Without a subject only unconditioned rules can allow. A subject whose
    /// own type tag differs from `resource_type` is denied outright.
    pub fn can(
        &self,
        action: Action,
        resource_type: ResourceType,
        subject: Option<Subject<'_>>,
    ) -> bool {
        self.matching_rule(action, resource_type, subject).is_some()
    }

    /// Type-level check without an instance.
    pub fn can_type(&self, action: Action, resource_type: ResourceType) -> bool {
        self.can(action, resource_type, None)
    }

    /// Instance-level check; the type is taken from the subject's tag.
    pub fn can_on<'a>(&self, action: Action, subject: impl Into<Subject<'a>>) -> bool {
        let subject = subject.into();
        self.can(action, subject.resource_type(), Some(subject))
    }

    /// Type-level check from untyped names. Unknown names are denied.
    pub fn can_named(&self, action: &str, resource_type: &str) -> bool {
        match (action.parse::<Action>(), resource_type.parse::<ResourceType>()) {
            (Ok(action), Ok(resource_type)) => self.can_type(action, resource_type),
            (action, resource_type) => {
                tracing::debug!(
                    action_error = ?action.err(),
                    resource_error = ?resource_type.err(),
                    "ability check with unknown names denied"
                );
                false
            }
        }
    }

    /// Provenance of the first rule that allows the check, for internal logs.
    pub fn explain(
        &self,
        action: Action,
        resource_type: ResourceType,
        subject: Option<Subject<'_>>,
    ) -> Option<&RuleSource> {
        self.matching_rule(action, resource_type, subject).map(|r| r.source())
    }

    fn matching_rule(
        &self,
        action: Action,
        resource_type: ResourceType,
        subject: Option<Subject<'_>>,
    ) -> Option<&Rule> {
        if let Some(s) = subject {
            if s.resource_type() != resource_type {
                tracing::debug!(
                    requested = %resource_type,
                    actual = %s.resource_type(),
                    "subject type does not match requested type"
                );
                return None;
            }
        }

        self.rules()
            .iter()
            .filter(|r| r.applies_to(action, resource_type))
            .find(|r| match (r.condition(), subject) {
                (None, _) => true,
                (Some(_), None) => false,
                (Some(c), Some(Subject::Instance(resource))) => c.holds_for(resource),
                (Some(c), Some(Subject::Collection(collection))) => {
                    holds_for_collection(c, collection)
                }
            })
    }
}

fn holds_for_collection(condition: &Condition, collection: &ResourceCollection) -> bool {
    match collection {
        ResourceCollection::PhoneNumbers(items) => condition.holds_for_all(items),
        ResourceCollection::PermissionGrants(items) => condition.holds_for_all(items),
        ResourceCollection::Events(items) => condition.holds_for_all(items),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use clubroster_core::{AccountId, EventId, PermissionId, PhoneId};

    use super::*;
    use crate::{
        compile, grants, Account, Event, Permission, PermissionGrant, PhoneNumber, Principal,
        Resource,
    };

    fn account(id: AccountId) -> Resource {
        Resource::Account(Account {
            id,
            username: "mmustermann".to_string(),
            first_name: "Manfred".to_string(),
            last_name: "Mustermann".to_string(),
            email: None,
            active: true,
        })
    }

    fn grant(owner_id: AccountId, name: &'static str) -> PermissionGrant {
        PermissionGrant {
            id: PermissionId::new(),
            name: Permission::new(name),
            owner_id,
        }
    }

    fn phone(owner_id: AccountId) -> PhoneNumber {
        PhoneNumber {
            id: PhoneId::new(),
            owner_id,
            number: "+49 40 123456".to_string(),
            description: Some("mobile".to_string()),
        }
    }

    fn event(creator_id: AccountId, editor_ids: Vec<AccountId>) -> Event {
        let starts_at = Utc::now();
        Event {
            id: EventId::new(),
            title: "Elbe tour".to_string(),
            description: None,
            starts_at,
            ends_at: starts_at + Duration::hours(4),
            public: true,
            creator_id,
            editor_ids,
        }
    }

    fn ruleset(me: AccountId, grant_names: &[&'static str]) -> Ruleset {
        compile(&Principal::new(me, grant_names.iter().map(|n| Permission::new(*n))))
    }

    #[test]
    fn member_can_read_update_delete_own_account_without_grants() {
        let me = AccountId::new();
        let rs = ruleset(me, &[]);
        let mine = account(me);

        assert!(rs.can_on(Action::Read, &mine));
        assert!(rs.can_on(Action::Update, &mine));
        assert!(rs.can_on(Action::Delete, &mine));
        assert!(!rs.can_on(Action::Create, &mine));
    }

    #[test]
    fn read_account_grant_covers_foreign_accounts() {
        let me = AccountId::new();
        let other = account(AccountId::new());

        assert!(ruleset(me, &[grants::READ_ACCOUNT]).can_on(Action::Read, &other));
        assert!(!ruleset(me, &[]).can_on(Action::Read, &other));
    }

    #[test]
    fn type_level_checks_only_use_unconditioned_rules() {
        let me = AccountId::new();
        let rs = ruleset(me, &[]);

        // Self-service read exists, but it is conditioned.
        assert!(!rs.can_type(Action::Read, ResourceType::Account));
        assert!(rs.can_type(Action::List, ResourceType::Event));
        assert!(ruleset(me, &[grants::READ_ACCOUNT]).can_type(Action::List, ResourceType::Account));
    }

    #[test]
    fn own_grants_readable_individually_and_as_collection() {
        let me = AccountId::new();
        let rs = ruleset(me, &[]);
        let single = Resource::PermissionGrant(grant(me, grants::READ_EVENT));
        let all_mine = ResourceCollection::PermissionGrants(vec![
            grant(me, grants::READ_EVENT),
            grant(me, grants::UPDATE_EVENT),
        ]);

        assert!(rs.can_on(Action::Read, &single));
        assert!(rs.can_on(Action::Read, &all_mine));
        assert!(!rs.can_on(Action::Delete, &all_mine));
    }

    #[test]
    fn one_foreign_grant_in_collection_denies_the_whole_read() {
        let me = AccountId::new();
        let rs = ruleset(me, &[]);
        let mixed = ResourceCollection::PermissionGrants(vec![
            grant(me, grants::READ_EVENT),
            grant(AccountId::new(), grants::READ_EVENT),
        ]);

        assert!(!rs.can_on(Action::Read, &mixed));
        assert!(ruleset(me, &[grants::READ_PERMISSION]).can_on(Action::Read, &mixed));
    }

    #[test]
    fn single_instance_rules_do_not_leak_onto_collections() {
        let me = AccountId::new();
        let rs = ruleset(me, &[]);
        let mine = ResourceCollection::PhoneNumbers(vec![phone(me)]);
        let subject = Some(Subject::Collection(&mine));

        // Requesting the element type with a collection subject is a type mismatch.
        assert!(!rs.can(Action::Read, ResourceType::PhoneNumber, subject));
        assert!(rs.can(Action::Read, ResourceType::PhoneNumberCollection, subject));
    }

    #[test]
    fn manage_on_own_phone_numbers_allows_every_action() {
        let me = AccountId::new();
        let rs = ruleset(me, &[]);
        let mine = Resource::PhoneNumber(phone(me));
        let theirs = Resource::PhoneNumber(phone(AccountId::new()));

        for action in Action::ALL {
            assert!(rs.can_on(action, &mine), "{action} on own phone");
            assert!(!rs.can_on(action, &theirs), "{action} on foreign phone");
        }
    }

    #[test]
    fn editors_may_update_but_not_delete() {
        let me = AccountId::new();
        let creator = AccountId::new();
        let rs = ruleset(me, &[]);
        let shared = Resource::Event(event(creator, vec![creator, me]));
        let foreign = Resource::Event(event(creator, vec![creator]));

        assert!(rs.can_on(Action::Update, &shared));
        assert!(rs.can_on(Action::Read, &shared));
        assert!(!rs.can_on(Action::Delete, &shared));
        assert!(!rs.can_on(Action::Update, &foreign));
        assert!(ruleset(me, &[grants::UPDATE_EVENT]).can_on(Action::Update, &foreign));
    }

    #[test]
    fn public_events_are_readable_by_every_member() {
        let me = AccountId::new();
        let rs = ruleset(me, &[]);
        let public = Resource::Event(event(AccountId::new(), vec![]));
        let private = Resource::Event(Event {
            public: false,
            ..event(AccountId::new(), vec![])
        });

        assert!(rs.can_on(Action::Read, &public));
        assert!(!rs.can_on(Action::Update, &public));
        assert!(!rs.can_on(Action::Read, &private));
        assert!(ruleset(me, &[grants::READ_EVENT]).can_on(Action::Read, &private));
    }

    #[test]
    fn creator_may_delete_own_event_only() {
        let me = AccountId::new();
        let rs = ruleset(me, &[]);
        let e1 = Resource::Event(event(me, vec![me]));
        let e2 = Resource::Event(event(AccountId::new(), vec![]));

        assert!(rs.can_on(Action::Delete, &e1));
        assert!(!rs.can_on(Action::Delete, &e2));
    }

    #[test]
    fn mismatched_subject_type_is_denied() {
        let me = AccountId::new();
        let rs = ruleset(me, &[grants::READ_ACCOUNT]);
        let mine = account(me);

        assert!(!rs.can(Action::Read, ResourceType::Event, Some(Subject::Instance(&mine))));
    }

    #[test]
    fn unknown_names_are_denied() {
        let rs = ruleset(AccountId::new(), &[grants::READ_ACCOUNT]);

        assert!(rs.can_named("list", "account"));
        assert!(!rs.can_named("launch", "account"));
        assert!(!rs.can_named("list", "spaceship"));
    }

    #[test]
    fn explain_names_the_allowing_rule() {
        let me = AccountId::new();
        let rs = ruleset(me, &[grants::READ_ACCOUNT]);
        let mine = account(me);

        assert_eq!(
            rs.explain(Action::Read, ResourceType::Account, Some(Subject::Instance(&mine))),
            Some(&RuleSource::Grant(Permission::new(grants::READ_ACCOUNT)))
        );
        assert_eq!(
            rs.explain(Action::Delete, ResourceType::Account, Some(Subject::Instance(&mine))),
            Some(&RuleSource::SelfService)
        );
        assert_eq!(rs.explain(Action::Create, ResourceType::Account, None), None);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn grant_names() -> impl Strategy<Value = Vec<&'static str>> {
            let known: Vec<&'static str> = grants::known_names().collect();
            proptest::collection::vec(proptest::sample::select(known), 0..8)
        }

        fn action() -> impl Strategy<Value = Action> {
            proptest::sample::select(Action::ALL.to_vec())
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: compilation is deterministic for unchanged grants.
            #[test]
            fn compile_is_deterministic(names in grant_names()) {
                let me = AccountId::new();
                prop_assert_eq!(ruleset(me, &names), ruleset(me, &names));
            }

            /// Property: wherever `manage` is allowed, every action is allowed.
            #[test]
            fn manage_dominates(
                names in grant_names(),
                requested in action(),
                own in any::<bool>(),
            ) {
                let me = AccountId::new();
                let rs = ruleset(me, &names);
                let owner = if own { me } else { AccountId::new() };
                let subject = Resource::PhoneNumber(phone(owner));

                if rs.can_on(Action::Manage, &subject) {
                    prop_assert!(rs.can_on(requested, &subject));
                }
            }

            /// Property: the own account is always readable, whatever the grants.
            #[test]
            fn own_account_always_readable(names in grant_names()) {
                let me = AccountId::new();
                prop_assert!(ruleset(me, &names).can_on(Action::Read, &account(me)));
            }

            /// Property: without grants, a grant collection is readable iff every element is own.
            #[test]
            fn grant_collection_quantifier(
                owned in proptest::collection::vec(any::<bool>(), 0..6),
            ) {
                let me = AccountId::new();
                let rs = ruleset(me, &[]);
                let items = owned
                    .iter()
                    .map(|mine| if *mine { me } else { AccountId::new() })
                    .map(|owner| grant(owner, grants::READ_EVENT))
                    .collect();
                let collection = ResourceCollection::PermissionGrants(items);

                prop_assert_eq!(rs.can_on(Action::Read, &collection), owned.iter().all(|m| *m));
            }
        }
    }
}
