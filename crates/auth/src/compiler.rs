//! Ruleset compilation.
//!
//! `compile` is a pure fold: grant rows from the table, in grant order,
//! followed by the self-service rules every member gets.

use clubroster_core::AccountId;

use crate::{
    condition::{AccountList, AccountRef, Flag},
    Action, Condition, Principal, ResourceType, Rule, RuleSource, Ruleset,
};

/// Compile the ruleset for `principal`.
///
/// - No IO
/// - No panics
/// - Unknown grant names produce no rules
pub fn compile(principal: &Principal) -> Ruleset {
    let mut rules = Vec::new();

    for grant in principal.grants() {
        let Some(def) = grant.definition() else {
            tracing::debug!(grant = %grant, principal = %principal.id(), "ignoring unknown grant");
            continue;
        };
        rules.extend(
            def.rules
                .iter()
                .map(|r| Rule::new(r.actions, r.resources, RuleSource::Grant(grant.clone()))),
        );
    }

    rules.extend(self_service_rules(principal.id()));

    tracing::trace!(principal = %principal.id(), rules = rules.len(), "compiled ruleset");
    Ruleset::new(principal.id(), rules)
}

fn self_service_rules(me: AccountId) -> Vec<Rule> {
    use Action::*;
    use ResourceType as T;

    let own = |field| Condition::equals(field, me);
    let all_own = |field| Condition::every(Condition::equals(field, me));
    let rule = |actions: &[Action], resources: &[ResourceType]| {
        Rule::new(actions, resources, RuleSource::SelfService)
    };

    vec![
        rule(&[Read, Update, Delete], &[T::Account]).when(own(AccountRef::Id)),
        rule(&[Read], &[T::PermissionGrant]).when(own(AccountRef::Owner)),
        rule(&[Read], &[T::PermissionGrantCollection]).when(all_own(AccountRef::Owner)),
        rule(&[Manage], &[T::PhoneNumber]).when(own(AccountRef::Owner)),
        rule(&[Manage], &[T::PhoneNumberCollection]).when(all_own(AccountRef::Owner)),
        rule(&[Manage], &[T::Event]).when(own(AccountRef::Creator)),
        rule(&[Manage], &[T::EventCollection]).when(all_own(AccountRef::Creator)),
        rule(&[Read, Update], &[T::Event]).when(Condition::contains(AccountList::Editors, me)),
        rule(&[Read], &[T::Event]).when(Condition::is_set(Flag::Public)),
        rule(&[List], &[T::Event]),
    ]
}
