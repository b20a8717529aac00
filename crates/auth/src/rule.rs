use clubroster_core::AccountId;

use crate::{Action, Condition, Permission, ResourceType};

/// Where a compiled rule came from. Internal diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    Grant(Permission),
    SelfService,
}

impl core::fmt::Display for RuleSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RuleSource::Grant(p) => write!(f, "grant:{p}"),
            RuleSource::SelfService => f.write_str("self-service"),
        }
    }
}

/// One allow rule: (actions, resource types, optional condition).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    actions: Vec<Action>,
    resources: Vec<ResourceType>,
    condition: Option<Condition>,
    source: RuleSource,
}

impl Rule {
    pub fn new(actions: &[Action], resources: &[ResourceType], source: RuleSource) -> Self {
        Self {
            actions: actions.to_vec(),
            resources: resources.to_vec(),
            condition: None,
            source,
        }
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn resources(&self) -> &[ResourceType] {
        &self.resources
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn source(&self) -> &RuleSource {
        &self.source
    }

    /// Action and type match, ignoring the condition.
    pub fn applies_to(&self, action: Action, resource_type: ResourceType) -> bool {
        self.actions.iter().any(|a| a.covers(action))
            && self.resources.iter().any(|r| r.covers(resource_type))
    }
}

/// The compiled rules of one principal for one evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ruleset {
    principal_id: AccountId,
    rules: Vec<Rule>,
}

impl Ruleset {
    pub(crate) fn new(principal_id: AccountId, rules: Vec<Rule>) -> Self {
        Self {
            principal_id,
            rules,
        }
    }

    pub fn principal_id(&self) -> AccountId {
        self.principal_id
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
