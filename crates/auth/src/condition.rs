//! Rule conditions over resource attributes.
//!
//! Account references are compared against the principal's own account id.
//! Boolean flags of a resource (an event being public) are checked as-is.

use clubroster_core::AccountId;

/// Scalar account-reference field of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountRef {
    /// The account's own id.
    Id,
    /// Owning account of a phone number or permission grant.
    Owner,
    /// Account that created an event.
    Creator,
}

/// List-valued account-reference field of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountList {
    Editors,
}

/// Boolean field of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    /// Event visible to every member.
    Public,
}

/// Read access to the fields a condition can inspect.
///
/// A field a resource does not have reads as `None`, an empty list or
/// `false`, which never satisfies a condition.
pub trait Attributes {
    fn account_ref(&self, field: AccountRef) -> Option<AccountId>;

    fn account_list(&self, _field: AccountList) -> &[AccountId] {
        &[]
    }

    fn flag(&self, _field: Flag) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// `field == account` on a single instance.
    Equals { field: AccountRef, account: AccountId },
    /// `account ∈ field` on a single instance.
    Contains { field: AccountList, account: AccountId },
    /// `field == true` on a single instance.
    IsSet(Flag),
    /// Every element of a collection satisfies the inner condition.
    ///
    /// Vacuously true for an empty collection.
    Every(Box<Condition>),
}

impl Condition {
    pub fn equals(field: AccountRef, account: AccountId) -> Self {
        Self::Equals { field, account }
    }

    pub fn contains(field: AccountList, account: AccountId) -> Self {
        Self::Contains { field, account }
    }

    pub fn every(inner: Condition) -> Self {
        Self::Every(Box::new(inner))
    }

    pub fn is_set(field: Flag) -> Self {
        Self::IsSet(field)
    }

    /// Evaluate against a single instance. Quantified conditions never hold here.
    pub fn holds_for<A: Attributes + ?Sized>(&self, instance: &A) -> bool {
        match self {
            Condition::Equals { field, account } => instance.account_ref(*field) == Some(*account),
            Condition::Contains { field, account } => {
                instance.account_list(*field).contains(account)
            }
            Condition::IsSet(field) => instance.flag(*field),
            Condition::Every(_) => false,
        }
    }

    /// Evaluate against a homogeneous collection. Only quantified conditions hold here.
    pub fn holds_for_all<'a, A, I>(&self, elements: I) -> bool
    where
        A: Attributes + 'a,
        I: IntoIterator<Item = &'a A>,
    {
        match self {
            Condition::Every(inner) => elements.into_iter().all(|e| inner.holds_for(e)),
            Condition::Equals { .. } | Condition::Contains { .. } | Condition::IsSet(_) => false,
        }
    }
}
