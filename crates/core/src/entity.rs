//! Entity traits: identity and account ownership.

use crate::id::AccountId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Ord + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}

/// An entity that belongs to exactly one member account.
///
/// Accounts own themselves; events are owned by their creator.
pub trait Owned: Entity {
    fn owner_id(&self) -> AccountId;
}
