//! Resource resolution for instance-level policy checks.
//!
//! Maps the identifiers of a request to the concrete instance or collection a
//! check is evaluated against:
//!
//! ```text
//! id parameter present      → single instance (get_by_id)
//! else owner parameter      → collection owned by that account (list_by_owner)
//! else                      → MissingParameter (misconfigured policy)
//! ```
//!
//! Every failure is reported as a `ResolveError`; turning it into a denial
//! is the dispatcher's job.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use clubroster_auth::{
    Account, Event, PhoneNumber, RequestParams, Resource, ResourceCategory, ResourceCollection,
    Subject,
};
use clubroster_core::{AccountId, DomainError, EventId, PermissionId, PhoneId};

use crate::store::{PermissionGrantStore, ResourceService, StoreError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The check needs an instance but the request carries none of its parameters.
    #[error("no identifying parameter for {category} (expected one of {expected:?})")]
    MissingParameter {
        category: ResourceCategory,
        expected: Vec<&'static str>,
    },

    #[error("invalid identifier in parameter '{param}': {source}")]
    InvalidIdentifier {
        param: &'static str,
        #[source]
        source: DomainError,
    },

    #[error("{category} not found")]
    NotFound { category: ResourceCategory },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("resolution timed out after {0:?}")]
    Timeout(Duration),
}

impl ResolveError {
    /// Failures caused by the policy declaration rather than the request.
    pub fn is_configuration_defect(&self) -> bool {
        matches!(self, ResolveError::MissingParameter { .. })
    }
}

/// A resolved subject, owned so it can outlive the fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Instance(Resource),
    Collection(ResourceCollection),
}

impl Resolved {
    pub fn subject(&self) -> Subject<'_> {
        match self {
            Resolved::Instance(r) => Subject::Instance(r),
            Resolved::Collection(c) => Subject::Collection(c),
        }
    }
}

/// The resource services the resolver reads from, one per category.
#[derive(Clone)]
pub struct ResourceServices {
    pub accounts: Arc<dyn ResourceService<Account>>,
    pub phone_numbers: Arc<dyn ResourceService<PhoneNumber>>,
    pub grants: Arc<dyn PermissionGrantStore>,
    pub events: Arc<dyn ResourceService<Event>>,
}

enum Target<I> {
    One(I),
    OwnedBy(AccountId),
}

#[derive(Clone)]
pub struct ResourceResolver {
    services: ResourceServices,
}

impl ResourceResolver {
    pub fn new(services: ResourceServices) -> Self {
        Self { services }
    }

    /// Fetch what a check on `category` needs, reading ids from `params`.
    ///
    /// `id_param` / `owner_param` come from the check declaration; either may be absent.
    pub async fn resolve(
        &self,
        category: ResourceCategory,
        id_param: Option<&'static str>,
        owner_param: Option<&'static str>,
        params: &RequestParams,
    ) -> Result<Resolved, ResolveError> {
        let not_found = || ResolveError::NotFound { category };

        match category {
            ResourceCategory::Account => {
                let id = match target::<AccountId>(category, id_param, owner_param, params)? {
                    Target::One(id) | Target::OwnedBy(id) => id,
                };
                let account = self.services.accounts.get_by_id(id).await?.ok_or_else(not_found)?;
                Ok(Resolved::Instance(Resource::Account(account)))
            }
            ResourceCategory::PhoneNumber => {
                match target::<PhoneId>(category, id_param, owner_param, params)? {
                    Target::One(id) => {
                        let phone = self
                            .services
                            .phone_numbers
                            .get_by_id(id)
                            .await?
                            .ok_or_else(not_found)?;
                        Ok(Resolved::Instance(Resource::PhoneNumber(phone)))
                    }
                    Target::OwnedBy(owner) => {
                        let phones = self.services.phone_numbers.list_by_owner(owner).await?;
                        Ok(Resolved::Collection(ResourceCollection::PhoneNumbers(phones)))
                    }
                }
            }
            ResourceCategory::PermissionGrant => {
                match target::<PermissionId>(category, id_param, owner_param, params)? {
                    Target::One(id) => {
                        let grant =
                            self.services.grants.get_grant(id).await?.ok_or_else(not_found)?;
                        Ok(Resolved::Instance(Resource::PermissionGrant(grant)))
                    }
                    Target::OwnedBy(owner) => {
                        let grants = self.services.grants.list_grants(owner).await?;
                        Ok(Resolved::Collection(ResourceCollection::PermissionGrants(grants)))
                    }
                }
            }
            ResourceCategory::Event => {
                match target::<EventId>(category, id_param, owner_param, params)? {
                    Target::One(id) => {
                        let event =
                            self.services.events.get_by_id(id).await?.ok_or_else(not_found)?;
                        Ok(Resolved::Instance(Resource::Event(event)))
                    }
                    Target::OwnedBy(creator) => {
                        let events = self.services.events.list_by_owner(creator).await?;
                        Ok(Resolved::Collection(ResourceCollection::Events(events)))
                    }
                }
            }
        }
    }
}

/// Pick the target by precedence: specific id first, then owning account.
fn target<I>(
    category: ResourceCategory,
    id_param: Option<&'static str>,
    owner_param: Option<&'static str>,
    params: &RequestParams,
) -> Result<Target<I>, ResolveError>
where
    I: core::str::FromStr<Err = DomainError>,
{
    if let Some((name, raw)) = id_param.and_then(|n| params.get(n).map(|v| (n, v))) {
        return parse(name, raw).map(Target::One);
    }
    if let Some((name, raw)) = owner_param.and_then(|n| params.get(n).map(|v| (n, v))) {
        return parse(name, raw).map(Target::OwnedBy);
    }
    Err(ResolveError::MissingParameter {
        category,
        expected: id_param.into_iter().chain(owner_param).collect(),
    })
}

fn parse<I>(param: &'static str, raw: &str) -> Result<I, ResolveError>
where
    I: core::str::FromStr<Err = DomainError>,
{
    raw.parse()
        .map_err(|source| ResolveError::InvalidIdentifier { param, source })
}
