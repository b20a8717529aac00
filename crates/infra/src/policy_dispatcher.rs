//! Request-time policy dispatch.
//!
//! The dispatcher is the single place a protected operation is authorized.
//! Per invocation it runs this pipeline:
//!
//! ```text
//! principal? + declared checks + request params
//!   ↓
//! 1. No principal → deny (Unauthenticated), nothing is resolved
//!   ↓
//! 2. Compile the principal's ruleset (once, reused by every check)
//!   ↓
//! 3. Resolve every instance-level check concurrently, each under a timeout
//!   ↓
//! 4. Evaluate each (action, type, subject) against the ruleset
//!   ↓
//! 5. Allow only if every check passed (logical AND)
//! ```
//!
//! ## Failure handling
//!
//! - A resolution failure fails its check; it is never retried.
//! - Missing request parameters point at a broken declaration and are logged
//!   at `error`, everything else at `warn`.
//! - The denial category is for logs and tests. Callers only ever learn
//!   allow or deny.
//!
//! This module holds no state beyond the resolver and the timeout, so one
//! dispatcher is shared by all requests.

use std::time::Duration;

use futures::future::join_all;
use thiserror::Error;

use clubroster_auth::{compile, PolicyCheck, Principal, RequestParams, Ruleset};

use crate::resolver::{ResolveError, Resolved, ResourceResolver};

/// Upper bound for one resolution when nothing else is configured.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(2);

/// Why a request was denied. Internal only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("no authenticated principal")]
    Unauthenticated,

    /// The ruleset has no rule allowing the check.
    #[error("check #{index} not permitted: {check:?}")]
    NotPermitted { index: usize, check: PolicyCheck },

    #[error("check #{index} failed to resolve its subject: {source}")]
    ResolutionFailed {
        index: usize,
        #[source]
        source: ResolveError,
    },

    /// The declaration names parameters the request never carries.
    #[error("check #{index} is misconfigured: {source}")]
    MisconfiguredPolicy {
        index: usize,
        #[source]
        source: ResolveError,
    },
}

#[derive(Clone)]
pub struct PolicyDispatcher {
    resolver: ResourceResolver,
    resolve_timeout: Duration,
}

impl PolicyDispatcher {
    pub fn new(resolver: ResourceResolver) -> Self {
        Self {
            resolver,
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
        }
    }

    pub fn with_resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = timeout;
        self
    }

    /// Allow or deny. See [`PolicyDispatcher::decide`] for the reason.
    pub async fn authorize(
        &self,
        principal: Option<&Principal>,
        checks: &[PolicyCheck],
        params: &RequestParams,
    ) -> bool {
        self.decide(principal, checks, params).await.is_ok()
    }

    /// Run every declared check and report the first denial in declaration order.
    pub async fn decide(
        &self,
        principal: Option<&Principal>,
        checks: &[PolicyCheck],
        params: &RequestParams,
    ) -> Result<(), Denial> {
        let Some(principal) = principal else {
            tracing::debug!(checks = checks.len(), "denied: unauthenticated");
            return Err(Denial::Unauthenticated);
        };

        let ruleset = compile(principal);

        let resolutions = join_all(checks.iter().map(|check| self.resolve(check, params))).await;

        for (index, (check, resolution)) in checks.iter().zip(resolutions).enumerate() {
            evaluate(&ruleset, principal, index, check, resolution)?;
        }

        tracing::debug!(principal = %principal.id(), checks = checks.len(), "authorized");
        Ok(())
    }

    /// `Ok(None)` for type-level checks; they need no subject.
    async fn resolve(
        &self,
        check: &PolicyCheck,
        params: &RequestParams,
    ) -> Result<Option<Resolved>, ResolveError> {
        let PolicyCheck::Instance {
            category,
            id_param,
            owner_param,
            ..
        } = *check
        else {
            return Ok(None);
        };

        let fetch = self.resolver.resolve(category, id_param, owner_param, params);
        match tokio::time::timeout(self.resolve_timeout, fetch).await {
            Ok(resolved) => resolved.map(Some),
            Err(_) => Err(ResolveError::Timeout(self.resolve_timeout)),
        }
    }
}

fn evaluate(
    ruleset: &Ruleset,
    principal: &Principal,
    index: usize,
    check: &PolicyCheck,
    resolution: Result<Option<Resolved>, ResolveError>,
) -> Result<(), Denial> {
    let resolved = match resolution {
        Ok(resolved) => resolved,
        Err(source) if source.is_configuration_defect() => {
            tracing::error!(
                principal = %principal.id(),
                index,
                check = ?check,
                error = %source,
                "policy declaration does not match the request parameters"
            );
            return Err(Denial::MisconfiguredPolicy { index, source });
        }
        Err(source) => {
            tracing::warn!(
                principal = %principal.id(),
                index,
                check = ?check,
                error = %source,
                "denied: subject could not be resolved"
            );
            return Err(Denial::ResolutionFailed { index, source });
        }
    };

    let (action, resource_type, subject) = match (check, &resolved) {
        (PolicyCheck::Static { action, resource }, _) => (*action, *resource, None),
        (PolicyCheck::Instance { action, .. }, Some(resolved)) => {
            let subject = resolved.subject();
            (*action, subject.resource_type(), Some(subject))
        }
        (PolicyCheck::Instance { .. }, None) => {
            return Err(Denial::NotPermitted { index, check: *check });
        }
    };

    match ruleset.explain(action, resource_type, subject) {
        Some(source) => {
            tracing::debug!(
                principal = %principal.id(),
                index,
                action = %action,
                resource = %resource_type,
                rule = %source,
                "check passed"
            );
            Ok(())
        }
        None => {
            tracing::info!(
                principal = %principal.id(),
                index,
                action = %action,
                resource = %resource_type,
                "denied: no matching rule"
            );
            Err(Denial::NotPermitted { index, check: *check })
        }
    }
}
