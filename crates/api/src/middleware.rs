//! Bearer-token middleware: token → account → principal with current grants.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use clubroster_auth::{Account, Principal};
use clubroster_core::AccountId;
use clubroster_infra::{PermissionGrantStore, ResourceService, StoreError};

use crate::app::errors;
use crate::context::PrincipalContext;

/// Maps an opaque bearer token to the account it was issued for.
///
/// Issuing and verifying tokens is outside this service; this is the seam a
/// real identity provider plugs into.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, token: &str) -> Option<AccountId>;
}

/// Fixed token table for tests/dev.
#[derive(Debug, Default)]
pub struct StaticTokens {
    inner: RwLock<HashMap<String, AccountId>>,
}

impl StaticTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, token: impl Into<String>, account: AccountId) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(token.into(), account);
        }
    }

    /// Drop every token issued for `account`.
    pub fn revoke_account(&self, account: AccountId) {
        if let Ok(mut map) = self.inner.write() {
            map.retain(|_, a| *a != account);
        }
    }
}

impl Authenticator for StaticTokens {
    fn authenticate(&self, token: &str) -> Option<AccountId> {
        self.inner.read().ok()?.get(token).copied()
    }
}

#[derive(Clone)]
pub struct AuthState {
    pub authenticator: Arc<dyn Authenticator>,
    pub accounts: Arc<dyn ResourceService<Account>>,
    pub grants: Arc<dyn PermissionGrantStore>,
}

/// Attach a [`PrincipalContext`] to every request.
///
/// Missing, malformed or unknown tokens and inactive accounts yield an
/// anonymous context. Only an unreachable store fails the request (503).
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    // Owned: the request body is not Sync, so nothing borrowed from it may cross an await.
    let token = extract_bearer(req.headers()).map(str::to_owned);

    let context = match token {
        Some(token) => match load_principal(&state, &token).await {
            Ok(Some(principal)) => PrincipalContext::authenticated(principal),
            Ok(None) => PrincipalContext::anonymous(),
            Err(e) => {
                tracing::error!(error = %e, "cannot build principal");
                return errors::json_error(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "unavailable",
                    "service temporarily unavailable",
                );
            }
        },
        None => PrincipalContext::anonymous(),
    };

    req.extensions_mut().insert(context);
    next.run(req).await
}

async fn load_principal(state: &AuthState, token: &str) -> Result<Option<Principal>, StoreError> {
    let Some(account_id) = state.authenticator.authenticate(token) else {
        tracing::debug!("unknown bearer token");
        return Ok(None);
    };

    let account = match state.accounts.get_by_id(account_id).await? {
        Some(account) if account.active => account,
        _ => {
            tracing::debug!(account = %account_id, "token for missing or inactive account");
            return Ok(None);
        }
    };

    let grants = state.grants.grant_names(account_id).await?;
    Ok(Some(Principal::new(account_id, grants).with_username(account.username)))
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let token = header.to_str().ok()?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn bearer_token_is_extracted_and_trimmed() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer  abc "),
        );
        assert_eq!(extract_bearer(&headers), Some("abc"));

        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Basic abc"),
        );
        assert_eq!(extract_bearer(&headers), None);
    }

    #[test]
    fn static_tokens_revoke_per_account() {
        let tokens = StaticTokens::new();
        let a = AccountId::new();
        let b = AccountId::new();
        tokens.insert("t-a1", a);
        tokens.insert("t-a2", a);
        tokens.insert("t-b", b);

        tokens.revoke_account(a);

        assert_eq!(tokens.authenticate("t-a1"), None);
        assert_eq!(tokens.authenticate("t-a2"), None);
        assert_eq!(tokens.authenticate("t-b"), Some(b));
    }
}
