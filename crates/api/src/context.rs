use clubroster_auth::Principal;

/// Principal context for a request.
///
/// Always present on protected routes; `principal()` is `None` when the
/// request carried no valid bearer token. Denying such requests is the
/// policy guard's job, not the middleware's.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrincipalContext {
    principal: Option<Principal>,
}

impl PrincipalContext {
    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }
}
