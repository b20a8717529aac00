//! API-side authorization guard.
//!
//! Every protected handler calls [`guard`] before touching a store. The
//! dispatcher decides; this module only turns the decision into HTTP.

use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::Response;

use clubroster_auth::{PolicyCheck, RequestParams};
use clubroster_infra::{Denial, PolicyDispatcher};

use crate::app::errors;
use crate::context::PrincipalContext;

/// Authorize the request against the route's declared checks.
///
/// `path` holds the route's path parameters; they are the only identifiers
/// the resolver reads. Denials carry no detail beyond 401 or 403.
pub async fn guard(
    dispatcher: &PolicyDispatcher,
    context: &PrincipalContext,
    checks: &'static [PolicyCheck],
    path: &HashMap<String, String>,
) -> Result<(), Response> {
    let params: RequestParams = path.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

    dispatcher
        .decide(context.principal(), checks, &params)
        .await
        .map_err(denial_to_response)
}

pub fn denial_to_response(denial: Denial) -> Response {
    match denial {
        Denial::Unauthenticated => {
            errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", "authentication required")
        }
        Denial::NotPermitted { .. }
        | Denial::ResolutionFailed { .. }
        | Denial::MisconfiguredPolicy { .. } => {
            errors::json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden")
        }
    }
}
