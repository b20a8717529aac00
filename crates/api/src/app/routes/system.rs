use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use clubroster_auth::{compile, PolicyCheck};

use crate::app::{dto, services::AppServices};
use crate::authz;
use crate::context::PrincipalContext;

/// Authentication only.
const AUTHENTICATED: &[PolicyCheck] = &[];

pub fn router() -> Router {
    Router::new()
        .route("/me", get(whoami))
        .route("/me/can", get(can))
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /me - The authenticated principal and its grants
pub async fn whoami(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> Response {
    if let Err(denied) =
        authz::guard(&services.dispatcher, &ctx, AUTHENTICATED, &HashMap::new()).await
    {
        return denied;
    }
    let Some(principal) = ctx.principal() else {
        return authz::denial_to_response(clubroster_infra::Denial::Unauthenticated);
    };

    (StatusCode::OK, Json(dto::principal_to_json(principal))).into_response()
}

/// GET /me/can?action=..&resource=.. - Type-level self check
///
/// Unknown action or resource names answer `false`, never an error.
pub async fn can(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Query(query): Query<dto::CanQuery>,
) -> Response {
    if let Err(denied) =
        authz::guard(&services.dispatcher, &ctx, AUTHENTICATED, &HashMap::new()).await
    {
        return denied;
    }
    let Some(principal) = ctx.principal() else {
        return authz::denial_to_response(clubroster_infra::Denial::Unauthenticated);
    };

    let allowed = compile(principal).can_named(&query.action, &query.resource);
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "action": query.action,
            "resource": query.resource,
            "allowed": allowed,
        })),
    )
        .into_response()
}
