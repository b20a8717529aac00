//! Permission grant endpoints.
//!
//! Grants are addressed two ways: as the collection owned by an account
//! (`/accounts/:account_id/permissions`) or one row at a time
//! (`/permissions/:permission_id`). Collection checks quantify over every
//! grant in the collection.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use clubroster_auth::{
    grants, Action, Permission, PermissionGrant, PolicyCheck, ResourceCategory, ResourceType,
};
use clubroster_core::{AccountId, PermissionId};

use crate::app::{dto, errors, services::AppServices};
use crate::authz;
use crate::context::PrincipalContext;

// ─────────────────────────────────────────────────────────────────────────────
// Policies
// ─────────────────────────────────────────────────────────────────────────────

const READ_CATALOG: &[PolicyCheck] =
    &[PolicyCheck::on_type(Action::Read, ResourceType::PermissionGrant)];
const READ_GRANTS: &[PolicyCheck] =
    &[PolicyCheck::on_owned_collection(Action::Read, ResourceCategory::PermissionGrant)];
const REPLACE_GRANTS: &[PolicyCheck] =
    &[PolicyCheck::on_owned_collection(Action::Update, ResourceCategory::PermissionGrant)];
const REVOKE_GRANTS: &[PolicyCheck] =
    &[PolicyCheck::on_owned_collection(Action::Delete, ResourceCategory::PermissionGrant)];
const READ_GRANT: &[PolicyCheck] =
    &[PolicyCheck::on_instance(Action::Read, ResourceCategory::PermissionGrant)];
const REVOKE_GRANT: &[PolicyCheck] =
    &[PolicyCheck::on_instance(Action::Delete, ResourceCategory::PermissionGrant)];

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router {
    Router::new()
        .route("/permissions", get(list_catalog))
        .route(
            "/permissions/:permission_id",
            get(get_grant).delete(revoke_grant),
        )
        .route(
            "/accounts/:account_id/permissions",
            get(list_grants).put(replace_grants).delete(revoke_grants),
        )
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /permissions - List the grants this service knows
pub async fn list_catalog(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> Response {
    if let Err(denied) =
        authz::guard(&services.dispatcher, &ctx, READ_CATALOG, &HashMap::new()).await
    {
        return denied;
    }

    let catalog = grants::GRANT_TABLE.iter().map(|def| {
        serde_json::json!({
            "name": def.name,
            "description": def.description,
        })
    });
    (StatusCode::OK, Json(dto::items(catalog))).into_response()
}

/// GET /accounts/:account_id/permissions - Grants held by an account
pub async fn list_grants(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(path): Path<HashMap<String, String>>,
) -> Response {
    if let Err(denied) = authz::guard(&services.dispatcher, &ctx, READ_GRANTS, &path).await {
        return denied;
    }
    let owner: AccountId = match errors::path_id(&path, "account_id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.grants.list_owned(owner) {
        Ok(grants) => grants_response(&grants),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// PUT /accounts/:account_id/permissions - Replace the grants of an account
///
/// Unknown grant names are rejected as a whole; nothing is stored.
pub async fn replace_grants(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(path): Path<HashMap<String, String>>,
    Json(body): Json<dto::SetPermissionsRequest>,
) -> Response {
    if let Err(denied) = authz::guard(&services.dispatcher, &ctx, REPLACE_GRANTS, &path).await {
        return denied;
    }
    let owner: AccountId = match errors::path_id(&path, "account_id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let requested: Vec<Permission> = body.permissions.into_iter().map(Permission::from).collect();
    let unknown: Vec<&str> = requested
        .iter()
        .filter(|name| !name.is_known())
        .map(Permission::as_str)
        .collect();
    if !unknown.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "unknown_permission",
            format!("unknown permissions: {}", unknown.join(", ")),
        );
    }

    match services.accounts.get(owner) {
        Ok(Some(_)) => {}
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "account not found");
        }
        Err(e) => return errors::store_error_to_response(e),
    }

    match services.grants.set_grants(owner, requested) {
        Ok(grants) => grants_response(&grants),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// DELETE /accounts/:account_id/permissions - Revoke every grant of an account
pub async fn revoke_grants(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(path): Path<HashMap<String, String>>,
) -> Response {
    if let Err(denied) = authz::guard(&services.dispatcher, &ctx, REVOKE_GRANTS, &path).await {
        return denied;
    }
    let owner: AccountId = match errors::path_id(&path, "account_id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.grants.remove_owned(owner) {
        Ok(removed) => {
            tracing::info!(account = %owner, removed, "permission grants revoked");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /permissions/:permission_id - Fetch one grant
pub async fn get_grant(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(path): Path<HashMap<String, String>>,
) -> Response {
    if let Err(denied) = authz::guard(&services.dispatcher, &ctx, READ_GRANT, &path).await {
        return denied;
    }
    let id: PermissionId = match errors::path_id(&path, "permission_id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.grants.get(id) {
        Ok(Some(grant)) => (StatusCode::OK, Json(dto::grant_to_json(&grant))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "permission not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// DELETE /permissions/:permission_id - Revoke one grant
pub async fn revoke_grant(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(path): Path<HashMap<String, String>>,
) -> Response {
    if let Err(denied) = authz::guard(&services.dispatcher, &ctx, REVOKE_GRANT, &path).await {
        return denied;
    }
    let id: PermissionId = match errors::path_id(&path, "permission_id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.grants.remove(id) {
        Ok(Some(_)) => StatusCode::NO_CONTENT.into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "permission not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

fn grants_response(grants: &[PermissionGrant]) -> Response {
    (StatusCode::OK, Json(dto::items(grants.iter().map(dto::grant_to_json)))).into_response()
}
