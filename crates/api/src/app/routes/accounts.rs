use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use clubroster_auth::{Action, PolicyCheck, ResourceCategory, ResourceType};
use clubroster_core::AccountId;

use crate::app::{dto, errors, services::AppServices};
use crate::authz;
use crate::context::PrincipalContext;

// ─────────────────────────────────────────────────────────────────────────────
// Policies
// ─────────────────────────────────────────────────────────────────────────────

const LIST_ACCOUNTS: &[PolicyCheck] = &[PolicyCheck::on_type(Action::List, ResourceType::Account)];
const CREATE_ACCOUNT: &[PolicyCheck] =
    &[PolicyCheck::on_type(Action::Create, ResourceType::Account)];
const READ_ACCOUNT: &[PolicyCheck] =
    &[PolicyCheck::on_instance(Action::Read, ResourceCategory::Account)];
const UPDATE_ACCOUNT: &[PolicyCheck] =
    &[PolicyCheck::on_instance(Action::Update, ResourceCategory::Account)];
const DELETE_ACCOUNT: &[PolicyCheck] =
    &[PolicyCheck::on_instance(Action::Delete, ResourceCategory::Account)];

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route(
            "/accounts/:account_id",
            get(get_account).patch(update_account).delete(delete_account),
        )
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /accounts - List every member account
pub async fn list_accounts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> Response {
    if let Err(denied) =
        authz::guard(&services.dispatcher, &ctx, LIST_ACCOUNTS, &HashMap::new()).await
    {
        return denied;
    }

    match services.accounts.list() {
        Ok(accounts) => (
            StatusCode::OK,
            Json(dto::items(accounts.iter().map(dto::account_to_json))),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// POST /accounts - Register a new member account
pub async fn create_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateAccountRequest>,
) -> Response {
    if let Err(denied) =
        authz::guard(&services.dispatcher, &ctx, CREATE_ACCOUNT, &HashMap::new()).await
    {
        return denied;
    }

    let valid = dto::require_text("username", &body.username)
        .and_then(|_| dto::require_text("first_name", &body.first_name))
        .and_then(|_| dto::require_text("last_name", &body.last_name));
    if let Err(e) = valid {
        return errors::domain_error_to_response(e);
    }

    match services.register_account(
        body.username.trim().to_string(),
        body.first_name,
        body.last_name,
        body.email,
    ) {
        Ok(account) => (StatusCode::CREATED, Json(dto::account_to_json(&account))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /accounts/:account_id - Fetch one account
pub async fn get_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(path): Path<HashMap<String, String>>,
) -> Response {
    if let Err(denied) = authz::guard(&services.dispatcher, &ctx, READ_ACCOUNT, &path).await {
        return denied;
    }
    let id: AccountId = match errors::path_id(&path, "account_id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.accounts.get(id) {
        Ok(Some(account)) => (StatusCode::OK, Json(dto::account_to_json(&account))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "account not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// PATCH /accounts/:account_id - Update names, email or the active flag
pub async fn update_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(path): Path<HashMap<String, String>>,
    Json(body): Json<dto::UpdateAccountRequest>,
) -> Response {
    if let Err(denied) = authz::guard(&services.dispatcher, &ctx, UPDATE_ACCOUNT, &path).await {
        return denied;
    }
    let id: AccountId = match errors::path_id(&path, "account_id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    for (field, value) in [("first_name", &body.first_name), ("last_name", &body.last_name)] {
        if let Some(value) = value {
            if let Err(e) = dto::require_text(field, value) {
                return errors::domain_error_to_response(e);
            }
        }
    }

    let updated = services.accounts.update(id, |account| {
        if let Some(first_name) = body.first_name {
            account.first_name = first_name;
        }
        if let Some(last_name) = body.last_name {
            account.last_name = last_name;
        }
        if body.email.is_some() {
            account.email = body.email;
        }
        if let Some(active) = body.active {
            account.active = active;
        }
    });

    match updated {
        Ok(account) => (StatusCode::OK, Json(dto::account_to_json(&account))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// DELETE /accounts/:account_id - Remove an account with its phone numbers and grants
pub async fn delete_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(path): Path<HashMap<String, String>>,
) -> Response {
    if let Err(denied) = authz::guard(&services.dispatcher, &ctx, DELETE_ACCOUNT, &path).await {
        return denied;
    }
    let id: AccountId = match errors::path_id(&path, "account_id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.delete_account(id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
