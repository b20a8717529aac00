use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use clubroster_auth::{Action, PhoneNumber, PolicyCheck, ResourceCategory};
use clubroster_core::{AccountId, PhoneId};

use crate::app::{dto, errors, services::AppServices};
use crate::authz;
use crate::context::PrincipalContext;

// ─────────────────────────────────────────────────────────────────────────────
// Policies
// ─────────────────────────────────────────────────────────────────────────────

const READ_PHONE_NUMBERS: &[PolicyCheck] =
    &[PolicyCheck::on_owned_collection(Action::Read, ResourceCategory::PhoneNumber)];
/// Adding a number is an update of the owning account.
const ADD_PHONE_NUMBER: &[PolicyCheck] =
    &[PolicyCheck::on_instance(Action::Update, ResourceCategory::Account)];
const DELETE_PHONE_NUMBERS: &[PolicyCheck] =
    &[PolicyCheck::on_owned_collection(Action::Delete, ResourceCategory::PhoneNumber)];
const READ_PHONE_NUMBER: &[PolicyCheck] =
    &[PolicyCheck::on_instance(Action::Read, ResourceCategory::PhoneNumber)];
const UPDATE_PHONE_NUMBER: &[PolicyCheck] =
    &[PolicyCheck::on_instance(Action::Update, ResourceCategory::PhoneNumber)];
const DELETE_PHONE_NUMBER: &[PolicyCheck] =
    &[PolicyCheck::on_instance(Action::Delete, ResourceCategory::PhoneNumber)];

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router {
    Router::new()
        .route(
            "/accounts/:account_id/phone-numbers",
            get(list_phone_numbers)
                .post(add_phone_number)
                .delete(delete_phone_numbers),
        )
        .route(
            "/phone-numbers/:phone_id",
            get(get_phone_number)
                .patch(update_phone_number)
                .delete(delete_phone_number),
        )
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /accounts/:account_id/phone-numbers - Numbers of one account
pub async fn list_phone_numbers(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(path): Path<HashMap<String, String>>,
) -> Response {
    if let Err(denied) = authz::guard(&services.dispatcher, &ctx, READ_PHONE_NUMBERS, &path).await {
        return denied;
    }
    let owner: AccountId = match errors::path_id(&path, "account_id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.phone_numbers.list_owned(owner) {
        Ok(phones) => (
            StatusCode::OK,
            Json(dto::items(phones.iter().map(dto::phone_number_to_json))),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// POST /accounts/:account_id/phone-numbers - Add a number to an account
pub async fn add_phone_number(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(path): Path<HashMap<String, String>>,
    Json(body): Json<dto::CreatePhoneNumberRequest>,
) -> Response {
    if let Err(denied) = authz::guard(&services.dispatcher, &ctx, ADD_PHONE_NUMBER, &path).await {
        return denied;
    }
    let owner: AccountId = match errors::path_id(&path, "account_id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if let Err(e) = dto::require_text("number", &body.number) {
        return errors::domain_error_to_response(e);
    }

    let phone = PhoneNumber {
        id: PhoneId::new(),
        owner_id: owner,
        number: body.number.trim().to_string(),
        description: body.description,
    };
    match services.phone_numbers.upsert(phone.clone()) {
        Ok(()) => (StatusCode::CREATED, Json(dto::phone_number_to_json(&phone))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// DELETE /accounts/:account_id/phone-numbers - Remove every number of an account
pub async fn delete_phone_numbers(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(path): Path<HashMap<String, String>>,
) -> Response {
    if let Err(denied) =
        authz::guard(&services.dispatcher, &ctx, DELETE_PHONE_NUMBERS, &path).await
    {
        return denied;
    }
    let owner: AccountId = match errors::path_id(&path, "account_id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.phone_numbers.remove_owned(owner) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /phone-numbers/:phone_id - Fetch one number
pub async fn get_phone_number(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(path): Path<HashMap<String, String>>,
) -> Response {
    if let Err(denied) = authz::guard(&services.dispatcher, &ctx, READ_PHONE_NUMBER, &path).await {
        return denied;
    }
    let id: PhoneId = match errors::path_id(&path, "phone_id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.phone_numbers.get(id) {
        Ok(Some(phone)) => {
            (StatusCode::OK, Json(dto::phone_number_to_json(&phone))).into_response()
        }
        Ok(None) => phone_not_found(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// PATCH /phone-numbers/:phone_id - Change number or description
pub async fn update_phone_number(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(path): Path<HashMap<String, String>>,
    Json(body): Json<dto::UpdatePhoneNumberRequest>,
) -> Response {
    if let Err(denied) =
        authz::guard(&services.dispatcher, &ctx, UPDATE_PHONE_NUMBER, &path).await
    {
        return denied;
    }
    let id: PhoneId = match errors::path_id(&path, "phone_id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if let Some(number) = &body.number {
        if let Err(e) = dto::require_text("number", number) {
            return errors::domain_error_to_response(e);
        }
    }

    let updated = services.phone_numbers.update(id, |phone| {
        if let Some(number) = body.number {
            phone.number = number.trim().to_string();
        }
        if body.description.is_some() {
            phone.description = body.description;
        }
    });

    match updated {
        Ok(phone) => (StatusCode::OK, Json(dto::phone_number_to_json(&phone))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// DELETE /phone-numbers/:phone_id - Remove one number
pub async fn delete_phone_number(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(path): Path<HashMap<String, String>>,
) -> Response {
    if let Err(denied) =
        authz::guard(&services.dispatcher, &ctx, DELETE_PHONE_NUMBER, &path).await
    {
        return denied;
    }
    let id: PhoneId = match errors::path_id(&path, "phone_id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.phone_numbers.remove(id) {
        Ok(Some(_)) => StatusCode::NO_CONTENT.into_response(),
        Ok(None) => phone_not_found(),
        Err(e) => errors::store_error_to_response(e),
    }
}

fn phone_not_found() -> Response {
    errors::json_error(StatusCode::NOT_FOUND, "not_found", "phone number not found")
}
