//! Club event endpoints.
//!
//! Creators manage their events and listed editors may read and update them.
//! Every member sees public events; private ones stay hidden from listings
//! unless the caller may read them. Creating an event needs nothing but a
//! principal, and the creator is always kept among the editors.

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
    compile, Action, Event, PolicyCheck, Resource, ResourceCategory, ResourceType,
};
use clubroster_core::{AccountId, EventId};
use clubroster_infra::StoreError;

use crate::app::{dto, errors, services::AppServices};
use crate::authz;
use crate::context::PrincipalContext;

// ─────────────────────────────────────────────────────────────────────────────
// Policies
// ─────────────────────────────────────────────────────────────────────────────

const LIST_EVENTS: &[PolicyCheck] = &[PolicyCheck::on_type(Action::List, ResourceType::Event)];
const CREATE_EVENT: &[PolicyCheck] = &[];
const READ_EVENT: &[PolicyCheck] =
    &[PolicyCheck::on_instance(Action::Read, ResourceCategory::Event)];
const UPDATE_EVENT: &[PolicyCheck] =
    &[PolicyCheck::on_instance(Action::Update, ResourceCategory::Event)];
const DELETE_EVENT: &[PolicyCheck] =
    &[PolicyCheck::on_instance(Action::Delete, ResourceCategory::Event)];
const READ_CREATED_EVENTS: &[PolicyCheck] =
    &[PolicyCheck::on_owned_collection(Action::Read, ResourceCategory::Event)];
/// Who co-edits what is part of the account's profile.
const READ_EDITABLE_EVENTS: &[PolicyCheck] =
    &[PolicyCheck::on_instance(Action::Read, ResourceCategory::Account)];

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/:event_id",
            get(get_event).patch(update_event).delete(delete_event),
        )
        .route("/accounts/:account_id/events", get(list_created_events))
        .route("/accounts/:account_id/editable-events", get(list_editable_events))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /events - List the events the caller may read
pub async fn list_events(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> Response {
    if let Err(denied) =
        authz::guard(&services.dispatcher, &ctx, LIST_EVENTS, &HashMap::new()).await
    {
        return denied;
    }

    match services.events.list() {
        Ok(events) => events_response(&readable(&ctx, events)),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// POST /events - Create an event owned by the caller
pub async fn create_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateEventRequest>,
) -> Response {
    if let Err(denied) =
        authz::guard(&services.dispatcher, &ctx, CREATE_EVENT, &HashMap::new()).await
    {
        return denied;
    }
    let Some(creator) = ctx.principal().map(|p| p.id()) else {
        return authz::denial_to_response(clubroster_infra::Denial::Unauthenticated);
    };

    let valid = dto::require_text("title", &body.title)
        .and_then(|_| dto::require_schedule(body.starts_at, body.ends_at));
    if let Err(e) = valid {
        return errors::domain_error_to_response(e);
    }
    let editor_ids = match existing_accounts(&services, body.editor_ids) {
        Ok(ids) => ids,
        Err(e) => return errors::store_error_to_response(e),
    };

    let event = Event {
        id: EventId::new(),
        title: body.title.trim().to_string(),
        description: body.description,
        starts_at: body.starts_at,
        ends_at: body.ends_at,
        public: body.public,
        creator_id: creator,
        editor_ids,
    };

    match services.events.create_event(event) {
        Ok(event) => {
            tracing::info!(event = %event.id, creator = %creator, "event created");
            (StatusCode::CREATED, Json(dto::event_to_json(&event))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /events/:event_id - Fetch one event
pub async fn get_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(path): Path<HashMap<String, String>>,
) -> Response {
    if let Err(denied) = authz::guard(&services.dispatcher, &ctx, READ_EVENT, &path).await {
        return denied;
    }
    let id: EventId = match errors::path_id(&path, "event_id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.events.get(id) {
        Ok(Some(event)) => (StatusCode::OK, Json(dto::event_to_json(&event))).into_response(),
        Ok(None) => event_not_found(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// PATCH /events/:event_id - Update an event
pub async fn update_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(path): Path<HashMap<String, String>>,
    Json(body): Json<dto::PatchEventRequest>,
) -> Response {
    if let Err(denied) = authz::guard(&services.dispatcher, &ctx, UPDATE_EVENT, &path).await {
        return denied;
    }
    let id: EventId = match errors::path_id(&path, "event_id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if let Some(title) = &body.title {
        if let Err(e) = dto::require_text("title", title) {
            return errors::domain_error_to_response(e);
        }
    }

    let current = match services.events.get(id) {
        Ok(Some(event)) => event,
        Ok(None) => return event_not_found(),
        Err(e) => return errors::store_error_to_response(e),
    };
    let starts_at = body.starts_at.unwrap_or(current.starts_at);
    let ends_at = body.ends_at.unwrap_or(current.ends_at);
    if let Err(e) = dto::require_schedule(starts_at, ends_at) {
        return errors::domain_error_to_response(e);
    }
    let editor_ids = match body.editor_ids.map(|ids| existing_accounts(&services, ids)) {
        Some(Ok(ids)) => Some(ids),
        Some(Err(e)) => return errors::store_error_to_response(e),
        None => None,
    };

    let updated = services.events.update(id, |event| {
        if let Some(title) = body.title {
            event.title = title.trim().to_string();
        }
        if body.description.is_some() {
            event.description = body.description;
        }
        event.starts_at = starts_at;
        event.ends_at = ends_at;
        if let Some(public) = body.public {
            event.public = public;
        }
        if let Some(mut editor_ids) = editor_ids {
            if !editor_ids.contains(&event.creator_id) {
                editor_ids.push(event.creator_id);
            }
            event.editor_ids = editor_ids;
        }
    });

    match updated {
        Ok(event) => (StatusCode::OK, Json(dto::event_to_json(&event))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// DELETE /events/:event_id - Remove an event
pub async fn delete_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(path): Path<HashMap<String, String>>,
) -> Response {
    if let Err(denied) = authz::guard(&services.dispatcher, &ctx, DELETE_EVENT, &path).await {
        return denied;
    }
    let id: EventId = match errors::path_id(&path, "event_id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.events.remove(id) {
        Ok(Some(_)) => StatusCode::NO_CONTENT.into_response(),
        Ok(None) => event_not_found(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /accounts/:account_id/events - Events created by an account
pub async fn list_created_events(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(path): Path<HashMap<String, String>>,
) -> Response {
    if let Err(denied) =
        authz::guard(&services.dispatcher, &ctx, READ_CREATED_EVENTS, &path).await
    {
        return denied;
    }
    let creator: AccountId = match errors::path_id(&path, "account_id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.events.list_owned(creator) {
        Ok(events) => events_response(&events),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /accounts/:account_id/editable-events - Events an account may co-edit
pub async fn list_editable_events(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(path): Path<HashMap<String, String>>,
) -> Response {
    if let Err(denied) =
        authz::guard(&services.dispatcher, &ctx, READ_EDITABLE_EVENTS, &path).await
    {
        return denied;
    }
    let account: AccountId = match errors::path_id(&path, "account_id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.events.list_editable_by(account) {
        Ok(events) => events_response(&readable(&ctx, events)),
        Err(e) => errors::store_error_to_response(e),
    }
}

fn events_response(events: &[Event]) -> Response {
    (StatusCode::OK, Json(dto::items(events.iter().map(dto::event_to_json)))).into_response()
}

fn event_not_found() -> Response {
    errors::json_error(StatusCode::NOT_FOUND, "not_found", "event not found")
}

/// Keep the events the caller may read; listing alone never exposes a private event.
fn readable(ctx: &PrincipalContext, events: Vec<Event>) -> Vec<Event> {
    let Some(principal) = ctx.principal() else {
        return Vec::new();
    };
    let ruleset = compile(principal);

    events
        .into_iter()
        .map(Resource::Event)
        .filter(|event| ruleset.can_on(Action::Read, event))
        .filter_map(|event| match event {
            Resource::Event(event) => Some(event),
            _ => None,
        })
        .collect()
}

/// Editor ids that name existing accounts, deduplicated, in request order.
fn existing_accounts(
    services: &AppServices,
    ids: Vec<AccountId>,
) -> Result<Vec<AccountId>, StoreError> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) && services.accounts.get(id)?.is_some() {
            out.push(id);
        }
    }
    Ok(out)
}
