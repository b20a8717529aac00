use chrono::{DateTime, Utc};
use serde::Deserialize;

use clubroster_auth::{Account, Event, PermissionGrant, PhoneNumber, Principal};
use clubroster_core::{AccountId, DomainError};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SetPermissionsRequest {
    pub permissions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePhoneNumberRequest {
    pub number: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePhoneNumberRequest {
    pub number: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub editor_ids: Vec<AccountId>,
}

#[derive(Debug, Deserialize)]
pub struct PatchEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub public: Option<bool>,
    pub editor_ids: Option<Vec<AccountId>>,
}

#[derive(Debug, Deserialize)]
pub struct CanQuery {
    pub action: String,
    pub resource: String,
}

// -------------------------
// Validation
// -------------------------

pub fn require_text(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

pub fn require_schedule(
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
) -> Result<(), DomainError> {
    if ends_at < starts_at {
        return Err(DomainError::validation("ends_at must not be before starts_at"));
    }
    Ok(())
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn account_to_json(a: &Account) -> serde_json::Value {
    serde_json::json!({
        "id": a.id.to_string(),
        "username": a.username,
        "first_name": a.first_name,
        "last_name": a.last_name,
        "email": a.email,
        "active": a.active,
    })
}

pub fn phone_number_to_json(p: &PhoneNumber) -> serde_json::Value {
    serde_json::json!({
        "id": p.id.to_string(),
        "account_id": p.owner_id.to_string(),
        "number": p.number,
        "description": p.description,
    })
}

pub fn grant_to_json(g: &PermissionGrant) -> serde_json::Value {
    serde_json::json!({
        "id": g.id.to_string(),
        "account_id": g.owner_id.to_string(),
        "name": g.name.as_str(),
    })
}

pub fn event_to_json(e: &Event) -> serde_json::Value {
    serde_json::json!({
        "id": e.id.to_string(),
        "title": e.title,
        "description": e.description,
        "starts_at": e.starts_at.to_rfc3339(),
        "ends_at": e.ends_at.to_rfc3339(),
        "public": e.public,
        "creator_id": e.creator_id.to_string(),
        "editor_ids": e.editor_ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
    })
}

pub fn principal_to_json(p: &Principal) -> serde_json::Value {
    serde_json::json!({
        "id": p.id().to_string(),
        "username": p.username(),
        "grants": p.grants().iter().map(|g| g.as_str()).collect::<Vec<_>>(),
    })
}

pub fn items(values: impl IntoIterator<Item = serde_json::Value>) -> serde_json::Value {
    serde_json::json!({ "items": values.into_iter().collect::<Vec<_>>() })
}
