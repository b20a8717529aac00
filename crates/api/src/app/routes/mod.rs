use axum::Router;

pub mod accounts;
pub mod events;
pub mod permissions;
pub mod phone_numbers;
pub mod system;

/// Router for all endpoints behind the auth middleware.
pub fn router() -> Router {
    Router::new()
        .merge(system::router())
        .merge(accounts::router())
        .merge(permissions::router())
        .merge(phone_numbers::router())
        .merge(events::router())
}
