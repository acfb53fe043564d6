use crate::state::AppState;
use axum::Router;

pub mod birthdate;
pub mod components;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod registration;
pub mod services;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::interaction_routes())
}
