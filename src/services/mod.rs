//! Services module - HTTP handlers
//!
//! One sub-module per area of the site. Handlers authorize, call the
//! repositories and shape the response; they hold no query logic.

pub mod account;
pub mod dinners;
pub mod rsvp;
pub mod search;

pub use account::{change_password, log_off, log_on, register};
pub use dinners::{
    create_dinner, delete_dinner, delete_dinner_confirm, edit_dinner_form, get_dinner,
    list_dinners, list_dinners_page, my_dinners, new_dinner_form, popular_web_slice,
    update_dinner, upcoming_web_slice,
};
pub use rsvp::{cancel_rsvp, register_rsvp};
pub use search::{most_popular_dinners, search_by_location};

use crate::AppState;
use crate::core::AppError;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;
use tracing::warn;

/// Root endpoint - health check
pub async fn root(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}

/// Anything no route matched.
pub async fn action_not_found() -> AppError {
    warn!("Unknown action requested");
    AppError::not_found("Action not found")
}
