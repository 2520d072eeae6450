//! Dinner server library - exposes the router and modules for the binary and tests

pub mod core;
pub mod dtos;
pub mod entities;
pub mod repositories;
pub mod services;

// Re-exports of the main types
pub use crate::core::{AppError, AppState, auth, config};
pub use services::root;

use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builds the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    use services::*;

    Router::new()
        .route("/", get(root))
        // Pretty details link, e.g. `/42`
        .route("/{id}", get(get_dinner))
        .nest("/dinners", configure_dinner_routes(state.clone()))
        .nest("/rsvp", configure_rsvp_routes(state.clone()))
        .nest("/search", configure_search_routes())
        .nest("/account", configure_account_routes(state.clone()))
        .fallback(action_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

/// Dinner routes; reading is public, hosting needs a signed-in user
fn configure_dinner_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    let public_routes = Router::new()
        .route("/", get(list_dinners))
        .route("/page/{page}", get(list_dinners_page))
        .route("/popular", get(popular_web_slice))
        .route("/upcoming", get(upcoming_web_slice))
        .route("/{id}", get(get_dinner));

    let host_routes = Router::new()
        .route("/", post(create_dinner))
        .route("/create", get(new_dinner_form))
        .route("/my", get(my_dinners))
        .route("/{id}", put(update_dinner).delete(delete_dinner))
        .route("/{id}/edit", get(edit_dinner_form))
        .route("/{id}/delete", get(delete_dinner_confirm))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ));

    public_routes.merge(host_routes)
}

/// RSVP routes, all authenticated
fn configure_rsvp_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/{id}/register", post(register_rsvp))
        .route("/{id}/cancel", post(cancel_rsvp))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Search routes (JSON)
fn configure_search_routes() -> Router<Arc<AppState>> {
    use services::*;

    Router::new()
        .route("/location", post(search_by_location))
        .route("/popular", post(most_popular_dinners))
}

/// Account routes; only changing the password needs a signed-in user
fn configure_account_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    let public_routes = Router::new()
        .route("/logon", post(log_on))
        .route("/register", post(register))
        .route("/logoff", post(log_off));

    let member_routes = Router::new()
        .route("/change_password", post(change_password))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ));

    public_routes.merge(member_routes)
}
