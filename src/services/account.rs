//! Account services - local sign in, registration and password changes

use crate::core::auth::{TOKEN_COOKIE, TOKEN_LIFETIME_HOURS};
use crate::core::{AppError, AppState, CurrentUser, encode_jwt};
use crate::dtos::{
    ChangePasswordDTO, CreateUserDTO, LogOnDTO, LogOnResponseDTO, RegisterDTO, UpdateUserDTO,
    UserDTO,
};
use crate::entities::User;
use crate::repositories::{Create, Read, Update};
use axum::{
    Extension,
    extract::{Json, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

const HOME: &str = "/";

/// Only relative paths on this site are followed after sign in.
pub fn is_local_url(url: &str) -> bool {
    url.len() > 1 && url.starts_with('/') && !url.starts_with("//") && !url.starts_with("/\\")
}

/// `Set-Cookie` and `Authorization` headers for a fresh token. Without
/// `persistent` the cookie lives for the browser session only.
fn sign_in_headers(token: &str, persistent: bool) -> Result<HeaderMap, AppError> {
    let mut cookie = format!("{TOKEN_COOKIE}={token}; Path=/; HttpOnly; Secure; SameSite=Lax");
    if persistent {
        cookie.push_str(&format!("; Max-Age={}", TOKEN_LIFETIME_HOURS * 60 * 60));
    }

    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, header_value(&cookie)?);
    headers.insert(header::AUTHORIZATION, header_value(&format!("Bearer {token}"))?);
    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(value).map_err(|e| {
        error!("Invalid header value: {}", e);
        AppError::internal_server_error("Internal server error")
    })
}

/// A registration that loses a race for the same name still answers 409.
fn registration_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            warn!("Username already taken");
            AppError::conflict("Username already exists")
        }
        _ => AppError::from(err),
    }
}

#[instrument(skip(state, body), fields(username = %body.username))]
pub async fn log_on(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LogOnDTO>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Logging on");
    body.validate()?;

    let user = match state.user.find_by_username(&body.username).await? {
        Some(user) if user.verify_password(&body.password) => user,
        _ => {
            warn!("Rejected log on");
            return Err(AppError::unauthorized(
                "The user name or password provided is incorrect.",
            ));
        }
    };

    // Identity checks downstream are case sensitive, so sign in with the
    // stored spelling.
    let username = user.username;
    let token = encode_jwt(username.clone(), user.user_id, &state.jwt_secret)?;
    let headers = sign_in_headers(&token, body.remember_me)?;

    let redirect_to = body
        .return_url
        .filter(|url| is_local_url(url))
        .unwrap_or_else(|| HOME.to_string());

    info!("User {} logged on", username);
    Ok((
        StatusCode::OK,
        headers,
        Json(LogOnResponseDTO {
            username,
            redirect_to,
        }),
    ))
}

#[instrument(skip(state, body), fields(username = %body.username))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterDTO>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Registering user");
    body.validate()?;

    if state.user.find_by_username(&body.username).await?.is_some() {
        warn!("Username already taken");
        return Err(AppError::conflict("Username already exists"));
    }

    let password = User::hash_password(&body.password).map_err(|e| {
        error!("Failed to hash password: {}", e);
        AppError::internal_server_error("Failed to hash password")
    })?;

    let user = state
        .user
        .create(&CreateUserDTO {
            username: body.username,
            email: body.email,
            password,
        })
        .await
        .map_err(registration_error)?;

    let token = encode_jwt(user.username.clone(), user.user_id, &state.jwt_secret)?;
    let headers = sign_in_headers(&token, false)?;

    info!("User {} registered", user.username);
    Ok((StatusCode::CREATED, headers, Json(UserDTO::from(user))))
}

#[instrument(skip(state, current_user, body), fields(user = %current_user.name))]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Json(body): Json<ChangePasswordDTO>,
) -> Result<impl IntoResponse, AppError> {
    body.validate()?;

    let user = state
        .user
        .read(&current_user.user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("You are not an authorized user"))?;

    if !user.verify_password(&body.current_password) {
        warn!("Current password did not match");
        return Err(AppError::bad_request(
            "The current password is incorrect or the new password is invalid.",
        ));
    }

    let password = User::hash_password(&body.new_password).map_err(|e| {
        error!("Failed to hash password: {}", e);
        AppError::internal_server_error("Failed to hash password")
    })?;
    state
        .user
        .update(&user.user_id, &UpdateUserDTO { password })
        .await?;

    info!("Password changed");
    Ok((StatusCode::OK, "Your password has been changed successfully."))
}

/// Expires the token cookie. Bearer tokens simply lapse.
#[instrument]
pub async fn log_off() -> Result<impl IntoResponse, AppError> {
    let cookie = format!("{TOKEN_COOKIE}=; Path=/; HttpOnly; Secure; SameSite=Lax; Max-Age=0");
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, header_value(&cookie)?);

    Ok((
        StatusCode::OK,
        headers,
        Json(LogOnResponseDTO {
            username: String::new(),
            redirect_to: HOME.to_string(),
        }),
    ))
}
