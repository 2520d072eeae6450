//! User DTOs - account forms and responses

use crate::entities::User;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug)]
pub struct UserDTO {
    pub user_id: i64,
    pub username: String,
    pub email: String,
}

impl From<User> for UserDTO {
    fn from(value: User) -> Self {
        Self {
            user_id: value.user_id,
            username: value.username,
            email: value.email, // the hash never leaves the server
        }
    }
}

/// Row to insert; `password` is already hashed.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateUserDTO {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Password change; `password` is already hashed.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UpdateUserDTO {
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct LogOnDTO {
    #[validate(length(min = 1, message = "User name is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
    #[serde(default)]
    pub return_url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct RegisterDTO {
    #[validate(length(min = 1, max = 256, message = "User name is required"))]
    pub username: String,
    #[validate(email(message = "Email address is not valid"))]
    pub email: String,
    #[validate(length(
        min = 6,
        max = 100,
        message = "The password must be at least 6 characters long"
    ))]
    pub password: String,
    #[validate(must_match(
        other = "password",
        message = "The password and confirmation password do not match"
    ))]
    pub confirm_password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct ChangePasswordDTO {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(
        min = 6,
        max = 100,
        message = "The new password must be at least 6 characters long"
    ))]
    pub new_password: String,
    #[validate(must_match(
        other = "new_password",
        message = "The new password and confirmation password do not match"
    ))]
    pub confirm_password: String,
}

/// Where the client should go after signing in.
#[derive(Serialize, Deserialize, Debug)]
pub struct LogOnResponseDTO {
    pub username: String,
    pub redirect_to: String,
}
