//! Core Module - infrastructure shared by every route
//!
//! - Authentication and JWT
//! - Configuration
//! - Database pool and migrations
//! - Error handling
//! - Application state

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod state;

// Re-exports
pub use auth::{Claims, CurrentUser, authentication_middleware, decode_jwt, encode_jwt};
pub use config::Config;
pub use error::AppError;
pub use state::AppState;
