//! Application State - shared by every route and middleware

use crate::repositories::{DinnerRepository, UserRepository};
use sqlx::SqlitePool;

pub struct AppState {
    /// Dinners and RSVPs
    pub dinners: DinnerRepository,

    /// Local accounts
    pub user: UserRepository,

    /// Secret key for JWT tokens
    pub jwt_secret: String,
}

impl AppState {
    /// Builds every repository on the shared connection pool.
    pub fn new(pool: SqlitePool, jwt_secret: String) -> Self {
        Self {
            dinners: DinnerRepository::new(pool.clone()),
            user: UserRepository::new(pool),
            jwt_secret,
        }
    }
}
