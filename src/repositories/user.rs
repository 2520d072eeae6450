//! UserRepository - local accounts

use super::{Create, Read, Update};
use crate::dtos::{CreateUserDTO, UpdateUserDTO};
use crate::entities::User;
use sqlx::{Error, SqlitePool};
use tracing::{debug, info, instrument};

pub struct UserRepository {
    connection_pool: SqlitePool,
}

impl UserRepository {
    pub fn new(connection_pool: SqlitePool) -> UserRepository {
        Self { connection_pool }
    }

    /// Usernames are unique regardless of case; the stored spelling is
    /// returned in `User::username`.
    #[instrument(skip(self))]
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, username, email, password FROM users WHERE username = ? COLLATE NOCASE",
        )
        .bind(username)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(user)
    }
}

impl Create<User, CreateUserDTO> for UserRepository {
    #[instrument(skip(self, data), fields(username = %data.username))]
    async fn create(&self, data: &CreateUserDTO) -> Result<User, Error> {
        debug!("Creating user");
        let result = sqlx::query("INSERT INTO users (username, email, password) VALUES (?, ?, ?)")
            .bind(&data.username)
            .bind(&data.email)
            .bind(&data.password)
            .execute(&self.connection_pool)
            .await?;

        info!("User created successfully");
        Ok(User {
            user_id: result.last_insert_rowid(),
            username: data.username.clone(),
            email: data.email.clone(),
            password: data.password.clone(),
        })
    }
}

impl Read<User, i64> for UserRepository {
    async fn read(&self, id: &i64) -> Result<Option<User>, Error> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, username, email, password FROM users WHERE user_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(user)
    }
}

impl Update<User, UpdateUserDTO, i64> for UserRepository {
    /// Only the password hash can change.
    #[instrument(skip(self, data), fields(user_id = %id))]
    async fn update(&self, id: &i64, data: &UpdateUserDTO) -> Result<User, Error> {
        let result = sqlx::query("UPDATE users SET password = ? WHERE user_id = ?")
            .bind(&data.password)
            .bind(id)
            .execute(&self.connection_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }

        info!("Password updated");
        self.read(id).await?.ok_or(Error::RowNotFound)
    }
}
