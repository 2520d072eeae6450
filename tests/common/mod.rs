#![allow(dead_code)] // each test binary uses a different subset

use axum_test::TestServer;
use axum_test::http::HeaderName;
use chrono::{Duration, Utc};
use dinner_server::core::AppState;
use dinner_server::dtos::CreateUserDTO;
use dinner_server::entities::{Dinner, Rsvp, User};
use dinner_server::repositories::{Create, Save};
use sqlx::SqlitePool;
use std::sync::Arc;

pub const TEST_JWT_SECRET: &str = "test secret that nobody should ever deploy";

pub const TEST_PASSWORD: &str = "password123";

/// Builds an AppState for tests
pub fn create_test_state(pool: SqlitePool) -> Arc<AppState> {
    Arc::new(AppState::new(pool, TEST_JWT_SECRET.to_string()))
}

/// Builds a TestServer around the full application router
pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = dinner_server::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// Signs a JWT valid for 24 hours
pub fn create_test_jwt(user_id: i64, username: &str, jwt_secret: &str) -> String {
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Claims {
        id: i64,
        username: String,
        exp: usize,
        iat: usize,
    }

    let now = Utc::now();
    let expiration = now
        .checked_add_signed(Duration::hours(24))
        .expect("valid timestamp")
        .timestamp() as usize;

    let claims = Claims {
        id: user_id,
        username: username.to_string(),
        exp: expiration,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("Failed to create JWT token")
}

pub fn authorization() -> HeaderName {
    HeaderName::from_static("authorization")
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Inserts a local account with [`TEST_PASSWORD`]
pub async fn seed_user(state: &AppState, username: &str) -> User {
    let password = User::hash_password(TEST_PASSWORD).expect("Failed to hash password");
    state
        .user
        .create(&CreateUserDTO {
            username: username.to_string(),
            email: format!("{}@example.com", username.to_lowercase()),
            password,
        })
        .await
        .expect("Failed to seed user")
}

/// Inserts a user and returns it with a valid bearer token
pub async fn seed_signed_in_user(state: &AppState, username: &str) -> (User, String) {
    let user = seed_user(state, username).await;
    let token = create_test_jwt(user.user_id, &user.username, TEST_JWT_SECRET);
    (user, token)
}

/// Inserts a dinner hosted by `host`, `days_from_now` days out, with an
/// RSVP for each attendee
pub async fn seed_dinner(
    state: &AppState,
    title: &str,
    days_from_now: i64,
    host: &str,
    attendees: &[&str],
) -> Dinner {
    let mut dinner = Dinner::new();
    dinner.title = title.to_string();
    dinner.event_date = Utc::now() + Duration::days(days_from_now);
    dinner.description = format!("{} description", title);
    dinner.hosted_by = host.to_string();
    dinner.hosted_by_id = Some(host.to_string());
    dinner.contact_phone = "425-555-0100".to_string();
    dinner.address = "1 Microsoft Way".to_string();
    dinner.country = "USA".to_string();
    dinner.latitude = 47.64;
    dinner.longitude = -122.13;

    for attendee in attendees {
        let mut rsvp = Rsvp::new(0);
        rsvp.attendee_name = attendee.to_string();
        rsvp.attendee_name_id = Some(attendee.to_string());
        dinner.rsvps.push(rsvp);
    }

    state.dinners.save(&mut dinner).await.expect("Failed to seed dinner");
    dinner
}
