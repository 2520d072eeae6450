//! RSVP services - signing up for and backing out of a dinner

use crate::core::{AppError, AppState, CurrentUser};
use crate::entities::Rsvp;
use crate::repositories::{Read, Save};
use axum::{
    Extension,
    extract::{Path, State},
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub const REGISTERED_MESSAGE: &str = "Thanks - we'll see you there!";
pub const CANCELLED_MESSAGE: &str = "Sorry you can't make it!";

/// Adds an RSVP for the current user. Registering twice is a no-op.
#[instrument(skip(state, current_user), fields(user = %current_user.name))]
pub async fn register_rsvp(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<&'static str, AppError> {
    let dinner = state.dinners.read(&id).await?.ok_or_else(|| {
        warn!("Dinner not found");
        AppError::not_found("Dinner not found")
    })?;

    if dinner.is_user_registered(&current_user.name) {
        debug!("User already registered");
        return Ok(REGISTERED_MESSAGE);
    }

    let mut rsvp = Rsvp::new(dinner.dinner_id);
    rsvp.attendee_name_id = Some(current_user.name.clone());
    rsvp.attendee_name = current_user.friendly_name.clone();
    state.dinners.save(&mut rsvp).await?;

    info!("RSVP {} registered", rsvp.rsvp_id);
    Ok(REGISTERED_MESSAGE)
}

/// Removes the current user's RSVP, if there is one.
#[instrument(skip(state, current_user), fields(user = %current_user.name))]
pub async fn cancel_rsvp(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<&'static str, AppError> {
    let dinner = state.dinners.read(&id).await?.ok_or_else(|| {
        warn!("Dinner not found");
        AppError::not_found("Dinner not found")
    })?;

    match dinner.rsvp_for(&current_user.name) {
        Some(rsvp) => {
            state.dinners.delete_rsvp(rsvp).await?;
            info!("RSVP {} cancelled", rsvp.rsvp_id);
        }
        None => debug!("User was not registered"),
    }

    Ok(CANCELLED_MESSAGE)
}
