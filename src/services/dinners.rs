//! Dinner services - listing, details, hosting and the web slices

use crate::core::{AppError, AppState, CurrentUser};
use crate::dtos::{
    DinnerDTO, DinnerDeletedDTO, DinnerFormDTO, DinnerIndexQuery, FormRedisplayDTO,
    PagedDinnersDTO, WebSliceDTO,
};
use crate::entities::{Dinner, Rsvp};
use crate::repositories::{Delete, DinnerOrder, PageRequest, Read, Save};
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{Months, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

/// Rows per page of the dinner index.
pub const INDEX_PAGE_SIZE: u32 = 25;

/// Rows in a web slice.
pub const WEB_SLICE_SIZE: u32 = 5;

/// Loads a dinner the current user hosts: 404 when missing, 403 otherwise.
async fn find_hosted_dinner(
    state: &AppState,
    id: i64,
    current_user: &CurrentUser,
) -> Result<Dinner, AppError> {
    let dinner = state.dinners.read(&id).await?.ok_or_else(|| {
        warn!("Dinner not found");
        AppError::not_found("Dinner not found")
    })?;

    if !dinner.is_hosted_by(&current_user.name) {
        warn!("User {} does not host dinner {}", current_user.name, id);
        return Err(AppError::invalid_owner());
    }

    Ok(dinner)
}

#[instrument(skip(state))]
pub async fn list_dinners(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DinnerIndexQuery>,
) -> Result<Json<PagedDinnersDTO>, AppError> {
    let page = params.page.unwrap_or(1);
    search_dinners(&state, &params, page).await
}

#[instrument(skip(state))]
pub async fn list_dinners_page(
    State(state): State<Arc<AppState>>,
    Path(page): Path<u32>,
    Query(params): Query<DinnerIndexQuery>,
) -> Result<Json<PagedDinnersDTO>, AppError> {
    search_dinners(&state, &params, page).await
}

/// Text search when `q` has content, upcoming dinners otherwise.
async fn search_dinners(
    state: &AppState,
    params: &DinnerIndexQuery,
    page: u32,
) -> Result<Json<PagedDinnersDTO>, AppError> {
    let order = match params.order.as_deref() {
        Some(order) => DinnerOrder::parse(order).ok_or_else(|| {
            warn!("Unknown sort order: {}", order);
            AppError::bad_request("Unknown sort order")
        })?,
        None => DinnerOrder::EventDate,
    };

    let page = PageRequest::new(page, INDEX_PAGE_SIZE);
    let q = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let dinners = match q {
        Some(text) => {
            debug!("Searching dinners by text");
            state.dinners.find_by_text(text, order, page).await?
        }
        None => {
            debug!("Listing upcoming dinners");
            state.dinners.find_upcoming(order, page).await?
        }
    };

    info!(
        "Returning page {} of {} ({} dinners)",
        dinners.page_number,
        dinners.page_count,
        dinners.items.len()
    );
    Ok(Json(PagedDinnersDTO::from(dinners)))
}

/// `id` arrives as text so the pretty `/{id}` route can 404 on anything
/// that is not a dinner number.
#[instrument(skip(state))]
pub async fn get_dinner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DinnerDTO>, AppError> {
    let id: i64 = id.parse().map_err(|_| {
        warn!("Invalid dinner id");
        AppError::not_found("No Dinner found due to invalid dinner id")
    })?;

    let dinner = state.dinners.read(&id).await?.ok_or_else(|| {
        warn!("Dinner not found");
        AppError::not_found("No Dinner found for that id")
    })?;

    Ok(Json(DinnerDTO::from(dinner)))
}

/// Blank form for a new dinner, dated one week out.
#[instrument(skip(current_user), fields(user = %current_user.name))]
pub async fn new_dinner_form(
    Extension(current_user): Extension<CurrentUser>,
) -> Json<DinnerFormDTO> {
    Json(DinnerFormDTO::from(&Dinner::new()))
}

#[instrument(skip(state, current_user, body), fields(user = %current_user.name))]
pub async fn create_dinner(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Json(body): Json<DinnerFormDTO>,
) -> Result<impl IntoResponse, AppError> {
    debug!("Creating dinner");
    body.validate()?;

    let mut dinner = body.to_new_dinner();
    dinner.hosted_by_id = Some(current_user.name.clone());
    dinner.hosted_by = current_user.friendly_name.clone();

    // The host is always the first attendee.
    let mut rsvp = Rsvp::new(0);
    rsvp.attendee_name_id = Some(current_user.name.clone());
    rsvp.attendee_name = current_user.friendly_name.clone();
    dinner.rsvps.push(rsvp);

    state.dinners.save(&mut dinner).await?;
    dinner.rsvp_count = Some(dinner.rsvps.len() as i64);

    info!("Dinner {} created", dinner.dinner_id);
    let location = format!("/dinners/{}", dinner.dinner_id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(DinnerDTO::from(dinner)),
    ))
}

#[instrument(skip(state, current_user), fields(user = %current_user.name))]
pub async fn edit_dinner_form(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<DinnerFormDTO>, AppError> {
    let dinner = find_hosted_dinner(&state, id, &current_user).await?;
    Ok(Json(DinnerFormDTO::from(&dinner)))
}

/// A form that passes validation but cannot be saved is sent back with
/// a 422 so the client can redisplay it.
#[instrument(skip(state, current_user, body), fields(user = %current_user.name))]
pub async fn update_dinner(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(body): Json<DinnerFormDTO>,
) -> Result<Response, AppError> {
    debug!("Updating dinner");
    let mut dinner = find_hosted_dinner(&state, id, &current_user).await?;
    body.validate()?;

    body.apply_to(&mut dinner);
    if let Err(e) = state.dinners.save(&mut dinner).await {
        error!("Failed to save dinner {}: {}", id, e);
        let failure = AppError::unprocessable("Unable to save the dinner");
        let redisplay = FormRedisplayDTO {
            error: failure.message().to_string(),
            dinner_id: id,
            form: body,
        };
        return Ok((failure.status(), Json(redisplay)).into_response());
    }

    info!("Dinner {} updated", id);
    Ok(Json(DinnerDTO::from(dinner)).into_response())
}

#[instrument(skip(state, current_user), fields(user = %current_user.name))]
pub async fn delete_dinner_confirm(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<DinnerDTO>, AppError> {
    let dinner = find_hosted_dinner(&state, id, &current_user).await?;
    Ok(Json(DinnerDTO::from(dinner)))
}

#[instrument(skip(state, current_user), fields(user = %current_user.name))]
pub async fn delete_dinner(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<DinnerDeletedDTO>, AppError> {
    debug!("Deleting dinner");
    let dinner = find_hosted_dinner(&state, id, &current_user).await?;
    state.dinners.delete(&dinner.dinner_id).await?;

    info!("Dinner {} deleted", id);
    Ok(Json(DinnerDeletedDTO {
        dinner_id: id,
        message: "Dinner deleted".to_string(),
    }))
}

/// Dinners the current user hosts or attends.
#[instrument(skip(state, current_user), fields(user = %current_user.name))]
pub async fn my_dinners(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<Json<Vec<DinnerDTO>>, AppError> {
    let dinners = state.dinners.all_by_user(&current_user.name).await?;
    debug!("User has {} dinners", dinners.len());
    Ok(Json(dinners.into_iter().map(DinnerDTO::from).collect()))
}

/// Most-attended upcoming dinners first.
#[instrument(skip(state))]
pub async fn popular_web_slice(
    State(state): State<Arc<AppState>>,
) -> Result<Json<WebSliceDTO>, AppError> {
    let dinners = state
        .dinners
        .find_upcoming(DinnerOrder::RsvpCountDesc, PageRequest::first(WEB_SLICE_SIZE))
        .await?;

    Ok(Json(WebSliceDTO {
        title: "Popular Nerd Dinners".to_string(),
        dinners: dinners.items.into_iter().map(DinnerDTO::from).collect(),
    }))
}

/// Latest-dated dinners from two months out.
#[instrument(skip(state))]
pub async fn upcoming_web_slice(
    State(state): State<Arc<AppState>>,
) -> Result<Json<WebSliceDTO>, AppError> {
    let now = Utc::now();
    let from = now.checked_add_months(Months::new(2)).unwrap_or(now);
    let dinners = state
        .dinners
        .find_upcoming_from(from, DinnerOrder::EventDateDesc, PageRequest::first(WEB_SLICE_SIZE))
        .await?;

    Ok(Json(WebSliceDTO {
        title: "Upcoming Nerd Dinners".to_string(),
        dinners: dinners.items.into_iter().map(DinnerDTO::from).collect(),
    }))
}
