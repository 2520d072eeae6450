//! Search services - JSON feeds for the map

use crate::core::{AppError, AppState};
use crate::dtos::{JsonDinnerDTO, LocationSearchDTO, PopularQuery};
use crate::repositories::{DinnerOrder, PageRequest};
use axum::extract::{Json, Query, State};
use std::sync::Arc;
use tracing::{debug, instrument};

pub const DEFAULT_POPULAR_LIMIT: u32 = 40;

#[instrument(skip(state))]
pub async fn search_by_location(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LocationSearchDTO>,
) -> Result<Json<Vec<JsonDinnerDTO>>, AppError> {
    let dinners = state
        .dinners
        .find_by_location(
            body.latitude,
            body.longitude,
            DinnerOrder::default(),
            PageRequest::default(),
        )
        .await?;

    debug!("Found {} dinners near the point", dinners.items.len());
    Ok(Json(dinners.items.into_iter().map(JsonDinnerDTO::from).collect()))
}

#[instrument(skip(state))]
pub async fn most_popular_dinners(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PopularQuery>,
) -> Result<Json<Vec<JsonDinnerDTO>>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_POPULAR_LIMIT);
    let dinners = state
        .dinners
        .find_upcoming(DinnerOrder::RsvpCountDesc, PageRequest::first(limit))
        .await?;

    Ok(Json(dinners.items.into_iter().map(JsonDinnerDTO::from).collect()))
}
