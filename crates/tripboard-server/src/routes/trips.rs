use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use tripboard_core::{Itinerary, ItineraryEntry, ReconcilePlan};
use tripboard_schema::{Segment, SegmentDraft, Trip, TripId, TripWithSegments};

use crate::error::{parse_dates, ApiError};
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTripBody {
    pub title: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Deserialize)]
pub struct TripDatesBody {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Deserialize)]
pub struct SegmentBody {
    pub place_name: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl SegmentBody {
    pub fn into_draft(self) -> Result<SegmentDraft, ApiError> {
        Ok(SegmentDraft {
            dates: parse_dates(&self.start, &self.end)?,
            place_name: self.place_name,
            notes: self.notes,
        })
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_trips).post(create_trip))
        .route("/{id}", get(get_trip).delete(delete_trip))
        .route("/{id}/dates", patch(update_trip_dates))
        .route("/{id}/dates/preview", post(preview_trip_dates))
        .route("/{id}/itinerary", get(itinerary))
        .route("/{id}/days/{day}", get(base_for_day))
        .route("/{id}/segments", post(create_segment))
}

pub async fn list_trips(State(state): State<AppState>) -> Result<Json<Vec<Trip>>, ApiError> {
    Ok(Json(state.planner.list_trips().await?))
}

pub async fn create_trip(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateTripBody>,
) -> Result<(StatusCode, Json<Trip>), ApiError> {
    let dates = parse_dates(&body.start, &body.end)?;
    let trip = state.planner.create_trip(&body.title, dates).await?;
    Ok((StatusCode::CREATED, Json(trip)))
}

pub async fn get_trip(
    State(state): State<AppState>,
    ApiPath(trip_id): ApiPath<TripId>,
) -> Result<Json<TripWithSegments>, ApiError> {
    Ok(Json(state.planner.get_trip(trip_id).await?))
}

pub async fn delete_trip(
    State(state): State<AppState>,
    ApiPath(trip_id): ApiPath<TripId>,
) -> Result<StatusCode, ApiError> {
    state.planner.delete_trip(trip_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_trip_dates(
    State(state): State<AppState>,
    ApiPath(trip_id): ApiPath<TripId>,
    ApiJson(body): ApiJson<TripDatesBody>,
) -> Result<Json<ReconcilePlan>, ApiError> {
    let dates = parse_dates(&body.start, &body.end)?;
    Ok(Json(state.planner.update_trip_dates(trip_id, dates).await?))
}

pub async fn preview_trip_dates(
    State(state): State<AppState>,
    ApiPath(trip_id): ApiPath<TripId>,
    ApiJson(body): ApiJson<TripDatesBody>,
) -> Result<Json<ReconcilePlan>, ApiError> {
    let dates = parse_dates(&body.start, &body.end)?;
    Ok(Json(state.planner.preview_trip_dates(trip_id, dates).await?))
}

pub async fn itinerary(
    State(state): State<AppState>,
    ApiPath(trip_id): ApiPath<TripId>,
) -> Result<Json<Itinerary>, ApiError> {
    Ok(Json(state.planner.itinerary(trip_id).await?))
}

pub async fn base_for_day(
    State(state): State<AppState>,
    ApiPath((trip_id, day)): ApiPath<(TripId, i64)>,
) -> Result<Json<ItineraryEntry>, ApiError> {
    Ok(Json(state.planner.base_for_day(trip_id, day).await?))
}

pub async fn create_segment(
    State(state): State<AppState>,
    ApiPath(trip_id): ApiPath<TripId>,
    ApiJson(body): ApiJson<SegmentBody>,
) -> Result<(StatusCode, Json<Segment>), ApiError> {
    let segment = state
        .planner
        .create_segment(trip_id, body.into_draft()?)
        .await?;
    Ok((StatusCode::CREATED, Json(segment)))
}
