use axum::{
    extract::State,
    http::StatusCode,
    routing::put,
    Json, Router,
};
use tripboard_schema::{Segment, SegmentId};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::routes::trips::SegmentBody;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", put(update_segment).delete(delete_segment))
}

pub async fn update_segment(
    State(state): State<AppState>,
    ApiPath(segment_id): ApiPath<SegmentId>,
    ApiJson(body): ApiJson<SegmentBody>,
) -> Result<Json<Segment>, ApiError> {
    let segment = state
        .planner
        .update_segment(segment_id, body.into_draft()?)
        .await?;
    Ok(Json(segment))
}

pub async fn delete_segment(
    State(state): State<AppState>,
    ApiPath(segment_id): ApiPath<SegmentId>,
) -> Result<StatusCode, ApiError> {
    state.planner.delete_segment(segment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
