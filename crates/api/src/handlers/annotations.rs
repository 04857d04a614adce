//! Handlers for editing annotation rows.
//!
//! `update_bounding_box` answers with meaningful status codes (400, 404,
//! 500). `update_id` keeps the `{ "success": ... }` envelope at HTTP 200
//! the annotation UI expects.

use annotator_core::annotation::{BoundingBoxInput, TrackIdInput};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::response::{MessageResponse, Outcome};
use crate::state::AppState;

pub const BOUNDING_BOX_UPDATED: &str = "Bounding box updated successfully.";

/// POST /update-bounding-box
///
/// Overwrite the coordinates of every row matching
/// `(frame_id, track_id, class_id)` and write the table back to disk.
pub async fn update_bounding_box(
    State(state): State<AppState>,
    payload: Result<Json<BoundingBoxInput>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(input) = payload.map_err(|e| AppError::Unhandled(e.body_text()))?;

    let update = input.validate()?;

    state.store.update_bounding_box(&update).await?;

    Ok(Json(MessageResponse {
        message: BOUNDING_BOX_UPDATED,
    }))
}

/// POST /update-id
///
/// Reassign a track id within one frame. Succeeds even when no row
/// matched; the edit is held in memory until exported.
pub async fn update_id(
    State(state): State<AppState>,
    payload: Result<Json<TrackIdInput>, JsonRejection>,
) -> Outcome {
    apply_track_id(&state, payload).await.into()
}

async fn apply_track_id(
    state: &AppState,
    payload: Result<Json<TrackIdInput>, JsonRejection>,
) -> AppResult<usize> {
    let Json(input) = payload.map_err(|e| AppError::Unhandled(e.body_text()))?;
    let update = input.validate()?;
    Ok(state.store.update_track_id(&update).await?)
}
