//! Read-only views of the loaded table.

use annotator_core::table::RowFilter;
use annotator_core::types::FieldValue;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /table
pub async fn get_table(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let summary = state.store.summary().await?;
    Ok(Json(DataResponse { data: summary }))
}

/// Query parameters for the row lookup; absent keys do not filter.
#[derive(Debug, Default, Deserialize)]
pub struct RowQuery {
    pub frame: Option<String>,
    pub track_id: Option<String>,
    pub class_id: Option<String>,
}

impl From<RowQuery> for RowFilter {
    fn from(query: RowQuery) -> Self {
        Self {
            frame: query.frame.map(FieldValue::Text),
            track_id: query.track_id.map(FieldValue::Text),
            class_id: query.class_id.map(FieldValue::Text),
        }
    }
}

/// GET /rows?frame=&track_id=&class_id=
pub async fn list_rows(
    State(state): State<AppState>,
    Query(query): Query<RowQuery>,
) -> AppResult<impl IntoResponse> {
    let rows = state.store.select(&query.into()).await?;
    Ok(Json(DataResponse { data: rows }))
}
