//! Handlers for replacing the table with an uploaded CSV and downloading
//! the edited table.

use annotator_core::error::CoreError;
use annotator_core::upload::{
    check_upload_name, NO_FILE_PART, UPDATED_FILE_NAME, UPLOADED_FILE_NAME, UPLOAD_FIELD,
};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::error::{AppError, AppResult};
use crate::response::Outcome;
use crate::state::AppState;

/// POST /upload-csv
///
/// Accept a multipart upload in the `csvFile` field, store it as
/// `<UPLOAD_DIR>/uploaded_data.csv` and make it the current table.
pub async fn upload_csv(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Outcome {
    receive_upload(&state, multipart).await.into()
}

async fn receive_upload(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<usize> {
    let mut multipart =
        multipart.map_err(|_| AppError::Core(CoreError::Validation(NO_FILE_PART.to_string())))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        check_upload_name(&file_name)?;

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let dest = state.config.upload_dir.join(UPLOADED_FILE_NAME);
        let rows = state.store.load_upload(&data, dest).await?;

        tracing::info!(file_name = %file_name, rows, bytes = data.len(), "CSV uploaded");
        return Ok(rows);
    }

    Err(AppError::Core(CoreError::Validation(NO_FILE_PART.to_string())))
}

/// GET /download-updated-csv
///
/// Write the current table to `<UPLOAD_DIR>/updated_data.csv` and return
/// it as an attachment.
pub async fn download_updated_csv(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let dest = state.config.upload_dir.join(UPDATED_FILE_NAME);
    let bytes = state.store.export_to(&dest).await?;

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/csv"),
            (CONTENT_DISPOSITION, "attachment; filename=\"updated_data.csv\""),
        ],
        bytes,
    ))
}
