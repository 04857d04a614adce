pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{annotations, table, uploads};
use crate::state::AppState;

/// Build the annotation route tree.
///
/// Mounted at the root because the annotation UI calls these paths
/// directly.
///
/// ```text
/// POST /update-bounding-box      -> annotations::update_bounding_box
/// POST /update-id                -> annotations::update_id
/// POST /upload-csv               -> uploads::upload_csv     (multipart `csvFile`)
/// GET  /download-updated-csv     -> uploads::download_updated_csv
/// GET  /table                    -> table::get_table
/// GET  /rows                     -> table::list_rows        (?frame=&track_id=&class_id=)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/update-bounding-box", post(annotations::update_bounding_box))
        .route("/update-id", post(annotations::update_id))
        .route("/upload-csv", post(uploads::upload_csv))
        .route("/download-updated-csv", get(uploads::download_updated_csv))
        .route("/table", get(table::get_table))
        .route("/rows", get(table::list_rows))
}
