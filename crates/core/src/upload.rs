//! Upload naming rules and fixed file locations under the upload directory.

use std::path::Path;

use crate::error::CoreError;

/// Multipart field carrying the CSV file.
pub const UPLOAD_FIELD: &str = "csvFile";

/// File name an accepted upload is stored under.
pub const UPLOADED_FILE_NAME: &str = "uploaded_data.csv";

/// File name the current table is exported to for download.
pub const UPDATED_FILE_NAME: &str = "updated_data.csv";

/// Extensions accepted for upload (lowercase, without the dot).
pub const ALLOWED_EXTENSIONS: &[&str] = &["csv"];

pub const NO_FILE_PART: &str = "No file part";
pub const NO_SELECTED_FILE: &str = "No selected file";
pub const UNSUPPORTED_FILE_TYPE: &str = "Unsupported file type";

/// Check the client-supplied file name of an upload.
pub fn check_upload_name(file_name: &str) -> Result<(), CoreError> {
    if file_name.trim().is_empty() {
        return Err(CoreError::Validation(NO_SELECTED_FILE.to_string()));
    }

    let allowed = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false);

    if allowed {
        Ok(())
    } else {
        Err(CoreError::UnsupportedType(UNSUPPORTED_FILE_TYPE.to_string()))
    }
}
