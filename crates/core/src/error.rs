#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid CSV: {0}")]
    Format(String),

    #[error("{0}")]
    UnsupportedType(String),

    #[error("No CSV data has been loaded")]
    NotLoaded,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for CoreError {
    fn from(err: csv::Error) -> Self {
        if !err.is_io_error() {
            return CoreError::Format(err.to_string());
        }
        match err.into_kind() {
            csv::ErrorKind::Io(io) => CoreError::Io(io),
            other => CoreError::Format(format!("{other:?}")),
        }
    }
}
