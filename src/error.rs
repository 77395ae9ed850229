use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The database file does not exist and we were not asked to create it.
    #[error("no database found at {}", path.display())]
    Setup { path: PathBuf },

    /// A stored row does not have the shape of an accommodation.
    #[error("malformed row: {0}")]
    MalformedRow(String),

    #[error("request failed: {0}")]
    Remote(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    RemoteStatus { url: String, status: u16 },

    /// The body could not be unwrapped or did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// A listing field failed every parsing strategy.
    #[error("could not parse {field} from {value:?}")]
    FieldParse { field: &'static str, value: String },

    #[error("expected 5 queue points, got {0}")]
    QueueLength(usize),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn field(field: &'static str, value: impl Into<String>) -> Self {
        Self::FieldParse {
            field,
            value: value.into(),
        }
    }
}
