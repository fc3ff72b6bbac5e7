use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileApiError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found: {path}")]
    NotFound { path: String },

    #[error("malformed JSON in {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}
