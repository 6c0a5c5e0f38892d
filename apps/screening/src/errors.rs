use thiserror::Error;

/// Application-level error type.
/// Remote failures are caught inside the reconciler and degrade to empty
/// local state; only delete failures ever reach the user, via the
/// presentation collaborator.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store rejected the request (status {status}): {message}")]
    Store { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Cache I/O error: {0}")]
    Cache(#[from] std::io::Error),

    #[error("Result carries neither an analysis id nor a file id")]
    MissingDeleteKey,

    #[error("No delete strategy succeeded")]
    DeleteExhausted,
}
