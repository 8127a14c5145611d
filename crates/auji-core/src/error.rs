use thiserror::Error;

/// Application-wide error types for AUJI.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed (fetching a page).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request or render wait timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Browser session could not be launched or driven.
    #[error("Browser error: {0}")]
    BrowserError(String),

    /// A listing page could not be turned into postings at all.
    #[error("Extraction error: {0}")]
    ExtractionError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Caller asked for something the engine does not know how to run.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Another run already holds this source + category key.
    #[error("A run for {0} is already in progress")]
    RunInProgress(String),

    /// The run was cancelled between page iterations.
    #[error("Run cancelled after {pages_done} page(s)")]
    Cancelled { pages_done: usize },

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Returns true if this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::NetworkError(_) | AppError::Timeout(_) => true,
            AppError::HttpError(msg) => {
                msg.contains("timeout") || msg.contains("connect") || msg.contains("reset")
            }
            AppError::RunInProgress(_) => true,
            _ => false,
        }
    }
}
