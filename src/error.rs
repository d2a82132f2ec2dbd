use thiserror::Error;

/// Error taxonomy for the analyst core.
///
/// Every variant degrades to an inline message in the session driver; nothing
/// here is fatal to the process and nothing is retried automatically.
#[derive(Error, Debug)]
pub enum Error {
    /// Rejected input (malformed ticker, unknown sector, bad settings value).
    /// Raised before any state mutation.
    #[error("invalid input: {0}")]
    InputValidation(String),

    /// A document payload could not be turned into text. Aborts ingestion of
    /// that one item only.
    #[error("failed to parse {name}: {message}")]
    ParseFailure { name: String, message: String },

    /// Completion backend unreachable or not configured.
    #[error("Error: completion service unavailable ({0})")]
    ServiceUnavailable(String),

    /// Completion backend reachable but returned an error.
    #[error("Error calling completion service: {0}")]
    Provider(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
