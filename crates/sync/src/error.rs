use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Local failures of the sync engine.
///
/// Remote failures are classified separately by
/// [`ClientError`](crate::client::ClientError).
#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no credential stored, login required")]
    MissingCredential,
    #[error("invalid base_url: {0}")]
    InvalidBaseUrl(String),
}
