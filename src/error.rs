use thiserror::Error;
use tokio::io;

use crate::credentials::StorageError;

pub type ServiceResult<T> = core::result::Result<T, ServiceError>;

/// Fallback shown when a failure response carries no usable `error` field.
pub const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Non-2xx response. Displays only the server-provided message.
    #[error("{message}")]
    Http { status: u16, message: String },
    /// The request never completed.
    #[error("{0}")]
    Network(String),
    /// A success response whose body could not be decoded.
    #[error("{0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    IoError(#[from] io::Error),
    #[error("{0}")]
    Prompt(#[from] dialoguer::Error),
    #[error("{0}")]
    Storage(#[from] StorageError),
    #[error("{0}")]
    Config(String),
}
