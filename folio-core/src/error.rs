//! Error types for folio-core

use thiserror::Error;

/// Main error type for the folio-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// The external analytics entry point raised while handling a call
    #[error("analytics host error: {0}")]
    Host(String),

    /// Reading an attribute or text from a page element failed
    #[error("element read error: {0}")]
    Dom(String),

    /// A header name or value is not valid HTTP
    #[error("invalid header: {0}")]
    Header(String),
}

/// Result type alias for folio-core
pub type Result<T> = std::result::Result<T, Error>;
