//! Error types shared across the workspace

use thiserror::Error;

/// Top-level error for site assistant operations.
///
/// Crate-specific errors (`KnowledgeError`, `PersistenceError`, `NluError`, ...)
/// convert into this type at crate boundaries.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Training error: {0}")]
    Training(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Knowledge base error: {0}")]
    Knowledge(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for errors caused by the caller's input rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Message without the kind prefix, as shown to API callers.
    pub fn message(&self) -> &str {
        match self {
            Error::Validation(msg)
            | Error::NotFound(msg)
            | Error::Persistence(msg)
            | Error::Training(msg)
            | Error::Inference(msg)
            | Error::Knowledge(msg)
            | Error::Config(msg) => msg,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
