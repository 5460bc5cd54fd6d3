use thiserror::Error;

pub type Result<T> = std::result::Result<T, QaError>;

#[derive(Error, Debug)]
pub enum QaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Remote service error: {0}")]
    RemoteService(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Document error: {0}")]
    Document(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl QaError {
    /// Whether the error was caused by the caller's input rather than by the service
    #[inline]
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    #[inline]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteService(_))
    }
}

impl From<config::ConfigError> for QaError {
    #[inline]
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

pub mod answer;
pub mod commands;
pub mod config;
pub mod embeddings;
pub mod index;
pub mod ingest;
pub mod logging;
pub mod openai;
pub mod web;
