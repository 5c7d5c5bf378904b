//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] weknora_storage::StorageError),

    #[error("Session error: {0}")]
    Session(#[from] weknora_session::SessionError),

    #[error("Routing error: {0}")]
    Router(#[from] weknora_router::RouterError),

    #[error("API error: {0}")]
    Api(#[from] weknora_api::ApiError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
