//! API error types

use thiserror::Error;

use weknora_session::Realm;

#[derive(Error, Debug)]
pub enum ApiError {
    /// No response was received at all
    #[error("Network error: {0}")]
    Network(String),

    /// The backend rejected the realm's credentials
    #[error("Unauthorized ({realm}): {message}")]
    Unauthorized { realm: Realm, message: String },

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message suitable for a failure envelope, `None` when the backend
    /// gave nothing usable
    pub fn user_message(&self) -> Option<String> {
        let message = match self {
            ApiError::Network(message) => message.clone(),
            ApiError::Unauthorized { message, .. } => message.clone(),
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Decode(_) | ApiError::Client(_) => return None,
        };

        Some(message).filter(|m| !m.trim().is_empty())
    }
}
