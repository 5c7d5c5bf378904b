//! Router error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouterError {
    #[error("Invalid navigation target: {0}")]
    InvalidPath(String),

    #[error("Redirect loop while navigating to {path} ({hops} hops)")]
    RedirectLoop { path: String, hops: usize },

    #[error("Token validation failed: {0}")]
    Validation(String),
}
