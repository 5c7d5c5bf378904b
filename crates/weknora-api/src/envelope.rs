//! Response envelopes

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Uniform `{success, message, data}` result returned by every endpoint
/// wrapper. Failures never escape as `Err`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResult<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResult<T> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Collapse a transport outcome into an envelope, using `fallback` when
    /// the error carries no message of its own.
    pub fn from_outcome(outcome: Result<ApiResult<T>, ApiError>, fallback: &str) -> Self {
        match outcome {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("{}: {}", fallback, e);
                Self::failure(e.user_message().unwrap_or_else(|| fallback.to_string()))
            }
        }
    }
}

/// Paged listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
}
