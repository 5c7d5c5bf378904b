//! Test doubles

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::VecDeque;

use weknora_session::UserInfo;

use crate::error::ApiError;
use crate::transport::{ApiRequest, RawResponse, Transport, NETWORK_ERROR_MESSAGE};
use crate::Result;

/// Replays queued responses in order; an empty queue behaves like a dead
/// network.
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<VecDeque<RawResponse>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, status: u16, body: &str) {
        self.responses.lock().push_back(RawResponse {
            status,
            body: body.to_string(),
        });
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse> {
        self.requests.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .ok_or_else(|| ApiError::Network(NETWORK_ERROR_MESSAGE.to_string()))
    }
}

pub fn user() -> UserInfo {
    let now = Utc::now();
    UserInfo {
        id: "admin-1".to_string(),
        username: "admin".to_string(),
        email: "admin@example.com".to_string(),
        avatar: None,
        is_admin: Some(true),
        tenant_id: None,
        created_at: now,
        updated_at: now,
    }
}
