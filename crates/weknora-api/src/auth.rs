//! Authentication endpoints
//!
//! Both realms log in through the same backend endpoints; the realm of the
//! wrapped client decides which session a successful login populates.

use serde::{Deserialize, Serialize};

use weknora_session::UserInfo;

use crate::client::ApiClient;
use crate::envelope::ApiResult;
use crate::Result;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login answers are flat rather than wrapped in `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl LoginResponse {
    fn failure(message: String) -> Self {
        Self {
            success: false,
            message: Some(message),
            user: None,
            token: None,
            refresh_token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub id: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterData {
    pub user: RegisteredUser,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub user: UserInfo,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct ValidateResponse {
    valid: bool,
}

pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Log in and, on success, install the returned bundle in the client's
    /// realm session.
    pub async fn login(&self, request: &LoginRequest) -> LoginResponse {
        let response = match self
            .client
            .post::<LoginResponse, _>("/api/v1/auth/login", request)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(realm = %self.client.realm(), "Login failed: {}", e);
                return LoginResponse::failure(
                    e.user_message().unwrap_or_else(|| "Login failed".to_string()),
                );
            }
        };

        if response.success {
            match (&response.user, &response.token) {
                (Some(user), Some(token)) if !token.is_empty() => {
                    self.client.session().login(
                        user.clone(),
                        token.clone(),
                        response.refresh_token.clone().unwrap_or_default(),
                    );
                }
                _ => {
                    tracing::warn!(
                        realm = %self.client.realm(),
                        "Login succeeded without user or token"
                    );
                }
            }
        }

        response
    }

    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<RegisterData> {
        let outcome = self.client.post("/api/v1/auth/register", request).await;
        ApiResult::from_outcome(outcome, "Registration failed")
    }

    pub async fn current_user(&self) -> ApiResult<CurrentUser> {
        let outcome = self.client.get("/api/v1/auth/me").await;
        ApiResult::from_outcome(outcome, "Failed to load current user")
    }

    /// Ask the backend whether the session's token is still accepted.
    pub async fn validate_token(&self) -> Result<bool> {
        let response: ValidateResponse = self.client.get("/api/v1/auth/validate").await?;
        Ok(response.valid)
    }

    pub fn logout(&self) {
        self.client.session().logout();
    }
}
