//! Credential bundle data

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account record returned by the backend on login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The (user, access token, refresh token) triple of one realm.
///
/// Empty strings stand for absent tokens.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CredentialBundle {
    pub user: Option<UserInfo>,
    pub access_token: String,
    pub refresh_token: String,
}

impl CredentialBundle {
    pub fn new(user: UserInfo, access_token: String, refresh_token: String) -> Self {
        Self {
            user: Some(user),
            access_token,
            refresh_token,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some() && !self.access_token.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.access_token.is_empty() && self.refresh_token.is_empty()
    }
}
