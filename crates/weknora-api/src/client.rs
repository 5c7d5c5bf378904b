//! Realm-bound API client
//!
//! Attaches the realm's bearer token to every request and turns a 401 into
//! a forced logout of that realm.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use weknora_session::{Realm, SessionStore};

use crate::error::ApiError;
use crate::transport::{ApiRequest, Method, Transport};
use crate::Result;

/// Told when a realm lost its session because the backend returned 401.
pub trait AuthFailureHandler: Send + Sync {
    fn on_auth_failure(&self, realm: Realm);
}

pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: SessionStore,
    auth_failure: Option<Arc<dyn AuthFailureHandler>>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, session: SessionStore) -> Self {
        Self {
            transport,
            session,
            auth_failure: None,
        }
    }

    pub fn with_auth_failure_handler(mut self, handler: Arc<dyn AuthFailureHandler>) -> Self {
        self.auth_failure = Some(handler);
        self
    }

    pub fn realm(&self) -> Realm {
        self.session.realm()
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::Get, path, None).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_string(body)?;
        self.request(Method::Post, path, Some(body)).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_string(body)?;
        self.request(Method::Put, path, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::Delete, path, None).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<T> {
        let token = self.session.token();
        let request = ApiRequest {
            method,
            path: path.to_string(),
            body,
            bearer: Some(token).filter(|t| !t.is_empty()),
            request_id: new_request_id(),
        };

        tracing::debug!(
            realm = %self.realm(),
            method = method.as_str(),
            path = %path,
            request_id = %request.request_id,
            "Sending request"
        );

        let response = self.transport.send(request).await?;

        match classify(self.realm(), response.status, &response.body) {
            Ok(value) => Ok(serde_json::from_value(value)?),
            Err(e @ ApiError::Unauthorized { .. }) => {
                self.handle_unauthorized(path);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    fn handle_unauthorized(&self, path: &str) {
        let realm = self.realm();
        tracing::warn!(realm = %realm, path = %path, "Backend rejected credentials, logging out");

        self.session.logout();
        if let Some(handler) = &self.auth_failure {
            handler.on_auth_failure(realm);
        }
    }
}

impl Clone for ApiClient {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            session: self.session.clone(),
            auth_failure: self.auth_failure.clone(),
        }
    }
}

/// Map a raw response to its JSON body or an error.
///
/// Only 200 and 201 count as success.
pub fn classify(realm: Realm, status: u16, body: &str) -> Result<serde_json::Value> {
    match status {
        200 | 201 => {
            if body.trim().is_empty() {
                Ok(serde_json::Value::Null)
            } else {
                Ok(serde_json::from_str(body)?)
            }
        }
        401 => Err(ApiError::Unauthorized {
            realm,
            message: error_message(body),
        }),
        _ => Err(ApiError::Status {
            status,
            message: error_message(body),
        }),
    }
}

/// `error.message`, else `message`, else the raw body when it is not JSON.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => map
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .or_else(|| map.get("message").and_then(|m| m.as_str()))
            .unwrap_or_default()
            .to_string(),
        Ok(serde_json::Value::String(s)) => s,
        Ok(_) => String::new(),
        Err(_) => body.to_string(),
    }
}

/// Append non-empty query pairs to `path`.
pub(crate) fn with_query(path: &str, pairs: &[(&str, Option<String>)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in pairs {
        if let Some(value) = value {
            serializer.append_pair(key, value);
            any = true;
        }
    }

    if any {
        format!("{}?{}", path, serializer.finish())
    } else {
        path.to_string()
    }
}

/// Encode `id` as a single path segment so it cannot change the endpoint.
pub(crate) fn path_segment(id: &str) -> String {
    match id {
        "." => "%2E".to_string(),
        ".." => "%2E%2E".to_string(),
        _ => urlencoding::encode(id).into_owned(),
    }
}

fn new_request_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..12].to_string()
}
