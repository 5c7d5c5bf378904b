//! Tenant management endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::envelope::{ApiResult, Page};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrieverType {
    Keywords,
    Vector,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrieverEngine {
    pub retriever_type: RetrieverType,
    pub retriever_engine_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrieverEngines {
    pub engines: Vec<RetrieverEngine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantInfo {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    pub status: TenantStatus,
    #[serde(default)]
    pub business: Option<String>,
    /// Bytes
    pub storage_quota: u64,
    pub storage_used: u64,
    #[serde(default)]
    pub retriever_engines: Option<RetrieverEngines>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TenantInfo {
    /// Fraction of quota in use, 0.0 when the quota is zero
    pub fn storage_usage(&self) -> f64 {
        if self.storage_quota == 0 {
            0.0
        } else {
            self.storage_used as f64 / self.storage_quota as f64
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTenantRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub business: String,
    pub retriever_engines: RetrieverEngines,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_quota: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateTenantRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TenantStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retriever_engines: Option<RetrieverEngines>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_quota: Option<u64>,
}

pub struct TenantApi {
    client: ApiClient,
}

impl TenantApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ApiResult<Page<TenantInfo>> {
        let outcome = self.client.get("/api/v1/tenants").await;
        ApiResult::from_outcome(outcome, "Failed to load tenants")
    }

    pub async fn get(&self, id: u64) -> ApiResult<TenantInfo> {
        let outcome = self.client.get(&format!("/api/v1/tenants/{}", id)).await;
        ApiResult::from_outcome(outcome, "Failed to load tenant")
    }

    pub async fn create(&self, request: &CreateTenantRequest) -> ApiResult<TenantInfo> {
        let outcome = self.client.post("/api/v1/tenants", request).await;
        ApiResult::from_outcome(outcome, "Failed to create tenant")
    }

    pub async fn update(&self, id: u64, request: &UpdateTenantRequest) -> ApiResult<TenantInfo> {
        let outcome = self
            .client
            .put(&format!("/api/v1/tenants/{}", id), request)
            .await;
        ApiResult::from_outcome(outcome, "Failed to update tenant")
    }

    pub async fn delete(&self, id: u64) -> ApiResult<serde_json::Value> {
        let outcome = self.client.delete(&format!("/api/v1/tenants/{}", id)).await;
        ApiResult::from_outcome(outcome, "Failed to delete tenant")
    }
}
