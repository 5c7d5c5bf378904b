//! Model management endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::client::{path_segment, with_query, ApiClient};
use crate::envelope::{ApiResult, Page};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelType {
    #[serde(rename = "KnowledgeQA")]
    KnowledgeQa,
    Embedding,
    Rerank,
    #[serde(rename = "VLLM")]
    Vllm,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::KnowledgeQa => "KnowledgeQA",
            ModelType::Embedding => "Embedding",
            ModelType::Rerank => "Rerank",
            ModelType::Vllm => "VLLM",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelSource {
    Local,
    Remote,
}

impl ModelSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelSource::Local => "local",
            ModelSource::Remote => "remote",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceType {
    Ollama,
    OpenAi,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncate_prompt_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_parameters: Option<EmbeddingParameters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface_type: Option<InterfaceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_config: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    #[serde(default)]
    pub tenant_id: Option<u64>,
    pub name: String,
    #[serde(rename = "type")]
    pub model_type: ModelType,
    pub source: ModelSource,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: ModelParameters,
    #[serde(default)]
    pub is_default: Option<bool>,
    #[serde(default)]
    pub is_builtin: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateModelRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub model_type: ModelType,
    pub source: ModelSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: ModelParameters,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateModelRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ModelParameters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

/// The backend answers listings either as a bare array or as a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelList {
    Items(Vec<ModelInfo>),
    Paged(Page<ModelInfo>),
}

impl ModelList {
    pub fn items(&self) -> &[ModelInfo] {
        match self {
            ModelList::Items(items) => items,
            ModelList::Paged(page) => &page.items,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModelQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub model_type: Option<ModelType>,
    pub source: Option<ModelSource>,
    pub keyword: Option<String>,
}

impl ModelQuery {
    fn to_path(&self, base: &str) -> String {
        with_query(
            base,
            &[
                ("page", self.page.filter(|p| *p > 0).map(|p| p.to_string())),
                (
                    "page_size",
                    self.page_size.filter(|p| *p > 0).map(|p| p.to_string()),
                ),
                ("type", self.model_type.map(|t| t.as_str().to_string())),
                ("source", self.source.map(|s| s.as_str().to_string())),
                ("keyword", self.keyword.clone().filter(|k| !k.is_empty())),
            ],
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultUrls {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rerank: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default_urls: Option<DefaultUrls>,
    #[serde(default)]
    pub model_types: Option<Vec<String>>,
}

impl ProviderInfo {
    pub fn supports(&self, model_type: ModelType) -> bool {
        self.model_types
            .as_ref()
            .map(|types| types.iter().any(|t| t == model_type.as_str()))
            .unwrap_or(false)
    }
}

pub struct ModelApi {
    client: ApiClient,
}

impl ModelApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &ModelQuery) -> ApiResult<ModelList> {
        let outcome = self.client.get(&query.to_path("/api/v1/models")).await;
        ApiResult::from_outcome(outcome, "Failed to load models")
    }

    pub async fn get(&self, id: &str) -> ApiResult<ModelInfo> {
        let outcome = self.client.get(&format!("/api/v1/models/{}", path_segment(id))).await;
        ApiResult::from_outcome(outcome, "Failed to load model")
    }

    pub async fn create(&self, request: &CreateModelRequest) -> ApiResult<ModelInfo> {
        let outcome = self.client.post("/api/v1/models", request).await;
        ApiResult::from_outcome(outcome, "Failed to create model")
    }

    pub async fn update(&self, id: &str, request: &UpdateModelRequest) -> ApiResult<ModelInfo> {
        let outcome = self
            .client
            .put(&format!("/api/v1/models/{}", path_segment(id)), request)
            .await;
        ApiResult::from_outcome(outcome, "Failed to update model")
    }

    pub async fn delete(&self, id: &str) -> ApiResult<serde_json::Value> {
        let outcome = self.client.delete(&format!("/api/v1/models/{}", path_segment(id))).await;
        ApiResult::from_outcome(outcome, "Failed to delete model")
    }

    pub async fn providers(&self, model_type: Option<ModelType>) -> ApiResult<Vec<ProviderInfo>> {
        let path = with_query(
            "/api/v1/models/providers",
            &[("model_type", model_type.map(|t| t.as_str().to_string()))],
        );
        let outcome = self.client.get(&path).await;
        ApiResult::from_outcome(outcome, "Failed to load providers")
    }
}
