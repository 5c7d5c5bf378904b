//! Plugin management endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{path_segment, with_query, ApiClient};
use crate::envelope::{ApiResult, Page};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginType {
    System,
    #[default]
    Custom,
}

pub type PluginConfig = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub id: String,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    #[serde(default)]
    pub author: Option<String>,
    pub enabled: bool,
    pub plugin_type: PluginType,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub config: Option<PluginConfig>,
    #[serde(default)]
    pub installed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatePluginRequest {
    pub name: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_type: Option<PluginType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<PluginConfig>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdatePluginRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<PluginConfig>,
}

#[derive(Debug, Clone, Default)]
pub struct PluginQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub category: Option<String>,
    pub enabled: Option<bool>,
    pub keyword: Option<String>,
}

impl PluginQuery {
    fn to_path(&self, base: &str) -> String {
        with_query(
            base,
            &[
                ("page", self.page.filter(|p| *p > 0).map(|p| p.to_string())),
                (
                    "page_size",
                    self.page_size.filter(|p| *p > 0).map(|p| p.to_string()),
                ),
                ("category", self.category.clone().filter(|c| !c.is_empty())),
                // `enabled=false` is a real filter, unlike the empty strings above
                ("enabled", self.enabled.map(|e| e.to_string())),
                ("keyword", self.keyword.clone().filter(|k| !k.is_empty())),
            ],
        )
    }
}

pub struct PluginApi {
    client: ApiClient,
}

impl PluginApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &PluginQuery) -> ApiResult<Page<PluginInfo>> {
        let outcome = self.client.get(&query.to_path("/api/v1/plugins")).await;
        ApiResult::from_outcome(outcome, "Failed to load plugins")
    }

    pub async fn get(&self, id: &str) -> ApiResult<PluginInfo> {
        let outcome = self.client.get(&format!("/api/v1/plugins/{}", path_segment(id))).await;
        ApiResult::from_outcome(outcome, "Failed to load plugin")
    }

    pub async fn create(&self, request: &CreatePluginRequest) -> ApiResult<PluginInfo> {
        let outcome = self.client.post("/api/v1/plugins", request).await;
        ApiResult::from_outcome(outcome, "Failed to create plugin")
    }

    pub async fn update(&self, id: &str, request: &UpdatePluginRequest) -> ApiResult<PluginInfo> {
        let outcome = self
            .client
            .put(&format!("/api/v1/plugins/{}", path_segment(id)), request)
            .await;
        ApiResult::from_outcome(outcome, "Failed to update plugin")
    }

    pub async fn delete(&self, id: &str) -> ApiResult<serde_json::Value> {
        let outcome = self.client.delete(&format!("/api/v1/plugins/{}", path_segment(id))).await;
        ApiResult::from_outcome(outcome, "Failed to delete plugin")
    }

    /// Enable or disable through the regular update endpoint
    pub async fn toggle(&self, id: &str, enabled: bool) -> ApiResult<PluginInfo> {
        let request = UpdatePluginRequest {
            enabled: Some(enabled),
            ..Default::default()
        };
        self.update(id, &request).await
    }

    pub async fn categories(&self) -> ApiResult<Vec<String>> {
        let outcome = self.client.get("/api/v1/plugins/categories").await;
        ApiResult::from_outcome(outcome, "Failed to load plugin categories")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, FakeTransport};
    use crate::transport::Method;
    use std::sync::Arc;
    use weknora_session::{Realm, SessionStore};
    use weknora_storage::MemoryStore;

    fn api(transport: Arc<FakeTransport>) -> PluginApi {
        let session = SessionStore::new(Realm::Admin, Arc::new(MemoryStore::new()));
        session.login(testing::user(), "token", "");
        PluginApi::new(ApiClient::new(transport, session))
    }

    const PLUGIN: &str = r#"{
        "id": "plugin-1",
        "name": "export-plugin",
        "display_name": "Export",
        "version": "1.0.0",
        "enabled": false,
        "plugin_type": "system",
        "category": "export",
        "config": {"format": "pdf", "max_pages": 100}
    }"#;

    #[test]
    fn test_query_keeps_enabled_false() {
        let query = PluginQuery {
            enabled: Some(false),
            category: Some("export".to_string()),
            ..Default::default()
        };
        assert_eq!(
            query.to_path("/api/v1/plugins"),
            "/api/v1/plugins?category=export&enabled=false"
        );
    }

    #[tokio::test]
    async fn test_toggle_uses_update() {
        let transport = Arc::new(FakeTransport::new());
        transport.push(200, &format!(r#"{{"success": true, "data": {}}}"#, PLUGIN));

        let result = api(transport.clone()).toggle("plugin-1", true).await;
        assert!(result.success);
        assert_eq!(result.data.unwrap().plugin_type, PluginType::System);

        let sent = transport.requests();
        assert_eq!(sent[0].method, Method::Put);
        assert_eq!(sent[0].path, "/api/v1/plugins/plugin-1");
        assert_eq!(sent[0].body.as_deref(), Some(r#"{"enabled":true}"#));
    }

    #[tokio::test]
    async fn test_id_cannot_escape_resource_path() {
        let transport = Arc::new(FakeTransport::new());
        transport.push(200, r#"{"success": true, "data": null}"#);

        api(transport.clone()).delete("../categories").await;

        assert_eq!(transport.requests()[0].path, "/api/v1/plugins/..%2Fcategories");
    }

    #[tokio::test]
    async fn test_categories() {
        let transport = Arc::new(FakeTransport::new());
        transport.push(200, r#"{"success": true, "data": ["search", "export"]}"#);

        let result = api(transport).categories().await;
        assert_eq!(result.data.unwrap(), vec!["search", "export"]);
    }

    #[tokio::test]
    async fn test_malformed_body_is_failure_envelope() {
        let transport = Arc::new(FakeTransport::new());
        transport.push(200, "<html>proxy error</html>");

        let result = api(transport).get("plugin-1").await;

        assert!(!result.success);
        assert_eq!(result.message.as_deref(), Some("Failed to load plugin"));
    }
}
