//! WeKnora Backend API
//!
//! Typed wrappers over the platform's HTTP API. Each client is bound to one
//! realm's session:
//! - the realm's bearer token is attached to every request
//! - a 401 logs that realm out and notifies the installed handler
//! - endpoint wrappers return [`ApiResult`] envelopes and never fail
//!
//! Requests are sent once; there is no retry.

mod auth;
mod client;
mod envelope;
mod error;
mod model;
mod plugin;
mod tenant;
mod transport;

#[cfg(test)]
mod testing;

pub use auth::{
    AuthApi, CurrentUser, LoginRequest, LoginResponse, RegisterData, RegisterRequest,
    RegisteredUser,
};
pub use client::{classify, error_message, ApiClient, AuthFailureHandler};
pub use envelope::{ApiResult, Page};
pub use error::ApiError;
pub use model::{
    CreateModelRequest, DefaultUrls, EmbeddingParameters, InterfaceType, ModelApi, ModelInfo,
    ModelList, ModelParameters, ModelQuery, ModelSource, ModelType, ProviderInfo,
    UpdateModelRequest,
};
pub use plugin::{
    CreatePluginRequest, PluginApi, PluginConfig, PluginInfo, PluginQuery, PluginType,
    UpdatePluginRequest,
};
pub use tenant::{
    CreateTenantRequest, RetrieverEngine, RetrieverEngines, RetrieverType, TenantApi, TenantInfo,
    TenantStatus, UpdateTenantRequest,
};
pub use transport::{
    ApiRequest, HttpTransport, Method, RawResponse, Transport, TransportConfig,
    NETWORK_ERROR_MESSAGE,
};

pub type Result<T> = std::result::Result<T, ApiError>;
