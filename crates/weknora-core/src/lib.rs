//! WeKnora Console Core
//!
//! Composition root for the admin console: configuration, durable storage,
//! the two realm sessions, routing and the backend API.

mod config;
mod console;
mod error;

pub use config::{Config, ENV_API_BASE_URL, ENV_DATA_DIR, ENV_IS_DOCKER, ENV_VALIDATE_TOKENS};
pub use console::Console;
pub use error::CoreError;

// Re-export core components
pub use weknora_api::{
    ApiClient, ApiError, ApiResult, AuthApi, AuthFailureHandler, LoginRequest, LoginResponse,
    ModelApi, Page, PluginApi, TenantApi, Transport,
};
pub use weknora_router::{
    GuardDecision, Navigation, RouteGuard, RouteLocation, RouteMeta, RouteTable, Router,
    RouterError, TokenValidator,
};
pub use weknora_session::{CredentialBundle, Realm, SessionError, SessionStore, UserInfo};
pub use weknora_storage::{KeyValueStore, MemoryStore, SqliteStore, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
