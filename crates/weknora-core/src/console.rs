//! Console state container
//!
//! Owns durable storage, both realm sessions, the router and the backend
//! API clients, and wires the 401 feedback path between them.

use async_trait::async_trait;
use std::sync::Arc;

use weknora_api::{
    ApiClient, AuthApi, AuthFailureHandler, HttpTransport, LoginRequest, LoginResponse, ModelApi,
    PluginApi, TenantApi, Transport, TransportConfig,
};
use weknora_router::{Navigation, RouteGuard, RouteTable, Router, RouterError, TokenValidator};
use weknora_session::{Realm, SessionStore};
use weknora_storage::{KeyValueStore, SqliteStore};

use crate::config::Config;
use crate::Result;

/// Sends the router to a realm's login page after the backend rejected
/// that realm's credentials.
struct LoginRedirect {
    router: Router,
}

impl AuthFailureHandler for LoginRedirect {
    fn on_auth_failure(&self, realm: Realm) {
        let login = realm.login_path();

        let already_there = self
            .router
            .current()
            .is_some_and(|current| current.path == login);
        if already_there {
            tracing::debug!(realm = %realm, "Already on login page");
            return;
        }

        match self.router.navigate(login) {
            Ok(nav) => tracing::info!(realm = %realm, path = %nav.path(), "Redirected after 401"),
            Err(e) => tracing::error!(realm = %realm, "Failed to redirect after 401: {}", e),
        }
    }
}

/// Asks the backend whether a realm's token is still accepted.
struct BackendValidator {
    admin: AuthApi,
    end_user: AuthApi,
}

#[async_trait]
impl TokenValidator for BackendValidator {
    async fn validate(&self, realm: Realm, token: &str) -> weknora_router::Result<bool> {
        if token.is_empty() {
            return Ok(false);
        }

        let auth = match realm {
            Realm::Admin => &self.admin,
            Realm::EndUser => &self.end_user,
        };

        auth.validate_token()
            .await
            .map_err(|e| RouterError::Validation(e.to_string()))
    }
}

pub struct Console {
    config: Config,
    storage: Arc<dyn KeyValueStore>,
    admin_session: SessionStore,
    end_user_session: SessionStore,
    router: Router,
    admin_auth: AuthApi,
    end_user_auth: AuthApi,
    tenants: TenantApi,
    models: ModelApi,
    plugins: PluginApi,
}

impl Console {
    /// Open the SQLite store and HTTP transport described by `config`.
    pub fn new(config: Config) -> Result<Self> {
        let transport = HttpTransport::new(&TransportConfig {
            base_url: config.api_base_url.clone(),
            timeout_seconds: config.request_timeout_secs,
        })?;

        if let Some(parent) = config.storage_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let storage = SqliteStore::open(&config.storage_path)?;
        tracing::info!(
            storage = %config.storage_path.display(),
            api = %transport.base_url(),
            "Opened console backends"
        );

        Ok(Self::with_parts(config, Arc::new(storage), Arc::new(transport)))
    }

    /// Assemble from already-built storage and transport.
    pub fn with_parts(
        config: Config,
        storage: Arc<dyn KeyValueStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let admin_session = SessionStore::new(Realm::Admin, Arc::clone(&storage));
        let end_user_session = SessionStore::new(Realm::EndUser, Arc::clone(&storage));

        let mut guard = RouteGuard::new(admin_session.clone(), end_user_session.clone());
        if config.validate_tokens {
            // No auth-failure handler here: the guard already redirects
            // when validation fails, and a handler would re-enter the router.
            guard = guard.with_validator(Arc::new(BackendValidator {
                admin: AuthApi::new(ApiClient::new(
                    Arc::clone(&transport),
                    admin_session.clone(),
                )),
                end_user: AuthApi::new(ApiClient::new(
                    Arc::clone(&transport),
                    end_user_session.clone(),
                )),
            }));
        }
        let router = Router::new(RouteTable::console(), guard);

        let on_auth_failure: Arc<dyn AuthFailureHandler> = Arc::new(LoginRedirect {
            router: router.clone(),
        });
        let admin_client = ApiClient::new(Arc::clone(&transport), admin_session.clone())
            .with_auth_failure_handler(Arc::clone(&on_auth_failure));
        let end_user_client = ApiClient::new(transport, end_user_session.clone())
            .with_auth_failure_handler(on_auth_failure);

        tracing::info!(
            admin_logged_in = admin_session.is_logged_in(),
            end_user_logged_in = end_user_session.is_logged_in(),
            validate_tokens = config.validate_tokens,
            "Console initialized"
        );

        Self {
            config,
            storage,
            admin_session,
            end_user_session,
            router,
            admin_auth: AuthApi::new(admin_client.clone()),
            end_user_auth: AuthApi::new(end_user_client),
            tenants: TenantApi::new(admin_client.clone()),
            models: ModelApi::new(admin_client.clone()),
            plugins: PluginApi::new(admin_client),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    pub fn session(&self, realm: Realm) -> &SessionStore {
        match realm {
            Realm::Admin => &self.admin_session,
            Realm::EndUser => &self.end_user_session,
        }
    }

    pub fn admin_session(&self) -> &SessionStore {
        &self.admin_session
    }

    pub fn end_user_session(&self) -> &SessionStore {
        &self.end_user_session
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn auth(&self, realm: Realm) -> &AuthApi {
        match realm {
            Realm::Admin => &self.admin_auth,
            Realm::EndUser => &self.end_user_auth,
        }
    }

    pub fn tenants(&self) -> &TenantApi {
        &self.tenants
    }

    pub fn models(&self) -> &ModelApi {
        &self.models
    }

    pub fn plugins(&self) -> &PluginApi {
        &self.plugins
    }

    /// Navigate through static redirects and the guard, revalidating the
    /// end-user token when configured to.
    pub async fn navigate(&self, target: &str) -> Result<Navigation> {
        Ok(self.router.navigate_async(target).await?)
    }

    /// Log a realm in and, on success, move to its home page.
    pub async fn login(&self, realm: Realm, request: &LoginRequest) -> Result<LoginResponse> {
        let response = self.auth(realm).login(request).await;

        if response.success && self.session(realm).is_logged_in() {
            tracing::info!(realm = %realm, "Logged in");
            self.router.navigate(realm.home_path())?;
        }

        Ok(response)
    }

    /// Log a realm out. When the current page belongs to that realm the
    /// router is re-run on it, which sends protected pages to the login page.
    pub fn logout(&self, realm: Realm) -> Result<Option<Navigation>> {
        self.session(realm).logout();
        tracing::info!(realm = %realm, "Logged out");

        let Some(current) = self.router.current() else {
            return Ok(None);
        };
        if Realm::for_path(&current.path) != realm {
            return Ok(None);
        }

        Ok(Some(self.router.navigate(&current.full_path())?))
    }
}
