//! Navigation guard
//!
//! Runs before every route transition and yields exactly one decision.
//! Admin paths are checked against the admin session only; every other
//! path against the end-user session only.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use weknora_session::{Realm, SessionStore};

use crate::table::RouteLocation;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardDecision {
    /// Continue to the requested location
    Proceed,
    /// Go to this path instead
    Redirect(String),
}

impl GuardDecision {
    fn redirect(path: &str) -> Self {
        GuardDecision::Redirect(path.to_string())
    }
}

/// Server-side confirmation that a present token is still accepted.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    async fn validate(&self, realm: Realm, token: &str) -> Result<bool>;
}

pub struct RouteGuard {
    admin: SessionStore,
    end_user: SessionStore,
    /// Off unless explicitly installed
    validator: Option<Arc<dyn TokenValidator>>,
}

impl RouteGuard {
    pub fn new(admin: SessionStore, end_user: SessionStore) -> Self {
        Self {
            admin,
            end_user,
            validator: None,
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn TokenValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    pub fn session(&self, realm: Realm) -> &SessionStore {
        match realm {
            Realm::Admin => &self.admin,
            Realm::EndUser => &self.end_user,
        }
    }

    /// Decide a navigation from session presence alone.
    pub fn check(&self, to: &RouteLocation, from: Option<&RouteLocation>) -> GuardDecision {
        let decision = if to.path.starts_with(Realm::ADMIN_PREFIX) {
            self.check_admin(to)
        } else {
            self.check_end_user(to)
        };

        tracing::debug!(
            to = %to.path,
            from = from.map(|f| f.path.as_str()).unwrap_or("-"),
            decision = ?decision,
            "Guard decision"
        );

        decision
    }

    fn check_admin(&self, to: &RouteLocation) -> GuardDecision {
        let realm = Realm::Admin;

        if to.meta.is_admin_public() {
            let is_entry_page = to.path == realm.login_path() || to.path == "/admin/register";
            if is_entry_page && self.admin.is_logged_in() {
                return GuardDecision::redirect(realm.home_path());
            }
            return GuardDecision::Proceed;
        }

        if !self.admin.is_logged_in() {
            return GuardDecision::redirect(realm.login_path());
        }

        GuardDecision::Proceed
    }

    fn check_end_user(&self, to: &RouteLocation) -> GuardDecision {
        let realm = Realm::EndUser;

        if to.meta.is_public() {
            if to.path == realm.login_path() && self.end_user.is_logged_in() {
                return GuardDecision::redirect(realm.home_path());
            }
            return GuardDecision::Proceed;
        }

        if !self.end_user.is_logged_in() {
            return GuardDecision::redirect(realm.login_path());
        }

        GuardDecision::Proceed
    }

    /// [`check`](Self::check), followed by token revalidation when a
    /// validator is installed.
    ///
    /// Revalidation only runs for protected end-user routes that the
    /// presence check let through. A rejected token, or a failed call, logs
    /// the end-user session out and redirects to its login page.
    pub async fn check_async(
        &self,
        to: &RouteLocation,
        from: Option<&RouteLocation>,
    ) -> GuardDecision {
        let decision = self.check(to, from);

        let Some(validator) = &self.validator else {
            return decision;
        };

        let protected_end_user =
            !to.path.starts_with(Realm::ADMIN_PREFIX) && !to.meta.is_public();
        if decision != GuardDecision::Proceed || !protected_end_user {
            return decision;
        }

        let realm = Realm::EndUser;
        let token = self.end_user.token();

        match validator.validate(realm, &token).await {
            Ok(true) => GuardDecision::Proceed,
            Ok(false) => {
                tracing::info!(realm = %realm, to = %to.path, "Token rejected by backend");
                self.end_user.logout();
                GuardDecision::redirect(realm.login_path())
            }
            Err(e) => {
                tracing::error!(realm = %realm, "Token validation failed: {}", e);
                self.end_user.logout();
                GuardDecision::redirect(realm.login_path())
            }
        }
    }
}

impl Clone for RouteGuard {
    fn clone(&self) -> Self {
        Self {
            admin: self.admin.clone(),
            end_user: self.end_user.clone(),
            validator: self.validator.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RouterError;
    use crate::meta::RouteMeta;
    use crate::table::RouteTable;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use weknora_session::UserInfo;
    use weknora_storage::{KeyValueStore, MemoryStore};

    fn user() -> UserInfo {
        let now = Utc::now();
        UserInfo {
            id: "1".to_string(),
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            avatar: None,
            is_admin: Some(true),
            tenant_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn guard() -> RouteGuard {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        RouteGuard::new(
            SessionStore::new(Realm::Admin, Arc::clone(&storage)),
            SessionStore::new(Realm::EndUser, storage),
        )
    }

    fn decide(guard: &RouteGuard, path: &str) -> GuardDecision {
        let to = RouteTable::console().resolve(path).unwrap();
        guard.check(&to, None)
    }

    fn redirect(path: &str) -> GuardDecision {
        GuardDecision::Redirect(path.to_string())
    }

    #[test]
    fn test_admin_logged_out_protected() {
        let guard = guard();
        assert_eq!(decide(&guard, "/admin/tenants"), redirect("/admin/login"));
        assert_eq!(decide(&guard, "/admin/models/abc"), redirect("/admin/login"));
        assert_eq!(decide(&guard, "/admin/login"), GuardDecision::Proceed);
        assert_eq!(decide(&guard, "/admin/register"), GuardDecision::Proceed);
    }

    #[test]
    fn test_admin_logged_in_entry_pages() {
        let guard = guard();
        guard.session(Realm::Admin).login(user(), "token", "refresh");

        assert_eq!(decide(&guard, "/admin/login"), redirect("/admin/tenants"));
        assert_eq!(decide(&guard, "/admin/register"), redirect("/admin/tenants"));
        assert_eq!(decide(&guard, "/admin/plugins"), GuardDecision::Proceed);
    }

    #[test]
    fn test_end_user_logged_in_login_page() {
        let guard = guard();
        guard.session(Realm::EndUser).login(user(), "token", "");

        assert_eq!(decide(&guard, "/login"), redirect("/platform/knowledge-bases"));
        assert_eq!(decide(&guard, "/platform/settings"), GuardDecision::Proceed);
        assert_eq!(decide(&guard, "/knowledgeBase"), GuardDecision::Proceed);
    }

    #[test]
    fn test_end_user_logged_out_protected() {
        let guard = guard();

        assert_eq!(decide(&guard, "/platform/settings"), redirect("/login"));
        assert_eq!(decide(&guard, "/platform/chat/42"), redirect("/login"));
        assert_eq!(decide(&guard, "/unknown"), redirect("/login"));
        assert_eq!(decide(&guard, "/login"), GuardDecision::Proceed);
    }

    #[test]
    fn test_realms_do_not_cross() {
        let guard = guard();
        guard.session(Realm::Admin).login(user(), "token", "");

        assert_eq!(decide(&guard, "/platform/settings"), redirect("/login"));

        guard.session(Realm::Admin).logout();
        guard.session(Realm::EndUser).login(user(), "token", "");

        assert_eq!(decide(&guard, "/admin/tenants"), redirect("/admin/login"));
    }

    #[test]
    fn test_admin_prefix_wins_over_metadata() {
        let guard = guard();

        // Public end-user flags do not open an admin path
        let to = RouteLocation::new("/admin/custom", RouteMeta::public());
        assert_eq!(guard.check(&to, None), redirect("/admin/login"));

        // Public admin flag, but not an entry page: proceed even when logged in
        guard.session(Realm::Admin).login(user(), "token", "");
        let to = RouteLocation::new("/admin/help", RouteMeta::admin_public());
        assert_eq!(guard.check(&to, None), GuardDecision::Proceed);
    }

    #[test]
    fn test_init_exemption_only_redirects_login() {
        let guard = guard();
        guard.session(Realm::EndUser).login(user(), "token", "");

        let to = RouteLocation::new(
            "/initialization",
            RouteMeta {
                requires_init: Some(false),
                ..RouteMeta::none()
            },
        );
        assert_eq!(guard.check(&to, None), GuardDecision::Proceed);
    }

    struct StaticValidator {
        answer: std::result::Result<bool, String>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TokenValidator for StaticValidator {
        async fn validate(&self, _realm: Realm, _token: &str) -> Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone().map_err(RouterError::Validation)
        }
    }

    fn validating_guard(
        answer: std::result::Result<bool, String>,
    ) -> (RouteGuard, Arc<StaticValidator>) {
        let validator = Arc::new(StaticValidator {
            answer,
            calls: AtomicUsize::new(0),
        });
        let guard = guard().with_validator(validator.clone());
        guard.session(Realm::EndUser).login(user(), "token", "");
        (guard, validator)
    }

    #[tokio::test]
    async fn test_async_without_validator_matches_sync() {
        let guard = guard();
        let to = RouteTable::console().resolve("/platform/agents").unwrap();

        assert_eq!(guard.check_async(&to, None).await, redirect("/login"));
    }

    #[tokio::test]
    async fn test_rejected_token_logs_out() {
        let (guard, validator) = validating_guard(Ok(false));
        let to = RouteTable::console().resolve("/platform/agents").unwrap();

        assert_eq!(guard.check_async(&to, None).await, redirect("/login"));
        assert!(!guard.session(Realm::EndUser).is_logged_in());
        assert_eq!(validator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_validation_error_logs_out() {
        let (guard, _) = validating_guard(Err("connection refused".to_string()));
        let to = RouteTable::console().resolve("/platform/settings").unwrap();

        assert_eq!(guard.check_async(&to, None).await, redirect("/login"));
        assert!(!guard.session(Realm::EndUser).is_logged_in());
    }

    #[tokio::test]
    async fn test_validator_skipped_for_public_and_admin_routes() {
        let (guard, validator) = validating_guard(Ok(false));
        let table = RouteTable::console();

        let login = table.resolve("/login").unwrap();
        assert_eq!(
            guard.check_async(&login, None).await,
            redirect("/platform/knowledge-bases")
        );

        let admin = table.resolve("/admin/login").unwrap();
        assert_eq!(guard.check_async(&admin, None).await, GuardDecision::Proceed);

        assert_eq!(validator.calls.load(Ordering::SeqCst), 0);
        assert!(guard.session(Realm::EndUser).is_logged_in());
    }

    #[tokio::test]
    async fn test_accepted_token_proceeds() {
        let (guard, _) = validating_guard(Ok(true));
        let to = RouteTable::console().resolve("/platform/knowledge-bases/kb-1").unwrap();

        assert_eq!(guard.check_async(&to, None).await, GuardDecision::Proceed);
    }
}
