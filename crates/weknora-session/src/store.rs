//! Session store
//!
//! In-memory mirror of one realm's credential bundle, written through to
//! durable storage. Storage failures are logged and swallowed so that a
//! broken disk never blocks a login or logout.

use parking_lot::RwLock;
use std::sync::Arc;

use weknora_storage::KeyValueStore;

use crate::error::SessionError;
use crate::realm::Realm;
use crate::user::{CredentialBundle, UserInfo};
use crate::Result;

pub struct SessionStore {
    realm: Realm,
    /// Authoritative in-memory bundle
    state: Arc<RwLock<CredentialBundle>>,
    /// Durable slots, shared with the other realm but keyed apart
    storage: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    /// Create the store for `realm` and hydrate it from `storage`.
    pub fn new(realm: Realm, storage: Arc<dyn KeyValueStore>) -> Self {
        let store = Self {
            realm,
            state: Arc::new(RwLock::new(CredentialBundle::default())),
            storage,
        };
        store.hydrate();
        store
    }

    pub fn realm(&self) -> Realm {
        self.realm
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.read().is_logged_in()
    }

    pub fn is_admin(&self) -> bool {
        self.state
            .read()
            .user
            .as_ref()
            .and_then(|u| u.is_admin)
            .unwrap_or(false)
    }

    /// Id of the logged-in user, empty when nobody is logged in
    pub fn current_user_id(&self) -> String {
        self.state
            .read()
            .user
            .as_ref()
            .map(|u| u.id.clone())
            .unwrap_or_default()
    }

    pub fn user(&self) -> Option<UserInfo> {
        self.state.read().user.clone()
    }

    pub fn token(&self) -> String {
        self.state.read().access_token.clone()
    }

    pub fn refresh_token(&self) -> String {
        self.state.read().refresh_token.clone()
    }

    pub fn snapshot(&self) -> CredentialBundle {
        self.state.read().clone()
    }

    pub fn set_user(&self, user: UserInfo) {
        let result = serde_json::to_string(&user)
            .map_err(SessionError::from)
            .and_then(|json| self.write_slot(self.realm.storage_keys().user, &json));
        self.state.write().user = Some(user);

        if let Err(e) = result {
            tracing::warn!(realm = %self.realm, "Failed to persist user: {}", e);
        }
    }

    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        let result = self.write_slot(self.realm.storage_keys().token, &token);
        self.state.write().access_token = token;

        if let Err(e) = result {
            tracing::warn!(realm = %self.realm, "Failed to persist access token: {}", e);
        }
    }

    pub fn set_refresh_token(&self, token: impl Into<String>) {
        let token = token.into();
        let result = self.write_slot(self.realm.storage_keys().refresh_token, &token);
        self.state.write().refresh_token = token;

        if let Err(e) = result {
            tracing::warn!(realm = %self.realm, "Failed to persist refresh token: {}", e);
        }
    }

    /// Install a complete bundle after a successful login.
    pub fn login(
        &self,
        user: UserInfo,
        token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) {
        let bundle = CredentialBundle::new(user, token.into(), refresh_token.into());
        let keys = self.realm.storage_keys();

        let persisted = serde_json::to_string(&bundle.user)
            .map_err(SessionError::from)
            .and_then(|json| self.write_slot(keys.user, &json))
            .and_then(|_| self.write_slot(keys.token, &bundle.access_token))
            .and_then(|_| self.write_slot(keys.refresh_token, &bundle.refresh_token));
        if let Err(e) = persisted {
            tracing::warn!(realm = %self.realm, "Failed to persist session: {}", e);
        }

        let user_id = bundle.user.as_ref().map(|u| u.id.clone()).unwrap_or_default();
        // Readers see either the previous bundle or the new one, never a mix
        *self.state.write() = bundle;

        tracing::info!(realm = %self.realm, user_id = %user_id, "Logged in");
    }

    /// Clear the bundle in memory and in storage. Safe to call repeatedly.
    pub fn logout(&self) {
        let was_logged_in = {
            let mut state = self.state.write();
            let was = state.is_logged_in();
            *state = CredentialBundle::default();
            was
        };

        let keys = self.realm.storage_keys().all();
        if let Err(e) = self.storage.remove_many(&keys) {
            tracing::warn!(realm = %self.realm, "Failed to clear stored session: {}", e);
        }

        if was_logged_in {
            tracing::info!(realm = %self.realm, "Logged out");
        }
    }

    /// Restore the bundle from durable storage.
    ///
    /// Each slot is read independently; a missing, unreadable or corrupt
    /// slot leaves its field untouched without affecting the others.
    pub fn hydrate(&self) {
        let keys = self.realm.storage_keys();

        let stored_user = self.read_slot(keys.user);
        let stored_token = self.read_slot(keys.token);
        let stored_refresh = self.read_slot(keys.refresh_token);

        let mut state = self.state.write();

        if let Some(json) = stored_user {
            match serde_json::from_str::<UserInfo>(&json) {
                Ok(user) => state.user = Some(user),
                Err(e) => {
                    tracing::error!(realm = %self.realm, "Failed to parse stored user: {}", e);
                }
            }
        }

        if let Some(token) = stored_token {
            state.access_token = token;
        }

        if let Some(token) = stored_refresh {
            state.refresh_token = token;
        }

        tracing::debug!(
            realm = %self.realm,
            logged_in = state.is_logged_in(),
            "Hydrated session"
        );
    }

    fn read_slot(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(realm = %self.realm, key = key, "Failed to read slot: {}", e);
                None
            }
        }
    }

    fn write_slot(&self, key: &str, value: &str) -> Result<()> {
        self.storage.set(key, value)?;
        Ok(())
    }
}

impl Clone for SessionStore {
    fn clone(&self) -> Self {
        Self {
            realm: self.realm,
            state: Arc::clone(&self.state),
            storage: Arc::clone(&self.storage),
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("realm", &self.realm)
            .field("logged_in", &self.is_logged_in())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use weknora_storage::{MemoryStore, SqliteStore, StorageError};

    fn user(id: &str) -> UserInfo {
        let now = Utc::now();
        UserInfo {
            id: id.to_string(),
            username: format!("user-{id}"),
            email: format!("{id}@example.com"),
            avatar: None,
            is_admin: Some(true),
            tenant_id: Some(10001),
            created_at: now,
            updated_at: now,
        }
    }

    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> weknora_storage::Result<Option<String>> {
            self.0.get(key)
        }

        fn set(&self, _key: &str, _value: &str) -> weknora_storage::Result<()> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }

        fn remove(&self, _key: &str) -> weknora_storage::Result<()> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }
    }

    #[test]
    fn test_logged_in_combinations() {
        for realm in [Realm::Admin, Realm::EndUser] {
            let store = SessionStore::new(realm, Arc::new(MemoryStore::new()));
            assert!(!store.is_logged_in());

            store.set_user(user("1"));
            assert!(!store.is_logged_in(), "user without token");

            store.set_token("tok");
            assert!(store.is_logged_in());

            store.set_token("");
            assert!(!store.is_logged_in(), "empty token counts as absent");

            store.logout();
            store.set_token("tok");
            assert!(!store.is_logged_in(), "token without user");
        }
    }

    #[test]
    fn test_login_writes_all_slots() {
        let storage = MemoryStore::new();
        let store = SessionStore::new(Realm::Admin, Arc::new(storage.clone()));

        store.login(user("42"), "access", "refresh");

        assert!(store.is_logged_in());
        assert!(store.is_admin());
        assert_eq!(store.current_user_id(), "42");
        assert_eq!(
            storage.get("weknora_admin_token").unwrap(),
            Some("access".to_string())
        );
        assert_eq!(
            storage.get("weknora_admin_refresh_token").unwrap(),
            Some("refresh".to_string())
        );
        assert!(storage.contains_key("weknora_admin_user"));
    }

    /// Records what a clone of the store looks like at every storage write.
    #[derive(Default)]
    struct ObservingStore {
        inner: MemoryStore,
        observer: parking_lot::Mutex<Option<SessionStore>>,
        seen: parking_lot::Mutex<Vec<(String, Option<String>, String)>>,
    }

    impl KeyValueStore for ObservingStore {
        fn get(&self, key: &str) -> weknora_storage::Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> weknora_storage::Result<()> {
            if let Some(store) = self.observer.lock().as_ref() {
                let bundle = store.snapshot();
                self.seen.lock().push((
                    key.to_string(),
                    bundle.user.map(|u| u.id),
                    bundle.access_token,
                ));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> weknora_storage::Result<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_login_swaps_bundle_atomically() {
        let storage = Arc::new(ObservingStore::default());
        let store = SessionStore::new(Realm::Admin, storage.clone());
        store.login(user("old"), "old-token", "old-refresh");
        *storage.observer.lock() = Some(store.clone());

        store.login(user("new"), "new-token", "new-refresh");

        let seen = storage.seen.lock().clone();
        assert_eq!(seen.len(), 3);
        for (key, user_id, token) in &seen {
            assert_eq!(user_id.as_deref(), Some("old"), "mixed bundle during {}", key);
            assert_eq!(token, "old-token", "mixed bundle during {}", key);
        }

        let bundle = store.snapshot();
        assert_eq!(bundle.user.unwrap().id, "new");
        assert_eq!(bundle.access_token, "new-token");
        assert_eq!(bundle.refresh_token, "new-refresh");
        *storage.observer.lock() = None;
    }

    #[test]
    fn test_logout_is_idempotent() {
        let storage = MemoryStore::new();
        let store = SessionStore::new(Realm::EndUser, Arc::new(storage.clone()));
        store.login(user("1"), "a", "r");

        store.logout();
        let after_first = store.snapshot();
        assert!(after_first.is_empty());
        assert!(storage.is_empty());

        store.logout();
        assert_eq!(store.snapshot(), after_first);
        assert!(storage.is_empty());
        assert_eq!(store.current_user_id(), "");
    }

    #[test]
    fn test_hydrate_restores_bundle() {
        let storage = SqliteStore::open_in_memory().unwrap();
        {
            let store = SessionStore::new(Realm::Admin, Arc::new(storage.clone()));
            store.login(user("9"), "access", "refresh");
        }

        let restored = SessionStore::new(Realm::Admin, Arc::new(storage));
        assert!(restored.is_logged_in());
        assert_eq!(restored.user().unwrap().id, "9");
        assert_eq!(restored.refresh_token(), "refresh");
    }

    #[test]
    fn test_hydrate_with_corrupt_user() {
        let storage = MemoryStore::new();
        storage.set("weknora_admin_user", "{not json").unwrap();
        storage.set("weknora_admin_token", "access").unwrap();
        storage.set("weknora_admin_refresh_token", "refresh").unwrap();

        let store = SessionStore::new(Realm::Admin, Arc::new(storage));

        assert!(store.user().is_none());
        assert_eq!(store.token(), "access");
        assert_eq!(store.refresh_token(), "refresh");
        assert!(!store.is_logged_in());
    }

    #[test]
    fn test_hydrate_partial_slots() {
        let storage = MemoryStore::new();
        storage.set("weknora_refresh_token", "refresh").unwrap();

        let store = SessionStore::new(Realm::EndUser, Arc::new(storage));
        let bundle = store.snapshot();

        assert!(bundle.user.is_none());
        assert_eq!(bundle.access_token, "");
        assert_eq!(bundle.refresh_token, "refresh");
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let store = SessionStore::new(Realm::Admin, Arc::new(ReadOnlyStore(MemoryStore::new())));

        store.login(user("1"), "access", "refresh");
        assert!(store.is_logged_in());

        store.logout();
        assert!(!store.is_logged_in());
    }

    #[test]
    fn test_realms_are_independent() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let admin = SessionStore::new(Realm::Admin, Arc::clone(&storage));
        let end_user = SessionStore::new(Realm::EndUser, Arc::clone(&storage));

        admin.login(user("a"), "admin-token", "");
        end_user.login(user("u"), "user-token", "");

        admin.logout();
        assert!(!admin.is_logged_in());
        assert!(end_user.is_logged_in());

        admin.login(user("a"), "admin-token", "");
        end_user.logout();
        assert!(admin.is_logged_in());
        assert!(!end_user.is_logged_in());

        let rehydrated = SessionStore::new(Realm::Admin, storage);
        assert!(rehydrated.is_logged_in());
    }

    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::new(Realm::Admin, Arc::new(MemoryStore::new()));
        let other = store.clone();

        store.login(user("1"), "t", "r");
        assert!(other.is_logged_in());

        other.logout();
        assert!(!store.is_logged_in());
    }
}
