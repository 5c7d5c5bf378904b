//! Authentication realms

use serde::{Deserialize, Serialize};
use std::fmt;

/// Durable slot names for one realm's credential bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageKeys {
    pub user: &'static str,
    pub token: &'static str,
    pub refresh_token: &'static str,
}

impl StorageKeys {
    pub fn all(&self) -> [&'static str; 3] {
        [self.user, self.token, self.refresh_token]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Realm {
    /// Management platform under `/admin`
    Admin,
    /// Knowledge-base platform, everything outside `/admin`
    EndUser,
}

impl Realm {
    pub const ADMIN_PREFIX: &'static str = "/admin";

    pub fn storage_keys(&self) -> StorageKeys {
        match self {
            Realm::Admin => StorageKeys {
                user: "weknora_admin_user",
                token: "weknora_admin_token",
                refresh_token: "weknora_admin_refresh_token",
            },
            Realm::EndUser => StorageKeys {
                user: "weknora_user",
                token: "weknora_token",
                refresh_token: "weknora_refresh_token",
            },
        }
    }

    pub fn login_path(&self) -> &'static str {
        match self {
            Realm::Admin => "/admin/login",
            Realm::EndUser => "/login",
        }
    }

    /// Where a logged-in user lands when visiting a public entry page
    pub fn home_path(&self) -> &'static str {
        match self {
            Realm::Admin => "/admin/tenants",
            Realm::EndUser => "/platform/knowledge-bases",
        }
    }

    /// Realm governing a path, decided by prefix alone
    pub fn for_path(path: &str) -> Self {
        if path.starts_with(Self::ADMIN_PREFIX) {
            Realm::Admin
        } else {
            Realm::EndUser
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Realm::Admin => "admin",
            Realm::EndUser => "end_user",
        }
    }
}

impl fmt::Display for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_keys_are_disjoint() {
        let admin = Realm::Admin.storage_keys().all();
        let user = Realm::EndUser.storage_keys().all();

        for key in admin {
            assert!(!user.contains(&key), "{key} shared between realms");
        }
        assert_eq!(admin[0], "weknora_admin_user");
        assert_eq!(admin[1], "weknora_admin_token");
        assert_eq!(admin[2], "weknora_admin_refresh_token");
    }

    #[test]
    fn test_for_path() {
        assert_eq!(Realm::for_path("/admin/tenants"), Realm::Admin);
        assert_eq!(Realm::for_path("/admin"), Realm::Admin);
        assert_eq!(Realm::for_path("/login"), Realm::EndUser);
        assert_eq!(Realm::for_path("/platform/settings"), Realm::EndUser);
    }
}
