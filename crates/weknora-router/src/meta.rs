//! Per-route metadata

use serde::{Deserialize, Serialize};

/// Static flags declared next to a route.
///
/// Every flag is tri-state: `None` means "required", only an explicit
/// `Some(false)` opens a route up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_auth: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_init: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_admin_auth: Option<bool>,
}

impl RouteMeta {
    pub const fn none() -> Self {
        Self {
            requires_auth: None,
            requires_init: None,
            requires_admin_auth: None,
        }
    }

    /// Admin page reachable without an admin session
    pub const fn admin_public() -> Self {
        Self {
            requires_admin_auth: Some(false),
            ..Self::none()
        }
    }

    pub const fn admin_protected() -> Self {
        Self {
            requires_admin_auth: Some(true),
            ..Self::none()
        }
    }

    /// End-user page reachable without a session or an initialised system
    pub const fn public() -> Self {
        Self {
            requires_auth: Some(false),
            requires_init: Some(false),
            requires_admin_auth: None,
        }
    }

    pub const fn protected() -> Self {
        Self {
            requires_auth: Some(true),
            requires_init: Some(true),
            requires_admin_auth: None,
        }
    }

    pub fn is_admin_public(&self) -> bool {
        self.requires_admin_auth == Some(false)
    }

    /// Either exemption flag is enough
    pub fn is_public(&self) -> bool {
        self.requires_auth == Some(false) || self.requires_init == Some(false)
    }
}
