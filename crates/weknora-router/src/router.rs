//! Router
//!
//! Resolves a navigation target to its final location: static redirects
//! first, then the guard, repeated until a location is accepted.

use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

use crate::error::RouterError;
use crate::guard::{GuardDecision, RouteGuard};
use crate::table::{RouteLocation, RouteTable};
use crate::Result;

/// Upper bound on redirects followed for one navigation
const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct Navigation {
    /// Where the navigation ended up
    pub location: RouteLocation,
    /// The originally requested target, when it was redirected
    pub redirected_from: Option<String>,
}

impl Navigation {
    pub fn path(&self) -> &str {
        &self.location.path
    }

    pub fn was_redirected(&self) -> bool {
        self.redirected_from.is_some()
    }
}

pub struct Router {
    table: Arc<RouteTable>,
    guard: RouteGuard,
    current: Arc<RwLock<Option<RouteLocation>>>,
}

enum Step {
    Done(RouteLocation),
    Follow(String),
}

impl Router {
    pub fn new(table: RouteTable, guard: RouteGuard) -> Self {
        Self {
            table: Arc::new(table),
            guard,
            current: Arc::new(RwLock::new(None)),
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    pub fn current(&self) -> Option<RouteLocation> {
        self.current.read().clone()
    }

    /// Navigate using the synchronous guard.
    pub fn navigate(&self, target: &str) -> Result<Navigation> {
        let from = self.current();
        let requested = self.table.resolve(target)?.full_path();
        let mut next = target.to_string();

        for _ in 0..=MAX_REDIRECTS {
            let to = self.table.resolve(&next)?;
            let step = match self.static_redirect(&to) {
                Some(redirect) => Step::Follow(redirect),
                None => match self.guard.check(&to, from.as_ref()) {
                    GuardDecision::Proceed => Step::Done(to),
                    GuardDecision::Redirect(path) => Step::Follow(path),
                },
            };

            match step {
                Step::Done(location) => return Ok(self.commit(target, &requested, location)),
                Step::Follow(path) => next = path,
            }
        }

        Err(self.loop_error(target))
    }

    /// Navigate using the guard's async path, which also revalidates
    /// tokens when a validator is installed.
    pub async fn navigate_async(&self, target: &str) -> Result<Navigation> {
        let from = self.current();
        let requested = self.table.resolve(target)?.full_path();
        let mut next = target.to_string();

        for _ in 0..=MAX_REDIRECTS {
            let to = self.table.resolve(&next)?;
            let step = match self.static_redirect(&to) {
                Some(redirect) => Step::Follow(redirect),
                None => match self.guard.check_async(&to, from.as_ref()).await {
                    GuardDecision::Proceed => Step::Done(to),
                    GuardDecision::Redirect(path) => Step::Follow(path),
                },
            };

            match step {
                Step::Done(location) => return Ok(self.commit(target, &requested, location)),
                Step::Follow(path) => next = path,
            }
        }

        Err(self.loop_error(target))
    }

    /// Forget the current location, e.g. after a forced logout
    pub fn reset(&self) {
        *self.current.write() = None;
    }

    fn static_redirect(&self, to: &RouteLocation) -> Option<String> {
        let redirect = to.redirect.clone()?;
        tracing::debug!(from = %to.path, to = %redirect, "Following route redirect");
        Some(redirect)
    }

    /// `requested` is the normalised form of `target`, so trailing slashes
    /// and relative spellings do not count as redirects.
    fn commit(&self, target: &str, requested: &str, location: RouteLocation) -> Navigation {
        let redirected_from = if location.full_path() == requested {
            None
        } else {
            Some(target.to_string())
        };

        tracing::info!(
            path = %location.path,
            redirected_from = redirected_from.as_deref().unwrap_or("-"),
            "Navigated"
        );

        *self.current.write() = Some(location.clone());

        Navigation {
            location,
            redirected_from,
        }
    }

    fn loop_error(&self, target: &str) -> RouterError {
        tracing::error!(requested = %target, "Redirect loop");
        RouterError::RedirectLoop {
            path: target.to_string(),
            hops: MAX_REDIRECTS,
        }
    }
}

impl Clone for Router {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
            guard: self.guard.clone(),
            current: Arc::clone(&self.current),
        }
    }
}
