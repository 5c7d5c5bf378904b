//! Route table
//!
//! Declared routes, their metadata and static redirects, plus path
//! matching with `:param` segments.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

use crate::error::RouterError;
use crate::meta::RouteMeta;
use crate::Result;

/// Origin used to normalise navigation targets; only the path matters.
const CONSOLE_ORIGIN: &str = "http://console.local/";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

#[derive(Debug, Clone)]
pub struct RouteDef {
    pub path: String,
    pub name: Option<String>,
    pub meta: RouteMeta,
    /// Static redirect applied before the guard runs
    pub redirect: Option<String>,
    segments: Vec<Segment>,
}

impl RouteDef {
    pub fn new(path: &str, meta: RouteMeta) -> Self {
        Self {
            path: path.to_string(),
            name: None,
            meta,
            redirect: None,
            segments: parse_segments(path),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn redirect_to(mut self, target: &str) -> Self {
        self.redirect = Some(target.to_string());
        self
    }

    fn match_path(&self, segments: &[&str]) -> Option<HashMap<String, String>> {
        if segments.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (pattern, actual) in self.segments.iter().zip(segments) {
            match pattern {
                Segment::Static(expected) if expected == actual => {}
                Segment::Static(_) => return None,
                Segment::Param(name) => {
                    let value = urlencoding::decode(actual)
                        .map(|v| v.into_owned())
                        .unwrap_or_else(|_| (*actual).to_string());
                    params.insert(name.clone(), value);
                }
            }
        }

        Some(params)
    }
}

/// A navigation target after normalisation and matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLocation {
    pub path: String,
    pub query: Option<String>,
    pub name: Option<String>,
    pub params: HashMap<String, String>,
    /// Empty for paths that match no declared route
    pub meta: RouteMeta,
    #[serde(skip)]
    pub(crate) redirect: Option<String>,
}

impl RouteLocation {
    /// Location carrying only a path and metadata, for callers that build
    /// targets by hand.
    pub fn new(path: &str, meta: RouteMeta) -> Self {
        Self {
            path: path.to_string(),
            query: None,
            name: None,
            params: HashMap::new(),
            meta,
            redirect: None,
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Path with the query string, as it would appear in the address bar
    pub fn full_path(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RouteDef>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The console's full route surface
    pub fn console() -> Self {
        let mut table = Self::new();

        table.add(RouteDef::new("/", RouteMeta::none()).redirect_to("/platform/knowledge-bases"));
        table.add(RouteDef::new("/login", RouteMeta::public()).named("login"));

        // Management platform
        table.add(
            RouteDef::new("/admin", RouteMeta::admin_protected())
                .named("Admin")
                .redirect_to("/admin/tenants"),
        );
        table.add(RouteDef::new("/admin/login", RouteMeta::admin_public()).named("adminLogin"));
        table.add(
            RouteDef::new("/admin/register", RouteMeta::admin_public()).named("adminRegister"),
        );
        for (path, name) in [
            ("/admin/tenants", "adminTenants"),
            ("/admin/tenants/:id", "adminTenantDetail"),
            ("/admin/plugins", "adminPlugins"),
            ("/admin/plugins/:id", "adminPluginDetail"),
            ("/admin/models", "adminModels"),
            ("/admin/models/:id", "adminModelDetail"),
        ] {
            table.add(RouteDef::new(path, RouteMeta::admin_protected()).named(name));
        }

        // Knowledge-base platform
        table.add(RouteDef::new("/knowledgeBase", RouteMeta::protected()).named("home"));
        table.add(
            RouteDef::new("/platform", RouteMeta::protected())
                .named("Platform")
                .redirect_to("/platform/knowledge-bases"),
        );
        table.add(
            RouteDef::new("/platform/tenant", RouteMeta::protected())
                .redirect_to("/platform/settings"),
        );
        for (path, name) in [
            ("/platform/settings", "settings"),
            ("/platform/knowledge-bases", "knowledgeBaseList"),
            ("/platform/knowledge-bases/:kbId", "knowledgeBaseDetail"),
            ("/platform/agents", "agentList"),
            ("/platform/creatChat", "globalCreatChat"),
            ("/platform/knowledge-bases/:kbId/creatChat", "kbCreatChat"),
            ("/platform/chat/:chatid", "chat"),
        ] {
            table.add(RouteDef::new(path, RouteMeta::protected()).named(name));
        }

        table
    }

    pub fn add(&mut self, route: RouteDef) {
        self.routes.push(route);
    }

    pub fn find_by_name(&self, name: &str) -> Option<&RouteDef> {
        self.routes.iter().find(|r| r.name.as_deref() == Some(name))
    }

    /// Normalise `target` and match it against the table.
    ///
    /// Targets are resolved relative to the console root, so `..` segments
    /// collapse before the realm prefix is inspected. Targets pointing at
    /// another origin are rejected.
    pub fn resolve(&self, target: &str) -> Result<RouteLocation> {
        let url = Url::parse(CONSOLE_ORIGIN)
            .and_then(|base| base.join(target))
            .map_err(|e| RouterError::InvalidPath(format!("{}: {}", target, e)))?;

        if url.host_str() != Some("console.local") || url.scheme() != "http" {
            return Err(RouterError::InvalidPath(format!(
                "{} leaves the console",
                target
            )));
        }

        let path = normalize_path(url.path());
        let query = url.query().filter(|q| !q.is_empty()).map(str::to_string);
        let segments: Vec<&str> = split_segments(&path);

        for route in &self.routes {
            if let Some(params) = route.match_path(&segments) {
                return Ok(RouteLocation {
                    path,
                    query,
                    name: route.name.clone(),
                    params,
                    meta: route.meta,
                    redirect: route.redirect.clone(),
                });
            }
        }

        tracing::debug!(path = %path, "No route matched");

        Ok(RouteLocation {
            path,
            query,
            name: None,
            params: HashMap::new(),
            meta: RouteMeta::none(),
            redirect: None,
        })
    }
}

fn parse_segments(path: &str) -> Vec<Segment> {
    split_segments(path)
        .into_iter()
        .map(|s| match s.strip_prefix(':') {
            Some(name) => Segment::Param(name.to_string()),
            None => Segment::Static(s.to_string()),
        })
        .collect()
}

fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}
