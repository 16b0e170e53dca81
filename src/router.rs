use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;

use crate::{
    config::{ClientConfig, HistoryMode},
    models::{RouteDefinition, RouteRecord},
    routes::RouteTable,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterError {
    #[error("no route named '{0}'")]
    NotFound(String),

    #[error("a route named '{0}' is already installed")]
    Duplicate(String),

    #[error("router state is inconsistent: {0}")]
    Inconsistent(String),
}

/// RouteRegistry
///
/// The live router contract. Installation order is match priority, except that the
/// catch-all route always stays last.
///
/// `get_routes()` lists children before their parent, so the first record matching a
/// path is also the most specific one.
pub trait RouteRegistry: Send + Sync {
    fn add_route(&self, route: RouteDefinition) -> Result<(), RouterError>;

    /// Removes the named route together with its children.
    fn remove_route(&self, name: &str) -> Result<(), RouterError>;

    fn get_routes(&self) -> Vec<RouteRecord>;

    fn has_route(&self, name: &str) -> bool;

    /// Finds the record a navigation to `path` would land on.
    fn resolve(&self, path: &str) -> Option<RouteRecord> {
        self.get_routes()
            .into_iter()
            .find(|record| path_matches(&record.path, path))
    }
}

/// RouterState
///
/// The shared handle to the live router.
pub type RouterState = Arc<dyn RouteRegistry>;

/// LiveRouter
///
/// In-memory router holding the installed route tree.
pub struct LiveRouter {
    routes: RwLock<Vec<RouteDefinition>>,
    history: HistoryMode,
    public_path: String,
}

impl LiveRouter {
    pub fn new(history: HistoryMode, public_path: impl Into<String>) -> Self {
        Self {
            routes: RwLock::new(Vec::new()),
            history,
            public_path: public_path.into(),
        }
    }

    /// Creates a router pre-populated with the table's always-on routes and catch-all.
    pub fn from_table(table: &RouteTable, config: &ClientConfig) -> Result<Self, RouterError> {
        let router = Self::new(config.history, config.public_path.clone());
        for route in table.initial_routes() {
            router.add_route(route)?;
        }
        Ok(router)
    }

    /// Renders `path` as a location for the configured history mode.
    pub fn href(&self, path: &str) -> String {
        let base = self.public_path.trim_end_matches('/');
        match self.history {
            HistoryMode::Hash => format!("{}/#{}", base, path),
            HistoryMode::Path => format!("{}{}", base, path),
        }
    }
}

impl RouteRegistry for LiveRouter {
    fn add_route(&self, route: RouteDefinition) -> Result<(), RouterError> {
        let mut routes = self.routes.write();

        if let Some(name) = route
            .names()
            .into_iter()
            .find(|name| routes.iter().any(|r| find_named(r, name)))
        {
            return Err(RouterError::Duplicate(name.to_string()));
        }

        // Everything but the catch-all goes in front of it.
        let position = if route.is_catch_all() {
            routes.len()
        } else {
            routes
                .iter()
                .position(RouteDefinition::is_catch_all)
                .unwrap_or(routes.len())
        };

        tracing::debug!(path = %route.path, name = ?route.name, position, "Route added");
        routes.insert(position, route);
        Ok(())
    }

    fn remove_route(&self, name: &str) -> Result<(), RouterError> {
        let mut routes = self.routes.write();
        if remove_named(&mut routes, name) {
            tracing::debug!(name, "Route removed");
            Ok(())
        } else {
            Err(RouterError::NotFound(name.to_string()))
        }
    }

    fn get_routes(&self) -> Vec<RouteRecord> {
        let routes = self.routes.read();
        let mut records = Vec::new();
        for route in routes.iter() {
            flatten(route, "", &mut records);
        }
        records
    }

    fn has_route(&self, name: &str) -> bool {
        self.routes.read().iter().any(|r| find_named(r, name))
    }
}

fn find_named(route: &RouteDefinition, name: &str) -> bool {
    route.name.as_deref() == Some(name) || route.children.iter().any(|c| find_named(c, name))
}

fn remove_named(routes: &mut Vec<RouteDefinition>, name: &str) -> bool {
    if let Some(index) = routes.iter().position(|r| r.name.as_deref() == Some(name)) {
        routes.remove(index);
        return true;
    }
    routes
        .iter_mut()
        .any(|route| remove_named(&mut route.children, name))
}

// Post-order: children first, then the parent.
fn flatten(route: &RouteDefinition, parent_path: &str, out: &mut Vec<RouteRecord>) {
    let path = join_path(parent_path, &route.path);
    for child in &route.children {
        flatten(child, &path, out);
    }
    out.push(RouteRecord {
        name: route.name.clone(),
        path,
        redirect: route.redirect.clone(),
        component: route.component.clone(),
        meta: route.meta.clone(),
    });
}

fn join_path(parent: &str, path: &str) -> String {
    if path.starts_with('/') || parent.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", parent.trim_end_matches('/'), path)
    }
}

/// path_matches
///
/// Matches a concrete location against a route pattern. Supported segments: static
/// text, `:param` (exactly one segment) and `:param(.*)` / `:param(.*)*` (the rest of
/// the path, possibly empty). Query strings and fragments are ignored.
pub fn path_matches(pattern: &str, path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let pattern_segments = segments(pattern);
    let path_segments = segments(path);

    for (index, segment) in pattern_segments.iter().enumerate() {
        if let Some(param) = segment.strip_prefix(':') {
            if param.ends_with("(.*)") || param.ends_with("(.*)*") {
                return true;
            }
            if index >= path_segments.len() {
                return false;
            }
        } else if path_segments.get(index) != Some(segment) {
            return false;
        }
    }

    pattern_segments.len() == path_segments.len()
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}
