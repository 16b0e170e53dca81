use std::{collections::BTreeSet, sync::Arc};
use thiserror::Error;

use crate::{
    events::{ReloadReason, ShellEvents},
    models::{Role, RouteDefinition, RouteRecord},
    router::{RouterError, RouterState},
    routes::{RouteTable, filter_routes},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrarError {
    #[error("gated route '{0}' has no name and could never be removed")]
    UnnamedGatedRoute(String),

    #[error(transparent)]
    Router(#[from] RouterError),
}

/// What a `reset()` pass ended with.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// Every gated route is gone; `removed` counts the names actually removed.
    Cleared { removed: usize },
    /// A removal failed and the shell was asked to reload instead.
    ReloadRequested,
}

/// RouteRegistrar
///
/// Turns a user's role set into live router entries and takes them away again.
/// Only routes declaring roles are ever touched, so always-on routes and the
/// catch-all survive any number of install/reset cycles.
pub struct RouteRegistrar {
    router: RouterState,
    table: Arc<RouteTable>,
    events: ShellEvents,
}

impl RouteRegistrar {
    pub fn new(router: RouterState, table: Arc<RouteTable>, events: ShellEvents) -> Self {
        Self {
            router,
            table,
            events,
        }
    }

    pub fn router(&self) -> &RouterState {
        &self.router
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// compute_authorized_routes
    ///
    /// Every gated entry of the table whose roles intersect `roles`, in table order.
    /// Pure: the router is not consulted.
    pub fn compute_authorized_routes(&self, roles: &BTreeSet<Role>) -> Vec<RouteDefinition> {
        filter_routes(self.table.gated(), roles)
    }

    /// install
    ///
    /// Adds each route to the live router. A route whose name is already installed is
    /// skipped, which makes repeated installs of the same set a no-op. The whole batch
    /// is validated before the router is touched.
    ///
    /// Returns the number of routes actually added.
    pub fn install(&self, routes: &[RouteDefinition]) -> Result<usize, RegistrarError> {
        routes.iter().try_for_each(ensure_named)?;

        // A new parent must not bring in a child whose name is already live.
        let pending: Vec<&RouteDefinition> = routes
            .iter()
            .filter(|route| !self.is_installed(route))
            .collect();
        for route in &pending {
            if let Some(name) = route.names().into_iter().find(|n| self.router.has_route(n)) {
                return Err(RouterError::Duplicate(name.to_string()).into());
            }
        }

        let mut added = 0;
        for route in routes {
            if self.is_installed(route) {
                tracing::debug!(name = ?route.name, "Route already installed, skipping");
                continue;
            }
            self.router.add_route(route.clone())?;
            added += 1;
        }

        tracing::info!(requested = routes.len(), added, "Gated routes installed");
        Ok(added)
    }

    /// reset
    ///
    /// Removes every live route that declares roles and has a name, leaving always-on
    /// routes untouched. A child may already be gone with its parent, hence the
    /// `has_route` check before each removal.
    ///
    /// If any removal fails the router is left as-is and a reload is requested from the
    /// shell: after a partial failure the table cannot be trusted. Never returns an error.
    pub fn reset(&self) -> ResetOutcome {
        let names: Vec<String> = self
            .router
            .get_routes()
            .into_iter()
            .filter(|record| !record.meta.roles.is_empty())
            .filter_map(|record| record.name)
            .collect();

        let mut removed = 0;
        for name in names {
            if !self.router.has_route(&name) {
                continue;
            }
            if let Err(e) = self.router.remove_route(&name) {
                tracing::error!(name, error = %e, "Route removal failed during reset");
                self.events.request_reload(ReloadReason::RouterResetFailed);
                return ResetOutcome::ReloadRequested;
            }
            removed += 1;
        }

        tracing::info!(removed, "Gated routes reset");
        ResetOutcome::Cleared { removed }
    }

    fn is_installed(&self, route: &RouteDefinition) -> bool {
        route
            .name
            .as_deref()
            .is_some_and(|name| self.router.has_route(name))
    }

    /// The gated records currently live in the router.
    pub fn installed_routes(&self) -> Vec<RouteRecord> {
        self.router
            .get_routes()
            .into_iter()
            .filter(|record| !record.meta.roles.is_empty())
            .collect()
    }
}

fn ensure_named(route: &RouteDefinition) -> Result<(), RegistrarError> {
    if route.is_gated() && route.name.as_deref().is_none_or(str::is_empty) {
        return Err(RegistrarError::UnnamedGatedRoute(route.path.clone()));
    }
    route.children.iter().try_for_each(ensure_named)
}
