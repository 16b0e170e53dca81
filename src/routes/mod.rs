//! Route Table Index
//!
//! Organizes the console's navigable routes into the two sets the registrar works
//! with: always-on routes installed at startup and role-gated routes installed after
//! sign-in. The catch-all not-found route lives here too and is always resolved last.

use std::collections::{BTreeSet, HashSet};

use thiserror::Error;

use crate::models::{Role, RouteDefinition};

/// Routes available to every visitor, signed in or not.
pub mod public;

/// Routes restricted to users holding one of the declared roles.
pub mod admin;

/// Name of the catch-all not-found route.
pub const NOT_FOUND_NAME: &str = "ErrorPage";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteTableError {
    #[error("gated route '{0}' has no name and could never be removed")]
    UnnamedGatedRoute(String),

    #[error("gated route '{0}' declares no required roles")]
    UngatedEntry(String),

    #[error("always-on route '{0}' declares required roles")]
    GatedAlwaysOn(String),

    #[error("route name '{0}' is used more than once")]
    DuplicateName(String),
}

/// catch_all
///
/// Matches any path nothing else matched and redirects to the 404 page.
pub fn catch_all() -> RouteDefinition {
    RouteDefinition::new("/:pathMatch(.*)*")
        .named(NOT_FOUND_NAME)
        .redirect("/404")
        .hidden()
}

/// RouteTable
///
/// Immutable declarative description of every route the console knows about.
#[derive(Debug, Clone)]
pub struct RouteTable {
    always_on: Vec<RouteDefinition>,
    gated: Vec<RouteDefinition>,
    not_found: RouteDefinition,
}

impl Default for RouteTable {
    /// The console's built-in table (see `public` and `admin`).
    fn default() -> Self {
        Self {
            always_on: public::constant_routes(),
            gated: admin::gated_routes(),
            not_found: catch_all(),
        }
    }
}

impl RouteTable {
    /// new
    ///
    /// Validates a custom table. Every gated entry needs a name and at least one role,
    /// always-on entries may not declare roles anywhere in their subtree, and names are
    /// unique across the whole table (catch-all included).
    pub fn new(
        always_on: Vec<RouteDefinition>,
        gated: Vec<RouteDefinition>,
    ) -> Result<Self, RouteTableError> {
        for route in &always_on {
            reject_gated(route)?;
        }

        for route in &gated {
            if route.name.as_deref().is_none_or(str::is_empty) {
                return Err(RouteTableError::UnnamedGatedRoute(route.path.clone()));
            }
            if !route.is_gated() {
                return Err(RouteTableError::UngatedEntry(route.path.clone()));
            }
            reject_unnamed_gated_children(route)?;
        }

        let not_found = catch_all();
        {
            let mut seen = HashSet::new();
            for route in always_on.iter().chain(&gated).chain(std::iter::once(&not_found)) {
                collect_unique_names(route, &mut seen)?;
            }
        }

        Ok(Self {
            always_on,
            gated,
            not_found,
        })
    }

    pub fn always_on(&self) -> &[RouteDefinition] {
        &self.always_on
    }

    pub fn gated(&self) -> &[RouteDefinition] {
        &self.gated
    }

    pub fn not_found(&self) -> &RouteDefinition {
        &self.not_found
    }

    /// The routes a freshly constructed router starts with: always-on first, catch-all last.
    pub fn initial_routes(&self) -> Vec<RouteDefinition> {
        let mut routes = self.always_on.clone();
        routes.push(self.not_found.clone());
        routes
    }

    /// Gated entries the given role set may see, in table order.
    pub fn authorized_routes(&self, roles: &BTreeSet<Role>) -> Vec<RouteDefinition> {
        filter_routes(&self.gated, roles)
    }
}

/// filter_routes
///
/// Keeps every route whose roles intersect `roles` (routes without roles are kept),
/// recursing into children. Order is preserved. Pure.
pub fn filter_routes(routes: &[RouteDefinition], roles: &BTreeSet<Role>) -> Vec<RouteDefinition> {
    routes
        .iter()
        .filter(|route| route.permits(roles))
        .map(|route| RouteDefinition {
            children: filter_routes(&route.children, roles),
            ..route.clone()
        })
        .collect()
}

fn reject_gated(route: &RouteDefinition) -> Result<(), RouteTableError> {
    if route.is_gated() {
        return Err(RouteTableError::GatedAlwaysOn(route.path.clone()));
    }
    route.children.iter().try_for_each(reject_gated)
}

fn reject_unnamed_gated_children(route: &RouteDefinition) -> Result<(), RouteTableError> {
    for child in &route.children {
        if child.is_gated() && child.name.as_deref().is_none_or(str::is_empty) {
            return Err(RouteTableError::UnnamedGatedRoute(child.path.clone()));
        }
        reject_unnamed_gated_children(child)?;
    }
    Ok(())
}

fn collect_unique_names<'a>(
    route: &'a RouteDefinition,
    seen: &mut HashSet<&'a str>,
) -> Result<(), RouteTableError> {
    if let Some(name) = route.name.as_deref() {
        if !seen.insert(name) {
            return Err(RouteTableError::DuplicateName(name.to_string()));
        }
    }
    route
        .children
        .iter()
        .try_for_each(|child| collect_unique_names(child, seen))
}
