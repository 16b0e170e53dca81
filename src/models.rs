use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt};
use ts_rs::TS;

// --- Authorization Primitives ---

/// Role
///
/// An opaque permission label (e.g. `SUPER_ADMIN`) attached to a user and to a gated route.
/// Serialized as a bare string so the UI shell and the server see the same value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Role(pub String);

impl Role {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The role that unlocks every administrative screen of the console.
pub const SUPER_ADMIN: &str = "SUPER_ADMIN";

// --- Route Schemas ---

/// RouteMeta
///
/// Presentation and authorization metadata attached to a route. The rendering layer
/// reads `title`, `hidden`, `always_show`, `svg_icon` and `affix`; the registrar only
/// ever looks at `roles`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct RouteMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub hidden: bool,
    pub always_show: bool,
    /// Non-empty means the route is gated: the user needs at least one of these roles.
    pub roles: Vec<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub svg_icon: Option<String>,
    // Pinned in the tab bar.
    pub affix: bool,
}

/// RouteDefinition
///
/// A declarative route entry. Gated entries (non-empty `meta.roles`) must carry a
/// unique `name`: the router can only remove routes by name, so an unnamed gated
/// route could never be un-registered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct RouteDefinition {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Opaque view key resolved by the rendering layer (e.g. `Layout`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    pub children: Vec<RouteDefinition>,
    pub meta: RouteMeta,
}

impl RouteDefinition {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    pub fn redirect(mut self, target: impl Into<String>) -> Self {
        self.redirect = Some(target.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.meta.title = Some(title.into());
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.meta.svg_icon = Some(icon.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.meta.hidden = true;
        self
    }

    pub fn affix(mut self) -> Self {
        self.meta.affix = true;
        self
    }

    pub fn always_show(mut self, always_show: bool) -> Self {
        self.meta.always_show = always_show;
        self
    }

    pub fn roles<I, R>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        self.meta.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn child(mut self, child: RouteDefinition) -> Self {
        self.children.push(child);
        self
    }

    /// Every name declared by this route and its descendants, parent first.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.name.as_deref().into_iter().collect();
        for child in &self.children {
            names.extend(child.names());
        }
        names
    }

    /// A route is gated when it declares at least one required role.
    pub fn is_gated(&self) -> bool {
        !self.meta.roles.is_empty()
    }

    /// The catch-all not-found pattern (`/:pathMatch(.*)*`).
    pub fn is_catch_all(&self) -> bool {
        self.path.starts_with("/:pathMatch(")
    }

    /// permits
    ///
    /// Routes without declared roles are open; otherwise the route is permitted when
    /// the declared roles and the user's roles intersect.
    pub fn permits(&self, roles: &BTreeSet<Role>) -> bool {
        !self.is_gated() || self.meta.roles.iter().any(|role| roles.contains(role))
    }
}

/// RouteRecord
///
/// A flattened, live entry of the router as returned by `get_routes()`: children are
/// listed individually with their full path resolved against their parents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RouteRecord {
    pub name: Option<String>,
    pub path: String,
    pub redirect: Option<String>,
    pub component: Option<String>,
    pub meta: RouteMeta,
}

// --- Account Payloads ---

/// LoginRequest
///
/// Input payload for the sign-in endpoint. The password is forwarded verbatim and
/// never logged.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// LoginResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
}

/// UserProfile
///
/// The signed-in user as reported by the server. `roles` drives dynamic route registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct UserProfile {
    pub username: String,
    pub roles: Vec<Role>,
}

impl UserProfile {
    pub fn role_set(&self) -> BTreeSet<Role> {
        self.roles.iter().cloned().collect()
    }
}
