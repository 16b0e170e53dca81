use super::public::LAYOUT;
use crate::models::{RouteDefinition, SUPER_ADMIN};

/// Gated Route Module
///
/// Defines the administrative screens. Each entry declares the roles allowed to see
/// it and carries a unique name so the registrar can remove it again on logout.
///
/// Children inherit their parent's gate; a child that declares its own roles is
/// filtered again against the user's roles.
pub fn gated_routes() -> Vec<RouteDefinition> {
    vec![
        // /users
        // Account administration.
        RouteDefinition::new("/users")
            .component(LAYOUT)
            .named("Users")
            .roles([SUPER_ADMIN])
            .always_show(false)
            .child(
                RouteDefinition::new("/users")
                    .component("views/user/index")
                    .named("User List")
                    .title("User Management")
                    .icon("lock")
                    .roles([SUPER_ADMIN]),
            ),
        // /roles
        // Role and permission administration.
        RouteDefinition::new("/roles")
            .component(LAYOUT)
            .named("Roles")
            .roles([SUPER_ADMIN])
            .always_show(false)
            .child(
                RouteDefinition::new("/roles")
                    .component("views/role/index")
                    .named("Role List")
                    .title("Role Management")
                    .icon("lock")
                    .roles([SUPER_ADMIN]),
            ),
        // /articles, /tags, /categories
        // Content moderation, grouped under one menu entry.
        RouteDefinition::new("/articles")
            .component(LAYOUT)
            .named("Articles")
            .title("Articles")
            .icon("lock")
            .roles([SUPER_ADMIN])
            .always_show(false)
            .child(
                RouteDefinition::new("/articles")
                    .component("views/article/index")
                    .named("Article List")
                    .title("Article Management")
                    .icon("lock")
                    .roles([SUPER_ADMIN]),
            )
            .child(
                RouteDefinition::new("/tags")
                    .component("views/tag/index")
                    .named("Article Tag List")
                    .title("Tag Management")
                    .icon("lock")
                    .roles([SUPER_ADMIN]),
            )
            .child(
                RouteDefinition::new("/categories")
                    .component("views/category/index")
                    .named("Article Category List")
                    .title("Category Management")
                    .icon("lock")
                    .roles([SUPER_ADMIN]),
            ),
    ]
}
