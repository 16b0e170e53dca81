use crate::models::RouteDefinition;

/// Layout shell every top-level page renders inside.
pub const LAYOUT: &str = "Layout";

/// Always-On Route Module
///
/// Defines routes installed when the router is created and never removed: the
/// redirect helper, error pages, the sign-in page, the dashboard and the profile page.
///
/// None of these may declare roles. A role here would make `reset()` treat the entry
/// as gated and remove it on logout.
pub fn constant_routes() -> Vec<RouteDefinition> {
    vec![
        // /redirect/:path(.*)
        // Re-enters the same view to force a refresh of its component state.
        RouteDefinition::new("/redirect")
            .component(LAYOUT)
            .hidden()
            .child(RouteDefinition::new("/redirect/:path(.*)").component("views/redirect/index")),
        RouteDefinition::new("/403")
            .component("views/error-page/403")
            .hidden(),
        RouteDefinition::new("/404")
            .component("views/error-page/404")
            .hidden(),
        RouteDefinition::new("/login")
            .component("views/login/index")
            .hidden(),
        // / -> /dashboard
        // Landing page after sign-in, pinned in the tab bar.
        RouteDefinition::new("/")
            .component(LAYOUT)
            .redirect("/dashboard")
            .child(
                RouteDefinition::new("dashboard")
                    .component("views/dashboard/index")
                    .named("Dashboard")
                    .title("Dashboard")
                    .icon("dashboard")
                    .affix(),
            ),
        // /userInfo -> /current
        // The signed-in user's own profile.
        RouteDefinition::new("/userInfo")
            .component(LAYOUT)
            .redirect("/current")
            .hidden()
            .child(
                RouteDefinition::new("/current")
                    .component("views/user/about/index")
                    .named("Profile")
                    .title("Profile"),
            ),
    ]
}
