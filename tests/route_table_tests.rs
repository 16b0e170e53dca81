use admin_console::{
    RouteTable,
    models::{Role, RouteDefinition, SUPER_ADMIN},
    routes::{NOT_FOUND_NAME, RouteTableError, admin, filter_routes, public},
};
use std::collections::BTreeSet;

fn roles(values: &[&str]) -> BTreeSet<Role> {
    values.iter().map(|&v| Role::from(v)).collect()
}

fn names(routes: &[RouteDefinition]) -> Vec<&str> {
    routes.iter().filter_map(|r| r.name.as_deref()).collect()
}

fn gated(name: &str, path: &str, required: &[&str]) -> RouteDefinition {
    RouteDefinition::new(path).named(name).roles(required.iter().copied())
}

#[test]
fn test_builtin_table_is_valid() {
    assert!(RouteTable::new(public::constant_routes(), admin::gated_routes()).is_ok());
}

#[test]
fn test_initial_routes_end_with_catch_all() {
    let table = RouteTable::default();
    let initial = table.initial_routes();

    let last = initial.last().unwrap();
    assert!(last.is_catch_all());
    assert_eq!(last.name.as_deref(), Some(NOT_FOUND_NAME));
    assert_eq!(last.redirect.as_deref(), Some("/404"));
    assert_eq!(initial.len(), table.always_on().len() + 1);
    assert!(initial.iter().all(|r| !r.is_gated()));
}

#[test]
fn test_super_admin_sees_every_gated_entry_in_order() {
    let table = RouteTable::new(
        vec![],
        vec![
            gated("UserList", "/users", &[SUPER_ADMIN]),
            gated("RoleList", "/roles", &[SUPER_ADMIN]),
            gated("ArticleList", "/articles", &[SUPER_ADMIN]),
        ],
    )
    .unwrap();

    let authorized = table.authorized_routes(&roles(&[SUPER_ADMIN]));
    assert_eq!(names(&authorized), vec!["UserList", "RoleList", "ArticleList"]);

    assert!(table.authorized_routes(&roles(&[])).is_empty());
}

#[test]
fn test_filtering_keeps_exactly_the_intersecting_subset() {
    let gated_routes = vec![
        gated("A", "/a", &["EDITOR"]),
        gated("B", "/b", &["AUDITOR", "EDITOR"]),
        gated("C", "/c", &["AUDITOR"]),
        gated("D", "/d", &[SUPER_ADMIN]),
    ];
    let table = RouteTable::new(vec![], gated_routes.clone()).unwrap();

    let role_sets: Vec<BTreeSet<Role>> = vec![
        roles(&[]),
        roles(&["EDITOR"]),
        roles(&["AUDITOR"]),
        roles(&["AUDITOR", SUPER_ADMIN]),
        roles(&["GUEST"]),
        roles(&["EDITOR", "AUDITOR", SUPER_ADMIN]),
    ];

    for user_roles in role_sets {
        let expected: Vec<&str> = gated_routes
            .iter()
            .filter(|r| r.meta.roles.iter().any(|role| user_roles.contains(role)))
            .filter_map(|r| r.name.as_deref())
            .collect();

        let authorized = table.authorized_routes(&user_roles);
        assert_eq!(names(&authorized), expected, "roles: {:?}", user_roles);
        // Deterministic and side-effect free.
        assert_eq!(table.authorized_routes(&user_roles), authorized);
    }
}

#[test]
fn test_children_are_filtered_recursively() {
    let parent = gated("Articles", "/articles", &["EDITOR", "AUDITOR"])
        .child(gated("Article List", "/articles", &["EDITOR"]))
        .child(gated("Audit Log", "/audit", &["AUDITOR"]))
        .child(RouteDefinition::new("/help").named("Help"));

    let filtered = filter_routes(&[parent], &roles(&["AUDITOR"]));
    assert_eq!(filtered.len(), 1);
    assert_eq!(names(&filtered[0].children), vec!["Audit Log", "Help"]);
}

#[test]
fn test_unnamed_gated_routes_are_rejected() {
    let result = RouteTable::new(
        vec![],
        vec![RouteDefinition::new("/secret").roles([SUPER_ADMIN])],
    );
    assert_eq!(
        result.unwrap_err(),
        RouteTableError::UnnamedGatedRoute("/secret".to_string())
    );

    let nested = gated("Parent", "/parent", &[SUPER_ADMIN])
        .child(RouteDefinition::new("/parent/child").roles([SUPER_ADMIN]));
    assert!(matches!(
        RouteTable::new(vec![], vec![nested]),
        Err(RouteTableError::UnnamedGatedRoute(_))
    ));
}

#[test]
fn test_table_shape_is_validated() {
    assert_eq!(
        RouteTable::new(vec![], vec![RouteDefinition::new("/open").named("Open")]).unwrap_err(),
        RouteTableError::UngatedEntry("/open".to_string())
    );

    assert_eq!(
        RouteTable::new(vec![gated("Sneaky", "/sneaky", &[SUPER_ADMIN])], vec![]).unwrap_err(),
        RouteTableError::GatedAlwaysOn("/sneaky".to_string())
    );

    assert_eq!(
        RouteTable::new(
            vec![RouteDefinition::new("/a").named("Same")],
            vec![gated("Same", "/b", &[SUPER_ADMIN])],
        )
        .unwrap_err(),
        RouteTableError::DuplicateName("Same".to_string())
    );

    assert_eq!(
        RouteTable::new(vec![], vec![gated(NOT_FOUND_NAME, "/x", &[SUPER_ADMIN])]).unwrap_err(),
        RouteTableError::DuplicateName(NOT_FOUND_NAME.to_string())
    );
}

#[test]
fn test_route_definition_serializes_for_the_shell() {
    let route = gated("User List", "/users", &[SUPER_ADMIN]).icon("lock").always_show(true);
    let json = serde_json::to_value(&route).unwrap();

    assert_eq!(json["name"], "User List");
    assert_eq!(json["meta"]["roles"], serde_json::json!(["SUPER_ADMIN"]));
    assert_eq!(json["meta"]["svgIcon"], "lock");
    assert_eq!(json["meta"]["alwaysShow"], true);
    assert!(json.get("redirect").is_none());

    let back: RouteDefinition = serde_json::from_value(json).unwrap();
    assert_eq!(back, route);
}
