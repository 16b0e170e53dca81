use admin_console::{
    LiveRouter, ReloadReason, RouteRegistrar, RouteRegistry, RouteTable, Session, SessionState,
    ShellEvent, ShellEvents,
    config::ClientConfig,
    models::{Role, RouteDefinition, RouteRecord, SUPER_ADMIN},
    router::RouterError,
    session::SessionError,
    storage::{CredentialState, CredentialStore, MemoryCredentialStore},
};
use std::{collections::BTreeSet, sync::Arc};

/// Router whose removals always fail.
struct StuckRouter(LiveRouter);

impl RouteRegistry for StuckRouter {
    fn add_route(&self, route: RouteDefinition) -> Result<(), RouterError> {
        self.0.add_route(route)
    }
    fn remove_route(&self, name: &str) -> Result<(), RouterError> {
        Err(RouterError::Inconsistent(format!("cannot detach '{}'", name)))
    }
    fn get_routes(&self) -> Vec<RouteRecord> {
        self.0.get_routes()
    }
    fn has_route(&self, name: &str) -> bool {
        self.0.has_route(name)
    }
}

struct Fixture {
    session: Session,
    router: Arc<LiveRouter>,
    credentials: Arc<MemoryCredentialStore>,
}

fn fixture_with(table: RouteTable, credentials: MemoryCredentialStore) -> Fixture {
    let router = Arc::new(LiveRouter::from_table(&table, &ClientConfig::default()).unwrap());
    let credentials = Arc::new(credentials);
    let registrar = RouteRegistrar::new(router.clone(), Arc::new(table), ShellEvents::new());
    let session = Session::new(credentials.clone() as CredentialState, registrar);
    Fixture {
        session,
        router,
        credentials,
    }
}

fn fixture() -> Fixture {
    fixture_with(RouteTable::default(), MemoryCredentialStore::new())
}

fn roles(values: &[&str]) -> BTreeSet<Role> {
    values.iter().map(|&v| Role::from(v)).collect()
}

#[test]
fn test_session_lifecycle() {
    let f = fixture();
    assert_eq!(f.session.state(), SessionState::Unauthenticated);

    f.session.sign_in("token-1").unwrap();
    assert_eq!(f.session.token().as_deref(), Some("token-1"));
    assert_eq!(f.session.state(), SessionState::Unauthenticated);

    let installed = f.session.authorize(roles(&[SUPER_ADMIN])).unwrap();
    assert_eq!(installed.len(), 3);
    assert_eq!(f.session.state(), SessionState::Authorized);
    assert!(f.router.has_route("User List"));
    assert_eq!(f.session.roles(), roles(&[SUPER_ADMIN]));

    assert!(f.session.logout());
    assert_eq!(f.session.state(), SessionState::Unauthenticated);
    assert_eq!(f.credentials.get(), None);
    assert!(f.session.roles().is_empty());
    assert!(!f.router.has_route("User List"));
    assert!(f.router.has_route("Dashboard"));
}

#[test]
fn test_logout_is_idempotent() {
    let f = fixture();
    assert!(!f.session.logout());

    f.session.sign_in("token").unwrap();
    assert!(f.session.logout());
    assert!(!f.session.logout());
}

#[test]
fn test_authorize_requires_a_credential() {
    let f = fixture();
    assert!(matches!(
        f.session.authorize(roles(&[SUPER_ADMIN])),
        Err(SessionError::NotSignedIn)
    ));
    assert!(!f.router.has_route("Users"));
}

#[test]
fn test_reauthorization_drops_stale_routes() {
    let table = RouteTable::new(
        vec![],
        vec![
            RouteDefinition::new("/edit").named("Edit").roles(["EDITOR"]),
            RouteDefinition::new("/audit").named("Audit").roles(["AUDITOR"]),
        ],
    )
    .unwrap();
    let f = fixture_with(table, MemoryCredentialStore::with_token("t"));

    f.session.authorize(roles(&["EDITOR"])).unwrap();
    assert!(f.router.has_route("Edit"));

    // Role change: the editor screen must disappear.
    f.session.authorize(roles(&["AUDITOR"])).unwrap();
    assert!(!f.router.has_route("Edit"));
    assert!(f.router.has_route("Audit"));
    assert_eq!(f.session.state(), SessionState::Authorized);
}

#[test]
fn test_sign_in_over_authorized_session_resets_routes() {
    let f = fixture_with(RouteTable::default(), MemoryCredentialStore::with_token("old"));
    f.session.authorize(roles(&[SUPER_ADMIN])).unwrap();

    f.session.sign_in("new").unwrap();
    assert_eq!(f.session.state(), SessionState::Unauthenticated);
    assert!(!f.router.has_route("Users"));
    assert_eq!(f.session.token().as_deref(), Some("new"));
}

#[test]
fn test_logout_survives_store_failure() {
    let f = fixture_with(
        RouteTable::default(),
        MemoryCredentialStore::with_token("t").failing(),
    );
    f.session.authorize(roles(&[SUPER_ADMIN])).unwrap();

    assert!(f.session.logout());
    assert_eq!(f.session.token(), None);
    assert_eq!(f.session.state(), SessionState::Unauthenticated);
    assert!(!f.router.has_route("Users"));
}

#[test]
fn test_sign_in_keeps_old_token_when_routes_cannot_be_reset() {
    let table = RouteTable::default();
    let router = Arc::new(StuckRouter(
        LiveRouter::from_table(&table, &ClientConfig::default()).unwrap(),
    ));
    let events = ShellEvents::new();
    let mut rx = events.subscribe();
    let registrar = RouteRegistrar::new(router.clone(), Arc::new(table), events);
    let session = Session::new(
        Arc::new(MemoryCredentialStore::with_token("old")) as CredentialState,
        registrar,
    );
    session.authorize(roles(&[SUPER_ADMIN])).unwrap();

    assert!(matches!(
        session.sign_in("new").unwrap_err(),
        SessionError::ResetFailed
    ));
    assert_eq!(session.token().as_deref(), Some("old"));
    assert_eq!(session.state(), SessionState::Unauthenticated);
    assert!(session.roles().is_empty());
    assert_eq!(
        rx.try_recv().unwrap(),
        ShellEvent::Reload {
            reason: ReloadReason::RouterResetFailed
        }
    );
}
