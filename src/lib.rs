use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

// --- Module Structure ---

// Configuration and ambient services.
pub mod config;
pub mod events;
pub mod storage;
pub mod telemetry;

// Route model, route table and the live router.
pub mod models;
pub mod router;
pub mod routes;

// Authorization state: dynamic route registration and the session state machine.
pub mod guard;
pub mod registrar;
pub mod session;

// Outgoing HTTP: the authenticated request pipeline and the account calls.
pub mod api;
pub mod request;

// --- Public Re-exports ---

pub use api::AccountApi;
pub use config::ClientConfig;
pub use events::{ReloadReason, ShellEvent, ShellEvents};
pub use guard::{Navigation, NavigationGuard};
pub use registrar::{ResetOutcome, RouteRegistrar};
pub use request::{RequestPipeline, RequestSpec};
pub use router::{LiveRouter, RouteRegistry};
pub use routes::RouteTable;
pub use session::{Session, SessionState};
pub use storage::{CredentialState, FileCredentialStore, MemoryCredentialStore};

use request::{RequestDefaults, ReqwestTransport, RequestError, TransportError, TransportState};
use router::{RouterError, RouterState};
use session::SessionError;
use storage::StorageError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Router(#[from] RouterError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// AdminClient
///
/// The single container the UI shell holds on to. It wires the credential store,
/// live router, registrar, session, request pipeline and navigation guard together
/// and exposes the shell event stream.
#[derive(Clone)]
pub struct AdminClient {
    pub config: ClientConfig,
    pub events: ShellEvents,
    pub router: Arc<LiveRouter>,
    pub session: Arc<Session>,
    pub pipeline: Arc<RequestPipeline>,
    pub account: AccountApi,
    pub guard: NavigationGuard,
}

impl AdminClient {
    /// new
    ///
    /// Assembles a client from explicit collaborators. Tests pass in-memory stores and
    /// the mock transport; `from_config` passes the real ones.
    pub fn new(
        config: ClientConfig,
        table: RouteTable,
        credentials: CredentialState,
        transport: TransportState,
    ) -> Result<Self, ClientError> {
        let events = ShellEvents::new();

        let router = Arc::new(LiveRouter::from_table(&table, &config)?);
        let registrar = RouteRegistrar::new(
            router.clone() as RouterState,
            Arc::new(table),
            events.clone(),
        );
        let session = Arc::new(Session::new(credentials, registrar));

        let pipeline = Arc::new(RequestPipeline::new(
            transport,
            session.clone(),
            events.clone(),
            RequestDefaults::from_config(&config),
        ));
        let account = AccountApi::new(pipeline.clone());
        let guard = NavigationGuard::new(session.clone(), account.clone());

        tracing::info!(base_api = %config.base_api, "Admin client assembled");

        Ok(Self {
            config,
            events,
            router,
            session,
            pipeline,
            account,
            guard,
        })
    }

    /// from_config
    ///
    /// Production wiring: the built-in route table, a file-backed credential store at
    /// `config.token_path` and the reqwest transport.
    pub fn from_config(config: ClientConfig) -> Result<Self, ClientError> {
        let credentials = Arc::new(FileCredentialStore::open(config.token_path.clone())?) as CredentialState;
        let transport = Arc::new(ReqwestTransport::new()?) as TransportState;
        Self::new(config, RouteTable::default(), credentials, transport)
    }

    /// Signs in and stores the issued token. Roles are loaded by the guard on the
    /// next navigation.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let token = self.account.login(username, password).await?;
        self.session.sign_in(&token)?;
        Ok(())
    }

    /// Signs out. Returns `false` when there was nothing to sign out of.
    pub fn logout(&self) -> bool {
        self.session.logout()
    }

    pub async fn navigate(&self, to: &str) -> Navigation {
        self.guard.before_each(to).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ShellEvent> {
        self.events.subscribe()
    }
}
