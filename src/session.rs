use parking_lot::Mutex;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::{
    models::{Role, RouteDefinition},
    registrar::{RegistrarError, ResetOutcome, RouteRegistrar},
    storage::{CredentialState, StorageError},
};

/// SessionState
///
/// `Unauthenticated` → `Authorizing` → `Authorized`, and back to `Unauthenticated`
/// on logout or session expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authorizing,
    Authorized,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no credential stored; sign in first")]
    NotSignedIn,

    #[error("gated routes could not be reset; a reload was requested")]
    ResetFailed,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Registrar(#[from] RegistrarError),
}

struct SessionInner {
    state: SessionState,
    roles: BTreeSet<Role>,
}

/// Session
///
/// Keeps the credential, the role set and the installed gated routes consistent.
/// Every transition runs under one lock, so a caller never observes a cleared token
/// with gated routes still live (or the reverse).
pub struct Session {
    credentials: CredentialState,
    registrar: RouteRegistrar,
    inner: Mutex<SessionInner>,
}

impl Session {
    pub fn new(credentials: CredentialState, registrar: RouteRegistrar) -> Self {
        Self {
            credentials,
            registrar,
            inner: Mutex::new(SessionInner {
                state: SessionState::Unauthenticated,
                roles: BTreeSet::new(),
            }),
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    pub fn is_authorized(&self) -> bool {
        self.state() == SessionState::Authorized
    }

    pub fn roles(&self) -> BTreeSet<Role> {
        self.inner.lock().roles.clone()
    }

    /// The current bearer token, read from the store on every call.
    pub fn token(&self) -> Option<String> {
        self.credentials.get()
    }

    pub fn registrar(&self) -> &RouteRegistrar {
        &self.registrar
    }

    /// sign_in
    ///
    /// Stores a freshly issued token. Any previous authorization is dropped first: its
    /// roles belong to whoever held the old token.
    pub fn sign_in(&self, token: &str) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        if inner.state != SessionState::Unauthenticated {
            let outcome = self.registrar.reset();
            inner.roles.clear();
            inner.state = SessionState::Unauthenticated;
            if outcome == ResetOutcome::ReloadRequested {
                return Err(SessionError::ResetFailed);
            }
        }
        self.credentials.set(token)?;
        tracing::info!("Session signed in");
        Ok(())
    }

    /// authorize
    ///
    /// Installs the gated routes `roles` may see. Re-authorizing an authorized session
    /// resets first so routes granted by the previous role set do not linger.
    pub fn authorize(&self, roles: BTreeSet<Role>) -> Result<Vec<RouteDefinition>, SessionError> {
        let mut inner = self.inner.lock();

        if self.credentials.get().is_none() {
            return Err(SessionError::NotSignedIn);
        }

        if inner.state == SessionState::Authorized {
            if let ResetOutcome::ReloadRequested = self.registrar.reset() {
                inner.roles.clear();
                inner.state = SessionState::Unauthenticated;
                return Err(SessionError::ResetFailed);
            }
        }

        inner.state = SessionState::Authorizing;
        let routes = self.registrar.compute_authorized_routes(&roles);

        if let Err(e) = self.registrar.install(&routes) {
            tracing::error!(error = %e, "Route installation failed, rolling back");
            if self.registrar.reset() == ResetOutcome::ReloadRequested {
                tracing::warn!("Rollback left gated routes behind, reload requested");
            }
            inner.roles.clear();
            inner.state = SessionState::Unauthenticated;
            return Err(e.into());
        }

        tracing::info!(roles = ?roles, routes = routes.len(), "Session authorized");
        inner.roles = roles;
        inner.state = SessionState::Authorized;
        Ok(routes)
    }

    /// logout
    ///
    /// Clears the credential, the roles and the gated routes. Idempotent: an already
    /// signed-out session is left alone and `false` is returned.
    pub fn logout(&self) -> bool {
        self.sign_out().is_some()
    }

    /// sign_out
    ///
    /// `logout` that reports how the route reset went, or `None` when there was
    /// nothing to sign out of. A `ReloadRequested` outcome means the shell has already
    /// been asked to reload.
    pub fn sign_out(&self) -> Option<ResetOutcome> {
        let mut inner = self.inner.lock();

        let has_token = self.credentials.get().is_some();
        if !has_token && inner.state == SessionState::Unauthenticated && inner.roles.is_empty() {
            tracing::debug!("Logout requested on a signed-out session, ignoring");
            return None;
        }

        if let Err(e) = self.credentials.clear() {
            tracing::error!(error = %e, "Failed to clear stored credential");
        }
        let outcome = self.registrar.reset();
        inner.roles.clear();
        inner.state = SessionState::Unauthenticated;

        tracing::info!(?outcome, "Session logged out");
        Some(outcome)
    }
}
