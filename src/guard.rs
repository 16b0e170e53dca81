use std::sync::Arc;

use crate::{api::AccountApi, models::RouteRecord, session::Session};

/// Where unauthenticated navigation ends up.
pub const LOGIN_PATH: &str = "/login";
/// Landing page for signed-in users.
pub const HOME_PATH: &str = "/";
/// Reached when nothing, not even the catch-all, matches.
pub const NOT_FOUND_PATH: &str = "/404";

/// Paths reachable without a credential.
const WHITE_LIST: &[&str] = &[LOGIN_PATH];

/// Result of a guarded navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Proceed(RouteRecord),
    Redirect(String),
}

/// NavigationGuard
///
/// Runs before every navigation and drives the session state machine:
///
/// - no token: only white-listed paths are reachable, everything else goes to `/login`;
/// - token but not yet authorized: the current user's roles are fetched and the
///   matching gated routes installed before resolving;
/// - a failed role fetch signs the session out.
#[derive(Clone)]
pub struct NavigationGuard {
    session: Arc<Session>,
    account: AccountApi,
}

impl NavigationGuard {
    pub fn new(session: Arc<Session>, account: AccountApi) -> Self {
        Self { session, account }
    }

    pub async fn before_each(&self, to: &str) -> Navigation {
        let target = to.split(['?', '#']).next().unwrap_or_default();

        if self.session.token().is_none() {
            if WHITE_LIST.contains(&target) {
                return self.land(to);
            }
            tracing::debug!(to, "Unauthenticated navigation redirected to login");
            return Navigation::Redirect(LOGIN_PATH.to_string());
        }

        if target == LOGIN_PATH {
            return Navigation::Redirect(HOME_PATH.to_string());
        }

        if !self.session.is_authorized() {
            let profile = match self.account.current_user().await {
                Ok(profile) => profile,
                Err(e) => {
                    tracing::warn!(error = %e, "Could not load current user, signing out");
                    self.session.logout();
                    return Navigation::Redirect(LOGIN_PATH.to_string());
                }
            };

            if let Err(e) = self.session.authorize(profile.role_set()) {
                tracing::error!(error = %e, username = %profile.username, "Authorization failed, signing out");
                self.session.logout();
                return Navigation::Redirect(LOGIN_PATH.to_string());
            }
        }

        self.land(to)
    }

    fn land(&self, to: &str) -> Navigation {
        match self.session.registrar().router().resolve(to) {
            Some(record) => match &record.redirect {
                Some(target) => Navigation::Redirect(target.clone()),
                None => Navigation::Proceed(record),
            },
            None => Navigation::Redirect(NOT_FOUND_PATH.to_string()),
        }
    }
}
