use std::{env, path::PathBuf, time::Duration};

use thiserror::Error;

/// Default request timeout applied by the request pipeline baseline.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// ClientConfig
///
/// Holds the client's entire configuration state. Immutable once loaded and
/// cloned into every service that needs a knob (pipeline baseline, router history,
/// credential store location).
#[derive(Clone, Debug)]
pub struct ClientConfig {
    // Runtime environment marker. Selects the log format.
    pub env: Env,
    // Base address every relative request path is joined onto.
    pub base_api: String,
    // Baseline timeout; callers may override it per request.
    pub timeout: Duration,
    // Include cross-origin cookies (enables the transport's cookie store).
    pub with_credentials: bool,
    // Hash-based or path-based locations. Pure presentation concern.
    pub history: HistoryMode,
    // Prefix under which the shell is served.
    pub public_path: String,
    // File backing the durable credential store.
    pub token_path: PathBuf,
}

/// Env
///
/// Defines the runtime context. `Local` logs human-readable output, `Production`
/// logs JSON for aggregation and refuses to start without an explicit API address.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// HistoryMode
///
/// How router locations are rendered. Has no effect on route matching.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HistoryMode {
    Hash,
    Path,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("FATAL: {0} must be set in production")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

impl Default for ClientConfig {
    /// Safe, non-failing configuration for tests and local scaffolding.
    fn default() -> Self {
        Self {
            env: Env::Local,
            base_api: "http://localhost:3000".to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            with_credentials: true,
            history: HistoryMode::Path,
            public_path: "/".to_string(),
            token_path: env::temp_dir().join("admin-console-token-key"),
        }
    }
}

impl ClientConfig {
    /// load
    ///
    /// Reads a `.env` file (if any) and the process environment, implementing the
    /// **fail-fast** principle: a production build without `ADMIN_BASE_API` is an
    /// error rather than a client silently talking to localhost.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let defaults = Self::default();

        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let base_api = match (env, env::var("ADMIN_BASE_API")) {
            (_, Ok(value)) if !value.trim().is_empty() => value,
            (Env::Production, _) => return Err(ConfigError::Missing("ADMIN_BASE_API")),
            (Env::Local, _) => defaults.base_api,
        };

        let timeout = match env::var("ADMIN_TIMEOUT_MS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::Invalid {
                    key: "ADMIN_TIMEOUT_MS",
                    value: raw,
                })?,
            Err(_) => defaults.timeout,
        };

        let history = match env::var("ADMIN_ROUTER_HISTORY").as_deref() {
            Ok("hash") => HistoryMode::Hash,
            _ => HistoryMode::Path,
        };

        let public_path = env::var("ADMIN_PUBLIC_PATH").unwrap_or(defaults.public_path);

        let token_path = env::var("ADMIN_TOKEN_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.token_path);

        Ok(Self {
            env,
            base_api,
            timeout,
            with_credentials: true,
            history,
            public_path,
            token_path,
        })
    }
}
