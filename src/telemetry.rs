use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{ClientConfig, Env};

/// init_tracing
///
/// Installs the logging stack for the host shell. `RUST_LOG` wins when present,
/// otherwise the crate logs at debug and the HTTP client at info.
///
/// Returns `false` when a global subscriber was already installed by the host.
pub fn init_tracing(config: &ClientConfig) -> bool {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "admin_console=debug,reqwest=info".into());

    let installed = match config.env {
        // LOCAL: pretty output for debugging.
        Env::Local => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()
            .is_ok(),
        // PROD: JSON lines for log aggregators.
        Env::Production => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .is_ok(),
    };

    if installed {
        tracing::info!("Client logging initialized in {:?} mode", config.env);
    }
    installed
}
