use admin_console::{
    ClientConfig,
    config::{ConfigError, Env, HistoryMode},
};
use serial_test::serial;
use std::{env, panic, time::Duration};

const VARS: &[&str] = &[
    "APP_ENV",
    "ADMIN_BASE_API",
    "ADMIN_TIMEOUT_MS",
    "ADMIN_ROUTER_HISTORY",
    "ADMIN_PUBLIC_PATH",
    "ADMIN_TOKEN_PATH",
];

// --- Setup/Teardown Utilities ---

/// Utility to run a test function with a clean environment and restore it afterward
fn run_with_env<T, R>(test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    // Save current environment variables
    let originals: Vec<(&str, Option<String>)> =
        VARS.iter().map(|&var| (var, env::var(var).ok())).collect();

    unsafe {
        for var in VARS {
            env::remove_var(var);
        }
    }

    // Run the test
    let result = panic::catch_unwind(test);

    // Restore original environment variables
    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            if let Some(val) = original_value {
                env::set_var(key, val);
            } else {
                env::remove_var(key);
            }
        }
    }

    // Re-panic if the test failed
    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_client_config_production_fail_fast() {
    let result = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "production");
        }
        // ADMIN_BASE_API is missing
        ClientConfig::load()
    });

    assert_eq!(result.unwrap_err(), ConfigError::Missing("ADMIN_BASE_API"));
}

#[test]
#[serial]
fn test_client_config_local_env_defaults() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "local");
        }
        ClientConfig::load()
    })
    .unwrap();

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.base_api, "http://localhost:3000");
    assert_eq!(config.timeout, Duration::from_millis(5000));
    assert_eq!(config.history, HistoryMode::Path);
    assert!(config.with_credentials);
}

#[test]
#[serial]
fn test_client_config_production_overrides() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "production");
            env::set_var("ADMIN_BASE_API", "https://api.example.com");
            env::set_var("ADMIN_TIMEOUT_MS", "12000");
            env::set_var("ADMIN_ROUTER_HISTORY", "hash");
            env::set_var("ADMIN_PUBLIC_PATH", "/admin/");
        }
        ClientConfig::load()
    })
    .unwrap();

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.base_api, "https://api.example.com");
    assert_eq!(config.timeout, Duration::from_millis(12000));
    assert_eq!(config.history, HistoryMode::Hash);
    assert_eq!(config.public_path, "/admin/");
}

#[test]
#[serial]
fn test_client_config_rejects_bad_timeout() {
    let result = run_with_env(|| {
        unsafe {
            env::set_var("ADMIN_TIMEOUT_MS", "soon");
        }
        ClientConfig::load()
    });

    assert!(matches!(
        result,
        Err(ConfigError::Invalid { key: "ADMIN_TIMEOUT_MS", .. })
    ));
}

#[test]
#[serial]
fn test_init_tracing_tolerates_existing_subscriber() {
    let config = ClientConfig::default();
    let _ = admin_console::telemetry::init_tracing(&config);
    // A second install must not panic, it just reports that nothing was installed.
    assert!(!admin_console::telemetry::init_tracing(&config));
}
