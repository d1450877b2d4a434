use property_portal::{
    AppConfig,
    config::{Env, SessionVerifier},
    error::ConfigError,
};
use serial_test::serial;
use std::{env, panic, time::Duration};

const CONFIG_VARS: [&str; 7] = [
    "APP_ENV",
    "SUPABASE_URL",
    "SUPABASE_KEY",
    "SUPABASE_JWT_SECRET",
    "SESSION_VERIFIER",
    "AUTH_TIMEOUT_SECS",
    "BIND_ADDR",
];

// --- Setup/Teardown Utilities ---

/// Run `test` with exactly `vars` set (every other config variable cleared),
/// restoring the original environment afterward.
fn run_with_env<T, R>(vars: &[(&str, &str)], test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals {
        unsafe {
            match original_value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_local_env_defaults() {
    let config = run_with_env(&[("APP_ENV", "local")], AppConfig::load).unwrap();

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.supabase_url, "http://localhost:54321");
    assert_eq!(config.session_verifier, SessionVerifier::Remote);
    assert_eq!(config.auth_timeout, Duration::from_secs(5));
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
}

#[test]
#[serial]
fn test_unset_env_means_local() {
    let config = run_with_env(&[], AppConfig::load).unwrap();
    assert_eq!(config.env, Env::Local);
}

#[test]
#[serial]
fn test_production_remote_fails_fast_without_key() {
    let result = run_with_env(
        &[
            ("APP_ENV", "production"),
            ("SUPABASE_URL", "https://project.supabase.co"),
        ],
        AppConfig::load,
    );

    assert_eq!(result.unwrap_err(), ConfigError::Missing("SUPABASE_KEY"));
}

#[test]
#[serial]
fn test_production_jwt_requires_only_secret() {
    let missing = run_with_env(
        &[("APP_ENV", "production"), ("SESSION_VERIFIER", "jwt")],
        AppConfig::load,
    );
    assert_eq!(missing.unwrap_err(), ConfigError::Missing("SUPABASE_JWT_SECRET"));

    let config = run_with_env(
        &[
            ("APP_ENV", "production"),
            ("SESSION_VERIFIER", "jwt"),
            ("SUPABASE_JWT_SECRET", "prod-secret"),
            ("AUTH_TIMEOUT_SECS", "2"),
            ("BIND_ADDR", "127.0.0.1:8080"),
        ],
        AppConfig::load,
    )
    .unwrap();

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.session_verifier, SessionVerifier::Jwt);
    assert_eq!(config.jwt_secret, "prod-secret");
    assert_eq!(config.auth_timeout, Duration::from_secs(2));
    assert_eq!(config.bind_addr, "127.0.0.1:8080");
}

#[test]
#[serial]
fn test_invalid_values_are_rejected() {
    let verifier = run_with_env(&[("SESSION_VERIFIER", "cookie")], AppConfig::load);
    assert!(matches!(
        verifier.unwrap_err(),
        ConfigError::Invalid { var: "SESSION_VERIFIER", .. }
    ));

    let timeout = run_with_env(&[("AUTH_TIMEOUT_SECS", "0")], AppConfig::load);
    assert!(matches!(
        timeout.unwrap_err(),
        ConfigError::Invalid { var: "AUTH_TIMEOUT_SECS", .. }
    ));
}
