use std::{env, time::Duration};

use crate::error::ConfigError;

/// Supabase CLI defaults used when running against a local stack.
const LOCAL_SUPABASE_URL: &str = "http://localhost:54321";
const LOCAL_SUPABASE_KEY: &str = "local-anon-key";
const LOCAL_JWT_SECRET: &str = "super-secret-jwt-token-with-at-least-32-characters-long";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 5;

/// AppConfig
///
/// Immutable configuration, loaded once at startup and shared through the
/// application state via `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the local session bypass and log format.
    pub env: Env,
    // Supabase project URL, the auth API lives under /auth/v1.
    pub supabase_url: String,
    // Public (anon) API key sent as the `apikey` header.
    pub supabase_key: String,
    // Project JWT secret, only needed by the local verifier.
    pub jwt_secret: String,
    pub session_verifier: SessionVerifier,
    // Upper bound on one session lookup against the auth provider.
    pub auth_timeout: Duration,
    pub bind_addr: String,
}

/// Env
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// SessionVerifier
///
/// How access tokens are turned into sessions.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionVerifier {
    /// Ask the hosted auth service on every navigation.
    Remote,
    /// Verify the token signature locally with the project JWT secret.
    Jwt,
}

impl Default for AppConfig {
    /// Local settings with no environment lookups, for tests.
    fn default() -> Self {
        Self {
            env: Env::Local,
            supabase_url: LOCAL_SUPABASE_URL.to_string(),
            supabase_key: LOCAL_SUPABASE_KEY.to_string(),
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            session_verifier: SessionVerifier::Remote,
            auth_timeout: Duration::from_secs(DEFAULT_AUTH_TIMEOUT_SECS),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables. Production refuses
    /// to start without the secrets its session verifier needs; local falls
    /// back to the Supabase CLI defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let session_verifier = match env::var("SESSION_VERIFIER") {
            Err(_) => SessionVerifier::Remote,
            Ok(value) => match value.as_str() {
                "remote" => SessionVerifier::Remote,
                "jwt" => SessionVerifier::Jwt,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "SESSION_VERIFIER",
                        value,
                    });
                }
            },
        };

        let auth_timeout = match env::var("AUTH_TIMEOUT_SECS") {
            Err(_) => Duration::from_secs(DEFAULT_AUTH_TIMEOUT_SECS),
            Ok(value) => value
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::Invalid {
                    var: "AUTH_TIMEOUT_SECS",
                    value,
                })?,
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        match env {
            Env::Local => Ok(Self {
                env,
                supabase_url: env::var("SUPABASE_URL")
                    .unwrap_or_else(|_| LOCAL_SUPABASE_URL.to_string()),
                supabase_key: env::var("SUPABASE_KEY")
                    .unwrap_or_else(|_| LOCAL_SUPABASE_KEY.to_string()),
                jwt_secret: env::var("SUPABASE_JWT_SECRET")
                    .unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
                session_verifier,
                auth_timeout,
                bind_addr,
            }),
            Env::Production => {
                let required = |var: &'static str| env::var(var).map_err(|_| ConfigError::Missing(var));

                let (supabase_url, supabase_key, jwt_secret) = match session_verifier {
                    SessionVerifier::Remote => (
                        required("SUPABASE_URL")?,
                        required("SUPABASE_KEY")?,
                        env::var("SUPABASE_JWT_SECRET").unwrap_or_default(),
                    ),
                    SessionVerifier::Jwt => (
                        env::var("SUPABASE_URL").unwrap_or_default(),
                        env::var("SUPABASE_KEY").unwrap_or_default(),
                        required("SUPABASE_JWT_SECRET")?,
                    ),
                };

                Ok(Self {
                    env,
                    supabase_url,
                    supabase_key,
                    jwt_secret,
                    session_verifier,
                    auth_timeout,
                    bind_addr,
                })
            }
        }
    }
}
