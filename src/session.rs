use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, Validation, decode};
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::{auth::Claims, error::SessionError, models::SessionUser};

// 1. SessionProvider Contract
/// SessionProvider
///
/// The only thing the navigation guard knows about authentication: ask for
/// the current session, get a user or nothing. Injected into every navigator.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_session(&self) -> Result<Option<SessionUser>, SessionError>;
}

/// SessionState
///
/// Shared handle to a session provider.
pub type SessionState = Arc<dyn SessionProvider>;

// 2. AuthClient Contract
/// AuthClient
///
/// Resolves an access token to the user it belongs to. Invalid or expired
/// tokens resolve to `Ok(None)`; `Err` is reserved for the provider being
/// unable to answer.
#[async_trait]
pub trait AuthClient: Send + Sync {
    async fn get_user(&self, access_token: &str) -> Result<Option<SessionUser>, SessionError>;
}

/// AuthClientState
pub type AuthClientState = Arc<dyn AuthClient>;

// 3. Hosted Supabase Auth
/// SupabaseUserResponse
///
/// Subset of the `/auth/v1/user` payload the portal cares about.
#[derive(Deserialize)]
struct SupabaseUserResponse {
    id: Uuid,
    email: Option<String>,
    role: Option<String>,
    last_sign_in_at: Option<DateTime<Utc>>,
}

/// SupabaseAuthClient
///
/// Asks the hosted auth service who owns a token (`GET /auth/v1/user`).
#[derive(Clone)]
pub struct SupabaseAuthClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SupabaseAuthClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, SessionError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl AuthClient for SupabaseAuthClient {
    async fn get_user(&self, access_token: &str) -> Result<Option<SessionUser>, SessionError> {
        let response = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let user = response
                    .json::<SupabaseUserResponse>()
                    .await
                    .map_err(|e| SessionError::Decode(e.to_string()))?;
                Ok(Some(SessionUser {
                    id: user.id,
                    email: user.email,
                    role: user.role,
                    last_sign_in_at: user.last_sign_in_at,
                }))
            }
            // Rejected token: the caller simply has no session.
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status => Err(SessionError::Provider {
                status: status.as_u16(),
            }),
        }
    }
}

// 4. Local JWT Verification
/// JwtAuthClient
///
/// Verifies Supabase-issued access tokens locally with the project's JWT
/// secret. Server-side sign-outs are not visible until the token expires.
#[derive(Clone)]
pub struct JwtAuthClient {
    key: DecodingKey,
    validation: Validation,
}

impl JwtAuthClient {
    pub const AUDIENCE: &'static str = "authenticated";

    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.set_audience(&[Self::AUDIENCE]);

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl AuthClient for JwtAuthClient {
    async fn get_user(&self, access_token: &str) -> Result<Option<SessionUser>, SessionError> {
        match decode::<Claims>(access_token, &self.key, &self.validation) {
            Ok(data) => Ok(Some(SessionUser {
                id: data.claims.sub,
                email: data.claims.email,
                role: data.claims.role,
                last_sign_in_at: None,
            })),
            Err(e) => {
                tracing::debug!(error = %e, "access token rejected");
                Ok(None)
            }
        }
    }
}

// 5. The Mock Implementation (For Tests)
/// MockAuthClient
///
/// Answers every token with the same user, or fails when asked to.
#[derive(Clone, Default)]
pub struct MockAuthClient {
    pub user: Option<SessionUser>,
    /// When true, every lookup returns a provider error.
    pub should_fail: bool,
}

impl MockAuthClient {
    pub fn signed_in(user: SessionUser) -> Self {
        Self {
            user: Some(user),
            should_fail: false,
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            user: None,
            should_fail: true,
        }
    }
}

#[async_trait]
impl AuthClient for MockAuthClient {
    async fn get_user(&self, _access_token: &str) -> Result<Option<SessionUser>, SessionError> {
        if self.should_fail {
            return Err(SessionError::Provider { status: 503 });
        }
        Ok(self.user.clone())
    }
}

// 6. Session Providers
/// TokenSessionProvider
///
/// Binds an auth client to one access token. Without a token there is no
/// session and the auth client is never called.
#[derive(Clone)]
pub struct TokenSessionProvider {
    client: AuthClientState,
    token: Option<String>,
}

impl TokenSessionProvider {
    pub fn new(client: AuthClientState, token: Option<String>) -> Self {
        Self { client, token }
    }
}

#[async_trait]
impl SessionProvider for TokenSessionProvider {
    async fn current_session(&self) -> Result<Option<SessionUser>, SessionError> {
        match &self.token {
            Some(token) => self.client.get_user(token).await,
            None => Ok(None),
        }
    }
}

/// StaticSessionProvider
///
/// Fixed answer. Backs the local `x-user-id` bypass and navigator tests.
#[derive(Clone, Default)]
pub struct StaticSessionProvider {
    pub user: Option<SessionUser>,
    pub should_fail: bool,
}

impl StaticSessionProvider {
    pub fn signed_in(user: SessionUser) -> Self {
        Self {
            user: Some(user),
            should_fail: false,
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            user: None,
            should_fail: true,
        }
    }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn current_session(&self) -> Result<Option<SessionUser>, SessionError> {
        if self.should_fail {
            return Err(SessionError::Transport("simulated outage".to_string()));
        }
        Ok(self.user.clone())
    }
}
