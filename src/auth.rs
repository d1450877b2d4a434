use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    models::SessionUser,
    session::{AuthClientState, SessionState, StaticSessionProvider, TokenSessionProvider},
};

/// Cookie the front end stores the Supabase access token in.
pub const ACCESS_TOKEN_COOKIE: &str = "sb-access-token";

/// Header accepted in `Env::Local` to impersonate a user without a token.
pub const LOCAL_USER_HEADER: &str = "x-user-id";

/// Claims
///
/// Payload of a Supabase access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the auth user's UUID.
    pub sub: Uuid,
    pub exp: usize,
    pub iat: usize,
    /// Audience (aud): "authenticated" for signed-in users.
    pub aud: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// RequestSession
///
/// Extractor yielding the session provider for the current request. It never
/// rejects: a request without credentials gets a provider that reports no
/// session, and the navigation guard decides what that means.
///
/// Resolution order:
/// 1. Local bypass: in `Env::Local`, a valid UUID in `x-user-id` is a signed-in user.
/// 2. `Authorization: Bearer <token>`.
/// 3. The `sb-access-token` cookie.
pub struct RequestSession(pub SessionState);

impl<S> FromRequestParts<S> for RequestSession
where
    S: Send + Sync,
    AuthClientState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        if config.env == Env::Local {
            if let Some(user_id) = local_user_id(parts) {
                tracing::debug!(%user_id, "local session bypass");
                let provider = StaticSessionProvider::signed_in(SessionUser::from_id(user_id));
                return Ok(RequestSession(Arc::new(provider)));
            }
        }

        let client = AuthClientState::from_ref(state);
        let provider = TokenSessionProvider::new(client, access_token(parts));
        Ok(RequestSession(Arc::new(provider)))
    }
}

fn local_user_id(parts: &Parts) -> Option<Uuid> {
    let value = parts.headers.get(LOCAL_USER_HEADER)?.to_str().ok()?;
    Uuid::parse_str(value).ok()
}

/// Pull the caller's access token from the bearer header or the session cookie.
pub fn access_token(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    let jar = CookieJar::from_headers(&parts.headers);
    jar.get(ACCESS_TOKEN_COOKIE)
        .map(Cookie::value_trimmed)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
