use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::navigation::{ResolvedRoute, RouteRecord, ViewDescriptor};

// --- Session ---

/// SessionUser
///
/// The signed-in user as reported by the auth provider. Its presence is what
/// the navigation guard calls "a session".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: Option<String>,
    // Supabase role claim, usually "authenticated".
    pub role: Option<String>,
    #[ts(type = "string | null")]
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

impl SessionUser {
    pub fn from_id(id: Uuid) -> Self {
        Self {
            id,
            email: None,
            role: None,
            last_sign_in_at: None,
        }
    }
}

/// SessionResponse
///
/// Body of GET /api/session.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub user: Option<SessionUser>,
}

// --- Navigation ---

/// NavigateRequest
///
/// Input payload for POST /api/navigate.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavigateRequest {
    /// Target location, may carry a query string and fragment.
    #[schema(example = "/posts/42")]
    pub to: String,
    /// Location the client is leaving, if any.
    pub from: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum NavigationStatus {
    Completed,
    Redirected,
    Duplicated,
    Superseded,
}

/// NavigationResponse
///
/// Body of POST /api/navigate. `location` is where the client should end up.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavigationResponse {
    pub status: NavigationStatus,
    pub location: String,
    pub route: ResolvedRoute,
    pub redirected_from: Option<String>,
    pub view: Option<ViewDescriptor>,
}

/// RouteManifestEntry
///
/// One record of the route table as published at GET /api/routes.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RouteManifestEntry {
    pub name: String,
    pub path: String,
    pub view: crate::navigation::ViewId,
    pub requires_auth: bool,
    pub props: bool,
    pub params: Vec<String>,
    pub matched: Vec<String>,
}

impl From<&RouteRecord> for RouteManifestEntry {
    fn from(record: &RouteRecord) -> Self {
        Self {
            name: record.name.clone(),
            path: record.pattern.as_str().to_string(),
            view: record.component,
            requires_auth: record.requires_auth,
            props: record.props,
            params: record.pattern.param_names().map(str::to_string).collect(),
            matched: record.matched.clone(),
        }
    }
}
