use crate::{
    AppState,
    auth::RequestSession,
    models::{
        NavigateRequest, NavigationResponse, NavigationStatus, RouteManifestEntry,
        SessionResponse,
    },
    navigation::{NavigationResult, Navigator, ResolvedRoute, ViewDescriptor, ViewId},
    session::SessionState,
};
use axum::{
    Json,
    extract::{Query, State},
    http::{Method, StatusCode, Uri, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

// --- Query Structs ---

/// ResolveQuery
///
/// Query parameters of GET /api/routes/resolve.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct ResolveQuery {
    /// Location to match, e.g. `/posts/42?tab=photos`.
    pub path: String,
}

/// Fresh navigator for one request, sharing the table and views of the app.
fn navigator(state: &AppState, sessions: SessionState, from: Option<&str>) -> Navigator<ViewDescriptor> {
    let navigator = Navigator::new(state.routes.clone(), state.views.clone(), sessions);
    match from {
        Some(from) => navigator.starting_at(from),
        None => navigator,
    }
}

// --- Handlers ---

/// list_routes
///
/// [Public Route] Publishes the route table in match order so the client
/// bundle registers exactly the routes the server gates.
#[utoipa::path(
    get,
    path = "/api/routes",
    responses((status = 200, description = "Route manifest", body = [RouteManifestEntry]))
)]
pub async fn list_routes(State(state): State<AppState>) -> Json<Vec<RouteManifestEntry>> {
    let manifest = state
        .routes
        .records()
        .iter()
        .map(RouteManifestEntry::from)
        .collect();
    Json(manifest)
}

/// resolve_route
///
/// [Public Route] Matches a location against the table without running the
/// guard. Unknown paths resolve to the not-found route.
#[utoipa::path(
    get,
    path = "/api/routes/resolve",
    params(ResolveQuery),
    responses((status = 200, description = "Matched route", body = ResolvedRoute))
)]
pub async fn resolve_route(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> Json<ResolvedRoute> {
    Json(state.routes.resolve(&query.path))
}

/// get_session
///
/// [Public Route] Reports whether the caller's credentials map to a session.
/// Unlike the guard, a provider outage is surfaced here as 502.
#[utoipa::path(
    get,
    path = "/api/session",
    responses(
        (status = 200, description = "Session state", body = SessionResponse),
        (status = 502, description = "Auth provider unavailable")
    )
)]
pub async fn get_session(
    RequestSession(sessions): RequestSession,
) -> Result<Json<SessionResponse>, StatusCode> {
    match sessions.current_session().await {
        Ok(user) => Ok(Json(SessionResponse {
            authenticated: user.is_some(),
            user,
        })),
        Err(e) => {
            tracing::warn!(error = %e, "session probe failed");
            Err(StatusCode::BAD_GATEWAY)
        }
    }
}

/// navigate
///
/// [Public Route] Runs a client-side navigation through the guard and tells
/// the client where it lands and which view to mount.
#[utoipa::path(
    post,
    path = "/api/navigate",
    request_body = NavigateRequest,
    responses(
        (status = 200, description = "Navigation outcome", body = NavigationResponse),
        (status = 500, description = "Redirect loop or view failed to load")
    )
)]
pub async fn navigate(
    State(state): State<AppState>,
    RequestSession(sessions): RequestSession,
    Json(payload): Json<NavigateRequest>,
) -> Result<Json<NavigationResponse>, StatusCode> {
    let navigator = navigator(&state, sessions, payload.from.as_deref());

    let result = navigator.navigate(&payload.to).await.map_err(|e| {
        tracing::error!(error = %e, to = %payload.to, "navigation failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let response = match result {
        NavigationResult::Completed(done) => NavigationResponse {
            status: if done.redirected_from.is_some() {
                NavigationStatus::Redirected
            } else {
                NavigationStatus::Completed
            },
            location: done.route.full_path.clone(),
            route: done.route,
            redirected_from: done.redirected_from,
            view: Some(done.view),
        },
        NavigationResult::Duplicated(route) => NavigationResponse {
            status: NavigationStatus::Duplicated,
            location: route.full_path.clone(),
            route,
            redirected_from: None,
            view: None,
        },
        NavigationResult::Superseded { location } => NavigationResponse {
            status: NavigationStatus::Superseded,
            route: navigator.resolve(&location),
            location,
            redirected_from: None,
            view: None,
        },
    };

    Ok(Json(response))
}

/// serve_page
///
/// [Gated Fallback] Every page load not claimed by the API goes through the
/// navigation guard. A redirect becomes a 303 to the new location; otherwise
/// the SPA shell is returned with the resolved route embedded, with status
/// 404 when the catch-all matched.
pub async fn serve_page(
    State(state): State<AppState>,
    RequestSession(sessions): RequestSession,
    method: Method,
    uri: Uri,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let location = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let navigator = navigator(&state, sessions, None);
    match navigator.navigate(location).await {
        Ok(NavigationResult::Completed(done)) => {
            if done.redirected_from.is_some() {
                return Redirect::to(&done.route.full_path).into_response();
            }

            let status = if done.route.component == ViewId::NotFound {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::OK
            };
            let shell = render_shell(&done.route, &done.view);
            (status, [(header::CACHE_CONTROL, "no-store")], Html(shell)).into_response()
        }
        // A fresh navigator has no current route and no competing navigation.
        Ok(_) => StatusCode::CONFLICT.into_response(),
        Err(e) => {
            tracing::error!(error = %e, %location, "page navigation failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// render_shell
///
/// Minimal HTML document that boots the client bundle. The resolved route and
/// view descriptor travel as inline JSON so the client skips its first lookup.
pub fn render_shell(route: &ResolvedRoute, view: &ViewDescriptor) -> String {
    let payload = serde_json::json!({ "route": route, "view": view })
        .to_string()
        .replace("</", "<\\/");

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<link rel="modulepreload" href="/assets/{chunk}.js">
<script type="module" src="/assets/main.js"></script>
</head>
<body>
<div id="app"></div>
<script id="__ROUTE__" type="application/json">{payload}</script>
</body>
</html>
"#,
        title = view.title,
        chunk = view.chunk,
    )
}
