use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// JSON endpoints the single-page front end calls. None of them rejects an
/// anonymous caller: session state is an input to the navigation guard, not a
/// precondition for talking to it.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /api/routes
        // Route manifest in match order, consumed by the client router at boot.
        .route("/api/routes", get(handlers::list_routes))
        // GET /api/routes/resolve?path=...
        // Pure table lookup, no guard.
        .route("/api/routes/resolve", get(handlers::resolve_route))
        // GET /api/session
        // Whether the caller's token (or cookie) maps to a signed-in user.
        .route("/api/session", get(handlers::get_session))
        // POST /api/navigate
        // Client-side transition: guard, redirects, view descriptor.
        .route("/api/navigate", post(handlers::navigate))
}
