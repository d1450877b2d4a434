use axum::{Router, extract::FromRef, http::HeaderName};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod navigation;
pub mod session;

// HTTP route registration.
pub mod routes;
use routes::public;

// --- Public Re-exports ---

pub use config::AppConfig;
pub use navigation::{Navigator, RouteTable, ViewDescriptor, ViewRegistry};
pub use session::{AuthClientState, MockAuthClient, SessionProvider, SessionState};

/// Registry type the HTTP service hands navigators.
pub type ViewState = Arc<ViewRegistry<ViewDescriptor>>;

/// ApiDoc
///
/// OpenAPI document for the JSON API, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_routes, handlers::resolve_route, handlers::get_session,
        handlers::navigate
    ),
    components(
        schemas(
            models::SessionUser, models::SessionResponse, models::NavigateRequest,
            models::NavigationStatus, models::NavigationResponse, models::RouteManifestEntry,
            navigation::ResolvedRoute, navigation::ViewDescriptor, navigation::ViewId,
        )
    ),
    tags(
        (name = "property-portal", description = "Property portal navigation API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, immutable state of the service. The route table and view registry
/// are shared by every per-request navigator; the auth client is the injected
/// session backend.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub views: ViewState,
    pub auth: AuthClientState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for AuthClientState {
    fn from_ref(app_state: &AppState) -> AuthClientState {
        app_state.auth.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the API routes, the gated page fallback, and the observability
/// layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        // Any other path is a page load and goes through the navigation guard.
        .fallback(handlers::serve_page)
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for one HTTP request, correlated by the generated `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
