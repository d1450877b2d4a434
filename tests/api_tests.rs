use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use property_portal::{
    AppConfig, AppState, MockAuthClient, RouteTable, ViewRegistry,
    auth::access_token,
    config::Env,
    create_router,
    models::{NavigationResponse, NavigationStatus, RouteManifestEntry, SessionResponse, SessionUser},
    navigation::{ResolvedRoute, ViewId},
    session::AuthClientState,
};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

// --- Helpers ---

const TEST_USER_ID: Uuid = Uuid::from_u128(9);

fn app_with(auth: MockAuthClient, env: Env) -> Router {
    let config = AppConfig {
        env,
        ..AppConfig::default()
    };

    create_router(AppState {
        routes: Arc::new(RouteTable::portal().unwrap()),
        views: Arc::new(ViewRegistry::portal()),
        auth: Arc::new(auth) as AuthClientState,
        config,
    })
}

fn signed_in_app() -> Router {
    app_with(
        MockAuthClient::signed_in(SessionUser::from_id(TEST_USER_ID)),
        Env::Production,
    )
}

fn signed_out_app() -> Router {
    app_with(MockAuthClient::signed_out(), Env::Production)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_token(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, "Bearer test-token")
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: serde_json::Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    serde_json::from_str(&body_string(response).await).unwrap()
}

// --- Gated pages ---

#[tokio::test]
async fn test_health_check() {
    let response = signed_out_app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_protected_page_without_session_redirects_to_login() {
    let response = signed_in_app().oneshot(get("/posts/42")).await.unwrap();

    // No token at all: the auth client is never consulted.
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn test_protected_page_with_session_serves_shell() {
    let response = signed_in_app().oneshot(get_with_token("/posts/42")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    let html = body_string(response).await;
    assert!(html.contains("views/posts/PostDetail"));
    assert!(html.contains(r#""id":"42""#));
}

#[tokio::test]
async fn test_login_page_with_session_redirects_home() {
    let response = signed_in_app().oneshot(get_with_token("/login")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn test_public_pages_render_without_session() {
    for path in ["/signup", "/forgot-password", "/login"] {
        let response = signed_out_app().oneshot(get(path)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "path {path}");
    }
}

#[tokio::test]
async fn test_unknown_page_is_not_found_shell() {
    let response = signed_out_app().oneshot(get("/no/such/page")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_string(response).await.contains("Page not found"));
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let request = Request::builder()
        .uri("/profile/settings")
        .header(header::COOKIE, "theme=dark; sb-access-token=test-token")
        .body(Body::empty())
        .unwrap();

    let response = signed_in_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("views/user/ProfileSettings"));
}

#[test]
fn test_quoted_session_cookie_is_unquoted() {
    let request = Request::builder()
        .uri("/posts")
        .header(header::COOKIE, r#"sb-access-token="test-token""#)
        .body(Body::empty())
        .unwrap();
    let parts = request.into_parts().0;

    assert_eq!(access_token(&parts).as_deref(), Some("test-token"));
}

#[tokio::test]
async fn test_empty_session_cookie_means_no_token() {
    let request = Request::builder()
        .uri("/posts")
        .header(header::COOKIE, "sb-access-token=; theme=dark")
        .body(Body::empty())
        .unwrap();

    let response = signed_in_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_provider_outage_redirects_to_login() {
    let app = app_with(MockAuthClient::new_failing(), Env::Production);
    let response = app.oneshot(get_with_token("/my-properties")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn test_non_get_page_request_is_rejected() {
    let request = Request::builder()
        .method("DELETE")
        .uri("/posts")
        .body(Body::empty())
        .unwrap();
    let response = signed_in_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// --- Local bypass ---

#[tokio::test]
async fn test_local_user_header_signs_in_locally() {
    let app = app_with(MockAuthClient::signed_out(), Env::Local);
    let request = Request::builder()
        .uri("/add-property")
        .header("x-user-id", TEST_USER_ID.to_string())
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_local_user_header_ignored_in_production() {
    let app = app_with(MockAuthClient::signed_out(), Env::Production);
    let request = Request::builder()
        .uri("/add-property")
        .header("x-user-id", TEST_USER_ID.to_string())
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

// --- JSON API ---

#[tokio::test]
async fn test_route_manifest_lists_table_in_order() {
    let response = signed_out_app().oneshot(get("/api/routes")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let manifest: Vec<RouteManifestEntry> = body_json(response).await;
    assert_eq!(manifest.len(), 13);
    assert_eq!(manifest.first().map(|r| r.path.as_str()), Some("/login"));
    assert_eq!(manifest.last().map(|r| r.view), Some(ViewId::NotFound));

    let detail = manifest.iter().find(|r| r.name == "post-detail").unwrap();
    assert_eq!(detail.params, vec!["id"]);
    assert!(detail.props);
}

#[tokio::test]
async fn test_resolve_endpoint_skips_guard() {
    let response = signed_out_app()
        .oneshot(get("/api/routes/resolve?path=/edit-property/77"))
        .await
        .unwrap();

    let route: ResolvedRoute = body_json(response).await;
    assert_eq!(route.component, ViewId::EditProperty);
    assert_eq!(route.params.get("id").map(String::as_str), Some("77"));
}

#[tokio::test]
async fn test_session_endpoint_reports_state() {
    let response = signed_in_app().oneshot(get_with_token("/api/session")).await.unwrap();
    let session: SessionResponse = body_json(response).await;
    assert!(session.authenticated);
    assert_eq!(session.user.map(|u| u.id), Some(TEST_USER_ID));

    let response = signed_in_app().oneshot(get("/api/session")).await.unwrap();
    let session: SessionResponse = body_json(response).await;
    assert!(!session.authenticated);

    let failing = app_with(MockAuthClient::new_failing(), Env::Production);
    let response = failing.oneshot(get_with_token("/api/session")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_navigate_endpoint_redirects_signed_out_client() {
    let request = post_json("/api/navigate", serde_json::json!({ "to": "/posts/42" }), None);
    let response = signed_in_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let outcome: NavigationResponse = body_json(response).await;
    assert_eq!(outcome.status, NavigationStatus::Redirected);
    assert_eq!(outcome.location, "/login");
    assert_eq!(outcome.redirected_from.as_deref(), Some("/posts/42"));
    assert_eq!(outcome.view.map(|v| v.view), Some(ViewId::Login));
}

#[tokio::test]
async fn test_navigate_endpoint_completes_for_signed_in_client() {
    let request = post_json(
        "/api/navigate",
        serde_json::json!({ "to": "/posts/42", "from": "/posts" }),
        Some("test-token"),
    );
    let response = signed_in_app().oneshot(request).await.unwrap();

    let outcome: NavigationResponse = body_json(response).await;
    assert_eq!(outcome.status, NavigationStatus::Completed);
    assert_eq!(outcome.location, "/posts/42");
    assert_eq!(outcome.route.params.get("id").map(String::as_str), Some("42"));
}

#[tokio::test]
async fn test_navigate_endpoint_reports_duplicate() {
    let request = post_json(
        "/api/navigate",
        serde_json::json!({ "to": "/posts", "from": "/posts" }),
        Some("test-token"),
    );
    let response = signed_in_app().oneshot(request).await.unwrap();

    let outcome: NavigationResponse = body_json(response).await;
    assert_eq!(outcome.status, NavigationStatus::Duplicated);
    assert!(outcome.view.is_none());
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let response = signed_out_app().oneshot(get("/api-docs/openapi.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("/api/navigate"));
}
