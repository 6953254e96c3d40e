//! Router-level tests: locale gate, page rendering with content fallback,
//! sitemap and the `/api` routes, driven through `tower::ServiceExt`.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use houle_site::config::{Config, Environment};
use houle_site::content::FsContentStore;
use houle_site::i18n::Locale;
use houle_site::paths::PathLocalizer;
use houle_site::server::{router, AppState, Exiter};

// ==================== Test Helpers ====================

/// Records the exit code instead of ending the test process.
struct RecordingExiter {
    code: AtomicI32,
}

impl RecordingExiter {
    const NOT_CALLED: i32 = -1;

    fn new() -> Arc<Self> {
        Arc::new(Self {
            code: AtomicI32::new(Self::NOT_CALLED),
        })
    }

    fn code(&self) -> i32 {
        self.code.load(Ordering::SeqCst)
    }
}

impl Exiter for RecordingExiter {
    fn exit(&self, code: i32) {
        self.code.store(code, Ordering::SeqCst);
    }
}

fn write_json(dir: &std::path::Path, rel: &str, value: &Value) {
    let path = dir.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// French canonical content with two articles; German translates one of
/// them and leaves the other out.
fn create_content(temp_dir: &TempDir) {
    let content = temp_dir.path().join("translations");
    write_json(
        &content,
        "fr/ressources.json",
        &json!({
            "IntroTitle": "Ressources",
            "Articles": [
                {
                    "slug": "copilot-pme",
                    "title": "Copilot pour les PME",
                    "description": "Déployer Copilot dans une PME suisse.",
                    "content": "## Introduction\n\nCopilot aide les équipes.",
                    "date": "2025-01-10",
                    "author": "houle"
                },
                {
                    "slug": "ia-privee",
                    "title": "IA privée",
                    "description": "Héberger un modèle en Suisse.",
                    "content": "Les données restent en Suisse.",
                    "date": "2025-02-01"
                }
            ]
        }),
    );
    write_json(
        &content,
        "de/ressources.json",
        &json!({
            "IntroTitle": "Ressourcen",
            "Articles": [
                {
                    "slug": "copilot-pme",
                    "title": "Copilot für KMU",
                    "description": "Copilot in einem Schweizer KMU einführen.",
                    "content": "## Einleitung\n\nCopilot hilft Teams.",
                    "date": "2025-01-10"
                }
            ]
        }),
    );
    write_json(
        &content,
        "fr/metadata.json",
        &json!({
            "default": {
                "title": "houle | IA pour PME",
                "description": "IA privée et Copilot pour les PME suisses.",
                "keywords": "ia, copilot, pme"
            },
            "pages": {
                "/contact": {"title": "Contact", "description": "Écrivez-nous."}
            }
        }),
    );

    let public = temp_dir.path().join("public");
    std::fs::create_dir_all(public.join("assets")).unwrap();
    std::fs::write(public.join("favicon.png"), b"\x89PNG fake").unwrap();
}

fn create_test_config(temp_dir: &TempDir) -> Config {
    Config {
        environment: Environment::Test,
        site_url: "https://houle.ai".to_string(),
        public_dir: temp_dir.path().join("public"),
        translations_dir: Some(temp_dir.path().join("translations")),
        ..Config::default()
    }
}

fn build_app(config: Config, exiter: Arc<RecordingExiter>) -> Router {
    let store = FsContentStore::new(config.translations_dir.clone().unwrap(), false);
    let state = AppState::new(config, Arc::new(store), PathLocalizer::new()).with_exiter(exiter);
    router(state)
}

fn app(temp_dir: &TempDir) -> Router {
    create_content(temp_dir);
    build_app(create_test_config(temp_dir), RecordingExiter::new())
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("router is infallible")
}

async fn get(app: Router, uri: &str) -> Response {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ==================== Locale Gate ====================

#[tokio::test]
async fn test_unknown_locale_redirects_to_accept_language() {
    let temp_dir = TempDir::new().unwrap();
    let request = Request::get("/xx/contact")
        .header(header::ACCEPT_LANGUAGE, "de-CH,de;q=0.9,en;q=0.8")
        .body(Body::empty())
        .unwrap();

    let response = send(app(&temp_dir), request).await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/de/contact");
}

#[tokio::test]
async fn test_missing_locale_redirects_to_default() {
    let temp_dir = TempDir::new().unwrap();

    let response = get(app(&temp_dir), "/contact?ref=mail").await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/en/contact?ref=mail");
}

#[tokio::test]
async fn test_locale_prefixed_page_carries_locale_header() {
    let temp_dir = TempDir::new().unwrap();

    let response = get(app(&temp_dir), "/fr/contact").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-locale").unwrap(), "fr");
    let html = body_text(response).await;
    assert!(html.contains("<html lang=\"fr"));
    assert!(html.contains("data-locale=\"fr\""));
}

#[tokio::test]
async fn test_localized_favicon_is_rewritten_to_root() {
    let temp_dir = TempDir::new().unwrap();

    let response = get(app(&temp_dir), "/de/favicon.png").await;

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = tokio_test::assert_ok!(to_bytes(response.into_body(), usize::MAX).await);
    assert_eq!(&bytes[..], b"\x89PNG fake");
}

#[tokio::test]
async fn test_unknown_page_is_localized_404() {
    let temp_dir = TempDir::new().unwrap();

    let response = get(app(&temp_dir), "/de/does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let html = body_text(response).await;
    assert!(html.contains(Locale::GERMAN.strings().not_found_title));
    assert!(html.contains("noindex"));
}

// ==================== Articles ====================

#[tokio::test]
async fn test_genuine_translation_is_indexable() {
    let temp_dir = TempDir::new().unwrap();

    let response = get(app(&temp_dir), "/de/ressources/articles/copilot-pme").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Copilot für KMU"));
    assert!(!html.contains("noindex"));
    assert!(!html.contains("fallback-notice"));
    assert!(html.contains("application/ld+json"));
}

#[tokio::test]
async fn test_missing_translation_falls_back_to_canonical() {
    let temp_dir = TempDir::new().unwrap();

    let response = get(app(&temp_dir), "/de/ressources/articles/ia-privee").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("IA privée"));
    assert!(html.contains("noindex"));
    assert!(html.contains(Locale::GERMAN.strings().fallback_notice));
}

#[tokio::test]
async fn test_unknown_article_is_404() {
    let temp_dir = TempDir::new().unwrap();

    let response = get(app(&temp_dir), "/fr/ressources/articles/nope").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ==================== Sitemap ====================

#[tokio::test]
async fn test_sitemap_lists_only_genuine_article_urls() {
    let temp_dir = TempDir::new().unwrap();

    let response = get(app(&temp_dir), "/sitemap.xml").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/xml"
    );
    let xml = body_text(response).await;
    assert!(xml.contains("<loc>https://houle.ai/fr/ressources/articles/copilot-pme</loc>"));
    assert!(xml.contains("<loc>https://houle.ai/de/ressources/articles/copilot-pme</loc>"));
    assert!(xml.contains("<loc>https://houle.ai/fr/ressources/articles/ia-privee</loc>"));
    assert!(!xml.contains("<loc>https://houle.ai/de/ressources/articles/ia-privee</loc>"));
    assert!(xml.contains("hreflang=\"x-default\""));
}

#[tokio::test]
async fn test_robots_points_at_sitemap() {
    let temp_dir = TempDir::new().unwrap();

    let response = get(app(&temp_dir), "/robots.txt").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response)
        .await
        .contains("Sitemap: https://houle.ai/sitemap.xml"));
}

// ==================== Health ====================

#[tokio::test]
async fn test_health_is_never_cached() {
    let temp_dir = TempDir::new().unwrap();

    let response = get(app(&temp_dir), "/api/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let cache = response.headers().get(header::CACHE_CONTROL).unwrap();
    assert!(cache.to_str().unwrap().contains("no-store"));
    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["environment"], "test");
    assert!(body["uptimeSeconds"].is_u64());
}

#[tokio::test]
async fn test_memory_reports_content_metrics() {
    let temp_dir = TempDir::new().unwrap();

    let response = get(app(&temp_dir), "/api/health/memory").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CACHE_CONTROL)
        .unwrap()
        .to_str()
        .unwrap()
        .contains("no-store"));
    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert!(body["content"].is_object());
}

// ==================== Kill / Restart ====================

fn authorized_post(uri: &str, token: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_kill_without_secret_is_500() {
    let temp_dir = TempDir::new().unwrap();

    let response = send(app(&temp_dir), authorized_post("/api/kill", "anything")).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_kill_blocked_outside_production() {
    let temp_dir = TempDir::new().unwrap();
    create_content(&temp_dir);
    let config = Config {
        restart_secret_token: Some("s3cret".to_string()),
        ..create_test_config(&temp_dir)
    };
    let exiter = RecordingExiter::new();

    let response = send(build_app(config, exiter.clone()), authorized_post("/api/kill", "s3cret")).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(exiter.code(), RecordingExiter::NOT_CALLED);
}

#[tokio::test]
async fn test_restart_rejects_wrong_token() {
    let temp_dir = TempDir::new().unwrap();
    create_content(&temp_dir);
    let config = Config {
        environment: Environment::Production,
        restart_secret_token: Some("s3cret".to_string()),
        ..create_test_config(&temp_dir)
    };

    let response = send(
        build_app(config, RecordingExiter::new()),
        authorized_post("/api/restart", "wrong"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_authorized_restart_exits_after_responding() {
    let temp_dir = TempDir::new().unwrap();
    create_content(&temp_dir);
    let config = Config {
        restart_secret_token: Some("s3cret".to_string()),
        restart_allow_in_dev: true,
        ..create_test_config(&temp_dir)
    };
    let exiter = RecordingExiter::new();

    let response = send(build_app(config, exiter.clone()), authorized_post("/api/restart", "s3cret")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    // The exit is deferred so the answer reaches the caller first.
    assert_eq!(exiter.code(), RecordingExiter::NOT_CALLED);

    tokio::time::sleep(Duration::from_millis(700)).await;
    assert_eq!(exiter.code(), 0);
}

#[tokio::test]
async fn test_kill_rejects_get() {
    let temp_dir = TempDir::new().unwrap();

    let response = get(app(&temp_dir), "/api/kill").await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// ==================== Translations API ====================

#[tokio::test]
async fn test_translations_for_known_locale() {
    let temp_dir = TempDir::new().unwrap();

    let response = get(app(&temp_dir), "/api/translations/de/common").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({}));
}

#[tokio::test]
async fn test_translations_for_unknown_locale_is_404() {
    let temp_dir = TempDir::new().unwrap();

    let response = get(app(&temp_dir), "/api/translations/xx/common").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_api_route_is_404() {
    let temp_dir = TempDir::new().unwrap();

    let response = get(app(&temp_dir), "/api/nothing/here").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ==================== IndexNow ====================

#[tokio::test]
async fn test_indexnow_requires_urls() {
    let temp_dir = TempDir::new().unwrap();

    let response = send(app(&temp_dir), post_json("/api/indexnow", json!({"urls": []}))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Missing urls[]");
}

#[tokio::test]
async fn test_reindex_without_configured_secret_is_401() {
    let temp_dir = TempDir::new().unwrap();
    let request = Request::post("/api/indexnow/reindex")
        .header("x-indexnow-secret", "guess")
        .body(Body::empty())
        .unwrap();

    let response = send(app(&temp_dir), request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_reindex_notifies_engines() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/indexnow"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(410))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    create_content(&temp_dir);
    let config = Config {
        indexnow_secret: Some("index-secret".to_string()),
        indexnow_endpoint: format!("{}/indexnow", mock_server.uri()),
        bing_ping_endpoint: format!("{}/ping", mock_server.uri()),
        ..create_test_config(&temp_dir)
    };
    let request = Request::post("/api/indexnow/reindex")
        .header("x-indexnow-secret", "index-secret")
        .body(Body::empty())
        .unwrap();

    let response = send(build_app(config, RecordingExiter::new()), request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["count"], Locale::all().len() * 2);
}

// ==================== Contact ====================

#[tokio::test]
async fn test_contact_rejects_invalid_submission() {
    let temp_dir = TempDir::new().unwrap();
    let request = post_json(
        "/api/contact",
        json!({"name": "", "email": "not-an-email", "message": "Bonjour", "consent": false, "locale": "fr"}),
    );

    let response = send(app(&temp_dir), request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["ok"], false);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert!(fields.contains(&"email"));
}

#[tokio::test]
async fn test_contact_unreadable_body_is_localized_json() {
    let temp_dir = TempDir::new().unwrap();
    let request = Request::post("/api/contact")
        .header(header::CONTENT_TYPE, "text/plain")
        .header(header::ACCEPT_LANGUAGE, "de-DE,de;q=0.9")
        .body(Body::from("name=Anna&email=anna@example.com"))
        .unwrap();

    let response = send(app(&temp_dir), request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["ok"], false);
    assert_eq!(
        body["message"],
        "Senden fehlgeschlagen. Bitte versuchen Sie es später erneut."
    );
}

#[tokio::test]
async fn test_contact_relays_valid_submission() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/forms/contact"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    create_content(&temp_dir);
    let config = Config {
        contact_endpoint: Some(format!("{}/forms/contact", mock_server.uri())),
        ..create_test_config(&temp_dir)
    };
    let request = post_json(
        "/api/contact",
        json!({
            "name": "Ada",
            "email": "ada@example.com",
            "message": "Nous aimerions une démo.",
            "consent": true,
            "locale": "de"
        }),
    );

    let response = send(build_app(config, RecordingExiter::new()), request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["message"], Locale::GERMAN.strings().contact_success);
}

#[tokio::test]
async fn test_contact_without_relay_is_503() {
    let temp_dir = TempDir::new().unwrap();
    let request = post_json(
        "/api/contact",
        json!({"name": "Ada", "email": "ada@example.com", "message": "Hi", "consent": true}),
    );

    let response = send(app(&temp_dir), request).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// ==================== Method Handling ====================

#[tokio::test]
async fn test_head_on_page_is_served() {
    let temp_dir = TempDir::new().unwrap();
    let request = Request::builder()
        .method(Method::HEAD)
        .uri("/en/")
        .body(Body::empty())
        .unwrap();

    let response = send(app(&temp_dir), request).await;

    assert_eq!(response.status(), StatusCode::OK);
}
