//! HTTP surface: locale-prefixed pages, sitemap and the `/api` routes.

pub mod api;
pub mod middleware;
pub mod ops;
pub mod pages;
pub mod render;

use std::sync::Arc;
use std::time::Instant;

use axum::handler::Handler;
use axum::routing::{any, get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::{Config, SiteConfig};
use crate::contact::ContactClient;
use crate::content::ContentStore;
use crate::i18n::Locale;
use crate::indexnow::IndexNowClient;
use crate::paths::PathLocalizer;
use crate::seo::MetadataAssembler;

pub use middleware::RequestLocale;

/// Ends the process after an authorized kill/restart request. Injected so
/// tests can observe the exit instead of dying.
pub trait Exiter: Send + Sync {
    fn exit(&self, code: i32);
}

/// Exits for real; the process supervisor starts a fresh instance.
#[derive(Debug, Default)]
pub struct ProcessExiter;

impl Exiter for ProcessExiter {
    fn exit(&self, code: i32) {
        std::process::exit(code);
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub site: Arc<SiteConfig>,
    pub store: Arc<dyn ContentStore>,
    pub paths: Arc<PathLocalizer>,
    pub indexnow: IndexNowClient,
    pub contact: Option<ContactClient>,
    pub exiter: Arc<dyn Exiter>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn ContentStore>, paths: PathLocalizer) -> Self {
        let http = reqwest::Client::new();
        let site = SiteConfig::from_config(&config);
        let indexnow = IndexNowClient::from_config(&config, http.clone());
        let contact = config
            .contact_endpoint
            .as_ref()
            .map(|endpoint| ContactClient::new(http.clone(), endpoint.clone()));

        Self {
            config: Arc::new(config),
            site: Arc::new(site),
            store,
            paths: Arc::new(paths),
            indexnow,
            contact,
            exiter: Arc::new(ProcessExiter),
            started_at: Instant::now(),
        }
    }

    pub fn with_exiter(mut self, exiter: Arc<dyn Exiter>) -> Self {
        self.exiter = exiter;
        self
    }

    pub fn is_production(&self) -> bool {
        self.config.environment.is_production()
    }

    pub fn metadata(&self) -> MetadataAssembler<'_> {
        MetadataAssembler {
            store: self.store.as_ref(),
            paths: &self.paths,
            site: &self.site,
            placeholder_locales: &self.config.placeholder_locales,
        }
    }
}

/// Full application. The locale gate wraps the inner router so URI
/// rewrites happen before route matching.
pub fn router(state: AppState) -> Router {
    let mut routes = Router::new()
        .route("/sitemap.xml", get(api::sitemap))
        .route("/robots.txt", get(api::robots))
        .route("/api/health", get(ops::health))
        .route("/api/health/memory", get(ops::memory))
        .route("/api/kill", post(ops::kill).fallback(ops::method_not_allowed))
        .route("/api/restart", post(ops::restart).fallback(ops::method_not_allowed))
        .route("/api/translations/:lng/:ns", get(api::translations))
        .route("/api/indexnow", post(api::indexnow))
        .route("/api/indexnow/reindex", post(api::reindex))
        .route("/api/contact", post(api::contact))
        .route("/api/*rest", any(api::not_found));

    for locale in Locale::all() {
        routes = routes
            .route(&format!("/{}", locale.code()), get(pages::home))
            .route(&format!("/{}/", locale.code()), get(pages::home))
            .route(&format!("/{}/*path", locale.code()), get(pages::page));
    }

    let public_dir = state.config.public_dir.clone();
    let not_found = pages::fallback_not_found.with_state(state.clone());
    let inner = routes
        .nest_service("/assets", ServeDir::new(public_dir.join("assets")))
        .fallback_service(ServeDir::new(public_dir).not_found_service(not_found))
        .with_state(state.clone());

    Router::new()
        .fallback_service(inner)
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::locale_gate,
        ))
        .layer(TraceLayer::new_for_http())
}
