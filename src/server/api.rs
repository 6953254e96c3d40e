//! Sitemap, robots, translations stub, IndexNow and contact routes.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header::{ACCEPT_LANGUAGE, CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use super::AppState;
use crate::contact::ContactSubmission;
use crate::error::ApiError;
use crate::i18n::{detect_locale, is_valid_locale, Locale};
use crate::indexnow::reindex_urls;
use crate::security::secrets_match;
use crate::sitemap::SitemapGenerator;

pub async fn sitemap(State(state): State<AppState>) -> Response {
    let xml = SitemapGenerator::new(&state.config.site_url, state.store.as_ref(), &state.paths).render();
    (
        [
            (CONTENT_TYPE, "application/xml"),
            (CACHE_CONTROL, "public, max-age=3600"),
        ],
        xml,
    )
        .into_response()
}

pub async fn robots(State(state): State<AppState>) -> Response {
    let body = format!(
        "User-agent: *\nAllow: /\n\nSitemap: {}/sitemap.xml\n",
        state.config.site_url
    );
    ([(CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}

/// Legacy client-side translation endpoint; pages are rendered with their
/// copy so the payload is always empty.
pub async fn translations(Path((lng, _ns)): Path<(String, String)>) -> Result<Response, ApiError> {
    if !is_valid_locale(&lng) {
        return Err(ApiError::NotFound);
    }
    Ok((
        [
            (CONTENT_TYPE, "application/json; charset=utf-8"),
            (
                CACHE_CONTROL,
                "public, max-age=86400, stale-while-revalidate=604800",
            ),
        ],
        Json(json!({})),
    )
        .into_response())
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

#[derive(Debug, Default, Deserialize)]
struct IndexNowBody {
    #[serde(default)]
    urls: Vec<String>,
}

/// Announce arbitrary URLs. A body that is not JSON counts as empty.
pub async fn indexnow(State(state): State<AppState>, body: Bytes) -> Result<Json<serde_json::Value>, ApiError> {
    let request: IndexNowBody = serde_json::from_slice(&body).unwrap_or_default();
    if request.urls.is_empty() {
        return Err(ApiError::BadRequest("Missing urls[]".to_string()));
    }

    state.indexnow.submit(&request.urls).await;
    Ok(Json(json!({ "ok": true })))
}

/// Announce every locale's home and contact page.
pub async fn reindex(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<serde_json::Value>, ApiError> {
    let provided = headers
        .get("x-indexnow-secret")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let authorized = match &state.config.indexnow_secret {
        Some(expected) => !provided.is_empty() && secrets_match(provided, expected),
        None => {
            warn!("[INDEXNOW] INDEXNOW_SECRET not configured, rejecting reindex");
            false
        }
    };
    if !authorized {
        warn!("[INDEXNOW] Unauthorized reindex attempt");
        return Err(ApiError::Unauthorized);
    }

    let urls = reindex_urls(&state.config.site_url);
    info!("[INDEXNOW] Reindex requested for {} URLs", urls.len());
    state.indexnow.submit(&urls).await;
    Ok(Json(json!({ "ok": true, "count": urls.len() })))
}

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    #[serde(flatten)]
    pub submission: ContactSubmission,
    /// Locale of the page the form was sent from
    #[serde(default)]
    pub locale: Option<String>,
}

/// Validate a contact submission and relay it. The answer carries the
/// localized message the page shows as a notification.
pub async fn contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_locale = || detect_locale(headers.get(ACCEPT_LANGUAGE).and_then(|v| v.to_str().ok()));

    let request: ContactRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Unreadable contact submission: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "ok": false, "message": header_locale().strings().contact_error })),
            )
                .into_response();
        }
    };

    let locale = request
        .locale
        .as_deref()
        .and_then(Locale::parse)
        .unwrap_or_else(header_locale);
    let strings = locale.strings();

    if let Err(errors) = request.submission.validate() {
        let fields: Vec<_> = errors
            .iter()
            .map(|e| json!({ "field": e.field, "message": e.message(strings) }))
            .collect();
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "ok": false, "errors": fields })),
        )
            .into_response();
    }

    let Some(client) = &state.contact else {
        error!("CONTACT_ENDPOINT not configured, contact submission dropped");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "ok": false, "message": strings.contact_error })),
        )
            .into_response();
    };

    match client.submit(&request.submission).await {
        Ok(()) => Json(json!({ "ok": true, "message": strings.contact_success })).into_response(),
        Err(e) => {
            error!("Contact form submission error: {:#}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "ok": false, "message": strings.contact_error })),
            )
                .into_response()
        }
    }
}
