//! Locale gate: every page lives under `/<locale>/`.
//!
//! Requests without a supported locale prefix are redirected (307) to the
//! visitor's language; prefixed requests get the locale attached as a
//! request extension and mirrored in the `x-locale` response header.

use std::sync::OnceLock;

use axum::extract::{Request, State};
use axum::http::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT_LANGUAGE};
use axum::http::Uri;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use regex::Regex;
use tracing::debug;

use super::AppState;
use crate::i18n::{detect_locale, Locale};

static ROOT_ASSET_REGEX: OnceLock<Regex> = OnceLock::new();

/// Root-level files browsers and crawlers request without a locale.
const ROOT_FILES: &[&str] = &[
    "/favicon.ico",
    "/favicon.png",
    "/favicon.svg",
    "/apple-touch-icon.png",
    "/site.webmanifest",
    "/manifest.webmanifest",
    "/robots.txt",
    "/sitemap.xml",
    "/sitemap_index.xml",
    "/browserconfig.xml",
    "/BingSiteAuth.xml",
];

const X_LOCALE: HeaderName = HeaderName::from_static("x-locale");

/// Locale of the current request, set by [`locale_gate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLocale(pub Locale);

pub async fn locale_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();

    if let Some(target) = root_asset_target(&path) {
        let rewritten = match request.uri().query() {
            Some(query) => format!("{target}?{query}"),
            None => target,
        };
        if let Ok(uri) = rewritten.parse::<Uri>() {
            debug!("Rewriting {} to {}", path, uri);
            *request.uri_mut() = uri;
        }
        return next.run(request).await;
    }

    if is_exempt(&path) {
        return next.run(request).await;
    }

    let production = state.is_production();
    match path_locale(&path) {
        Some(locale) => {
            request.extensions_mut().insert(RequestLocale(locale));
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            apply_security_headers(headers, production);
            if let Ok(value) = HeaderValue::from_str(locale.code()) {
                headers.insert(X_LOCALE, value);
            }
            response
        }
        None => {
            let accept_language = request
                .headers()
                .get(ACCEPT_LANGUAGE)
                .and_then(|v| v.to_str().ok());
            let locale = detect_locale(accept_language);
            let mut target = redirect_target(&path, locale);
            if let Some(query) = request.uri().query() {
                target.push('?');
                target.push_str(query);
            }
            debug!("Redirecting {} to {}", path, target);

            let mut response = Redirect::temporary(&target).into_response();
            apply_security_headers(response.headers_mut(), production);
            response
        }
    }
}

/// `/de/favicon.png` -> `/favicon.png`.
pub fn root_asset_target(path: &str) -> Option<String> {
    let regex = ROOT_ASSET_REGEX.get_or_init(|| {
        Regex::new(
            r"^/[a-z]{2}/(favicon\.(?:png|ico|svg)|apple-touch-icon\.png|site\.webmanifest|manifest\.webmanifest)$",
        )
        .unwrap()
    });
    regex
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|file| format!("/{}", file.as_str()))
}

/// Paths served without a locale prefix.
pub fn is_exempt(path: &str) -> bool {
    path == "/api"
        || path.starts_with("/api/")
        || path == "/assets"
        || path.starts_with("/assets/")
        || ROOT_FILES.contains(&path)
        || (path.ends_with(".txt") && path.matches('/').count() == 1)
}

/// Locale named by the first path segment, if supported.
pub fn path_locale(path: &str) -> Option<Locale> {
    let first = path.trim_start_matches('/').split('/').next()?;
    Locale::parse(first)
}

/// Redirect target for a path without a supported locale. An unknown
/// two-letter first segment is taken for a locale and replaced; any other
/// path is prefixed.
pub fn redirect_target(path: &str, locale: Locale) -> String {
    let trimmed = path.trim_start_matches('/');
    let (first, rest) = match trimmed.find('/') {
        Some(i) => (&trimmed[..i], &trimmed[i..]),
        None => (trimmed, ""),
    };

    let looks_like_locale = first.len() == 2 && first.chars().all(|c| c.is_ascii_lowercase());
    if looks_like_locale {
        let rest = if rest.is_empty() { "/" } else { rest };
        format!("/{}{}", locale.code(), rest)
    } else {
        format!("/{}/{}", locale.code(), trimmed)
    }
}

pub fn apply_security_headers(headers: &mut HeaderMap, production: bool) {
    let static_headers: [(&str, &str); 6] = [
        ("x-content-type-options", "nosniff"),
        ("x-frame-options", "SAMEORIGIN"),
        ("referrer-policy", "no-referrer-when-downgrade"),
        ("permissions-policy", "geolocation=(), microphone=(), camera=()"),
        ("cross-origin-opener-policy", "same-origin"),
        ("x-dns-prefetch-control", "on"),
    ];
    for (name, value) in static_headers {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    if production {
        headers.insert(
            HeaderName::from_static("strict-transport-security"),
            HeaderValue::from_static("max-age=63072000; includeSubDomains; preload"),
        );
    }
}
