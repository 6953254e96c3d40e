//! Article reference probing (`check-links`) and removal of dead
//! references (`clean-refs`).

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE};
use serde::Serialize;
use tracing::{debug, info};

use super::ContentDir;
use crate::error::ContentError;
use crate::retry::{with_retry, RetryConfig};

/// Phrases of error pages served with a 200 status.
const SOFT_NOT_FOUND_PHRASES: &[&str] = &[
    "content not found",
    "page not found",
    "page non trouvée",
    "page introuvable",
    "seite nicht gefunden",
    "contenu introuvable",
];

#[derive(Debug, Clone)]
pub struct LinkCheckOptions {
    /// Bodies smaller than this are treated as error pages
    pub min_bytes: usize,
    pub timeout: Duration,
    /// Probes in flight at once
    pub concurrency: usize,
    pub retry: RetryConfig,
}

impl Default for LinkCheckOptions {
    fn default() -> Self {
        Self {
            min_bytes: 600,
            timeout: Duration::from_secs(10),
            concurrency: 6,
            retry: RetryConfig::link_check(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureReason {
    InvalidUrl,
    /// 404, 410 or 5xx
    HttpError,
    /// Any other non-2xx status
    NotOk,
    SoftNotFound,
    TooSmall,
    NetworkError,
}

/// Outcome of probing one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkCheck {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LinkCheck {
    fn passed(status: u16, body_bytes: usize) -> Self {
        Self {
            ok: true,
            status: Some(status),
            body_bytes: Some(body_bytes),
            reason: None,
            error: None,
        }
    }

    fn failed(reason: FailureReason, status: Option<u16>) -> Self {
        Self {
            ok: false,
            status,
            body_bytes: None,
            reason: Some(reason),
            error: None,
        }
    }

    /// The reference is certainly dead: not an http(s) URL, or gone (404/410).
    /// Other failures may be transient or heuristic and are only reported.
    pub fn is_fatal(&self) -> bool {
        match self.reason {
            Some(FailureReason::InvalidUrl) => true,
            Some(FailureReason::HttpError) => matches!(self.status, Some(404) | Some(410)),
            _ => false,
        }
    }
}

pub fn is_http_url(url: &str) -> bool {
    (url.starts_with("http://") || url.starts_with("https://")) && reqwest::Url::parse(url).is_ok()
}

pub fn looks_like_missing(body: &str) -> bool {
    let lower = body.to_lowercase();
    SOFT_NOT_FOUND_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

fn is_textual(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| {
            let ct = ct.to_ascii_lowercase();
            ["text", "html", "json", "xml"].iter().any(|kind| ct.contains(kind))
        })
        .unwrap_or(false)
}

fn content_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Judge a final response from its status and body (or declared size).
pub fn classify(status: u16, body: Option<&str>, size: usize, min_bytes: usize) -> LinkCheck {
    if status == 404 || status == 410 || status >= 500 {
        return LinkCheck::failed(FailureReason::HttpError, Some(status));
    }
    if !(200..300).contains(&status) {
        return LinkCheck::failed(FailureReason::NotOk, Some(status));
    }
    if body.is_some_and(looks_like_missing) {
        return LinkCheck {
            body_bytes: Some(size),
            ..LinkCheck::failed(FailureReason::SoftNotFound, Some(status))
        };
    }
    if size < min_bytes {
        return LinkCheck {
            body_bytes: Some(size),
            ..LinkCheck::failed(FailureReason::TooSmall, Some(status))
        };
    }
    LinkCheck::passed(status, size)
}

pub struct LinkChecker {
    client: reqwest::Client,
    options: LinkCheckOptions,
}

impl LinkChecker {
    pub fn new(options: LinkCheckOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(concat!("houle-site-maint/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, options })
    }

    /// Probe one URL, retrying transport failures.
    pub async fn check(&self, url: &str) -> LinkCheck {
        if !is_http_url(url) {
            return LinkCheck::failed(FailureReason::InvalidUrl, None);
        }

        match with_retry(&self.options.retry, url, || self.probe(url)).await {
            Ok(check) => check,
            Err(e) => LinkCheck {
                error: Some(e.to_string()),
                ..LinkCheck::failed(FailureReason::NetworkError, None)
            },
        }
    }

    /// HEAD first; GET when HEAD is refused, fails, or cannot tell the
    /// body size. Textual bodies are always fetched for soft-404 detection.
    async fn probe(&self, url: &str) -> Result<LinkCheck, reqwest::Error> {
        let head = self.client.head(url).send().await?;
        let head_length = content_length(head.headers()).unwrap_or(0);
        let needs_get =
            !head.status().is_success() || is_textual(head.headers()) || head_length == 0;
        if !needs_get {
            return Ok(classify(
                head.status().as_u16(),
                None,
                head_length,
                self.options.min_bytes,
            ));
        }
        debug!("HEAD {} answered {}, falling back to GET", url, head.status());

        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Ok(classify(status, None, 0, self.options.min_bytes));
        }

        let declared = content_length(response.headers()).unwrap_or(0);
        if is_textual(response.headers()) {
            let body = response.text().await?;
            Ok(classify(status, Some(&body), body.len(), self.options.min_bytes))
        } else if declared > 0 {
            Ok(classify(status, None, declared, self.options.min_bytes))
        } else {
            let bytes = response.bytes().await?;
            Ok(classify(status, None, bytes.len(), self.options.min_bytes))
        }
    }

    /// Probe each distinct URL once, with bounded concurrency.
    pub async fn check_many(&self, urls: &[String]) -> HashMap<String, LinkCheck> {
        let mut unique: Vec<&String> = urls.iter().collect();
        unique.sort();
        unique.dedup();
        info!("Checking {} distinct URLs", unique.len());

        stream::iter(unique)
            .map(|url| async move { (url.clone(), self.check(url).await) })
            .buffer_unordered(self.options.concurrency.max(1))
            .collect()
            .await
    }
}

/// One article reference and its probe result.
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceResult {
    pub locale: String,
    pub slug: String,
    pub url: String,
    #[serde(flatten)]
    pub check: LinkCheck,
}

#[derive(Debug, Default, Serialize)]
pub struct LinkReport {
    pub results: Vec<ReferenceResult>,
}

impl LinkReport {
    pub fn failures(&self) -> impl Iterator<Item = &ReferenceResult> {
        self.results.iter().filter(|r| !r.check.ok)
    }

    pub fn fatal_count(&self) -> usize {
        self.results.iter().filter(|r| r.check.is_fatal()).count()
    }

    pub fn render_text(&self) -> String {
        let mut by_locale: BTreeMap<&str, Vec<&ReferenceResult>> = BTreeMap::new();
        for result in &self.results {
            by_locale.entry(&result.locale).or_default().push(result);
        }

        let mut out = String::new();
        for (locale, results) in by_locale {
            out.push_str(&format!("\nLocale {locale}:\n"));
            for r in results {
                let status = r.check.status.map(|s| format!(" ({s})")).unwrap_or_default();
                let verdict = match (&r.check.reason, r.check.is_fatal()) {
                    (None, _) => "OK".to_string(),
                    (Some(reason), true) => format!("FATAL {reason:?}"),
                    (Some(reason), false) => format!("WARN {reason:?}"),
                };
                out.push_str(&format!("  * REF {} -> {} : {}{}\n", r.slug, r.url, verdict, status));
            }
        }
        out.push_str(&format!(
            "\n{} references, {} failing, {} fatal\n",
            self.results.len(),
            self.failures().count(),
            self.fatal_count()
        ));
        out
    }
}

/// Probe every article reference of the given locales.
pub async fn check_references(
    checker: &LinkChecker,
    dir: &ContentDir,
    locales: &[String],
) -> Result<LinkReport, ContentError> {
    let mut refs = Vec::new();
    for locale in locales {
        let ressources = dir.read_ressources(locale)?;
        for article in &ressources.articles {
            for reference in &article.references {
                refs.push((locale.clone(), article.slug.clone(), reference.url.clone()));
            }
        }
    }

    let urls: Vec<String> = refs.iter().map(|(_, _, url)| url.clone()).collect();
    let checks = checker.check_many(&urls).await;

    let results = refs
        .into_iter()
        .filter_map(|(locale, slug, url)| {
            let check = checks.get(&url)?.clone();
            Some(ReferenceResult {
                locale,
                slug,
                url,
                check,
            })
        })
        .collect();
    Ok(LinkReport { results })
}

/// What `clean-refs` did (or would do) for one locale.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanSummary {
    pub locale: String,
    pub checked: usize,
    /// `(slug, url)` of every removed reference
    pub removed: Vec<(String, String)>,
    pub written: bool,
}

/// Drop fatal references from each locale. Files are only rewritten with
/// `apply`.
pub async fn clean_references(
    checker: &LinkChecker,
    dir: &ContentDir,
    locales: &[String],
    apply: bool,
) -> Result<Vec<CleanSummary>, ContentError> {
    let mut summaries = Vec::new();

    for locale in locales {
        let mut ressources = dir.read_ressources(locale)?;
        let urls: Vec<String> = ressources
            .articles
            .iter()
            .flat_map(|a| a.references.iter().map(|r| r.url.clone()))
            .collect();
        let checks = checker.check_many(&urls).await;

        let mut summary = CleanSummary {
            locale: locale.clone(),
            checked: urls.len(),
            ..CleanSummary::default()
        };
        for article in &mut ressources.articles {
            let slug = article.slug.clone();
            article.references.retain(|reference| {
                let fatal = checks.get(&reference.url).is_some_and(LinkCheck::is_fatal);
                if fatal {
                    summary.removed.push((slug.clone(), reference.url.clone()));
                }
                !fatal
            });
        }

        if apply && !summary.removed.is_empty() {
            dir.write_ressources(locale, &ressources)?;
            summary.written = true;
            info!("Removed {} bad reference(s) from {}", summary.removed.len(), locale);
        }
        summaries.push(summary);
    }
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maintenance::fixtures;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn checker() -> LinkChecker {
        LinkChecker::new(LinkCheckOptions {
            min_bytes: 100,
            timeout: Duration::from_secs(5),
            concurrency: 4,
            retry: RetryConfig::new(2, Duration::from_millis(5)),
        })
        .unwrap()
    }

    fn page(len: usize) -> String {
        format!("<html><body>{}</body></html>", "x".repeat(len))
    }

    // ==================== classify ====================

    #[test]
    fn test_classify_statuses() {
        assert_eq!(classify(404, None, 0, 600).reason, Some(FailureReason::HttpError));
        assert_eq!(classify(503, None, 0, 600).reason, Some(FailureReason::HttpError));
        assert_eq!(classify(401, None, 0, 600).reason, Some(FailureReason::NotOk));
        assert!(classify(200, None, 700, 600).ok);
    }

    #[test]
    fn test_classify_soft_404_and_size() {
        let body = format!("<h1>Page introuvable</h1>{}", "x".repeat(800));
        let check = classify(200, Some(&body), body.len(), 600);
        assert_eq!(check.reason, Some(FailureReason::SoftNotFound));

        let check = classify(200, Some("<p>hi</p>"), 9, 600);
        assert_eq!(check.reason, Some(FailureReason::TooSmall));
        assert_eq!(check.body_bytes, Some(9));
    }

    #[test]
    fn test_fatal_only_for_gone_or_invalid() {
        assert!(classify(404, None, 0, 600).is_fatal());
        assert!(classify(410, None, 0, 600).is_fatal());
        assert!(!classify(500, None, 0, 600).is_fatal());
        assert!(!classify(200, Some("Page not found"), 14, 600).is_fatal());
        assert!(LinkCheck::failed(FailureReason::InvalidUrl, None).is_fatal());
    }

    #[test]
    fn test_is_http_url() {
        assert!(is_http_url("https://learn.microsoft.com/fr-fr/copilot"));
        assert!(!is_http_url("ftp://example.com/file"));
        assert!(!is_http_url("www.example.com"));
        assert!(!is_http_url(""));
    }

    // ==================== LinkChecker ====================

    #[tokio::test]
    async fn test_head_refused_falls_back_to_get() {
        let mock_server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/doc"))
            .respond_with(ResponseTemplate::new(405))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/doc"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string(page(200)),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let check = checker().check(&format!("{}/doc", mock_server.uri())).await;
        assert!(check.ok, "{check:?}");
        assert_eq!(check.status, Some(200));
    }

    #[tokio::test]
    async fn test_binary_with_length_needs_no_get() {
        let mock_server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/guide.pdf"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/pdf")
                    .insert_header("content-length", "48000"),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let check = checker().check(&format!("{}/guide.pdf", mock_server.uri())).await;
        assert!(check.ok, "{check:?}");
        assert_eq!(check.body_bytes, Some(48000));
    }

    #[tokio::test]
    async fn test_gone_page_is_fatal() {
        let mock_server = MockServer::start().await;
        Mock::given(path("/old"))
            .respond_with(ResponseTemplate::new(410))
            .mount(&mock_server)
            .await;

        let check = checker().check(&format!("{}/old", mock_server.uri())).await;
        assert!(check.is_fatal());
        assert_eq!(check.status, Some(410));
    }

    #[tokio::test]
    async fn test_soft_404_detected() {
        let mock_server = MockServer::start().await;
        Mock::given(path("/moved"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html; charset=utf-8")
                    .set_body_string(format!("<h1>Seite nicht gefunden</h1>{}", page(300))),
            )
            .mount(&mock_server)
            .await;

        let check = checker().check(&format!("{}/moved", mock_server.uri())).await;
        assert_eq!(check.reason, Some(FailureReason::SoftNotFound));
        assert!(!check.is_fatal());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let check = checker().check("http://127.0.0.1:9/nothing").await;
        assert_eq!(check.reason, Some(FailureReason::NetworkError));
        assert!(check.error.is_some());
    }

    // ==================== Locale scans ====================

    fn fixture(base: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fixtures::write(
            dir.path(),
            "fr",
            "ressources",
            &json!({
                "Articles": [
                    {
                        "slug": "copilot-pme",
                        "title": "Copilot",
                        "references": [
                            {"labelKey": "RefOk", "url": format!("{base}/ok")},
                            {"labelKey": "RefGone", "url": format!("{base}/gone")},
                            {"labelKey": "RefBad", "url": "learn.microsoft.com/copilot"}
                        ]
                    }
                ],
                "RefOk": "Documentation"
            }),
        );
        dir
    }

    async fn mount_refs(mock_server: &MockServer) {
        Mock::given(path("/ok"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string(page(200)),
            )
            .mount(mock_server)
            .await;
        Mock::given(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(mock_server)
            .await;
    }

    #[tokio::test]
    async fn test_check_references_counts_fatal() {
        let mock_server = MockServer::start().await;
        mount_refs(&mock_server).await;
        let dir = fixture(&mock_server.uri());

        let report = check_references(&checker(), &ContentDir::new(dir.path()), &["fr".to_string()])
            .await
            .unwrap();

        assert_eq!(report.results.len(), 3);
        assert_eq!(report.fatal_count(), 2);
        assert!(report.render_text().contains("3 references, 2 failing, 2 fatal"));
    }

    #[tokio::test]
    async fn test_clean_references_dry_run_keeps_file() {
        let mock_server = MockServer::start().await;
        mount_refs(&mock_server).await;
        let dir = fixture(&mock_server.uri());
        let before = std::fs::read_to_string(dir.path().join("fr/ressources.json")).unwrap();

        let summaries =
            clean_references(&checker(), &ContentDir::new(dir.path()), &["fr".to_string()], false)
                .await
                .unwrap();

        assert_eq!(summaries[0].removed.len(), 2);
        assert!(!summaries[0].written);
        let after = std::fs::read_to_string(dir.path().join("fr/ressources.json")).unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_clean_references_apply_rewrites() {
        let mock_server = MockServer::start().await;
        mount_refs(&mock_server).await;
        let dir = fixture(&mock_server.uri());
        let content = ContentDir::new(dir.path());

        let summaries = clean_references(&checker(), &content, &["fr".to_string()], true)
            .await
            .unwrap();
        assert!(summaries[0].written);

        let ressources = content.read_ressources("fr").unwrap();
        let refs = &ressources.articles[0].references;
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].label_key, "RefOk");
        assert_eq!(ressources.label("RefOk"), Some("Documentation"));
    }

    #[tokio::test]
    async fn test_malformed_locale_fails_loudly() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("de")).unwrap();
        std::fs::write(dir.path().join("de/ressources.json"), "[1,").unwrap();

        let err = check_references(&checker(), &ContentDir::new(dir.path()), &["de".to_string()])
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
