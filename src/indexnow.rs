//! Search engine notification: Bing sitemap ping and IndexNow (Yandex).

use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::i18n::Locale;

const ENGINE_TIMEOUT: Duration = Duration::from_secs(10);

/// Paths announced by the reindex endpoint, per locale.
pub const REINDEX_PATHS: &[&str] = &["/", "/contact"];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexNowRequest<'a> {
    host: &'a str,
    key: &'a str,
    url_list: &'a [String],
}

/// Outcome of notifying one engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineResult {
    pub engine: &'static str,
    pub success: bool,
    /// HTTP status, absent on transport failure
    pub status: Option<u16>,
}

#[derive(Debug, Clone)]
pub struct IndexNowClient {
    client: reqwest::Client,
    host: String,
    sitemap_url: String,
    key: String,
    indexnow_endpoint: String,
    bing_ping_endpoint: String,
}

impl IndexNowClient {
    pub fn from_config(config: &Config, client: reqwest::Client) -> Self {
        Self {
            client,
            host: config.site_host().to_string(),
            sitemap_url: format!("{}/sitemap.xml", config.site_url),
            key: config.indexnow_key.clone(),
            indexnow_endpoint: config.indexnow_endpoint.clone(),
            bing_ping_endpoint: config.bing_ping_endpoint.clone(),
        }
    }

    /// Notify every engine concurrently. Returns true when at least one
    /// accepted the notification; failures are logged, never raised.
    pub async fn submit(&self, urls: &[String]) -> bool {
        info!(
            "[INDEXNOW] Notifying search engines about {} updated URLs",
            urls.len()
        );

        let (bing, yandex) = tokio::join!(self.ping_sitemap(), self.post_indexnow(urls));
        let results = [bing, yandex];

        let successful = results.iter().filter(|r| r.success).count();
        info!(
            "[INDEXNOW] Completed: {}/{} search engines notified",
            successful,
            results.len()
        );
        successful > 0
    }

    /// Announce a different sitemap location (maintenance `ping`).
    pub fn with_sitemap_url(mut self, sitemap_url: impl Into<String>) -> Self {
        self.sitemap_url = sitemap_url.into();
        self
    }

    pub fn sitemap_url(&self) -> &str {
        &self.sitemap_url
    }

    /// Bing dropped IndexNow for this host (403s); a sitemap ping is used
    /// instead. 410 means the ping endpoint is retired but harmless.
    pub async fn ping_sitemap(&self) -> EngineResult {
        let url = format!(
            "{}?sitemap={}",
            self.bing_ping_endpoint,
            urlencoding::encode(&self.sitemap_url)
        );
        let response = self.client.get(&url).timeout(ENGINE_TIMEOUT).send().await;
        evaluate("Bing", response, |status| status == 410)
    }

    async fn post_indexnow(&self, urls: &[String]) -> EngineResult {
        let request = IndexNowRequest {
            host: &self.host,
            key: &self.key,
            url_list: urls,
        };
        let response = self
            .client
            .post(&self.indexnow_endpoint)
            .header("Content-Type", "application/json; charset=utf-8")
            .json(&request)
            .timeout(ENGINE_TIMEOUT)
            .send()
            .await;
        evaluate("Yandex", response, |_| false)
    }
}

fn evaluate(
    engine: &'static str,
    response: reqwest::Result<reqwest::Response>,
    also_accept: impl Fn(u16) -> bool,
) -> EngineResult {
    match response {
        Ok(response) => {
            let status = response.status().as_u16();
            let success = response.status().is_success() || also_accept(status);
            if success {
                info!("[INDEXNOW] {} notified successfully ({})", engine, status);
            } else {
                warn!("[INDEXNOW] {} returned {}", engine, status);
            }
            EngineResult {
                engine,
                success,
                status: Some(status),
            }
        }
        Err(e) => {
            warn!("[INDEXNOW] {} notification failed: {}", engine, e);
            EngineResult {
                engine,
                success: false,
                status: None,
            }
        }
    }
}

/// Locale home pages and contact pages: `https://site/fr`, `https://site/fr/contact`.
pub fn reindex_urls(site_url: &str) -> Vec<String> {
    let site = site_url.trim_end_matches('/');
    Locale::all()
        .into_iter()
        .flat_map(|locale| {
            REINDEX_PATHS.iter().map(move |path| {
                if *path == "/" {
                    format!("{}/{}", site, locale.code())
                } else {
                    format!("{}/{}{}", site, locale.code(), path)
                }
            })
        })
        .collect()
}
