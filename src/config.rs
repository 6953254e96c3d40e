use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::content::store::default_candidates;
use crate::i18n::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
    Test,
}

impl Environment {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "test" => Environment::Test,
            _ => Environment::Development,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Development => "development",
            Environment::Test => "test",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub environment: Environment,
    pub port: u16,
    pub site_url: String,
    /// Static files (`favicon.png`, `assets/`)
    pub public_dir: PathBuf,

    // Content
    pub translations_dir: Option<PathBuf>,
    /// Locales served but not yet ready for search engines
    pub placeholder_locales: Vec<Locale>,

    // Operational endpoints
    pub restart_secret_token: Option<String>,
    pub restart_allow_in_dev: bool,

    // Search engine notification
    pub indexnow_secret: Option<String>,
    pub indexnow_key: String,
    pub indexnow_endpoint: String,
    pub bing_ping_endpoint: String,

    // Contact form relay
    pub contact_endpoint: Option<String>,

    // OpenAI (maintenance translation only)
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            port: 3000,
            site_url: "https://houle.ai".to_string(),
            public_dir: PathBuf::from("public"),
            translations_dir: None,
            placeholder_locales: Vec::new(),
            restart_secret_token: None,
            restart_allow_in_dev: false,
            indexnow_secret: None,
            indexnow_key: "ebd95385d7154f45ba37d076b4efd008".to_string(),
            indexnow_endpoint: "https://yandex.com/indexnow".to_string(),
            bing_ping_endpoint: "https://www.bing.com/webmaster/ping.aspx".to_string(),
            contact_endpoint: None,
            openai_api_key: None,
            openai_model: "gpt-4o-mini".to_string(),
            openai_api_url: "https://api.openai.com/v1/chat/completions".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            // Server
            environment: std::env::var("ENVIRONMENT")
                .map(|v| Environment::parse(&v))
                .unwrap_or(defaults.environment),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            site_url: std::env::var("SITE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.site_url),
            public_dir: non_empty_var("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.public_dir),

            // Content
            translations_dir: non_empty_var("TRANSLATIONS_DIR").map(PathBuf::from),
            placeholder_locales: parse_locale_list(
                &std::env::var("PLACEHOLDER_LOCALES").unwrap_or_default(),
            )?,

            // Operational endpoints
            restart_secret_token: non_empty_var("RESTART_SECRET_TOKEN"),
            restart_allow_in_dev: std::env::var("RESTART_ALLOW_IN_DEV")
                .map(|v| v == "true")
                .unwrap_or(false),

            // Search engine notification
            indexnow_secret: non_empty_var("INDEXNOW_SECRET"),
            indexnow_key: std::env::var("INDEXNOW_KEY").unwrap_or(defaults.indexnow_key),
            indexnow_endpoint: std::env::var("INDEXNOW_ENDPOINT")
                .unwrap_or(defaults.indexnow_endpoint),
            bing_ping_endpoint: std::env::var("BING_PING_ENDPOINT")
                .unwrap_or(defaults.bing_ping_endpoint),

            // Contact form relay
            contact_endpoint: non_empty_var("CONTACT_ENDPOINT"),

            // OpenAI
            openai_api_key: non_empty_var("OPENAI_API_KEY"),
            openai_model: std::env::var("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            openai_api_url: std::env::var("OPENAI_API_URL").unwrap_or(defaults.openai_api_url),
        })
    }

    /// Content directory: `TRANSLATIONS_DIR`, or the candidate layouts.
    pub fn translations_candidates(&self) -> Vec<PathBuf> {
        match &self.translations_dir {
            Some(dir) => vec![dir.clone()],
            None => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                default_candidates(&cwd)
            }
        }
    }

    /// Host name used in IndexNow payloads (`houle.ai`).
    pub fn site_host(&self) -> &str {
        self.site_url
            .split("://")
            .nth(1)
            .unwrap_or(self.site_url.as_str())
            .split('/')
            .next()
            .unwrap_or_default()
    }

    pub fn is_placeholder(&self, locale: Locale) -> bool {
        self.placeholder_locales.contains(&locale)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse `"en, de"` into locales; unknown codes are a configuration error.
pub fn parse_locale_list(value: &str) -> Result<Vec<Locale>> {
    let mut locales = Vec::new();
    for code in value.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        match Locale::parse(code) {
            Some(locale) if !locales.contains(&locale) => locales.push(locale),
            Some(_) => {}
            None => bail!("Unknown locale '{}' in locale list", code),
        }
    }
    Ok(locales)
}

/// Brand and organization details rendered into pages and JSON-LD.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub brand: &'static str,
    pub legal_name: &'static str,
    pub site_url: String,
    pub logo_url: String,
    pub email: &'static str,
    pub same_as: Vec<&'static str>,
}

impl SiteConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            brand: "houle",
            legal_name: "West-Bay SA",
            site_url: config.site_url.clone(),
            logo_url: format!("{}/assets/logo.svg", config.site_url),
            email: "contact@houle.ai",
            same_as: vec!["https://www.linkedin.com/company/houle-ai/"],
        }
    }

    /// Open Graph image for a locale.
    pub fn og_image(&self, locale: Locale) -> String {
        format!("{}/assets/og/og-{}.avif", self.site_url, locale.code())
    }
}
