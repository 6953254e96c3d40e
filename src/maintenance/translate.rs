//! Machine translation of canonical articles into the other locales.
//!
//! Only title, description and content are translated; slug, dates,
//! image and references are copied from the canonical article. Articles
//! that already are genuine translations are skipped unless forced.

use std::sync::OnceLock;

use anyhow::{bail, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::ContentDir;
use crate::config::Config;
use crate::content::{is_genuine_translation, Article};
use crate::i18n::{Locale, TranslationValidator};
use crate::retry::{is_retryable_status, with_retry_if, RetryConfig};

static FENCE_REGEX: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Serialize)]
struct TranslationRequest {
    model: String,
    messages: Vec<Message>,
    max_completion_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<String>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Check if a model is a reasoning model that doesn't support temperature
fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("gpt-5")
        || model.starts_with("o1")
        || model.starts_with("o3")
        || model.starts_with("o4")
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// Fields returned by the model. Missing ones keep the canonical text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TranslatedFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
}

impl TranslatedFields {
    /// The canonical article with the translated text swapped in.
    pub fn merge_into(self, canonical: &Article) -> Article {
        let pick = |value: Option<String>, fallback: &str| {
            value
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string())
        };
        Article {
            title: pick(self.title, &canonical.title),
            description: pick(self.description, &canonical.description),
            content: pick(self.content, &canonical.content),
            ..canonical.clone()
        }
    }
}

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("chat API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("chat API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unusable model output: {0}")]
    Output(String),
}

impl TranslateError {
    /// Rate limits, server errors and network failures are retried;
    /// other client errors and bad output are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslateError::Api { status, .. } => is_retryable_status(*status),
            TranslateError::Transport(_) => true,
            TranslateError::Output(_) => false,
        }
    }
}

/// Parse the model's JSON object, tolerating markdown fences and text
/// around the object.
pub fn extract_json(raw: &str) -> Option<TranslatedFields> {
    if let Ok(fields) = serde_json::from_str(raw.trim()) {
        return Some(fields);
    }

    let fence = FENCE_REGEX.get_or_init(|| Regex::new(r"(?is)```(?:json)?\s*\n(.*?)```").unwrap());
    if let Some(inner) = fence.captures(raw).and_then(|c| c.get(1)) {
        if let Ok(fields) = serde_json::from_str(inner.as_str().trim()) {
            return Some(fields);
        }
    }

    let start = raw.find('{')?;
    let mut depth = 0usize;
    for (offset, ch) in raw[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let candidate = &raw[start..=start + offset];
                    if let Ok(fields) = serde_json::from_str(candidate) {
                        return Some(fields);
                    }
                }
            }
            _ => {}
        }
    }
    None
}

fn build_system_prompt() -> String {
    "You are a professional translator. Output ONLY a JSON object with the keys \
     title, description and content."
        .to_string()
}

fn build_user_prompt(locale: Locale, article: &Article) -> String {
    let source = serde_json::json!({
        "slug": article.slug,
        "title": article.title,
        "description": article.description,
        "content": article.content,
    });
    format!(
        r#"Translate this French article into {language}.

Rules:
- Do NOT change the slug or any URL.
- No unnecessary capitals: only sentence starts, acronyms and proper names.
- Preserve the markdown structure (headings, lists, links).
- Answer with the JSON object only, no additional text.

Input:
{source}

Output format: {{ "title": "...", "description": "...", "content": "..." }}"#,
        language = locale.name(),
        source = serde_json::to_string_pretty(&source).unwrap_or_default(),
    )
}

/// Client for an OpenAI-compatible chat completions endpoint.
pub struct ChatTranslator {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    retry: RetryConfig,
}

impl ChatTranslator {
    pub fn from_config(config: &Config, client: reqwest::Client) -> Result<Self> {
        let Some(api_key) = config.openai_api_key.clone() else {
            bail!("OPENAI_API_KEY is required to translate articles");
        };
        Ok(Self {
            client,
            api_url: config.openai_api_url.clone(),
            api_key,
            model: config.openai_model.clone(),
            retry: RetryConfig::translation_api(),
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn request(&self, locale: Locale, article: &Article) -> TranslationRequest {
        // Reasoning models need higher token limits and don't support temperature
        let is_reasoning = is_reasoning_model(&self.model);
        TranslationRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: build_system_prompt(),
                },
                Message {
                    role: "user".to_string(),
                    content: build_user_prompt(locale, article),
                },
            ],
            max_completion_tokens: if is_reasoning { 32000 } else { 16000 },
            temperature: if is_reasoning { None } else { Some(0.2) },
            reasoning_effort: is_reasoning.then(|| "low".to_string()),
            response_format: ResponseFormat {
                kind: "json_object",
            },
        }
    }

    pub async fn translate(
        &self,
        locale: Locale,
        article: &Article,
    ) -> Result<TranslatedFields, TranslateError> {
        let request = self.request(locale, article);
        let operation = format!("Translation of {} to {}", article.slug, locale);

        with_retry_if(
            &self.retry,
            &operation,
            || async {
                let response = self
                    .client
                    .post(&self.api_url)
                    .header("Authorization", format!("Bearer {}", self.api_key))
                    .header("Content-Type", "application/json")
                    .json(&request)
                    .send()
                    .await?;

                let status = response.status();
                if !status.is_success() {
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
                    return Err(TranslateError::Api {
                        status: status.as_u16(),
                        body: body.chars().take(400).collect(),
                    });
                }

                let chat: ChatResponse = response.json().await?;
                let content = chat
                    .choices
                    .into_iter()
                    .next()
                    .map(|c| c.message.content)
                    .filter(|c| !c.trim().is_empty())
                    .ok_or_else(|| TranslateError::Output("response contained no choices".into()))?;

                extract_json(&content).ok_or_else(|| {
                    TranslateError::Output("no JSON object in model output".to_string())
                })
            },
            TranslateError::is_retryable,
        )
        .await
    }
}

/// Whether a locale copy should be (re)translated.
pub fn needs_translation(canonical: &Article, local: Option<&Article>, force: bool) -> bool {
    match local {
        None => true,
        Some(_) if force => true,
        Some(article) => !is_genuine_translation(article, canonical),
    }
}

#[derive(Debug, Clone, Default)]
pub struct TranslateOptions {
    pub targets: Vec<Locale>,
    /// Restrict to these slugs when non-empty
    pub only_slugs: Vec<String>,
    /// Stop after this many articles; 0 means no limit
    pub max: usize,
    pub force: bool,
    pub apply: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TranslateSummary {
    /// Articles selected for translation
    pub planned: Vec<(Locale, String)>,
    pub updated: Vec<(Locale, String)>,
    /// Translations discarded because validation found errors
    pub rejected: Vec<(Locale, String, Vec<String>)>,
    /// Target locales without a `ressources.json`
    pub skipped_locales: Vec<Locale>,
}

/// Translate every canonical article still missing a genuine translation.
/// Without `apply` nothing is sent and nothing is written. Each accepted
/// article is saved immediately so an interrupted run keeps its progress.
pub async fn translate_articles(
    translator: Option<&ChatTranslator>,
    dir: &ContentDir,
    options: &TranslateOptions,
) -> Result<TranslateSummary> {
    let canonical = dir.read_ressources(Locale::canonical().code())?;
    if canonical.articles.is_empty() {
        bail!("Canonical article list is empty");
    }
    let translator = match (options.apply, translator) {
        (true, None) => bail!("A chat translator is required with --apply"),
        (_, translator) => translator,
    };

    let mut summary = TranslateSummary::default();
    'locales: for &locale in options.targets.iter().filter(|l| !l.is_canonical()) {
        if !dir.ressources_path(locale.code()).is_file() {
            warn!("Missing {}/ressources.json, skipping", locale);
            summary.skipped_locales.push(locale);
            continue;
        }
        let mut data = dir.read_ressources(locale.code())?;

        for source in &canonical.articles {
            if !options.only_slugs.is_empty() && !options.only_slugs.contains(&source.slug) {
                continue;
            }
            if !needs_translation(source, data.find(&source.slug), options.force) {
                continue;
            }
            if options.max > 0 && summary.planned.len() >= options.max {
                break 'locales;
            }
            summary.planned.push((locale, source.slug.clone()));

            let Some(translator) = translator.filter(|_| options.apply) else {
                info!("[dry-run] Would translate {} to {}", source.slug, locale);
                continue;
            };

            let translated = translator.translate(locale, source).await?.merge_into(source);

            let report = TranslationValidator::validate(&source.content, &translated.content);
            if report.has_errors() {
                warn!("{}:{} rejected: {:?}", locale, source.slug, report.errors);
                summary.rejected.push((locale, source.slug.clone(), report.errors));
                continue;
            }
            for text in [&translated.title, &translated.description] {
                let caps = TranslationValidator::validate(text, text);
                if caps.has_warnings() {
                    warn!("{}:{} {:?}", locale, source.slug, caps.warnings);
                }
            }
            if report.has_warnings() {
                warn!("{}:{} {:?}", locale, source.slug, report.warnings);
            }

            match data.articles.iter_mut().find(|a| a.slug == source.slug) {
                Some(existing) => *existing = translated,
                None => data.articles.push(translated),
            }
            dir.write_ressources(locale.code(), &data)?;
            info!("[UPDATED] {}:{}", locale, source.slug);
            summary.updated.push((locale, source.slug.clone()));
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maintenance::fixtures;
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn create_test_config(api_url: &str) -> Config {
        Config {
            openai_api_key: Some("test-openai-key".to_string()),
            openai_model: "gpt-4o-mini".to_string(),
            openai_api_url: api_url.to_string(),
            ..Config::default()
        }
    }

    fn translator(mock_server: &MockServer) -> ChatTranslator {
        let config = create_test_config(&format!("{}/v1/chat/completions", mock_server.uri()));
        ChatTranslator::from_config(&config, reqwest::Client::new())
            .unwrap()
            .with_retry(RetryConfig::new(3, Duration::from_millis(5)))
    }

    fn create_openai_response(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "choices": [
                {
                    "index": 0,
                    "message": {"role": "assistant", "content": content},
                    "finish_reason": "stop"
                }
            ]
        })
    }

    fn source_article() -> Article {
        serde_json::from_value(json!({
            "slug": "copilot-pme",
            "title": "Copilot pour les PME",
            "description": "Guide pratique",
            "content": "## Pourquoi\nVoir [la doc](https://learn.microsoft.com/copilot).",
            "date": "2024-05-01",
            "references": [{"labelKey": "RefMs", "url": "https://learn.microsoft.com"}]
        }))
        .unwrap()
    }

    fn english_output() -> String {
        json!({
            "title": "Copilot for SMEs",
            "description": "Practical guide",
            "content": "## Why\nSee [the docs](https://learn.microsoft.com/copilot)."
        })
        .to_string()
    }

    // ==================== extract_json ====================

    #[test]
    fn test_extract_json_plain() {
        let fields = extract_json(&english_output()).unwrap();
        assert_eq!(fields.title.as_deref(), Some("Copilot for SMEs"));
    }

    #[test]
    fn test_extract_json_fenced() {
        let raw = format!("```json\n{}\n```", english_output());
        assert_eq!(
            extract_json(&raw).unwrap().description.as_deref(),
            Some("Practical guide")
        );
    }

    #[test]
    fn test_extract_json_surrounded_by_text() {
        let raw = r#"Here you go: {"title": "Titel", "content": "{nested} text"} hope it helps"#;
        let fields = extract_json(raw).unwrap();
        assert_eq!(fields.title.as_deref(), Some("Titel"));
        assert_eq!(fields.content.as_deref(), Some("{nested} text"));
    }

    #[test]
    fn test_extract_json_none() {
        assert!(extract_json("").is_none());
        assert!(extract_json("no json here").is_none());
    }

    // ==================== merge / selection ====================

    #[test]
    fn test_merge_keeps_canonical_metadata() {
        let source = source_article();
        let merged = TranslatedFields {
            title: Some("Copilot für KMU".to_string()),
            description: None,
            content: Some("  ".to_string()),
        }
        .merge_into(&source);

        assert_eq!(merged.title, "Copilot für KMU");
        assert_eq!(merged.description, source.description);
        assert_eq!(merged.content, source.content);
        assert_eq!(merged.slug, source.slug);
        assert_eq!(merged.references, source.references);
    }

    #[test]
    fn test_needs_translation() {
        let source = source_article();
        let duplicate = source.clone();
        let genuine = Article {
            title: "Copilot for SMEs".to_string(),
            ..source.clone()
        };
        assert!(needs_translation(&source, None, false));
        assert!(needs_translation(&source, Some(&duplicate), false));
        assert!(!needs_translation(&source, Some(&genuine), false));
        assert!(needs_translation(&source, Some(&genuine), true));
    }

    #[test]
    fn test_request_serialization() {
        let config = create_test_config("http://localhost/v1/chat/completions");
        let client = ChatTranslator::from_config(&config, reqwest::Client::new()).unwrap();
        let value = serde_json::to_value(client.request(Locale::GERMAN, &source_article())).unwrap();

        assert_eq!(value["response_format"]["type"], "json_object");
        assert!(value.get("reasoning_effort").is_none());
        assert!((value["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
        let prompt = value["messages"][1]["content"].as_str().unwrap();
        assert!(prompt.contains("German"));
        assert!(prompt.contains("copilot-pme"));
    }

    #[test]
    fn test_is_reasoning_model() {
        assert!(is_reasoning_model("gpt-5-mini"));
        assert!(is_reasoning_model("o3-mini"));
        assert!(!is_reasoning_model("gpt-4o-mini"));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = Config::default();
        assert!(ChatTranslator::from_config(&config, reqwest::Client::new()).is_err());
    }

    // ==================== ChatTranslator ====================

    #[tokio::test]
    async fn test_translate_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-openai-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(create_openai_response(&english_output())))
            .expect(1)
            .mount(&mock_server)
            .await;

        let fields = translator(&mock_server)
            .translate(Locale::ENGLISH, &source_article())
            .await
            .unwrap();
        assert_eq!(fields.title.as_deref(), Some("Copilot for SMEs"));
    }

    #[tokio::test]
    async fn test_translate_retries_on_429_then_succeeds() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .up_to_n_times(2)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(create_openai_response(&english_output())))
            .mount(&mock_server)
            .await;

        let result = translator(&mock_server)
            .translate(Locale::ENGLISH, &source_article())
            .await;
        assert!(result.is_ok(), "Should succeed after retries: {:?}", result);
    }

    #[tokio::test]
    async fn test_translate_no_retry_on_400() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let err = translator(&mock_server)
            .translate(Locale::ENGLISH, &source_article())
            .await
            .unwrap_err();
        assert!(matches!(err, TranslateError::Api { status: 400, .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_translate_empty_choices_is_output_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let err = translator(&mock_server)
            .translate(Locale::ENGLISH, &source_article())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }

    // ==================== translate_articles ====================

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let source = serde_json::to_value(source_article()).unwrap();
        let other = json!({"slug": "rgpd", "title": "RGPD", "description": "Guide", "content": "Texte"});
        fixtures::write(dir.path(), "fr", "ressources", &json!({"Articles": [source.clone(), other]}));
        fixtures::write(dir.path(), "en", "ressources", &json!({"Articles": [source]}));
        dir
    }

    #[tokio::test]
    async fn test_dry_run_sends_nothing() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&mock_server)
            .await;
        let dir = fixture();
        let client = translator(&mock_server);

        let summary = translate_articles(
            Some(&client),
            &ContentDir::new(dir.path()),
            &TranslateOptions {
                targets: vec![Locale::ENGLISH, Locale::GERMAN],
                ..TranslateOptions::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(summary.planned.len(), 2);
        assert!(summary.updated.is_empty());
        assert_eq!(summary.skipped_locales, vec![Locale::GERMAN]);
    }

    #[tokio::test]
    async fn test_apply_writes_translation() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(create_openai_response(&english_output())))
            .expect(1)
            .mount(&mock_server)
            .await;
        let dir = fixture();
        let content = ContentDir::new(dir.path());
        let client = translator(&mock_server);

        let summary = translate_articles(
            Some(&client),
            &content,
            &TranslateOptions {
                targets: vec![Locale::ENGLISH],
                only_slugs: vec!["copilot-pme".to_string()],
                apply: true,
                ..TranslateOptions::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(summary.updated, vec![(Locale::ENGLISH, "copilot-pme".to_string())]);
        let en = content.read_ressources("en").unwrap();
        let article = en.find("copilot-pme").unwrap();
        assert_eq!(article.title, "Copilot for SMEs");
        assert_eq!(article.date.as_deref(), Some("2024-05-01"));
        assert_eq!(article.references.len(), 1);
    }

    #[tokio::test]
    async fn test_translation_dropping_urls_is_rejected() {
        let mock_server = MockServer::start().await;
        let lossy = json!({"title": "Copilot for SMEs", "content": "## Why\nSee the docs."}).to_string();
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(create_openai_response(&lossy)))
            .mount(&mock_server)
            .await;
        let dir = fixture();
        let content = ContentDir::new(dir.path());
        let before = std::fs::read_to_string(content.ressources_path("en")).unwrap();
        let client = translator(&mock_server);

        let summary = translate_articles(
            Some(&client),
            &content,
            &TranslateOptions {
                targets: vec![Locale::ENGLISH],
                max: 1,
                apply: true,
                ..TranslateOptions::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(summary.rejected.len(), 1);
        assert!(summary.updated.is_empty());
        assert_eq!(before, std::fs::read_to_string(content.ressources_path("en")).unwrap());
    }

    #[tokio::test]
    async fn test_apply_without_translator_fails() {
        let dir = fixture();
        let result = translate_articles(
            None,
            &ContentDir::new(dir.path()),
            &TranslateOptions {
                targets: vec![Locale::ENGLISH],
                apply: true,
                ..TranslateOptions::default()
            },
        )
        .await;
        assert!(result.is_err());
    }
}
