//! Lint of the per-locale `metadata` namespace: required copy, lengths,
//! placeholder text and page coverage across locales.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::{read_json, ContentDir};
use crate::content::NS_METADATA;
use crate::error::ContentError;
use crate::i18n::Locale;

pub const MAX_TITLE: usize = 65;
pub const MAX_DESCRIPTION: usize = 160;
/// The default block may run longer than page copy.
pub const MAX_DEFAULT_TITLE: usize = MAX_TITLE + 15;
pub const MAX_DEFAULT_DESCRIPTION: usize = MAX_DESCRIPTION + 40;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub locale: String,
    /// Page path, or `<default>`
    pub page: String,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}", self.locale, self.page, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LintReport {
    pub findings: Vec<Finding>,
}

impl LintReport {
    pub fn errors(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warnings(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }

    /// Strict runs fail on errors; warnings never fail.
    pub fn exit_code(&self, strict: bool) -> i32 {
        if strict && self.errors() > 0 {
            1
        } else {
            0
        }
    }

    pub fn render_text(&self, strict: bool) -> String {
        let mut out: String = self.findings.iter().map(|f| format!("{f}\n")).collect();
        out.push_str(&format!(
            "Metadata lint: {} errors, {} warnings{}\n",
            self.errors(),
            self.warnings(),
            if strict { " (STRICT)" } else { "" }
        ));
        out
    }

    fn push(&mut self, severity: Severity, locale: &str, page: &str, message: String) {
        self.findings.push(Finding {
            severity,
            locale: locale.to_string(),
            page: page.to_string(),
            message,
        });
    }
}

pub fn looks_like_placeholder(text: &str) -> bool {
    PLACEHOLDER_REGEX
        .get_or_init(|| Regex::new(r"(?i)lorem ipsum|placeholder|your (?:title|description)").unwrap())
        .is_match(text)
}

fn check_text(report: &mut LintReport, locale: &str, page: &str, kind: &str, value: Option<&Value>, max: usize) {
    let Some(text) = value.and_then(Value::as_str).filter(|t| !t.trim().is_empty()) else {
        report.push(Severity::Error, locale, page, format!("missing {kind}"));
        return;
    };

    let length = text.chars().count();
    if length > max {
        report.push(
            Severity::Warning,
            locale,
            page,
            format!("{kind} too long ({length}>{max})"),
        );
    }
    if looks_like_placeholder(text) {
        report.push(
            Severity::Warning,
            locale,
            page,
            format!("{kind} looks like placeholder text: \"{text}\""),
        );
    }
}

fn page_keys(config: &Value) -> BTreeSet<String> {
    config
        .get("pages")
        .and_then(Value::as_object)
        .map(|pages| pages.keys().cloned().collect())
        .unwrap_or_default()
}

/// Lint already-parsed metadata files keyed by locale code.
pub fn lint_configs(configs: &BTreeMap<String, Value>) -> LintReport {
    let mut report = LintReport::default();
    let all_pages: BTreeSet<String> = configs.values().flat_map(page_keys).collect();

    for (locale, config) in configs {
        let Some(default) = config.get("default").filter(|d| d.is_object()) else {
            report.push(Severity::Error, locale, "<default>", "missing default block".to_string());
            continue;
        };
        check_text(&mut report, locale, "<default>", "default.title", default.get("title"), MAX_DEFAULT_TITLE);
        check_text(
            &mut report,
            locale,
            "<default>",
            "default.description",
            default.get("description"),
            MAX_DEFAULT_DESCRIPTION,
        );
        let keyword_count = default
            .get("keywords")
            .and_then(Value::as_str)
            .map(|k| k.split(',').filter(|w| !w.trim().is_empty()).count())
            .unwrap_or(0);
        if keyword_count < 3 {
            report.push(
                Severity::Warning,
                locale,
                "<default>",
                "default.keywords too short or missing".to_string(),
            );
        }

        let pages = config.get("pages").and_then(Value::as_object);
        for page in &all_pages {
            let Some(copy) = pages.and_then(|p| p.get(page)) else {
                report.push(Severity::Warning, locale, page, "missing vs other locales".to_string());
                continue;
            };
            check_text(&mut report, locale, page, "title", copy.get("title"), MAX_TITLE);
            check_text(&mut report, locale, page, "description", copy.get("description"), MAX_DESCRIPTION);
            let keywords = copy.get("keywords").and_then(Value::as_str).unwrap_or_default();
            if keywords.chars().count() < 10 {
                report.push(Severity::Warning, locale, page, "keywords missing or short".to_string());
            }
        }
    }
    report
}

/// Lint every served locale's `metadata.json` found under `dir`.
pub fn lint_metadata(dir: &ContentDir) -> Result<LintReport, ContentError> {
    let mut configs = BTreeMap::new();
    for locale in Locale::all() {
        let path = dir.namespace_path(locale.code(), NS_METADATA);
        if path.is_file() {
            configs.insert(locale.code().to_string(), read_json::<Value>(&path)?);
        }
    }
    Ok(lint_configs(&configs))
}
