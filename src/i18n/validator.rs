//! Translation quality validation for machine-translated articles.
//!
//! Translations must keep every link target, URL and heading of the source
//! markdown; anything else is free to change.

use regex::Regex;
use std::sync::OnceLock;

/// Validation report containing errors and warnings about a translation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Problems that make the translation unusable
    pub errors: Vec<String>,

    /// Suspicious but acceptable differences
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

/// Validator for article translation quality.
pub struct TranslationValidator;

static URL_REGEX: OnceLock<Regex> = OnceLock::new();
static LINK_TARGET_REGEX: OnceLock<Regex> = OnceLock::new();
static HEADING_REGEX: OnceLock<Regex> = OnceLock::new();
static SHOUTING_REGEX: OnceLock<Regex> = OnceLock::new();

/// Acronyms that may legitimately appear in capitals in translated copy.
const ALLOWED_ACRONYMS: &[&str] = &[
    "AI", "IA", "KI", "GPT", "API", "PDF", "SPFX", "SPFx", "SME", "PME", "KMU", "CRM", "ERP",
    "LLM", "RAG", "TVA", "nLPD", "RGPD", "GDPR", "DSGVO", "SA", "CH", "UE", "EU", "URL", "SEO",
];

impl TranslationValidator {
    /// Compare a translated markdown body against its source.
    ///
    /// - An empty translation is an error.
    /// - A URL present in the source but missing from the translation is an
    ///   error; reordering is tolerated.
    /// - Markdown link targets and heading counts must match (warnings).
    /// - Words in unexpected capitals are reported as warnings.
    pub fn validate(original: &str, translated: &str) -> ValidationReport {
        let mut report = ValidationReport::new();

        if translated.trim().is_empty() {
            report.errors.push("Translation is empty".to_string());
            return report;
        }

        let mut orig_urls = Self::extract_urls(original);
        let mut trans_urls = Self::extract_urls(translated);
        orig_urls.sort();
        trans_urls.sort();
        let missing: Vec<_> = orig_urls
            .iter()
            .filter(|url| !trans_urls.contains(url))
            .cloned()
            .collect();
        if !missing.is_empty() {
            report
                .errors
                .push(format!("URLs dropped by translation: {:?}", missing));
        }

        let orig_targets = Self::extract_link_targets(original);
        let trans_targets = Self::extract_link_targets(translated);
        if orig_targets != trans_targets {
            report.warnings.push(format!(
                "Markdown link targets differ: original {:?}, translation {:?}",
                orig_targets, trans_targets
            ));
        }

        let orig_headings = Self::count_headings(original);
        let trans_headings = Self::count_headings(translated);
        if orig_headings != trans_headings {
            report.warnings.push(format!(
                "Heading count mismatch: original has {}, translation has {}",
                orig_headings, trans_headings
            ));
        }

        let shouting = Self::unexpected_capitals(translated);
        if !shouting.is_empty() {
            report
                .warnings
                .push(format!("Unexpected capitals: {:?}", shouting));
        }

        report
    }

    fn extract_urls(text: &str) -> Vec<String> {
        let regex = URL_REGEX.get_or_init(|| Regex::new(r"https?://[^\s)\]>]+").unwrap());
        regex
            .find_iter(text)
            .map(|m| m.as_str().trim_end_matches(['.', ',']).to_string())
            .collect()
    }

    fn extract_link_targets(text: &str) -> Vec<String> {
        let regex =
            LINK_TARGET_REGEX.get_or_init(|| Regex::new(r"\[[^\]]*\]\(([^)\s]+)[^)]*\)").unwrap());
        regex
            .captures_iter(text)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
            .collect()
    }

    fn count_headings(text: &str) -> usize {
        let regex = HEADING_REGEX.get_or_init(|| Regex::new(r"(?m)^#{1,6}\s+\S").unwrap());
        regex.find_iter(text).count()
    }

    fn unexpected_capitals(text: &str) -> Vec<String> {
        let regex = SHOUTING_REGEX.get_or_init(|| Regex::new(r"\b[A-Z]{3,}\b").unwrap());
        let mut words: Vec<String> = regex
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|word| !ALLOWED_ACRONYMS.contains(word))
            .map(str::to_string)
            .collect();
        words.dedup();
        words
    }
}
