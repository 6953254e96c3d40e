//! `ressources` parity between the canonical locale and its translations.
//!
//! A diverging locale is replaced wholesale by the canonical copy; slugs,
//! file names and URLs are carried over exactly and the text is translated
//! afterwards.

use serde_json::Value;
use tracing::{info, warn};

use super::{articles_of, read_json, write_json, ContentDir};
use crate::error::ContentError;
use crate::i18n::Locale;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    InParity,
    MissingFile,
    Diverged(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct LocaleSync {
    pub locale: Locale,
    pub status: SyncStatus,
    /// The file was created or replaced
    pub written: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub locales: Vec<LocaleSync>,
}

impl SyncReport {
    pub fn has_differences(&self) -> bool {
        self.locales
            .iter()
            .any(|l| l.status != SyncStatus::InParity)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.locales {
            let code = entry.locale.code();
            match &entry.status {
                SyncStatus::InParity => out.push_str(&format!("Locale: {code} is already in parity.\n")),
                SyncStatus::MissingFile => {
                    out.push_str(&format!("Locale: {code} has no ressources.json\n"));
                }
                SyncStatus::Diverged(issues) => {
                    out.push_str(&format!("\nLocale: {code}\n"));
                    for issue in issues {
                        out.push_str(&format!("  - {issue}\n"));
                    }
                }
            }
            if entry.written {
                out.push_str(&format!("  [UPDATED] {code} replaced with the canonical copy\n"));
            }
        }
        out
    }
}

fn array_len(value: &Value, key: &str) -> Option<usize> {
    value.get(key).and_then(Value::as_array).map(Vec::len)
}

/// Differences of `target` against `canonical`: array counts and missing
/// top-level keys. `Files` is only compared when the canonical copy has it.
pub fn parity_issues(canonical: &Value, target: &Value) -> Vec<String> {
    let mut issues = Vec::new();

    if let Some(expected) = array_len(canonical, "Files") {
        match array_len(target, "Files") {
            Some(found) if found != expected => {
                issues.push(format!("Files count {found} != {expected}"));
            }
            Some(_) => {}
            None => issues.push("Files array missing or not an array".to_string()),
        }
    }

    match (array_len(canonical, "Articles"), array_len(target, "Articles")) {
        (Some(expected), Some(found)) if found != expected => {
            issues.push(format!("Articles count {found} != {expected}"));
        }
        (Some(_), Some(_)) => {}
        _ => issues.push("Articles array missing or not an array".to_string()),
    }

    if let (Some(base), Some(other)) = (canonical.as_object(), target.as_object()) {
        let missing: Vec<&str> = base
            .keys()
            .filter(|key| !other.contains_key(*key))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            issues.push(format!("Missing keys: {}", missing.join(", ")));
        }
    }
    issues
}

/// Compare each target locale with the canonical `ressources.json`,
/// replacing diverging or missing files when `apply` is set.
pub fn sync_ressources(
    dir: &ContentDir,
    targets: &[Locale],
    apply: bool,
) -> Result<SyncReport, ContentError> {
    let canonical_path = dir.ressources_path(Locale::canonical().code());
    let canonical: Value = read_json(&canonical_path)?;
    articles_of(&canonical, &canonical_path)?;

    let mut report = SyncReport::default();
    for &locale in targets.iter().filter(|l| !l.is_canonical()) {
        let path = dir.ressources_path(locale.code());

        let status = if path.is_file() {
            let target: Value = read_json(&path)?;
            let issues = parity_issues(&canonical, &target);
            if issues.is_empty() {
                SyncStatus::InParity
            } else {
                SyncStatus::Diverged(issues)
            }
        } else {
            warn!("Missing target file for {}", locale);
            SyncStatus::MissingFile
        };

        let written = apply && status != SyncStatus::InParity;
        if written {
            write_json(&path, &canonical)?;
            info!("Wrote {} from the canonical copy", path.display());
        }
        report.locales.push(LocaleSync {
            locale,
            status,
            written,
        });
    }
    Ok(report)
}
