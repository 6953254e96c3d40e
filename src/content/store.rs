//! Filesystem-backed content store with a process-lifetime cache.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use serde_json::Value;
use tracing::{debug, warn};

use crate::content::metrics::{ContentMetrics, MetricsReport};
use crate::content::suggest::missing_namespace_message;
use crate::content::ContentStore;
use crate::i18n::Locale;

type CacheKey = (&'static str, String);

/// Reads `<base>/<locale>/<namespace>.json` and caches the outcome,
/// including "absent", until [`ContentStore::clear`] is called.
pub struct FsContentStore {
    base_dir: PathBuf,
    /// Missing-namespace hints are logged only outside production
    production: bool,
    cache: RwLock<HashMap<CacheKey, Option<Arc<Value>>>>,
    warned: Mutex<HashSet<String>>,
    metrics: ContentMetrics,
}

impl FsContentStore {
    pub fn new(base_dir: impl Into<PathBuf>, production: bool) -> Self {
        Self {
            base_dir: base_dir.into(),
            production,
            cache: RwLock::new(HashMap::new()),
            warned: Mutex::new(HashSet::new()),
            metrics: ContentMetrics::new(),
        }
    }

    /// Build a store over the first existing candidate directory.
    pub fn from_candidates(candidates: &[PathBuf], production: bool) -> Self {
        Self::new(resolve_base_dir(candidates), production)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn namespace_path(&self, locale: &str, namespace: &str) -> PathBuf {
        self.base_dir
            .join(locale)
            .join(format!("{namespace}.json"))
    }

    /// True the first time `key` is seen since the last clear.
    fn warn_once(&self, key: String) -> bool {
        self.warned
            .lock()
            .map(|mut warned| warned.insert(key))
            .unwrap_or(false)
    }

    fn read_from_disk(&self, locale: Locale, namespace: &str) -> Option<Arc<Value>> {
        if !is_safe_namespace(namespace) {
            debug!("Rejected namespace name {:?}", namespace);
            return None;
        }

        let path = self.namespace_path(locale.code(), namespace);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("No content at {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => Some(Arc::new(value)),
            Err(e) => {
                debug!("Ignoring malformed JSON at {}: {}", path.display(), e);
                None
            }
        }
    }
}

impl ContentStore for FsContentStore {
    fn get(&self, locale: Locale, namespace: &str) -> Option<Arc<Value>> {
        let key = (locale.code(), namespace.to_string());

        if let Ok(cache) = self.cache.read() {
            if let Some(entry) = cache.get(&key) {
                self.metrics.record_cache_hit();
                return entry.clone();
            }
        }

        self.metrics.record_cache_miss();
        let loaded = self.read_from_disk(locale, namespace);
        if loaded.is_none() {
            self.metrics.record_missing();
        }

        // Concurrent loads of the same key produce the same value; last write wins.
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(key, loaded.clone());
        }
        loaded
    }

    fn clear(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
        if let Ok(mut warned) = self.warned.lock() {
            warned.clear();
        }
        self.metrics.reset();
    }

    fn list_namespaces(&self, locale: Locale) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.base_dir.join(locale.code())) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .and_then(|name| name.strip_suffix(".json"))
                    .map(str::to_string)
            })
            .collect();
        names.sort();
        names
    }

    fn on_missing(&self, locale: Locale, namespace: &str) {
        if self.production {
            return;
        }

        if !self.warn_once(format!("{}:{}", locale.code(), namespace)) {
            return;
        }

        let canonical = Locale::canonical();
        let mut candidates = self.list_namespaces(locale);
        candidates.extend(self.list_namespaces(canonical));
        candidates.sort();
        candidates.dedup();

        warn!(
            "{}",
            missing_namespace_message(namespace, locale.code(), canonical.code(), &candidates)
        );
    }

    fn on_rejected(&self, locale: Locale, namespace: &str, problems: &[String]) {
        if self.production {
            debug!("{}/{}: skipped {} unusable entries", locale, namespace, problems.len());
            return;
        }
        if !self.warn_once(format!("rejected:{}:{}", locale.code(), namespace)) {
            return;
        }
        for problem in problems {
            warn!("{}/{}.json: {}", locale, namespace, problem);
        }
    }

    fn on_fallback(&self) {
        self.metrics.record_fallback();
    }

    fn metrics(&self) -> Option<MetricsReport> {
        Some(self.metrics.report())
    }
}

/// First candidate that exists on disk, else the first candidate.
pub fn resolve_base_dir(candidates: &[PathBuf]) -> PathBuf {
    candidates
        .iter()
        .find(|candidate| candidate.is_dir())
        .or_else(|| candidates.first())
        .cloned()
        .unwrap_or_else(|| PathBuf::from("translations"))
}

/// Deployment layouts probed when `TRANSLATIONS_DIR` is not set.
pub fn default_candidates(cwd: &Path) -> Vec<PathBuf> {
    vec![
        cwd.join("src").join("translations"),
        cwd.join("translations"),
        Path::new(env!("CARGO_MANIFEST_DIR")).join("translations"),
    ]
}

/// Namespace names map to file names; anything beyond `[A-Za-z0-9_-]`
/// could escape the locale directory.
pub fn is_safe_namespace(namespace: &str) -> bool {
    !namespace.is_empty()
        && namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &Path, locale: &str, namespace: &str, body: &str) {
        let locale_dir = dir.join(locale);
        fs::create_dir_all(&locale_dir).unwrap();
        fs::write(locale_dir.join(format!("{namespace}.json")), body).unwrap();
    }

    // ==================== Loading ====================

    #[test]
    fn test_get_returns_parsed_json() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "fr", "navbar", r#"{"Home": "Accueil"}"#);
        let store = FsContentStore::new(dir.path(), false);

        let value = store.get(Locale::FRENCH, "navbar").unwrap();
        assert_eq!(*value, json!({"Home": "Accueil"}));
    }

    #[test]
    fn test_missing_and_malformed_are_none() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "fr", "broken", "{ not json");
        let store = FsContentStore::new(dir.path(), false);

        assert!(store.get(Locale::FRENCH, "broken").is_none());
        assert!(store.get(Locale::FRENCH, "absent").is_none());
        assert_eq!(store.metrics().unwrap().missing, 2);
    }

    #[test]
    fn test_unsafe_namespace_rejected() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "fr", "navbar", "{}");
        let store = FsContentStore::new(dir.path().join("fr"), false);
        assert!(store.get(Locale::FRENCH, "../fr/navbar").is_none());
        assert!(!is_safe_namespace("a/b"));
        assert!(!is_safe_namespace(""));
        assert!(is_safe_namespace("ai-consulting_v2"));
    }

    // ==================== Caching ====================

    #[test]
    fn test_cache_survives_file_changes_until_clear() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "fr", "navbar", r#"{"v": 1}"#);
        let store = FsContentStore::new(dir.path(), true);

        assert_eq!(store.get(Locale::FRENCH, "navbar").unwrap()["v"], 1);
        write(dir.path(), "fr", "navbar", r#"{"v": 2}"#);
        assert_eq!(store.get(Locale::FRENCH, "navbar").unwrap()["v"], 1);

        store.clear();
        assert_eq!(store.get(Locale::FRENCH, "navbar").unwrap()["v"], 2);
    }

    #[test]
    fn test_absence_is_cached() {
        let dir = TempDir::new().unwrap();
        let store = FsContentStore::new(dir.path(), true);

        assert!(store.get(Locale::GERMAN, "navbar").is_none());
        write(dir.path(), "de", "navbar", "{}");
        assert!(store.get(Locale::GERMAN, "navbar").is_none());

        let report = store.metrics().unwrap();
        assert_eq!(report.cache_misses, 1);
        assert_eq!(report.cache_hits, 1);
    }

    #[test]
    fn test_warm_populates_cache() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "fr", "navbar", "{}");
        write(dir.path(), "en", "navbar", "{}");
        let store = FsContentStore::new(dir.path(), true);

        store.warm(&[Locale::FRENCH, Locale::ENGLISH], &["navbar"]);
        let _ = store.get(Locale::FRENCH, "navbar");
        let _ = store.get(Locale::ENGLISH, "navbar");

        let report = store.metrics().unwrap();
        assert_eq!(report.cache_misses, 2);
        assert_eq!(report.cache_hits, 2);
    }

    #[test]
    fn test_clear_resets_metrics() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "fr", "navbar", "{}");
        let store = FsContentStore::new(dir.path(), true);

        store.get(Locale::FRENCH, "navbar");
        store.get(Locale::FRENCH, "absent");
        store.clear();

        let report = store.metrics().unwrap();
        assert_eq!(report.cache_hits + report.cache_misses, 0);
        assert_eq!(report.missing, 0);
    }

    // ==================== Ressources ====================

    #[test]
    fn test_malformed_article_keeps_siblings() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "fr",
            "ressources",
            r#"{"Articles": [
                {"slug": "bon", "title": "Bon"},
                {"slug": 5},
                {"slug": "sans-refs", "title": null, "references": null}
            ]}"#,
        );
        let store = FsContentStore::new(dir.path(), false);

        let ressources = store.ressources(Locale::FRENCH).unwrap();
        assert!(ressources.find("bon").is_some());
        assert_eq!(ressources.find("sans-refs").unwrap().title, "");
        assert_eq!(ressources.rejected.len(), 1);
        // Logged once per key; a second read stays quiet.
        assert!(!store.warn_once("rejected:fr:ressources".to_string()));
    }

    // ==================== Fallback ====================

    #[test]
    fn test_get_with_fallback_uses_canonical() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "fr", "navbar", r#"{"Home": "Accueil"}"#);
        let store = FsContentStore::new(dir.path(), false);

        let value = store.get_with_fallback(Locale::GERMAN, "navbar").unwrap();
        assert_eq!(value["Home"], "Accueil");
        assert!(store.get_with_fallback(Locale::GERMAN, "footer").is_none());
    }

    #[test]
    fn test_get_with_fallback_prefers_locale() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "fr", "navbar", r#"{"Home": "Accueil"}"#);
        write(dir.path(), "de", "navbar", r#"{"Home": "Startseite"}"#);
        let store = FsContentStore::new(dir.path(), false);

        let value = store.get_with_fallback(Locale::GERMAN, "navbar").unwrap();
        assert_eq!(value["Home"], "Startseite");
    }

    #[test]
    fn test_list_namespaces_sorted() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "fr", "navbar", "{}");
        write(dir.path(), "fr", "metadata", "{}");
        fs::write(dir.path().join("fr").join("notes.txt"), "x").unwrap();
        let store = FsContentStore::new(dir.path(), false);

        assert_eq!(store.list_namespaces(Locale::FRENCH), vec!["metadata", "navbar"]);
        assert!(store.list_namespaces(Locale::SPANISH).is_empty());
    }

    // ==================== Base directory ====================

    #[test]
    fn test_resolve_base_dir_picks_first_existing() {
        let dir = TempDir::new().unwrap();
        let existing = dir.path().join("translations");
        fs::create_dir_all(&existing).unwrap();
        let candidates = vec![dir.path().join("src").join("translations"), existing.clone()];

        assert_eq!(resolve_base_dir(&candidates), existing);
    }

    #[test]
    fn test_resolve_base_dir_defaults_to_first_candidate() {
        let dir = TempDir::new().unwrap();
        let candidates = vec![dir.path().join("a"), dir.path().join("b")];
        assert_eq!(resolve_base_dir(&candidates), dir.path().join("a"));
    }
}
