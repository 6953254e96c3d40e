//! Per-locale JSON content: the store, typed views, and canonical fallback.
//!
//! Content is laid out as `<base>/<locale>/<namespace>.json`. Request-time
//! reads never fail: a missing or malformed file is "no data" and the
//! caller falls back to the canonical locale.

pub mod fallback;
pub mod metrics;
pub mod model;
pub mod store;
mod suggest;
mod translator;

use std::sync::Arc;

use serde_json::Value;

use crate::i18n::Locale;

pub use fallback::{
    genuine_locales, is_genuine_translation, resolve_article, ArticleCatalog, ResolvedArticle,
    TranslationStatus,
};
pub use metrics::{ContentMetrics, MetricsReport};
pub use model::{
    lookup, lookup_str, Article, MetadataConfig, MissingKey, PageCopy, Reference, Ressources,
};
pub use store::FsContentStore;
pub use translator::Translator;

/// Namespace holding the article list and resource page labels.
pub const NS_RESSOURCES: &str = "ressources";
/// Namespace holding per-page SEO copy.
pub const NS_METADATA: &str = "metadata";
/// Namespace holding navigation labels.
pub const NS_NAVBAR: &str = "navbar";

/// Read access to namespace records.
///
/// Implementations cache records for as long as they like; `clear` drops
/// whatever they hold so the next read goes back to the source.
pub trait ContentStore: Send + Sync {
    /// Record for `(locale, namespace)`, or `None` when absent or unparsable.
    fn get(&self, locale: Locale, namespace: &str) -> Option<Arc<Value>>;

    /// Drop every cached record.
    fn clear(&self);

    /// Namespace names available for a locale.
    fn list_namespaces(&self, _locale: Locale) -> Vec<String> {
        Vec::new()
    }

    /// Called when a namespace is missing in both the requested and the
    /// canonical locale.
    fn on_missing(&self, _locale: Locale, _namespace: &str) {}

    /// Called when canonical content is served under another locale.
    fn on_fallback(&self) {}

    fn metrics(&self) -> Option<MetricsReport> {
        None
    }

    /// Load every `(locale, namespace)` pair ahead of traffic.
    fn warm(&self, locales: &[Locale], namespaces: &[&str]) {
        for locale in locales {
            for namespace in namespaces {
                let _ = self.get(*locale, namespace);
            }
        }
    }

    /// The locale's record, else the canonical locale's record.
    fn get_with_fallback(&self, locale: Locale, namespace: &str) -> Option<Arc<Value>> {
        if let Some(record) = self.get(locale, namespace) {
            return Some(record);
        }

        let canonical = Locale::canonical();
        let fallback = if locale == canonical {
            None
        } else {
            self.get(canonical, namespace)
        };

        if fallback.is_none() {
            self.on_missing(locale, namespace);
        }
        fallback
    }

    /// Called when entries of a namespace were left out as unusable.
    fn on_rejected(&self, _locale: Locale, _namespace: &str, _problems: &[String]) {}

    /// Typed `ressources` namespace of exactly this locale.
    fn ressources(&self, locale: Locale) -> Option<Ressources> {
        let ressources = self
            .get(locale, NS_RESSOURCES)
            .and_then(|value| Ressources::from_value(&value))?;
        if !ressources.rejected.is_empty() {
            self.on_rejected(locale, NS_RESSOURCES, &ressources.rejected);
        }
        Some(ressources)
    }

    /// Typed `metadata` namespace, falling back to canonical when the
    /// locale file is missing or has no usable `default` block.
    fn metadata_config(&self, locale: Locale) -> Option<MetadataConfig> {
        self.get(locale, NS_METADATA)
            .and_then(|value| MetadataConfig::from_value(&value))
            .or_else(|| {
                self.get_with_fallback(Locale::canonical(), NS_METADATA)
                    .and_then(|value| MetadataConfig::from_value(&value))
            })
    }
}
