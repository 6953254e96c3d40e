//! Genuine-translation detection and canonical fallback for articles.
//!
//! A locale's copy of an article counts as a translation only when its
//! title, description or content differs from the canonical copy. The
//! comparison is exact: no whitespace or case normalization.

use std::collections::HashMap;

use serde::Serialize;

use crate::content::model::{Article, Ressources};
use crate::content::ContentStore;
use crate::i18n::Locale;

/// `true` when `candidate` differs from `canonical` in at least one of
/// title, description or content.
pub fn is_genuine_translation(candidate: &Article, canonical: &Article) -> bool {
    candidate.title != canonical.title
        || candidate.description != canonical.description
        || candidate.content != canonical.content
}

/// Translation state of one article in one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationStatus {
    /// The locale is the canonical one
    Canonical,
    Genuine,
    /// Present but identical to canonical
    Duplicate,
    Missing,
}

impl TranslationStatus {
    /// Whether the locale gets its own indexable page for the article.
    pub fn is_indexable(self) -> bool {
        matches!(self, TranslationStatus::Canonical | TranslationStatus::Genuine)
    }
}

/// An article ready to render under `locale`.
#[derive(Debug, Clone)]
pub struct ResolvedArticle {
    pub article: Article,
    /// Locale from the URL
    pub locale: Locale,
    /// Locale the content was taken from
    pub content_locale: Locale,
    /// Canonical content served because no genuine translation exists
    pub is_fallback: bool,
    /// Namespace the content came from, for reference labels
    pub ressources: Ressources,
}

/// Resolve `slug` for `locale`.
///
/// Returns `None` when the canonical locale has no such article, which is
/// a 404 whatever the requested locale holds.
pub fn resolve_article(
    store: &dyn ContentStore,
    locale: Locale,
    slug: &str,
) -> Option<ResolvedArticle> {
    let canonical_locale = Locale::canonical();
    let canonical = store.ressources(canonical_locale)?;
    let canonical_article = canonical.find(slug)?.clone();

    if locale != canonical_locale {
        if let Some(local) = store.ressources(locale) {
            let genuine = local
                .find(slug)
                .filter(|article| is_genuine_translation(article, &canonical_article))
                .cloned();
            if let Some(article) = genuine {
                return Some(ResolvedArticle {
                    article,
                    locale,
                    content_locale: locale,
                    is_fallback: false,
                    ressources: local,
                });
            }
        }
        store.on_fallback();
    }

    Some(ResolvedArticle {
        article: canonical_article,
        locale,
        content_locale: canonical_locale,
        is_fallback: locale != canonical_locale,
        ressources: canonical,
    })
}

/// Locales with an indexable copy of `slug`, canonical first. Empty when
/// the canonical article does not exist.
pub fn genuine_locales(store: &dyn ContentStore, slug: &str) -> Vec<Locale> {
    ArticleCatalog::load(store)
        .map(|catalog| catalog.genuine_locales(slug))
        .unwrap_or_default()
}

/// Every locale's `ressources` namespace, loaded once for batch work
/// (sitemap, reports).
#[derive(Debug, Clone)]
pub struct ArticleCatalog {
    canonical: Ressources,
    locales: HashMap<Locale, Ressources>,
}

impl ArticleCatalog {
    /// `None` when the canonical `ressources` namespace is unavailable.
    pub fn load(store: &dyn ContentStore) -> Option<Self> {
        let canonical_locale = Locale::canonical();
        let canonical = store.ressources(canonical_locale)?;
        let locales = Locale::all()
            .into_iter()
            .filter(|locale| *locale != canonical_locale)
            .filter_map(|locale| store.ressources(locale).map(|r| (locale, r)))
            .collect();
        Some(Self { canonical, locales })
    }

    /// Canonical articles in file order.
    pub fn articles(&self) -> &[Article] {
        &self.canonical.articles
    }

    pub fn canonical(&self) -> &Ressources {
        &self.canonical
    }

    pub fn locale(&self, locale: Locale) -> Option<&Ressources> {
        if locale.is_canonical() {
            Some(&self.canonical)
        } else {
            self.locales.get(&locale)
        }
    }

    pub fn status(&self, locale: Locale, slug: &str) -> TranslationStatus {
        let Some(canonical) = self.canonical.find(slug) else {
            return TranslationStatus::Missing;
        };
        if locale.is_canonical() {
            return TranslationStatus::Canonical;
        }
        match self.locales.get(&locale).and_then(|r| r.find(slug)) {
            Some(article) if is_genuine_translation(article, canonical) => {
                TranslationStatus::Genuine
            }
            Some(_) => TranslationStatus::Duplicate,
            None => TranslationStatus::Missing,
        }
    }

    pub fn genuine_locales(&self, slug: &str) -> Vec<Locale> {
        if self.canonical.find(slug).is_none() {
            return Vec::new();
        }
        Locale::all()
            .into_iter()
            .filter(|locale| self.status(*locale, slug).is_indexable())
            .collect()
    }
}
