//! Locale-specific URL slugs.
//!
//! Routes are written against base (English) paths. Some locales rename
//! segments, e.g. `/services/accounting` is `/services/comptabilite` in
//! French. Paths without an entry pass through unchanged.

use std::collections::HashMap;

use crate::error::PathMapError;
use crate::i18n::Locale;

/// French service slugs, `(base, localized)`.
const FRENCH_PATHS: &[(&str, &str)] = &[
    ("/", "/"),
    ("/services", "/services"),
    ("/services/accounting", "/services/comptabilite"),
    ("/services/taxes", "/services/fiscalite"),
    ("/services/payroll", "/services/paie"),
    ("/services/outsourcing", "/services/externalisation"),
    ("/services/mergers-acquisitions", "/services/fusions-acquisitions"),
    ("/services/corporate", "/services/services-corporatifs"),
    ("/services/domiciliation", "/services/domiciliation"),
    ("/services/incorporation", "/services/constitution-entreprise"),
    ("/services/odoo", "/services/odoo"),
    ("/services/family-office", "/services/family-office"),
];

/// Per-locale base <-> localized path tables.
#[derive(Debug, Clone)]
pub struct PathLocalizer {
    tables: HashMap<Locale, Vec<(String, String)>>,
}

impl Default for PathLocalizer {
    fn default() -> Self {
        Self::with_tables([(Locale::FRENCH, FRENCH_PATHS)])
    }
}

impl PathLocalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tables<'a, I>(tables: I) -> Self
    where
        I: IntoIterator<Item = (Locale, &'a [(&'a str, &'a str)])>,
    {
        let tables = tables
            .into_iter()
            .map(|(locale, entries)| {
                let entries = entries
                    .iter()
                    .map(|(base, localized)| (base.to_string(), localized.to_string()))
                    .collect();
                (locale, entries)
            })
            .collect();
        Self { tables }
    }

    /// `/services/accounting` -> `/services/comptabilite` for `fr`.
    pub fn localize(&self, base: &str, locale: Locale) -> String {
        let key = normalize(base);
        self.tables
            .get(&locale)
            .and_then(|entries| entries.iter().find(|(b, _)| b == key))
            .map(|(_, localized)| localized.clone())
            .unwrap_or_else(|| key.to_string())
    }

    /// Inverse of [`PathLocalizer::localize`].
    pub fn delocalize(&self, localized: &str, locale: Locale) -> String {
        let key = normalize(localized);
        self.tables
            .get(&locale)
            .and_then(|entries| entries.iter().find(|(_, l)| l == key))
            .map(|(base, _)| base.clone())
            .unwrap_or_else(|| key.to_string())
    }

    /// Base paths with an explicit entry for `locale`.
    pub fn mapped_paths(&self, locale: Locale) -> Vec<&str> {
        self.tables
            .get(&locale)
            .map(|entries| entries.iter().map(|(base, _)| base.as_str()).collect())
            .unwrap_or_default()
    }

    /// Check every table is a bijection and its own inverse.
    ///
    /// Run at startup; a collision would make reverse lookups ambiguous.
    pub fn validate(&self) -> Result<(), PathMapError> {
        let mut locales: Vec<_> = self.tables.keys().copied().collect();
        locales.sort();

        for locale in locales {
            let entries = &self.tables[&locale];
            let mut seen: HashMap<&str, &str> = HashMap::new();

            for (base, localized) in entries {
                for path in [base, localized] {
                    if !path.starts_with('/') || normalize(path) != path {
                        return Err(PathMapError::Malformed {
                            locale: locale.to_string(),
                            path: path.clone(),
                        });
                    }
                }

                if let Some(first) = seen.insert(localized.as_str(), base.as_str()) {
                    return Err(PathMapError::Collision {
                        locale: locale.to_string(),
                        first: first.to_string(),
                        second: base.clone(),
                        localized: localized.clone(),
                    });
                }
            }

            for (base, localized) in entries {
                let forward = self.localize(base, locale);
                let roundtrip = self.delocalize(&forward, locale);
                if &forward != localized || &roundtrip != base {
                    return Err(PathMapError::NotInverse {
                        locale: locale.to_string(),
                        base: base.clone(),
                        localized: localized.clone(),
                        roundtrip,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Strip one trailing slash, keeping `/` itself.
pub fn normalize(path: &str) -> &str {
    if path.len() > 1 && path.ends_with('/') {
        &path[..path.len() - 1]
    } else {
        path
    }
}

/// Absolute URL of an already-localized path: `https://site/fr/services`.
/// The home page keeps its trailing slash (`https://site/fr/`).
pub fn localized_url(site_url: &str, locale: Locale, localized_path: &str) -> String {
    let path = if localized_path.starts_with('/') {
        localized_path.to_string()
    } else {
        format!("/{localized_path}")
    };
    format!("{}/{}{}", site_url.trim_end_matches('/'), locale.code(), path)
}
