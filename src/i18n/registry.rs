//! Locale registry: Single source of truth for all supported locales.
//!
//! The set of locales is a build-time constant. It drives locale validation
//! for incoming URLs, static path enumeration, hreflang annotations and the
//! choice of canonical content language.

use std::sync::OnceLock;

use crate::i18n::strings::{
    LocaleStrings, ENGLISH_STRINGS, FRENCH_STRINGS, GERMAN_STRINGS, PORTUGUESE_STRINGS,
    SPANISH_STRINGS,
};

/// Configuration for a supported locale.
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    /// ISO 639-1 code used as the URL segment (e.g., "fr", "de")
    pub code: &'static str,

    /// English name of the language (e.g., "French")
    pub name: &'static str,

    /// Native name of the language (e.g., "Français")
    pub native_name: &'static str,

    /// Value used in `hreflang` annotations (e.g., "fr-CH")
    pub hreflang: &'static str,

    /// Open Graph locale (e.g., "fr_CH")
    pub og_locale: &'static str,

    /// Whether this is the canonical content language (exactly one is)
    pub is_canonical: bool,

    /// Whether this locale is served
    pub enabled: bool,

    /// User-facing strings rendered by the server
    pub strings: LocaleStrings,
}

/// Global locale registry singleton.
pub struct LocaleRegistry {
    locales: Vec<LocaleConfig>,
}

static REGISTRY: OnceLock<LocaleRegistry> = OnceLock::new();

impl LocaleRegistry {
    /// Get the global locale registry instance.
    pub fn get() -> &'static LocaleRegistry {
        REGISTRY.get_or_init(|| LocaleRegistry {
            locales: default_locales(),
        })
    }

    /// Get a locale configuration by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&LocaleConfig> {
        self.locales.iter().find(|locale| locale.code == code)
    }

    /// All enabled locales, in registry order.
    pub fn list_enabled(&self) -> Vec<&LocaleConfig> {
        self.locales.iter().filter(|locale| locale.enabled).collect()
    }

    /// Get the canonical locale configuration.
    ///
    /// # Panics
    /// Panics if the static table does not define exactly one canonical
    /// locale. The table is a constant, so this is caught by the unit tests.
    pub fn canonical(&self) -> &LocaleConfig {
        let canonical: Vec<_> = self
            .locales
            .iter()
            .filter(|locale| locale.is_canonical)
            .collect();

        match canonical.len() {
            0 => panic!("No canonical locale found in registry"),
            1 => canonical[0],
            _ => panic!("Multiple canonical locales found in registry"),
        }
    }

    /// Check if a locale code is supported and enabled.
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|locale| locale.enabled)
            .unwrap_or(false)
    }
}

/// Test membership of `code` in the fixed set of served locales.
pub fn is_valid_locale(code: &str) -> bool {
    LocaleRegistry::get().is_enabled(code)
}

/// Supported locales. French is canonical: articles are authored in French
/// first and every other locale is a translation of it.
fn default_locales() -> Vec<LocaleConfig> {
    vec![
        LocaleConfig {
            code: "fr",
            name: "French",
            native_name: "Français",
            hreflang: "fr-CH",
            og_locale: "fr_CH",
            is_canonical: true,
            enabled: true,
            strings: FRENCH_STRINGS,
        },
        LocaleConfig {
            code: "en",
            name: "English",
            native_name: "English",
            hreflang: "en",
            og_locale: "en_US",
            is_canonical: false,
            enabled: true,
            strings: ENGLISH_STRINGS,
        },
        LocaleConfig {
            code: "de",
            name: "German",
            native_name: "Deutsch",
            hreflang: "de-CH",
            og_locale: "de_CH",
            is_canonical: false,
            enabled: true,
            strings: GERMAN_STRINGS,
        },
        LocaleConfig {
            code: "es",
            name: "Spanish",
            native_name: "Español",
            hreflang: "es-ES",
            og_locale: "es_ES",
            is_canonical: false,
            enabled: true,
            strings: SPANISH_STRINGS,
        },
        LocaleConfig {
            code: "pt",
            name: "Portuguese",
            native_name: "Português",
            hreflang: "pt-PT",
            og_locale: "pt_PT",
            is_canonical: false,
            enabled: true,
            strings: PORTUGUESE_STRINGS,
        },
    ]
}
