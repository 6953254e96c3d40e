//! Locale type: a code that has been validated against the registry.

use std::fmt;

use crate::i18n::{LocaleConfig, LocaleRegistry, LocaleStrings};
use anyhow::{bail, Result};
use serde::{Serialize, Serializer};

/// A validated, served locale.
///
/// Only constructible through [`Locale::from_code`], the constants, or the
/// registry iterators, so holding one means the code is known and enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locale {
    code: &'static str,
}

impl Locale {
    pub const FRENCH: Locale = Locale { code: "fr" };
    pub const ENGLISH: Locale = Locale { code: "en" };
    pub const GERMAN: Locale = Locale { code: "de" };
    pub const SPANISH: Locale = Locale { code: "es" };
    pub const PORTUGUESE: Locale = Locale { code: "pt" };

    /// Default visitor language when `Accept-Language` has no supported match.
    pub const DEFAULT_REDIRECT: Locale = Locale::ENGLISH;

    /// Create a Locale from a code string.
    ///
    /// # Errors
    /// Fails when the code is unknown or the locale is disabled.
    pub fn from_code(code: &str) -> Result<Locale> {
        match LocaleRegistry::get().get_by_code(code) {
            Some(config) if config.enabled => Ok(Locale { code: config.code }),
            Some(_) => bail!("Locale '{}' is not enabled", code),
            None => bail!("Unknown locale code: '{}'", code),
        }
    }

    /// Same as [`Locale::from_code`] but discarding the reason.
    pub fn parse(code: &str) -> Option<Locale> {
        Self::from_code(code).ok()
    }

    /// The canonical content locale (source of every translation).
    pub fn canonical() -> Locale {
        Locale {
            code: LocaleRegistry::get().canonical().code,
        }
    }

    /// Every enabled locale, canonical first.
    pub fn all() -> Vec<Locale> {
        LocaleRegistry::get()
            .list_enabled()
            .into_iter()
            .map(|config| Locale { code: config.code })
            .collect()
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Full registry configuration for this locale.
    ///
    /// # Panics
    /// Never in practice: a `Locale` can only hold a registered code.
    pub fn config(&self) -> &'static LocaleConfig {
        LocaleRegistry::get()
            .get_by_code(self.code)
            .expect("Locale code should always be registered")
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    pub fn hreflang(&self) -> &'static str {
        self.config().hreflang
    }

    pub fn og_locale(&self) -> &'static str {
        self.config().og_locale
    }

    pub fn strings(&self) -> &'static LocaleStrings {
        &self.config().strings
    }

    pub fn is_canonical(&self) -> bool {
        self.config().is_canonical
    }
}

impl Serialize for Locale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}
