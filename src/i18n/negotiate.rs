//! Visitor locale detection from the `Accept-Language` header.

use crate::i18n::Locale;

/// Pick the first supported locale from an `Accept-Language` header value.
///
/// Entries are taken in header order (quality weights are ignored) and only
/// the primary subtag is compared, so `de-CH;q=0.9` matches `de`. Falls back
/// to [`Locale::DEFAULT_REDIRECT`] when nothing matches.
pub fn detect_locale(accept_language: Option<&str>) -> Locale {
    accept_language
        .into_iter()
        .flat_map(|header| header.split(','))
        .map(|entry| entry.split(';').next().unwrap_or("").trim())
        .map(|tag| tag.split('-').next().unwrap_or("").to_ascii_lowercase())
        .find_map(|primary| Locale::parse(&primary))
        .unwrap_or(Locale::DEFAULT_REDIRECT)
}
