//! Dotted-key text lookup for page rendering.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::content::model::{lookup_str, MissingKey};
use crate::content::ContentStore;
use crate::i18n::Locale;

/// Text accessor over one namespace (with canonical fallback).
///
/// Outside production a missing key is an error so authors notice it; in
/// production the key itself is rendered.
pub struct Translator {
    namespace: String,
    record: Option<Arc<Value>>,
    strict: bool,
}

impl Translator {
    pub fn new(store: &dyn ContentStore, locale: Locale, namespace: &str, production: bool) -> Self {
        Self {
            namespace: namespace.to_string(),
            record: store.get_with_fallback(locale, namespace),
            strict: !production,
        }
    }

    pub fn text(&self, key: &str) -> Result<String, MissingKey> {
        let found = self
            .record
            .as_deref()
            .ok_or_else(|| MissingKey {
                namespace: self.namespace.clone(),
                key: key.to_string(),
            })
            .and_then(|record| lookup_str(&self.namespace, record, key));

        match found {
            Ok(text) => Ok(text.to_string()),
            Err(e) if self.strict => {
                warn!("{}", e);
                Err(e)
            }
            Err(_) => Ok(key.to_string()),
        }
    }

    /// Text for `key`, or `default` when absent regardless of mode.
    pub fn text_or(&self, key: &str, default: &str) -> String {
        self.record
            .as_deref()
            .and_then(|record| lookup_str(&self.namespace, record, key).ok())
            .unwrap_or(default)
            .to_string()
    }
}
