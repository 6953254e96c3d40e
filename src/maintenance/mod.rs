//! Offline content maintenance: reference link checks, locale sync,
//! machine translation, translation reports and metadata lint.
//!
//! Unlike the request-time store these tools fail loudly: a missing or
//! malformed file is a [`ContentError`] carrying the path.

pub mod links;
pub mod lint;
pub mod report;
pub mod sync;
pub mod translate;

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::content::Ressources;
use crate::error::ContentError;
use crate::i18n::Locale;

/// A translations directory laid out as `<base>/<locale>/<namespace>.json`.
#[derive(Debug, Clone)]
pub struct ContentDir {
    base: PathBuf,
}

impl ContentDir {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn namespace_path(&self, locale: &str, namespace: &str) -> PathBuf {
        self.base.join(locale).join(format!("{namespace}.json"))
    }

    pub fn ressources_path(&self, locale: &str) -> PathBuf {
        self.namespace_path(locale, crate::content::NS_RESSOURCES)
    }

    /// Locale directories, sorted. With `require_ressources`, only those
    /// holding a `ressources.json`.
    pub fn list_locales(&self, require_ressources: bool) -> Result<Vec<String>, ContentError> {
        let entries = std::fs::read_dir(&self.base).map_err(|source| ContentError::Read {
            path: self.base.clone(),
            source,
        })?;

        let mut locales: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter(|name| !require_ressources || self.ressources_path(name).is_file())
            .collect();
        locales.sort();
        Ok(locales)
    }

    /// `--all-locales` picks every locale with a `ressources.json`,
    /// otherwise the single named one.
    pub fn select_locales(&self, one: &str, all: bool) -> Result<Vec<String>, ContentError> {
        if all {
            self.list_locales(true)
        } else {
            Ok(vec![one.to_string()])
        }
    }

    /// Typed `ressources` file. Unusable articles fail the read so a rewrite
    /// never drops them.
    pub fn read_ressources(&self, locale: &str) -> Result<Ressources, ContentError> {
        let path = self.ressources_path(locale);
        let ressources: Ressources = read_json(&path)?;
        if !ressources.rejected.is_empty() {
            return Err(ContentError::Shape {
                path,
                message: ressources.rejected.join("; "),
            });
        }
        Ok(ressources)
    }

    pub fn write_ressources(&self, locale: &str, ressources: &Ressources) -> Result<(), ContentError> {
        write_json(&self.ressources_path(locale), ressources)
    }
}

/// Read and parse a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ContentError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ContentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ContentError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Write pretty-printed JSON with a trailing newline, creating the parent
/// directory if needed.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ContentError> {
    let write_error = |source| ContentError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut body = serde_json::to_string_pretty(value).map_err(|e| ContentError::Shape {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    body.push('\n');

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    std::fs::write(path, body).map_err(write_error)
}

/// `Articles` array of a raw namespace value, or a shape error.
pub fn articles_of<'a>(value: &'a Value, path: &Path) -> Result<&'a [Value], ContentError> {
    match value.get("Articles") {
        None => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(ContentError::Shape {
            path: path.to_path_buf(),
            message: "\"Articles\" is not an array".to_string(),
        }),
    }
}

/// Parse a `--locales=en,de` list into registered, non-canonical locales.
pub fn target_locales(list: &str) -> anyhow::Result<Vec<Locale>> {
    let locales = crate::config::parse_locale_list(list)?;
    Ok(locales.into_iter().filter(|l| !l.is_canonical()).collect())
}

/// Default `--locales` value: every served locale except the canonical one.
pub fn default_target_list() -> String {
    Locale::all()
        .into_iter()
        .filter(|l| !l.is_canonical())
        .map(|l| l.code())
        .collect::<Vec<_>>()
        .join(",")
}
