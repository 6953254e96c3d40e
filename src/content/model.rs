//! Typed views over the loosely-typed namespace JSON.
//!
//! Unknown keys are kept in `extra`/`labels` maps so maintenance tooling can
//! rewrite a file without dropping fields it does not know about.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A link cited at the end of an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    /// Key of the display label inside the same namespace
    pub label_key: String,
    pub url: String,
}

/// An article from the `ressources` namespace. The slug is the identity
/// shared by every locale copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Markdown body
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Entries without a `labelKey` or `url` are dropped
    #[serde(
        default,
        deserialize_with = "usable_references",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub references: Vec<Reference>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Article {
    /// Date used for sitemap `<lastmod>`: `updated`, else `date`, cut to
    /// `YYYY-MM-DD`.
    pub fn last_modified(&self) -> Option<&str> {
        self.updated
            .as_deref()
            .or(self.date.as_deref())
            .filter(|d| d.len() >= 10 && d.is_char_boundary(10))
            .map(|d| &d[..10])
    }
}

/// `null` reads as the type's default (`"title": null` is an empty title).
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn usable_references<'de, D>(deserializer: D) -> Result<Vec<Reference>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = raw else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// The `ressources` namespace: article list plus free-form labels.
///
/// Articles are read one by one; an entry that is not a usable article is
/// left out and described in `rejected` instead of failing the namespace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRessources")]
pub struct Ressources {
    #[serde(rename = "Articles")]
    pub articles: Vec<Article>,
    #[serde(flatten)]
    pub labels: Map<String, Value>,
    #[serde(skip)]
    pub rejected: Vec<String>,
}

#[derive(Deserialize)]
struct RawRessources {
    #[serde(rename = "Articles", default)]
    articles: Value,
    #[serde(flatten)]
    labels: Map<String, Value>,
}

impl From<RawRessources> for Ressources {
    fn from(raw: RawRessources) -> Self {
        let mut articles = Vec::new();
        let mut rejected = Vec::new();

        match raw.articles {
            Value::Null => {}
            Value::Array(items) => {
                for (position, item) in items.into_iter().enumerate() {
                    match serde_json::from_value::<Article>(item) {
                        Ok(article) => articles.push(article),
                        Err(e) => rejected.push(format!("Article at index {position}: {e}")),
                    }
                }
            }
            _ => rejected.push("\"Articles\" is not an array".to_string()),
        }

        Self {
            articles,
            labels: raw.labels,
            rejected,
        }
    }
}

impl Ressources {
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    pub fn find(&self, slug: &str) -> Option<&Article> {
        self.articles.iter().find(|article| article.slug == slug)
    }

    /// String label at the top level of the namespace.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).and_then(Value::as_str)
    }

    /// Display label of a reference; the key itself when no label exists.
    pub fn reference_label<'a>(&'a self, reference: &'a Reference) -> &'a str {
        self.label(&reference.label_key)
            .unwrap_or(&reference.label_key)
    }

    /// Index articles by slug, collecting slug problems instead of failing.
    pub fn index(&self, locale: &str) -> ArticleIndex<'_> {
        let mut map = HashMap::new();
        let mut order = Vec::new();
        let mut problems = Vec::new();

        for (position, article) in self.articles.iter().enumerate() {
            let slug = article.slug.trim();
            if slug.is_empty() {
                problems.push(format!(
                    "Article at index {position} in locale \"{locale}\" uses an invalid slug"
                ));
                continue;
            }
            if slug != article.slug {
                problems.push(format!(
                    "Article slug \"{}\" in locale \"{locale}\" contains leading or trailing whitespace",
                    article.slug
                ));
                continue;
            }
            if map.contains_key(slug) {
                problems.push(format!(
                    "Duplicate article slug \"{slug}\" detected in locale \"{locale}\""
                ));
                continue;
            }
            map.insert(slug, article);
            order.push(slug);
        }

        ArticleIndex {
            map,
            order,
            problems,
        }
    }
}

/// Articles of one locale keyed by slug.
#[derive(Debug)]
pub struct ArticleIndex<'a> {
    pub map: HashMap<&'a str, &'a Article>,
    /// Slugs in file order
    pub order: Vec<&'a str>,
    pub problems: Vec<String>,
}

/// Title, description and keywords for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCopy {
    pub title: String,
    pub description: String,
    /// Comma-separated
    #[serde(default)]
    pub keywords: String,
}

impl PageCopy {
    pub fn keyword_list(&self) -> Vec<String> {
        self.keywords
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// The `metadata` namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataConfig {
    pub default: PageCopy,
    #[serde(default)]
    pub pages: BTreeMap<String, PageCopy>,
    /// Copy with `{title}` / `{description}` placeholders for dynamic pages,
    /// keyed by route (e.g. "/ressources/articles")
    #[serde(default)]
    pub templates: BTreeMap<String, PageCopy>,
}

impl MetadataConfig {
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// Page-specific copy, or the default block.
    pub fn page(&self, path: &str) -> &PageCopy {
        self.pages.get(path).unwrap_or(&self.default)
    }
}

/// A dotted key that does not resolve in a namespace.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("missing key \"{key}\" in namespace \"{namespace}\"")]
pub struct MissingKey {
    pub namespace: String,
    pub key: String,
}

/// Resolve a dotted key (`"Hero.Title"`) inside a namespace value.
///
/// A literal key containing dots is tried first, so flat files such as
/// `{"Contact.Title": "..."}` resolve too.
pub fn lookup<'a>(namespace: &str, value: &'a Value, key: &str) -> Result<&'a Value, MissingKey> {
    if let Some(found) = value.get(key) {
        return Ok(found);
    }
    key.split('.')
        .try_fold(value, |node, part| node.get(part))
        .ok_or_else(|| MissingKey {
            namespace: namespace.to_string(),
            key: key.to_string(),
        })
}

/// Resolve a dotted key to a string.
pub fn lookup_str<'a>(namespace: &str, value: &'a Value, key: &str) -> Result<&'a str, MissingKey> {
    lookup(namespace, value, key)?
        .as_str()
        .ok_or_else(|| MissingKey {
            namespace: namespace.to_string(),
            key: key.to_string(),
        })
}
