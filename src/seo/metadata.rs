//! Per-page SEO metadata: copy, canonical URL, hreflang alternates and
//! indexability.

use serde::Serialize;

use crate::config::SiteConfig;
use crate::content::{ContentStore, MetadataConfig, PageCopy};
use crate::i18n::Locale;
use crate::paths::{localized_url, normalize, PathLocalizer};
use crate::seo::escape_markup;

/// Caller-supplied values for dynamic pages.
#[derive(Debug, Clone, Default)]
pub struct CustomMetadata {
    /// Interpolated into `{title}` of the template, or used as-is
    pub title: Option<String>,
    /// Interpolated into `{description}` of the template, or used as-is
    pub description: Option<String>,
    /// Template key in the `templates` map (e.g. "/ressources/articles")
    pub template: Option<String>,
    /// Restrict hreflang alternates to these locales
    pub alternate_locales: Option<Vec<Locale>>,
    /// Canonical content served under another locale
    pub is_fallback: bool,
    /// Absolute Open Graph image URL
    pub image: Option<String>,
    /// Open Graph type, "website" when absent
    pub og_type: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alternate {
    pub hreflang: String,
    pub href: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Robots {
    pub index: bool,
    pub follow: bool,
}

impl Robots {
    pub fn content(&self) -> &'static str {
        match (self.index, self.follow) {
            (true, true) => "index, follow",
            (false, true) => "noindex, follow",
            (true, false) => "index, nofollow",
            (false, false) => "noindex, nofollow",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub locale: Locale,
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub canonical: String,
    /// Locale alternates followed by `x-default`
    pub alternates: Vec<Alternate>,
    pub robots: Robots,
    pub og_locale: &'static str,
    pub og_image: String,
    pub og_type: &'static str,
    pub site_name: &'static str,
}

impl PageMetadata {
    /// `<head>` fragment with every value escaped.
    pub fn render_head(&self) -> String {
        let mut head = String::new();
        head.push_str(&format!("<title>{}</title>\n", escape_markup(&self.title)));
        push_meta(&mut head, "name", "description", &self.description);
        if !self.keywords.is_empty() {
            push_meta(&mut head, "name", "keywords", &self.keywords.join(", "));
        }
        push_meta(&mut head, "name", "robots", self.robots.content());
        head.push_str(&format!(
            "<link rel=\"canonical\" href=\"{}\">\n",
            escape_markup(&self.canonical)
        ));
        for alternate in &self.alternates {
            head.push_str(&format!(
                "<link rel=\"alternate\" hreflang=\"{}\" href=\"{}\">\n",
                escape_markup(&alternate.hreflang),
                escape_markup(&alternate.href)
            ));
        }
        push_meta(&mut head, "property", "og:type", self.og_type);
        push_meta(&mut head, "property", "og:title", &self.title);
        push_meta(&mut head, "property", "og:description", &self.description);
        push_meta(&mut head, "property", "og:url", &self.canonical);
        push_meta(&mut head, "property", "og:site_name", self.site_name);
        push_meta(&mut head, "property", "og:locale", self.og_locale);
        push_meta(&mut head, "property", "og:image", &self.og_image);
        push_meta(&mut head, "name", "twitter:card", "summary_large_image");
        head
    }
}

fn push_meta(head: &mut String, attr: &str, key: &str, content: &str) {
    head.push_str(&format!(
        "<meta {attr}=\"{key}\" content=\"{}\">\n",
        escape_markup(content)
    ));
}

/// Builds [`PageMetadata`] from the `metadata` namespace.
pub struct MetadataAssembler<'a> {
    pub store: &'a dyn ContentStore,
    pub paths: &'a PathLocalizer,
    pub site: &'a SiteConfig,
    /// Locales marked noindex site-wide
    pub placeholder_locales: &'a [Locale],
}

impl<'a> MetadataAssembler<'a> {
    /// Metadata for a base `path` in `locale`.
    ///
    /// Page copy comes from the locale's `pages` entry, else the locale's
    /// own `default` block; the canonical locale is consulted only when
    /// the locale has no usable metadata file at all.
    pub fn page_metadata(
        &self,
        locale: Locale,
        path: &str,
        custom: Option<&CustomMetadata>,
    ) -> PageMetadata {
        let path = normalize(path);
        let config = self.store.metadata_config(locale);
        let mut copy = config
            .as_ref()
            .map(|c| c.page(path).clone())
            .unwrap_or_else(|| PageCopy {
                title: self.site.brand.to_string(),
                ..PageCopy::default()
            });

        if let Some(custom) = custom {
            apply_custom_copy(&mut copy, config.as_ref(), path, custom);
        }

        let canonical = localized_url(&self.site.site_url, locale, &self.paths.localize(path, locale));
        let alternates = self.alternates(path, custom.and_then(|c| c.alternate_locales.as_deref()));

        let is_fallback = custom.map(|c| c.is_fallback).unwrap_or(false);
        let robots = Robots {
            index: !is_fallback && !self.placeholder_locales.contains(&locale),
            follow: true,
        };

        PageMetadata {
            locale,
            keywords: copy.keyword_list(),
            title: copy.title,
            description: copy.description,
            canonical,
            alternates,
            robots,
            og_locale: locale.og_locale(),
            og_image: custom
                .and_then(|c| c.image.clone())
                .unwrap_or_else(|| self.site.og_image(locale)),
            og_type: custom.and_then(|c| c.og_type).unwrap_or("website"),
            site_name: self.site.brand,
        }
    }

    /// hreflang links for `locales` (all when `None`) plus `x-default`.
    pub fn alternates(&self, path: &str, locales: Option<&[Locale]>) -> Vec<Alternate> {
        let path = normalize(path);
        let locales = match locales {
            Some(subset) if !subset.is_empty() => subset.to_vec(),
            _ => Locale::all(),
        };

        let mut alternates: Vec<Alternate> = locales
            .iter()
            .map(|locale| Alternate {
                hreflang: locale.hreflang().to_string(),
                href: localized_url(&self.site.site_url, *locale, &self.paths.localize(path, *locale)),
            })
            .collect();

        alternates.push(Alternate {
            hreflang: "x-default".to_string(),
            href: x_default_url(&self.site.site_url, self.paths, path),
        });
        alternates
    }
}

/// `x-default` target: site root for the home page, the canonical locale
/// otherwise.
pub fn x_default_url(site_url: &str, paths: &PathLocalizer, path: &str) -> String {
    let path = normalize(path);
    if path == "/" {
        format!("{}/", site_url.trim_end_matches('/'))
    } else {
        let canonical = Locale::canonical();
        localized_url(site_url, canonical, &paths.localize(path, canonical))
    }
}

fn apply_custom_copy(
    copy: &mut PageCopy,
    config: Option<&MetadataConfig>,
    path: &str,
    custom: &CustomMetadata,
) {
    let template_key = custom.template.as_deref().unwrap_or(path);
    let template = config.and_then(|c| c.templates.get(template_key));
    let title = custom.title.as_deref();
    let description = custom.description.as_deref();

    match template {
        Some(template) => {
            let fill = |text: &str| {
                text.replace("{title}", title.unwrap_or_default())
                    .replace("{description}", description.unwrap_or_default())
            };
            copy.title = fill(&template.title);
            copy.description = fill(&template.description);
            if !template.keywords.is_empty() {
                copy.keywords = template.keywords.clone();
            }
        }
        None => {
            if let Some(title) = title {
                copy.title = title.to_string();
            }
            if let Some(description) = description {
                copy.description = description.to_string();
            }
        }
    }
}
