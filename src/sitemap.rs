//! XML sitemap with hreflang alternates.
//!
//! Articles are listed only under locales holding a genuine translation, so
//! duplicated canonical copy never reaches search engines.

use chrono::{NaiveDate, Utc};

use crate::content::{ArticleCatalog, ContentStore};
use crate::i18n::Locale;
use crate::paths::{localized_url, PathLocalizer};
use crate::seo::{escape_markup, x_default_url, Alternate};

/// Pages rendered for every locale.
pub const STATIC_PATHS: &[&str] = &[
    "/",
    "/contact",
    "/products",
    "/products/outlook-addin",
    "/products/swiss-gpt",
    "/ressources",
    "/ressources/articles",
    "/legal/privacy",
    "/legal/terms",
    "/legal/cookies",
];

pub const SERVICE_PATHS: &[&str] = &[
    "/services",
    "/services/ai-consulting",
    "/services/microsoft-consulting",
];

/// Base path of article pages.
pub const ARTICLES_PREFIX: &str = "/ressources/articles";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFreq {
    Weekly,
    Monthly,
    Yearly,
}

impl ChangeFreq {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeFreq::Weekly => "weekly",
            ChangeFreq::Monthly => "monthly",
            ChangeFreq::Yearly => "yearly",
        }
    }
}

/// Change frequency and priority for a base path.
pub fn change_policy(path: &str) -> (ChangeFreq, &'static str) {
    if path == "/" {
        (ChangeFreq::Weekly, "1.0")
    } else if path.starts_with(&format!("{ARTICLES_PREFIX}/")) {
        (ChangeFreq::Weekly, "0.8")
    } else if path.starts_with("/legal") {
        (ChangeFreq::Yearly, "0.3")
    } else {
        (ChangeFreq::Monthly, "0.7")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: String,
    pub changefreq: ChangeFreq,
    pub priority: &'static str,
    pub alternates: Vec<Alternate>,
}

pub struct SitemapGenerator<'a> {
    site_url: &'a str,
    store: &'a dyn ContentStore,
    paths: &'a PathLocalizer,
    build_date: NaiveDate,
}

impl<'a> SitemapGenerator<'a> {
    pub fn new(site_url: &'a str, store: &'a dyn ContentStore, paths: &'a PathLocalizer) -> Self {
        Self {
            site_url,
            store,
            paths,
            build_date: Utc::now().date_naive(),
        }
    }

    /// Date used as `<lastmod>` when nothing better is known.
    pub fn with_build_date(mut self, date: NaiveDate) -> Self {
        self.build_date = date;
        self
    }

    pub fn entries(&self) -> Vec<SitemapEntry> {
        let build_date = self.build_date.format("%Y-%m-%d").to_string();
        let all_locales = Locale::all();
        let mut entries = Vec::new();

        for path in STATIC_PATHS.iter().chain(SERVICE_PATHS) {
            self.push_localized(&mut entries, path, &all_locales, &build_date);
        }

        match ArticleCatalog::load(self.store) {
            Some(catalog) => {
                for article in catalog.articles() {
                    if article.slug.trim().is_empty() {
                        continue;
                    }
                    let locales = catalog.genuine_locales(&article.slug);
                    let lastmod = article
                        .last_modified()
                        .map(str::to_string)
                        .unwrap_or_else(|| build_date.clone());
                    let path = format!("{ARTICLES_PREFIX}/{}", article.slug);
                    self.push_localized(&mut entries, &path, &locales, &lastmod);
                }
            }
            None => tracing::warn!("No canonical ressources found, sitemap lists static pages only"),
        }

        entries
    }

    fn push_localized(
        &self,
        entries: &mut Vec<SitemapEntry>,
        path: &str,
        locales: &[Locale],
        lastmod: &str,
    ) {
        let (changefreq, priority) = change_policy(path);
        let url_for = |locale: Locale| {
            localized_url(self.site_url, locale, &self.paths.localize(path, locale))
        };

        let mut alternates: Vec<Alternate> = locales
            .iter()
            .map(|locale| Alternate {
                hreflang: locale.hreflang().to_string(),
                href: url_for(*locale),
            })
            .collect();
        alternates.push(Alternate {
            hreflang: "x-default".to_string(),
            href: x_default_url(self.site_url, self.paths, path),
        });

        for locale in locales {
            entries.push(SitemapEntry {
                loc: url_for(*locale),
                lastmod: lastmod.to_string(),
                changefreq,
                priority,
                alternates: alternates.clone(),
            });
        }
    }

    pub fn render(&self) -> String {
        render_entries(&self.entries())
    }
}

pub fn render_entries(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\" \
         xmlns:xhtml=\"http://www.w3.org/1999/xhtml\">\n",
    );
    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_markup(&entry.loc)));
        xml.push_str(&format!("    <lastmod>{}</lastmod>\n", escape_markup(&entry.lastmod)));
        xml.push_str(&format!("    <changefreq>{}</changefreq>\n", entry.changefreq.as_str()));
        xml.push_str(&format!("    <priority>{}</priority>\n", entry.priority));
        for alternate in &entry.alternates {
            xml.push_str(&format!(
                "    <xhtml:link rel=\"alternate\" hreflang=\"{}\" href=\"{}\"/>\n",
                escape_markup(&alternate.hreflang),
                escape_markup(&alternate.href)
            ));
        }
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}
