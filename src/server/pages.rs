//! Page handlers for `/<locale>/...`.

use axum::extract::{Path, State};
use axum::http::{header::ACCEPT_LANGUAGE, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Extension;
use serde_json::Value;

use super::render::{document, format_date, link, markdown_to_html};
use super::{AppState, RequestLocale};
use crate::content::{
    genuine_locales, resolve_article, Article, ArticleCatalog, ResolvedArticle, Ressources, Translator,
    NS_NAVBAR,
};
use crate::i18n::{detect_locale, Locale};
use crate::paths::{localized_url, normalize};
use crate::seo::structured_data::{
    self, ArticleSchema, BreadcrumbItem, FaqEntry, ProductSchema, ServiceSchema,
};
use crate::seo::{escape_markup, estimate_reading_time, CustomMetadata, Robots};
use crate::sitemap::{ARTICLES_PREFIX, SERVICE_PATHS, STATIC_PATHS};

const RESSOURCES_PATH: &str = "/ressources";
const RELATED_ARTICLES: usize = 3;

pub async fn home(
    State(state): State<AppState>,
    Extension(RequestLocale(locale)): Extension<RequestLocale>,
) -> Response {
    render_static(&state, locale, "/")
}

pub async fn page(
    State(state): State<AppState>,
    Extension(RequestLocale(locale)): Extension<RequestLocale>,
    Path(path): Path<String>,
) -> Response {
    let localized = format!("/{}", path.trim_start_matches('/'));
    let base = state.paths.delocalize(normalize(&localized), locale);

    if let Some(slug) = base.strip_prefix(&format!("{ARTICLES_PREFIX}/")) {
        if slug.is_empty() || slug.contains('/') {
            return not_found(locale);
        }
        return match resolve_article(state.store.as_ref(), locale, slug) {
            Some(resolved) => render_article(&state, &resolved),
            None => not_found(locale),
        };
    }

    match base.as_str() {
        RESSOURCES_PATH | ARTICLES_PREFIX => render_listing(&state, locale, &base),
        known if is_known_page(known) => render_static(&state, locale, known),
        _ => not_found(locale),
    }
}

/// Requests no route or static file matched.
pub async fn fallback_not_found(headers: HeaderMap) -> Response {
    let accept_language = headers.get(ACCEPT_LANGUAGE).and_then(|v| v.to_str().ok());
    not_found(detect_locale(accept_language))
}

pub fn is_known_page(path: &str) -> bool {
    STATIC_PATHS.contains(&path) || SERVICE_PATHS.contains(&path)
}

fn html_page(status: StatusCode, html: String) -> Response {
    (status, Html(html)).into_response()
}

fn navbar(state: &AppState, locale: Locale) -> Translator {
    Translator::new(state.store.as_ref(), locale, NS_NAVBAR, state.is_production())
}

fn page_url(state: &AppState, locale: Locale, base: &str) -> String {
    localized_url(&state.site.site_url, locale, &state.paths.localize(base, locale))
}

fn render_static(state: &AppState, locale: Locale, path: &str) -> Response {
    let meta = state.metadata().page_metadata(locale, path, None);

    let mut body = format!(
        "<h1>{}</h1>\n<p>{}</p>\n",
        escape_markup(&meta.title),
        escape_markup(&meta.description)
    );
    if path == "/contact" {
        body.push_str(&contact_form(locale));
    }

    let url = page_url(state, locale, path);
    let json_ld = if path == "/" {
        vec![structured_data::organization(&state.site)]
    } else if path.starts_with("/services") {
        vec![structured_data::service(
            &ServiceSchema {
                name: meta.title.clone(),
                description: meta.description.clone(),
                url,
                area_served: Some(vec!["CH".to_string()]),
                provider: Some(state.site.brand.to_string()),
                ..ServiceSchema::default()
            },
            &state.site,
        )]
    } else if path.starts_with("/products/") {
        vec![structured_data::product(
            &ProductSchema {
                name: meta.title.clone(),
                description: meta.description.clone(),
                url,
                ..ProductSchema::default()
            },
            &state.site,
        )]
    } else {
        Vec::new()
    };
    html_page(
        StatusCode::OK,
        document(locale, &meta.render_head(), &json_ld, &body),
    )
}

fn contact_form(locale: Locale) -> String {
    format!(
        "<form id=\"contact-form\" method=\"post\" action=\"/api/contact\" data-locale=\"{}\">\n\
         <input name=\"name\" required>\n<input name=\"company\">\n<input name=\"phone\">\n\
         <input name=\"email\" type=\"email\" required>\n\
         <textarea name=\"message\" maxlength=\"500\" required></textarea>\n\
         <input name=\"consent\" type=\"checkbox\" required>\n\
         <button type=\"submit\">OK</button>\n</form>\n",
        locale.code()
    )
}

/// Article list: genuine translations where they exist, canonical copy
/// otherwise.
fn render_listing(state: &AppState, locale: Locale, path: &str) -> Response {
    let meta = state.metadata().page_metadata(locale, path, None);
    let strings = locale.strings();
    let labels = state.store.ressources(locale).unwrap_or_default();

    let heading = if path == RESSOURCES_PATH {
        labels.label("IntroTitle").unwrap_or(strings.resources)
    } else {
        labels.label("ArticlesTitle").unwrap_or(strings.articles)
    };

    let mut body = format!("<h1>{}</h1>\n<ul class=\"articles\">\n", escape_markup(heading));
    if let Some(catalog) = ArticleCatalog::load(state.store.as_ref()) {
        for canonical in catalog.articles() {
            let article = match catalog.status(locale, &canonical.slug) {
                status if status.is_indexable() => catalog
                    .locale(locale)
                    .and_then(|r| r.find(&canonical.slug))
                    .unwrap_or(canonical),
                _ => canonical,
            };
            let href = format!("/{}{}/{}", locale.code(), ARTICLES_PREFIX, article.slug);
            body.push_str(&format!(
                "<li>{}<p>{}</p></li>\n",
                link(&href, &article.title),
                escape_markup(&article.description)
            ));
        }
    }
    body.push_str("</ul>\n");

    let mut json_ld = Vec::new();
    if path == RESSOURCES_PATH {
        let (title, entries) = faq_entries(&labels);
        if !entries.is_empty() {
            body.push_str(&faq_section(title.unwrap_or(strings.faq), &entries));
            json_ld.push(structured_data::faq_page(&entries, None));
        }
    }

    html_page(
        StatusCode::OK,
        document(locale, &meta.render_head(), &json_ld, &body),
    )
}

/// `FAQ: { Title, Items: [{q, a}] }` from the ressources namespace.
fn faq_entries(ressources: &Ressources) -> (Option<&str>, Vec<FaqEntry>) {
    let Some(faq) = ressources.labels.get("FAQ") else {
        return (None, Vec::new());
    };
    let title = faq.get("Title").and_then(Value::as_str);
    let entries = faq
        .get("Items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    Some(FaqEntry {
                        question: item.get("q")?.as_str()?.to_string(),
                        answer: item.get("a")?.as_str()?.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    (title, entries)
}

fn faq_section(heading: &str, entries: &[FaqEntry]) -> String {
    let mut section = format!(
        "<section class=\"faq\">\n<h2>{}</h2>\n<dl>\n",
        escape_markup(heading)
    );
    for entry in entries {
        section.push_str(&format!(
            "<dt>{}</dt>\n<dd>{}</dd>\n",
            escape_markup(&entry.question),
            escape_markup(&entry.answer)
        ));
    }
    section.push_str("</dl>\n</section>\n");
    section
}

fn render_article(state: &AppState, resolved: &ResolvedArticle) -> Response {
    let locale = resolved.locale;
    let article = &resolved.article;
    let strings = locale.strings();
    let base_path = format!("{ARTICLES_PREFIX}/{}", article.slug);
    let url = page_url(state, locale, &base_path);
    let site_url = &state.site.site_url;

    // Chrome labels follow the URL locale even when the content falls back.
    let labels = state.store.ressources(locale).unwrap_or_default();
    let label = |key: &str, default: &'static str| -> String {
        labels.label(key).unwrap_or(default).to_string()
    };

    let genuine = genuine_locales(state.store.as_ref(), &article.slug);
    let custom = CustomMetadata {
        title: Some(article.title.clone()),
        description: Some(article.description.clone()),
        template: Some(ARTICLES_PREFIX.to_string()),
        alternate_locales: Some(genuine),
        is_fallback: resolved.is_fallback,
        image: article.image.as_ref().map(|image| format!("{site_url}/assets/{image}")),
        og_type: Some("article"),
    };
    let meta = state.metadata().page_metadata(locale, &base_path, Some(&custom));
    let reading = estimate_reading_time(&article.content);

    let home_label = navbar(state, locale).text_or("Home", strings.home);
    let breadcrumb = structured_data::breadcrumb_list(&[
        BreadcrumbItem {
            name: home_label,
            item: format!("{site_url}/{}/", locale.code()),
        },
        BreadcrumbItem {
            name: label("IntroTitle", strings.resources),
            item: format!("{site_url}/{}{RESSOURCES_PATH}/", locale.code()),
        },
        BreadcrumbItem {
            name: label("ArticlesTitle", strings.articles),
            item: format!("{site_url}/{}{ARTICLES_PREFIX}/", locale.code()),
        },
        BreadcrumbItem {
            name: article.title.clone(),
            item: url.clone(),
        },
    ]);
    let article_ld = structured_data::article(
        &ArticleSchema {
            headline: article.title.clone(),
            description: article.description.clone(),
            url,
            in_language: locale.code().to_string(),
            author: article.author.clone(),
            author_url: article.author_url.clone(),
            date_published: article.date.clone(),
            date_modified: article.updated.clone(),
            image: custom.image.clone(),
            time_required: reading.as_ref().map(|r| r.time_required.clone()),
        },
        &state.site,
    );

    let mut body = String::new();
    if resolved.is_fallback && !strings.fallback_notice.is_empty() {
        body.push_str(&format!(
            "<div class=\"fallback-notice\" role=\"note\">{}</div>\n",
            escape_markup(strings.fallback_notice)
        ));
    }
    body.push_str(&format!(
        "<h1>{}</h1>\n<p class=\"lead\">{}</p>\n<div class=\"byline\">\n",
        escape_markup(&article.title),
        escape_markup(&article.description)
    ));
    if let Some(author) = &article.author {
        body.push_str(&format!(
            "<p>{} {}</p>\n",
            escape_markup(&label("By", strings.by)),
            escape_markup(author)
        ));
    }
    if let Some(date) = &article.date {
        body.push_str(&format!(
            "<p>{} {}</p>\n",
            escape_markup(&label("Published", strings.published)),
            format_date(date, locale)
        ));
    }
    if let Some(updated) = &article.updated {
        body.push_str(&format!(
            "<p>{}: {}</p>\n",
            escape_markup(&label("LastUpdated", strings.last_updated)),
            format_date(updated, locale)
        ));
    }
    if let Some(reading) = &reading {
        body.push_str(&format!(
            "<p>{}</p>\n",
            escape_markup(&strings.reading_time.replace("{minutes}", &reading.minutes.to_string()))
        ));
    }
    body.push_str("</div>\n<article id=\"article-content\">\n");
    body.push_str(&markdown_to_html(&article.content));
    body.push_str("</article>\n");

    body.push_str(&references_section(
        &resolved.ressources,
        article,
        &label("References", strings.references),
    ));
    body.push_str(&related_section(resolved, &label("ArticlesTitle", strings.articles)));

    let json_ld: [Value; 2] = [breadcrumb, article_ld];
    html_page(
        StatusCode::OK,
        document(locale, &meta.render_head(), &json_ld, &body),
    )
}

/// Reference list; labels resolve through the namespace the article came
/// from, unknown labels show their key.
fn references_section(ressources: &Ressources, article: &Article, heading: &str) -> String {
    if article.references.is_empty() {
        return String::new();
    }
    let mut section = format!(
        "<section class=\"references\">\n<h2>{}</h2>\n<ol>\n",
        escape_markup(heading)
    );
    for reference in &article.references {
        section.push_str(&format!(
            "<li><a href=\"{}\" rel=\"noopener noreferrer\" target=\"_blank\">{}</a></li>\n",
            escape_markup(&reference.url),
            escape_markup(ressources.reference_label(reference))
        ));
    }
    section.push_str("</ol>\n</section>\n");
    section
}

fn related_section(resolved: &ResolvedArticle, heading: &str) -> String {
    let related: Vec<_> = resolved
        .ressources
        .articles
        .iter()
        .filter(|a| a.slug != resolved.article.slug && !a.slug.trim().is_empty())
        .take(RELATED_ARTICLES)
        .collect();
    if related.is_empty() {
        return String::new();
    }

    let mut section = format!(
        "<section class=\"related\">\n<h2>{}</h2>\n<ul>\n",
        escape_markup(heading)
    );
    for article in related {
        let href = format!("/{}{}/{}", resolved.locale.code(), ARTICLES_PREFIX, article.slug);
        section.push_str(&format!("<li>{}</li>\n", link(&href, &article.title)));
    }
    section.push_str("</ul>\n</section>\n");
    section
}

/// Localized 404 page, never indexed.
pub fn not_found(locale: Locale) -> Response {
    let strings = locale.strings();
    let head = format!(
        "<title>{}</title>\n<meta name=\"robots\" content=\"{}\">\n",
        escape_markup(strings.not_found_title),
        Robots {
            index: false,
            follow: true
        }
        .content()
    );
    let home = format!("/{}/", locale.code());
    let body = format!(
        "<h1>{}</h1>\n<p>{}</p>\n<p>{}</p>\n",
        escape_markup(strings.not_found_title),
        escape_markup(strings.not_found_body),
        link(&home, strings.back_home)
    );
    html_page(StatusCode::NOT_FOUND, document(locale, &head, &[], &body))
}
