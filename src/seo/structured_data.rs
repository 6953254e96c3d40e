//! JSON-LD builders.
//!
//! Pure object assembly: nothing is validated, optional inputs are simply
//! left out of the output.

use serde_json::{json, Map, Value};

use crate::config::SiteConfig;

const SCHEMA_CONTEXT: &str = "https://schema.org";

/// Insert `key` only when `value` is present.
fn put_opt(object: &mut Map<String, Value>, key: &str, value: Option<impl Into<Value>>) {
    if let Some(value) = value {
        object.insert(key.to_string(), value.into());
    }
}

fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

pub fn organization(site: &SiteConfig) -> Value {
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "Organization",
        "@id": format!("{}/#organization", site.site_url),
        "name": site.brand,
        "legalName": site.legal_name,
        "url": site.site_url,
        "logo": {
            "@type": "ImageObject",
            "url": site.logo_url,
        },
        "email": site.email,
        "sameAs": site.same_as,
    })
}

#[derive(Debug, Clone)]
pub struct BreadcrumbItem {
    pub name: String,
    /// Absolute URL
    pub item: String,
}

pub fn breadcrumb_list(items: &[BreadcrumbItem]) -> Value {
    let elements: Vec<Value> = items
        .iter()
        .enumerate()
        .map(|(i, it)| {
            json!({
                "@type": "ListItem",
                "position": i + 1,
                "name": it.name,
                "item": it.item,
            })
        })
        .collect();

    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "BreadcrumbList",
        "itemListElement": elements,
    })
}

#[derive(Debug, Clone, Default)]
pub struct ArticleSchema {
    pub headline: String,
    pub description: String,
    pub url: String,
    /// Locale code of the page
    pub in_language: String,
    pub author: Option<String>,
    pub author_url: Option<String>,
    pub date_published: Option<String>,
    pub date_modified: Option<String>,
    pub image: Option<String>,
    /// ISO 8601 duration
    pub time_required: Option<String>,
}

pub fn article(cfg: &ArticleSchema, site: &SiteConfig) -> Value {
    let mut author = into_object(json!({ "@type": "Person" }));
    put_opt(&mut author, "name", cfg.author.clone());
    put_opt(&mut author, "url", cfg.author_url.clone());

    let mut object = into_object(json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "Article",
        "headline": cfg.headline,
        "description": cfg.description,
        "author": author,
        "url": cfg.url,
        "mainEntityOfPage": { "@type": "WebPage", "@id": cfg.url },
        "inLanguage": cfg.in_language,
        "publisher": {
            "@type": "Organization",
            "name": site.brand,
            "logo": { "@type": "ImageObject", "url": site.logo_url },
            "url": site.site_url,
        },
    }));
    put_opt(&mut object, "datePublished", cfg.date_published.clone());
    put_opt(&mut object, "dateModified", cfg.date_modified.clone());
    put_opt(&mut object, "timeRequired", cfg.time_required.clone());
    put_opt(
        &mut object,
        "image",
        cfg.image
            .as_ref()
            .map(|url| json!({ "@type": "ImageObject", "url": url })),
    );
    Value::Object(object)
}

#[derive(Debug, Clone, Default)]
pub struct ServiceSchema {
    pub name: String,
    pub description: String,
    pub url: String,
    pub service_type: Option<String>,
    pub area_served: Option<Vec<String>>,
    pub provider: Option<String>,
}

pub fn service(cfg: &ServiceSchema, site: &SiteConfig) -> Value {
    let mut object = into_object(json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "Service",
        "name": cfg.name,
        "description": cfg.description,
        "url": cfg.url,
        "audience": { "@type": "Audience", "audienceType": "Business" },
        "category": "Professional Services",
    }));
    put_opt(&mut object, "serviceType", cfg.service_type.clone());
    put_opt(&mut object, "areaServed", cfg.area_served.clone());
    put_opt(
        &mut object,
        "provider",
        cfg.provider.as_ref().map(|name| {
            json!({
                "@type": "Organization",
                "name": name,
                "url": site.site_url,
                "logo": site.logo_url,
            })
        }),
    );
    Value::Object(object)
}

#[derive(Debug, Clone, Default)]
pub struct ProductSchema {
    pub name: String,
    pub description: String,
    pub url: String,
    /// Defaults to the site brand
    pub brand: Option<String>,
    pub price: Option<String>,
    pub price_currency: Option<String>,
}

pub fn product(cfg: &ProductSchema, site: &SiteConfig) -> Value {
    let brand = cfg.brand.clone().unwrap_or_else(|| site.brand.to_string());
    let mut object = into_object(json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "Product",
        "name": cfg.name,
        "description": cfg.description,
        "url": cfg.url,
        "brand": { "@type": "Organization", "name": brand },
    }));

    if cfg.price.is_some() || cfg.price_currency.is_some() {
        let mut offer = into_object(json!({
            "@type": "Offer",
            "availability": "https://schema.org/PreOrder",
        }));
        put_opt(&mut offer, "price", cfg.price.clone());
        put_opt(&mut offer, "priceCurrency", cfg.price_currency.clone());
        object.insert("offers".to_string(), Value::Object(offer));
    }
    Value::Object(object)
}

#[derive(Debug, Clone)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// FAQPage from entries with both a question and an answer, at most `limit`.
pub fn faq_page(entries: &[FaqEntry], limit: Option<usize>) -> Value {
    let questions: Vec<Value> = entries
        .iter()
        .filter(|e| !e.question.is_empty() && !e.answer.is_empty())
        .take(limit.unwrap_or(usize::MAX))
        .map(|e| {
            json!({
                "@type": "Question",
                "name": e.question,
                "acceptedAnswer": { "@type": "Answer", "text": e.answer },
            })
        })
        .collect();

    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "FAQPage",
        "mainEntity": questions,
    })
}

/// `<script type="application/ld+json">` tag; `</` is escaped so content
/// cannot close the script element.
pub fn script_tag(value: &Value) -> String {
    let body = value.to_string().replace("</", "<\\/");
    format!("<script type=\"application/ld+json\">{body}</script>")
}
