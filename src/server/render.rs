//! HTML assembly for server-rendered pages.

use chrono::NaiveDate;
use pulldown_cmark::{html, Options, Parser};
use serde_json::Value;

use crate::i18n::Locale;
use crate::seo::escape_markup;
use crate::seo::structured_data::script_tag;

/// Complete HTML document around a rendered `<head>` fragment and body.
pub fn document(locale: Locale, head: &str, json_ld: &[Value], body: &str) -> String {
    let scripts: String = json_ld.iter().map(script_tag).collect::<Vec<_>>().join("\n");
    format!(
        "<!DOCTYPE html>\n<html lang=\"{lang}\">\n<head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <link rel=\"icon\" href=\"/favicon.png\">\n\
         {head}{scripts}\n</head>\n<body>\n<main>\n{body}\n</main>\n</body>\n</html>\n",
        lang = locale.code(),
    )
}

/// Article markdown to HTML. Content comes from the editorial JSON files,
/// not from visitors.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Deterministic short date for a locale: `dd/mm/yyyy` (fr, es, pt),
/// `dd.mm.yyyy` (de), `mm/dd/yyyy` (en). Unparsable input is returned as-is.
pub fn format_date(raw: &str, locale: Locale) -> String {
    let Some(date) = raw
        .get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
    else {
        return raw.to_string();
    };

    let pattern = match locale.code() {
        "de" => "%d.%m.%Y",
        "en" => "%m/%d/%Y",
        _ => "%d/%m/%Y",
    };
    date.format(pattern).to_string()
}

/// `<a href>` with both parts escaped.
pub fn link(href: &str, text: &str) -> String {
    format!(
        "<a href=\"{}\">{}</a>",
        escape_markup(href),
        escape_markup(text)
    )
}
