//! Search engine facing output: page metadata, JSON-LD, reading time.

pub mod metadata;
pub mod reading_time;
pub mod structured_data;

pub use metadata::{x_default_url, Alternate, CustomMetadata, MetadataAssembler, PageMetadata, Robots};
pub use reading_time::{estimate_reading_time, ReadingTime};

/// Escape text for HTML/XML element content and quoted attributes.
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
