//! Reading time estimate for article bodies.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

const AVERAGE_WPM: usize = 200;

static CODE_BLOCK: OnceLock<Regex> = OnceLock::new();
static INLINE_CODE: OnceLock<Regex> = OnceLock::new();
static IMAGE: OnceLock<Regex> = OnceLock::new();
static LINK: OnceLock<Regex> = OnceLock::new();
static PUNCTUATION: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingTime {
    pub words: usize,
    /// Rounded, at least 1
    pub minutes: usize,
    /// ISO 8601 duration, `PT{minutes}M`
    pub time_required: String,
}

/// Estimate reading time of a markdown body. Code, images and link
/// syntax are removed before counting; `None` when no words remain.
pub fn estimate_reading_time(markdown: &str) -> Option<ReadingTime> {
    let code_block = CODE_BLOCK.get_or_init(|| Regex::new(r"(?s)```.*?```").unwrap());
    let inline_code = INLINE_CODE.get_or_init(|| Regex::new(r"`[^`]*`").unwrap());
    let image = IMAGE.get_or_init(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap());
    let link = LINK.get_or_init(|| Regex::new(r"\[[^\]]*\]\([^)]*\)").unwrap());
    let punctuation = PUNCTUATION.get_or_init(|| Regex::new(r"[#>*_~`-]").unwrap());

    let text = code_block.replace_all(markdown, " ");
    let text = inline_code.replace_all(&text, " ");
    let text = image.replace_all(&text, " ");
    let text = link.replace_all(&text, " ");
    let text = punctuation.replace_all(&text, " ");

    let words = text.split_whitespace().count();
    if words == 0 {
        return None;
    }

    let minutes = ((words as f64 / AVERAGE_WPM as f64).round() as usize).max(1);
    Some(ReadingTime {
        words,
        minutes,
        time_required: format!("PT{minutes}M"),
    })
}
