//! "Did you mean" hints for namespace typos, logged in development only.

use regex::Regex;
use std::sync::OnceLock;

static CAMEL_BOUNDARY: OnceLock<Regex> = OnceLock::new();

/// Maximum number of namespace names suggested.
const MAX_SUGGESTIONS: usize = 3;

pub(crate) fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let n = b.len();
    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0; n + 1];
    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == *cb { 0 } else { 1 };
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[n]
}

/// Closest candidates to `target` (case-insensitive), best first.
pub(crate) fn nearest<'a>(target: &str, candidates: &'a [String]) -> Vec<&'a str> {
    let target = target.to_lowercase();
    let mut scored: Vec<(&str, usize)> = candidates
        .iter()
        .filter(|name| !name.is_empty())
        .map(|name| (name.as_str(), levenshtein(&target, &name.to_lowercase())))
        .collect();
    scored.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(name, _)| name)
        .collect()
}

/// `ServiceDetails` / `service_details` -> `service-details`.
pub(crate) fn to_kebab(name: &str) -> String {
    let regex = CAMEL_BOUNDARY.get_or_init(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());
    regex
        .replace_all(name, "$1-$2")
        .replace('_', "-")
        .to_lowercase()
}

/// Diagnostic for a namespace missing in both the requested and the
/// canonical locale.
pub(crate) fn missing_namespace_message(
    namespace: &str,
    locale: &str,
    canonical: &str,
    candidates: &[String],
) -> String {
    let mut message = format!(
        "Missing content for namespace \"{namespace}\" (locale: {locale}) and fallback \"{canonical}\""
    );

    let suggestions = nearest(namespace, candidates);
    if !suggestions.is_empty() {
        message.push_str(&format!(". Did you mean one of: {}?", suggestions.join(", ")));
    }

    let kebab = to_kebab(namespace);
    if kebab != namespace {
        message.push_str(&format!(
            " Hint: namespaces use kebab-case file names. Try: \"{kebab}\""
        ));
    }
    message
}
