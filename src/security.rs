use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;
use subtle::ConstantTimeEq;

static BEARER_REGEX: OnceLock<Regex> = OnceLock::new();

/// Constant-time secret comparison.
///
/// Both sides are hashed with SHA-256 first so the comparison takes the
/// same time whatever the length of the provided value.
pub fn secrets_match(provided: &str, expected: &str) -> bool {
    let a = Sha256::digest(provided.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.as_slice().ct_eq(b.as_slice()).into()
}

/// Token from an `Authorization: Bearer <token>` header value
/// (scheme matched case-insensitively).
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let regex = BEARER_REGEX.get_or_init(|| Regex::new(r"(?i)^Bearer\s+(.+)$").unwrap());
    regex
        .captures(header?)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|token| !token.is_empty())
}
