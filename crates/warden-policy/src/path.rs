// path.rs — Resource path validation and normalization.
//
// Paths are hierarchical, slash-separated strings. Every pattern and every
// request path goes through `normalize` before matching, so the matcher only
// ever sees canonical forms: leading slash, no trailing slash (except the
// root itself), no repeated separators.
//
// `validate` runs before normalization and screens out structurally hostile
// input — traversal sequences and control bytes never reach the matcher.

use crate::error::PolicyError;

/// Canonicalize a path string.
///
/// Guarantees: the result starts with `/`, has no trailing `/` unless the
/// whole path is `/`, and contains no repeated separators. Total over all
/// string inputs — the empty string normalizes to `/`. Idempotent.
pub fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Structurally validate a request path before normalization.
///
/// Rejects traversal sequences (`..`, including URL-encoded `%2e%2e` forms)
/// and embedded control bytes. The raw string is checked rather than the
/// normalized form, to catch encoding tricks.
pub fn validate(path: &str) -> Result<(), PolicyError> {
    if path.contains("..") || path.contains("%2e%2e") || path.contains("%2E%2E") {
        return Err(PolicyError::InvalidPath {
            path: path.to_string(),
            reason: "path traversal sequence".to_string(),
        });
    }
    if path.chars().any(|c| c.is_control()) {
        return Err(PolicyError::InvalidPath {
            path: path.to_string(),
            reason: "control character".to_string(),
        });
    }
    Ok(())
}
