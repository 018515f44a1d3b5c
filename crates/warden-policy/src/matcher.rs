// matcher.rs — Path pattern matching.
//
// Composes normalization and variable resolution, then compiles the pattern
// into an anchored segment automaton. Token precedence, highest first:
//
//   1. `**/`          zero or more whole segments — `/foo/**/bar` matches `/foo/bar`
//   2. trailing `/**` optional `/` + anything, or nothing — `/foo/**` matches `/foo`
//   3. `**`           any characters (unanchored glob remainder)
//   4. `*`            exactly one path segment (no `/`)
//   5. anything else  matched literally
//
// Matching is whole-string; partial matches never count. Patterns that fail
// to compile never match (fail-closed), mirroring how invalid glob patterns
// are treated elsewhere in the stack.

use std::collections::HashMap;

use regex::Regex;
use serde_json::Value;

use crate::error::PolicyError;
use crate::{path, variables, Context};

/// Test whether `pattern` matches `path`, with variables resolved from
/// `context`.
///
/// Both inputs are normalized first. Only string and numeric context values
/// participate in resolution; numbers are stringified and everything else is
/// dropped before substitution.
pub fn matches(pattern: &str, path_str: &str, context: &Context) -> bool {
    let pattern = path::normalize(pattern);
    let path_str = path::normalize(path_str);

    let resolved = match variables::resolve(&pattern, &string_vars(context)) {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::warn!("variable resolution fault for '{}': {}", pattern, e);
            return false;
        }
    };

    match compile(&resolved) {
        Ok(re) => re.is_match(&path_str),
        Err(e) => {
            tracing::warn!("pattern '{}' failed to compile, treating as no match: {}", resolved, e);
            false
        }
    }
}

/// Recover placeholder values from a concrete path.
///
/// Normalizes both inputs, then delegates to [`variables::extract`].
pub fn extract_variables(
    pattern: &str,
    path_str: &str,
) -> Result<HashMap<String, String>, PolicyError> {
    variables::extract(&path::normalize(pattern), &path::normalize(path_str))
}

/// Compile a variable-resolved pattern into an anchored matcher.
fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&translate(pattern))
}

/// Translate pattern tokens into regex source, applying token precedence.
fn translate(pattern: &str) -> String {
    // A trailing `/**` also matches the parent path itself, so the `/` it
    // carries has to become optional. Peel it off before the scan.
    let (body, tail_glob) = match pattern.strip_suffix("/**") {
        Some(rest) => (rest, true),
        None => (pattern, false),
    };

    let mut src = String::from("^");
    let mut rest = body;
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("**/") {
            src.push_str("(?:[^/]+/)*");
            rest = after;
        } else if let Some(after) = rest.strip_prefix("**") {
            src.push_str(".*");
            rest = after;
        } else if let Some(after) = rest.strip_prefix('*') {
            src.push_str("[^/]+");
            rest = after;
        } else {
            let next = rest.find('*').unwrap_or(rest.len());
            src.push_str(&regex::escape(&rest[..next]));
            rest = &rest[next..];
        }
    }
    if tail_glob {
        src.push_str("(?:/.*)?");
    }
    src.push('$');
    src
}

/// Project the string-compatible subset of a context for variable resolution.
fn string_vars(context: &Context) -> HashMap<String, String> {
    context
        .iter()
        .filter_map(|(key, value)| match value {
            Value::String(s) => Some((key.clone(), s.clone())),
            Value::Number(n) => Some((key.clone(), n.to_string())),
            _ => None,
        })
        .collect()
}
