// variables.rs — `${name}` placeholder substitution and extraction.
//
// Patterns may embed `${identifier}` placeholders that are filled in from
// the request context before matching. The inverse operation recovers the
// concrete values a path supplied for each placeholder.
//
// Placeholders absent from the context are left verbatim — the literal text
// `${id}` then has to appear in the path for the pattern to match. Missing
// keys are never an error; the error arm exists only for pattern-engine
// faults, which are unreachable for the fixed placeholder grammar.

use std::collections::HashMap;

use regex::Regex;

use crate::error::PolicyError;

/// Placeholder grammar: `${identifier}` where identifier is a letter or
/// underscore followed by letters, digits, or underscores.
const PLACEHOLDER: &str = r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}";

fn placeholder_regex(pattern: &str) -> Result<Regex, PolicyError> {
    Regex::new(PLACEHOLDER).map_err(|source| PolicyError::VariableResolution {
        pattern: pattern.to_string(),
        source,
    })
}

/// Substitute every `${identifier}` present in `vars` into `pattern`.
///
/// Placeholders whose identifier is not in `vars` stay verbatim.
pub fn resolve(pattern: &str, vars: &HashMap<String, String>) -> Result<String, PolicyError> {
    let re = placeholder_regex(pattern)?;
    let resolved = re.replace_all(pattern, |caps: &regex::Captures<'_>| {
        match vars.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        }
    });
    Ok(resolved.into_owned())
}

/// Recover the values each placeholder captured from a concrete path.
///
/// Every placeholder becomes a capturing group constrained to a single path
/// segment (no `/`), the rest of the pattern is matched literally, and the
/// whole string must match. Returns an empty map when `path` does not
/// structurally match `pattern`.
pub fn extract(pattern: &str, path: &str) -> Result<HashMap<String, String>, PolicyError> {
    let re = placeholder_regex(pattern)?;

    // Numbered groups rather than named ones: the same identifier may
    // legally appear twice in a pattern.
    let mut names = Vec::new();
    let mut src = String::from("^");
    let mut last = 0;
    for m in re.find_iter(pattern) {
        src.push_str(&regex::escape(&pattern[last..m.start()]));
        names.push(pattern[m.start() + 2..m.end() - 1].to_string());
        src.push_str("([^/]+)");
        last = m.end();
    }
    src.push_str(&regex::escape(&pattern[last..]));
    src.push('$');

    let extractor = Regex::new(&src).map_err(|source| PolicyError::VariableResolution {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut values = HashMap::new();
    if let Some(caps) = extractor.captures(path) {
        for (i, name) in names.iter().enumerate() {
            if let Some(group) = caps.get(i + 1) {
                values.insert(name.clone(), group.as_str().to_string());
            }
        }
    }
    Ok(values)
}
