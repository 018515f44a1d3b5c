// error.rs — Error types for policy evaluation and lookup.
//
// "No match" is never an error: absence of a match is an ordinary false or
// empty result. These variants cover genuinely exceptional situations only —
// malformed paths, missing referenced policies, and internal pattern-engine
// faults.

use thiserror::Error;

/// Errors that can occur during policy operations.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The requested policy name is absent from both the registry cache and
    /// the repository collaborator. Recoverable — callers may treat it as an
    /// implicit deny or surface it to an operator.
    #[error("no policy named '{name}' in registry or repository")]
    PolicyNotFound { name: String },

    /// The pattern engine faulted while substituting or extracting variables.
    /// Unreachable for well-formed patterns; indicates an internal error, not
    /// a deny.
    #[error("variable resolution failed for pattern '{pattern}': {source}")]
    VariableResolution {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A request path failed structural validation before normalization.
    #[error("invalid resource path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
}
