//! # warden-policy
//!
//! Path-based access control evaluation for Warden.
//!
//! Named [`Policy`] values hold ordered [`Rule`]s that allow or deny
//! [`Capability`] requests over hierarchical resource paths. The engine in
//! [`engine`] decides a `(capability, path, context)` request with
//! deny-overrides-allow semantics and returns an auditable
//! [`EvaluationResult`].
//!
//! ## Key invariants
//!
//! - **Implicit deny**: a request that matches no rule is denied with the
//!   reason `"No matching rule found"`.
//! - **Deny overrides allow**: a matching Deny rule wins regardless of its
//!   specificity relative to any matching Allow.
//! - **Deny is capability-blind**: Deny rules are scoped by path and
//!   conditions only; a matching Deny blocks every capability.
//! - **Pure evaluation**: the evaluation path performs no I/O and never
//!   mutates a policy — it is safe to call concurrently over shared,
//!   immutable policy values.

use std::collections::HashMap;

pub mod capability;
pub mod condition;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod path;
pub mod policy;
pub mod registry;
pub mod rule;
pub mod specificity;
pub mod variables;

pub use capability::{Capability, Effect};
pub use condition::ConditionSpec;
pub use engine::{evaluate, get_capabilities, list_accessible_paths, EvaluationResult};
pub use error::PolicyError;
pub use policy::Policy;
pub use registry::{PolicyRegistry, PolicyRepository};
pub use rule::Rule;
pub use specificity::Specificity;

/// Caller-supplied request context: string-keyed, arbitrarily typed values
/// used for variable substitution and condition evaluation. The core only
/// reads it.
pub type Context = HashMap<String, serde_json::Value>;
