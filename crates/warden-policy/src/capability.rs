// capability.rs — Capability and Effect enumerations.
//
// Capabilities are the action classes a rule can grant over a path.
// Admin is the superuser capability: it implies every other capability.
// Effect is the outcome a matched rule produces; a matching Deny always
// beats any matching Allow (see engine.rs).

use std::fmt;

use serde::{Deserialize, Serialize};

/// An action class that an allow-rule can grant over a resource path.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Read,
    List,
    Create,
    Update,
    Delete,
    /// The superuser capability — implies all others.
    Admin,
}

impl Capability {
    /// Every capability, in declaration order.
    pub const ALL: [Capability; 6] = [
        Capability::Read,
        Capability::List,
        Capability::Create,
        Capability::Update,
        Capability::Delete,
        Capability::Admin,
    ];

    /// Whether holding `self` satisfies a request for `other`.
    ///
    /// Admin implies everything; every other capability implies only itself.
    pub fn implies(self, other: Capability) -> bool {
        self == Capability::Admin || self == other
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Read => "read",
            Capability::List => "list",
            Capability::Create => "create",
            Capability::Update => "update",
            Capability::Delete => "delete",
            Capability::Admin => "admin",
        };
        write!(f, "{}", name)
    }
}

/// The outcome a rule produces when it matches a request.
///
/// Deny is a veto: it is scoped by path and conditions only, never by
/// capability. A matching Deny rule blocks every capability at that path.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Allow,
    Deny,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Allow => write!(f, "allow"),
            Effect::Deny => write!(f, "deny"),
        }
    }
}
