// rule.rs — The Rule value type.
//
// A rule binds one path pattern to an effect, a capability set, and a map
// of conditions. Rules are immutable after construction: fields are private
// and the only mutators are copy-on-write `with_*` methods returning a new
// rule.
//
// Load-bearing invariant: a Deny rule's capability set is never consulted.
// Deny rules are path/condition-scoped, not capability-scoped — a matching
// Deny blocks the path for *any* requested capability. `Rule::deny` does
// not even accept capabilities, making the invariant unrepresentable to
// violate.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::capability::{Capability, Effect};
use crate::condition::ConditionSpec;

/// One path pattern bound to an effect, capability set, and conditions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    pattern: String,
    effect: Effect,
    capabilities: BTreeSet<Capability>,
    conditions: BTreeMap<String, ConditionSpec>,
}

impl Rule {
    /// An allow-rule granting `capabilities` at paths matching `pattern`.
    pub fn allow(
        pattern: impl Into<String>,
        capabilities: impl IntoIterator<Item = Capability>,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            effect: Effect::Allow,
            capabilities: capabilities.into_iter().collect(),
            conditions: BTreeMap::new(),
        }
    }

    /// A deny-rule vetoing every capability at paths matching `pattern`.
    pub fn deny(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            effect: Effect::Deny,
            capabilities: BTreeSet::new(),
            conditions: BTreeMap::new(),
        }
    }

    /// A copy of this rule with one more condition on `field`.
    pub fn with_condition(mut self, field: impl Into<String>, spec: ConditionSpec) -> Self {
        self.conditions.insert(field.into(), spec);
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn capabilities(&self) -> &BTreeSet<Capability> {
        &self.capabilities
    }

    pub fn conditions(&self) -> &BTreeMap<String, ConditionSpec> {
        &self.conditions
    }

    /// Whether this rule is an allow-rule whose capability set satisfies a
    /// request for `capability`.
    pub fn grants(&self, capability: Capability) -> bool {
        self.effect == Effect::Allow
            && self.capabilities.iter().any(|held| held.implies(capability))
    }
}
