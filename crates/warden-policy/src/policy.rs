// policy.rs — The Policy value type.
//
// A policy is a named, ordered collection of rules plus a description.
// The name is the policy's unique, immutable identity (the registry keys
// on it). Rule order carries no evaluation weight — specificity, not
// position, decides precedence — but the list is stable for audit output.

use serde::Serialize;

use crate::rule::Rule;

/// A named, immutable collection of rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Policy {
    name: String,
    description: String,
    rules: Vec<Rule>,
}

impl Policy {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        rules: impl IntoIterator<Item = Rule>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            rules: rules.into_iter().collect(),
        }
    }

    /// The policy's unique identity.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// A copy of this policy with one more rule appended.
    pub fn with_rule(&self, rule: Rule) -> Self {
        let mut rules = self.rules.clone();
        rules.push(rule);
        Self {
            name: self.name.clone(),
            description: self.description.clone(),
            rules,
        }
    }
}
