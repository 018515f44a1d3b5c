// condition.rs — Context conditions attached to rules.
//
// A rule may constrain its match with conditions over request-context
// fields. The condition kind is an explicit tagged variant chosen at
// policy-construction time — never inferred from the shape of a value at
// evaluation time.
//
// All conditions on a rule must hold (logical AND, short-circuit on the
// first failure). A rule with no conditions is unconditionally satisfied.

use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::Context;

/// A predicate over a context value. Receives `Value::Null` when the field
/// is absent from the context.
pub type PredicateFn = dyn Fn(&Value) -> bool + Send + Sync;

/// A single condition over one context field.
#[derive(Clone)]
pub enum ConditionSpec {
    /// True iff the context value is identical in type and value.
    Equals(Value),
    /// True iff the context value is an exact member of the set.
    OneOf(Vec<Value>),
    /// True iff the caller-supplied predicate returns true for the value.
    Predicate(Arc<PredicateFn>),
}

impl ConditionSpec {
    /// Exact-equality condition.
    pub fn equals(value: impl Into<Value>) -> Self {
        ConditionSpec::Equals(value.into())
    }

    /// Set-membership condition.
    pub fn one_of<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        ConditionSpec::OneOf(values.into_iter().map(Into::into).collect())
    }

    /// Caller-supplied predicate condition.
    pub fn predicate(f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        ConditionSpec::Predicate(Arc::new(f))
    }

    /// Evaluate this condition against a single context value.
    pub fn evaluate(&self, value: &Value) -> bool {
        match self {
            ConditionSpec::Equals(expected) => value == expected,
            ConditionSpec::OneOf(set) => set.contains(value),
            ConditionSpec::Predicate(f) => f(value),
        }
    }
}

impl fmt::Debug for ConditionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionSpec::Equals(v) => f.debug_tuple("Equals").field(v).finish(),
            ConditionSpec::OneOf(vs) => f.debug_tuple("OneOf").field(vs).finish(),
            ConditionSpec::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl PartialEq for ConditionSpec {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConditionSpec::Equals(a), ConditionSpec::Equals(b)) => a == b,
            (ConditionSpec::OneOf(a), ConditionSpec::OneOf(b)) => a == b,
            // Predicates compare by identity — two closures are never
            // structurally comparable.
            (ConditionSpec::Predicate(a), ConditionSpec::Predicate(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// Serialized for audit output only. Predicates hold functions, so they are
// emitted as an opaque marker; rules and policies have no Deserialize.
impl Serialize for ConditionSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            ConditionSpec::Equals(v) => map.serialize_entry("equals", v)?,
            ConditionSpec::OneOf(vs) => map.serialize_entry("one_of", vs)?,
            ConditionSpec::Predicate(_) => map.serialize_entry("predicate", "<fn>")?,
        }
        map.end()
    }
}

/// Evaluate a rule's conditions against the request context.
///
/// AND semantics with short-circuit on the first failing condition, in the
/// (deterministic) map iteration order. An empty condition map is true.
pub fn evaluate_all(
    conditions: &std::collections::BTreeMap<String, ConditionSpec>,
    context: &Context,
) -> bool {
    static NULL: Value = Value::Null;
    conditions.iter().all(|(field, spec)| {
        let value = context.get(field).unwrap_or(&NULL);
        let satisfied = spec.evaluate(value);
        if !satisfied {
            tracing::trace!("condition on field '{}' not satisfied", field);
        }
        satisfied
    })
}
