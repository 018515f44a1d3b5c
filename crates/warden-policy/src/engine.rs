// engine.rs — The evaluation engine.
//
// Every access decision flows through `evaluate()`:
//
// 1. Validate the request path (traversal and control bytes are rejected
//    before any matching is attempted).
// 2. Walk every rule in every policy; keep the ones whose pattern matches
//    the path and whose conditions are satisfied by the context.
// 3. A surviving Deny rule is a candidate unconditionally — capability is
//    NOT checked for Deny. A surviving Allow rule is a candidate only when
//    one of its capabilities implies the requested one.
// 4. No candidates → implicit deny ("No matching rule found").
// 5. Sort candidates by specificity, descending, stable.
// 6. Any Deny among the candidates produces an explicit deny — a
//    low-specificity Deny still overrides a high-specificity Allow.
// 7. Otherwise the highest-specificity Allow wins.
//
// Evaluation is a pure function of its inputs: no shared state, no I/O,
// safe to call concurrently over immutable policies.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::capability::{Capability, Effect};
use crate::error::PolicyError;
use crate::policy::Policy;
use crate::rule::Rule;
use crate::specificity::Specificity;
use crate::{condition, matcher, path, Context};

/// The implicit-deny reason, verbatim in every no-match result.
pub const NO_MATCHING_RULE: &str = "No matching rule found";

/// The outcome of one evaluation call, with the audit trail that produced it.
///
/// Constructed only through the three outcome factories, so invalid
/// combinations (allowed together with an explicit deny) are
/// unrepresentable.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResult {
    allowed: bool,
    explicit_deny: bool,
    matched_rule: Option<Rule>,
    matched_policy: Option<Policy>,
    reason: String,
    evaluated_policies: Vec<Policy>,
}

impl EvaluationResult {
    /// An allow produced by `rule` in `policy`.
    pub fn allowed(rule: Rule, policy: Policy, evaluated_policies: Vec<Policy>) -> Self {
        let reason = format!(
            "Allowed by rule '{}' in policy '{}'",
            rule.pattern(),
            policy.name()
        );
        Self {
            allowed: true,
            explicit_deny: false,
            matched_rule: Some(rule),
            matched_policy: Some(policy),
            reason,
            evaluated_policies,
        }
    }

    /// An implicit deny — no rule matched.
    pub fn denied(reason: impl Into<String>, evaluated_policies: Vec<Policy>) -> Self {
        Self {
            allowed: false,
            explicit_deny: false,
            matched_rule: None,
            matched_policy: None,
            reason: reason.into(),
            evaluated_policies,
        }
    }

    /// An explicit deny produced by a matching Deny rule.
    pub fn explicitly_denied(rule: Rule, policy: Policy, evaluated_policies: Vec<Policy>) -> Self {
        let reason = format!(
            "Explicitly denied by rule '{}' in policy '{}'",
            rule.pattern(),
            policy.name()
        );
        Self {
            allowed: false,
            explicit_deny: true,
            matched_rule: Some(rule),
            matched_policy: Some(policy),
            reason,
            evaluated_policies,
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Whether a Deny rule matched (as opposed to nothing matching at all).
    pub fn is_explicit_deny(&self) -> bool {
        self.explicit_deny
    }

    pub fn matched_rule(&self) -> Option<&Rule> {
        self.matched_rule.as_ref()
    }

    pub fn matched_policy(&self) -> Option<&Policy> {
        self.matched_policy.as_ref()
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// The policies that were consulted, in evaluation order.
    pub fn evaluated_policies(&self) -> &[Policy] {
        &self.evaluated_policies
    }
}

/// A matching rule awaiting precedence resolution.
struct Candidate<'a> {
    rule: &'a Rule,
    policy: &'a Policy,
    specificity: Specificity,
}

/// Decide whether `capability` on `path_str` is allowed under `policies`.
///
/// Errors only on a structurally invalid path; a request that simply
/// matches nothing is an ordinary implicit-deny result.
pub fn evaluate(
    policies: &[Policy],
    capability: Capability,
    path_str: &str,
    context: &Context,
) -> Result<EvaluationResult, PolicyError> {
    path::validate(path_str)?;

    let mut candidates: Vec<Candidate<'_>> = Vec::new();
    for policy in policies {
        for rule in policy.rules() {
            if !matcher::matches(rule.pattern(), path_str, context) {
                continue;
            }
            if !condition::evaluate_all(rule.conditions(), context) {
                continue;
            }
            // Deny survives regardless of capability; Allow must grant it.
            let keep = match rule.effect() {
                Effect::Deny => true,
                Effect::Allow => rule.grants(capability),
            };
            if keep {
                candidates.push(Candidate {
                    rule,
                    policy,
                    specificity: Specificity::of(rule.pattern()),
                });
            }
        }
    }

    if candidates.is_empty() {
        tracing::debug!("implicit deny for {} on '{}'", capability, path_str);
        return Ok(EvaluationResult::denied(NO_MATCHING_RULE, policies.to_vec()));
    }

    // Stable sort: equal specificity keeps evaluation order.
    candidates.sort_by(|a, b| b.specificity.cmp(&a.specificity));

    if let Some(deny) = candidates.iter().find(|c| c.rule.effect() == Effect::Deny) {
        tracing::debug!(
            "explicit deny for {} on '{}' by rule '{}'",
            capability,
            path_str,
            deny.rule.pattern()
        );
        return Ok(EvaluationResult::explicitly_denied(
            deny.rule.clone(),
            deny.policy.clone(),
            policies.to_vec(),
        ));
    }

    let best = &candidates[0];
    tracing::debug!(
        "allowed {} on '{}' by rule '{}' in policy '{}'",
        capability,
        path_str,
        best.rule.pattern(),
        best.policy.name()
    );
    Ok(EvaluationResult::allowed(
        best.rule.clone(),
        best.policy.clone(),
        policies.to_vec(),
    ))
}

/// Enumerate the raw patterns of every allow-rule that grants `capability`.
///
/// This enumerates patterns, not concrete reachable resources — no path or
/// condition matching is performed, and variables stay unresolved.
pub fn list_accessible_paths(policies: &[Policy], capability: Capability) -> BTreeSet<String> {
    policies
        .iter()
        .flat_map(|policy| policy.rules())
        .filter(|rule| rule.grants(capability))
        .map(|rule| rule.pattern().to_string())
        .collect()
}

/// Enumerate the capabilities available at `path_str` under `context`.
///
/// Unions the capability sets of every matching, condition-satisfied
/// allow-rule. Deny rules are vetoes, not capabilities — they are excluded
/// from this query entirely.
pub fn get_capabilities(
    policies: &[Policy],
    path_str: &str,
    context: &Context,
) -> Result<BTreeSet<Capability>, PolicyError> {
    path::validate(path_str)?;

    let mut capabilities = BTreeSet::new();
    for policy in policies {
        for rule in policy.rules() {
            if rule.effect() != Effect::Allow {
                continue;
            }
            if !matcher::matches(rule.pattern(), path_str, context) {
                continue;
            }
            if !condition::evaluate_all(rule.conditions(), context) {
                continue;
            }
            capabilities.extend(rule.capabilities().iter().copied());
        }
    }
    Ok(capabilities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::ConditionSpec;
    use serde_json::json;

    fn ctx(pairs: &[(&str, serde_json::Value)]) -> Context {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn users_policy() -> Policy {
        Policy::new(
            "users",
            "user resource access",
            [
                Rule::allow("/users/*", [Capability::Read]),
                Rule::deny("/users/admin"),
            ],
        )
    }

    #[test]
    fn allow_on_wildcard_match() {
        let policies = vec![users_policy()];
        let result = evaluate(&policies, Capability::Read, "/users/42", &Context::new()).unwrap();
        assert!(result.is_allowed());
        assert!(!result.is_explicit_deny());
        assert_eq!(result.matched_rule().unwrap().pattern(), "/users/*");
        assert_eq!(result.matched_policy().unwrap().name(), "users");
    }

    #[test]
    fn deny_rule_blocks_any_capability() {
        let policies = vec![users_policy()];
        // The deny rule carries no capabilities, yet it vetoes Read.
        let result =
            evaluate(&policies, Capability::Read, "/users/admin", &Context::new()).unwrap();
        assert!(!result.is_allowed());
        assert!(result.is_explicit_deny());
        assert_eq!(result.matched_rule().unwrap().pattern(), "/users/admin");

        // And every other capability too.
        for cap in Capability::ALL {
            let result = evaluate(&policies, cap, "/users/admin", &Context::new()).unwrap();
            assert!(result.is_explicit_deny());
        }
    }

    #[test]
    fn ungranted_capability_is_implicit_deny() {
        let policies = vec![users_policy()];
        let result = evaluate(&policies, Capability::Delete, "/users/42", &Context::new()).unwrap();
        assert!(!result.is_allowed());
        assert!(!result.is_explicit_deny());
        assert_eq!(result.reason(), NO_MATCHING_RULE);
        assert!(result.matched_rule().is_none());
    }

    #[test]
    fn no_match_is_implicit_deny_with_reason() {
        let policies = vec![users_policy()];
        let result = evaluate(&policies, Capability::Read, "/orders/1", &Context::new()).unwrap();
        assert!(!result.is_allowed());
        assert!(!result.is_explicit_deny());
        assert_eq!(result.reason(), NO_MATCHING_RULE);
        assert_eq!(result.evaluated_policies().len(), 1);
    }

    #[test]
    fn low_specificity_deny_overrides_high_specificity_allow() {
        let policies = vec![Policy::new(
            "mixed",
            "",
            [
                Rule::allow("/files/secret/report", [Capability::Read]),
                Rule::deny("/files/**"),
            ],
        )];
        let result = evaluate(
            &policies,
            Capability::Read,
            "/files/secret/report",
            &Context::new(),
        )
        .unwrap();
        assert!(result.is_explicit_deny());
        assert_eq!(result.matched_rule().unwrap().pattern(), "/files/**");
    }

    #[test]
    fn higher_specificity_allow_wins_among_allows() {
        let policies = vec![Policy::new(
            "docs",
            "",
            [
                Rule::allow("/docs/**", [Capability::Read]),
                Rule::allow("/docs/readme", [Capability::Read]),
            ],
        )];
        let result =
            evaluate(&policies, Capability::Read, "/docs/readme", &Context::new()).unwrap();
        assert!(result.is_allowed());
        assert_eq!(result.matched_rule().unwrap().pattern(), "/docs/readme");
    }

    #[test]
    fn equal_specificity_keeps_evaluation_order() {
        let first = Policy::new("first", "", [Rule::allow("/a/*", [Capability::Read])]);
        let second = Policy::new("second", "", [Rule::allow("/a/*", [Capability::Read])]);
        let policies = vec![first, second];
        let result = evaluate(&policies, Capability::Read, "/a/b", &Context::new()).unwrap();
        assert_eq!(result.matched_policy().unwrap().name(), "first");
    }

    #[test]
    fn admin_grant_satisfies_any_request() {
        let policies = vec![Policy::new(
            "root",
            "",
            [Rule::allow("/**", [Capability::Admin])],
        )];
        for cap in Capability::ALL {
            let result = evaluate(&policies, cap, "/anything/here", &Context::new()).unwrap();
            assert!(result.is_allowed());
        }
    }

    #[test]
    fn conditions_filter_candidates() {
        let policies = vec![Policy::new(
            "staff",
            "",
            [Rule::allow("/internal/**", [Capability::Read])
                .with_condition("role", ConditionSpec::one_of(["staff", "admin"]))],
        )];

        let staff = ctx(&[("role", json!("staff"))]);
        assert!(evaluate(&policies, Capability::Read, "/internal/wiki", &staff)
            .unwrap()
            .is_allowed());

        let guest = ctx(&[("role", json!("guest"))]);
        let result = evaluate(&policies, Capability::Read, "/internal/wiki", &guest).unwrap();
        assert!(!result.is_allowed());
        assert_eq!(result.reason(), NO_MATCHING_RULE);
    }

    #[test]
    fn conditional_deny_only_applies_when_condition_holds() {
        let policies = vec![Policy::new(
            "freeze",
            "",
            [
                Rule::allow("/repo/**", [Capability::Update]),
                Rule::deny("/repo/**").with_condition("frozen", ConditionSpec::equals(true)),
            ],
        )];

        let frozen = ctx(&[("frozen", json!(true))]);
        assert!(evaluate(&policies, Capability::Update, "/repo/main", &frozen)
            .unwrap()
            .is_explicit_deny());

        let open = ctx(&[("frozen", json!(false))]);
        assert!(evaluate(&policies, Capability::Update, "/repo/main", &open)
            .unwrap()
            .is_allowed());
    }

    #[test]
    fn variable_patterns_resolve_from_context() {
        let policies = vec![Policy::new(
            "tenants",
            "",
            [Rule::allow("/tenants/${tenant}/**", [Capability::Read])],
        )];
        let context = ctx(&[("tenant", json!("acme"))]);
        assert!(
            evaluate(&policies, Capability::Read, "/tenants/acme/files", &context)
                .unwrap()
                .is_allowed()
        );
        assert!(
            !evaluate(&policies, Capability::Read, "/tenants/other/files", &context)
                .unwrap()
                .is_allowed()
        );
    }

    #[test]
    fn invalid_path_is_an_error_not_a_deny() {
        let policies = vec![users_policy()];
        let result = evaluate(
            &policies,
            Capability::Read,
            "/users/../admin",
            &Context::new(),
        );
        assert!(matches!(result, Err(PolicyError::InvalidPath { .. })));
    }

    #[test]
    fn list_accessible_paths_unions_granting_patterns() {
        let policies = vec![
            Policy::new(
                "a",
                "",
                [
                    Rule::allow("/docs/**", [Capability::Read]),
                    Rule::allow("/admin/**", [Capability::Admin]),
                    Rule::deny("/docs/internal"),
                ],
            ),
            Policy::new("b", "", [Rule::allow("/files/*", [Capability::Update])]),
        ];
        let paths = list_accessible_paths(&policies, Capability::Read);
        // Admin implies Read, so the admin pattern is reachable too.
        assert_eq!(paths.len(), 2);
        assert!(paths.contains("/docs/**"));
        assert!(paths.contains("/admin/**"));
        // Deny patterns and non-granting allows are excluded.
        assert!(!paths.contains("/docs/internal"));
        assert!(!paths.contains("/files/*"));
    }

    #[test]
    fn get_capabilities_unions_matching_allows() {
        let policies = vec![Policy::new(
            "docs",
            "",
            [
                Rule::allow("/docs/*", [Capability::Read]),
                Rule::allow("/docs/readme", [Capability::Update]),
                Rule::deny("/docs/readme"),
            ],
        )];
        // Deny rules have no bearing on capability enumeration.
        let caps = get_capabilities(&policies, "/docs/readme", &Context::new()).unwrap();
        assert_eq!(
            caps,
            BTreeSet::from([Capability::Read, Capability::Update])
        );
    }

    #[test]
    fn get_capabilities_respects_conditions() {
        let policies = vec![Policy::new(
            "docs",
            "",
            [Rule::allow("/docs/*", [Capability::Read])
                .with_condition("role", ConditionSpec::equals("staff"))],
        )];
        let caps = get_capabilities(&policies, "/docs/readme", &Context::new()).unwrap();
        assert!(caps.is_empty());
        let caps = get_capabilities(
            &policies,
            "/docs/readme",
            &ctx(&[("role", json!("staff"))]),
        )
        .unwrap();
        assert_eq!(caps, BTreeSet::from([Capability::Read]));
    }

    #[test]
    fn result_serializes_for_audit() {
        let policies = vec![users_policy()];
        let result = evaluate(&policies, Capability::Read, "/users/42", &Context::new()).unwrap();
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"allowed\":true"));
        assert!(json.contains("Allowed by rule"));
    }
}
