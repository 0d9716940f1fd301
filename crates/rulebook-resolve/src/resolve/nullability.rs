//! Static nullability inference.
//!
//! Decides, per rule, whether its value may be null (non-applicable).
//! Results are three-valued: `Some(true)`, `Some(false)`, or `None` when the
//! answer depends on a rule whose fact is not known yet.
//!
//! # Design
//!
//! Rules are visited in dependency order, so in the acyclic case every
//! referenced rule already has a fact. Inside a cycle the first rule visited
//! sees its dependencies as unknown; unknown results are never memoized.
//!
//! # Pipeline Position
//!
//! ```text
//! Decode → Desugar → Parse → Resolve → Order → Replace → Nullability
//!                                                        ^^^^^^^^^^^
//!                                                       YOU ARE HERE
//! ```

use indexmap::IndexMap;
use rulebook_ast::ast::{Node, NodeKind, RuleNode};
use rulebook_ast::foundation::DottedName;
use rulebook_ast::raw::Scalar;
use tracing::trace;

/// Known nullability of rules; absent means unknown.
pub type NullabilityFacts = IndexMap<DottedName, bool>;

/// Infer the nullability of one node against the facts known so far.
pub fn infer_node(node: &Node, facts: &NullabilityFacts) -> Option<bool> {
    match &node.kind {
        NodeKind::Sum { .. }
        | NodeKind::Product { .. }
        | NodeKind::Scale(_)
        | NodeKind::Grid(_)
        | NodeKind::ProgressiveRate(_)
        | NodeKind::Duration { .. }
        | NodeKind::Max { .. }
        | NodeKind::Min { .. } => Some(false),

        NodeKind::ApplicableIf { .. } | NodeKind::NotApplicableIf { .. } => Some(true),

        NodeKind::Constant { value } => Some(matches!(value, Scalar::Null)),

        NodeKind::Unit { operand, .. } => infer_node(operand, facts),
        NodeKind::Ceiling { value, .. }
        | NodeKind::Floor { value, .. }
        | NodeKind::Rounding { value, .. }
        | NodeKind::SituationLookup { value, .. } => infer_node(value, facts),
        NodeKind::Deduction { base, .. } => infer_node(base, facts),

        NodeKind::Variations { branches } => {
            let mut unknown = false;
            for branch in branches {
                match infer_node(&branch.consequence, facts) {
                    Some(true) => return Some(true),
                    None => unknown = true,
                    Some(false) => {}
                }
            }
            if unknown {
                None
            } else {
                Some(false)
            }
        }

        NodeKind::Reference(reference) => reference
            .dotted_name
            .as_ref()
            .and_then(|target| facts.get(target).copied()),

        NodeKind::Operation { .. }
        | NodeKind::Inversion { .. }
        | NodeKind::Default { .. }
        | NodeKind::Recalcul { .. }
        | NodeKind::ReplacementTarget { .. }
        | NodeKind::AllOf { .. }
        | NodeKind::AnyOf { .. }
        | NodeKind::OneOf { .. }
        | NodeKind::CircularResolution { .. }
        | NodeKind::Synchronisation { .. } => Some(false),
    }
}

/// Infer a rule's nullability from its root expression and memoize it when
/// known.
pub fn infer_rule(rule: &RuleNode, facts: &mut NullabilityFacts) -> Option<bool> {
    if let Some(&known) = facts.get(&rule.name) {
        return Some(known);
    }
    let inferred = infer_node(&rule.expression, facts);
    if let Some(nullable) = inferred {
        facts.insert(rule.name.clone(), nullable);
    }
    inferred
}

/// Infer facts for every rule, visiting them in `order`.
///
/// Names in `order` missing from `rules` are skipped.
pub fn infer_nullability(
    rules: &IndexMap<DottedName, RuleNode>,
    order: &[DottedName],
) -> NullabilityFacts {
    let mut facts = NullabilityFacts::with_capacity(rules.len());
    for name in order {
        let Some(rule) = rules.get(name) else {
            continue;
        };
        if infer_rule(rule, &mut facts).is_none() {
            trace!(rule = %name, "nullability unknown");
        }
    }
    facts
}
