//! Reference resolution and dependency graph construction.
//!
//! Rebuilds every rule tree with each [`Reference`] carrying the fully
//! qualified name of its target, plus the target's title and acronym.
//! Every resolved non-fake reference records an edge from the rule being
//! resolved to its target.
//!
//! # Design
//!
//! - Targets are looked up through [`disambiguate`]
//! - Edges are kept in authoring order and never deduplicated
//! - Fake references (choices, replacement targets, `in`/`except` lists) are
//!   resolved and validated like any other, but add no edge
//!
//! # Pipeline Position
//!
//! ```text
//! Decode → Desugar → Parse → Resolve → Order → Replace → Nullability
//!                             ^^^^^^^
//!                          YOU ARE HERE
//! ```

use super::names::disambiguate;
use indexmap::IndexMap;
use rulebook_ast::ast::{Node, NodeKind, Reference, RuleNode};
use rulebook_ast::error::CompileError;
use rulebook_ast::foundation::DottedName;
use tracing::debug;

/// Rule name to the names it depends on, in rule-map order.
pub type DependencyGraph = IndexMap<DottedName, Vec<DottedName>>;

/// Target metadata denormalized into resolved references.
struct TargetInfo {
    title: Option<String>,
    acronym: Option<String>,
}

/// Resolve every reference of every rule.
///
/// The returned graph has one entry per rule (possibly with no edges), in
/// the same order as the rule map.
///
/// # Errors
///
/// The first unresolved or ambiguous reference aborts resolution.
pub fn resolve_references(
    rules: IndexMap<DottedName, RuleNode>,
) -> Result<(IndexMap<DottedName, RuleNode>, DependencyGraph), CompileError> {
    let targets: IndexMap<DottedName, TargetInfo> = rules
        .iter()
        .map(|(name, rule)| {
            (
                name.clone(),
                TargetInfo {
                    title: rule.title.clone(),
                    acronym: rule.acronym.clone(),
                },
            )
        })
        .collect();

    let mut graph = DependencyGraph::with_capacity(rules.len());
    let mut resolved = IndexMap::with_capacity(rules.len());

    for (name, rule) in rules {
        let mut edges = Vec::new();
        let rule = rule.try_map_nodes(&mut |mut node| -> Result<Node, CompileError> {
            if let NodeKind::Reference(reference) = &mut node.kind {
                let target = disambiguate(&targets, &node.context, &reference.name)?;
                if !reference.fake {
                    edges.push(target.clone());
                }
                *reference = resolved_reference(reference, target, &targets);
            }
            Ok(node)
        })?;

        graph.insert(name.clone(), edges);
        resolved.insert(name, rule);
    }

    debug!(
        rules = resolved.len(),
        edges = graph.values().map(Vec::len).sum::<usize>(),
        "references resolved"
    );
    Ok((resolved, graph))
}

fn resolved_reference(
    reference: &Reference,
    target: DottedName,
    targets: &IndexMap<DottedName, TargetInfo>,
) -> Reference {
    let info = targets.get(&target);
    Reference {
        name: reference.name.clone(),
        title: info.and_then(|i| i.title.clone()),
        acronym: info.and_then(|i| i.acronym.clone()),
        dotted_name: Some(target),
        fake: reference.fake,
    }
}
