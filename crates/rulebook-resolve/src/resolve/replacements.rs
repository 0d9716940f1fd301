//! Replacement collection and rewriting.
//!
//! A rule `R` declaring `replaces: T` stands in for `T` wherever `R`
//! applies. After resolution, every eligible reference to `T` is wrapped in a
//! [`NodeKind::ReplacementTarget`] listing the candidate replacements, so the
//! evaluator can pick the first applicable one and fall back to `T`.
//!
//! # Pipeline Position
//!
//! ```text
//! Decode → Desugar → Parse → Resolve → Order → Replace → Nullability
//!                                              ^^^^^^^
//!                                           YOU ARE HERE
//! ```

use indexmap::IndexMap;
use rulebook_ast::ast::{Node, NodeKind, Reference, ReplacementCandidate, RuleNode};
use rulebook_ast::diagnostics::DiagnosticSink;
use rulebook_ast::error::{CompileError, ErrorKind};
use rulebook_ast::foundation::DottedName;
use tracing::debug;

/// One resolved replacement declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Replacement {
    /// Rule declaring the replacement
    pub definition_rule: DottedName,
    /// Rule being replaced
    pub replaced: DottedName,
    /// Substituted value
    pub by: Node,
    /// Only references from these namespaces are replaced (all when empty)
    pub whitelist: Vec<DottedName>,
    /// References from these namespaces are never replaced
    pub blacklist: Vec<DottedName>,
    /// `by` was given explicitly
    pub legacy_by: bool,
}

impl Replacement {
    /// Whether a reference authored in rule `context` is subject to this
    /// replacement.
    pub fn applies_in(&self, context: &DottedName) -> bool {
        if context.starts_with(&self.definition_rule) {
            return false;
        }
        if self.blacklist.iter().any(|name| context.starts_with(name)) {
            return false;
        }
        self.whitelist.is_empty() || self.whitelist.iter().any(|name| context.starts_with(name))
    }
}

/// Collect the replacement declarations of every rule, in rule-map order.
///
/// Expects resolved rules; declarations whose names are unresolved are
/// skipped.
pub fn collect_replacements(rules: &IndexMap<DottedName, RuleNode>) -> Vec<Replacement> {
    let mut replacements = Vec::new();
    for (name, rule) in rules {
        for decl in &rule.replacements {
            let Some(replaced) = resolved_name(&decl.replaced) else {
                continue;
            };
            let by = match &decl.by {
                Some(by) => by.clone(),
                None => self_reference(rule),
            };
            replacements.push(Replacement {
                definition_rule: name.clone(),
                replaced,
                by,
                whitelist: decl.whitelist.iter().filter_map(resolved_name).collect(),
                blacklist: decl.blacklist.iter().filter_map(resolved_name).collect(),
                legacy_by: decl.by.is_some(),
            });
        }
    }
    replacements
}

fn resolved_name(node: &Node) -> Option<DottedName> {
    node.as_reference()
        .and_then(|reference| reference.dotted_name.clone())
}

/// A resolved reference from a rule to itself.
fn self_reference(rule: &RuleNode) -> Node {
    Node::new(
        NodeKind::Reference(Reference {
            name: rule.name.to_string(),
            dotted_name: Some(rule.name.clone()),
            title: rule.title.clone(),
            acronym: rule.acronym.clone(),
            fake: false,
        }),
        rule.name.clone(),
    )
}

/// Rewrites references to replaced rules.
///
/// Built once per compile from the collected replacements.
#[derive(Debug)]
pub struct ReplacementRewriter {
    by_target: IndexMap<DottedName, Vec<Replacement>>,
}

impl ReplacementRewriter {
    /// Index `replacements` by target.
    ///
    /// Legacy `by` values produce a [`ErrorKind::Deprecated`] warning. A second
    /// replacement of the same target by the same rule produces a
    /// [`ErrorKind::RedundantReplacement`] warning and is dropped.
    pub fn new(replacements: Vec<Replacement>, sink: &mut dyn DiagnosticSink) -> Self {
        let mut by_target: IndexMap<DottedName, Vec<Replacement>> = IndexMap::new();
        for replacement in replacements {
            if replacement.legacy_by {
                sink.emit(CompileError::warning(
                    ErrorKind::Deprecated,
                    Some(replacement.definition_rule.clone()),
                    format!(
                        "`by` in `replaces` of `{}` is deprecated; declare the replacement value in a dedicated rule",
                        replacement.definition_rule
                    ),
                ));
            }

            let existing = by_target.entry(replacement.replaced.clone()).or_default();
            if existing
                .iter()
                .any(|r| r.definition_rule == replacement.definition_rule)
            {
                sink.emit(CompileError::warning(
                    ErrorKind::RedundantReplacement,
                    Some(replacement.definition_rule.clone()),
                    format!(
                        "`{}` replaces `{}` more than once",
                        replacement.definition_rule, replacement.replaced
                    ),
                ));
                continue;
            }
            existing.push(replacement);
        }
        debug!(targets = by_target.len(), "replacement rewriter built");
        Self { by_target }
    }

    pub fn is_empty(&self) -> bool {
        self.by_target.is_empty()
    }

    /// Rewrite every eligible reference of `node`.
    pub fn rewrite(&self, node: Node) -> Node {
        if self.is_empty() {
            return node;
        }
        node.map(&mut |node| self.rewrite_reference(node))
    }

    fn rewrite_reference(&self, node: Node) -> Node {
        let Some(reference) = node.as_reference() else {
            return node;
        };
        if reference.fake {
            return node;
        }
        let Some(replacements) = reference
            .dotted_name
            .as_ref()
            .and_then(|target| self.by_target.get(target))
        else {
            return node;
        };

        let candidates: Vec<ReplacementCandidate> = replacements
            .iter()
            .filter(|r| r.applies_in(&node.context))
            .map(|r| ReplacementCandidate {
                applicable: Node::new(
                    NodeKind::Reference(Reference {
                        name: r.definition_rule.to_string(),
                        dotted_name: Some(r.definition_rule.clone()),
                        title: None,
                        acronym: None,
                        fake: false,
                    }),
                    node.context.clone(),
                ),
                value: r.by.clone(),
            })
            .collect();
        if candidates.is_empty() {
            return node;
        }

        let context = node.context.clone();
        let source_map = node.source_map.clone();
        Node {
            kind: NodeKind::ReplacementTarget {
                original: Box::new(node),
                candidates,
            },
            context,
            source_map,
        }
    }
}
