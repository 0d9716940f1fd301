//! Expression tree walking and rebuilding.
//!
//! Provides shared traversal logic so that resolution, replacement inlining
//! and analysis passes never duplicate the per-kind recursion.
//!
//! # Design
//!
//! - [`Node::children`]: borrowed children, left-to-right
//! - [`walk_node`]: pre-order visit with a closure
//! - [`Node::try_map`]: bottom-up, by-value rebuild; the caller's closure
//!   receives every node after its children were rebuilt
//!
//! Rebuilding consumes the tree and produces a new one. Passes never mutate a
//! tree in place.
//!
//! # Examples
//!
//! ```rust,ignore
//! // Collect every referenced name
//! let mut names = Vec::new();
//! walk_node(&rule.expression, &mut |node| {
//!     if let NodeKind::Reference(r) = &node.kind {
//!         names.push(r.name.clone());
//!     }
//! });
//! ```

use super::node::{Amendment, Bracket, Brackets, Branch, Node, NodeKind, ReplacementCandidate};
use std::convert::Infallible;

/// Recursively walk an expression tree in pre-order, calling visitor for each node.
pub fn walk_node<V>(node: &Node, visitor: &mut V)
where
    V: FnMut(&Node),
{
    visitor(node);
    for child in node.children() {
        walk_node(child, visitor);
    }
}

impl Node {
    /// Direct children of this node, in authored order.
    pub fn children(&self) -> Vec<&Node> {
        fn brackets(b: &Brackets) -> Vec<&Node> {
            let mut out = vec![&*b.base];
            out.extend(b.multiplier.as_deref());
            for bracket in &b.brackets {
                out.push(&bracket.value);
                out.extend(bracket.ceiling.as_ref());
            }
            out
        }

        match &self.kind {
            NodeKind::Sum { terms } | NodeKind::Max { terms } | NodeKind::Min { terms } => {
                terms.iter().collect()
            }
            NodeKind::AllOf { conditions } | NodeKind::AnyOf { conditions } => {
                conditions.iter().collect()
            }
            NodeKind::OneOf { choices, .. } => choices.iter().collect(),
            NodeKind::Inversion { targets } => targets.iter().collect(),
            NodeKind::Product {
                base,
                rate,
                factor,
                ceiling,
            } => {
                let mut out = vec![&**base, &**rate, &**factor];
                out.extend(ceiling.as_deref());
                out
            }
            NodeKind::Scale(b) | NodeKind::Grid(b) | NodeKind::ProgressiveRate(b) => brackets(b),
            NodeKind::Duration { from, to } => from.as_deref().into_iter().chain(to.as_deref()).collect(),
            NodeKind::ApplicableIf { condition, value }
            | NodeKind::NotApplicableIf { condition, value } => vec![&**condition, &**value],
            NodeKind::Constant { .. } | NodeKind::Reference(_) => Vec::new(),
            NodeKind::Operation { left, right, .. } => vec![&**left, &**right],
            NodeKind::Default { value, default } => vec![&**value, &**default],
            NodeKind::Recalcul { rule, amendments } => {
                let mut out: Vec<&Node> = rule.as_deref().into_iter().collect();
                for amendment in amendments {
                    out.push(&amendment.target);
                    out.push(&amendment.value);
                }
                out
            }
            NodeKind::ReplacementTarget {
                original,
                candidates,
            } => {
                let mut out = vec![&**original];
                for candidate in candidates {
                    out.push(&candidate.applicable);
                    out.push(&candidate.value);
                }
                out
            }
            NodeKind::CircularResolution { value }
            | NodeKind::SituationLookup { value, .. } => vec![&**value],
            NodeKind::Synchronisation { data, .. } => vec![&**data],
            NodeKind::Variations { branches } => {
                let mut out = Vec::new();
                for branch in branches {
                    out.extend(branch.condition.as_ref());
                    out.push(&branch.consequence);
                }
                out
            }
            NodeKind::Deduction { base, deduction } => vec![&**base, &**deduction],
            NodeKind::Rounding { value, precision } => vec![&**value, &**precision],
            NodeKind::Ceiling { value, ceiling } => vec![&**value, &**ceiling],
            NodeKind::Floor { value, floor } => vec![&**value, &**floor],
            NodeKind::Unit { operand, .. } => vec![&**operand],
        }
    }

    /// Rebuild the tree bottom-up through an infallible transformer.
    pub fn map<F>(self, f: &mut F) -> Node
    where
        F: FnMut(Node) -> Node,
    {
        let rebuilt = self.try_map::<_, Infallible>(&mut |node| Ok(f(node)));
        match rebuilt {
            Ok(node) => node,
            Err(never) => match never {},
        }
    }

    /// Rebuild the tree bottom-up, stopping at the first error.
    ///
    /// Children are rebuilt first (left-to-right), then `f` receives the node
    /// carrying its rebuilt children.
    pub fn try_map<F, E>(self, f: &mut F) -> Result<Node, E>
    where
        F: FnMut(Node) -> Result<Node, E>,
    {
        let Node {
            kind,
            context,
            source_map,
        } = self;

        let kind = match kind {
            NodeKind::Sum { terms } => NodeKind::Sum {
                terms: map_all(terms, f)?,
            },
            NodeKind::Max { terms } => NodeKind::Max {
                terms: map_all(terms, f)?,
            },
            NodeKind::Min { terms } => NodeKind::Min {
                terms: map_all(terms, f)?,
            },
            NodeKind::AllOf { conditions } => NodeKind::AllOf {
                conditions: map_all(conditions, f)?,
            },
            NodeKind::AnyOf { conditions } => NodeKind::AnyOf {
                conditions: map_all(conditions, f)?,
            },
            NodeKind::OneOf { choices, mandatory } => NodeKind::OneOf {
                choices: map_all(choices, f)?,
                mandatory,
            },
            NodeKind::Inversion { targets } => NodeKind::Inversion {
                targets: map_all(targets, f)?,
            },
            NodeKind::Product {
                base,
                rate,
                factor,
                ceiling,
            } => NodeKind::Product {
                base: map_box(base, f)?,
                rate: map_box(rate, f)?,
                factor: map_box(factor, f)?,
                ceiling: map_opt_box(ceiling, f)?,
            },
            NodeKind::Scale(b) => NodeKind::Scale(map_brackets(b, f)?),
            NodeKind::Grid(b) => NodeKind::Grid(map_brackets(b, f)?),
            NodeKind::ProgressiveRate(b) => NodeKind::ProgressiveRate(map_brackets(b, f)?),
            NodeKind::Duration { from, to } => NodeKind::Duration {
                from: map_opt_box(from, f)?,
                to: map_opt_box(to, f)?,
            },
            NodeKind::ApplicableIf { condition, value } => NodeKind::ApplicableIf {
                condition: map_box(condition, f)?,
                value: map_box(value, f)?,
            },
            NodeKind::NotApplicableIf { condition, value } => NodeKind::NotApplicableIf {
                condition: map_box(condition, f)?,
                value: map_box(value, f)?,
            },
            leaf @ (NodeKind::Constant { .. } | NodeKind::Reference(_)) => leaf,
            NodeKind::Operation {
                operator,
                left,
                right,
            } => NodeKind::Operation {
                operator,
                left: map_box(left, f)?,
                right: map_box(right, f)?,
            },
            NodeKind::Default { value, default } => NodeKind::Default {
                value: map_box(value, f)?,
                default: map_box(default, f)?,
            },
            NodeKind::Recalcul { rule, amendments } => NodeKind::Recalcul {
                rule: map_opt_box(rule, f)?,
                amendments: amendments
                    .into_iter()
                    .map(|a| {
                        Ok(Amendment {
                            target: a.target.try_map(f)?,
                            value: a.value.try_map(f)?,
                        })
                    })
                    .collect::<Result<_, E>>()?,
            },
            NodeKind::ReplacementTarget {
                original,
                candidates,
            } => NodeKind::ReplacementTarget {
                original: map_box(original, f)?,
                candidates: candidates
                    .into_iter()
                    .map(|c| {
                        Ok(ReplacementCandidate {
                            applicable: c.applicable.try_map(f)?,
                            value: c.value.try_map(f)?,
                        })
                    })
                    .collect::<Result<_, E>>()?,
            },
            NodeKind::CircularResolution { value } => NodeKind::CircularResolution {
                value: map_box(value, f)?,
            },
            NodeKind::Synchronisation { data, path } => NodeKind::Synchronisation {
                data: map_box(data, f)?,
                path,
            },
            NodeKind::SituationLookup { key, value } => NodeKind::SituationLookup {
                key,
                value: map_box(value, f)?,
            },
            NodeKind::Variations { branches } => NodeKind::Variations {
                branches: branches
                    .into_iter()
                    .map(|b| {
                        Ok(Branch {
                            condition: b.condition.map(|c| c.try_map(f)).transpose()?,
                            consequence: b.consequence.try_map(f)?,
                        })
                    })
                    .collect::<Result<_, E>>()?,
            },
            NodeKind::Deduction { base, deduction } => NodeKind::Deduction {
                base: map_box(base, f)?,
                deduction: map_box(deduction, f)?,
            },
            NodeKind::Rounding { value, precision } => NodeKind::Rounding {
                value: map_box(value, f)?,
                precision: map_box(precision, f)?,
            },
            NodeKind::Ceiling { value, ceiling } => NodeKind::Ceiling {
                value: map_box(value, f)?,
                ceiling: map_box(ceiling, f)?,
            },
            NodeKind::Floor { value, floor } => NodeKind::Floor {
                value: map_box(value, f)?,
                floor: map_box(floor, f)?,
            },
            NodeKind::Unit { unit, operand } => NodeKind::Unit {
                unit,
                operand: map_box(operand, f)?,
            },
        };

        f(Node {
            kind,
            context,
            source_map,
        })
    }
}

fn map_all<F, E>(nodes: Vec<Node>, f: &mut F) -> Result<Vec<Node>, E>
where
    F: FnMut(Node) -> Result<Node, E>,
{
    nodes.into_iter().map(|n| n.try_map(f)).collect()
}

fn map_box<F, E>(node: Box<Node>, f: &mut F) -> Result<Box<Node>, E>
where
    F: FnMut(Node) -> Result<Node, E>,
{
    Ok(Box::new((*node).try_map(f)?))
}

fn map_opt_box<F, E>(node: Option<Box<Node>>, f: &mut F) -> Result<Option<Box<Node>>, E>
where
    F: FnMut(Node) -> Result<Node, E>,
{
    node.map(|n| map_box(n, f)).transpose()
}

fn map_brackets<F, E>(b: Brackets, f: &mut F) -> Result<Brackets, E>
where
    F: FnMut(Node) -> Result<Node, E>,
{
    Ok(Brackets {
        base: map_box(b.base, f)?,
        multiplier: map_opt_box(b.multiplier, f)?,
        brackets: b
            .brackets
            .into_iter()
            .map(|bracket| {
                Ok(Bracket {
                    value: bracket.value.try_map(f)?,
                    ceiling: bracket.ceiling.map(|c| c.try_map(f)).transpose()?,
                })
            })
            .collect::<Result<_, E>>()?,
    })
}
