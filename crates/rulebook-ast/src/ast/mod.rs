//! Typed rule trees.
//!
//! - [`node`]: expression nodes, one closed variant per mechanism
//! - [`rule`]: rule roots with metadata and replacement declarations
//! - [`walk`]: shared traversal and by-value rebuilding

pub mod node;
pub mod rule;
pub mod walk;

pub use node::{
    Amendment, Bracket, Brackets, Branch, Node, NodeKind, Operator, Reference,
    ReplacementCandidate,
};
pub use rule::{ReplacementDecl, RuleNode};
pub use walk::walk_node;
