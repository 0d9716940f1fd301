//! Per-rule construction for the rulebook compiler.
//!
//! Builds typed [`RuleNode`](rulebook_ast::RuleNode)s from desugared raw rule
//! bodies.
//!
//! # Pipeline Position
//!
//! ```text
//! Decode -> Desugar -> Parse -> Resolve -> Order -> Replace -> Nullability
//!                      ^^^^^
//!                   YOU ARE HERE
//! ```
//!
//! # Modules
//!
//! - [`formula`]: logos lexer and Pratt parser for infix formulas
//! - [`mechanisms`]: mechanism dispatch, chainable wrappers, components
//! - [`rule`]: the [`RuleBuilder`] seam and its default [`MechanismParser`]
//! - [`options`]: [`CompileOptions`]

pub mod formula;
pub mod mechanisms;
pub mod options;
pub mod rule;

pub use options::CompileOptions;
pub use rule::{normalize_body, parse_rule, MechanismParser, ParsedRule, RuleBuilder};
