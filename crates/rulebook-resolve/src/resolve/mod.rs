//! Whole-program passes over the rule map.
//!
//! - [`session`]: per-compile state
//! - [`names`]: scope-chain and suffix name disambiguation
//! - [`references`]: reference resolution and the dependency graph
//! - [`order`]: cycle-tolerant topological order
//! - [`replacements`]: `replaces` collection and rewriting
//! - [`nullability`]: static nullability facts
//! - [`pipeline`]: the [`compile`] entry point

pub mod names;
pub mod nullability;
pub mod order;
pub mod pipeline;
pub mod references;
pub mod replacements;
pub mod session;

pub use names::disambiguate;
pub use nullability::{infer_node, infer_nullability, infer_rule, NullabilityFacts};
pub use order::topological_order;
pub use pipeline::{compile, CompiledRules};
pub use references::{resolve_references, DependencyGraph};
pub use replacements::{collect_replacements, Replacement, ReplacementRewriter};
pub use session::CompileSession;
