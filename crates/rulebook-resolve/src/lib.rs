//! Whole-program compilation of rule sets.
//!
//! Takes a decoded rule map through desugaring, per-rule construction,
//! reference resolution, ordering, replacement rewriting and nullability
//! inference.
//!
//! # Pipeline Position
//!
//! ```text
//! Decode -> Desugar -> Parse -> Resolve -> Order -> Replace -> Nullability
//!           ^^^^^^^^^            ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^
//!                         YOU ARE HERE
//! ```
//!
//! # Examples
//!
//! ```
//! # use indexmap::IndexMap;
//! # use rulebook_ast::{CollectingSink, RawValue};
//! # use rulebook_parse::{CompileOptions, MechanismParser};
//! # use rulebook_resolve::compile;
//! let mut raw = IndexMap::new();
//! raw.insert("price".to_string(), RawValue::from(100.0));
//! raw.insert("price . taxed".to_string(), RawValue::from("price * 120%"));
//!
//! let mut sink = CollectingSink::new();
//! let compiled = compile(raw, CompileOptions::default(), &MechanismParser, &mut sink).unwrap();
//! assert_eq!(compiled.len(), 2);
//! assert_eq!(compiled.is_nullable("price . taxed"), Some(false));
//! ```

pub mod desugar;
pub mod resolve;

pub use desugar::{desugar, desugar_rules};
pub use resolve::{
    collect_replacements, compile, disambiguate, topological_order, CompileSession,
    CompiledRules, DependencyGraph, NullabilityFacts, Replacement, ReplacementRewriter,
};
