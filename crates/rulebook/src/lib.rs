//! Rulebook: a compiler for declarative rule sets.
//!
//! Rules are authored as a YAML mapping from dotted rule names to bodies
//! (formulas, numbers, or mechanism objects). Compilation produces a map of
//! typed, fully resolved rule trees plus static nullability facts.
//!
//! # Crates
//!
//! - `rulebook-ast`: raw tree, dotted names, nodes, diagnostics
//! - `rulebook-parse`: formula and mechanism parsing of one rule
//! - `rulebook-resolve`: desugaring and the whole-program passes
//! - `rulebook` (this crate): YAML ingestion and entry points
//!
//! # Examples
//!
//! ```
//! let compiled = rulebook::compile_str(
//!     "
//! salary: 3000
//! net:
//!   value: salary - tax
//!   with:
//!     tax: salary * 20%
//! ",
//! )
//! .unwrap();
//! assert_eq!(compiled.len(), 3);
//! assert_eq!(compiled.is_nullable("net"), Some(false));
//! ```

pub mod error;
pub mod ingest;

pub use error::{Error, Result};
pub use ingest::parse_source;

pub use rulebook_ast::{
    CollectingSink, CompileError, DiagnosticSink, DottedName, ErrorKind, Node, NodeKind, RawValue,
    RuleNode, Severity, TracingSink,
};
pub use rulebook_parse::{CompileOptions, MechanismParser, RuleBuilder};
pub use rulebook_resolve::{CompiledRules, NullabilityFacts};

use indexmap::IndexMap;

/// Compile a decoded rule set with default options; warnings are logged.
///
/// # Errors
///
/// See [`compile_with`].
pub fn compile(raw: IndexMap<String, RawValue>) -> Result<CompiledRules> {
    compile_with(raw, CompileOptions::default(), &MechanismParser, &mut TracingSink)
}

/// Decode and compile YAML rule text with default options.
///
/// # Errors
///
/// Decoding failures, then anything [`compile_with`] reports.
pub fn compile_str(source: &str) -> Result<CompiledRules> {
    compile(parse_source(source)?)
}

/// Compile with explicit options, rule builder and diagnostics sink.
///
/// # Errors
///
/// [`Error::Compile`] for malformed rules and unresolved or ambiguous
/// references. Cycles are not errors.
pub fn compile_with(
    raw: IndexMap<String, RawValue>,
    options: CompileOptions,
    builder: &dyn RuleBuilder,
    sink: &mut dyn DiagnosticSink,
) -> Result<CompiledRules> {
    Ok(rulebook_resolve::compile(raw, options, builder, sink)?)
}
