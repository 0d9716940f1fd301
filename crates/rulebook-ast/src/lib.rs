//! Core data model of the rulebook compiler.
//!
//! This crate holds everything the compiler stages share:
//!
//! - [`raw`]: the untyped authored tree produced by decoders
//! - [`foundation`]: dotted names and source maps
//! - [`ast`]: typed expression nodes and rule roots
//! - [`error`] / [`diagnostics`]: structured diagnostics and their sinks
//!
//! # Pipeline Position
//!
//! ```text
//! Decode -> Desugar -> Parse -> Resolve -> Order -> Replace -> Nullability
//!   ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^
//!   all stages exchange the types defined here
//! ```

pub mod ast;
pub mod diagnostics;
pub mod error;
pub mod foundation;
pub mod raw;

pub use ast::{Node, NodeKind, Reference, ReplacementDecl, RuleNode};
pub use diagnostics::{CollectingSink, DiagnosticSink, TracingSink};
pub use error::{CompileError, ErrorKind, Severity};
pub use foundation::{DottedName, SourceMap};
pub use raw::{RawObject, RawValue, Scalar};
