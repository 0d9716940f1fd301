//! Compile-time error reporting and diagnostics.
//!
//! Errors are structured diagnostics tied to the rule they concern.
//!
//! # Design
//!
//! - `CompileError`: single diagnostic naming the offending rule
//! - `ErrorKind`: categorizes diagnostics by compiler stage
//! - `Severity`: error, warning, or note
//!
//! Fatal problems are returned as `Err(CompileError)` and abort the compile.
//! Warnings and notes travel through a [`DiagnosticSink`](crate::DiagnosticSink)
//! and never abort.
//!
//! # Examples
//!
//! ```
//! # use rulebook_ast::error::*;
//! # use rulebook_ast::foundation::DottedName;
//! let rule = DottedName::parse("salary . net");
//! let error = CompileError::new(
//!     ErrorKind::UndefinedName,
//!     Some(rule),
//!     "unresolved reference 'gross'".to_string(),
//! );
//! assert!(error.to_string().contains("salary . net"));
//! ```

use crate::foundation::DottedName;
use std::fmt;

/// Compilation diagnostic with the rule it concerns and a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    /// Category of this diagnostic
    pub kind: ErrorKind,
    /// Severity level
    pub severity: Severity,
    /// Rule in which the problem was found, if any
    pub rule: Option<DottedName>,
    /// Primary message
    pub message: String,
    /// Additional notes or hints
    pub notes: Vec<String>,
}

/// Category of compilation diagnostic.
///
/// # Invariant
///
/// The discriminant values must match the ERROR_KIND_NAMES array indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorKind {
    // Rule construction
    /// Malformed rule body or mechanism argument
    Syntax = 0,
    /// Object that does not name a known mechanism
    UnknownMechanism = 1,
    /// Formula string that does not parse
    InvalidFormula = 2,
    /// Rule name defined twice in one compile
    DuplicateName = 3,

    // Reference resolution
    /// Reference that matches no rule
    UndefinedName = 4,
    /// Reference that matches several rules
    AmbiguousName = 5,

    // Replacement inlining (advisory)
    /// Deprecated syntax that still compiles
    Deprecated = 6,
    /// Replacement declared more than once
    RedundantReplacement = 7,

    // Generic
    /// Internal compiler error (bug in compiler)
    Internal = 8,
}

/// Human-readable names for error kinds.
///
/// Index matches ErrorKind discriminant.
const ERROR_KIND_NAMES: &[&str] = &[
    "syntax error",            // 0: Syntax
    "unknown mechanism",       // 1: UnknownMechanism
    "invalid formula",         // 2: InvalidFormula
    "duplicate name",          // 3: DuplicateName
    "undefined name",          // 4: UndefinedName
    "ambiguous name",          // 5: AmbiguousName
    "deprecated",              // 6: Deprecated
    "redundant replacement",   // 7: RedundantReplacement
    "internal compiler error", // 8: Internal
];

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ERROR_KIND_NAMES[*self as usize])
    }
}

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational note
    Note,
    /// Warning (rules compile but something is suspicious)
    Warning,
    /// Error (compilation cannot proceed)
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => f.write_str("note"),
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

impl CompileError {
    /// Creates a new error diagnostic.
    pub fn new(kind: ErrorKind, rule: Option<DottedName>, message: String) -> Self {
        Self::with_severity(kind, Severity::Error, rule, message)
    }

    /// Creates a new warning diagnostic.
    pub fn warning(kind: ErrorKind, rule: Option<DottedName>, message: String) -> Self {
        Self::with_severity(kind, Severity::Warning, rule, message)
    }

    /// Shorthand for a syntax error in a named rule.
    pub fn syntax(rule: &DottedName, message: String) -> Self {
        Self::new(ErrorKind::Syntax, Some(rule.clone()), message)
    }

    fn with_severity(
        kind: ErrorKind,
        severity: Severity,
        rule: Option<DottedName>,
        message: String,
    ) -> Self {
        Self {
            kind,
            severity,
            rule,
            message,
            notes: Vec::new(),
        }
    }

    /// Adds a note (hint or additional context).
    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    /// Whether this diagnostic is an error.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.severity, self.kind)?;
        if let Some(rule) = &self.rule {
            write!(f, " in `{}`", rule)?;
        }
        write!(f, ": {}", self.message)?;
        for note in &self.notes {
            write!(f, "\n  note: {}", note)?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_match_discriminants() {
        assert_eq!(ErrorKind::Syntax.to_string(), "syntax error");
        assert_eq!(ErrorKind::AmbiguousName.to_string(), "ambiguous name");
        assert_eq!(ErrorKind::Internal.to_string(), "internal compiler error");
    }

    #[test]
    fn test_display_includes_rule_and_notes() {
        let error = CompileError::syntax(
            &DottedName::parse("a . b"),
            "rule body must be an object".to_string(),
        )
        .with_note("found a list".to_string());
        let text = error.to_string();
        assert!(text.starts_with("error[syntax error] in `a . b`"));
        assert!(text.contains("note: found a list"));
        assert!(error.is_error());
    }

    #[test]
    fn test_warning_is_not_error() {
        let warning = CompileError::warning(ErrorKind::Deprecated, None, "old".to_string());
        assert!(!warning.is_error());
        assert_eq!(warning.to_string(), "warning[deprecated]: old");
    }
}
