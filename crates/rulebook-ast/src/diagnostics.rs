//! Destinations for non-fatal diagnostics.

use crate::error::{CompileError, Severity};

/// Receives warnings and notes emitted during compilation.
///
/// A sink never aborts the compile; fatal problems are returned as errors.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: CompileError);
}

/// Default sink: forwards diagnostics to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&mut self, diagnostic: CompileError) {
        let rule = diagnostic
            .rule
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        match diagnostic.severity {
            Severity::Error => {
                tracing::error!(kind = %diagnostic.kind, rule = %rule, "{}", diagnostic.message)
            }
            Severity::Warning => {
                tracing::warn!(kind = %diagnostic.kind, rule = %rule, "{}", diagnostic.message)
            }
            Severity::Note => {
                tracing::info!(kind = %diagnostic.kind, rule = %rule, "{}", diagnostic.message)
            }
        }
    }
}

/// Sink that keeps every diagnostic, in emission order.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    pub diagnostics: Vec<CompileError>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity >= Severity::Warning)
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&mut self, diagnostic: CompileError) {
        self.diagnostics.push(diagnostic);
    }
}
