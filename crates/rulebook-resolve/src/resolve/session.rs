//! Compile session state.

use indexmap::IndexMap;
use rulebook_ast::ast::RuleNode;
use rulebook_ast::diagnostics::DiagnosticSink;
use rulebook_ast::error::{CompileError, ErrorKind};
use rulebook_ast::foundation::DottedName;
use rulebook_parse::CompileOptions;

/// State owned by one compile: the rule map, the diagnostics sink and the
/// caller's options.
///
/// A session is created per compile and collects rules during the build
/// pass; the compile then takes it apart to hand the rules and sink to the
/// whole-program passes. Rule registration is write-once.
pub struct CompileSession<'s> {
    pub(crate) rules: IndexMap<DottedName, RuleNode>,
    pub(crate) sink: &'s mut dyn DiagnosticSink,
    options: CompileOptions,
}

impl<'s> CompileSession<'s> {
    pub fn new(options: CompileOptions, sink: &'s mut dyn DiagnosticSink) -> Self {
        Self {
            rules: IndexMap::new(),
            sink,
            options,
        }
    }

    /// Register a rule under its name.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DuplicateName`] if the name is already registered.
    pub fn register(&mut self, rule: RuleNode) -> Result<(), CompileError> {
        if self.rules.contains_key(&rule.name) {
            return Err(CompileError::new(
                ErrorKind::DuplicateName,
                Some(rule.name.clone()),
                format!("rule `{}` is defined more than once", rule.name),
            ));
        }
        self.rules.insert(rule.name.clone(), rule);
        Ok(())
    }

    pub fn rules(&self) -> &IndexMap<DottedName, RuleNode> {
        &self.rules
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }
}
