//! Compile orchestration.
//!
//! Runs every pass in order over one [`CompileSession`]. Each pass
//! materializes its full output before the next one starts, and the first
//! fatal error aborts the compile without a partial result.

use super::nullability::{infer_nullability, NullabilityFacts};
use super::order::topological_order;
use super::references::resolve_references;
use super::replacements::{collect_replacements, ReplacementRewriter};
use super::session::CompileSession;
use crate::desugar::desugar_rules;
use indexmap::IndexMap;
use rulebook_ast::ast::RuleNode;
use rulebook_ast::diagnostics::DiagnosticSink;
use rulebook_ast::error::CompileError;
use rulebook_ast::foundation::DottedName;
use rulebook_ast::raw::RawValue;
use rulebook_parse::{normalize_body, CompileOptions, RuleBuilder};
use serde::Serialize;
use tracing::{debug, info, instrument};

/// Output of a successful compile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledRules {
    /// Every rule, keyed by fully qualified name, in definition order
    pub rules: IndexMap<DottedName, RuleNode>,
    /// Known nullability per rule
    pub nullability: NullabilityFacts,
}

impl CompiledRules {
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&RuleNode> {
        self.rules.get(&DottedName::parse(name))
    }

    /// Known nullability of rule `name`; `None` when unknown.
    pub fn is_nullable(&self, name: &str) -> Option<bool> {
        self.nullability.get(&DottedName::parse(name)).copied()
    }
}

/// Compile a decoded rule set.
///
/// Warnings (deprecated syntax, redundant replacements) go to `sink`.
///
/// # Errors
///
/// Malformed bodies, unknown mechanisms, invalid formulas, duplicate names,
/// and unresolved or ambiguous references.
#[instrument(skip_all, name = "compile", fields(rules = raw.len()))]
pub fn compile(
    raw: IndexMap<String, RawValue>,
    options: CompileOptions,
    builder: &dyn RuleBuilder,
    sink: &mut dyn DiagnosticSink,
) -> Result<CompiledRules, CompileError> {
    let mut session = CompileSession::new(options, sink);

    let raw = desugar_rules(raw)?;
    for (name, body) in &raw {
        let name = DottedName::parse(name);
        let body = RawValue::Object(normalize_body(&name, body)?);
        let parsed = builder.build(&name, &body, session.options())?;
        session.register(parsed.rule)?;
        for discovered in parsed.discovered {
            session.register(discovered)?;
        }
    }
    debug!(rules = session.rules().len(), "rules built");

    let CompileSession { rules, sink, .. } = session;
    let (rules, graph) = resolve_references(rules)?;
    let order = topological_order(&graph);
    debug!(rules = order.len(), "rules ordered");

    let rewriter = ReplacementRewriter::new(collect_replacements(&rules), sink);
    let rules: IndexMap<DottedName, RuleNode> = rules
        .into_iter()
        .map(|(name, mut rule)| {
            rule.expression = rewriter.rewrite(rule.expression);
            (name, rule)
        })
        .collect();

    let nullability = infer_nullability(&rules, &order);
    info!(
        rules = rules.len(),
        known_nullability = nullability.len(),
        "compile complete"
    );
    Ok(CompiledRules { rules, nullability })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulebook_ast::diagnostics::CollectingSink;
    use rulebook_parse::MechanismParser;

    fn rules(source: &str) -> IndexMap<String, RawValue> {
        serde_yaml::from_str(source).unwrap()
    }

    #[test]
    fn test_compile_small_rule_set() {
        let mut sink = CollectingSink::new();
        let compiled = compile(
            rules(
                r#"
salary: gross + bonus
salary . gross: 3000
salary . bonus:
  applicable if: salary . gross > 2000
  value: 200
"#,
            ),
            CompileOptions::default(),
            &MechanismParser,
            &mut sink,
        )
        .unwrap();

        assert_eq!(compiled.len(), 3);
        assert_eq!(compiled.is_nullable("salary . bonus"), Some(true));
        assert_eq!(compiled.is_nullable("salary . gross"), Some(false));
        assert_eq!(compiled.is_nullable("salary"), Some(false));
        assert!(sink.is_empty());
    }
}
