//! Evaluation-control mechanisms.

use super::{check_keys, expect_object, expect_sequence, name_literal, RuleParser};
use rulebook_ast::ast::{Amendment, Node, NodeKind};
use rulebook_ast::error::CompileError;
use rulebook_ast::foundation::DottedName;
use rulebook_ast::raw::RawValue;

impl RuleParser<'_> {
    pub(crate) fn parse_duration(
        &mut self,
        argument: &RawValue,
        context: &DottedName,
    ) -> Result<NodeKind, CompileError> {
        let object = expect_object("duration", argument, context)?;
        check_keys("duration", object, &["from", "to"], context)?;
        Ok(NodeKind::Duration {
            from: self.parse_optional(object, "from", context)?,
            to: self.parse_optional(object, "to", context)?,
        })
    }

    /// `inversion: { targets: [...] }`
    pub(crate) fn parse_inversion(
        &mut self,
        argument: &RawValue,
        context: &DottedName,
    ) -> Result<NodeKind, CompileError> {
        let object = expect_object("inversion", argument, context)?;
        check_keys("inversion", object, &["targets"], context)?;
        let targets = match object.get("targets") {
            Some(value) => expect_sequence("inversion", value, context)?
                .iter()
                .map(|target| {
                    name_literal("inversion", target, context)
                        .map(|name| Node::reference(name, context.clone()))
                })
                .collect::<Result<_, _>>()?,
            None => {
                return Err(CompileError::syntax(
                    context,
                    "`inversion` requires `targets`".to_string(),
                ))
            }
        };
        Ok(NodeKind::Inversion { targets })
    }

    /// `recalcul: { rule?, with: { name: value } }`
    pub(crate) fn parse_recalcul(
        &mut self,
        argument: &RawValue,
        context: &DottedName,
    ) -> Result<NodeKind, CompileError> {
        let object = expect_object("recalcul", argument, context)?;
        check_keys("recalcul", object, &["rule", "with"], context)?;
        let rule = self.parse_optional(object, "rule", context)?;

        let mut amendments = Vec::new();
        if let Some(with) = object.get("with") {
            for (target, value) in expect_object("recalcul", with, context)? {
                amendments.push(Amendment {
                    target: Node::reference(DottedName::parse(target).to_string(), context.clone()),
                    value: self.parse_value(value, context)?,
                });
            }
        }
        Ok(NodeKind::Recalcul { rule, amendments })
    }

    /// `synchronisation: { data, path }`; `path` is `a . b` or a list of keys.
    pub(crate) fn parse_synchronisation(
        &mut self,
        argument: &RawValue,
        context: &DottedName,
    ) -> Result<NodeKind, CompileError> {
        let object = expect_object("synchronisation", argument, context)?;
        check_keys("synchronisation", object, &["data", "path"], context)?;
        let data = self.parse_required("synchronisation", object, "data", context)?;

        let path = match object.get("path") {
            Some(RawValue::Sequence(items)) => items
                .iter()
                .map(|item| {
                    item.as_formula_text().ok_or_else(|| {
                        CompileError::syntax(
                            context,
                            format!("`path` expects strings, found {}", item.kind_name()),
                        )
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(value) => match value.as_str() {
                Some(text) => DottedName::parse(text).segments().to_vec(),
                None => {
                    return Err(CompileError::syntax(
                        context,
                        format!("`path` expects a string, found {}", value.kind_name()),
                    ))
                }
            },
            None => Vec::new(),
        };
        Ok(NodeKind::Synchronisation { data, path })
    }
}
