//! Conditions: `one of` and `variations`.
//!
//! `all of` and `any of` are plain lists and handled by the dispatcher.

use super::{check_keys, expect_object, expect_sequence, name_literal, RuleParser};
use rulebook_ast::ast::{Branch, Node, NodeKind};
use rulebook_ast::error::CompileError;
use rulebook_ast::foundation::DottedName;
use rulebook_ast::raw::RawValue;

impl RuleParser<'_> {
    /// `one of`: `{ choices, mandatory? }` or a bare list of choices.
    ///
    /// Choices name rules without depending on their value.
    pub(crate) fn parse_one_of(
        &mut self,
        argument: &RawValue,
        context: &DottedName,
    ) -> Result<NodeKind, CompileError> {
        let (choices, mandatory) = match argument {
            RawValue::Sequence(items) => (items.as_slice(), false),
            other => {
                let object = expect_object("one of", other, context)?;
                check_keys("one of", object, &["choices", "mandatory"], context)?;
                let choices = match object.get("choices") {
                    Some(value) => expect_sequence("one of", value, context)?,
                    None => {
                        return Err(CompileError::syntax(
                            context,
                            "`one of` requires `choices`".to_string(),
                        ))
                    }
                };
                let mandatory = match object.get("mandatory") {
                    None => false,
                    Some(value) => value.as_bool().ok_or_else(|| {
                        CompileError::syntax(
                            context,
                            format!("`mandatory` expects yes or no, found {}", value.kind_name()),
                        )
                    })?,
                };
                (choices, mandatory)
            }
        };

        let choices = choices
            .iter()
            .map(|choice| {
                name_literal("one of", choice, context)
                    .map(|name| Node::fake_reference(name, context.clone()))
            })
            .collect::<Result<_, _>>()?;
        Ok(NodeKind::OneOf { choices, mandatory })
    }

    /// `variations`: `[{ if, then }, ..., { else }]`.
    pub(crate) fn parse_variations(
        &mut self,
        argument: &RawValue,
        context: &DottedName,
    ) -> Result<NodeKind, CompileError> {
        let items = expect_sequence("variations", argument, context)?;
        let mut branches = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            let object = expect_object("variations", item, context)?;
            let branch = if let Some(otherwise) = object.get("else") {
                check_keys("variations", object, &["else"], context)?;
                if index + 1 != items.len() {
                    return Err(CompileError::syntax(
                        context,
                        "`else` must be the last branch of `variations`".to_string(),
                    ));
                }
                Branch {
                    condition: None,
                    consequence: self.parse_value(otherwise, context)?,
                }
            } else {
                check_keys("variations", object, &["if", "then"], context)?;
                Branch {
                    condition: Some(*self.parse_required("variations", object, "if", context)?),
                    consequence: *self.parse_required("variations", object, "then", context)?,
                }
            };
            branches.push(branch);
        }

        Ok(NodeKind::Variations { branches })
    }
}
