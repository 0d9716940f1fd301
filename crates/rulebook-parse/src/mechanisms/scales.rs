//! Products and bracket scales.

use super::{check_keys, expect_object, expect_sequence, RuleParser};
use rulebook_ast::ast::{Bracket, Brackets, Node, NodeKind};
use rulebook_ast::error::CompileError;
use rulebook_ast::foundation::DottedName;
use rulebook_ast::raw::{RawObject, RawValue};

const PRODUCT_KEYS: &[&str] = &["base", "rate", "factor", "ceiling"];
const SCALE_KEYS: &[&str] = &["base", "multiplier", "brackets"];

impl RuleParser<'_> {
    /// `product`, `scale`, `grid` and `progressive rate`.
    ///
    /// An argument carrying `components` is expanded into a sum first.
    pub(crate) fn parse_scale_like(
        &mut self,
        mechanism: &str,
        argument: &RawValue,
        context: &DottedName,
    ) -> Result<Node, CompileError> {
        let object = expect_object(mechanism, argument, context)?;
        if object.contains_key("components") {
            return self.parse_components(mechanism, object, context);
        }

        let kind = match mechanism {
            "product" => self.parse_product(object, context)?,
            "grid" => NodeKind::Grid(self.parse_brackets(mechanism, "amount", object, context)?),
            "progressive rate" => {
                NodeKind::ProgressiveRate(self.parse_brackets(mechanism, "rate", object, context)?)
            }
            _ => NodeKind::Scale(self.parse_brackets(mechanism, "rate", object, context)?),
        };
        Ok(Node::new(kind, context.clone()))
    }

    fn parse_product(
        &mut self,
        object: &RawObject,
        context: &DottedName,
    ) -> Result<NodeKind, CompileError> {
        check_keys("product", object, PRODUCT_KEYS, context)?;
        Ok(NodeKind::Product {
            base: self.parse_or_one(object, "base", context)?,
            rate: self.parse_or_one(object, "rate", context)?,
            factor: self.parse_or_one(object, "factor", context)?,
            ceiling: self.parse_optional(object, "ceiling", context)?,
        })
    }

    /// Missing product operands are neutral.
    fn parse_or_one(
        &mut self,
        object: &RawObject,
        key: &str,
        context: &DottedName,
    ) -> Result<Box<Node>, CompileError> {
        Ok(self
            .parse_optional(object, key, context)?
            .unwrap_or_else(|| Box::new(Node::number(1.0, context.clone()))))
    }

    fn parse_brackets(
        &mut self,
        mechanism: &str,
        value_key: &str,
        object: &RawObject,
        context: &DottedName,
    ) -> Result<Brackets, CompileError> {
        check_keys(mechanism, object, SCALE_KEYS, context)?;
        let base = self.parse_required(mechanism, object, "base", context)?;
        let multiplier = self.parse_optional(object, "multiplier", context)?;

        let raw_brackets: &[RawValue] = match object.get("brackets") {
            Some(value) => expect_sequence("brackets", value, context)?,
            None => &[],
        };
        let mut brackets = Vec::with_capacity(raw_brackets.len());
        for raw in raw_brackets {
            let bracket = expect_object("brackets", raw, context)?;
            check_keys("brackets", bracket, &[value_key, "ceiling"], context)?;
            brackets.push(Bracket {
                value: *self.parse_required(mechanism, bracket, value_key, context)?,
                ceiling: self
                    .parse_optional(bracket, "ceiling", context)?
                    .map(|ceiling| *ceiling),
            });
        }

        Ok(Brackets {
            base,
            multiplier,
            brackets,
        })
    }
}
