//! Chainable mechanisms.
//!
//! Chainable keys sit next to a value (in a rule body or a value object) and
//! wrap it. They are applied in a fixed order regardless of authoring order:
//! [`Chainable::ALL`] lists them outermost first, so
//!
//! ```yaml
//! unit: EUR
//! ceiling: 1000
//! applicable if: employed
//! value: base * rate
//! ```
//!
//! lowers to `ApplicableIf(Ceiling(Unit(base * rate)))`.

use super::RuleParser;
use rulebook_ast::ast::{Node, NodeKind};
use rulebook_ast::error::CompileError;
use rulebook_ast::foundation::DottedName;
use rulebook_ast::raw::{RawObject, RawValue, Scalar};

/// A mechanism that wraps the value it is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chainable {
    ApplicableIf,
    NotApplicableIf,
    ResolveCircularReference,
    Default,
    Ceiling,
    Floor,
    Deduction,
    Rounding,
    Unit,
}

impl Chainable {
    /// Outermost first.
    pub const ALL: [Chainable; 9] = [
        Chainable::ApplicableIf,
        Chainable::NotApplicableIf,
        Chainable::ResolveCircularReference,
        Chainable::Default,
        Chainable::Ceiling,
        Chainable::Floor,
        Chainable::Deduction,
        Chainable::Rounding,
        Chainable::Unit,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Chainable::ApplicableIf => "applicable if",
            Chainable::NotApplicableIf => "not applicable if",
            Chainable::ResolveCircularReference => "resolve circular reference",
            Chainable::Default => "default",
            Chainable::Ceiling => "ceiling",
            Chainable::Floor => "floor",
            Chainable::Deduction => "deduction",
            Chainable::Rounding => "rounding",
            Chainable::Unit => "unit",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }
}

impl RuleParser<'_> {
    /// Wrap `value` with every chainable key present in `object`.
    pub(crate) fn wrap_chain(
        &mut self,
        value: Node,
        object: &RawObject,
        context: &DottedName,
    ) -> Result<Node, CompileError> {
        let mut node = value;
        for chainable in Chainable::ALL.into_iter().rev() {
            if let Some(argument) = object.get(chainable.key()) {
                node = self.wrap(chainable, argument, node, context)?;
            }
        }
        Ok(node)
    }

    fn wrap(
        &mut self,
        chainable: Chainable,
        argument: &RawValue,
        value: Node,
        context: &DottedName,
    ) -> Result<Node, CompileError> {
        let value = Box::new(value);
        let kind = match chainable {
            Chainable::ApplicableIf => NodeKind::ApplicableIf {
                condition: Box::new(self.parse_value(argument, context)?),
                value,
            },
            Chainable::NotApplicableIf => NodeKind::NotApplicableIf {
                condition: Box::new(self.parse_value(argument, context)?),
                value,
            },
            Chainable::ResolveCircularReference => match argument.as_bool() {
                Some(true) => NodeKind::CircularResolution { value },
                Some(false) => return Ok(*value),
                None => {
                    return Err(CompileError::syntax(
                        context,
                        format!(
                            "`{}` expects yes or no, found {}",
                            chainable.key(),
                            argument.kind_name()
                        ),
                    ))
                }
            },
            Chainable::Default => NodeKind::Default {
                value,
                default: Box::new(self.parse_value(argument, context)?),
            },
            Chainable::Ceiling => NodeKind::Ceiling {
                value,
                ceiling: Box::new(self.parse_value(argument, context)?),
            },
            Chainable::Floor => NodeKind::Floor {
                value,
                floor: Box::new(self.parse_value(argument, context)?),
            },
            Chainable::Deduction => NodeKind::Deduction {
                base: value,
                deduction: Box::new(self.parse_value(argument, context)?),
            },
            Chainable::Rounding => {
                let precision = match argument {
                    RawValue::Scalar(Scalar::Bool(false)) => return Ok(*value),
                    RawValue::Scalar(Scalar::Bool(true)) => Node::number(0.0, context.clone()),
                    other => self.parse_value(other, context)?,
                };
                NodeKind::Rounding {
                    value,
                    precision: Box::new(precision),
                }
            }
            Chainable::Unit => match argument.as_str() {
                Some(unit) => NodeKind::Unit {
                    unit: (self.options.unit_label)(unit),
                    operand: value,
                },
                None => {
                    return Err(CompileError::syntax(
                        context,
                        format!("`unit` expects a string, found {}", argument.kind_name()),
                    ))
                }
            },
        };
        Ok(Node::new(kind, context.clone()))
    }
}
