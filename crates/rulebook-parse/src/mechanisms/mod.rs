//! Mechanism parsing: raw values to typed nodes.
//!
//! A value is a scalar (constant or formula) or an object naming exactly one
//! mechanism, optionally wrapped by chainable mechanisms (`applicable if`,
//! `ceiling`, `unit`, ...). Dispatch is on the mechanism key; every key maps
//! to one [`NodeKind`] variant.
//!
//! # Design
//!
//! - [`chain`]: chainable wrappers, peeled in a fixed order
//! - [`scales`]: `product`, `scale`, `grid`, `progressive rate`
//! - [`conditions`]: `all of`, `any of`, `one of`, `variations`
//! - [`components`]: itemized expansion into a `sum`
//! - [`misc`]: `duration`, `inversion`, `recalcul`, `synchronisation`
//!
//! Inline named rules (`{ name, value }`, produced by the desugarer) are built
//! as full rules and collected into [`RuleParser::discovered`].

pub mod chain;
pub mod components;
mod conditions;
mod misc;
mod scales;

use crate::formula::parse_formula;
use crate::options::CompileOptions;
use chain::Chainable;
use rulebook_ast::ast::{Node, NodeKind, RuleNode};
use rulebook_ast::error::{CompileError, ErrorKind};
use rulebook_ast::foundation::DottedName;
use rulebook_ast::raw::{RawObject, RawValue, Scalar};

/// Rule metadata keys; never part of a value.
pub const METADATA_KEYS: &[&str] = &[
    "title",
    "description",
    "acronym",
    "note",
    "question",
    "references",
];

/// Keys that carry a value directly rather than naming a mechanism.
pub(crate) const VALUE_KEYS: &[&str] = &["value", "formula"];

/// Per-rule parsing state.
pub(crate) struct RuleParser<'a> {
    pub(crate) options: &'a CompileOptions,
    /// Rules defined inline or through `with`, in completion order
    pub(crate) discovered: Vec<RuleNode>,
}

impl<'a> RuleParser<'a> {
    pub(crate) fn new(options: &'a CompileOptions) -> Self {
        Self {
            options,
            discovered: Vec::new(),
        }
    }

    /// Parse any value authored inside rule `context`.
    pub(crate) fn parse_value(
        &mut self,
        value: &RawValue,
        context: &DottedName,
    ) -> Result<Node, CompileError> {
        match value {
            RawValue::Scalar(Scalar::String(source)) => parse_formula(source, context).map_err(|e| {
                CompileError::new(
                    ErrorKind::InvalidFormula,
                    Some(context.clone()),
                    format!("invalid formula `{}`: {}", source, e),
                )
            }),
            RawValue::Scalar(scalar) => Ok(Node::constant(scalar.clone(), context.clone())),
            RawValue::Sequence(_) => Err(CompileError::syntax(
                context,
                "expected a value, found a list".to_string(),
            )),
            RawValue::Object(object) => self.parse_object(object, context),
        }
    }

    fn parse_object(&mut self, object: &RawObject, context: &DottedName) -> Result<Node, CompileError> {
        if let Some(name) = object.get("name") {
            return self.parse_inline_rule(name, object, context);
        }

        let inner: RawObject = object
            .iter()
            .filter(|(key, _)| Chainable::from_key(key).is_none() && !METADATA_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        if inner.is_empty() {
            let message = match Chainable::ALL.iter().find(|c| object.contains_key(c.key())) {
                Some(chained) => format!("`{}` needs a value to apply to", chained.key()),
                None => "empty mechanism object".to_string(),
            };
            return Err(CompileError::syntax(context, message));
        }

        let node = self.parse_mechanism(&inner, context)?;
        self.wrap_chain(node, object, context)
    }

    /// Parse an object holding a single value key or a single mechanism key.
    pub(crate) fn parse_mechanism(
        &mut self,
        object: &RawObject,
        context: &DottedName,
    ) -> Result<Node, CompileError> {
        let mut entries = object.iter();
        match (entries.next(), entries.next()) {
            (Some((key, value)), None) if VALUE_KEYS.contains(&key.as_str()) => {
                self.parse_value(value, context)
            }
            (Some((key, argument)), None) => self.dispatch(key, argument, context),
            _ => {
                let keys: Vec<&str> = object.keys().map(String::as_str).collect();
                Err(CompileError::new(
                    ErrorKind::UnknownMechanism,
                    Some(context.clone()),
                    format!("expected a single mechanism, found keys {}", keys.join(", ")),
                ))
            }
        }
    }

    fn dispatch(
        &mut self,
        key: &str,
        argument: &RawValue,
        context: &DottedName,
    ) -> Result<Node, CompileError> {
        let kind = match key {
            "sum" => NodeKind::Sum {
                terms: self.parse_list(key, argument, context)?,
            },
            "max of" => NodeKind::Max {
                terms: self.parse_list(key, argument, context)?,
            },
            "min of" => NodeKind::Min {
                terms: self.parse_list(key, argument, context)?,
            },
            "all of" => NodeKind::AllOf {
                conditions: self.parse_list(key, argument, context)?,
            },
            "any of" => NodeKind::AnyOf {
                conditions: self.parse_list(key, argument, context)?,
            },
            "product" | "scale" | "grid" | "progressive rate" => {
                return self.parse_scale_like(key, argument, context)
            }
            "one of" => self.parse_one_of(argument, context)?,
            "variations" => self.parse_variations(argument, context)?,
            "duration" => self.parse_duration(argument, context)?,
            "inversion" => self.parse_inversion(argument, context)?,
            "recalcul" => self.parse_recalcul(argument, context)?,
            "synchronisation" => self.parse_synchronisation(argument, context)?,
            _ => {
                return Err(CompileError::new(
                    ErrorKind::UnknownMechanism,
                    Some(context.clone()),
                    format!("unknown mechanism `{}`", key),
                ))
            }
        };
        Ok(Node::new(kind, context.clone()))
    }

    /// `{ name, ...body }`: register `context . name` and refer to it.
    fn parse_inline_rule(
        &mut self,
        name: &RawValue,
        object: &RawObject,
        context: &DottedName,
    ) -> Result<Node, CompileError> {
        let literal = name.as_formula_text().ok_or_else(|| {
            CompileError::syntax(
                context,
                format!("inline rule name must be a string, found {}", name.kind_name()),
            )
        })?;
        let child = context.join(&DottedName::parse(&literal));
        let mut body = object.clone();
        body.shift_remove("name");

        let rule = self.build_rule(&child, &body)?;
        self.discovered.push(rule);
        Ok(Node::reference(DottedName::parse(&literal).to_string(), context.clone()))
    }

    pub(crate) fn parse_list(
        &mut self,
        mechanism: &str,
        argument: &RawValue,
        context: &DottedName,
    ) -> Result<Vec<Node>, CompileError> {
        let items = expect_sequence(mechanism, argument, context)?;
        items.iter().map(|item| self.parse_value(item, context)).collect()
    }

    pub(crate) fn parse_optional(
        &mut self,
        object: &RawObject,
        key: &str,
        context: &DottedName,
    ) -> Result<Option<Box<Node>>, CompileError> {
        object
            .get(key)
            .map(|value| self.parse_value(value, context).map(Box::new))
            .transpose()
    }

    pub(crate) fn parse_required(
        &mut self,
        mechanism: &str,
        object: &RawObject,
        key: &str,
        context: &DottedName,
    ) -> Result<Box<Node>, CompileError> {
        match object.get(key) {
            Some(value) => Ok(Box::new(self.parse_value(value, context)?)),
            None => Err(CompileError::syntax(
                context,
                format!("`{}` requires a `{}` argument", mechanism, key),
            )),
        }
    }
}

pub(crate) fn expect_object<'v>(
    mechanism: &str,
    argument: &'v RawValue,
    context: &DottedName,
) -> Result<&'v RawObject, CompileError> {
    argument.as_object().ok_or_else(|| {
        CompileError::syntax(
            context,
            format!("`{}` expects an object, found {}", mechanism, argument.kind_name()),
        )
    })
}

pub(crate) fn expect_sequence<'v>(
    mechanism: &str,
    argument: &'v RawValue,
    context: &DottedName,
) -> Result<&'v [RawValue], CompileError> {
    argument.as_sequence().ok_or_else(|| {
        CompileError::syntax(
            context,
            format!("`{}` expects a list, found {}", mechanism, argument.kind_name()),
        )
    })
}

/// Reject argument keys a mechanism does not know.
pub(crate) fn check_keys(
    mechanism: &str,
    object: &RawObject,
    allowed: &[&str],
    context: &DottedName,
) -> Result<(), CompileError> {
    match object.keys().find(|key| !allowed.contains(&key.as_str())) {
        Some(key) => Err(CompileError::syntax(
            context,
            format!("unexpected key `{}` in `{}`", key, mechanism),
        )
        .with_note(format!("expected one of: {}", allowed.join(", ")))),
        None => Ok(()),
    }
}

/// Read a name argument (string) as a canonical dotted-name literal.
pub(crate) fn name_literal(
    mechanism: &str,
    value: &RawValue,
    context: &DottedName,
) -> Result<String, CompileError> {
    match value.as_formula_text() {
        Some(text) => Ok(DottedName::parse(&text).to_string()),
        None => Err(CompileError::syntax(
            context,
            format!("`{}` expects rule names, found {}", mechanism, value.kind_name()),
        )),
    }
}
