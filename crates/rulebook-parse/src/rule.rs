//! Rule construction.
//!
//! Turns one rule body into a [`RuleNode`] plus every rule the body defines
//! along the way (`with` children and inline named values).
//!
//! # Design
//!
//! - [`RuleBuilder`]: the seam the compile pipeline calls per top-level rule
//! - [`MechanismParser`]: default builder for the mechanism syntax
//! - [`normalize_body`]: scalar shorthand and body validation
//!
//! Builders never register rules themselves; discovered definitions are
//! returned in [`ParsedRule::discovered`] and folded in by the caller.

use crate::mechanisms::chain::Chainable;
use crate::mechanisms::{check_keys, name_literal, RuleParser, METADATA_KEYS, VALUE_KEYS};
use crate::options::CompileOptions;
use rulebook_ast::ast::{Node, NodeKind, ReplacementDecl, RuleNode};
use rulebook_ast::error::CompileError;
use rulebook_ast::foundation::DottedName;
use rulebook_ast::raw::{RawObject, RawValue, Scalar};
use tracing::trace;

/// Rule-level keys that are neither metadata, values nor chainable.
const STRUCTURAL_KEYS: &[&str] = &["replaces", "with"];

/// Output of building one rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRule {
    pub rule: RuleNode,
    /// Nested rule definitions found in the body, fully built
    pub discovered: Vec<RuleNode>,
}

/// Builds the typed form of one rule body.
pub trait RuleBuilder {
    /// Build rule `name` from its (desugared) `body`.
    ///
    /// # Errors
    ///
    /// Malformed bodies, unknown mechanisms and invalid formulas.
    fn build(
        &self,
        name: &DottedName,
        body: &RawValue,
        options: &CompileOptions,
    ) -> Result<ParsedRule, CompileError>;
}

/// Default [`RuleBuilder`] for the mechanism syntax.
#[derive(Debug, Default, Clone, Copy)]
pub struct MechanismParser;

impl RuleBuilder for MechanismParser {
    fn build(
        &self,
        name: &DottedName,
        body: &RawValue,
        options: &CompileOptions,
    ) -> Result<ParsedRule, CompileError> {
        parse_rule(name, body, options)
    }
}

/// Build rule `name` from `body` with the mechanism syntax.
///
/// # Errors
///
/// See [`RuleBuilder::build`].
pub fn parse_rule(
    name: &DottedName,
    body: &RawValue,
    options: &CompileOptions,
) -> Result<ParsedRule, CompileError> {
    let body = normalize_body(name, body)?;
    let mut parser = RuleParser::new(options);
    let rule = parser.build_rule(name, &body)?;
    trace!(rule = %name, discovered = parser.discovered.len(), "rule built");
    Ok(ParsedRule {
        rule,
        discovered: parser.discovered,
    })
}

/// Normalize a rule body to an object.
///
/// - a string or number is shorthand for `{ formula: <value> }`
/// - `null` is an empty body (an input rule)
///
/// # Errors
///
/// Booleans and lists are syntax errors naming the rule.
pub fn normalize_body(name: &DottedName, body: &RawValue) -> Result<RawObject, CompileError> {
    match body {
        RawValue::Object(object) => Ok(object.clone()),
        RawValue::Scalar(Scalar::Null) => Ok(RawObject::new()),
        RawValue::Scalar(Scalar::String(_)) | RawValue::Scalar(Scalar::Number(_)) => {
            let mut object = RawObject::new();
            object.insert("formula".to_string(), body.clone());
            Ok(object)
        }
        other => Err(CompileError::syntax(
            name,
            format!(
                "rule `{}` must be an object, a formula or a number, found {}",
                name,
                other.kind_name()
            ),
        )),
    }
}

impl RuleParser<'_> {
    /// Build a full rule from a normalized body.
    pub(crate) fn build_rule(
        &mut self,
        name: &DottedName,
        body: &RawObject,
    ) -> Result<RuleNode, CompileError> {
        let mut value_keys = body.keys().filter(|key| VALUE_KEYS.contains(&key.as_str()));
        let explicit = match (value_keys.next(), value_keys.next()) {
            (Some(_), Some(_)) => {
                return Err(CompileError::syntax(
                    name,
                    "`value` and `formula` are mutually exclusive".to_string(),
                ))
            }
            (Some(key), None) => Some(&body[key.as_str()]),
            _ => None,
        };

        let mechanisms: RawObject = body
            .iter()
            .filter(|(key, _)| is_mechanism_key(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let inner = match (explicit, mechanisms.is_empty()) {
            (Some(_), false) => {
                let keys: Vec<&str> = mechanisms.keys().map(String::as_str).collect();
                return Err(CompileError::syntax(
                    name,
                    format!("unexpected keys next to the rule value: {}", keys.join(", ")),
                ));
            }
            (Some(value), true) => self.parse_value(value, name)?,
            (None, false) => self.parse_mechanism(&mechanisms, name)?,
            (None, true) => Node::new(
                NodeKind::SituationLookup {
                    key: name.clone(),
                    value: Box::new(Node::null(name.clone())),
                },
                name.clone(),
            ),
        };
        let expression = self.wrap_chain(inner, body, name)?;

        let mut rule = RuleNode::new(name.clone(), RawValue::Object(body.clone()), expression);
        rule.title = text_field(body, "title", name)?;
        rule.acronym = text_field(body, "acronym", name)?;
        rule.description = text_field(body, "description", name)?;
        if let Some(replaces) = body.get("replaces") {
            rule.replacements = self.parse_replaces(replaces, name)?;
        }
        if let Some(children) = body.get("with") {
            self.build_children(children, name)?;
        }
        Ok(rule)
    }

    /// `with: { child: body }` defines `parent . child` rules.
    fn build_children(&mut self, children: &RawValue, parent: &DottedName) -> Result<(), CompileError> {
        let children = children.as_object().ok_or_else(|| {
            CompileError::syntax(
                parent,
                format!("`with` expects an object, found {}", children.kind_name()),
            )
        })?;
        for (child, body) in children {
            let name = parent.join(&DottedName::parse(child));
            let body = normalize_body(&name, body)?;
            let rule = self.build_rule(&name, &body)?;
            self.discovered.push(rule);
        }
        Ok(())
    }
}

fn is_mechanism_key(key: &str) -> bool {
    !VALUE_KEYS.contains(&key)
        && !METADATA_KEYS.contains(&key)
        && !STRUCTURAL_KEYS.contains(&key)
        && Chainable::from_key(key).is_none()
}

fn text_field(body: &RawObject, key: &str, rule: &DottedName) -> Result<Option<String>, CompileError> {
    match body.get(key) {
        None => Ok(None),
        Some(value) if value.is_null() => Ok(None),
        Some(value) => value.as_formula_text().map(Some).ok_or_else(|| {
            CompileError::syntax(
                rule,
                format!("`{}` must be text, found {}", key, value.kind_name()),
            )
        }),
    }
}

impl RuleParser<'_> {
    /// `replaces`: a name, or a list of names and `{ rule, by?, in?, except? }`.
    fn parse_replaces(
        &mut self,
        value: &RawValue,
        rule: &DottedName,
    ) -> Result<Vec<ReplacementDecl>, CompileError> {
        let items: Vec<&RawValue> = match value {
            RawValue::Sequence(items) => items.iter().collect(),
            other => vec![other],
        };

        let mut declarations = Vec::with_capacity(items.len());
        for item in items {
            let declaration = match item {
                RawValue::Object(object) => {
                    check_keys("replaces", object, &["rule", "by", "in", "except"], rule)?;
                    let replaced = match object.get("rule") {
                        Some(target) => name_literal("replaces", target, rule)?,
                        None => {
                            return Err(CompileError::syntax(
                                rule,
                                "`replaces` entry requires `rule`".to_string(),
                            ))
                        }
                    };
                    let by = match object.get("by") {
                        Some(by) => Some(self.parse_value(by, rule)?),
                        None => None,
                    };
                    ReplacementDecl {
                        replaced: Node::fake_reference(replaced, rule.clone()),
                        by,
                        whitelist: name_list(object.get("in"), rule)?,
                        blacklist: name_list(object.get("except"), rule)?,
                    }
                }
                other => ReplacementDecl {
                    replaced: Node::fake_reference(name_literal("replaces", other, rule)?, rule.clone()),
                    by: None,
                    whitelist: Vec::new(),
                    blacklist: Vec::new(),
                },
            };
            declarations.push(declaration);
        }
        Ok(declarations)
    }
}

/// `in` / `except`: one name or a list of names, as fake references.
fn name_list(value: Option<&RawValue>, rule: &DottedName) -> Result<Vec<Node>, CompileError> {
    let items: Vec<&RawValue> = match value {
        None => Vec::new(),
        Some(RawValue::Sequence(items)) => items.iter().collect(),
        Some(other) => vec![other],
    };
    items
        .into_iter()
        .map(|item| {
            name_literal("replaces", item, rule).map(|name| Node::fake_reference(name, rule.clone()))
        })
        .collect()
}
