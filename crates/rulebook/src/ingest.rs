//! Source ingestion.
//!
//! Decodes YAML rule files into the raw rule map. Rule files are often
//! hand-edited, so tab indentation is accepted and normalized to two spaces
//! before decoding.
//!
//! # Pipeline Position
//!
//! ```text
//! Decode → Desugar → Parse → Resolve → Order → Replace → Nullability
//! ^^^^^^
//! YOU ARE HERE
//! ```

use crate::error::Result;
use indexmap::IndexMap;
use rulebook_ast::error::{CompileError, ErrorKind};
use rulebook_ast::raw::{RawObject, RawValue, Scalar};
use serde_yaml::Value;
use tracing::debug;

/// Decode YAML text into a rule map, preserving rule order.
///
/// # Errors
///
/// - [`Error::Decode`](crate::Error::Decode) for invalid YAML
/// - a syntax [`CompileError`] if the document is not a mapping, or uses
///   keys that are not text or numbers
pub fn parse_source(source: &str) -> Result<IndexMap<String, RawValue>> {
    let normalized = source.replace('\t', "  ");
    if normalized.trim().is_empty() {
        return Ok(IndexMap::new());
    }
    let document: Value = serde_yaml::from_str(&normalized)?;

    let rules = match document {
        Value::Mapping(mapping) => convert_mapping(mapping)?,
        // an empty document is an empty rule set
        Value::Null => RawObject::new(),
        other => {
            return Err(syntax(format!(
                "a rule file must be a mapping of rule names to bodies, found {}",
                value_kind(&other)
            ))
            .into())
        }
    };
    debug!(rules = rules.len(), "source decoded");
    Ok(rules)
}

fn convert(value: Value) -> std::result::Result<RawValue, CompileError> {
    Ok(match value {
        Value::Null => RawValue::Scalar(Scalar::Null),
        Value::Bool(b) => RawValue::Scalar(Scalar::Bool(b)),
        Value::Number(n) => RawValue::Scalar(Scalar::Number(n.as_f64().unwrap_or(f64::NAN))),
        Value::String(s) => RawValue::Scalar(Scalar::String(s)),
        Value::Sequence(items) => {
            RawValue::Sequence(items.into_iter().map(convert).collect::<std::result::Result<_, _>>()?)
        }
        Value::Mapping(mapping) => RawValue::Object(convert_mapping(mapping)?),
        Value::Tagged(tagged) => convert(tagged.value)?,
    })
}

fn convert_mapping(mapping: serde_yaml::Mapping) -> std::result::Result<RawObject, CompileError> {
    let mut object = RawObject::with_capacity(mapping.len());
    for (key, value) in mapping {
        let key = match key {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => String::from(if b { "yes" } else { "no" }),
            other => {
                return Err(syntax(format!(
                    "mapping keys must be text, found {}",
                    value_kind(&other)
                )))
            }
        };
        object.insert(key, convert(value)?);
    }
    Ok(object)
}

fn syntax(message: String) -> CompileError {
    CompileError::new(ErrorKind::Syntax, None, message)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
