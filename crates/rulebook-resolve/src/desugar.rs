//! Desugaring pass - rewrites reference shorthand keys into canonical form
//!
//! This module implements the transformation that converts:
//! - `base [ref]: <value>` → `base: { name: base, value: <value> }`
//! - `base [ref gross salary]: <value>` → `base: { name: gross salary, value: <value> }`
//!
//! The canonical `{ name, value }` object declares an inline named rule; the
//! mechanism parser registers it under the enclosing rule and replaces it with
//! a reference.
//!
//! # Design
//!
//! Desugaring works on the raw tree, before any typed construction, so rule
//! builders never special-case the shorthand. The rewritten key keeps the
//! position of the shorthand key; all other keys keep their relative order.
//!
//! The pass is idempotent: its output contains no shorthand keys. A
//! rewritten key that collides with another key of the same object is a
//! syntax error.
//!
//! # Pipeline Position
//!
//! ```text
//! Decode → Desugar → Parse → Resolve → Order → Replace → Nullability
//!           ^^^^^^^
//!           YOU ARE HERE
//! ```

use indexmap::map::Entry;
use indexmap::IndexMap;
use rulebook_ast::error::CompileError;
use rulebook_ast::foundation::DottedName;
use rulebook_ast::raw::{RawObject, RawValue};

/// Desugar a raw value authored in rule `rule`, recursively.
///
/// # Errors
///
/// Returns a syntax error naming `rule` when a shorthand key rewrites to a
/// key already present in the same object, as in `{ base: 1, base [ref]: 2 }`.
pub fn desugar(value: RawValue, rule: &DottedName) -> Result<RawValue, CompileError> {
    Ok(match value {
        RawValue::Object(object) => RawValue::Object(desugar_object(object, rule)?),
        RawValue::Sequence(items) => RawValue::Sequence(
            items
                .into_iter()
                .map(|item| desugar(item, rule))
                .collect::<Result<_, _>>()?,
        ),
        scalar @ RawValue::Scalar(_) => scalar,
    })
}

/// Desugar every rule body of a rule set; rule names are left untouched.
///
/// # Errors
///
/// See [`desugar`].
pub fn desugar_rules(
    rules: IndexMap<String, RawValue>,
) -> Result<IndexMap<String, RawValue>, CompileError> {
    rules
        .into_iter()
        .map(|(name, body)| {
            let body = desugar(body, &DottedName::parse(&name))?;
            Ok((name, body))
        })
        .collect()
}

fn desugar_object(object: RawObject, rule: &DottedName) -> Result<RawObject, CompileError> {
    let mut out = RawObject::with_capacity(object.len());
    for (key, value) in object {
        let (key, value) = match parse_shorthand(&key) {
            Some((argument_type, argument_name)) => {
                let rewritten = RawValue::object([
                    ("name", RawValue::from(argument_name)),
                    ("value", desugar(value, rule)?),
                ]);
                (argument_type.to_string(), rewritten)
            }
            None => (key, desugar(value, rule)?),
        };
        match out.entry(key) {
            Entry::Occupied(entry) => {
                return Err(CompileError::syntax(
                    rule,
                    format!(
                        "key `{}` is defined both directly and through `[ref]` in rule `{}`",
                        entry.key(),
                        rule
                    ),
                ))
            }
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
        }
    }
    Ok(out)
}

/// Split `<type> [ref]` / `<type> [ref <name>]` into `(type, name)`.
///
/// The name defaults to the type.
fn parse_shorthand(key: &str) -> Option<(&str, &str)> {
    let body = key.trim().strip_suffix(']')?;
    let (argument_type, inner) = body.split_once('[')?;
    let argument_type = argument_type.trim();
    if argument_type.is_empty() {
        return None;
    }

    let rest = inner.trim().strip_prefix("ref")?;
    if rest.is_empty() {
        return Some((argument_type, argument_type));
    }
    // `ref` must be a whole word: `[reference]` is not shorthand
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    match rest.trim() {
        "" => Some((argument_type, argument_type)),
        name => Some((argument_type, name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulebook_ast::error::ErrorKind;

    fn yaml(source: &str) -> RawValue {
        serde_yaml::from_str(source).unwrap()
    }

    fn rule() -> DottedName {
        DottedName::parse("contribution")
    }

    #[test]
    fn test_parse_shorthand() {
        assert_eq!(parse_shorthand("base [ref]"), Some(("base", "base")));
        assert_eq!(parse_shorthand("base[ref]"), Some(("base", "base")));
        assert_eq!(
            parse_shorthand("base [ref gross salary]"),
            Some(("base", "gross salary"))
        );
        assert_eq!(parse_shorthand("base [reference]"), None);
        assert_eq!(parse_shorthand("[ref]"), None);
        assert_eq!(parse_shorthand("base"), None);
        assert_eq!(parse_shorthand("base [ref"), None);
    }

    #[test]
    fn test_rewrites_shorthand_in_place() {
        let value = desugar(
            yaml(
            r#"
title: Contribution
product [ref]:
  sum:
    - rate [ref employer rate]: 4%
unit: EUR
"#,
            ),
            &rule(),
        )
        .unwrap();
        let expected = yaml(
            r#"
title: Contribution
product:
  name: product
  value:
    sum:
      - rate:
          name: employer rate
          value: 4%
unit: EUR
"#,
        );
        assert_eq!(value, expected);
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["title", "product", "unit"]);
    }

    #[test]
    fn test_desugar_is_idempotent() {
        let inputs = [
            yaml(r#"base [ref]: { sum: [a, { "b [ref]": 2 }] }"#),
            yaml(r#"[1, { "x [ref y]": 3 }, null]"#),
            yaml("'a + b'"),
            yaml(r#"{ product: { base: salary, "rate [ref]": 10% } }"#),
        ];
        for input in inputs {
            let once = desugar(input, &rule()).unwrap();
            assert_eq!(desugar(once.clone(), &rule()).unwrap(), once);
        }
    }

    #[test]
    fn test_shorthand_colliding_with_plain_key_is_rejected() {
        for source in [
            r#"{ base: 1, "base [ref]": 2 }"#,
            r#"{ "base [ref]": 2, base: 1 }"#,
            r#"{ product: { "rate [ref]": 1, "rate [ref employer rate]": 2 } }"#,
            r#"[{ sum: [{ base: 1, "base [ref]": 2 }] }]"#,
        ] {
            let error = desugar(yaml(source), &rule()).unwrap_err();
            assert_eq!(error.kind, ErrorKind::Syntax, "{}", source);
            assert_eq!(error.rule, Some(rule()));
            assert!(error.message.contains("`base`") || error.message.contains("`rate`"));
        }
    }

    #[test]
    fn test_desugar_rules_names_the_failing_rule() {
        let rules: IndexMap<String, RawValue> =
            serde_yaml::from_str("ok: 1
bad:
  base: 1
  base [ref]: 2
").unwrap();
        let error = desugar_rules(rules).unwrap_err();
        assert_eq!(error.rule, Some(DottedName::parse("bad")));
    }
}
