//! Itemized `components` expansion.
//!
//! A scale-like mechanism may list its variants as components sharing
//! factored keys:
//!
//! ```yaml
//! product:
//!   rate: 10%
//!   components:
//!     - base: salary
//!     - base: bonus
//!       applicable if: eligible
//! ```
//!
//! Each component becomes one summand of a `sum`. The component's attribute
//! keys wrap the summand; every other key overrides the factored key of the
//! same name.
//!
//! # Examples
//!
//! ```
//! # use rulebook_parse::mechanisms::components::expand_components;
//! # use rulebook_ast::foundation::DottedName;
//! # use rulebook_ast::raw::RawValue;
//! let object = RawValue::object([
//!     ("rate", RawValue::from(0.1)),
//!     ("components", RawValue::from(vec![RawValue::object([("base", RawValue::from("a"))])])),
//! ]);
//! let summands =
//!     expand_components("product", object.as_object().unwrap(), &DottedName::parse("r")).unwrap();
//! assert_eq!(summands.len(), 1);
//! ```

use super::RuleParser;
use rulebook_ast::ast::{Node, NodeKind};
use rulebook_ast::error::CompileError;
use rulebook_ast::foundation::{DottedName, SourceMap};
use rulebook_ast::raw::{RawObject, RawValue};

/// Component keys applied to the summand rather than merged into its value.
pub const COMPONENT_ATTRIBUTES: &[&str] = &[
    "applicable if",
    "not applicable if",
    "title",
    "description",
];

/// Expand `object` (factored keys plus `components`) into raw summands.
///
/// Each summand is `{ ...attributes, value: { key: factored ⊕ overrides } }`;
/// override keys replace factored keys in place.
///
/// # Errors
///
/// - `components` is not a list
/// - a component is not an object
pub fn expand_components(
    key: &str,
    object: &RawObject,
    context: &DottedName,
) -> Result<Vec<RawValue>, CompileError> {
    let components = object
        .get("components")
        .and_then(RawValue::as_sequence)
        .ok_or_else(|| {
            CompileError::syntax(context, format!("`components` of `{}` must be a list", key))
        })?;

    let mut factored = object.clone();
    factored.shift_remove("components");

    components
        .iter()
        .map(|component| {
            let component = component.as_object().ok_or_else(|| {
                CompileError::syntax(
                    context,
                    format!(
                        "each component of `{}` must be an object, found {}",
                        key,
                        component.kind_name()
                    ),
                )
            })?;

            let mut summand = RawObject::new();
            let mut merged = factored.clone();
            for (name, value) in component {
                if COMPONENT_ATTRIBUTES.contains(&name.as_str()) {
                    summand.insert(name.clone(), value.clone());
                } else {
                    merged.insert(name.clone(), value.clone());
                }
            }
            summand.insert(
                "value".to_string(),
                RawValue::object([(key, RawValue::Object(merged))]),
            );
            Ok(RawValue::Object(summand))
        })
        .collect()
}

impl RuleParser<'_> {
    pub(crate) fn parse_components(
        &mut self,
        key: &str,
        object: &RawObject,
        context: &DottedName,
    ) -> Result<Node, CompileError> {
        let terms = expand_components(key, object, context)?
            .iter()
            .map(|summand| self.parse_value(summand, context))
            .collect::<Result<_, _>>()?;
        Ok(Node::new(NodeKind::Sum { terms }, context.clone())
            .with_source_map(SourceMap::new("components").with_origin_key(key)))
    }
}
