//! Raw, untyped rule source.
//!
//! Decoders (YAML text, in-memory maps) produce [`RawValue`] trees. All later
//! stages traverse this explicit recursive variant structurally; nothing
//! downstream inspects decoder-specific value types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered mapping used for raw objects and rule sets.
pub type RawObject = IndexMap<String, RawValue>;

/// A node of the authored rule tree: object, sequence, or scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Scalar(Scalar),
    Sequence(Vec<RawValue>),
    Object(RawObject),
}

/// Leaf values of the raw tree. Also the value domain of `Constant` nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }
}

impl RawValue {
    pub fn null() -> Self {
        RawValue::Scalar(Scalar::Null)
    }

    /// Build an object from key/value pairs, preserving their order.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, RawValue)>,
    {
        RawValue::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn as_object(&self) -> Option<&RawObject> {
        match self {
            RawValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[RawValue]> {
        match self {
            RawValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawValue::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RawValue::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Scalar(Scalar::Null))
    }

    /// Human-readable kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            RawValue::Object(_) => "object",
            RawValue::Sequence(_) => "list",
            RawValue::Scalar(Scalar::Null) => "null",
            RawValue::Scalar(Scalar::Bool(_)) => "boolean",
            RawValue::Scalar(Scalar::Number(_)) => "number",
            RawValue::Scalar(Scalar::String(_)) => "string",
        }
    }

    /// Render a string or number scalar as formula text.
    ///
    /// Numbers print without a trailing `.0` (`5.0` renders as `5`).
    pub fn as_formula_text(&self) -> Option<String> {
        match self {
            RawValue::Scalar(Scalar::String(s)) => Some(s.clone()),
            RawValue::Scalar(Scalar::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Scalar(Scalar::String(s.to_string()))
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Scalar(Scalar::String(s))
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Scalar(Scalar::Number(n))
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::Scalar(Scalar::Bool(b))
    }
}

impl From<Vec<RawValue>> for RawValue {
    fn from(items: Vec<RawValue>) -> Self {
        RawValue::Sequence(items)
    }
}
