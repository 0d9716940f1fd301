//! Provenance metadata attached to synthesized nodes.

use serde::{Deserialize, Serialize};

/// Records which authored mechanism produced a node.
///
/// Expanded mechanisms (e.g. `components`) lower to ordinary node kinds; the
/// source map keeps the original mechanism name for diagnostics and tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMap {
    /// Name of the authored mechanism, e.g. `components`.
    pub mechanism: String,
    /// Mechanism key the expansion was nested under, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_key: Option<String>,
}

impl SourceMap {
    pub fn new(mechanism: impl Into<String>) -> Self {
        Self {
            mechanism: mechanism.into(),
            origin_key: None,
        }
    }

    pub fn with_origin_key(mut self, key: impl Into<String>) -> Self {
        self.origin_key = Some(key.into());
        self
    }
}
