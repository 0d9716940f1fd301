//! Rule roots.

use super::node::Node;
use crate::foundation::DottedName;
use crate::raw::RawValue;
use serde::{Deserialize, Serialize};

/// A compiled rule: metadata plus its root expression.
///
/// The rule map is keyed by `name`; every node of `expression` carries `name`
/// (or the name of an inline rule nested under it) as its context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleNode {
    pub name: DottedName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acronym: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Desugared source body, kept for tooling
    pub raw: RawValue,
    pub expression: Node,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replacements: Vec<ReplacementDecl>,
}

/// One `replaces` entry as authored on a rule.
///
/// `replaced`, `whitelist` and `blacklist` hold fake references: they name
/// rules without making the declaring rule depend on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplacementDecl {
    pub replaced: Node,
    /// Legacy explicit replacement value; `None` means the declaring rule itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub whitelist: Vec<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blacklist: Vec<Node>,
}

impl RuleNode {
    pub fn new(name: DottedName, raw: RawValue, expression: Node) -> Self {
        Self {
            name,
            title: None,
            acronym: None,
            description: None,
            raw,
            expression,
            replacements: Vec::new(),
        }
    }

    /// Rebuild every expression tree of this rule (root expression and
    /// replacement declarations) through `f`.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`; the rule is consumed either way.
    pub fn try_map_nodes<F, E>(self, f: &mut F) -> Result<Self, E>
    where
        F: FnMut(Node) -> Result<Node, E>,
    {
        let expression = self.expression.try_map(f)?;
        let replacements = self
            .replacements
            .into_iter()
            .map(|decl| {
                Ok(ReplacementDecl {
                    replaced: decl.replaced.try_map(f)?,
                    by: decl.by.map(|by| by.try_map(f)).transpose()?,
                    whitelist: decl
                        .whitelist
                        .into_iter()
                        .map(|n| n.try_map(f))
                        .collect::<Result<_, E>>()?,
                    blacklist: decl
                        .blacklist
                        .into_iter()
                        .map(|n| n.try_map(f))
                        .collect::<Result<_, E>>()?,
                })
            })
            .collect::<Result<_, E>>()?;
        Ok(Self {
            expression,
            replacements,
            ..self
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_map_nodes_covers_replacements() {
        let name = DottedName::parse("r");
        let mut rule = RuleNode::new(name.clone(), RawValue::null(), Node::reference("a", name.clone()));
        rule.replacements.push(ReplacementDecl {
            replaced: Node::fake_reference("b", name.clone()),
            by: None,
            whitelist: vec![Node::fake_reference("c", name.clone())],
            blacklist: Vec::new(),
        });

        let mut visited = Vec::new();
        let rule = rule
            .try_map_nodes::<_, ()>(&mut |node| {
                if let Some(r) = node.as_reference() {
                    visited.push(r.name.clone());
                }
                Ok(node)
            })
            .unwrap();
        assert_eq!(visited, vec!["a", "b", "c"]);
        assert_eq!(rule.replacements.len(), 1);
    }
}
