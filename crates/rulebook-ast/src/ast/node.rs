//! Expression nodes.
//!
//! Every mechanism of the rules language lowers to exactly one [`NodeKind`]
//! variant. The set is closed: adding a mechanism means adding a variant, and
//! every exhaustive `match` over `NodeKind` (construction, resolution,
//! nullability) then fails to compile until it handles the new kind.

use crate::foundation::{DottedName, SourceMap};
use crate::raw::Scalar;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A node of a rule's expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Mechanism-specific payload
    pub kind: NodeKind,
    /// Rule in which this node was authored; drives reference resolution
    pub context: DottedName,
    /// Provenance for nodes synthesized from another mechanism
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_map: Option<SourceMap>,
}

/// Closed set of node kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mechanism", rename_all = "snake_case")]
pub enum NodeKind {
    // === Aggregation / arithmetic ===
    Sum {
        terms: Vec<Node>,
    },
    Product {
        base: Box<Node>,
        rate: Box<Node>,
        factor: Box<Node>,
        ceiling: Option<Box<Node>>,
    },
    /// Marginal rate scale (each bracket's rate applies to its slice)
    Scale(Brackets),
    /// Amount grid (the bracket containing the base gives the amount)
    Grid(Brackets),
    /// Rate interpolated linearly between bracket ceilings
    ProgressiveRate(Brackets),
    Duration {
        from: Option<Box<Node>>,
        to: Option<Box<Node>>,
    },
    Max {
        terms: Vec<Node>,
    },
    Min {
        terms: Vec<Node>,
    },

    // === Applicability gates ===
    ApplicableIf {
        condition: Box<Node>,
        value: Box<Node>,
    },
    NotApplicableIf {
        condition: Box<Node>,
        value: Box<Node>,
    },

    // === Leaves and operators ===
    Constant {
        value: Scalar,
    },
    Operation {
        operator: Operator,
        left: Box<Node>,
        right: Box<Node>,
    },
    Reference(Reference),

    // === Evaluation control ===
    Inversion {
        targets: Vec<Node>,
    },
    Default {
        value: Box<Node>,
        default: Box<Node>,
    },
    Recalcul {
        rule: Option<Box<Node>>,
        amendments: Vec<Amendment>,
    },
    ReplacementTarget {
        original: Box<Node>,
        candidates: Vec<ReplacementCandidate>,
    },
    CircularResolution {
        value: Box<Node>,
    },
    Synchronisation {
        data: Box<Node>,
        path: Vec<String>,
    },
    SituationLookup {
        key: DottedName,
        value: Box<Node>,
    },

    // === Conditions ===
    AllOf {
        conditions: Vec<Node>,
    },
    AnyOf {
        conditions: Vec<Node>,
    },
    OneOf {
        choices: Vec<Node>,
        mandatory: bool,
    },
    Variations {
        branches: Vec<Branch>,
    },

    // === Value adjustments ===
    Deduction {
        base: Box<Node>,
        deduction: Box<Node>,
    },
    Rounding {
        value: Box<Node>,
        precision: Box<Node>,
    },
    Ceiling {
        value: Box<Node>,
        ceiling: Box<Node>,
    },
    Floor {
        value: Box<Node>,
        floor: Box<Node>,
    },
    Unit {
        unit: String,
        operand: Box<Node>,
    },
}

/// Shared shape of scale-like mechanisms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brackets {
    pub base: Box<Node>,
    pub multiplier: Option<Box<Node>>,
    pub brackets: Vec<Bracket>,
}

/// One bracket: a rate (or amount) applying up to an optional ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub value: Node,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ceiling: Option<Node>,
}

/// A guarded branch of `variations`; `condition: None` is the `else` branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Node>,
    pub consequence: Node,
}

/// A `recalcul` override: evaluate with `target` set to `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amendment {
    pub target: Node,
    pub value: Node,
}

/// A replacement that may stand in for a reference when its rule applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplacementCandidate {
    /// Reference to the replacing rule; the candidate is used when it applies
    pub applicable: Node,
    /// Value substituted for the original reference
    pub value: Node,
}

/// Use of a rule name inside an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    /// Name as written by the author, relative to the node's context
    pub name: String,
    /// Fully qualified target, set by reference resolution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dotted_name: Option<DottedName>,
    /// Target title, denormalized at resolution time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Target acronym, denormalized at resolution time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acronym: Option<String>,
    /// Names a rule without depending on its value (no graph edge)
    #[serde(default)]
    pub fake: bool,
}

impl Reference {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dotted_name: None,
            title: None,
            acronym: None,
            fake: false,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.dotted_name.is_some()
    }
}

/// Binary operators of formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Eq => "=",
            Operator::Ne => "!=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl NodeKind {
    /// Authored mechanism name, used in diagnostics.
    pub fn mechanism_name(&self) -> &'static str {
        match self {
            NodeKind::Sum { .. } => "sum",
            NodeKind::Product { .. } => "product",
            NodeKind::Scale(_) => "scale",
            NodeKind::Grid(_) => "grid",
            NodeKind::ProgressiveRate(_) => "progressive rate",
            NodeKind::Duration { .. } => "duration",
            NodeKind::Max { .. } => "max of",
            NodeKind::Min { .. } => "min of",
            NodeKind::ApplicableIf { .. } => "applicable if",
            NodeKind::NotApplicableIf { .. } => "not applicable if",
            NodeKind::Constant { .. } => "constant",
            NodeKind::Operation { .. } => "operation",
            NodeKind::Reference(_) => "reference",
            NodeKind::Inversion { .. } => "inversion",
            NodeKind::Default { .. } => "default",
            NodeKind::Recalcul { .. } => "recalcul",
            NodeKind::ReplacementTarget { .. } => "replacement",
            NodeKind::CircularResolution { .. } => "resolve circular reference",
            NodeKind::Synchronisation { .. } => "synchronisation",
            NodeKind::SituationLookup { .. } => "situation",
            NodeKind::AllOf { .. } => "all of",
            NodeKind::AnyOf { .. } => "any of",
            NodeKind::OneOf { .. } => "one of",
            NodeKind::Variations { .. } => "variations",
            NodeKind::Deduction { .. } => "deduction",
            NodeKind::Rounding { .. } => "rounding",
            NodeKind::Ceiling { .. } => "ceiling",
            NodeKind::Floor { .. } => "floor",
            NodeKind::Unit { .. } => "unit",
        }
    }
}

impl Node {
    pub fn new(kind: NodeKind, context: DottedName) -> Self {
        Self {
            kind,
            context,
            source_map: None,
        }
    }

    pub fn with_source_map(mut self, source_map: SourceMap) -> Self {
        self.source_map = Some(source_map);
        self
    }

    pub fn constant(value: Scalar, context: DottedName) -> Self {
        Self::new(NodeKind::Constant { value }, context)
    }

    pub fn number(value: f64, context: DottedName) -> Self {
        Self::constant(Scalar::Number(value), context)
    }

    pub fn null(context: DottedName) -> Self {
        Self::constant(Scalar::Null, context)
    }

    pub fn reference(name: impl Into<String>, context: DottedName) -> Self {
        Self::new(NodeKind::Reference(Reference::new(name)), context)
    }

    /// A reference that names a rule without creating a dependency on it.
    pub fn fake_reference(name: impl Into<String>, context: DottedName) -> Self {
        let mut reference = Reference::new(name);
        reference.fake = true;
        Self::new(NodeKind::Reference(reference), context)
    }

    pub fn operation(operator: Operator, left: Node, right: Node, context: DottedName) -> Self {
        Self::new(
            NodeKind::Operation {
                operator,
                left: Box::new(left),
                right: Box::new(right),
            },
            context,
        )
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match &self.kind {
            NodeKind::Reference(reference) => Some(reference),
            _ => None,
        }
    }
}
