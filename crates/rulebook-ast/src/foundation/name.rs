//! Dotted names for hierarchical rule identifiers
//!
//! Rule names are namespaced by their position in the rule tree:
//! - `salary . gross`
//! - `salary . contributions . pension`
//! - `net salary . income tax . rate`
//!
//! Segments may contain spaces, so the canonical separator is ` . `.
//! Parsing is lenient and also accepts a bare `.` between segments.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical separator between name segments.
pub const SEPARATOR: &str = " . ";

/// A hierarchical, fully or partially qualified rule name.
///
/// Names are immutable and cheap to compare and hash. They key the rule map
/// and describe the lexical scope used during reference resolution.
///
/// # Examples
///
/// ```
/// # use rulebook_ast::foundation::DottedName;
/// let name = DottedName::parse("salary . gross");
/// assert_eq!(name.segments(), &["salary", "gross"]);
/// assert_eq!(name.to_string(), "salary . gross");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct DottedName {
    segments: Vec<String>,
}

impl DottedName {
    /// Create a name from already-split segments.
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// The empty name, i.e. the root namespace.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a name, trimming each segment and dropping empty ones.
    pub fn parse(s: &str) -> Self {
        Self {
            segments: s
                .split('.')
                .map(str::trim)
                .filter(|segment| !segment.is_empty())
                .map(String::from)
                .collect(),
        }
    }

    /// Get the name segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Get the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if this is the root name.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a single segment to create a child name.
    pub fn append(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self::new(segments)
    }

    /// Nest `other` under this name: `a . b` joined with `c . d` is `a . b . c . d`.
    pub fn join(&self, other: &DottedName) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self::new(segments)
    }

    /// Get the parent name (all segments except the last).
    ///
    /// Returns None for the root. The parent of a single-segment name is the root.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            None
        } else {
            Some(Self::new(self.segments[..self.segments.len() - 1].to_vec()))
        }
    }

    /// Check if this name lies in the namespace of `prefix` (or equals it).
    pub fn starts_with(&self, prefix: &DottedName) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Check if the trailing segments of this name equal `suffix`.
    pub fn ends_with(&self, suffix: &DottedName) -> bool {
        !suffix.is_empty() && self.segments.ends_with(&suffix.segments)
    }

    /// The scope chain from this name outward to the root, innermost first.
    ///
    /// `a . b` yields `a . b`, `a`, and the root.
    pub fn scopes(&self) -> impl Iterator<Item = DottedName> + '_ {
        (0..=self.segments.len())
            .rev()
            .map(move |len| Self::new(self.segments[..len].to_vec()))
    }
}

impl fmt::Display for DottedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join(SEPARATOR))
    }
}

impl From<&str> for DottedName {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for DottedName {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<DottedName> for String {
    fn from(name: DottedName) -> Self {
        name.to_string()
    }
}

impl PartialEq<&str> for DottedName {
    fn eq(&self, other: &&str) -> bool {
        *self == DottedName::parse(other)
    }
}
