//! Caller-supplied compile configuration.

use std::fmt;

/// Options shared by every rule built during one compile.
///
/// # Examples
///
/// ```
/// # use rulebook_parse::CompileOptions;
/// let options = CompileOptions::default().with_unit_label(|unit| unit.trim().to_lowercase());
/// assert_eq!((options.unit_label)(" EUR "), "eur");
/// ```
#[derive(Clone, Copy)]
pub struct CompileOptions {
    /// Normalizes the text of `unit` annotations
    pub unit_label: fn(&str) -> String,
}

fn identity_label(unit: &str) -> String {
    unit.to_string()
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            unit_label: identity_label,
        }
    }
}

impl CompileOptions {
    pub fn with_unit_label(mut self, unit_label: fn(&str) -> String) -> Self {
        self.unit_label = unit_label;
        self
    }
}

impl fmt::Debug for CompileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileOptions").finish_non_exhaustive()
    }
}
