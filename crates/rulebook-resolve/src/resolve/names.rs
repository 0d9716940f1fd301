//! Name disambiguation.
//!
//! Maps the literal name written in a reference to the fully qualified name
//! of an existing rule.
//!
//! # Resolution Order
//!
//! 1. **Scope chain**: for each enclosing namespace `P` of the context, from
//!    the context itself out to the root, try `P . literal`. First hit wins.
//! 2. **Suffix search**: otherwise, every rule whose trailing segments equal
//!    the literal is a candidate. Exactly one candidate resolves.
//!
//! # Examples
//!
//! ```
//! # use indexmap::IndexMap;
//! # use rulebook_ast::foundation::DottedName;
//! # use rulebook_resolve::resolve::names::disambiguate;
//! let mut rules = IndexMap::new();
//! rules.insert(DottedName::parse("salary"), ());
//! rules.insert(DottedName::parse("salary . gross"), ());
//! rules.insert(DottedName::parse("tax . rate"), ());
//!
//! let context = DottedName::parse("salary . net");
//! assert_eq!(
//!     disambiguate(&rules, &context, "gross").unwrap(),
//!     DottedName::parse("salary . gross"),
//! );
//! // no enclosing scope defines `rate`, a unique suffix does
//! assert_eq!(
//!     disambiguate(&rules, &context, "rate").unwrap(),
//!     DottedName::parse("tax . rate"),
//! );
//! ```

use indexmap::IndexMap;
use rulebook_ast::error::{CompileError, ErrorKind};
use rulebook_ast::foundation::DottedName;

/// Resolve `literal`, written inside rule `context`, against the rule names.
///
/// # Errors
///
/// - [`ErrorKind::AmbiguousName`] if several rules match by suffix; the
///   candidates are listed in the notes
/// - [`ErrorKind::UndefinedName`] if nothing matches
pub fn disambiguate<V>(
    rules: &IndexMap<DottedName, V>,
    context: &DottedName,
    literal: &str,
) -> Result<DottedName, CompileError> {
    let wanted = DottedName::parse(literal);
    if wanted.is_empty() {
        return Err(undefined(context, literal));
    }

    for scope in context.scopes() {
        let candidate = scope.join(&wanted);
        if rules.contains_key(&candidate) {
            return Ok(candidate);
        }
    }

    let mut matches = rules.keys().filter(|name| name.ends_with(&wanted));
    match (matches.next(), matches.next()) {
        (Some(found), None) => Ok(found.clone()),
        (Some(first), Some(second)) => {
            let mut error = CompileError::new(
                ErrorKind::AmbiguousName,
                Some(context.clone()),
                format!(
                    "reference `{}` in `{}` matches several rules",
                    literal, context
                ),
            );
            for candidate in [first, second].into_iter().chain(matches) {
                error = error.with_note(format!("candidate: `{}`", candidate));
            }
            Err(error)
        }
        (None, _) => Err(undefined(context, literal)),
    }
}

fn undefined(context: &DottedName, literal: &str) -> CompileError {
    CompileError::new(
        ErrorKind::UndefinedName,
        Some(context.clone()),
        format!("unresolved reference `{}` in `{}`", literal, context),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(names: &[&str]) -> IndexMap<DottedName, ()> {
        names.iter().map(|n| (DottedName::parse(n), ())).collect()
    }

    #[test]
    fn test_innermost_scope_wins() {
        let rules = rules(&["rate", "tax . rate", "tax . income . rate", "tax . income"]);
        let context = DottedName::parse("tax . income");
        assert_eq!(
            disambiguate(&rules, &context, "rate").unwrap(),
            DottedName::parse("tax . income . rate")
        );
        let context = DottedName::parse("tax . other");
        assert_eq!(
            disambiguate(&rules, &context, "rate").unwrap(),
            DottedName::parse("tax . rate")
        );
    }

    #[test]
    fn test_absolute_name_resolves_at_root() {
        let rules = rules(&["a . b", "c"]);
        let context = DottedName::parse("c");
        assert_eq!(
            disambiguate(&rules, &context, "a . b").unwrap(),
            DottedName::parse("a . b")
        );
    }

    #[test]
    fn test_ambiguous_suffix_lists_candidates() {
        let rules = rules(&["employee . rate", "employer . rate", "total"]);
        let error = disambiguate(&rules, &DottedName::parse("total"), "rate").unwrap_err();
        assert_eq!(error.kind, ErrorKind::AmbiguousName);
        assert_eq!(error.notes.len(), 2);
        assert!(error.message.contains("rate") && error.message.contains("total"));
    }

    #[test]
    fn test_undefined_names_literal_and_context() {
        let rules = rules(&["a"]);
        let error = disambiguate(&rules, &DottedName::parse("a"), "missing").unwrap_err();
        assert_eq!(error.kind, ErrorKind::UndefinedName);
        assert_eq!(error.rule, Some(DottedName::parse("a")));
        assert!(error.message.contains("missing") && error.message.contains("`a`"));
    }
}
