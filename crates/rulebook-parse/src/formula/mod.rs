//! Infix formula parsing.
//!
//! Formulas are the string form of a value: `gross salary * 10% - deduction`.
//! They lower to `Operation`, `Constant` and `Reference` nodes.
//!
//! # Pipeline Position
//!
//! ```text
//! formula text -> Lexer (logos) -> TokenStream -> Pratt parser -> Node
//! ```
//!
//! # Examples
//!
//! ```
//! # use rulebook_parse::formula::parse_formula;
//! # use rulebook_ast::foundation::DottedName;
//! let node = parse_formula("(a + b) * 2", &DottedName::parse("total")).unwrap();
//! assert_eq!(node.kind.mechanism_name(), "operation");
//! ```

mod lexer;
mod pratt;
mod stream;

pub use lexer::Token;
pub use stream::TokenStream;

use logos::Logos;
use rulebook_ast::ast::Node;
use rulebook_ast::foundation::DottedName;
use std::fmt;

/// Formula parse failure with the byte offset where it occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaError {
    pub message: String,
    pub offset: usize,
}

impl FormulaError {
    fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }

    /// Create an "expected token" error.
    pub fn expected(expected: &Token, found: Option<&Token>, offset: usize) -> Self {
        let message = match found {
            Some(token) => format!("expected '{}', found '{}'", expected, token),
            None => format!("expected '{}', found end of formula", expected),
        };
        Self::new(message, offset)
    }

    /// Create an "unexpected token" error.
    pub fn unexpected(found: Option<&Token>, context: &str, offset: usize) -> Self {
        let message = match found {
            Some(token) => format!("unexpected '{}' {}", token, context),
            None => format!("unexpected end of formula {}", context),
        };
        Self::new(message, offset)
    }
}

impl fmt::Display for FormulaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.message, self.offset)
    }
}

impl std::error::Error for FormulaError {}

/// Parse a formula authored inside rule `context`.
///
/// # Errors
///
/// Returns [`FormulaError`] for unknown characters, empty input, unbalanced
/// parentheses and trailing tokens.
pub fn parse_formula(source: &str, context: &DottedName) -> Result<Node, FormulaError> {
    let mut tokens = Vec::new();
    for (result, span) in Token::lexer(source).spanned() {
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => {
                return Err(FormulaError::new(
                    format!("unexpected character '{}'", &source[span.clone()]),
                    span.start,
                ))
            }
        }
    }
    if tokens.is_empty() {
        return Err(FormulaError::new("empty formula", 0));
    }

    let mut stream = TokenStream::new(source, &tokens);
    let node = pratt::parse_pratt(&mut stream, 0, 0, context)?;
    if !stream.at_end() {
        return Err(FormulaError::unexpected(
            stream.peek(),
            "after expression",
            stream.offset(),
        ));
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulebook_ast::ast::{NodeKind, Operator};
    use rulebook_ast::raw::Scalar;

    fn parse(source: &str) -> Node {
        parse_formula(source, &DottedName::parse("r")).unwrap()
    }

    fn operation(node: &Node) -> (Operator, &Node, &Node) {
        match &node.kind {
            NodeKind::Operation {
                operator,
                left,
                right,
            } => (*operator, left, right),
            other => panic!("expected operation, got {}", other.mechanism_name()),
        }
    }

    fn reference_name(node: &Node) -> &str {
        &node.as_reference().expect("reference").name
    }

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        let node = parse("a + b * c");
        let (op, left, right) = operation(&node);
        assert_eq!(op, Operator::Add);
        assert_eq!(reference_name(left), "a");
        let (inner, _, _) = operation(right);
        assert_eq!(inner, Operator::Mul);
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        let node = parse("a - b - c");
        let (op, left, right) = operation(&node);
        assert_eq!(op, Operator::Sub);
        assert_eq!(reference_name(right), "c");
        assert_eq!(operation(left).0, Operator::Sub);
    }

    #[test]
    fn test_comparison_has_lowest_precedence() {
        let node = parse("a + 1 >= b * 2");
        let (op, left, right) = operation(&node);
        assert_eq!(op, Operator::Ge);
        assert_eq!(operation(left).0, Operator::Add);
        assert_eq!(operation(right).0, Operator::Mul);
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let node = parse("(a + b) * c");
        let (op, left, _) = operation(&node);
        assert_eq!(op, Operator::Mul);
        assert_eq!(operation(left).0, Operator::Add);
    }

    #[test]
    fn test_multi_word_dotted_reference() {
        let node = parse("net  salary .   income tax * 2");
        let (_, left, _) = operation(&node);
        assert_eq!(reference_name(left), "net salary . income tax");
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse("10%").kind, NodeKind::Constant { value: Scalar::Number(0.1) });
        assert_eq!(parse("-3").kind, NodeKind::Constant { value: Scalar::Number(-3.0) });
        assert_eq!(parse("yes").kind, NodeKind::Constant { value: Scalar::Bool(true) });
        assert_eq!(parse("no").kind, NodeKind::Constant { value: Scalar::Bool(false) });
        assert_eq!(parse("null").kind, NodeKind::Constant { value: Scalar::Null });
        assert_eq!(
            parse("'full time'").kind,
            NodeKind::Constant { value: Scalar::String("full time".into()) }
        );
    }

    #[test]
    fn test_word_containing_literal_stays_a_reference() {
        assert_eq!(reference_name(&parse("no claim bonus")), "no claim bonus");
    }

    #[test]
    fn test_unary_minus_on_reference() {
        let node = parse("-a");
        let (op, left, right) = operation(&node);
        assert_eq!(op, Operator::Mul);
        assert_eq!(left.kind, NodeKind::Constant { value: Scalar::Number(-1.0) });
        assert_eq!(reference_name(right), "a");
    }

    #[test]
    fn test_nodes_carry_context() {
        let node = parse_formula("a + 1", &DottedName::parse("x . y")).unwrap();
        let (_, left, _) = operation(&node);
        assert_eq!(left.context, DottedName::parse("x . y"));
    }

    #[test]
    fn test_errors() {
        let context = DottedName::parse("r");
        assert!(parse_formula("", &context).is_err());
        assert!(parse_formula("(a + b", &context).is_err());
        assert!(parse_formula("a +", &context).is_err());
        assert!(parse_formula("a b )", &context).is_err());
        assert!(parse_formula("a . ", &context).is_err());
        let error = parse_formula("a & b", &context).unwrap_err();
        assert_eq!(error.offset, 2);
    }

    #[test]
    fn test_nesting_is_bounded() {
        let context = DottedName::parse("r");
        let deep = format!("{}a{}", "(".repeat(20_000), ")".repeat(20_000));
        let error = parse_formula(&deep, &context).unwrap_err();
        assert!(error.message.contains("nested deeper"));
        assert_eq!(error.offset, pratt::MAX_NESTING);

        let negations = format!("{}a", "-".repeat(20_000));
        assert!(parse_formula(&negations, &context).is_err());

        let limit = pratt::MAX_NESTING;
        let at_limit = format!("{}a{}", "(".repeat(limit), ")".repeat(limit));
        assert_eq!(reference_name(&parse(&at_limit)), "a");
    }
}
