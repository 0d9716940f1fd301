//! Pratt parser core - precedence climbing for binary and unary operators.

use super::{FormulaError, Token, TokenStream};
use rulebook_ast::ast::{Node, NodeKind, Operator};
use rulebook_ast::foundation::{DottedName, SEPARATOR};
use rulebook_ast::raw::Scalar;

/// Maximum depth of parentheses and unary minus in one formula.
pub(super) const MAX_NESTING: usize = 128;

/// Get binary operator metadata (precedence and operator).
///
/// Higher precedence binds tighter. Every formula operator is left-associative.
fn binary_op_info(token: &Token) -> Option<(u8, Operator)> {
    match token {
        Token::Eq => Some((10, Operator::Eq)),
        Token::BangEq => Some((10, Operator::Ne)),
        Token::Lt => Some((10, Operator::Lt)),
        Token::LtEq => Some((10, Operator::Le)),
        Token::Gt => Some((10, Operator::Gt)),
        Token::GtEq => Some((10, Operator::Ge)),
        Token::Plus => Some((20, Operator::Add)),
        Token::Minus => Some((20, Operator::Sub)),
        Token::Star => Some((30, Operator::Mul)),
        Token::Slash => Some((30, Operator::Div)),
        _ => None,
    }
}

/// Pratt parser - handles binary operators with precedence climbing.
pub(super) fn parse_pratt(
    stream: &mut TokenStream,
    min_prec: u8,
    depth: usize,
    context: &DottedName,
) -> Result<Node, FormulaError> {
    let mut left = parse_prefix(stream, depth, context)?;

    while let Some(token) = stream.peek() {
        let Some((prec, operator)) = binary_op_info(token) else {
            break;
        };
        if prec < min_prec {
            break;
        }
        stream.advance();

        let right = parse_pratt(stream, prec + 1, depth, context)?;
        left = Node::operation(operator, left, right, context.clone());
    }

    Ok(left)
}

/// Parse prefix expressions (unary minus, parentheses, atoms).
fn parse_prefix(
    stream: &mut TokenStream,
    depth: usize,
    context: &DottedName,
) -> Result<Node, FormulaError> {
    let offset = stream.offset();
    match stream.peek() {
        Some(Token::Minus) => {
            stream.advance();
            let operand = parse_prefix(stream, nested(depth, offset)?, context)?;
            Ok(negate(operand, context))
        }
        Some(Token::LParen) => {
            stream.advance();
            let inner = parse_pratt(stream, 0, nested(depth, offset)?, context)?;
            stream.expect(Token::RParen)?;
            Ok(inner)
        }
        Some(Token::Number(n)) => {
            stream.advance();
            let value = if stream.check(&Token::Percent) {
                stream.advance();
                n / 100.0
            } else {
                *n
            };
            Ok(Node::number(value, context.clone()))
        }
        Some(Token::Str(s)) => {
            stream.advance();
            Ok(Node::constant(Scalar::String(s.clone()), context.clone()))
        }
        Some(Token::Word(_)) => parse_name(stream, context),
        other => Err(FormulaError::unexpected(other, "expression", offset)),
    }
}

fn nested(depth: usize, offset: usize) -> Result<usize, FormulaError> {
    if depth >= MAX_NESTING {
        return Err(FormulaError::new(
            format!("formula nested deeper than {} levels", MAX_NESTING),
            offset,
        ));
    }
    Ok(depth + 1)
}

/// Negative literals fold into constants; anything else becomes `-1 * x`.
fn negate(operand: Node, context: &DottedName) -> Node {
    match operand.kind {
        NodeKind::Constant {
            value: Scalar::Number(n),
        } => Node::number(-n, context.clone()),
        _ => Node::operation(
            Operator::Mul,
            Node::number(-1.0, context.clone()),
            operand,
            context.clone(),
        ),
    }
}

/// Parse a rule name: words (and digits) separated by spaces and `.`.
///
/// A lone `yes`, `no` or `null` is a literal rather than a name.
fn parse_name(stream: &mut TokenStream, context: &DottedName) -> Result<Node, FormulaError> {
    let start = stream.current_pos();
    stream.advance();

    loop {
        match stream.peek() {
            Some(Token::Word(_)) | Some(Token::Number(_)) => {
                stream.advance();
            }
            Some(Token::Dot) => {
                stream.advance();
                let offset = stream.offset();
                match stream.advance() {
                    Some(Token::Word(_)) => {}
                    other => return Err(FormulaError::unexpected(other, "after '.'", offset)),
                }
            }
            _ => break,
        }
    }

    let name = normalize_name(stream.slice_from(start));
    let literal = match name.as_str() {
        "yes" => Some(Scalar::Bool(true)),
        "no" => Some(Scalar::Bool(false)),
        "null" => Some(Scalar::Null),
        _ => None,
    };
    Ok(match literal {
        Some(value) => Node::constant(value, context.clone()),
        None => Node::reference(name, context.clone()),
    })
}

/// Collapse runs of whitespace inside segments and use the canonical separator.
fn normalize_name(text: &str) -> String {
    text.split('.')
        .map(|segment| segment.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}
