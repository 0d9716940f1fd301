//! Token stream wrapper for the hand-written formula parser.

use super::{FormulaError, Token};
use std::ops::Range;

/// Token stream with lookahead and byte-offset tracking.
///
/// Each token is paired with its byte span in the formula source, so the
/// parser can slice multi-word names back out of the original text.
pub struct TokenStream<'src> {
    source: &'src str,
    tokens: &'src [(Token, Range<usize>)],
    pos: usize,
}

impl<'src> TokenStream<'src> {
    pub fn new(source: &'src str, tokens: &'src [(Token, Range<usize>)]) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
        }
    }

    /// Peek at the current token without consuming it.
    pub fn peek(&self) -> Option<&'src Token> {
        self.tokens.get(self.pos).map(|(tok, _)| tok)
    }

    /// Advance to the next token and return the current one.
    pub fn advance(&mut self) -> Option<&'src Token> {
        let token = self.tokens.get(self.pos).map(|(tok, _)| tok);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Check if the current token matches the expected token.
    pub fn check(&self, expected: &Token) -> bool {
        matches!(self.peek(), Some(t) if std::mem::discriminant(t) == std::mem::discriminant(expected))
    }

    /// Expect a specific token and advance if it matches.
    pub fn expect(&mut self, expected: Token) -> Result<(), FormulaError> {
        if self.check(&expected) {
            self.advance();
            Ok(())
        } else {
            Err(FormulaError::expected(&expected, self.peek(), self.offset()))
        }
    }

    /// Check if we've reached the end of the token stream.
    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Current position in the token stream.
    pub fn current_pos(&self) -> usize {
        self.pos
    }

    /// Byte offset of the current token, or the source length at the end.
    pub fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(_, span)| span.start)
            .unwrap_or(self.source.len())
    }

    /// Source text covered by tokens `start..self.pos`.
    pub fn slice_from(&self, start: usize) -> &'src str {
        match (self.tokens.get(start), self.pos.checked_sub(1).and_then(|i| self.tokens.get(i))) {
            (Some((_, first)), Some((_, last))) if start < self.pos => &self.source[first.start..last.end],
            _ => "",
        }
    }
}
