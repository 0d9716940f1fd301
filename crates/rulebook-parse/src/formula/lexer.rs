//! Lexical analysis for formula strings.
//!
//! # Design
//!
//! - `Token`: operators, delimiters, literals and words
//! - Whitespace is skipped; word boundaries survive through token spans, so
//!   multi-word names are reassembled by the parser from the source text
//! - `yes`, `no` and `null` lex as ordinary words and are interpreted by the
//!   parser, so names such as `no claim bonus` stay valid
//!
//! # Examples
//!
//! ```
//! # use rulebook_parse::formula::Token;
//! # use logos::Logos;
//! let tokens: Vec<_> = Token::lexer("gross salary * 10%").filter_map(Result::ok).collect();
//! assert_eq!(tokens.len(), 5);
//! ```

use logos::Logos;
use std::fmt;

/// Formula token.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    // === Operators ===
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("=")]
    Eq,
    #[token("!=")]
    BangEq,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    /// Name segment separator
    #[token(".")]
    Dot,
    /// Percent suffix on number literals
    #[token("%")]
    Percent,

    // === Literals ===
    /// Number literal (e.g. 12, 0.5)
    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    /// Quoted string literal, single or double quotes, no escapes
    #[regex(r"'[^']*'", |lex| strip_quotes(lex.slice()))]
    #[regex(r#""[^"]*""#, |lex| strip_quotes(lex.slice()))]
    Str(String),

    /// One word of a (possibly multi-word) rule name
    #[regex(r"[\p{L}_$][\p{L}\p{N}_'’$-]*", |lex| lex.slice().to_string())]
    Word(String),
}

fn strip_quotes(s: &str) -> String {
    s[1..s.len() - 1].to_string()
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::Lt => f.write_str("<"),
            Token::LtEq => f.write_str("<="),
            Token::Gt => f.write_str(">"),
            Token::GtEq => f.write_str(">="),
            Token::Eq => f.write_str("="),
            Token::BangEq => f.write_str("!="),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Dot => f.write_str("."),
            Token::Percent => f.write_str("%"),
            Token::Number(n) => write!(f, "{}", n),
            Token::Str(s) => write!(f, "'{}'", s),
            Token::Word(w) => f.write_str(w),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        Token::lexer(source).filter_map(|result| result.ok()).collect()
    }

    #[test]
    fn test_operators_prefer_longest_match() {
        assert_eq!(
            lex("a <= b != c"),
            vec![
                Token::Word("a".into()),
                Token::LtEq,
                Token::Word("b".into()),
                Token::BangEq,
                Token::Word("c".into()),
            ]
        );
    }

    #[test]
    fn test_numbers_and_percent() {
        assert_eq!(
            lex("0.5 + 10%"),
            vec![
                Token::Number(0.5),
                Token::Plus,
                Token::Number(10.0),
                Token::Percent,
            ]
        );
    }

    #[test]
    fn test_words_accept_accents_and_apostrophes() {
        assert_eq!(
            lex("prime d'activité . montant"),
            vec![
                Token::Word("prime".into()),
                Token::Word("d'activité".into()),
                Token::Dot,
                Token::Word("montant".into()),
            ]
        );
    }

    #[test]
    fn test_quoted_strings() {
        assert_eq!(
            lex("status = 'full time'"),
            vec![
                Token::Word("status".into()),
                Token::Eq,
                Token::Str("full time".into()),
            ]
        );
    }

    #[test]
    fn test_unknown_character_is_error() {
        let results: Vec<_> = Token::lexer("a & b").collect();
        assert!(results.iter().any(|r| r.is_err()));
    }
}
