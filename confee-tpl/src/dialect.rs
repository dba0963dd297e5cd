//! Token set for the template scripting dialects
//!
//! One logos lexer serves both halves of the engine: the transpiler consumes
//! the richer, annotated dialect (type annotations, `as` casts) and the
//! evaluator consumes the plain executable dialect. Whitespace is skipped by
//! the lexer; callers that need to reconstruct source text (the transpiler)
//! use the token spans to copy inter-token gaps from the original.

use logos::Logos;
use std::ops::Range;

/// A single token of the scripting dialect.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Tok {
    #[regex(r"//[^\n]*")]
    LineComment,
    #[regex(r"/\*[^*]*\*+([^/*][^*]*\*+)*/")]
    BlockComment,

    // Single- and double-quoted strings are single-line; template strings
    // may span lines.
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"'([^'\\\n]|\\.)*'")]
    Str,
    #[regex(r"`([^`\\]|\\.)*`")]
    TemplateStr,

    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Num,

    // Keywords are recognized from the slice; `var`, `const`, `if`, … all
    // lex as Ident.
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    #[token("===")]
    StrictEq,
    #[token("!==")]
    StrictNotEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("=>")]
    Arrow,
    #[token("+=")]
    PlusAssign,
    #[token("=")]
    Assign,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Bang,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
}

impl Tok {
    /// Trivia tokens carry no meaning for parsing or transformation.
    pub fn is_trivia(&self) -> bool {
        matches!(self, Tok::LineComment | Tok::BlockComment)
    }
}

/// Lexing failure for a dialect block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialectError {
    /// A string literal opened but never closed.
    UnterminatedString { offset: usize },
    /// A character outside the dialect's alphabet.
    UnexpectedCharacter { offset: usize },
}

impl std::fmt::Display for DialectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DialectError::UnterminatedString { offset } => {
                write!(f, "unterminated string literal at offset {}", offset)
            }
            DialectError::UnexpectedCharacter { offset } => {
                write!(f, "unexpected character at offset {}", offset)
            }
        }
    }
}

impl std::error::Error for DialectError {}

/// Tokenize one dialect block, keeping source spans.
///
/// Whitespace is dropped; comments are kept as trivia tokens so the
/// transpiler can preserve them. Any lexer error is mapped to a
/// [`DialectError`] with the failing offset.
pub fn lex(source: &str) -> Result<Vec<(Tok, Range<usize>)>, DialectError> {
    let mut lexer = Tok::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(tok) => tokens.push((tok, span)),
            Err(()) => {
                let slice = lexer.slice();
                return Err(if slice.starts_with(['\'', '"', '`']) {
                    DialectError::UnterminatedString { offset: span.start }
                } else {
                    DialectError::UnexpectedCharacter { offset: span.start }
                });
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenizes_declaration() {
        let toks = lex("const x: number = 1;").expect("lexes");
        let kinds: Vec<Tok> = toks.iter().map(|(t, _)| *t).collect();
        assert_eq!(
            kinds,
            vec![
                Tok::Ident,
                Tok::Ident,
                Tok::Colon,
                Tok::Ident,
                Tok::Assign,
                Tok::Num,
                Tok::Semi,
            ]
        );
    }

    #[test]
    fn test_strings_and_templates() {
        let toks = lex("'a' \"b\" `multi\nline`").expect("lexes");
        let kinds: Vec<Tok> = toks.iter().map(|(t, _)| *t).collect();
        assert_eq!(kinds, vec![Tok::Str, Tok::Str, Tok::TemplateStr]);
    }

    #[test]
    fn test_unterminated_string_is_an_error() {
        let err = lex("var a = 'oops").unwrap_err();
        assert_eq!(err, DialectError::UnterminatedString { offset: 8 });
    }

    #[test]
    fn test_three_char_operators_win() {
        let toks = lex("a === b !== c").expect("lexes");
        let kinds: Vec<Tok> = toks.iter().map(|(t, _)| *t).collect();
        assert_eq!(
            kinds,
            vec![Tok::Ident, Tok::StrictEq, Tok::Ident, Tok::StrictNotEq, Tok::Ident]
        );
    }
}
