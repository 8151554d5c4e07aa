//! Lexer
//!
//! Thin wrapper over the logos matcher in [`tokens`](super::tokens):
//! attaches owned lexeme text and byte positions, strips the comment marker
//! from comment tokens, and appends the synthetic `EndOfInput` token.
//!
//! Tokenization is total: it never fails for any input. Malformed input
//! (an unterminated brace, a stray `@`) yields a token stream that the
//! structural parser rejects, not an error here.

use super::tokens::{raw_tokens, Token, TokenKind};

/// Comment marker; the lexeme of a comment token is the text after it.
const COMMENT_MARKER: &str = "--";

/// Converts raw text into a flat token stream.
///
/// Comments are preserved in the stream (the parser skips them, but they
/// stay available for diagnostics). Whitespace only separates lexemes and
/// is never emitted.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = raw_tokens(text)
        .map(|(kind, lexeme, position)| match kind {
            TokenKind::Comment => {
                let body = lexeme
                    .strip_prefix(COMMENT_MARKER)
                    .unwrap_or(lexeme)
                    .trim();
                Token::new(kind, body, position)
            }
            _ => Token::new(kind, lexeme, position),
        })
        .collect();

    tokens.push(Token::new(TokenKind::EndOfInput, "", text.len()));
    tokens
}
