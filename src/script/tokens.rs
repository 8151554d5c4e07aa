//! Token definitions for the command script language
//!
//! Tokens are matched with the logos derive macro. The matcher enum is kept
//! private; the public [`TokenKind`] adds the synthetic `EndOfInput` kind
//! that the tokenizer appends after the last matched lexeme.

use logos::Logos;
use serde::{Deserialize, Serialize};

/// Logos matcher for the raw character stream.
///
/// Keywords win ties against [`RawToken::Identifier`] through explicit
/// priorities; a longer identifier (`iffy`, `labels`) still wins because
/// logos always prefers the longest match.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    #[regex(r"[Ll][Aa][Bb][Ee][Ll]", priority = 5)]
    Label,

    #[regex(r"[Ii][Ff]", priority = 5)]
    KeywordIf,

    #[regex(r"[Ee][Ll][Ss][Ee]", priority = 5)]
    KeywordElse,

    #[regex(r"[Gg][Oo][Tt][Oo]", priority = 5)]
    KeywordGoto,

    // Bare words, including digit runs and unicode identifiers
    #[regex(r"[\p{L}\p{N}_]+", priority = 3)]
    Identifier,

    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,

    // Line comment: the marker and the rest of the line
    #[regex(r"--[^\n\r]*")]
    Comment,

    // Catch-all so tokenization is total; later stages reject these
    #[regex(r".", priority = 1)]
    Unknown,
}

/// All token kinds the lexer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Label,
    KeywordIf,
    KeywordElse,
    KeywordGoto,
    Identifier,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    Dot,
    Comma,
    Semicolon,
    Comment,
    Unknown,
    /// Synthetic end marker appended by [`tokenize`](crate::script::tokenize).
    EndOfInput,
}

impl From<RawToken> for TokenKind {
    fn from(raw: RawToken) -> Self {
        match raw {
            RawToken::Label => TokenKind::Label,
            RawToken::KeywordIf => TokenKind::KeywordIf,
            RawToken::KeywordElse => TokenKind::KeywordElse,
            RawToken::KeywordGoto => TokenKind::KeywordGoto,
            RawToken::Identifier => TokenKind::Identifier,
            RawToken::OpenParen => TokenKind::OpenParen,
            RawToken::CloseParen => TokenKind::CloseParen,
            RawToken::OpenBrace => TokenKind::OpenBrace,
            RawToken::CloseBrace => TokenKind::CloseBrace,
            RawToken::Dot => TokenKind::Dot,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Semicolon => TokenKind::Semicolon,
            RawToken::Comment => TokenKind::Comment,
            RawToken::Unknown => TokenKind::Unknown,
        }
    }
}

impl TokenKind {
    /// Check if this kind is one of the reserved keywords.
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Label
                | TokenKind::KeywordIf
                | TokenKind::KeywordElse
                | TokenKind::KeywordGoto
        )
    }

    /// Word-like kinds that need a separating space when adjacent inside an
    /// argument list.
    pub fn is_wordlike(&self) -> bool {
        matches!(self, TokenKind::Identifier) || self.is_keyword()
    }
}

/// One lexed token: its kind, the matched text, and the byte position of the
/// match in the source. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, position: usize) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            position,
        }
    }
}

/// Runs the logos matcher over `text`, yielding `(kind, lexeme slice, start)`
/// triples. Unmatched input cannot occur: the matcher carries a single-char
/// catch-all, so an error item is mapped to [`TokenKind::Unknown`] as well.
pub(crate) fn raw_tokens(text: &str) -> impl Iterator<Item = (TokenKind, &str, usize)> {
    RawToken::lexer(text)
        .spanned()
        .map(move |(raw, span)| match raw {
            Ok(token) => (TokenKind::from(token), &text[span.start..span.end], span.start),
            Err(()) => (TokenKind::Unknown, &text[span.start..span.end], span.start),
        })
}
