//! Structural parser
//!
//! Walks the token stream once and groups tokens back into an ordered
//! sequence of categorized top-level statements:
//!
//! - `Label(...)` statements are tagged [`Category::Label`].
//! - `if (...) { ... }` statements are captured in full as one raw
//!   [`Category::If`] entry, spanning the condition, the brace body, and an
//!   immediately following `else` clause. Brace matching uses a depth
//!   counter, so conditionals nest arbitrarily inside one entry; the
//!   refiner and the tree builder take it apart later.
//! - Everything else, including chained calls such as `a().b().c();`,
//!   is tagged [`Category::Command`].
//!
//! Statement text is reconstructed from the lexemes. The only whitespace
//! that survives is a single space between adjacent word-like tokens inside
//! an argument list, which is how `Print( hello    world )` normalizes to
//! `Print(hello world)`.
//!
//! Comments and empty statements produce no entry. An unterminated brace or
//! parenthesis, or a top-level `else` with no `if`, refuses to parse.

use super::tokens::{Token, TokenKind};
use super::ScriptError;
use crate::resolver::single_check;
use crate::sequence::{CategorizedSequence, Category};

/// Parses a token stream into a categorized statement sequence.
pub fn parse(tokens: &[Token]) -> Result<CategorizedSequence, ScriptError> {
    let mut cursor = Cursor { tokens, pos: 0 };
    let mut result = CategorizedSequence::new();

    while let Some(token) = cursor.peek() {
        match token.kind {
            TokenKind::EndOfInput => break,
            TokenKind::Comment => {
                cursor.advance();
            }
            // Stray statement separator, e.g. `;;`
            TokenKind::Semicolon => {
                cursor.advance();
            }
            TokenKind::Label => {
                let statement = cursor.read_statement()?;
                result.push(Category::Label, statement);
            }
            TokenKind::KeywordIf => {
                let statement = cursor.read_conditional()?;
                result.push(Category::If, statement);
            }
            TokenKind::KeywordElse => {
                return Err(ScriptError::DanglingElse {
                    position: token.position,
                });
            }
            _ => {
                let statement = cursor.read_statement()?;
                if !statement.is_empty() {
                    result.push(Category::Command, statement);
                }
            }
        }
    }

    Ok(result)
}

struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        if token.kind == TokenKind::EndOfInput {
            return None;
        }
        self.pos += 1;
        Some(token)
    }

    /// Reads one statement through its terminating `;`, rebuilding the text
    /// with argument-list whitespace collapsed to single spaces.
    fn read_statement(&mut self) -> Result<String, ScriptError> {
        let mut text = String::new();
        let mut inside_parens = false;
        let mut previous: Option<TokenKind> = None;

        while let Some(token) = self.peek() {
            if matches!(token.kind, TokenKind::Semicolon | TokenKind::EndOfInput) {
                break;
            }
            if token.kind == TokenKind::Comment {
                self.advance();
                continue;
            }
            self.advance();

            if inside_parens
                && previous.map_or(false, |kind| kind.is_wordlike())
                && token.kind.is_wordlike()
            {
                text.push(' ');
            }
            text.push_str(&token.lexeme);

            match token.kind {
                TokenKind::OpenParen => inside_parens = true,
                TokenKind::CloseParen => inside_parens = false,
                _ => {}
            }
            previous = Some(token.kind);
        }

        if let Some(token) = self.peek() {
            if token.kind == TokenKind::Semicolon {
                self.advance();
                text.push(';');
            }
        }

        if !single_check(&text) {
            return Err(ScriptError::UnbalancedStatement { statement: text });
        }
        Ok(text)
    }

    /// Reads a whole conditional as raw text: condition, brace body, and a
    /// directly following `else` clause if one is present.
    fn read_conditional(&mut self) -> Result<String, ScriptError> {
        let start = self.peek().map(|t| t.position).unwrap_or_default();
        let mut text = String::new();
        self.read_block(&mut text, start)?;

        if let Some(token) = self.peek() {
            if token.kind == TokenKind::KeywordElse {
                let else_at = token.position;
                self.advance();
                text.push_str(" else ");
                self.read_block(&mut text, else_at)?;
            }
        }
        Ok(text)
    }

    /// Appends tokens to `text` until the brace depth opened within returns
    /// to zero. Word-like neighbors are kept apart so the raw text stays
    /// re-parsable.
    fn read_block(&mut self, text: &mut String, start: usize) -> Result<(), ScriptError> {
        let mut depth = 0usize;
        let mut previous: Option<TokenKind> = None;

        while let Some(token) = self.advance() {
            if token.kind == TokenKind::Comment {
                continue;
            }
            if previous.map_or(false, |kind| kind.is_wordlike()) && token.kind.is_wordlike() {
                text.push(' ');
            }
            text.push_str(&token.lexeme);
            previous = Some(token.kind);

            match token.kind {
                TokenKind::OpenBrace => depth += 1,
                TokenKind::CloseBrace => {
                    if depth == 0 {
                        return Err(ScriptError::MalformedConditional {
                            found: text.clone(),
                        });
                    }
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }

        Err(ScriptError::UnterminatedBlock { position: start })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::tokenize;

    fn parse_text(text: &str) -> CategorizedSequence {
        parse(&tokenize(text)).expect("statement stream should parse")
    }

    #[test]
    fn test_simple_statements() {
        let result = parse_text(
            "Label(one);\n\
             Print( hello    world );\n\
             goto(one);",
        );

        assert_eq!(result.len(), 3);
        assert_eq!(result.get(0), Some((&Category::Label, "Label(one);")));
        assert_eq!(result.get(1), Some((&Category::Command, "Print(hello world);")));
        assert_eq!(result.get(2), Some((&Category::Command, "goto(one);")));
    }

    #[test]
    fn test_if_else_is_one_raw_entry() {
        let result = parse_text("if(condition) { com1(); } else { com2(); }");

        assert_eq!(result.len(), 1);
        let (category, value) = result.get(0).unwrap();
        assert_eq!(*category, Category::If);
        assert!(value.starts_with("if(condition)"));
        assert!(value.contains("else"));
        assert!(value.ends_with('}'));
    }

    #[test]
    fn test_nested_if_stays_in_outer_entry() {
        let result = parse_text("if(a) { if(b) { com1(); } else { com2(); } } com3();");

        assert_eq!(result.len(), 2);
        assert_eq!(result.category(0), Some(Category::If));
        assert_eq!(result.get(1), Some((&Category::Command, "com3();")));
    }

    #[test]
    fn test_chained_call_is_one_command() {
        let result = parse_text("com1(1,2).Help();");

        assert_eq!(result.len(), 1);
        assert_eq!(result.get(0), Some((&Category::Command, "com1(1,2).Help();")));
    }

    #[test]
    fn test_comments_and_blanks_produce_no_entries() {
        let result = parse_text("-- just a comment\n;\n-- another\ncom1();");

        assert_eq!(result.len(), 1);
        assert_eq!(result.get(0), Some((&Category::Command, "com1();")));
    }

    #[test]
    fn test_unterminated_brace_is_an_error() {
        let tokens = tokenize("if(a) { com1();");
        assert!(matches!(
            parse(&tokens),
            Err(ScriptError::UnterminatedBlock { .. })
        ));
    }

    #[test]
    fn test_unbalanced_parens_are_an_error() {
        let tokens = tokenize("com1(1,2;");
        assert!(matches!(
            parse(&tokens),
            Err(ScriptError::UnbalancedStatement { .. })
        ));
    }

    #[test]
    fn test_dangling_else_is_an_error() {
        let tokens = tokenize("else { com1(); }");
        assert!(matches!(parse(&tokens), Err(ScriptError::DanglingElse { .. })));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_text("").is_empty());
    }
}
