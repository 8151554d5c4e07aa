//! Script front end
//!
//! This module owns the textual pipeline of the crate: tokenization,
//! structural parsing into categorized statements, semantic refinement of
//! raw conditionals, and recursive decomposition of nested if/else text
//! into an explicit tree.
//!
//! Structure:
//!     The tokenization is done through the logos lexer library. The
//! structural parser walks the token stream once and groups tokens back
//! into statement text, so downstream stages (the refiner, the command
//! resolver) keep operating on plain text the way the host supplied it.
//!
//! The pipeline consists of:
//! 1. Core tokenization using the logos lexer ([`tokens`], [`lexer`])
//! 2. Structural parsing into a categorized statement sequence ([`parser`])
//! 3. Semantic refinement of raw `if` entries ([`refiner`])
//!
//! Nested Conditionals
//!
//!     Script bodies may nest `if/else` arbitrarily. The statement parser
//!     deliberately keeps a whole conditional as one raw entry (brace
//!     matching with a depth counter), and [`conditionals`] decomposes that
//!     raw text into a forest of nodes with parent/layer/position metadata.
//!     Keeping the two stages separate means hosts that only want flat
//!     statement streams never pay for tree building, and the tree builder
//!     can be fed raw script text that never went through the parser.

pub mod conditionals;
pub mod lexer;
pub mod parser;
pub mod refiner;
mod scan;
pub mod tokens;

pub use conditionals::{parse_if_else, IfElseForest, IfElseNode};
pub use lexer::tokenize;
pub use parser::parse;
pub use refiner::{find_label_position, normalize_jump_targets, refine, remove_control_statements};
pub use tokens::{Token, TokenKind};

use thiserror::Error;

/// Structural errors raised by the parser and the conditional tree builder.
///
/// These cover malformed *input*, not host misuse: a statement with an
/// unterminated brace or a dangling `else` refuses to parse instead of
/// silently truncating.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// A block opened at the given byte position never closes.
    #[error("unterminated block: missing closing brace for statement at byte {position}")]
    UnterminatedBlock { position: usize },

    /// A statement contains unbalanced parentheses.
    #[error("unbalanced parentheses in statement `{statement}`")]
    UnbalancedStatement { statement: String },

    /// A top-level `else` appeared without a preceding `if` statement.
    #[error("`else` without a preceding `if` at byte {position}")]
    DanglingElse { position: usize },

    /// Text that should be a conditional does not start with a well-formed
    /// `if (condition) { ... }` construct.
    #[error("expected `if (condition) {{ ... }}`, found `{found}`")]
    MalformedConditional { found: String },
}
