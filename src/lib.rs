//! # cmdscript
//!
//! A front end for a small command scripting language: free-form statement
//! text goes in, resolved command invocations and structured diagnostics
//! come out. Nothing in this crate executes commands — what a command does
//! is the host's business; this crate only decides *which* registered
//! command, with *which* literal parameters, is meant.
//!
//! The pipeline, leaf to root:
//!
//! - [`script`] — tokenization, structural parsing into categorized
//!   statements, semantic refinement, and recursive decomposition of nested
//!   `if/else` text into a tree.
//! - [`resolver`] — delimiter balance validation and name+arity overload
//!   resolution against named command registries.
//! - [`feedback`] — the two-state confirmation machine for commands that
//!   must be acknowledged before dispatch.
//! - [`prompt`] — the dispatcher tying it together: namespace ownership,
//!   input routing, bounded history, and the output sink.
//!
//! ## Testing
//!
//! Unit tests sit in `#[cfg(test)]` modules beside the code they cover;
//! cross-component scenarios live under `tests/`.

pub mod feedback;
pub mod prompt;
pub mod resolver;
pub mod script;
pub mod sequence;

pub use feedback::{AvailableAnswer, FeedbackManager, ResolvedFeedback, UserFeedback};
pub use prompt::{CommandOutcome, Prompt, PromptError, PromptOptions, PromptSink};
pub use resolver::{InCommand, ResolveError, ResolvedCommand, UserSpace};
pub use sequence::{CategorizedSequence, Category};
