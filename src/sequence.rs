//! Ordered, densely keyed classification of raw statement text.
//!
//! The structural parser and the conditional tree builder both emit their
//! results as a [`CategorizedSequence`]: an append-only association of an
//! integer key to a `(Category, text)` pair. Keys are handed out by an
//! internal counter in insertion order, so iteration order is always parse
//! order and a key is never reused within one pass.
//!
//! The tree builder additionally needs to *reserve* a key for a child node
//! whose text is lifted out into its own [`IfElseNode`](crate::script::IfElseNode)
//! instead of being stored inline; [`CategorizedSequence::reserve_key`]
//! consumes a key from the same counter without storing an entry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of one entry in a [`CategorizedSequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// A `Label(...)` statement (or, after jump normalization, its bare target).
    Label,
    /// Any plain statement, including chained calls and `goto(...)`.
    Command,
    /// A raw `if (...) { ... } [else { ... }]` statement, unsplit.
    If,
    /// The raw body of an `else` branch on a conditional tree node.
    Else,
    /// The condition text of a refined `if`.
    IfCondition,
    /// The body text of a refined `if` branch.
    IfBranch,
    /// The body text of a refined `else` branch.
    ElseBranch,
    /// Reserved for hosts that flatten nested structures into one sequence.
    Nested,
    /// A normalized `goto` jump with the bare target as its value.
    Goto,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Label => "Label",
            Category::Command => "Command",
            Category::If => "If",
            Category::Else => "Else",
            Category::IfCondition => "If_Condition",
            Category::IfBranch => "If_Branch",
            Category::ElseBranch => "Else_Branch",
            Category::Nested => "Nested",
            Category::Goto => "Goto",
        };
        f.write_str(name)
    }
}

/// Ordered mapping from a dense integer key to a categorized piece of text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedSequence {
    next_key: usize,
    entries: Vec<(usize, Category, String)>,
}

impl CategorizedSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry under the next free key and returns that key.
    pub fn push(&mut self, category: Category, value: impl Into<String>) -> usize {
        let key = self.next_key;
        self.next_key += 1;
        self.entries.push((key, category, value.into()));
        key
    }

    /// Consumes the next free key without storing an entry.
    ///
    /// Used by the conditional tree builder so a child node can record the
    /// position its raw text occupied in the parent's command list.
    pub fn reserve_key(&mut self) -> usize {
        let key = self.next_key;
        self.next_key += 1;
        key
    }

    /// Looks up the entry stored under `key`, if any.
    ///
    /// Reserved keys have no entry and return `None`.
    pub fn get(&self, key: usize) -> Option<(&Category, &str)> {
        self.entries
            .iter()
            .find(|(k, _, _)| *k == key)
            .map(|(_, category, value)| (category, value.as_str()))
    }

    /// The category stored under `key`, if any.
    pub fn category(&self, key: usize) -> Option<Category> {
        self.get(key).map(|(category, _)| *category)
    }

    /// The value stored under `key`, if any.
    pub fn value(&self, key: usize) -> Option<&str> {
        self.get(key).map(|(_, value)| value)
    }

    /// Number of stored entries (reserved keys do not count).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates stored entries as `(key, category, value)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Category, &str)> {
        self.entries
            .iter()
            .map(|(key, category, value)| (*key, *category, value.as_str()))
    }
}

impl fmt::Display for CategorizedSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, category, value) in self.iter() {
            writeln!(f, "[{key}] {category}: {value}")?;
        }
        Ok(())
    }
}
