//! Conditional tree builder
//!
//! Decomposes raw nested `if/else` text into a forest of [`IfElseNode`]s.
//! Each node captures one conditional: its condition, the command fragments
//! of its `if` body, and either an inline `Else` entry or a child node when
//! the `else` body is itself a conditional. Children record their parent,
//! nesting layer, and the key their raw text occupied in the parent's
//! command list, so the original nesting can always be reconstructed.
//!
//! The builder is an explicit arena: the top-level call owns the growable
//! node list and threads it by `&mut` through recursion. Ids are arena
//! indices, assigned in pre-order discovery order, which keeps the builder
//! re-entrant — no state survives a call.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::scan;
use super::ScriptError;
use crate::sequence::{CategorizedSequence, Category};

/// One level of a recursively decomposed conditional block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IfElseNode {
    /// Arena index, assigned in discovery order; the root is always `0`.
    pub id: usize,
    /// Parent node id; `None` for a root.
    pub parent: Option<usize>,
    /// Nesting depth: a child's layer is its parent's layer plus one.
    pub layer: usize,
    /// The key this node's raw text occupied in the parent's command list.
    pub position: usize,
    /// Whether this node came out of its parent's `else` branch.
    pub is_else_of: bool,
    /// Whether any child node was lifted out of this node's branches.
    pub is_nested: bool,
    /// The full raw text of this conditional, as given.
    pub raw: String,
    /// Condition, command fragments, and inline else body of this node.
    pub commands: CategorizedSequence,
}

impl fmt::Display for IfElseNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IfElseNode {{ id: {}, parent: {:?}, layer: {}, position: {}, else: {}, nested: {} }}",
            self.id, self.parent, self.layer, self.position, self.is_else_of, self.is_nested
        )
    }
}

/// Arena of [`IfElseNode`]s produced by one [`parse_if_else`] call.
///
/// Node ids are indices into the arena; iteration order is discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IfElseForest {
    nodes: Vec<IfElseNode>,
}

impl IfElseForest {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&IfElseNode> {
        self.nodes.get(id)
    }

    /// The top-level node, when the forest is non-empty.
    pub fn root(&self) -> Option<&IfElseNode> {
        self.nodes.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IfElseNode> {
        self.nodes.iter()
    }

    /// Ids of the direct children of `id`, in discovery order.
    pub fn children(&self, id: usize) -> Vec<usize> {
        self.nodes
            .iter()
            .filter(|node| node.parent == Some(id))
            .map(|node| node.id)
            .collect()
    }
}

/// Decomposes nested `if/else` text into a forest of nodes.
///
/// Empty or whitespace-only input yields an empty forest; text that does
/// not begin with a well-formed `if (condition) { ... }` is a hard error.
pub fn parse_if_else(raw: &str) -> Result<IfElseForest, ScriptError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(IfElseForest::default());
    }

    let mut nodes = Vec::new();
    build_node(&mut nodes, trimmed, None, 0, 0, false)?;
    Ok(IfElseForest { nodes })
}

/// One fragment of an `if` body: either plain command text or a nested
/// conditional that becomes its own node.
enum Fragment<'a> {
    Plain(&'a str),
    Nested(&'a str),
}

fn build_node(
    arena: &mut Vec<IfElseNode>,
    raw: &str,
    parent: Option<usize>,
    layer: usize,
    position: usize,
    is_else_of: bool,
) -> Result<usize, ScriptError> {
    let parts =
        scan::parse_if_construct(raw, 0).ok_or_else(|| ScriptError::MalformedConditional {
            found: raw.to_string(),
        })?;

    let id = arena.len();
    arena.push(IfElseNode {
        id,
        parent,
        layer,
        position,
        is_else_of,
        is_nested: false,
        raw: raw.to_string(),
        commands: CategorizedSequence::new(),
    });

    let mut commands = CategorizedSequence::new();
    let mut nested = false;
    commands.push(Category::IfCondition, parts.condition.trim());

    for fragment in split_fragments(&parts.if_body)? {
        match fragment {
            Fragment::Plain(text) => {
                commands.push(Category::If, text);
            }
            Fragment::Nested(text) => {
                let key = commands.reserve_key();
                build_node(arena, text, Some(id), layer + 1, key, false)?;
                nested = true;
            }
        }
    }

    if let Some(else_body) = parts.else_body.as_deref() {
        let body = else_body.trim();
        if scan::if_construct_at(body, 0) {
            let key = commands.reserve_key();
            build_node(arena, body, Some(id), layer + 1, key, true)?;
            nested = true;
        } else if !body.is_empty() {
            commands.push(Category::Else, body);
        }
    }

    arena[id].commands = commands;
    arena[id].is_nested = nested;
    Ok(id)
}

/// Splits an `if` body into command fragments on `;`, keeping any nested
/// conditional whole — including its own braces and optional `else` — so a
/// semicolon inside a nested body never cuts it apart. Plain text directly
/// preceding a nested `if` becomes its own fragment.
fn split_fragments(body: &str) -> Result<Vec<Fragment<'_>>, ScriptError> {
    let mut fragments = Vec::new();
    let mut at = scan::skip_whitespace(body, 0);

    while at < body.len() {
        if scan::if_construct_at(body, at) {
            let parts = scan::parse_if_construct(body, at).ok_or_else(|| {
                ScriptError::MalformedConditional {
                    found: body[at..].to_string(),
                }
            })?;
            fragments.push(Fragment::Nested(body[at..parts.end].trim()));
            at = scan::skip_whitespace(body, parts.end);
            continue;
        }

        let (piece_end, next) = plain_fragment_end(body, at);
        let piece = body[at..piece_end].trim();
        if !piece.is_empty() {
            fragments.push(Fragment::Plain(piece));
        }
        at = scan::skip_whitespace(body, next);
    }

    Ok(fragments)
}

/// End of the plain fragment starting at `at`: either just past the next
/// top-level `;`, or right before a top-level `if` construct.
///
/// Returns `(end_of_piece, resume_at)`.
fn plain_fragment_end(body: &str, at: usize) -> (usize, usize) {
    let mut depth = 0usize;
    for (i, c) in body[at..].char_indices() {
        let here = at + i;
        match c {
            '(' | '{' => depth += 1,
            ')' | '}' => depth = depth.saturating_sub(1),
            ';' if depth == 0 => return (here + 1, here + 1),
            _ if depth == 0 && i > 0 && scan::if_construct_at(body, here) => {
                return (here, here);
            }
            _ => {}
        }
    }
    (body.len(), body.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_empty_forest() {
        assert!(parse_if_else("").unwrap().is_empty());
        assert!(parse_if_else("   \n\t ").unwrap().is_empty());
    }

    #[test]
    fn test_flat_if_clause() {
        let forest = parse_if_else("if (condition1) {com1;}").unwrap();

        assert_eq!(forest.len(), 1);
        let node = forest.root().unwrap();
        assert_eq!(node.id, 0);
        assert_eq!(node.parent, None);
        assert_eq!(node.layer, 0);
        assert_eq!(node.position, 0);
        assert!(!node.is_else_of);
        assert!(!node.is_nested);
        assert_eq!(node.raw, "if (condition1) {com1;}");

        assert_eq!(node.commands.get(0), Some((&Category::IfCondition, "condition1")));
        assert_eq!(node.commands.get(1), Some((&Category::If, "com1;")));
    }

    #[test]
    fn test_malformed_input_is_an_error() {
        assert!(matches!(
            parse_if_else("com1;"),
            Err(ScriptError::MalformedConditional { .. })
        ));
        assert!(matches!(
            parse_if_else("if (a) { com1;"),
            Err(ScriptError::MalformedConditional { .. })
        ));
    }

    #[test]
    fn test_nested_if_else_structure() {
        let input = "if (condition1) { Command1; if (condition2) { Command2; } else { Command3; } } else { Command4; }";
        let forest = parse_if_else(input).unwrap();

        assert_eq!(forest.len(), 2);

        let root = forest.get(0).unwrap();
        assert_eq!(root.parent, None);
        assert_eq!(root.layer, 0);
        assert!(root.is_nested);
        assert!(!root.is_else_of);
        assert_eq!(root.raw, input);
        assert_eq!(root.commands.get(0), Some((&Category::IfCondition, "condition1")));
        assert_eq!(root.commands.get(1), Some((&Category::If, "Command1;")));
        // Key 2 is reserved by the nested child; the else body follows it
        assert_eq!(root.commands.get(2), None);
        assert_eq!(root.commands.get(3), Some((&Category::Else, "Command4;")));

        let child = forest.get(1).unwrap();
        assert_eq!(child.parent, Some(0));
        assert_eq!(child.layer, 1);
        assert_eq!(child.position, 2);
        assert!(!child.is_else_of);
        assert!(!child.is_nested);
        assert_eq!(child.raw, "if (condition2) { Command2; } else { Command3; }");
        assert_eq!(child.commands.get(0), Some((&Category::IfCondition, "condition2")));
        assert_eq!(child.commands.get(1), Some((&Category::If, "Command2;")));
        assert_eq!(child.commands.get(2), Some((&Category::Else, "Command3;")));
    }

    #[test]
    fn test_else_if_chain_becomes_nested_node() {
        let input = "if (cond1) { Cmd1; } else { if (cond2) { Cmd2; } else { Cmd3; } }";
        let forest = parse_if_else(input).unwrap();

        assert_eq!(forest.len(), 2);

        let root = forest.get(0).unwrap();
        assert!(root.is_nested);
        assert_eq!(root.commands.get(0), Some((&Category::IfCondition, "cond1")));
        assert_eq!(root.commands.get(1), Some((&Category::If, "Cmd1;")));
        // No inline Else entry: the else body became the child node
        assert!(root.commands.iter().all(|(_, c, _)| c != Category::Else));

        let child = forest.get(1).unwrap();
        assert_eq!(child.parent, Some(0));
        assert_eq!(child.layer, 1);
        assert_eq!(child.position, 2);
        assert!(child.is_else_of);
        assert_eq!(child.raw, "if (cond2) { Cmd2; } else { Cmd3; }");
        assert_eq!(child.commands.get(2), Some((&Category::Else, "Cmd3;")));
    }

    #[test]
    fn test_else_if_sugar_matches_expanded_form() {
        let sugared = parse_if_else("if (a) { x; } else if (b) { y; } else { z; }").unwrap();
        let expanded = parse_if_else("if (a) { x; } else { if (b) { y; } else { z; } }").unwrap();

        assert_eq!(sugared.len(), 2);
        assert_eq!(expanded.len(), 2);
        for (s, e) in sugared.iter().zip(expanded.iter()) {
            assert_eq!(s.parent, e.parent);
            assert_eq!(s.layer, e.layer);
            assert_eq!(s.is_else_of, e.is_else_of);
            assert_eq!(s.commands, e.commands);
        }
    }

    #[test]
    fn test_sibling_nested_ifs_get_increasing_ids() {
        let input = "if (a) { if (b) { x; } if (c) { y; } }";
        let forest = parse_if_else(input).unwrap();

        assert_eq!(forest.len(), 3);
        assert_eq!(forest.children(0), vec![1, 2]);

        let first = forest.get(1).unwrap();
        let second = forest.get(2).unwrap();
        assert_eq!(first.raw, "if (b) { x; }");
        assert_eq!(second.raw, "if (c) { y; }");
        assert_eq!(first.layer, 1);
        assert_eq!(second.layer, 1);
        assert!(first.position < second.position);
    }

    #[test]
    fn test_three_layers_deep() {
        let input = "if (a) { if (b) { if (c) { x; } } }";
        let forest = parse_if_else(input).unwrap();

        assert_eq!(forest.len(), 3);
        assert_eq!(forest.get(2).unwrap().layer, 2);
        assert_eq!(forest.get(2).unwrap().parent, Some(1));
        assert!(forest.get(0).unwrap().is_nested);
        assert!(forest.get(1).unwrap().is_nested);
        assert!(!forest.get(2).unwrap().is_nested);
    }

    #[test]
    fn test_semicolons_inside_nested_body_do_not_split() {
        let input = "if (a) { com1; if (b) { com2; com3; } com4; }";
        let forest = parse_if_else(input).unwrap();

        assert_eq!(forest.len(), 2);
        let root = forest.get(0).unwrap();
        let values: Vec<&str> = root
            .commands
            .iter()
            .filter(|(_, c, _)| *c == Category::If)
            .map(|(_, _, v)| v)
            .collect();
        assert_eq!(values, vec!["com1;", "com4;"]);

        let child = forest.get(1).unwrap();
        let nested_values: Vec<&str> = child
            .commands
            .iter()
            .filter(|(_, c, _)| *c == Category::If)
            .map(|(_, _, v)| v)
            .collect();
        assert_eq!(nested_values, vec!["com2;", "com3;"]);
    }

    #[test]
    fn test_text_before_nested_if_in_same_fragment_is_kept() {
        // No semicolon between the command and the nested if
        let input = "if (a) { com1 if (b) { x; } }";
        let forest = parse_if_else(input).unwrap();

        assert_eq!(forest.len(), 2);
        let root = forest.get(0).unwrap();
        assert_eq!(root.commands.get(1), Some((&Category::If, "com1")));
        assert_eq!(forest.get(1).unwrap().position, 2);
    }
}
