//! Statement resolution against a namespace.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::balance::single_check;
use super::registry::UserSpace;

static EXTENSION_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\w+)\s*(?:\((.*)\))?\s*$").expect("extension pattern"));

/// A fully resolved invocation: the registered command id, the literal
/// parameters, the namespace it resolved in, and any chained extension
/// calls. Construction goes through [`resolve`]; a value of this type is
/// never partially populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCommand {
    pub key: usize,
    pub namespace: String,
    pub parameters: Vec<String>,
    pub extensions: Vec<ResolvedExtension>,
}

/// One resolved extension call in a dotted chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedExtension {
    pub key: usize,
    pub name: String,
    pub parameters: Vec<String>,
}

impl fmt::Display for ResolvedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "command {} ({}) in namespace `{}`",
            self.key,
            self.parameters.join(", "),
            self.namespace
        )?;
        for extension in &self.extensions {
            write!(f, ".{}({})", extension.name, extension.parameters.join(", "))?;
        }
        Ok(())
    }
}

/// Why a statement failed to resolve. These cross the dispatcher boundary
/// as values on the command channel; malformed end-user input is never a
/// panic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("nothing to resolve: input was empty")]
    EmptyInput,

    #[error("unbalanced parentheses in `{0}`")]
    Unbalanced(String),

    #[error("malformed command syntax in `{0}`")]
    Malformed(String),

    #[error("keyword not found: `{0}`")]
    UnknownKeyword(String),

    #[error("wrong parameter count for `{command}`: {found} given")]
    WrongParameterCount { command: String, found: usize },

    #[error("extension not found: `{0}`")]
    UnknownExtension(String),

    #[error("wrong parameter count for extension `{extension}`: {found} given")]
    ExtensionParameterCount { extension: String, found: usize },
}

/// Resolves one statement against `space`.
///
/// The statement is split on top-level dots into a base call and extension
/// segments; the base call matches against the namespace's commands, every
/// extension segment against its extension table, and the first failure
/// aborts the whole resolution. Pure — no side effects on either argument.
pub fn resolve(statement: &str, space: &UserSpace) -> Result<ResolvedCommand, ResolveError> {
    let statement = statement.trim();
    let statement = statement.strip_suffix(';').unwrap_or(statement).trim_end();
    if statement.is_empty() {
        return Err(ResolveError::EmptyInput);
    }
    if !single_check(statement) {
        return Err(ResolveError::Unbalanced(statement.to_string()));
    }

    let mut segments = split_call_chain(statement).into_iter();
    let head = segments.next().ok_or(ResolveError::EmptyInput)?;

    let (name, parameters) = split_invocation(head)?;
    if name.is_empty() {
        return Err(ResolveError::Malformed(statement.to_string()));
    }
    let key = match space.find_command(name, parameters.len()) {
        Some(key) => key,
        None if space.knows_command(name) => {
            return Err(ResolveError::WrongParameterCount {
                command: name.to_string(),
                found: parameters.len(),
            })
        }
        None => return Err(ResolveError::UnknownKeyword(name.to_string())),
    };

    let mut extensions = Vec::new();
    for segment in segments {
        let captures = EXTENSION_CALL
            .captures(segment)
            .ok_or_else(|| ResolveError::Malformed(segment.to_string()))?;
        let name = captures.get(1).map_or("", |m| m.as_str());
        let parameters = captures
            .get(2)
            .map_or_else(Vec::new, |m| split_parameters(m.as_str()));

        let key = match space.find_extension(name, parameters.len()) {
            Some(key) => key,
            None if space.knows_extension(name) => {
                return Err(ResolveError::ExtensionParameterCount {
                    extension: name.to_string(),
                    found: parameters.len(),
                })
            }
            None => return Err(ResolveError::UnknownExtension(name.to_string())),
        };
        extensions.push(ResolvedExtension {
            key,
            name: name.to_string(),
            parameters,
        });
    }

    Ok(ResolvedCommand {
        key,
        namespace: space.name().to_string(),
        parameters,
        extensions,
    })
}

/// Splits a statement on dots at paren depth zero, so parameters containing
/// dots never break the chain.
fn split_call_chain(statement: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in statement.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '.' if depth == 0 => {
                segments.push(&statement[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&statement[start..]);
    segments
}

/// Splits one call segment into its bare name and parameter list.
///
/// A segment without parentheses is a zero-parameter call. When parentheses
/// are present they must wrap the rest of the segment exactly.
fn split_invocation(segment: &str) -> Result<(&str, Vec<String>), ResolveError> {
    let segment = segment.trim();
    let open = match segment.find('(') {
        Some(open) => open,
        None => return Ok((segment, Vec::new())),
    };
    if !segment.ends_with(')') {
        return Err(ResolveError::Malformed(segment.to_string()));
    }
    let name = segment[..open].trim();
    let inner = &segment[open + 1..segment.len() - 1];
    Ok((name, split_parameters(inner)))
}

/// Comma-split, trimmed, with empty pieces dropped.
fn split_parameters(inner: &str) -> Vec<String> {
    inner
        .split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}
