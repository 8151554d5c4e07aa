//! Semantic refiner
//!
//! Post-parse passes over a [`CategorizedSequence`]. The main pass,
//! [`refine`], splits every raw `If` entry into separate condition and
//! branch entries so downstream consumers never have to re-scan conditional
//! syntax. The remaining passes normalize statement text for hosts that run
//! scripts: stripping statement terminators and rewriting `Label(x)` /
//! `goto(x)` into bare jump targets.
//!
//! All passes re-key their output densely, preserving the relative order of
//! the input entries, and all are fixed points on their own output.

use once_cell::sync::Lazy;
use regex::Regex;

use super::scan;
use crate::sequence::{CategorizedSequence, Category};

static LABEL_TARGET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^label\s*\(\s*(.*?)\s*\)\s*;?$").expect("label pattern"));
static GOTO_TARGET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^goto\s*\(\s*(.*?)\s*\)\s*;?$").expect("goto pattern"));

/// Splits every raw `If` entry into `If_Condition`, `If_Branch` and, when an
/// `else` suffix is present, `Else_Branch`. All other entries pass through
/// in place.
///
/// A sequence containing no raw `If` or `Else` entries is returned
/// unchanged apart from re-keying, so refining twice is a no-op.
pub fn refine(input: &CategorizedSequence) -> CategorizedSequence {
    let mut output = CategorizedSequence::new();

    for (_, category, value) in input.iter() {
        match category {
            Category::If => match scan::parse_if_construct(value, scan::skip_whitespace(value, 0)) {
                Some(parts) => {
                    output.push(Category::IfCondition, parts.condition.trim());
                    output.push(Category::IfBranch, parts.if_body.trim());
                    if let Some(else_body) = parts.else_body {
                        output.push(Category::ElseBranch, else_body.trim());
                    }
                }
                // Malformed conditional text: keep the raw entry so the
                // caller can still see and report it
                None => {
                    output.push(category, value);
                }
            },
            Category::Else => {
                output.push(Category::ElseBranch, extract_brace_body(value));
            }
            _ => {
                output.push(category, value);
            }
        }
    }

    output
}

/// Strips one trailing `;` from every value.
pub fn remove_control_statements(input: &CategorizedSequence) -> CategorizedSequence {
    let mut output = CategorizedSequence::new();
    for (_, category, value) in input.iter() {
        let trimmed = value.trim();
        let trimmed = trimmed.strip_suffix(';').map_or(trimmed, str::trim_end);
        output.push(category, trimmed);
    }
    output
}

/// Rewrites jump-shaped entries into bare targets: a `Label(x)` entry keeps
/// its category with value `x`, and a `goto(x)` command becomes a `Goto`
/// entry with value `x`. Everything else passes through.
pub fn normalize_jump_targets(input: &CategorizedSequence) -> CategorizedSequence {
    let mut output = CategorizedSequence::new();
    for (_, category, value) in input.iter() {
        let trimmed = value.trim();
        match category {
            Category::Label => {
                let target = LABEL_TARGET
                    .captures(trimmed)
                    .map(|c| c[1].to_string())
                    .unwrap_or_else(|| trimmed.to_string());
                output.push(Category::Label, target);
            }
            Category::Command => {
                if let Some(captures) = GOTO_TARGET.captures(trimmed) {
                    output.push(Category::Goto, &captures[1]);
                } else {
                    output.push(category, value);
                }
            }
            _ => {
                output.push(category, value);
            }
        }
    }
    output
}

/// The key of the `Label` entry matching `target`, for hosts resolving a
/// `goto` jump. Accepts both normalized (`one`) and raw (`Label(one);`)
/// label values; comparison is case-insensitive.
pub fn find_label_position(sequence: &CategorizedSequence, target: &str) -> Option<usize> {
    let target = target.trim();
    sequence.iter().find_map(|(key, category, value)| {
        if category != Category::Label {
            return None;
        }
        let value = value.trim();
        let name = LABEL_TARGET
            .captures(value)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| value.to_string());
        name.eq_ignore_ascii_case(target).then_some(key)
    })
}

fn extract_brace_body(value: &str) -> String {
    let open = match value.find('{') {
        Some(open) => open,
        None => return value.trim().to_string(),
    };
    match scan::matching(value, open, '{', '}') {
        Some(close) => value[open + 1..close].trim().to_string(),
        None => value.trim().to_string(),
    }
}
