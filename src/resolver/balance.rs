//! Delimiter balance validation.
//!
//! Both checks run an explicit stack: push on an opening delimiter, pop and
//! compare on a closing one. A close with an empty stack, a kind mismatch,
//! or anything left open at the end means the input is not well formed.

/// Checks `(`/`)` balance. Characters other than the two delimiters are
/// ignored, so whole statements can be checked as-is.
pub fn single_check(input: &str) -> bool {
    let mut open = 0usize;
    for c in input.chars() {
        match c {
            '(' => open += 1,
            ')' => {
                if open == 0 {
                    return false;
                }
                open -= 1;
            }
            _ => {}
        }
    }
    open == 0
}

/// Checks balance for host-configured delimiter vocabularies.
///
/// `open` and `close` pair up by index: `open[i]` must be closed by
/// `close[i]`. A closing character whose kind does not match the most
/// recently opened one fails the check.
pub fn check_multiple(input: &str, open: &[char], close: &[char]) -> bool {
    debug_assert_eq!(open.len(), close.len());
    let mut stack: Vec<usize> = Vec::new();

    for c in input.chars() {
        if let Some(kind) = open.iter().position(|&o| o == c) {
            stack.push(kind);
        } else if let Some(kind) = close.iter().position(|&cl| cl == c) {
            match stack.pop() {
                Some(top) if top == kind => {}
                _ => return false,
            }
        }
    }

    stack.is_empty()
}
