//! Decide whether a value handed to an emission function is a literal or a
//! live expression.
//!
//! A value counts as an expression when it contains both the print-open and
//! print-close markers, e.g. `"{{ user.name }}"`. Expressions are emitted
//! bare with the markers stripped; everything else is single-quoted.

pub const EXPRESSION_OPEN: &str = "{{";
pub const EXPRESSION_CLOSE: &str = "}}";

pub fn is_expression(value: &str) -> bool {
    value.contains(EXPRESSION_OPEN) && value.contains(EXPRESSION_CLOSE)
}

/// Remove every print marker and trim the surrounding whitespace.
pub fn strip_markers(value: &str) -> String {
    value
        .replace(EXPRESSION_OPEN, "")
        .replace(EXPRESSION_CLOSE, "")
        .trim()
        .to_string()
}

/// Quote `value` as a literal, or unwrap it when it is an expression.
pub fn literal_or_expression(value: &str) -> String {
    if is_expression(value) {
        strip_markers(value)
    } else {
        format!("'{value}'")
    }
}
