//! Emission functions: helpers that return template *source* instead of
//! rendered text, so a template can generate another template.
//!
//! Every function here is plain string formatting. Nothing validates the
//! emitted text against the target grammar; a malformed tag only fails when
//! the generated template is itself rendered. The block pair is the one
//! stateful construct and goes through a [`BlockStack`].
//!
//! The emitted grammar is the Twig tag family:
//!
//! ```
//! use stamper::emit::{self, BlockStack};
//!
//! let mut stack = BlockStack::new();
//! assert_eq!(emit::echo_block(&mut stack, "body"), "{% block body %}");
//! assert_eq!(emit::echo_for("item", "items", Some("key")), "{% for key,item in items %}");
//! assert_eq!(emit::echo_endblock(&mut stack), "{% endblock body %}");
//! ```

pub mod detect;
pub mod functions;
pub mod stack;

use std::borrow::Cow;

pub use detect::{is_expression, literal_or_expression};
pub use functions::{register_emitter, SharedBlockStack, EMITTER_NAMES};
pub use stack::BlockStack;

/// Condition of an `if`/`elseif` tag.
///
/// Booleans are written as `1`/`0`, never as words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Bool(bool),
    Expr(String),
}

impl Condition {
    fn as_text(&self) -> Cow<'_, str> {
        match self {
            Condition::Bool(true) => Cow::Borrowed("1"),
            Condition::Bool(false) => Cow::Borrowed("0"),
            Condition::Expr(expr) => Cow::Borrowed(expr),
        }
    }
}

impl From<bool> for Condition {
    fn from(value: bool) -> Self {
        Condition::Bool(value)
    }
}

impl From<&str> for Condition {
    fn from(value: &str) -> Self {
        Condition::Expr(value.to_string())
    }
}

impl From<String> for Condition {
    fn from(value: String) -> Self {
        Condition::Expr(value)
    }
}

pub fn echo_if(condition: impl Into<Condition>) -> String {
    format!("{{% if {} %}}", condition.into().as_text())
}

pub fn echo_elseif(condition: impl Into<Condition>) -> String {
    format!("{{% elseif {} %}}", condition.into().as_text())
}

pub fn echo_else() -> &'static str {
    "{% else %}"
}

pub fn echo_endif() -> &'static str {
    "{% endif %}"
}

/// `{% set name = "value" %}`, or `{% set name = value %}` when `as_string`
/// is false and `value` is itself an expression.
pub fn echo_set(name: &str, value: &str, as_string: bool) -> String {
    if as_string {
        format!("{{% set {name} = \"{value}\" %}}")
    } else {
        format!("{{% set {name} = {value} %}}")
    }
}

/// Bare print tag around `value`.
pub fn echo_print(value: &str) -> String {
    format!("{{{{ {value} }}}}")
}

/// Print tag with `filters` piped in the given order.
///
/// With no filters this is [`echo_print`] and `as_string` is ignored.
pub fn echo_filter<S: AsRef<str>>(value: &str, filters: &[S], as_string: bool) -> String {
    // `{{ v| }}` does not parse, so an empty chain prints the bare value
    // rather than joining nothing onto a trailing pipe.
    if filters.is_empty() {
        return echo_print(value);
    }

    let chain = filters
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("|");

    if as_string {
        format!("{{{{ \"{value}\"|{chain} }}}}")
    } else {
        format!("{{{{ {value}|{chain} }}}}")
    }
}

/// Open a block and remember its name for the matching [`echo_endblock`].
pub fn echo_block(stack: &mut BlockStack, name: &str) -> String {
    stack.push(name);
    format!("{{% block {name} %}}")
}

/// Close the innermost open block, naming it in the tag.
pub fn echo_endblock(stack: &mut BlockStack) -> String {
    format!("{{% endblock {} %}}", stack.pop())
}

/// `{% for item in collection %}`, or `{% for key,item in collection %}`
/// when a non-empty key name is given.
pub fn echo_for(item: &str, collection: &str, key: Option<&str>) -> String {
    match key.filter(|k| !k.is_empty()) {
        Some(key) => format!("{{% for {key},{item} in {collection} %}}"),
        None => format!("{{% for {item} in {collection} %}}"),
    }
}

pub fn echo_endfor() -> &'static str {
    "{% endfor %}"
}

pub fn echo_raw() -> &'static str {
    "{% raw %}"
}

pub fn echo_endraw() -> &'static str {
    "{% endraw %}"
}

pub fn echo_extends(name: &str) -> String {
    format!("{{% extends \"{name}\" %}}")
}

pub fn echo_use(name: &str) -> String {
    format!("{{% use '{name}' %}}")
}

pub fn echo_print_block(name: &str) -> String {
    format!("{{{{ block('{name}') }}}}")
}

/// Sequence literal: `[ 'a', b ]`.
///
/// Values holding both print markers are emitted bare with the markers
/// stripped; everything else is quoted.
pub fn echo_array<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let items = values
        .into_iter()
        .map(|v| literal_or_expression(v.as_ref()))
        .collect::<Vec<_>>();
    format!("[ {} ]", items.join(", "))
}

/// Mapping literal: `{ a: 'b', e: f }`, pairs kept in input order.
pub fn echo_map<I, K, V>(pairs: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let items = pairs
        .into_iter()
        .map(|(k, v)| format!("{}: {}", k.as_ref(), literal_or_expression(v.as_ref())))
        .collect::<Vec<_>>();
    format!("{{ {} }}", items.join(", "))
}

/// `{% include "template" with { ... } %}`, with `only` appended when the
/// included template must see the params and nothing else.
pub fn echo_include<I, K, V>(template: &str, params: I, only: bool) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let marker = if only { "only " } else { "" };
    format!(
        "{{% include \"{template}\" with {} {marker}%}}",
        echo_map(params)
    )
}

/// Concatenate the characters for `codes`.
///
/// Each code is reduced modulo 256 (so 321 gives `A`) and the resulting
/// byte is read as Latin-1.
pub fn char_from_codes(codes: &[i64]) -> String {
    codes
        .iter()
        .map(|code| char::from(code.rem_euclid(256) as u8))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Condition::from("a = b"), "{% if a = b %}")]
    #[case(Condition::from("cedric = 'cedric'"), "{% if cedric = 'cedric' %}")]
    #[case(Condition::from(true), "{% if 1 %}")]
    #[case(Condition::from(false), "{% if 0 %}")]
    fn test_echo_if(#[case] condition: Condition, #[case] expected: &str) {
        assert_eq!(echo_if(condition), expected);
    }

    #[rstest]
    #[case(Condition::from("a = b"), "{% elseif a = b %}")]
    #[case(Condition::from(true), "{% elseif 1 %}")]
    #[case(Condition::from(false), "{% elseif 0 %}")]
    fn test_echo_elseif(#[case] condition: Condition, #[case] expected: &str) {
        assert_eq!(echo_elseif(condition), expected);
    }

    #[test]
    fn test_fixed_tags() {
        assert_eq!(echo_else(), "{% else %}");
        assert_eq!(echo_endif(), "{% endif %}");
        assert_eq!(echo_endfor(), "{% endfor %}");
        assert_eq!(echo_raw(), "{% raw %}");
        assert_eq!(echo_endraw(), "{% endraw %}");
    }

    #[rstest]
    #[case("foo", "bar", true, "{% set foo = \"bar\" %}")]
    #[case("foo", "bar", false, "{% set foo = bar %}")]
    fn test_echo_set(
        #[case] name: &str,
        #[case] value: &str,
        #[case] as_string: bool,
        #[case] expected: &str,
    ) {
        assert_eq!(echo_set(name, value, as_string), expected);
    }

    #[test]
    fn test_echo_print() {
        assert_eq!(echo_print("name"), "{{ name }}");
    }

    #[rstest]
    #[case("myObjectValue", &[], false, "{{ myObjectValue }}")]
    #[case("myValue", &[], true, "{{ myValue }}")]
    #[case("myObjectValue", &["capitalize"], false, "{{ myObjectValue|capitalize }}")]
    #[case("myValue", &["capitalize"], true, "{{ \"myValue\"|capitalize }}")]
    #[case(
        "myObjectValue",
        &["capitalize", "striptags"],
        false,
        "{{ myObjectValue|capitalize|striptags }}"
    )]
    #[case(
        "myValue",
        &["striptags", "capitalize"],
        true,
        "{{ \"myValue\"|striptags|capitalize }}"
    )]
    fn test_echo_filter(
        #[case] value: &str,
        #[case] filters: &[&str],
        #[case] as_string: bool,
        #[case] expected: &str,
    ) {
        assert_eq!(echo_filter(value, filters, as_string), expected);
    }

    #[test]
    fn test_nested_blocks_close_innermost_first() {
        let mut stack = BlockStack::new();
        assert_eq!(echo_block(&mut stack, "a"), "{% block a %}");
        assert_eq!(echo_block(&mut stack, "b"), "{% block b %}");
        assert_eq!(echo_endblock(&mut stack), "{% endblock b %}");
        assert_eq!(echo_endblock(&mut stack), "{% endblock a %}");
    }

    #[test]
    fn test_unmatched_endblock_has_empty_name() {
        let mut stack = BlockStack::new();
        assert_eq!(echo_endblock(&mut stack), "{% endblock  %}");
    }

    #[rstest]
    #[case(None, "{% for item in list %}")]
    #[case(Some("key"), "{% for key,item in list %}")]
    #[case(Some(""), "{% for item in list %}")]
    fn test_echo_for(#[case] key: Option<&str>, #[case] expected: &str) {
        assert_eq!(echo_for("item", "list", key), expected);
    }

    #[test]
    fn test_named_references() {
        assert_eq!(echo_extends("base.html"), "{% extends \"base.html\" %}");
        assert_eq!(echo_use("blocks.html"), "{% use 'blocks.html' %}");
        assert_eq!(echo_print_block("title"), "{{ block('title') }}");
    }

    #[test]
    fn test_echo_array() {
        assert_eq!(echo_array(["b", "d"]), "[ 'b', 'd' ]");
        assert_eq!(echo_array(["b", "{{ f }}"]), "[ 'b', f ]");
        assert_eq!(echo_array(Vec::<String>::new()), "[  ]");
    }

    #[test]
    fn test_echo_map_keeps_order() {
        assert_eq!(
            echo_map([("a", "b"), ("c", "d"), ("e", "{{f}}")]),
            "{ a: 'b', c: 'd', e: f }"
        );
        assert_eq!(
            echo_map([("z", "1"), ("a", "2")]),
            "{ z: '1', a: '2' }"
        );
    }

    #[test]
    fn test_echo_include() {
        assert_eq!(
            echo_include("form.html", [("val1", "myVal1")], true),
            "{% include \"form.html\" with { val1: 'myVal1' } only %}"
        );
        assert_eq!(
            echo_include("form.html", [("val1", "{{ value }}")], false),
            "{% include \"form.html\" with { val1: value } %}"
        );
        assert_eq!(
            echo_include("form.html", Vec::<(&str, &str)>::new(), false),
            "{% include \"form.html\" with {  } %}"
        );
    }

    #[rstest]
    #[case(&[33], "!")]
    #[case(&[33, 35, 35], "!##")]
    #[case(&[321], "A")]
    #[case(&[-191], "A")]
    #[case(&[], "")]
    fn test_char_from_codes(#[case] codes: &[i64], #[case] expected: &str) {
        assert_eq!(char_from_codes(codes), expected);
    }
}
