//! Built-in filters available to every builder by name.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex_lite::Regex;
use tera::{Tera, Value};

pub const FILTER_NAMES: &[&str] = &[
    "addslashes",
    "ucfirst",
    "substr",
    "is_numeric",
    "as_php",
    "ident",
];

type Args = HashMap<String, Value>;

/// Register the built-in filter called `name`. Returns `false` for unknown names.
pub fn register_named_filter(tera: &mut Tera, name: &str) -> bool {
    match name {
        "addslashes" => tera.register_filter(name, addslashes),
        "ucfirst" => tera.register_filter(name, ucfirst),
        "substr" => tera.register_filter(name, substr),
        "is_numeric" => tera.register_filter(name, is_numeric),
        "as_php" => tera.register_filter(name, as_php),
        "ident" => tera.register_filter(name, ident),
        _ => return false,
    }
    true
}

fn as_str<'a>(filter: &str, value: &'a Value) -> tera::Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| tera::Error::msg(format!("{filter}: expected a string, got {value}")))
}

/// Backslash-escape quotes, backslashes and NUL bytes.
pub fn addslashes(value: &Value, _: &Args) -> tera::Result<Value> {
    let input = as_str("addslashes", value)?;
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\\' | '\'' | '"' => {
                out.push('\\');
                out.push(c);
            }
            '\0' => out.push_str("\\0"),
            _ => out.push(c),
        }
    }
    Ok(Value::String(out))
}

pub fn ucfirst(value: &Value, _: &Args) -> tera::Result<Value> {
    let input = as_str("ucfirst", value)?;
    let mut chars = input.chars();
    let out = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    Ok(Value::String(out))
}

/// Character substring. `start` may be negative to count from the end;
/// a negative `length` stops that many characters before the end.
pub fn substr(value: &Value, args: &Args) -> tera::Result<Value> {
    let input = as_str("substr", value)?;
    let chars: Vec<char> = input.chars().collect();
    let len = chars.len() as i64;

    let start = match args.get("start") {
        Some(v) => v
            .as_i64()
            .ok_or_else(|| tera::Error::msg("substr: `start` must be an integer"))?,
        None => return Err(tera::Error::msg("substr: missing required argument `start`")),
    };
    let start = if start < 0 {
        (len + start).max(0)
    } else {
        start.min(len)
    };

    let end = match args.get("length").and_then(Value::as_i64) {
        Some(length) if length < 0 => (len + length).max(start),
        Some(length) => (start + length).min(len),
        None => len,
    };

    Ok(Value::String(
        chars[start as usize..end as usize].iter().collect(),
    ))
}

pub fn is_numeric(value: &Value, _: &Args) -> tera::Result<Value> {
    let numeric = match value {
        Value::Number(_) => true,
        Value::String(s) => s.trim().parse::<f64>().is_ok_and(f64::is_finite),
        _ => false,
    };
    Ok(Value::Bool(numeric))
}

/// Render a value as a PHP source literal, e.g. `array('id' => 1, 'tags' => array('a'))`.
pub fn as_php(value: &Value, _: &Args) -> tera::Result<Value> {
    Ok(Value::String(php_literal(value)))
}

fn php_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => php_string(s),
        Value::Array(items) => {
            let items = items.iter().map(php_literal).collect::<Vec<_>>();
            format!("array({})", items.join(", "))
        }
        Value::Object(map) => {
            let pairs = map
                .iter()
                .map(|(k, v)| format!("{} => {}", php_string(k), php_literal(v)))
                .collect::<Vec<_>>();
            format!("array({})", pairs.join(", "))
        }
    }
}

/// Single-quoted PHP string; only `\` and `'` need escaping.
fn php_string(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Strip every non-word character, e.g. `"user-name 2"` becomes `"username2"`.
pub fn ident(value: &Value, _: &Args) -> tera::Result<Value> {
    static NON_WORD: OnceLock<Regex> = OnceLock::new();

    let input = as_str("ident", value)?;
    let re = NON_WORD.get_or_init(|| Regex::new(r"[^\w]+").expect("valid regex"));
    Ok(Value::String(re.replace_all(input, "").to_string()))
}
