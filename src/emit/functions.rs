//! Tera bindings for the emission functions.
//!
//! Templates call them with keyword arguments:
//!
//! ```text
//! {{ echo_block(name="content") }}
//!   {{ echo_for(item="row", collection="rows") }}{{ echo_print(value="row") }}{{ echo_endfor() }}
//! {{ echo_endblock() }}
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tera::{Tera, Value};

use super::stack::BlockStack;

/// Block stack shared by the `echo_block`/`echo_endblock` pair of one render.
///
/// Tera wants registered functions to be `Send + Sync`, hence the mutex.
pub type SharedBlockStack = Arc<Mutex<BlockStack>>;

/// Every emission function name, in the order they are registered.
pub const EMITTER_NAMES: &[&str] = &[
    "echo_print",
    "echo_block",
    "echo_endblock",
    "echo_for",
    "echo_endfor",
    "echo_raw",
    "echo_endraw",
    "echo_extends",
    "echo_if",
    "echo_else",
    "echo_elseif",
    "echo_endif",
    "echo_set",
    "echo_array",
    "echo_map",
    "echo_filter",
    "echo_include",
    "echo_use",
    "echo_print_block",
    "char",
];

type Args = HashMap<String, Value>;

/// Register the emission function called `name` on `tera`.
///
/// Returns `false` when `name` is not an emission function.
pub fn register_emitter(tera: &mut Tera, name: &str, stack: &SharedBlockStack) -> bool {
    match name {
        "echo_print" => tera.register_function(name, |args: &Args| {
            let value = required_text("echo_print", args, "value")?;
            Ok(Value::String(super::echo_print(&value)))
        }),
        "echo_block" => {
            let stack = Arc::clone(stack);
            tera.register_function(name, move |args: &Args| {
                let block = required_text("echo_block", args, "name")?;
                Ok(Value::String(super::echo_block(&mut lock(&stack), &block)))
            })
        }
        "echo_endblock" => {
            let stack = Arc::clone(stack);
            tera.register_function(name, move |_: &Args| {
                Ok(Value::String(super::echo_endblock(&mut lock(&stack))))
            })
        }
        "echo_for" => tera.register_function(name, |args: &Args| {
            let item = required_text("echo_for", args, "item")?;
            let collection = required_text("echo_for", args, "collection")?;
            let key = optional_text(args, "key");
            Ok(Value::String(super::echo_for(
                &item,
                &collection,
                key.as_deref(),
            )))
        }),
        "echo_endfor" => fixed(tera, name, super::echo_endfor()),
        "echo_raw" => fixed(tera, name, super::echo_raw()),
        "echo_endraw" => fixed(tera, name, super::echo_endraw()),
        "echo_extends" => tera.register_function(name, |args: &Args| {
            let template = required_text("echo_extends", args, "name")?;
            Ok(Value::String(super::echo_extends(&template)))
        }),
        "echo_if" => tera.register_function(name, |args: &Args| {
            let condition = required_condition("echo_if", args)?;
            Ok(Value::String(super::echo_if(condition)))
        }),
        "echo_elseif" => tera.register_function(name, |args: &Args| {
            let condition = required_condition("echo_elseif", args)?;
            Ok(Value::String(super::echo_elseif(condition)))
        }),
        "echo_else" => fixed(tera, name, super::echo_else()),
        "echo_endif" => fixed(tera, name, super::echo_endif()),
        "echo_set" => tera.register_function(name, |args: &Args| {
            let var = required_text("echo_set", args, "name")?;
            let value = required_text("echo_set", args, "value")?;
            let as_string = flag("echo_set", args, "as_string", true)?;
            Ok(Value::String(super::echo_set(&var, &value, as_string)))
        }),
        "echo_array" => tera.register_function(name, |args: &Args| {
            let values = match args.get("values") {
                Some(Value::Array(items)) => items.iter().map(text).collect::<Vec<_>>(),
                Some(other) => {
                    return Err(tera::Error::msg(format!(
                        "echo_array: `values` must be an array, got {other}"
                    )))
                }
                None => return Err(missing("echo_array", "values")),
            };
            Ok(Value::String(super::echo_array(values)))
        }),
        "echo_map" => tera.register_function(name, |args: &Args| {
            let pairs = match args.get("values") {
                Some(value) => object_pairs("echo_map", "values", value)?,
                None => return Err(missing("echo_map", "values")),
            };
            Ok(Value::String(super::echo_map(pairs)))
        }),
        "echo_filter" => tera.register_function(name, |args: &Args| {
            let value = required_text("echo_filter", args, "value")?;
            let filters = match args.get("filters") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(items)) => items.iter().map(text).collect(),
                Some(single) => vec![text(single)],
            };
            let as_string = flag("echo_filter", args, "as_string", false)?;
            Ok(Value::String(super::echo_filter(&value, &filters, as_string)))
        }),
        "echo_include" => tera.register_function(name, |args: &Args| {
            let template = required_text("echo_include", args, "template")?;
            let params = match args.get("params") {
                None | Some(Value::Null) => Vec::new(),
                Some(value) => object_pairs("echo_include", "params", value)?,
            };
            let only = flag("echo_include", args, "only", false)?;
            Ok(Value::String(super::echo_include(&template, params, only)))
        }),
        "echo_use" => tera.register_function(name, |args: &Args| {
            let template = required_text("echo_use", args, "name")?;
            Ok(Value::String(super::echo_use(&template)))
        }),
        "echo_print_block" => tera.register_function(name, |args: &Args| {
            let block = required_text("echo_print_block", args, "name")?;
            Ok(Value::String(super::echo_print_block(&block)))
        }),
        "char" => tera.register_function(name, |args: &Args| {
            let codes = match args.get("codes") {
                Some(Value::Array(items)) => items
                    .iter()
                    .map(|item| code("char", item))
                    .collect::<tera::Result<Vec<_>>>()?,
                Some(single) => vec![code("char", single)?],
                None => return Err(missing("char", "codes")),
            };
            Ok(Value::String(super::char_from_codes(&codes)))
        }),
        _ => return false,
    }
    true
}

fn fixed(tera: &mut Tera, name: &str, output: &'static str) {
    tera.register_function(name, move |_: &Args| Ok(Value::String(output.to_string())));
}

fn lock(stack: &SharedBlockStack) -> MutexGuard<'_, BlockStack> {
    stack.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Text of a value as it should appear in emitted source: strings verbatim,
/// everything else as JSON.
fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn missing(function: &str, arg: &str) -> tera::Error {
    tera::Error::msg(format!("{function}: missing required argument `{arg}`"))
}

fn required_text(function: &str, args: &Args, arg: &str) -> tera::Result<String> {
    args.get(arg).map(text).ok_or_else(|| missing(function, arg))
}

fn optional_text(args: &Args, arg: &str) -> Option<String> {
    match args.get(arg) {
        None | Some(Value::Null) => None,
        Some(value) => Some(text(value)),
    }
}

fn required_condition(function: &str, args: &Args) -> tera::Result<super::Condition> {
    match args.get("condition") {
        Some(Value::Bool(b)) => Ok(super::Condition::Bool(*b)),
        Some(other) => Ok(super::Condition::Expr(text(other))),
        None => Err(missing(function, "condition")),
    }
}

fn flag(function: &str, args: &Args, arg: &str, default: bool) -> tera::Result<bool> {
    match args.get(arg) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(tera::Error::msg(format!(
            "{function}: `{arg}` must be a boolean, got {other}"
        ))),
    }
}

fn object_pairs(function: &str, arg: &str, value: &Value) -> tera::Result<Vec<(String, String)>> {
    match value {
        Value::Object(map) => Ok(map.iter().map(|(k, v)| (k.clone(), text(v))).collect()),
        other => Err(tera::Error::msg(format!(
            "{function}: `{arg}` must be an object, got {other}"
        ))),
    }
}

fn code(function: &str, value: &Value) -> tera::Result<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .ok_or_else(|| {
            tera::Error::msg(format!(
                "{function}: character codes must be numbers, got {value}"
            ))
        })
}
