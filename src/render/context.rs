use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use tera::{Context, Value};

/// Context key under which every template sees the builder rendering it.
pub const BUILDER_KEY: &str = "builder";

/// What a template can read about the builder rendering it, e.g.
/// `{{ builder.output_name }}`.
#[derive(Debug, Serialize)]
pub struct BuilderView<'a> {
    pub type_name: &'a str,
    pub short_type_name: &'a str,
    pub template_name: &'a str,
    pub output_name: &'a str,
    pub template_dirs: &'a [PathBuf],
    pub overwrite_if_exists: bool,
    pub variables: &'a BTreeMap<String, Value>,
}

/// Build the render context: every variable, plus the builder under
/// [`BUILDER_KEY`]. The builder entry always wins, replacing any caller
/// variable with that name.
pub fn build_context(variables: &BTreeMap<String, Value>, builder: &BuilderView<'_>) -> Context {
    let mut context = Context::new();
    for (key, value) in variables {
        context.insert(key, value);
    }
    context.insert(BUILDER_KEY, builder);
    context
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_key_overrides_caller_variable() {
        let mut variables = BTreeMap::new();
        variables.insert("builder".to_string(), Value::String("mine".into()));
        variables.insert("name".to_string(), Value::String("Tux".into()));

        let view = BuilderView {
            type_name: "app::Demo",
            short_type_name: "Demo",
            template_name: "Demo.tera",
            output_name: "demo.txt",
            template_dirs: &[],
            overwrite_if_exists: false,
            variables: &variables,
        };
        let context = build_context(&variables, &view);

        assert_eq!(context.get("name"), Some(&Value::String("Tux".into())));
        let builder = context.get(BUILDER_KEY).unwrap();
        assert_eq!(builder["output_name"], "demo.txt");
        assert_eq!(builder["short_type_name"], "Demo");
    }
}
