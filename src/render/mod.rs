pub mod context;
pub mod file;
pub mod filters;
pub mod loader;

use std::collections::HashMap;
use std::sync::Arc;

use tera::{Context, Tera, Value};

use crate::builder::registration::{FilterFn, FunctionFn, Registration, RegistrationList};
use crate::emit::{register_emitter, SharedBlockStack};
use crate::error::{Result, StamperError};

pub use context::{build_context, BuilderView, BUILDER_KEY};
pub use file::write_output;
pub use filters::register_named_filter;
pub use loader::{load_templates, resolve_template, DEFAULT_COMPANION_GLOB, TEMPLATE_EXTENSION};

/// Register every function in `functions` on `tera`. Named entries come from
/// the emission catalog and share `stack`.
pub fn install_functions(
    tera: &mut Tera,
    functions: &RegistrationList<FunctionFn>,
    stack: &SharedBlockStack,
) -> Result<()> {
    for entry in functions {
        match entry {
            Registration::Named(name) => {
                if !register_emitter(tera, name, stack) {
                    return Err(StamperError::UnknownFunction { name: name.clone() });
                }
            }
            Registration::Bound { name, callable } => {
                let callable = Arc::clone(callable);
                tera.register_function(name, move |args: &HashMap<String, Value>| {
                    callable(args)
                });
            }
        }
    }
    Ok(())
}

/// Register every filter in `filters` on `tera`.
pub fn install_filters(tera: &mut Tera, filters: &RegistrationList<FilterFn>) -> Result<()> {
    for entry in filters {
        match entry {
            Registration::Named(name) => {
                if !register_named_filter(tera, name) {
                    return Err(StamperError::UnknownFilter { name: name.clone() });
                }
            }
            Registration::Bound { name, callable } => {
                let callable = Arc::clone(callable);
                tera.register_filter(
                    name,
                    move |value: &Value, args: &HashMap<String, Value>| {
                        callable(value, args)
                    },
                );
            }
        }
    }
    Ok(())
}

pub fn render_template(tera: &Tera, template_name: &str, context: &Context) -> Result<String> {
    tera.render(template_name, context)
        .map_err(|e| StamperError::RenderError {
            template: template_name.to_string(),
            source: e,
        })
}
