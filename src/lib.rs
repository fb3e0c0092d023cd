pub mod builder;
pub mod config;
pub mod diff;
pub mod emit;
pub mod error;
pub mod generator;
pub mod render;

use std::collections::BTreeMap;
use std::path::PathBuf;

use tera::Value;

pub use crate::builder::{
    Blueprint, Builder, FilterRegistration, FunctionRegistration, Registration, WriteOutcome,
};
pub use crate::emit::BlockStack;
pub use crate::error::{Result, StamperError};
pub use crate::generator::{Generator, RenderedOutput, WriteReport};

use crate::config::{load_manifest, load_user_config, Manifest};
use crate::diff::{diff_outputs, OutputDiff};

pub struct GenerateOptions {
    /// Manifest file, or a directory holding `stamper.toml`.
    pub manifest: PathBuf,
    pub output: PathBuf,
    /// Variable overrides from the command line; they win over every other layer.
    pub data: Vec<(String, String)>,
    /// Force overwriting existing files for every builder.
    pub overwrite: bool,
    /// User-level variable defaults; `None` reads them from the user config file.
    pub user_variables: Option<BTreeMap<String, Value>>,
}

impl GenerateOptions {
    pub fn new(manifest: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            manifest: manifest.into(),
            output: output.into(),
            data: Vec::new(),
            overwrite: false,
            user_variables: None,
        }
    }
}

/// What writing a rendered output would do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedAction {
    Create,
    Overwrite,
    Skip,
}

#[derive(Debug)]
pub struct PlannedOutput {
    pub rendered: RenderedOutput,
    pub path: PathBuf,
    pub action: PlannedAction,
}

/// Rendered outputs that have not been written yet.
#[derive(Debug)]
pub struct GenerationPlan {
    pub output_dir: PathBuf,
    pub outputs: Vec<PlannedOutput>,
}

/// Parse a `-D key=value` value: JSON scalars and literals keep their type,
/// anything else is taken as a string.
pub fn parse_data_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Build a generator from a loaded manifest.
///
/// Variable layers, lowest first: user config, manifest `[generator.variables]`,
/// builder variables, then `overrides`.
pub fn build_generator(
    manifest: &Manifest,
    user_variables: &BTreeMap<String, Value>,
    overrides: &[(String, String)],
    force_overwrite: bool,
) -> Result<Generator> {
    let mut generator = Generator::new()?;

    let overrides: Vec<(String, Value)> = overrides
        .iter()
        .map(|(k, v)| (k.clone(), parse_data_value(v)))
        .collect();

    let mut shared = user_variables.clone();
    shared.extend(
        manifest
            .generator
            .variables
            .iter()
            .map(|(k, v)| (k.clone(), v.clone())),
    );
    generator.set_variables(shared);
    generator.set_template_dirs(
        manifest
            .generator
            .template_dirs
            .iter()
            .map(|d| manifest.resolve_path(d)),
    );
    generator.set_must_overwrite_if_exists(force_overwrite || manifest.generator.overwrite);
    if let Some(pattern) = &manifest.generator.companion_glob {
        generator.set_companion_glob(pattern.clone());
    }

    for config in &manifest.builders {
        let mut builder = Builder::new(config.type_name.as_str());
        builder.set_output_name(config.output.as_str());
        if let Some(template) = &config.template {
            builder.set_template_name(template.as_str());
        }
        builder.set_variables(config.variables.clone());

        let registered = generator.register_builder(builder);
        for dir in &config.template_dirs {
            registered.add_template_dir(manifest.resolve_path(dir));
        }
        if let (Some(overwrite), false) = (config.overwrite, force_overwrite) {
            registered.set_must_overwrite_if_exists(overwrite);
        }
        for (key, value) in &overrides {
            registered.set_variable(key.clone(), value.clone());
        }
    }

    Ok(generator)
}

/// Load the manifest, and the user config unless `options` carries user
/// variables, then build the generator.
pub fn prepare_generator(options: &GenerateOptions) -> Result<Generator> {
    let manifest = load_manifest(&options.manifest)?;
    let user_variables = match &options.user_variables {
        Some(variables) => variables.clone(),
        None => load_user_config()?
            .map(|config| config.variables)
            .unwrap_or_default(),
    };
    build_generator(&manifest, &user_variables, &options.data, options.overwrite)
}

/// Render every builder in memory and work out what writing would do.
pub fn plan_generation(options: &GenerateOptions) -> Result<GenerationPlan> {
    let generator = prepare_generator(options)?;

    let outputs = generator
        .render_all()?
        .into_iter()
        .map(|rendered| {
            let path = options.output.join(&rendered.output_name);
            let overwrite = generator
                .builder(&rendered.builder)
                .is_some_and(Builder::must_overwrite_if_exists);
            let action = match (path.exists(), overwrite) {
                (false, _) => PlannedAction::Create,
                (true, true) => PlannedAction::Overwrite,
                (true, false) => PlannedAction::Skip,
            };
            PlannedOutput {
                rendered,
                path,
                action,
            }
        })
        .collect();

    Ok(GenerationPlan {
        output_dir: options.output.clone(),
        outputs,
    })
}

/// Render and write every builder of the manifest.
pub fn generate(options: &GenerateOptions) -> Result<WriteReport> {
    let generator = prepare_generator(options)?;
    generator.write_on_disk(&options.output)
}

/// Render a single builder by id. The output directory of `options` is not used.
pub fn render_builder(options: &GenerateOptions, id: &str) -> Result<String> {
    let generator = prepare_generator(options)?;
    let builder = generator
        .builder(id)
        .ok_or_else(|| StamperError::UnknownBuilder { id: id.to_string() })?;
    builder.render()
}

/// Compare rendered outputs with the files already in the output directory.
pub fn diff_generation(options: &GenerateOptions) -> Result<Vec<OutputDiff>> {
    let generator = prepare_generator(options)?;
    diff_outputs(&generator.render_all()?, &options.output)
}
