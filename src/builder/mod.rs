//! One template bound to one output file.

pub mod registration;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tera::Value;

use crate::emit::{SharedBlockStack, EMITTER_NAMES};
use crate::error::Result;
use crate::render::{
    self, build_context, file, install_filters, install_functions, load_templates,
    render_template, resolve_template, BuilderView, DEFAULT_COMPANION_GLOB, TEMPLATE_EXTENSION,
};

pub use registration::{
    FilterFn, FilterRegistration, FunctionFn, FunctionRegistration, Registration,
    RegistrationList,
};

/// Separator between the segments of a fully qualified type name.
pub const TYPE_SEPARATOR: &str = "::";

/// A type whose identity names a builder.
///
/// ```
/// use stamper::{Blueprint, Builder};
///
/// struct Model;
/// impl Blueprint for Model {}
///
/// let builder = Builder::of::<Model>();
/// assert_eq!(builder.short_type_name(), "Model");
/// assert_eq!(builder.template_name(), "Model.tera");
/// ```
pub trait Blueprint: 'static {
    /// Template directories a fresh builder starts with.
    fn default_template_dirs() -> Vec<PathBuf> {
        Vec::new()
    }
}

/// Last segment of a `::`-separated type name: `"app::models::User"` gives `"User"`.
///
/// Generic arguments are dropped, so `"app::Page<app::User>"` gives `"Page"`.
pub fn short_type_name(type_name: &str) -> &str {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit(TYPE_SEPARATOR).next().unwrap_or(base)
}

/// What [`Builder::write_to_disk`] did with the target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(PathBuf),
    /// The file already existed and overwriting was not allowed.
    Skipped(PathBuf),
}

impl WriteOutcome {
    pub fn path(&self) -> &Path {
        match self {
            WriteOutcome::Written(path) | WriteOutcome::Skipped(path) => path,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Builder {
    type_name: String,
    template_dirs: Vec<PathBuf>,
    template_name: String,
    output_name: String,
    must_overwrite_if_exists: bool,
    variables: BTreeMap<String, Value>,
    functions: RegistrationList<FunctionFn>,
    filters: RegistrationList<FilterFn>,
    companion_glob: String,
    temp_dir: Option<PathBuf>,
}

impl Builder {
    /// Create a builder identified by a fully qualified type name.
    pub fn new(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        let template_name = format!("{}{TEMPLATE_EXTENSION}", short_type_name(&type_name));
        Self {
            type_name,
            template_dirs: Vec::new(),
            template_name,
            output_name: String::new(),
            must_overwrite_if_exists: false,
            variables: BTreeMap::new(),
            functions: EMITTER_NAMES.iter().copied().map(Registration::named).collect(),
            filters: render::filters::FILTER_NAMES
                .iter()
                .copied()
                .map(Registration::named)
                .collect(),
            companion_glob: DEFAULT_COMPANION_GLOB.to_string(),
            temp_dir: None,
        }
    }

    /// Create a builder named after `B`, starting from its default directories.
    pub fn of<B: Blueprint>() -> Self {
        let mut builder = Self::new(std::any::type_name::<B>());
        builder.set_template_dirs(B::default_template_dirs());
        builder
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn short_type_name(&self) -> &str {
        short_type_name(&self.type_name)
    }

    pub fn add_template_dir(&mut self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        if !self.template_dirs.contains(&dir) {
            self.template_dirs.push(dir);
        }
    }

    /// Replace the template directories, dropping repeated entries.
    pub fn set_template_dirs<I, P>(&mut self, dirs: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.template_dirs.clear();
        for dir in dirs {
            self.add_template_dir(dir);
        }
    }

    pub fn template_dirs(&self) -> &[PathBuf] {
        &self.template_dirs
    }

    pub fn set_template_name(&mut self, name: impl Into<String>) {
        self.template_name = name.into();
    }

    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    pub fn default_template_name(&self) -> String {
        format!("{}{TEMPLATE_EXTENSION}", self.short_type_name())
    }

    pub fn set_output_name(&mut self, name: impl Into<String>) {
        self.output_name = name.into();
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    pub fn set_must_overwrite_if_exists(&mut self, overwrite: bool) {
        self.must_overwrite_if_exists = overwrite;
    }

    pub fn must_overwrite_if_exists(&self) -> bool {
        self.must_overwrite_if_exists
    }

    pub fn set_variables(&mut self, variables: BTreeMap<String, Value>) {
        self.variables = variables;
    }

    pub fn set_variable(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.variables.insert(key.into(), value.into());
    }

    pub fn variables(&self) -> &BTreeMap<String, Value> {
        &self.variables
    }

    /// A variable counts as set when present and not `null`.
    pub fn has_variable(&self, key: &str) -> bool {
        self.variables.get(key).is_some_and(|v| !v.is_null())
    }

    pub fn variable(&self, key: &str) -> Option<&Value> {
        self.variables.get(key).filter(|v| !v.is_null())
    }

    pub fn get_variable_or(&self, key: &str, default: impl Into<Value>) -> Value {
        self.variable(key).cloned().unwrap_or_else(|| default.into())
    }

    pub fn add_functions<I>(&mut self, functions: I)
    where
        I: IntoIterator<Item = FunctionRegistration>,
    {
        self.functions.extend(functions);
    }

    pub fn functions(&self) -> &RegistrationList<FunctionFn> {
        &self.functions
    }

    pub fn add_filters<I>(&mut self, filters: I)
    where
        I: IntoIterator<Item = FilterRegistration>,
    {
        self.filters.extend(filters);
    }

    pub fn filters(&self) -> &RegistrationList<FilterFn> {
        &self.filters
    }

    /// Glob (relative to each template directory) selecting the templates
    /// loaded alongside the main one.
    pub fn set_companion_glob(&mut self, pattern: impl Into<String>) {
        self.companion_glob = pattern.into();
    }

    pub fn companion_glob(&self) -> &str {
        &self.companion_glob
    }

    /// Directory used to stage writes before they are moved into place.
    pub fn set_temp_dir(&mut self, dir: impl Into<PathBuf>) {
        self.temp_dir = Some(dir.into());
    }

    pub fn temp_dir(&self) -> Option<&Path> {
        self.temp_dir.as_deref()
    }

    fn view(&self) -> BuilderView<'_> {
        BuilderView {
            type_name: &self.type_name,
            short_type_name: self.short_type_name(),
            template_name: &self.template_name,
            output_name: &self.output_name,
            template_dirs: &self.template_dirs,
            overwrite_if_exists: self.must_overwrite_if_exists,
            variables: &self.variables,
        }
    }

    /// Render the template with the builder's variables plus `builder`.
    ///
    /// Each call starts with an empty block stack.
    pub fn render(&self) -> Result<String> {
        let path = resolve_template(&self.template_name, &self.template_dirs)?;
        let mut tera = load_templates(
            &self.template_name,
            &path,
            &self.template_dirs,
            &self.companion_glob,
        )?;

        let stack = SharedBlockStack::default();
        install_functions(&mut tera, &self.functions, &stack)?;
        install_filters(&mut tera, &self.filters)?;

        let context = build_context(&self.variables, &self.view());
        tracing::debug!(
            builder = self.short_type_name(),
            template = %self.template_name,
            "rendering"
        );
        render_template(&tera, &self.template_name, &context)
    }

    /// Render into `output_dir/output_name`.
    ///
    /// An existing file is left untouched unless overwriting is enabled;
    /// that case is not an error.
    pub fn write_to_disk(&self, output_dir: &Path) -> Result<WriteOutcome> {
        let path = output_dir.join(&self.output_name);
        if let Some(parent) = path.parent() {
            file::ensure_dir(parent)?;
        }

        if path.exists() && !self.must_overwrite_if_exists {
            tracing::debug!(path = %path.display(), "exists, not overwriting");
            return Ok(WriteOutcome::Skipped(path));
        }

        let content = self.render()?;
        file::write_output(&path, &content, self.temp_dir.as_deref())?;
        tracing::info!(path = %path.display(), bytes = content.len(), "wrote");
        Ok(WriteOutcome::Written(path))
    }
}
