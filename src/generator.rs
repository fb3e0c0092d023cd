//! Shared configuration and the registry of builders.
//!
//! Shared settings are copied into a builder when it is registered, not
//! linked: changing them afterwards leaves registered builders untouched.
//! A generator owns its temp directory; it is removed when the generator is
//! dropped unless [`Generator::set_auto_remove_temp_dir`] turned that off.
//! Neither the generator nor its builders are meant to be driven from
//! several threads at once.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tera::Value;

use crate::builder::{
    Builder, FilterFn, FilterRegistration, FunctionFn, FunctionRegistration, RegistrationList,
    WriteOutcome,
};
use crate::error::{Result, StamperError};
use crate::render::file::ensure_dir;

/// Prefix of the temp directory each generator creates.
pub const TEMP_DIR_PREFIX: &str = "stamper";

/// Rendered content of one builder, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOutput {
    pub builder: String,
    pub output_name: String,
    pub content: String,
}

/// Files touched by [`Generator::write_on_disk`], in registration order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

#[derive(Debug)]
pub struct Generator {
    temp_dir: Option<TempDir>,
    temp_path: PathBuf,
    auto_remove_temp_dir: bool,
    builders: Vec<(String, Builder)>,
    must_overwrite_if_exists: bool,
    template_dirs: Vec<PathBuf>,
    variables: BTreeMap<String, Value>,
    functions: RegistrationList<FunctionFn>,
    filters: RegistrationList<FilterFn>,
    companion_glob: Option<String>,
}

impl Generator {
    /// Create a generator whose temp directory lives in the system temp dir.
    pub fn new() -> Result<Self> {
        Self::with_base_temp_dir(std::env::temp_dir())
    }

    /// Create a generator whose temp directory lives inside `base`.
    ///
    /// `base` is created when missing. Every generator gets its own
    /// uniquely named directory.
    pub fn with_base_temp_dir(base: impl AsRef<Path>) -> Result<Self> {
        let base = base.as_ref();
        ensure_dir(base)?;

        let temp_dir = tempfile::Builder::new()
            .prefix(TEMP_DIR_PREFIX)
            .tempdir_in(base)
            .map_err(|e| StamperError::Io {
                context: format!("creating temp directory in {}", base.display()),
                source: e,
            })?;
        let temp_path = temp_dir.path().to_path_buf();
        tracing::debug!(path = %temp_path.display(), "created generator temp directory");

        Ok(Self {
            temp_dir: Some(temp_dir),
            temp_path,
            auto_remove_temp_dir: true,
            builders: Vec::new(),
            must_overwrite_if_exists: false,
            template_dirs: Vec::new(),
            variables: BTreeMap::new(),
            functions: RegistrationList::new(),
            filters: RegistrationList::new(),
            companion_glob: None,
        })
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_path
    }

    pub fn set_auto_remove_temp_dir(&mut self, auto_remove: bool) {
        self.auto_remove_temp_dir = auto_remove;
    }

    pub fn set_must_overwrite_if_exists(&mut self, overwrite: bool) {
        self.must_overwrite_if_exists = overwrite;
    }

    pub fn set_template_dirs<I, P>(&mut self, dirs: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.template_dirs = dirs.into_iter().map(Into::into).collect();
    }

    /// Replace the shared variables. Builders registered earlier keep
    /// what they received at registration.
    pub fn set_variables(&mut self, variables: BTreeMap<String, Value>) {
        self.variables = variables;
    }

    pub fn variables(&self) -> &BTreeMap<String, Value> {
        &self.variables
    }

    pub fn set_functions<I>(&mut self, functions: I)
    where
        I: IntoIterator<Item = FunctionRegistration>,
    {
        self.functions = functions.into_iter().collect();
    }

    pub fn set_filters<I>(&mut self, filters: I)
    where
        I: IntoIterator<Item = FilterRegistration>,
    {
        self.filters = filters.into_iter().collect();
    }

    pub fn set_companion_glob(&mut self, pattern: impl Into<String>) {
        self.companion_glob = Some(pattern.into());
    }

    /// Hand the shared configuration to `builder` and store it under its
    /// short type name, replacing a builder registered under the same name.
    ///
    /// Template directories and the overwrite flag replace the builder's
    /// own; functions and filters are appended; variables are merged with
    /// the builder's own values winning.
    pub fn register_builder(&mut self, mut builder: Builder) -> &mut Builder {
        builder.set_temp_dir(&self.temp_path);
        builder.add_functions(self.functions.iter().cloned());
        builder.add_filters(self.filters.iter().cloned());
        builder.set_template_dirs(self.template_dirs.iter().cloned());
        builder.set_must_overwrite_if_exists(self.must_overwrite_if_exists);
        if let Some(pattern) = &self.companion_glob {
            builder.set_companion_glob(pattern.clone());
        }

        let mut variables = self.variables.clone();
        variables.extend(
            builder
                .variables()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        builder.set_variables(variables);

        let id = builder.short_type_name().to_string();
        tracing::debug!(builder = %id, "registered builder");

        let index = match self.builders.iter().position(|(key, _)| *key == id) {
            Some(index) => {
                self.builders[index].1 = builder;
                index
            }
            None => {
                self.builders.push((id, builder));
                self.builders.len() - 1
            }
        };
        &mut self.builders[index].1
    }

    /// Registered builders with their ids, in registration order.
    pub fn builders(&self) -> impl Iterator<Item = (&str, &Builder)> {
        self.builders.iter().map(|(id, b)| (id.as_str(), b))
    }

    pub fn builder(&self, id: &str) -> Option<&Builder> {
        self.builders
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, b)| b)
    }

    pub fn builder_mut(&mut self, id: &str) -> Option<&mut Builder> {
        self.builders
            .iter_mut()
            .find(|(key, _)| key == id)
            .map(|(_, b)| b)
    }

    /// Render every builder without touching the output directory.
    pub fn render_all(&self) -> Result<Vec<RenderedOutput>> {
        self.builders
            .iter()
            .map(|(id, builder)| {
                Ok(RenderedOutput {
                    builder: id.clone(),
                    output_name: builder.output_name().to_string(),
                    content: builder.render()?,
                })
            })
            .collect()
    }

    /// Write every builder into `output_dir`, stopping at the first error.
    /// Files written before the error stay on disk.
    pub fn write_on_disk(&self, output_dir: &Path) -> Result<WriteReport> {
        let mut report = WriteReport::default();
        for (_, builder) in &self.builders {
            match builder.write_to_disk(output_dir)? {
                WriteOutcome::Written(path) => report.written.push(path),
                WriteOutcome::Skipped(path) => report.skipped.push(path),
            }
        }
        Ok(report)
    }
}

impl Drop for Generator {
    fn drop(&mut self) {
        let Some(temp_dir) = self.temp_dir.take() else {
            return;
        };

        if !self.auto_remove_temp_dir {
            let kept = temp_dir.keep();
            tracing::debug!(path = %kept.display(), "keeping generator temp directory");
            return;
        }

        match temp_dir.close() {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    path = %self.temp_path.display(),
                    error = %e,
                    "could not remove generator temp directory"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Blueprint;
    use std::fs;

    struct DemoBuilder;
    impl Blueprint for DemoBuilder {}

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(*v)))
            .collect()
    }

    fn generator() -> (tempfile::TempDir, Generator) {
        let base = tempfile::tempdir().unwrap();
        let generator = Generator::with_base_temp_dir(base.path()).unwrap();
        (base, generator)
    }

    #[test]
    fn builder_variables_win_over_shared() {
        let (_base, mut generator) = generator();
        let mut builder = Builder::of::<DemoBuilder>();
        builder.set_variables(vars(&[("foo", "bar")]));

        generator.set_variables(vars(&[("foo", "common bar"), ("baz", "common baz")]));
        let builder = generator.register_builder(builder);

        assert_eq!(builder.get_variable_or("foo", ""), "bar");
        assert_eq!(builder.get_variable_or("baz", ""), "common baz");
    }

    #[test]
    fn only_builder_variables() {
        let (_base, mut generator) = generator();
        let mut builder = Builder::of::<DemoBuilder>();
        builder.set_variables(vars(&[("foo", "bar")]));

        let builder = generator.register_builder(builder);
        assert_eq!(builder.get_variable_or("foo", ""), "bar");
    }

    #[test]
    fn shared_variables_reach_every_builder() {
        let (_base, mut generator) = generator();
        generator.set_variables(vars(&[("foo", "common foo")]));
        generator.register_builder(Builder::new("app::One"));
        generator.register_builder(Builder::new("app::Two"));

        for (_, builder) in generator.builders() {
            assert_eq!(builder.get_variable_or("foo", ""), "common foo");
        }
    }

    #[test]
    fn variables_set_after_registration_are_not_seen() {
        let (_base, mut generator) = generator();
        generator.register_builder(Builder::of::<DemoBuilder>());
        generator.set_variables(vars(&[("foo", "bar")]));

        let builder = generator.builder("DemoBuilder").unwrap();
        assert!(builder.variable("foo").is_none());
        assert_eq!(builder.get_variable_or("foo", "default"), "default");
    }

    #[test]
    fn registration_copies_shared_settings() {
        let (_base, mut generator) = generator();
        generator.set_template_dirs(["shared"]);
        generator.set_must_overwrite_if_exists(true);
        generator.set_companion_glob("**/*.inc");
        generator.set_filters([FilterRegistration::named("ident")]);
        generator.set_functions([FunctionRegistration::function("now_ish", |_| {
            Ok(Value::from(0))
        })]);

        let mut builder = Builder::new("app::Page");
        builder.add_template_dir("own");
        let functions_before = builder.functions().len();
        let filters_before = builder.filters().len();

        let builder = generator.register_builder(builder);
        assert_eq!(builder.template_dirs(), [PathBuf::from("shared")]);
        assert!(builder.must_overwrite_if_exists());
        assert_eq!(builder.companion_glob(), "**/*.inc");
        assert_eq!(builder.functions().len(), functions_before + 1);
        assert_eq!(builder.filters().len(), filters_before);
        assert!(builder.temp_dir().is_some());
    }

    #[test]
    fn reregistering_replaces_in_place() {
        let (_base, mut generator) = generator();
        generator.register_builder(Builder::new("app::First"));
        generator.register_builder(Builder::new("app::Second"));

        let mut replacement = Builder::new("other::First");
        replacement.set_output_name("replaced.txt");
        generator.register_builder(replacement);

        let ids: Vec<_> = generator.builders().map(|(id, _)| id).collect();
        assert_eq!(ids, ["First", "Second"]);
        assert_eq!(
            generator.builder("First").unwrap().output_name(),
            "replaced.txt"
        );
    }

    #[test]
    fn write_on_disk_fans_out() {
        let (_base, mut generator) = generator();
        let templates = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::write(templates.path().join("One.tera"), "one {{ shared }}").unwrap();
        fs::write(templates.path().join("Two.tera"), "two {{ shared }}").unwrap();
        fs::write(output.path().join("two.txt"), "keep").unwrap();

        generator.set_template_dirs([templates.path()]);
        generator.set_variables(vars(&[("shared", "x")]));
        generator
            .register_builder(Builder::new("app::One"))
            .set_output_name("one.txt");
        generator
            .register_builder(Builder::new("app::Two"))
            .set_output_name("two.txt");

        let report = generator.write_on_disk(output.path()).unwrap();
        assert_eq!(report.written, [output.path().join("one.txt")]);
        assert_eq!(report.skipped, [output.path().join("two.txt")]);
        assert_eq!(
            fs::read_to_string(output.path().join("one.txt")).unwrap(),
            "one x"
        );
        assert_eq!(
            fs::read_to_string(output.path().join("two.txt")).unwrap(),
            "keep"
        );
    }

    #[test]
    fn write_on_disk_stops_at_first_error() {
        let (_base, mut generator) = generator();
        let templates = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::write(templates.path().join("Good.tera"), "ok").unwrap();

        generator.set_template_dirs([templates.path()]);
        generator
            .register_builder(Builder::new("app::Good"))
            .set_output_name("good.txt");
        generator
            .register_builder(Builder::new("app::Missing"))
            .set_output_name("missing.txt");
        generator
            .register_builder(Builder::new("app::Later"))
            .set_output_name("later.txt");

        let result = generator.write_on_disk(output.path());
        assert!(matches!(result, Err(StamperError::TemplateNotFound { .. })));
        assert!(output.path().join("good.txt").exists());
        assert!(!output.path().join("later.txt").exists());
    }

    #[test]
    fn render_all_does_not_write() {
        let (_base, mut generator) = generator();
        let templates = tempfile::tempdir().unwrap();
        fs::write(templates.path().join("Page.tera"), "page").unwrap();
        generator.set_template_dirs([templates.path()]);
        generator
            .register_builder(Builder::new("app::Page"))
            .set_output_name("page.txt");

        let outputs = generator.render_all().unwrap();
        assert_eq!(
            outputs,
            [RenderedOutput {
                builder: "Page".into(),
                output_name: "page.txt".into(),
                content: "page".into(),
            }]
        );
    }

    #[test]
    fn temp_dir_removed_on_drop() {
        let (base, generator) = generator();
        let temp = generator.temp_dir().to_path_buf();
        assert!(temp.is_dir());
        assert!(temp.starts_with(base.path()));
        fs::write(temp.join("cached.txt"), "x").unwrap();

        drop(generator);
        assert!(!temp.exists());
        assert!(base.path().exists());
    }

    #[test]
    fn temp_dir_kept_when_auto_remove_disabled() {
        let (_base, mut generator) = generator();
        generator.set_auto_remove_temp_dir(false);
        let temp = generator.temp_dir().to_path_buf();

        drop(generator);
        assert!(temp.is_dir());
    }

    #[test]
    fn temp_dir_already_gone_is_tolerated() {
        let (_base, generator) = generator();
        fs::remove_dir_all(generator.temp_dir()).unwrap();
        drop(generator);
    }

    #[test]
    fn generators_do_not_share_temp_dirs() {
        let base = tempfile::tempdir().unwrap();
        let first = Generator::with_base_temp_dir(base.path()).unwrap();
        let second = Generator::with_base_temp_dir(base.path()).unwrap();
        assert_ne!(first.temp_dir(), second.temp_dir());
    }
}
