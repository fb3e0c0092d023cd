use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tera::Value;

use crate::builder::short_type_name;
use crate::error::{Result, StamperError};

/// Root structure deserialized from `stamper.toml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Manifest {
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Builders in registration order.
    #[serde(default)]
    pub builders: Vec<BuilderConfig>,

    /// Directory the manifest was loaded from; relative template
    /// directories are resolved against it.
    #[serde(skip)]
    pub root: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GeneratorConfig {
    /// Shared template directories, searched in order.
    #[serde(default)]
    pub template_dirs: Vec<PathBuf>,

    /// Overwrite existing output files.
    #[serde(default)]
    pub overwrite: bool,

    /// Glob selecting companion templates (default: `**/*.tera`).
    pub companion_glob: Option<String>,

    /// Variables every builder starts with.
    #[serde(default)]
    pub variables: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuilderConfig {
    /// Fully qualified identity, e.g. `app::models::User`.
    #[serde(rename = "type")]
    pub type_name: String,

    /// Template name; defaults to `<ShortTypeName>.tera`.
    pub template: Option<String>,

    /// Output path relative to the output directory.
    pub output: String,

    /// Per-builder overwrite flag, applied after the shared one.
    pub overwrite: Option<bool>,

    /// Extra template directories searched after the shared ones.
    #[serde(default)]
    pub template_dirs: Vec<PathBuf>,

    #[serde(default)]
    pub variables: BTreeMap<String, Value>,
}

impl Manifest {
    /// Validate the manifest for internal consistency.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();

        for builder in &self.builders {
            if builder.type_name.trim().is_empty() {
                return Err(StamperError::ManifestInvalid {
                    builder: builder.output.clone(),
                    reason: "'type' must not be empty".into(),
                });
            }

            if builder.output.trim().is_empty() {
                return Err(StamperError::ManifestInvalid {
                    builder: builder.type_name.clone(),
                    reason: "'output' must not be empty".into(),
                });
            }

            // builders are keyed by short name, so a repeat would silently replace
            let short = short_type_name(&builder.type_name);
            if !seen.insert(short) {
                return Err(StamperError::ManifestInvalid {
                    builder: builder.type_name.clone(),
                    reason: format!("another builder is already named '{short}'"),
                });
            }
        }

        Ok(())
    }

    /// Resolve `path` against the manifest directory.
    pub fn resolve_path(&self, path: &std::path::Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> Manifest {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn parse_full_manifest() {
        let manifest = parse(
            r#"
[generator]
template_dirs = ["templates"]
overwrite = true
companion_glob = "**/*.inc"

[generator.variables]
project = "demo"
year = 2024

[[builders]]
type = "app::Model"
output = "src/model.rs"
overwrite = false
template_dirs = ["extra"]

[builders.variables]
name = "User"
fields = ["id", "email"]

[[builders]]
type = "app::Readme"
template = "readme.md.tera"
output = "README.md"
"#,
        );

        assert_eq!(manifest.generator.template_dirs, [PathBuf::from("templates")]);
        assert!(manifest.generator.overwrite);
        assert_eq!(manifest.generator.companion_glob.as_deref(), Some("**/*.inc"));
        assert_eq!(manifest.generator.variables["year"], 2024);
        assert_eq!(manifest.builders.len(), 2);
        assert_eq!(manifest.builders[0].type_name, "app::Model");
        assert_eq!(manifest.builders[0].overwrite, Some(false));
        assert_eq!(manifest.builders[0].variables["fields"][1], "email");
        assert_eq!(manifest.builders[1].template.as_deref(), Some("readme.md.tera"));
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn parse_empty_manifest() {
        let manifest = parse("");
        assert!(manifest.builders.is_empty());
        assert!(!manifest.generator.overwrite);
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn builder_requires_output_field() {
        let result: std::result::Result<Manifest, _> = toml::from_str(
            r#"
[[builders]]
type = "app::Model"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_empty_output() {
        let manifest = parse(
            r#"
[[builders]]
type = "app::Model"
output = " "
"#,
        );
        assert!(matches!(
            manifest.validate(),
            Err(StamperError::ManifestInvalid { .. })
        ));
    }

    #[test]
    fn validate_rejects_duplicate_short_names() {
        let manifest = parse(
            r#"
[[builders]]
type = "app::Model"
output = "a.rs"

[[builders]]
type = "other::Model"
output = "b.rs"
"#,
        );
        match manifest.validate() {
            Err(StamperError::ManifestInvalid { builder, reason }) => {
                assert_eq!(builder, "other::Model");
                assert!(reason.contains("'Model'"));
            }
            other => panic!("expected ManifestInvalid, got {other:?}"),
        }
    }

    #[test]
    fn resolve_path_is_relative_to_root() {
        let manifest = Manifest {
            root: PathBuf::from("/project"),
            ..Manifest::default()
        };
        assert_eq!(
            manifest.resolve_path(std::path::Path::new("templates")),
            PathBuf::from("/project/templates")
        );
        assert_eq!(
            manifest.resolve_path(std::path::Path::new("/abs")),
            PathBuf::from("/abs")
        );
    }
}
