#![allow(unused_assignments)]

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum StamperError {
    #[error(
        "Template '{name}' not found in: {}",
        searched.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
    )]
    #[diagnostic(help("Add the directory holding the template to the builder's template directories"))]
    TemplateNotFound { name: String, searched: Vec<PathBuf> },

    #[error("Failed to load templates for '{name}'")]
    #[diagnostic(help("Check the Tera syntax of the templates in the template directories"))]
    TemplateLoad {
        name: String,
        #[source]
        source: tera::Error,
    },

    #[error("Template rendering failed: {template}")]
    #[diagnostic(help("Check your Tera template syntax and that every variable it uses is set"))]
    RenderError {
        template: String,
        #[source]
        source: tera::Error,
    },

    #[error("Unknown template function '{name}'")]
    #[diagnostic(help("Named functions must be one of the built-in emission functions"))]
    UnknownFunction { name: String },

    #[error("Unknown template filter '{name}'")]
    #[diagnostic(help(
        "Named filters must be one of: addslashes, ucfirst, substr, is_numeric, as_php, ident"
    ))]
    UnknownFilter { name: String },

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Manifest not found at {path}")]
    #[diagnostic(help("Ensure the directory contains a stamper.toml file"))]
    ManifestNotFound { path: PathBuf },

    #[error("Failed to parse {path}")]
    #[diagnostic(help("Check the TOML syntax in this file"))]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid builder '{builder}': {reason}")]
    ManifestInvalid { builder: String, reason: String },

    #[error("No builder registered as '{id}'")]
    #[diagnostic(help("Builders are registered under the last segment of their type name"))]
    UnknownBuilder { id: String },

    #[error("Glob pattern error: {pattern}")]
    GlobPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

pub type Result<T> = std::result::Result<T, StamperError>;
