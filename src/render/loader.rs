use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use globset::{Glob, GlobMatcher};
use regex_lite::Regex;
use tera::Tera;

use crate::error::{Result, StamperError};

/// Extension of template files; the default template name is
/// `<ShortTypeName>` followed by this.
pub const TEMPLATE_EXTENSION: &str = ".tera";

/// Only templates whose name matches this glob are loaded as companions of
/// the main template.
pub const DEFAULT_COMPANION_GLOB: &str = "**/*.tera";

/// Find `name` in the first template directory that contains it.
pub fn resolve_template(name: &str, template_dirs: &[PathBuf]) -> Result<PathBuf> {
    for dir in template_dirs {
        let candidate = dir.join(name);
        if candidate.is_file() {
            tracing::debug!(template = name, path = %candidate.display(), "resolved template");
            return Ok(candidate);
        }
    }

    Err(StamperError::TemplateNotFound {
        name: name.to_string(),
        searched: template_dirs.to_vec(),
    })
}

/// Build a Tera instance holding the main template and the companions it
/// reaches through `extends`, `include` and `import`.
///
/// Companions are looked up like the main template, first directory first.
/// Templates nothing refers to are never read, so a broken file elsewhere in
/// the template directories does not affect this render. A referenced
/// template that cannot be found is left out and Tera reports it.
/// Autoescaping is off for every template.
pub fn load_templates(
    name: &str,
    main_path: &Path,
    template_dirs: &[PathBuf],
    companion_glob: &str,
) -> Result<Tera> {
    let matcher = companion_matcher(companion_glob)?;

    let main_source = read_source(main_path)?;
    let mut pending = references(&main_source);
    let mut sources = BTreeMap::new();
    sources.insert(name.to_string(), main_source);

    while let Some(reference) = pending.pop() {
        if sources.contains_key(&reference) {
            continue;
        }
        if !matcher.is_match(&reference) {
            tracing::debug!(template = %reference, "reference is not a companion, skipping");
            continue;
        }
        let Ok(path) = resolve_template(&reference, template_dirs) else {
            tracing::debug!(template = %reference, "referenced template not found");
            continue;
        };

        let source = read_source(&path)?;
        pending.extend(references(&source));
        sources.insert(reference, source);
    }

    tracing::debug!(
        template = name,
        loaded = sources.len(),
        "loading templates"
    );

    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    tera.add_raw_templates(sources)
        .map_err(|e| StamperError::TemplateLoad {
            name: name.to_string(),
            source: e,
        })?;
    Ok(tera)
}

fn companion_matcher(pattern: &str) -> Result<GlobMatcher> {
    Glob::new(pattern)
        .map(|glob| glob.compile_matcher())
        .map_err(|e| StamperError::GlobPattern {
            pattern: pattern.to_string(),
            source: e,
        })
}

/// Template names named by the `extends`, `include` and `import` tags of
/// `source`, in order of appearance. `include ["a", "b"]` yields both.
fn references(source: &str) -> Vec<String> {
    static TAG: OnceLock<Regex> = OnceLock::new();
    static NAME: OnceLock<Regex> = OnceLock::new();

    let tag = TAG.get_or_init(|| {
        Regex::new(r"\{%-?\s*(?:extends|include|import)\s+([^%]*?)-?%\}").expect("valid regex")
    });
    let name = NAME.get_or_init(|| {
        Regex::new(r#""([^"]*)"|'([^']*)'|`([^`]*)`"#).expect("valid regex")
    });

    tag.captures_iter(source)
        .filter_map(|caps| caps.get(1))
        .flat_map(|args| {
            name.captures_iter(args.as_str())
                .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
                .map(|m| m.as_str().to_string())
                .collect::<Vec<_>>()
        })
        .collect()
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| StamperError::Io {
        context: format!("reading template {}", path.display()),
        source: e,
    })
}
