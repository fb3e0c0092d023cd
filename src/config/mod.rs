pub mod schema;
pub mod user;

use std::path::Path;

use crate::error::{Result, StamperError};

pub use schema::{BuilderConfig, GeneratorConfig, Manifest};
pub use user::{load_user_config, UserConfig};

/// File name looked up when a directory is given instead of a manifest.
pub const MANIFEST_FILE: &str = "stamper.toml";

/// Load and validate a manifest from a file or a directory holding `stamper.toml`.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let manifest_path = if path.is_dir() {
        path.join(MANIFEST_FILE)
    } else {
        path.to_path_buf()
    };

    if !manifest_path.exists() {
        return Err(StamperError::ManifestNotFound {
            path: manifest_path,
        });
    }

    let content = std::fs::read_to_string(&manifest_path).map_err(|e| StamperError::Io {
        context: format!("reading {}", manifest_path.display()),
        source: e,
    })?;

    let mut manifest: Manifest =
        toml::from_str(&content).map_err(|e| StamperError::ConfigParse {
            path: manifest_path.clone(),
            source: e,
        })?;

    manifest.root = manifest_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    manifest.validate()?;

    Ok(manifest)
}
