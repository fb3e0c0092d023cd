use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{Result, StamperError};

/// Write `content` to `path` through a temporary file in `staging_dir`
/// (or next to `path` when there is none), then move it into place.
///
/// When the move fails, typically because the staging directory is on
/// another filesystem, the content is written to `path` directly.
pub fn write_output(path: &Path, content: &str, staging_dir: Option<&Path>) -> Result<()> {
    let staging = staging_dir
        .or_else(|| path.parent().filter(|p| !p.as_os_str().is_empty()))
        .unwrap_or_else(|| Path::new("."));

    let mut staged = NamedTempFile::new_in(staging).map_err(|e| StamperError::Io {
        context: format!("creating staging file in {}", staging.display()),
        source: e,
    })?;
    staged
        .write_all(content.as_bytes())
        .map_err(|e| StamperError::Io {
            context: format!("writing staging file {}", staged.path().display()),
            source: e,
        })?;

    if let Err(e) = staged.persist(path) {
        tracing::debug!(
            path = %path.display(),
            error = %e.error,
            "staged file could not be moved into place, writing directly"
        );
        std::fs::write(path, content).map_err(|e| StamperError::Io {
            context: format!("writing {}", path.display()),
            source: e,
        })?;
    }

    Ok(())
}

/// Create `dir` and its parents when missing.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| StamperError::Io {
        context: format!("creating directory {}", dir.display()),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_write_output_without_staging_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        write_output(&path, "hello", None).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn test_write_output_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let staging = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "old").unwrap();

        write_output(&path, "new", Some(staging.path())).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(fs::read_dir(staging.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_write_output_missing_staging_dir_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result = write_output(
            &dir.path().join("out.txt"),
            "x",
            Some(&dir.path().join("missing")),
        );
        assert!(matches!(result, Err(StamperError::Io { .. })));
    }

    #[test]
    fn test_ensure_dir_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
