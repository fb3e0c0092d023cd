use std::path::{Path, PathBuf};

use similar::TextDiff;

use crate::error::{Result, StamperError};
use crate::generator::RenderedOutput;

/// How a rendered output compares with what is already on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// No file exists at the output path yet.
    Added,
    Unchanged,
    /// The file exists with different content; holds a unified diff.
    Modified(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDiff {
    pub builder: String,
    pub path: PathBuf,
    pub change: FileChange,
}

pub fn unified_diff(old: &str, new: &str, path: &Path) -> String {
    let diff = TextDiff::from_lines(old, new);
    let mut output = String::new();

    output.push_str(&format!(
        "--- a/{}\n+++ b/{}\n",
        path.display(),
        path.display()
    ));

    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        output.push_str(&format!("{hunk}"));
    }

    output
}

/// Compare each rendered output with the file it would be written to under `output_dir`.
pub fn diff_outputs(outputs: &[RenderedOutput], output_dir: &Path) -> Result<Vec<OutputDiff>> {
    outputs
        .iter()
        .map(|output| {
            let relative = Path::new(&output.output_name);
            let path = output_dir.join(relative);

            let change = if path.is_file() {
                let existing = std::fs::read_to_string(&path).map_err(|e| StamperError::Io {
                    context: format!("reading {}", path.display()),
                    source: e,
                })?;
                if existing == output.content {
                    FileChange::Unchanged
                } else {
                    FileChange::Modified(unified_diff(&existing, &output.content, relative))
                }
            } else {
                FileChange::Added
            };

            Ok(OutputDiff {
                builder: output.builder.clone(),
                path,
                change,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn rendered(name: &str, content: &str) -> RenderedOutput {
        RenderedOutput {
            builder: "Page".into(),
            output_name: name.into(),
            content: content.into(),
        }
    }

    #[test]
    fn unified_diff_marks_changed_lines() {
        let diff = unified_diff("a\nb\nc\n", "a\nB\nc\n", Path::new("page.txt"));
        assert!(diff.starts_with("--- a/page.txt\n+++ b/page.txt\n"));
        assert!(diff.contains("-b\n"));
        assert!(diff.contains("+B\n"));
    }

    #[test]
    fn unified_diff_of_identical_text_has_no_hunks() {
        let diff = unified_diff("same\n", "same\n", Path::new("x"));
        assert_eq!(diff, "--- a/x\n+++ b/x\n");
    }

    #[test]
    fn classifies_outputs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("same.txt"), "one\n").unwrap();
        fs::write(dir.path().join("changed.txt"), "old\n").unwrap();

        let outputs = [
            rendered("same.txt", "one\n"),
            rendered("changed.txt", "new\n"),
            rendered("fresh.txt", "hello\n"),
        ];
        let diffs = diff_outputs(&outputs, dir.path()).unwrap();

        assert_eq!(diffs[0].change, FileChange::Unchanged);
        assert!(matches!(&diffs[1].change, FileChange::Modified(d) if d.contains("+new")));
        assert_eq!(diffs[2].change, FileChange::Added);
        assert_eq!(diffs[2].path, dir.path().join("fresh.txt"));
    }
}
