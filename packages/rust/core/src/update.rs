//! Rewriting target files: apply a list of region edits to one file.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use readmegen_markdown::splice;
use readmegen_shared::{ReadmeError, Result};

/// One region replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Marker name, e.g. `recent_contributions`.
    pub marker: &'static str,
    /// Generated Markdown (or inline value).
    pub chunk: String,
    /// Inline edits get no surrounding newlines.
    pub inline: bool,
}

impl Edit {
    pub fn block(marker: &'static str, chunk: String) -> Self {
        Self {
            marker,
            chunk,
            inline: false,
        }
    }

    pub fn inline(marker: &'static str, chunk: String) -> Self {
        Self {
            marker,
            chunk,
            inline: true,
        }
    }
}

/// What happened to one target file.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub path: PathBuf,
    /// Edits that were attempted, in order.
    pub edits: Vec<Edit>,
    /// Markers whose region was not present in the file.
    pub missing_markers: Vec<&'static str>,
    /// Whether the new content differs from what was on disk.
    pub changed: bool,
    /// Whether the file was actually rewritten (false on dry runs).
    pub written: bool,
}

/// Apply `edits` in order to `content`, returning the new text and any
/// markers that had no region.
pub fn apply_edits(content: &str, edits: &[Edit]) -> (String, Vec<&'static str>) {
    let mut current = content.to_string();
    let mut missing = Vec::new();

    for edit in edits {
        if !splice::has_region(&current, edit.marker) {
            missing.push(edit.marker);
            continue;
        }
        current = splice::splice(&current, edit.marker, &edit.chunk, edit.inline).into_owned();
    }

    (current, missing)
}

/// Read `path`, apply `edits`, and write it back when the content changed.
///
/// The file must exist even when `edits` is empty.
#[instrument(skip(edits), fields(path = %path.display(), edits = edits.len()))]
pub fn rewrite_file(path: &Path, edits: Vec<Edit>, dry_run: bool) -> Result<FileOutcome> {
    let original = std::fs::read_to_string(path).map_err(|e| ReadmeError::io(path, e))?;
    let (updated, missing_markers) = apply_edits(&original, &edits);

    for marker in &missing_markers {
        warn!(marker, "marker region not found, skipped");
    }

    let changed = updated != original;
    let written = changed && !dry_run;
    if written {
        std::fs::write(path, &updated).map_err(|e| ReadmeError::io(path, e))?;
        info!("file rewritten");
    } else {
        debug!(changed, dry_run, "file left untouched");
    }

    Ok(FileOutcome {
        path: path.to_path_buf(),
        edits,
        missing_markers,
        changed,
        written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("readmegen-update-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn apply_edits_reports_missing_markers() {
        let content = "<!-- blog starts -->\n<!-- blog ends -->\n";
        let edits = vec![
            Edit::block("blog", "* post".into()),
            Edit::block("tils", "* note".into()),
        ];
        let (out, missing) = apply_edits(content, &edits);
        assert_eq!(out, "<!-- blog starts -->\n* post\n<!-- blog ends -->\n");
        assert_eq!(missing, ["tils"]);
    }

    #[test]
    fn apply_edits_inline_and_block_in_one_file() {
        let content = "<!-- recent_contributions_count starts -->0<!-- recent_contributions_count ends -->\n\
                       <!-- recent_contributions starts --><!-- recent_contributions ends -->";
        let edits = vec![
            Edit::block("recent_contributions", "* a".into()),
            Edit::inline("recent_contributions_count", "1".into()),
        ];
        let (out, missing) = apply_edits(content, &edits);
        assert!(missing.is_empty());
        assert!(out.starts_with(
            "<!-- recent_contributions_count starts -->1<!-- recent_contributions_count ends -->"
        ));
        assert!(out.ends_with("<!-- recent_contributions starts -->\n* a\n<!-- recent_contributions ends -->"));
    }

    #[test]
    fn rewrite_writes_only_on_change() {
        let dir = temp_dir();
        let path = dir.join("README.md");
        std::fs::write(&path, "x <!-- blog starts --><!-- blog ends --> y").unwrap();

        let outcome = rewrite_file(&path, vec![Edit::block("blog", "* p".into())], false).unwrap();
        assert!(outcome.changed && outcome.written);
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "x <!-- blog starts -->\n* p\n<!-- blog ends --> y");

        let again = rewrite_file(&path, vec![Edit::block("blog", "* p".into())], false).unwrap();
        assert!(!again.changed && !again.written);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), written);
    }

    #[test]
    fn dry_run_leaves_file_alone() {
        let dir = temp_dir();
        let path = dir.join("README.md");
        let original = "<!-- blog starts -->old<!-- blog ends -->";
        std::fs::write(&path, original).unwrap();

        let outcome = rewrite_file(&path, vec![Edit::block("blog", "* new".into())], true).unwrap();
        assert!(outcome.changed);
        assert!(!outcome.written);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = temp_dir();
        let err = rewrite_file(&dir.join("nope.md"), Vec::new(), false).unwrap_err();
        assert!(matches!(err, ReadmeError::Io { .. }));
    }
}
