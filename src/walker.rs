//! Directory walker (file discovery, ambient per SPEC_FULL.md §E).
//!
//! Grounded on the teacher's `indexing::walker::FileWalker`: an `ignore`-crate
//! walk over a root, filtered to `.cairo` files, with the mandatory test-file
//! exclusion rules pinned in spec.md §6 plus a configurable glob override
//! layer from `WalkerConfig`.

use std::path::{Path, PathBuf};

use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;

use crate::config::WalkerConfig;
use crate::error::{AnalyzerError, AnalyzerResult};

/// Walks a root path (file or directory) and returns every `.cairo` file
/// that isn't a test file under spec.md §6's mandatory exclusion rules.
pub struct FileWalker<'a> {
    config: &'a WalkerConfig,
}

impl<'a> FileWalker<'a> {
    pub fn new(config: &'a WalkerConfig) -> Self {
        Self { config }
    }

    /// `root` may be a single `.cairo` file or a directory to walk.
    pub fn discover(&self, root: &Path) -> AnalyzerResult<Vec<PathBuf>> {
        if !root.exists() {
            return Err(AnalyzerError::PathNotFound { path: root.to_path_buf() });
        }

        if root.is_file() {
            return Ok(if is_cairo_file(root) && !is_test_file(root) { vec![root.to_path_buf()] } else { vec![] });
        }

        let mut builder = WalkBuilder::new(root);
        builder
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(false)
            .max_depth(None)
            .require_git(false);

        let mut overrides = OverrideBuilder::new(root);
        for pattern in &self.config.ignore_patterns {
            if let Err(e) = overrides.add(&format!("!{pattern}")) {
                tracing::warn!("invalid ignore pattern '{pattern}': {e}");
            }
        }
        if let Ok(built) = overrides.build() {
            builder.overrides(built);
        }

        let files = builder
            .build()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .map(|entry| entry.into_path())
            .filter(|path| is_cairo_file(path) && !is_test_file(path))
            .collect();

        Ok(files)
    }
}

fn is_cairo_file(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("cairo")
}

/// spec.md §6: a file is excluded if its name starts with `test_`, ends with
/// `_test.cairo`, is exactly `tests.cairo`, or any path component is named
/// `tests` or `test`. Never configurable.
fn is_test_file(path: &Path) -> bool {
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        if name.starts_with("test_") || name.ends_with("_test.cairo") || name == "tests.cairo" {
            return true;
        }
    }
    path.components().any(|c| matches!(c.as_os_str().to_str(), Some("tests") | Some("test")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn default_config() -> WalkerConfig {
        WalkerConfig { ignore_patterns: vec!["target/**".to_string()], parallel_threads: 1 }
    }

    #[test]
    fn discovers_cairo_files_only() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.cairo"), "mod a {}").unwrap();
        fs::write(dir.path().join("README.md"), "# readme").unwrap();

        let config = default_config();
        let files = FileWalker::new(&config).discover(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("a.cairo"));
    }

    #[test]
    fn excludes_test_files_by_name_and_path() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("test_foo.cairo"), "mod a {}").unwrap();
        fs::write(dir.path().join("bar_test.cairo"), "mod a {}").unwrap();
        fs::write(dir.path().join("tests.cairo"), "mod a {}").unwrap();
        fs::create_dir(dir.path().join("tests")).unwrap();
        fs::write(dir.path().join("tests/nested.cairo"), "mod a {}").unwrap();
        fs::write(dir.path().join("real.cairo"), "mod a {}").unwrap();

        let config = default_config();
        let files = FileWalker::new(&config).discover(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("real.cairo"));
    }

    #[test]
    fn single_file_root_is_accepted() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("solo.cairo");
        fs::write(&file_path, "mod a {}").unwrap();

        let config = default_config();
        let files = FileWalker::new(&config).discover(&file_path).unwrap();
        assert_eq!(files, vec![file_path]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let config = default_config();
        let result = FileWalker::new(&config).discover(Path::new("/nonexistent/path/xyz"));
        assert!(result.is_err());
    }
}
