use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
// Filesystem enumeration of candidate equation files

/// Regular file found under the root
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    /// Base name; this is what goes on the wire.
    pub name: String,
}

/// File filter options
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    pub exclude_files: Vec<String>,
    pub exclude_dirs: Vec<String>,
}

impl FileFilter {
    /// Check if a file should be included
    fn should_include_file(&self, name: &str) -> bool {
        !self.exclude_files.iter().any(|p| glob_match(p, name))
    }

    /// Check if a directory should be included
    fn should_include_dir(&self, root: &Path, path: &Path) -> bool {
        // Never exclude the root itself
        let rel = match path.strip_prefix(root) {
            Ok(r) => r,
            Err(_) => path,
        };
        for component in rel.components() {
            if let Some(component_str) = component.as_os_str().to_str() {
                if self.exclude_dirs.iter().any(|p| glob_match(p, component_str)) {
                    return false;
                }
            }
        }
        true
    }
}

/// Simple glob matching (supports * wildcards)
fn glob_match(pattern: &str, text: &str) -> bool {
    if pattern == "*" {
        return true;
    }

    if pattern.contains('*') {
        if pattern.starts_with('*') && pattern.ends_with('*') {
            let middle = &pattern[1..pattern.len() - 1];
            return text.contains(middle);
        } else if let Some(suffix) = pattern.strip_prefix('*') {
            return text.ends_with(suffix);
        } else if let Some(prefix) = pattern.strip_suffix('*') {
            return text.starts_with(prefix);
        }
    }

    pattern == text
}

/// Walk `root` recursively and collect every regular file that passes `filter`.
///
/// Only an unreadable root is an error; entries that can't be read mid-walk
/// are skipped. Order follows the walk and is not sorted.
pub fn enumerate_files(root: &Path, filter: &FileFilter) -> Result<Vec<FileEntry>> {
    use walkdir::WalkDir;

    std::fs::read_dir(root)
        .with_context(|| format!("Failed to read root directory {}", root.display()))?;

    let mut entries = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            // Skip excluded directories entirely - this prevents walking into them
            if e.file_type().is_dir() {
                filter.should_include_dir(root, e.path())
            } else {
                true
            }
        })
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !filter.should_include_file(&name) {
            continue;
        }
        entries.push(FileEntry {
            path: entry.path().to_path_buf(),
            name,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(entries: &[FileEntry]) -> Vec<String> {
        let mut v: Vec<String> = entries.iter().map(|e| e.name.clone()).collect();
        v.sort();
        v
    }

    #[test]
    fn test_recursive_walk_finds_regular_files() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("a/b")).unwrap();
        fs::write(tmp.path().join("top.bin"), [0u8; 30]).unwrap();
        fs::write(tmp.path().join("a/b/deep.bin"), [0u8; 5]).unwrap();

        let entries = enumerate_files(tmp.path(), &FileFilter::default()).unwrap();
        assert_eq!(names(&entries), vec!["deep.bin", "top.bin"]);
        let deep = entries.iter().find(|e| e.name == "deep.bin").unwrap();
        assert!(deep.path.ends_with("a/b/deep.bin"));
    }

    #[test]
    fn test_filters() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("skip")).unwrap();
        fs::write(tmp.path().join("keep.bin"), b"x").unwrap();
        fs::write(tmp.path().join("note.tmp"), b"x").unwrap();
        fs::write(tmp.path().join("skip/hidden.bin"), b"x").unwrap();

        let filter = FileFilter {
            exclude_files: vec!["*.tmp".to_string()],
            exclude_dirs: vec!["skip".to_string()],
        };
        let entries = enumerate_files(tmp.path(), &filter).unwrap();
        assert_eq!(names(&entries), vec!["keep.bin"]);
    }

    #[test]
    fn test_missing_root_is_error() {
        let tmp = TempDir::new().unwrap();
        assert!(enumerate_files(&tmp.path().join("nope"), &FileFilter::default()).is_err());
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("*", "anything"));
        assert!(glob_match("*.bin", "eqs1.bin"));
        assert!(glob_match("eqs*", "eqs1.bin"));
        assert!(glob_match("*s1*", "eqs1.bin"));
        assert!(!glob_match("*.tmp", "eqs1.bin"));
        assert!(glob_match("exact", "exact"));
    }
}
