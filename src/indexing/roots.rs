//! Project-root discovery (spec §6): the presence of any configured
//! marker file in a directory identifies it as a project root.

use std::path::{Path, PathBuf};

/// Walks upward from `start` looking for a directory containing one of
/// `markers`. Returns the first (deepest) match.
pub fn find_project_root(start: &Path, markers: &[String]) -> Option<PathBuf> {
    for ancestor in start.ancestors() {
        if markers.iter().any(|marker| ancestor.join(marker).is_file()) {
            return Some(ancestor.to_path_buf());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn finds_marker_in_ancestor_directory() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("go.mod"), "module example\n").unwrap();
        let nested = dir.path().join("internal/util");
        std::fs::create_dir_all(&nested).unwrap();

        let markers = vec!["go.mod".to_string()];
        let found = find_project_root(&nested, &markers).unwrap();
        assert_eq!(found, dir.path());
    }

    #[test]
    fn returns_none_when_no_marker_present() {
        let dir = tempdir().unwrap();
        let markers = vec!["go.mod".to_string()];
        assert!(find_project_root(dir.path(), &markers).is_none());
    }
}
