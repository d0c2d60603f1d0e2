//! File discovery: walks a directory tree with the `ignore` crate
//! (honoring `.gitignore` plus the configured extra ignore patterns) and
//! groups matched source files by their containing directory, which
//! stands in for a "package" (spec §3, §6 — Go and Java both treat the
//! containing directory as the natural package unit).

use crate::config::{AnalysisConfig, LanguageConfig};
use crate::types::Language;
use ignore::gitignore::GitignoreBuilder;
use ignore::WalkBuilder;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub language: Language,
}

/// Walks `root`, returning every matched source file grouped by parent
/// directory, directories in a deterministic (lexicographic) order.
pub fn discover_packages(
    root: &Path,
    analysis: &AnalysisConfig,
    languages: &std::collections::HashMap<String, LanguageConfig>,
) -> Vec<(PathBuf, Vec<DiscoveredFile>)> {
    let extensions = enabled_extensions(languages);

    let mut extra_ignores = GitignoreBuilder::new(root);
    for pattern in &analysis.ignore_patterns {
        let _ = extra_ignores.add_line(None, pattern);
    }
    let extra_ignores = extra_ignores.build().unwrap_or_else(|_| GitignoreBuilder::new(root).build().unwrap());

    let mut grouped: BTreeMap<PathBuf, Vec<DiscoveredFile>> = BTreeMap::new();
    let mut walker = WalkBuilder::new(root);
    walker.hidden(true).git_ignore(true);

    for entry in walker.build().flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if extra_ignores.matched(path, false).is_ignore() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else { continue };
        let Some(language) = extensions.get(ext).copied() else { continue };
        let parent = path.parent().unwrap_or(root).to_path_buf();
        grouped.entry(parent).or_default().push(DiscoveredFile {
            path: path.to_path_buf(),
            language,
        });
    }

    grouped.into_iter().collect()
}

fn enabled_extensions(languages: &std::collections::HashMap<String, LanguageConfig>) -> BTreeMap<String, Language> {
    let mut map = BTreeMap::new();
    for (name, cfg) in languages {
        if !cfg.enabled {
            continue;
        }
        let language = match name.as_str() {
            "go" => Language::Go,
            "java" => Language::Java,
            _ => continue,
        };
        for ext in &cfg.extensions {
            map.insert(ext.clone(), language);
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use tempfile::tempdir;

    #[test]
    fn groups_files_by_containing_directory() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.go"), "package p\n").unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir_all(&sub).unwrap();
        std::fs::write(sub.join("b.go"), "package sub\n").unwrap();

        let settings = Settings::default();
        let groups = discover_packages(dir.path(), &settings.analysis, &settings.languages);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].1.len(), 1);
    }

    #[test]
    fn ignore_patterns_exclude_matching_directories() {
        let dir = tempdir().unwrap();
        let vendor = dir.path().join("vendor");
        std::fs::create_dir_all(&vendor).unwrap();
        std::fs::write(vendor.join("v.go"), "package v\n").unwrap();
        std::fs::write(dir.path().join("main.go"), "package p\n").unwrap();

        let settings = Settings::default();
        let groups = discover_packages(dir.path(), &settings.analysis, &settings.languages);
        assert_eq!(groups.len(), 1);
    }
}
