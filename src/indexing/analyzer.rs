//! Orchestrates project-root discovery, file walking, per-package
//! extraction and merging into the final `PackageModel` (spec §4.5,
//! §4.6, §7's error-propagation policy).

use crate::config::Settings;
use crate::error::{AnalysisError, AnalysisResult, FileOutcome};
use crate::flow::closure::close_transfers_into;
use crate::indexing::roots::find_project_root;
use crate::indexing::walker::discover_packages;
use crate::ir::{build_ir_graph, IrGraph};
use crate::model::PackageModel;
use crate::parsing::go::GoExtractor;
use crate::parsing::java::JavaExtractor;
use crate::parsing::LanguageExtractor;
use crate::scope::ScopeGraph;
use crate::types::Language;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// One directory's analysis: the accumulated model plus a per-file
/// outcome record, so a caller can report partial failures without the
/// whole package aborting (spec §7).
pub struct PackageAnalysis {
    pub model: PackageModel,
    pub outcomes: Vec<FileOutcome>,
}

pub struct Analyzer {
    settings: Settings,
    extractors: Vec<Box<dyn LanguageExtractor>>,
}

/// Builds an [`Analyzer`], defaulting to the shipped Go/Java extractors
/// for any language enabled in `settings.languages` unless the caller
/// registers its own (spec §9's plugin-extractor extension point).
pub struct AnalyzerBuilder {
    settings: Settings,
    extractors: Vec<Box<dyn LanguageExtractor>>,
}

impl AnalyzerBuilder {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            extractors: Vec::new(),
        }
    }

    pub fn with_extractor(mut self, extractor: Box<dyn LanguageExtractor>) -> Self {
        self.extractors.push(extractor);
        self
    }

    pub fn build(mut self) -> Analyzer {
        if self.extractors.is_empty() {
            if self.settings.languages.get("go").map(|c| c.enabled).unwrap_or(true) {
                self.extractors.push(Box::new(GoExtractor::new()));
            }
            if self.settings.languages.get("java").map(|c| c.enabled).unwrap_or(true) {
                self.extractors.push(Box::new(JavaExtractor::new()));
            }
        }
        Analyzer {
            settings: self.settings,
            extractors: self.extractors,
        }
    }
}

impl Analyzer {
    pub fn new(settings: Settings) -> Self {
        AnalyzerBuilder::new(settings).build()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn extractor_for(&self, path: &Path) -> Option<&dyn LanguageExtractor> {
        self.extractors.iter().find(|e| e.matches(path)).map(|b| b.as_ref())
    }

    /// Analyzes a single in-memory source string without touching the
    /// filesystem. Used by the CLI's `analyze --stdin` path and by tests.
    pub fn analyze_source_code(
        &self,
        package: &str,
        file: &str,
        source: &str,
        language: Language,
    ) -> AnalysisResult<PackageModel> {
        let extractor = self
            .extractors
            .iter()
            .find(|e| e.language() == language)
            .ok_or_else(|| AnalysisError::Config {
                reason: format!("no extractor registered for {language}"),
            })?;

        // Pass 1: an ungated, throwaway walk whose sole purpose is to
        // populate `func_summaries` (spec §4.3's per-function FuncSummary
        // pass is defined independent of whether interprocedural analysis
        // is later honored at call sites).
        let mut scratch_scopes = ScopeGraph::new();
        scratch_scopes.enter_package(package);
        let mut scratch_model = PackageModel::new(package, language);
        extractor.analyze_file(package, file, source, &mut scratch_scopes, &mut scratch_model, true)?;

        let mut scopes = ScopeGraph::new();
        scopes.enter_package(package);
        let mut model = PackageModel::new(package, language);
        model.func_summaries = scratch_model.func_summaries;
        extractor.analyze_file(package, file, source, &mut scopes, &mut model, self.settings.analysis.interprocedural)?;
        model.files.push(file.to_string());
        close_transfers_into(&mut model.edges);
        model.scopes = scopes.into_scopes();
        Ok(model)
    }

    /// Analyzes every file in `files` (assumed to share one directory)
    /// as a single package. A file that fails to read or parse is
    /// recorded in `outcomes` and does not abort the rest of the
    /// package (spec §7).
    pub fn analyze_package(&self, dir: &Path, files: &[PathBuf]) -> AnalysisResult<PackageAnalysis> {
        let package = dir.to_string_lossy().to_string();
        let language = files
            .iter()
            .find_map(|f| Language::from_path(f))
            .ok_or_else(|| AnalysisError::UnsupportedFileType {
                path: dir.to_path_buf(),
                extension: String::new(),
            })?;

        // Pass 1: an ungated, throwaway walk across every readable file in
        // the package, purely to populate `func_summaries` before the real
        // pass. This resolves forward references — a call to a function
        // declared later in the file, or in a different file of the same
        // package — that a single linear walk can't see yet (spec §4.3's
        // FuncSummary pass is per-function, not ordered by call site).
        // Read/parse failures are silently skipped here; the real pass
        // below records them properly in `outcomes`.
        let mut scratch_scopes = ScopeGraph::new();
        scratch_scopes.enter_package(&package);
        let mut scratch_model = PackageModel::new(&package, language);
        for file in files {
            let Some(extractor) = self.extractor_for(file) else { continue };
            let Ok(source) = std::fs::read_to_string(file) else { continue };
            let file_name = file.file_name().and_then(|n| n.to_str()).unwrap_or("").to_string();
            let _ = extractor.analyze_file(&package, &file_name, &source, &mut scratch_scopes, &mut scratch_model, true);
        }

        let mut scopes = ScopeGraph::new();
        scopes.enter_package(&package);
        let mut model = PackageModel::new(&package, language);
        model.func_summaries = scratch_model.func_summaries;
        let mut outcomes = Vec::with_capacity(files.len());

        for file in files {
            let Some(extractor) = self.extractor_for(file) else {
                outcomes.push(FileOutcome::Failed {
                    path: file.clone(),
                    error: AnalysisError::UnsupportedFileType {
                        path: file.clone(),
                        extension: file.extension().and_then(|e| e.to_str()).unwrap_or("").to_string(),
                    },
                });
                continue;
            };

            let source = match std::fs::read_to_string(file) {
                Ok(s) => s,
                Err(source) => {
                    outcomes.push(FileOutcome::Failed {
                        path: file.clone(),
                        error: AnalysisError::Io { path: file.clone(), source },
                    });
                    continue;
                }
            };

            let file_name = file.file_name().and_then(|n| n.to_str()).unwrap_or("").to_string();
            let edges_before = model.edges.len();
            match extractor.analyze_file(
                &package,
                &file_name,
                &source,
                &mut scopes,
                &mut model,
                self.settings.analysis.interprocedural,
            ) {
                Ok(()) => {
                    model.files.push(file_name);
                    outcomes.push(FileOutcome::Analyzed {
                        path: file.clone(),
                        edges_emitted: model.edges.len() - edges_before,
                    });
                }
                Err(error) => outcomes.push(FileOutcome::Failed { path: file.clone(), error }),
            }
        }

        close_transfers_into(&mut model.edges);
        model.scopes = scopes.into_scopes();
        Ok(PackageAnalysis { model, outcomes })
    }

    /// Discovers every package under `root`, analyzes them in parallel
    /// (bounded by `analysis.parallel_threads`), and merges the results
    /// into one model. A directory yielding no recognized source files
    /// is simply skipped, not a hard error; `analysis.max_files` (when
    /// nonzero) truncates the overall file list before analysis begins.
    pub fn analyze_all(&self, root: &Path) -> AnalysisResult<(PackageModel, Vec<FileOutcome>)> {
        let project_root = find_project_root(root, &self.settings.analysis.project_root_markers).unwrap_or_else(|| root.to_path_buf());

        let mut groups = discover_packages(&project_root, &self.settings.analysis, &self.settings.languages);

        if self.settings.analysis.max_files > 0 {
            let mut remaining = self.settings.analysis.max_files;
            let mut truncated = 0usize;
            for (_, files) in groups.iter_mut() {
                if files.len() > remaining {
                    truncated += files.len() - remaining;
                    files.truncate(remaining);
                    remaining = 0;
                } else {
                    remaining -= files.len();
                }
            }
            if truncated > 0 {
                tracing::warn!(truncated, max_files = self.settings.analysis.max_files, "file discovery truncated by max_files");
            }
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.settings.analysis.parallel_threads.max(1))
            .build()
            .map_err(|e| AnalysisError::Config { reason: e.to_string() })?;

        let results: Vec<AnalysisResult<PackageAnalysis>> = pool.install(|| {
            groups
                .into_par_iter()
                .filter(|(_, files)| !files.is_empty())
                .map(|(dir, files)| {
                    let paths: Vec<PathBuf> = files.into_iter().map(|f| f.path).collect();
                    self.analyze_package(&dir, &paths)
                })
                .collect()
        });

        let mut models = Vec::new();
        let mut outcomes = Vec::new();
        for result in results {
            let analysis = result?;
            outcomes.extend(analysis.outcomes);
            models.push(analysis.model);
        }

        let merged = PackageModel::merge(models).unwrap_or_else(|| PackageModel::new("", Language::Go));
        Ok((merged, outcomes))
    }

    pub fn build_graph(&self, model: &PackageModel) -> IrGraph {
        build_ir_graph(model, &self.settings.export.service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn analyze_source_code_round_trips_a_tiny_go_snippet() {
        let analyzer = Analyzer::new(Settings::default());
        let model = analyzer
            .analyze_source_code("pkg", "f.go", "package p\nfunc F() {\n\tx := 1\n\t_ = x\n}\n", Language::Go)
            .unwrap();
        assert!(!model.edges.is_empty());
    }

    #[test]
    fn analyze_all_merges_multiple_packages_under_a_project_root() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("go.mod"), "module example\n").unwrap();
        std::fs::write(dir.path().join("main.go"), "package main\nfunc main() {\n\tx := 1\n\t_ = x\n}\n").unwrap();
        let sub = dir.path().join("util");
        std::fs::create_dir_all(&sub).unwrap();
        std::fs::write(sub.join("util.go"), "package util\nfunc Helper() {}\n").unwrap();

        let analyzer = Analyzer::new(Settings::default());
        let (model, outcomes) = analyzer.analyze_all(dir.path()).unwrap();
        assert_eq!(model.files.len(), 2);
        assert!(outcomes.iter().all(|o| matches!(o, FileOutcome::Analyzed { .. })));
    }
}
