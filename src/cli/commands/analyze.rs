//! `analyze` command: walk a project tree and report what was found.

use std::path::PathBuf;

use crate::config::Settings;
use crate::error::FileOutcome;
use crate::indexing::{discover_packages, find_project_root, Analyzer};

pub fn run_analyze(path: PathBuf, dry_run: bool, max_files: Option<usize>, mut settings: Settings) {
    if let Some(max_files) = max_files {
        settings.analysis.max_files = max_files;
    }

    if dry_run {
        let root = find_project_root(&path, &settings.analysis.project_root_markers).unwrap_or(path);
        let groups = discover_packages(&root, &settings.analysis, &settings.languages);

        println!("Project root: {}", root.display());
        println!("Discovered {} package(s):", groups.len());
        for (dir, files) in &groups {
            println!("  {} ({} file(s))", dir.display(), files.len());
            for file in files {
                println!("    {}", file.path.display());
            }
        }
        return;
    }

    let analyzer = Analyzer::new(settings);
    match analyzer.analyze_all(&path) {
        Ok((model, outcomes)) => {
            let failed = outcomes.iter().filter(|o| matches!(o, FileOutcome::Failed { .. })).count();
            println!("Analyzed {} file(s) across packages", outcomes.len() - failed);
            println!("Identifiers: {}", model.idents.len());
            println!("Edges: {}", model.edges.len());
            if failed > 0 {
                println!("Failed files: {failed}");
                for outcome in &outcomes {
                    if let FileOutcome::Failed { path, error } = outcome {
                        eprintln!("  {}: {error}", path.display());
                    }
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            for suggestion in e.recovery_suggestions() {
                eprintln!("  hint: {suggestion}");
            }
            std::process::exit(1);
        }
    }
}
