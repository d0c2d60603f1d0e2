//! `export` command: analyze a project and project the merged model into
//! an IR graph, written out via a [`GraphExporter`].

use std::path::PathBuf;

use crate::config::Settings;
use crate::indexing::Analyzer;
use crate::ir::exporter::{GraphExporter, JsonFileExporter};

pub fn run_export(path: PathBuf, out: Option<PathBuf>, settings: Settings) {
    let output = out.unwrap_or_else(|| settings.export.output.clone());
    let analyzer = Analyzer::new(settings);

    let (model, outcomes) = match analyzer.analyze_all(&path) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let failed = outcomes
        .iter()
        .filter(|o| matches!(o, crate::error::FileOutcome::Failed { .. }))
        .count();
    if failed > 0 {
        eprintln!("Warning: {failed} file(s) failed to analyze; continuing with partial results");
    }

    let graph = analyzer.build_graph(&model);
    let exporter = JsonFileExporter::new(output);
    match exporter.export(&graph) {
        Ok(()) => {
            println!(
                "Exported {} node(s) and {} edge(s) to {}",
                graph.nodes.len(),
                graph.edges.len(),
                exporter.path().display()
            );
        }
        Err(e) => {
            eprintln!("Error: failed to export graph: {e}");
            std::process::exit(1);
        }
    }
}
