//! Export surface for [`super::IrGraph`] (spec §4.6 "Projector").
//!
//! Grounded on the teacher's `IndexError` variant style
//! (`bartolli-codanna/src/error.rs`): one `thiserror` enum, each variant
//! carrying the path and the underlying source error.

use super::IrGraph;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write graph to '{path}': {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("failed to serialize graph: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A destination an [`IrGraph`] can be projected to. Implementations are
/// expected to be cheap to construct per export call.
pub trait GraphExporter {
    fn export(&self, graph: &IrGraph) -> Result<(), ExportError>;
}

/// Reference exporter: writes the graph as pretty-printed JSON to a file.
pub struct JsonFileExporter {
    path: PathBuf,
}

impl JsonFileExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GraphExporter for JsonFileExporter {
    fn export(&self, graph: &IrGraph) -> Result<(), ExportError> {
        let json = serde_json::to_string_pretty(graph)?;
        std::fs::write(&self.path, json).map_err(|source| ExportError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn json_file_exporter_writes_valid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("graph.json");
        let exporter = JsonFileExporter::new(&path);
        let graph = IrGraph::default();

        exporter.export(&graph).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: IrGraph = serde_json::from_str(&contents).unwrap();
        assert!(parsed.nodes.is_empty());
        assert!(parsed.edges.is_empty());
    }
}
