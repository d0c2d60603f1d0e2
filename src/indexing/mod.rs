//! Project discovery and orchestration: finding the project root,
//! walking the tree for source files grouped into packages, and driving
//! the per-language extractors over them (spec §4.5, §4.6, §6, §7).

pub mod analyzer;
pub mod roots;
pub mod walker;

pub use analyzer::{Analyzer, AnalyzerBuilder, PackageAnalysis};
pub use roots::find_project_root;
pub use walker::{discover_packages, DiscoveredFile};
