//! Flowlens: a multi-language static data-lineage analyzer.
//!
//! Walks a project's source tree, builds a lexical scope graph and
//! identifier arena per package, emits typed data-flow edges from a
//! syntax-tree visitor, closes the transitive XFER relation, merges
//! per-package models, and projects the result into an exportable
//! intermediate-representation graph.

pub mod annotate;
pub mod cli;
pub mod config;
pub mod error;
pub mod flow;
pub mod ident;
pub mod indexing;
pub mod ir;
pub mod logging;
pub mod model;
pub mod parsing;
pub mod scope;
pub mod types;

pub use error::{AnalysisError, AnalysisResult};
pub use model::PackageModel;
pub use types::{IdentKey, Language};
