//! Visitor / extractor layer (spec §4.3, §4.5): the language-neutral
//! trait both shipped adapters implement, plus the adapters themselves.

pub mod extractor;
pub mod go;
pub mod java;
pub mod resolve;

pub use extractor::{
    check_recursion_depth, forwarded_call_sources, ConstructKind, FuncSummary, HandledNode, LanguageExtractor,
    NodeTracker, NodeTrackingState, MAX_AST_DEPTH,
};
