//! Java-like language extractor (spec §4.3, §4.5): class/field/method
//! declarations, field access, method invocation, annotations,
//! conditionals, loops, and function summaries.

mod walker;

pub use walker::JavaExtractor;
