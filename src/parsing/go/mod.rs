//! Go-like language extractor (spec §4.3, §4.5): declarations,
//! assignments, selectors, calls (with goroutine forking and channel
//! send/receive), conditionals, loops, and function summaries.

mod walker;

pub use walker::GoExtractor;
