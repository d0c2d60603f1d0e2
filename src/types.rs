//! Shared primitive types used across the scope graph, identifier arena,
//! and data-flow edges.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position within a source file, 0-based as tree-sitter reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub row: u32,
    pub column: u32,
}

impl Point {
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

/// Compact, interned-friendly string storage. Mirrors the teacher's
/// `CompactString = Box<str>` convention.
pub type CompactString = Box<str>;

pub fn compact_string(s: impl AsRef<str>) -> CompactString {
    s.as_ref().into()
}

/// Stable identity key for an [`crate::ident::Identifier`].
///
/// Formats (see spec §3):
/// - syntactic: `"<package>::<file-relative-path>::<startByte>"`
/// - synthetic index: `"<base>[<keyText>]@<byteOffset>"`
/// - synthetic composite literal: `"<base>::<keyText>::<byteOffset>"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentKey(pub CompactString);

impl IdentKey {
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(compact_string(s))
    }

    pub fn syntactic(package: &str, file: &str, start_byte: u32) -> Self {
        Self::new(format!("{package}::{file}::{start_byte}"))
    }

    pub fn synthetic_index(base: &str, key_text: &str, byte_offset: u32) -> Self {
        Self::new(format!("{base}[{key_text}]@{byte_offset}"))
    }

    pub fn synthetic_literal(package: &str, file: &str, literal_start: u32) -> Self {
        Self::new(format!("{package}::{file}::{literal_start}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for IdentKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for IdentKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for IdentKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Languages the visitor ships adapters for. Additional languages plug in
/// by implementing [`crate::parsing::LanguageExtractor`]; this enum only
/// names the two shipped in-repo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Go,
    Java,
}

impl Language {
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("go") => Some(Language::Go),
            Some("java") => Some(Language::Java),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Go => "go",
            Language::Java => "java",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntactic_key_format() {
        let key = IdentKey::syntactic("pkg/util", "util.go", 42);
        assert_eq!(key.as_str(), "pkg/util::util.go::42");
    }

    #[test]
    fn synthetic_index_key_format() {
        let key = IdentKey::synthetic_index("arr", "i", 17);
        assert_eq!(key.as_str(), "arr[i]@17");
    }

    #[test]
    fn language_from_path() {
        assert_eq!(
            Language::from_path(std::path::Path::new("main.go")),
            Some(Language::Go)
        );
        assert_eq!(
            Language::from_path(std::path::Path::new("Main.java")),
            Some(Language::Java)
        );
        assert_eq!(Language::from_path(std::path::Path::new("main.py")), None);
    }
}
