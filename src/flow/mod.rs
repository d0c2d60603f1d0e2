//! Typed data-flow edges emitted by the visitor.

pub mod closure;

use crate::types::IdentKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    Read,
    Write,
    Call,
    Xfer,
    Metadata,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Read => "READ",
            EdgeKind::Write => "WRITE",
            EdgeKind::Call => "CALL",
            EdgeKind::Xfer => "XFER",
            EdgeKind::Metadata => "METADATA",
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only; duplicates are allowed and meaningful — each occurrence is
/// one textual site (spec §3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFlowEdge {
    pub src: IdentKey,
    pub dst: IdentKey,
    pub kind: EdgeKind,
    pub scope: String,
    pub attributes: BTreeMap<String, String>,
}

impl DataFlowEdge {
    pub fn new(src: IdentKey, dst: IdentKey, kind: EdgeKind, scope: impl Into<String>) -> Self {
        Self {
            src,
            dst,
            kind,
            scope: scope.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn is_self_edge(&self) -> bool {
        self.src == self.dst
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_edges_are_self_edges() {
        let id = IdentKey::new("pkg::f.go::1");
        let e = DataFlowEdge::new(id.clone(), id, EdgeKind::Metadata, "scope")
            .with_attr("annotationKey", "json")
            .with_attr("annotationValue", "id");
        assert!(e.is_self_edge());
        assert_eq!(e.attributes.get("annotationKey").unwrap(), "json");
    }
}
