//! Visitor / extractor layer (spec §4.3, §4.5).
//!
//! Hosts the language-neutral construct vocabulary every grammar adapter
//! maps onto, the [`LanguageExtractor`] trait adapters implement, and the
//! `FuncSummary` interprocedural-forwarding model.
//!
//! Grounded on the teacher's parser trait and node-tracking machinery
//! (`bartolli-codanna/src/parsing/parser.rs`): a small trait the core
//! drives without branching on language, plus a `NodeTracker` side
//! channel for audit reporting of which grammar node kinds were handled.

use crate::error::AnalysisResult;
use crate::model::PackageModel;
use crate::scope::ScopeGraph;
use std::collections::HashSet;
use std::path::Path;
use tree_sitter::Node;

/// Language-neutral construct categories a grammar adapter maps its node
/// kinds onto (spec §4.3's emission table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstructKind {
    Declaration,
    Assignment,
    CompoundAssignment,
    FieldDeclaration,
    SelectorRead,
    SelectorWrite,
    FunctionDecl,
    MethodDecl,
    Call,
    ConcurrentCall,
    ChannelSend,
    ChannelReceive,
    Select,
    Conditional,
    Loop,
    Return,
}

/// Ordered parameters/returns and the derived parameter→return flow map
/// for a single function or method (spec §4.3, GLOSSARY).
#[derive(Debug, Clone, Default)]
pub struct FuncSummary {
    pub params: Vec<crate::types::IdentKey>,
    pub returns: Vec<crate::types::IdentKey>,
    /// `flows[i]` lists the indices into `returns` that parameter `i`
    /// flows into.
    pub flows: Vec<Vec<usize>>,
}

impl FuncSummary {
    pub fn new(params: Vec<crate::types::IdentKey>, returns: Vec<crate::types::IdentKey>) -> Self {
        let flows = vec![Vec::new(); params.len()];
        Self { params, returns, flows }
    }

    /// An identity-signature function: exactly one parameter, one return,
    /// whose types are textually equal (GLOSSARY). Such a function always
    /// forwards its single argument regardless of the traced `flows` map.
    pub fn is_identity_signature(&self, param_type: Option<&str>, return_type: Option<&str>) -> bool {
        self.params.len() == 1
            && self.returns.len() == 1
            && match (param_type, return_type) {
                (Some(p), Some(r)) => p == r,
                _ => false,
            }
    }

    /// Records that parameter `param_idx` flows into return `return_idx`,
    /// deduplicating repeated observations from the same function body.
    pub fn record_flow(&mut self, param_idx: usize, return_idx: usize) {
        if let Some(targets) = self.flows.get_mut(param_idx) {
            if !targets.contains(&return_idx) {
                targets.push(return_idx);
            }
        }
    }
}

/// Picks which of a call's argument keys are genuine interprocedural
/// data-flow sources (spec §4.3's CALL row): `false` when interprocedural
/// analysis is disabled or the callee has no traced summary (an
/// unresolved or external function); otherwise argument `i` is kept when
/// it reaches some return in the callee's `flows` map, or unconditionally
/// when the callee is an identity-signature function.
pub fn forwarded_call_sources(
    arg_keys: &[crate::types::IdentKey],
    fn_key: &crate::types::IdentKey,
    model: &PackageModel,
    interprocedural: bool,
) -> Vec<crate::types::IdentKey> {
    if !interprocedural {
        return Vec::new();
    }
    let Some(summary) = model.func_summaries.get(fn_key) else {
        return Vec::new();
    };
    let identity = summary.params.len() == 1
        && summary.returns.len() == 1
        && summary.is_identity_signature(
            model.idents.get(&summary.params[0]).and_then(|i| i.ty.as_deref()),
            model.idents.get(&summary.returns[0]).and_then(|i| i.ty.as_deref()),
        );
    arg_keys
        .iter()
        .enumerate()
        .filter(|(i, _)| identity || summary.flows.get(*i).map(|targets| !targets.is_empty()).unwrap_or(false))
        .map(|(_, key)| key.clone())
        .collect()
}

/// Implemented once per supported source language. The core walker never
/// branches on language; it only calls through this trait (spec §9
/// "Polymorphism across languages").
pub trait LanguageExtractor: Send + Sync {
    /// File matcher: directory/extension filter.
    fn matches(&self, path: &Path) -> bool;

    fn language(&self) -> crate::types::Language;

    /// Parses `source` and walks the resulting tree, appending
    /// identifiers and edges to `model` under `scopes` (the package's
    /// shared scope graph — already positioned at the package scope; the
    /// extractor enters and leaves its own file scope). `package` and
    /// `file` are the identity-key components for this file (spec §3).
    ///
    /// `interprocedural` gates call-site XFER synthesis against
    /// `model.func_summaries` (spec §4.3's CALL row). Callers doing the
    /// ungated pre-pass that populates `func_summaries` in the first
    /// place always pass `true` here regardless of the user's
    /// `analysis.interprocedural` setting — that pass exists purely to
    /// trace each function's own parameter→return flow, which the spec
    /// defines independent of whether the setting is later honored at
    /// call sites.
    fn analyze_file(
        &self,
        package: &str,
        file: &str,
        source: &str,
        scopes: &mut ScopeGraph,
        model: &mut PackageModel,
        interprocedural: bool,
    ) -> AnalysisResult<()>;
}

/// Information about a handled concrete-syntax-tree node kind, used for
/// audit reporting of grammar coverage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandledNode {
    pub kind: String,
    pub id: u16,
}

/// Tracks which node kinds an extractor has handled during a run, so the
/// CLI can report grammar coverage without maintaining a static list by
/// hand.
pub trait NodeTracker {
    fn handled_nodes(&self) -> &HashSet<HandledNode>;
    fn register_handled(&mut self, node: &Node);
}

#[derive(Debug, Default)]
pub struct NodeTrackingState {
    handled: HashSet<HandledNode>,
}

impl NodeTrackingState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NodeTracker for NodeTrackingState {
    fn handled_nodes(&self) -> &HashSet<HandledNode> {
        &self.handled
    }

    fn register_handled(&mut self, node: &Node) {
        self.handled.insert(HandledNode {
            kind: node.kind().to_string(),
            id: node.kind_id(),
        });
    }
}

/// Maximum recursion depth for tree traversal, matching the teacher's
/// guard against pathologically nested source (deeply nested composite
/// literals, chained selectors).
pub const MAX_AST_DEPTH: usize = 500;

pub fn check_recursion_depth(depth: usize) -> bool {
    depth < MAX_AST_DEPTH
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IdentKey;

    #[test]
    fn identity_signature_requires_matching_types() {
        let summary = FuncSummary::new(vec![IdentKey::new("x")], vec![IdentKey::new("x")]);
        assert!(summary.is_identity_signature(Some("int"), Some("int")));
        assert!(!summary.is_identity_signature(Some("int"), Some("string")));
    }

    #[test]
    fn multi_param_function_is_never_identity() {
        let summary = FuncSummary::new(vec![IdentKey::new("a"), IdentKey::new("b")], vec![IdentKey::new("r")]);
        assert!(!summary.is_identity_signature(Some("int"), Some("int")));
    }

    #[test]
    fn record_flow_deduplicates() {
        let mut summary = FuncSummary::new(vec![IdentKey::new("x")], vec![IdentKey::new("r")]);
        summary.record_flow(0, 0);
        summary.record_flow(0, 0);
        assert_eq!(summary.flows[0], vec![0]);
    }
}
