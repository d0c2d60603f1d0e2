//! Lexical scope graph: nesting of package → file → function/method →
//! block/if/for/switch/case, each owning a symbol table mapping plain
//! names to identifiers.
//!
//! Structure follows the teacher's note in the design docs it left behind
//! for scope-like constructs: an explicit stack during traversal, a
//! parent-pointered tree when stored, symbol tables living on scopes but
//! never reverse-indexing identifiers (see `DESIGN.md`).

use crate::types::{IdentKey, Point};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeKind {
    Package,
    File,
    Function,
    Method,
    If,
    Else,
    For,
    Range,
    While,
    Switch,
    Case,
    Block,
    Component,
}

impl ScopeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::Package => "package",
            ScopeKind::File => "file",
            ScopeKind::Function => "function",
            ScopeKind::Method => "method",
            ScopeKind::If => "if",
            ScopeKind::Else => "else",
            ScopeKind::For => "for",
            ScopeKind::Range => "range",
            ScopeKind::While => "while",
            ScopeKind::Switch => "switch",
            ScopeKind::Case => "case",
            ScopeKind::Block => "block",
            ScopeKind::Component => "component",
        }
    }
}

impl std::fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A handle into `ScopeGraph::scopes`. Cheap to copy, stable for the life
/// of the package model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeHandle(pub usize);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scope {
    pub id: String,
    pub kind: ScopeKind,
    pub name: Option<String>,
    pub start: Point,
    pub end: Point,
    pub parent: Option<ScopeHandle>,
    pub symbols: HashMap<String, IdentKey>,
}

/// Owns every scope created during traversal of one package. The current
/// scope stack lives here too, so callers drive `enter`/`leave` around
/// each syntax construct without threading a separate stack.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScopeGraph {
    scopes: Vec<Scope>,
    #[serde(skip)]
    stack: Vec<ScopeHandle>,
    /// Per-(parent, kind) counters for block-like scope IDs
    /// (`"<parentID>.<kind>_<idx>"`).
    #[serde(skip)]
    counters: HashMap<(usize, &'static str), usize>,
}

impl ScopeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    pub fn into_scopes(self) -> Vec<Scope> {
        self.scopes
    }

    pub fn current(&self) -> Option<ScopeHandle> {
        self.stack.last().copied()
    }

    pub fn get(&self, handle: ScopeHandle) -> &Scope {
        &self.scopes[handle.0]
    }

    pub fn get_mut(&mut self, handle: ScopeHandle) -> &mut Scope {
        &mut self.scopes[handle.0]
    }

    pub fn current_id(&self) -> String {
        self.current()
            .map(|h| self.get(h).id.clone())
            .unwrap_or_else(|| "<file>".to_string())
    }

    /// Creates the root package scope. Must be called exactly once before
    /// any other `enter` call.
    pub fn enter_package(&mut self, package: &str) -> ScopeHandle {
        let handle = ScopeHandle(self.scopes.len());
        self.scopes.push(Scope {
            id: package.to_string(),
            kind: ScopeKind::Package,
            name: Some(package.to_string()),
            start: Point::new(0, 0),
            end: Point::new(0, 0),
            parent: None,
            symbols: HashMap::new(),
        });
        self.stack.push(handle);
        handle
    }

    /// File scopes register under the package scope by base file name:
    /// `"<pkg>:<fileBasename>"`.
    pub fn enter_file(&mut self, package_scope: ScopeHandle, file_basename: &str) -> ScopeHandle {
        let id = format!("{}:{}", self.get(package_scope).id, file_basename);
        let handle = ScopeHandle(self.scopes.len());
        self.scopes.push(Scope {
            id,
            kind: ScopeKind::File,
            name: Some(file_basename.to_string()),
            start: Point::new(0, 0),
            end: Point::new(0, 0),
            parent: Some(package_scope),
            symbols: HashMap::new(),
        });
        self.stack.push(handle);
        handle
    }

    /// Creates a child scope under the current one. ID scheme:
    /// `"<parentID>.<kind>_<idx>"` with per-parent, per-kind counters.
    pub fn enter(&mut self, kind: ScopeKind, name: Option<&str>, start: Point, end: Point) -> ScopeHandle {
        let parent = self.current();
        let parent_idx = parent.map(|h| h.0).unwrap_or(usize::MAX);
        let counter_key = (parent_idx, kind.as_str());
        let idx = self.counters.entry(counter_key).or_insert(0);
        let this_idx = *idx;
        *idx += 1;

        let parent_id = parent
            .map(|h| self.get(h).id.clone())
            .unwrap_or_else(|| "<root>".to_string());
        let id = format!("{parent_id}.{}_{this_idx}", kind.as_str());

        let handle = ScopeHandle(self.scopes.len());
        self.scopes.push(Scope {
            id,
            kind,
            name: name.map(str::to_string),
            start,
            end,
            parent,
            symbols: HashMap::new(),
        });
        self.stack.push(handle);
        handle
    }

    /// Pops to parent. No-op (stays at root) if already at the package
    /// scope, since the package scope must outlive the whole traversal.
    pub fn leave(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    /// Registers a plain identifier in the current scope's symbol table.
    /// No-op for identifiers that carry a selector — selector-qualified
    /// names are never inserted (spec §4.1).
    pub fn insert(&mut self, name: &str, key: IdentKey, has_selector: bool) {
        if has_selector {
            return;
        }
        if let Some(handle) = self.current() {
            self.get_mut(handle).symbols.insert(name.to_string(), key);
        }
    }

    /// Walks the parent chain returning the first match, starting at the
    /// current scope.
    pub fn find(&self, name: &str) -> Option<IdentKey> {
        let mut handle = self.current();
        while let Some(h) = handle {
            let scope = self.get(h);
            if let Some(key) = scope.symbols.get(name) {
                return Some(key.clone());
            }
            handle = scope.parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_scope_id_uses_package_and_basename() {
        let mut g = ScopeGraph::new();
        let pkg = g.enter_package("pkg/util");
        let file = g.enter_file(pkg, "util.go");
        assert_eq!(g.get(file).id, "pkg/util:util.go");
    }

    #[test]
    fn block_scope_ids_counted_per_parent_and_kind() {
        let mut g = ScopeGraph::new();
        let pkg = g.enter_package("pkg");
        g.enter_file(pkg, "f.go");
        let func = g.enter(ScopeKind::Function, Some("DoThing"), Point::new(1, 0), Point::new(10, 0));
        assert!(g.get(func).id.ends_with(".function_0"));
        let if1 = g.enter(ScopeKind::If, None, Point::new(2, 0), Point::new(3, 0));
        g.leave();
        let if2 = g.enter(ScopeKind::If, None, Point::new(4, 0), Point::new(5, 0));
        assert!(g.get(if1).id.ends_with(".if_0"));
        assert!(g.get(if2).id.ends_with(".if_1"));
    }

    #[test]
    fn find_walks_parent_chain_until_shadowed() {
        let mut g = ScopeGraph::new();
        let pkg = g.enter_package("pkg");
        g.enter_file(pkg, "f.go");
        g.enter(ScopeKind::Function, Some("f"), Point::new(0, 0), Point::new(0, 0));
        let outer_key = IdentKey::new("outer");
        g.insert("x", outer_key.clone(), false);
        g.enter(ScopeKind::Block, None, Point::new(0, 0), Point::new(0, 0));
        assert_eq!(g.find("x"), Some(outer_key.clone()));
        let inner_key = IdentKey::new("inner");
        g.insert("x", inner_key.clone(), false);
        assert_eq!(g.find("x"), Some(inner_key));
        g.leave();
        assert_eq!(g.find("x"), Some(outer_key));
    }

    #[test]
    fn selector_qualified_names_never_inserted() {
        let mut g = ScopeGraph::new();
        let pkg = g.enter_package("pkg");
        g.enter_file(pkg, "f.go");
        g.insert("a.b", IdentKey::new("whatever"), true);
        assert_eq!(g.find("a.b"), None);
    }
}
