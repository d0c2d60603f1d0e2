//! Identifier arena: canonicalizes identifiers by a stable key and stores
//! selector chains, annotations, and a back-reference to the originating
//! syntax node.
//!
//! Grounded on the teacher's `Symbol`/arena-free symbol table
//! (`bartolli-codanna/src/symbol/mod.rs`, `src/types/mod.rs`): a plain
//! struct plus a dedicated owning collection, rather than the identifier
//! holding owning pointers to its edges.

pub mod refs;

use crate::types::{CompactString, IdentKey, Point, compact_string};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `a.b.c` represented as `{field: c, parent: {field: b, parent: {field: a}}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    pub field: CompactString,
    pub parent: Option<Box<Selector>>,
}

impl Selector {
    pub fn leaf(field: impl AsRef<str>) -> Self {
        Self {
            field: compact_string(field),
            parent: None,
        }
    }

    pub fn chain(field: impl AsRef<str>, parent: Selector) -> Self {
        Self {
            field: compact_string(field),
            parent: Some(Box::new(parent)),
        }
    }

    /// Render as `a.b.c`, outermost operand first.
    pub fn display_chain(&self) -> String {
        let mut parts = Vec::new();
        let mut current = Some(self);
        while let Some(sel) = current {
            parts.push(sel.field.as_ref().to_string());
            current = sel.parent.as_deref();
        }
        parts.reverse();
        parts.join(".")
    }
}

/// A lifetime-erased handle to the tree-sitter node an identifier was
/// resolved from. Stored as the node's own stable id so `Identifier` stays
/// `'static` and serializable; dropped across serialization boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRef(pub usize);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identifier {
    pub id: IdentKey,
    pub name: CompactString,
    pub kind: Option<CompactString>,
    pub package: CompactString,
    pub file: CompactString,
    pub start_byte: u32,
    pub ty: Option<CompactString>,
    pub selector: Option<Selector>,
    pub annotations: BTreeMap<String, String>,
    #[serde(skip)]
    pub node: Option<NodeRef>,
}

impl Identifier {
    pub fn new(
        id: IdentKey,
        name: impl AsRef<str>,
        package: impl AsRef<str>,
        file: impl AsRef<str>,
        start_byte: u32,
    ) -> Self {
        Self {
            id,
            name: compact_string(name),
            kind: None,
            package: compact_string(package),
            file: compact_string(file),
            start_byte,
            ty: None,
            selector: None,
            annotations: BTreeMap::new(),
            node: None,
        }
    }

    pub fn with_kind(mut self, kind: impl AsRef<str>) -> Self {
        self.kind = Some(compact_string(kind));
        self
    }
}

/// Per-package store that canonicalizes identifiers by their stable key.
///
/// `IndexMap` is used (rather than `HashMap`) so that iterating all
/// identifiers — e.g. for IR projection — yields first-resolved order,
/// matching the teacher's preference for deterministic iteration
/// (`indexmap` already appears in the teacher's dependency list for the
/// same reason).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Arena {
    idents: IndexMap<IdentKey, Identifier>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.idents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idents.is_empty()
    }

    pub fn get(&self, key: &IdentKey) -> Option<&Identifier> {
        self.idents.get(key)
    }

    pub fn get_mut(&mut self, key: &IdentKey) -> Option<&mut Identifier> {
        self.idents.get_mut(key)
    }

    pub fn contains(&self, key: &IdentKey) -> bool {
        self.idents.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IdentKey, &Identifier)> {
        self.idents.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &Identifier> {
        self.idents.values()
    }

    /// Returns the existing entry on collision; otherwise inserts and
    /// returns the new one. This is the arena's single write path so the
    /// "one entry per key" invariant holds by construction.
    pub fn get_or_insert(&mut self, key: IdentKey, build: impl FnOnce() -> Identifier) -> &mut Identifier {
        self.idents.entry(key).or_insert_with(build)
    }

    /// Unions `other` into `self`, keeping the first (self's) occurrence on
    /// key collision, per spec §4.6's `Merge` contract.
    pub fn union_keep_first(&mut self, other: Arena) {
        for (key, ident) in other.idents {
            self.idents.entry(key).or_insert(ident);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_display_chain_orders_outermost_first() {
        let sel = Selector::chain("c", Selector::chain("b", Selector::leaf("a")));
        assert_eq!(sel.display_chain(), "a.b.c");
    }

    #[test]
    fn arena_dedupes_by_key_and_keeps_existing() {
        let mut arena = Arena::new();
        let key = IdentKey::syntactic("pkg", "f.go", 10);
        arena.get_or_insert(key.clone(), || Identifier::new(key.clone(), "x", "pkg", "f.go", 10));
        let entry = arena.get_or_insert(key.clone(), || {
            Identifier::new(key.clone(), "SHOULD_NOT_WIN", "pkg", "f.go", 10)
        });
        assert_eq!(entry.name.as_ref(), "x");
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn union_keeps_first_occurrence() {
        let mut a = Arena::new();
        let mut b = Arena::new();
        let key = IdentKey::syntactic("pkg", "f.go", 10);
        a.get_or_insert(key.clone(), || Identifier::new(key.clone(), "a-wins", "pkg", "f.go", 10));
        b.get_or_insert(key.clone(), || Identifier::new(key.clone(), "b-loses", "pkg", "f.go", 10));
        a.union_keep_first(b);
        assert_eq!(a.get(&key).unwrap().name.as_ref(), "a-wins");
    }
}
