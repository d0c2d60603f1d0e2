//! Shared identifier-resolution helpers (spec §4.2), used by every
//! language adapter so the arena/selector/synthetic-identifier rules are
//! implemented exactly once.

use crate::annotate::emit_metadata_edges;
use crate::flow::DataFlowEdge;
use crate::ident::{Identifier, Selector};
use crate::model::PackageModel;
use crate::scope::ScopeGraph;
use crate::types::IdentKey;

/// Resolves a plain (non-selector) identifier reference: a scope lookup
/// first, an arena lookup/insert on miss, then — only for a fresh entry —
/// registration in the current scope's symbol table (spec §4.2 steps
/// 2–5, selector-less path).
pub fn resolve_plain(
    name: &str,
    start_byte: u32,
    package: &str,
    file: &str,
    scopes: &mut ScopeGraph,
    model: &mut PackageModel,
) -> IdentKey {
    if let Some(existing) = scopes.find(name) {
        return existing;
    }

    let key = IdentKey::syntactic(package, file, start_byte);
    let is_new = !model.idents.contains(&key);
    model
        .idents
        .get_or_insert(key.clone(), || Identifier::new(key.clone(), name, package, file, start_byte));

    if is_new {
        scopes.insert(name, key.clone(), false);
    }
    key
}

/// Resolves `operand.field`: resolves the operand first (recursively,
/// since the operand may itself be a selector), then resolves the field
/// identifier with a `Selector` chain attached. If `operand`'s concrete
/// type is known in the package's struct-field map, the field's type and
/// `Kind := "field"` are propagated; otherwise, when the operand has no
/// known type (heuristically, an import alias), the field is marked
/// `Kind := "func"`, `Type := "func"` (spec §4.2's package-qualified
/// function-reference heuristic).
#[allow(clippy::too_many_arguments)]
pub fn resolve_selector(
    operand_key: IdentKey,
    operand_name: &str,
    operand_type: Option<String>,
    field_name: &str,
    field_start_byte: u32,
    package: &str,
    file: &str,
    model: &mut PackageModel,
) -> IdentKey {
    let operand_selector = model
        .idents
        .get(&operand_key)
        .and_then(|i| i.selector.clone())
        .unwrap_or_else(|| Selector::leaf(operand_name));
    let selector = Selector::chain(field_name, operand_selector);

    let key = IdentKey::syntactic(package, file, field_start_byte);

    let field_type = operand_type
        .as_deref()
        .and_then(|ty| model.field_type(ty, field_name).map(str::to_string));

    let entry = model.idents.get_or_insert(key.clone(), || {
        Identifier::new(key.clone(), format!("{operand_name}.{field_name}"), package, file, field_start_byte)
    });
    if entry.selector.is_none() {
        entry.selector = Some(selector);
    }
    if let Some(ty) = &field_type {
        entry.ty = Some(ty.as_str().into());
        entry.kind = Some("field".into());
    } else if operand_type.is_none() {
        entry.ty = Some("func".into());
        entry.kind = Some("func".into());
    }

    // Selector-qualified names are never inserted into a scope's symbol
    // table (spec §4.1).
    key
}

/// Synthetic element identifier for `obj[idx]` (spec §4.2). Never
/// inserted into a scope's symbol table.
pub fn synthetic_index(
    base_key: &IdentKey,
    base_name: &str,
    key_text: &str,
    byte_offset: u32,
    package: &str,
    file: &str,
    model: &mut PackageModel,
) -> IdentKey {
    let _ = base_key;
    let key = IdentKey::synthetic_index(base_name, key_text, byte_offset);
    let name = format!("{base_name}[{key_text}]");
    model
        .idents
        .get_or_insert(key.clone(), || Identifier::new(key.clone(), name, package, file, byte_offset));
    key
}

/// Synthetic composite-literal identifier keyed by the literal's own
/// start byte, named after its header text (spec §4.2) — used as an XFER
/// source so a literal initializer never self-loops onto its destination.
pub fn synthetic_literal(
    package: &str,
    file: &str,
    literal_start: u32,
    header_text: &str,
    model: &mut PackageModel,
) -> IdentKey {
    let key = IdentKey::synthetic_literal(package, file, literal_start);
    model.idents.get_or_insert(key.clone(), || {
        Identifier::new(key.clone(), header_text, package, file, literal_start).with_kind("literal")
    });
    key
}

/// Attaches `annotations` to the identifier at `key` and, if this is the
/// first time it carries any, emits the METADATA self-edges (spec §4.3).
pub fn attach_annotations(
    key: &IdentKey,
    annotations: Vec<(String, String)>,
    scope: &str,
    model: &mut PackageModel,
) {
    if annotations.is_empty() {
        return;
    }
    let was_empty = model.idents.get(key).map(|i| i.annotations.is_empty()).unwrap_or(true);
    if let Some(ident) = model.idents.get_mut(key) {
        for (k, v) in annotations {
            ident.annotations.insert(k, v);
        }
    }
    if was_empty {
        if let Some(ident) = model.idents.get(key) {
            let mut edges: Vec<DataFlowEdge> = Vec::new();
            emit_metadata_edges(ident, scope, &mut edges);
            model.edges.extend(edges);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Language;

    fn setup() -> (ScopeGraph, PackageModel) {
        let mut scopes = ScopeGraph::new();
        scopes.enter_package("pkg");
        scopes.enter_file(scopes.current().unwrap(), "f.go");
        let model = PackageModel::new("pkg", Language::Go);
        (scopes, model)
    }

    #[test]
    fn resolve_plain_registers_new_and_reuses_on_second_lookup() {
        let (mut scopes, mut model) = setup();
        let k1 = resolve_plain("x", 10, "pkg", "f.go", &mut scopes, &mut model);
        assert_eq!(scopes.find("x"), Some(k1.clone()));
        let k2 = resolve_plain("x", 99, "pkg", "f.go", &mut scopes, &mut model);
        assert_eq!(k1, k2, "second reference to `x` should resolve via scope lookup, not a new byte offset");
        assert_eq!(model.idents.len(), 1);
    }

    #[test]
    fn resolve_selector_propagates_field_type_from_struct_map() {
        let (mut scopes, mut model) = setup();
        model.declare_field("Person", "Name", "string");
        let p_key = resolve_plain("p", 5, "pkg", "f.go", &mut scopes, &mut model);
        model.idents.get_mut(&p_key).unwrap().ty = Some("Person".into());

        let field_key = resolve_selector(
            p_key,
            "p",
            Some("Person".to_string()),
            "Name",
            20,
            "pkg",
            "f.go",
            &mut model,
        );
        let field = model.idents.get(&field_key).unwrap();
        assert_eq!(field.kind.as_deref(), Some("field"));
        assert_eq!(field.ty.as_deref(), Some("string"));
        assert_eq!(field.selector.as_ref().unwrap().display_chain(), "p.Name");
    }

    #[test]
    fn resolve_selector_marks_unknown_type_operand_as_func_reference() {
        let (mut scopes, mut model) = setup();
        let pkg_alias_key = resolve_plain("fmt", 5, "pkg", "f.go", &mut scopes, &mut model);
        let field_key = resolve_selector(pkg_alias_key, "fmt", None, "Println", 20, "pkg", "f.go", &mut model);
        let field = model.idents.get(&field_key).unwrap();
        assert_eq!(field.kind.as_deref(), Some("func"));
        assert_eq!(field.ty.as_deref(), Some("func"));
    }

    #[test]
    fn synthetic_identifiers_never_self_loop() {
        let (_scopes, mut model) = setup();
        let lit_key = synthetic_literal("pkg", "f.go", 42, "Person", &mut model);
        assert_ne!(lit_key, IdentKey::syntactic("pkg", "f.go", 99));
        assert_eq!(model.idents.get(&lit_key).unwrap().kind.as_deref(), Some("literal"));
    }

    #[test]
    fn annotations_emit_metadata_edges_once() {
        let (_scopes, mut model) = setup();
        let key = IdentKey::syntactic("pkg", "f.go", 1);
        model
            .idents
            .get_or_insert(key.clone(), || Identifier::new(key.clone(), "id", "pkg", "f.go", 1));
        attach_annotations(&key, vec![("json".to_string(), "\"id\"".to_string())], "pkg:f.go", &mut model);
        assert_eq!(model.edges.len(), 1);
        attach_annotations(&key, vec![("db".to_string(), "\"user_id\"".to_string())], "pkg:f.go", &mut model);
        // Second batch arrives on an already-annotated identifier: no
        // second round of METADATA edges fires from this helper (the
        // per-key, per-annotation edges were already emitted once).
        assert_eq!(model.edges.len(), 1);
    }
}
