//! Per-package analysis output and the cross-package merge step (spec
//! §4.6). One `PackageModel` is produced per analyzed package; `merge`
//! folds several into the single model an IR projection is built from.

use crate::flow::DataFlowEdge;
use crate::ident::Arena;
use crate::parsing::FuncSummary;
use crate::scope::Scope;
use crate::types::{IdentKey, Language};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `typeName -> fieldName -> fieldType`, populated by field declarations
/// and consulted by selector-expression shallow type inference (spec
/// §4.2). Traversal-only: never serialized.
pub type StructFieldMap = HashMap<String, HashMap<String, String>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageModel {
    /// Filesystem path of the package root. Left empty on a merged model —
    /// a merge no longer corresponds to one location on disk.
    pub path: String,
    pub language: Language,
    pub files: Vec<String>,
    pub scopes: Vec<Scope>,
    pub idents: Arena,
    pub edges: Vec<DataFlowEdge>,
    /// Struct/class field type map, built incrementally as field
    /// declarations are visited. Not part of the serialized model (spec
    /// §3 names only `Path`, `Language`, `files`, `scopes`, `Idents`,
    /// `edges` as `PackageModel` attributes).
    #[serde(skip)]
    pub struct_fields: StructFieldMap,
    /// Per-function summaries keyed by the function/method identifier's
    /// key, consulted by call sites to gate interprocedural XFER
    /// synthesis (spec §4.3's CALL row). Populated by an ungated
    /// pre-pass before the real walk; not part of the serialized model.
    #[serde(skip)]
    pub func_summaries: HashMap<IdentKey, FuncSummary>,
}

impl PackageModel {
    pub fn new(path: impl Into<String>, language: Language) -> Self {
        Self {
            path: path.into(),
            language,
            files: Vec::new(),
            scopes: Vec::new(),
            idents: Arena::new(),
            edges: Vec::new(),
            struct_fields: StructFieldMap::new(),
            func_summaries: HashMap::new(),
        }
    }

    /// Records that `type_name.field_name` has type `field_type`,
    /// called from field-declaration handling.
    pub fn declare_field(&mut self, type_name: &str, field_name: &str, field_type: &str) {
        self.struct_fields
            .entry(type_name.to_string())
            .or_default()
            .insert(field_name.to_string(), field_type.to_string());
    }

    /// Looks up the declared type of `type_name.field_name`, if known.
    pub fn field_type(&self, type_name: &str, field_name: &str) -> Option<&str> {
        self.struct_fields.get(type_name)?.get(field_name).map(String::as_str)
    }

    /// Merges `models` into a single model per spec §4.6: files, scopes,
    /// and edges concatenate in input order; identifiers union keeping the
    /// first occurrence of each key. The resulting `path` is empty and the
    /// `language` is taken from the first model (mixed-language merges are
    /// only meaningful at the IR projection stage, which tags nodes with
    /// their originating language individually).
    ///
    /// Returns `None` if `models` is empty — there is nothing to merge.
    pub fn merge(models: Vec<PackageModel>) -> Option<PackageModel> {
        let mut iter = models.into_iter();
        let mut merged = iter.next()?;
        merged.path = String::new();

        for next in iter {
            merged.files.extend(next.files);
            merged.scopes.extend(next.scopes);
            merged.edges.extend(next.edges);
            merged.idents.union_keep_first(next.idents);
        }

        Some(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::EdgeKind;
    use crate::ident::Identifier;
    use crate::types::IdentKey;

    fn sample(path: &str, file: &str, ident_name: &str) -> PackageModel {
        let mut model = PackageModel::new(path, Language::Go);
        model.files.push(file.to_string());
        let key = IdentKey::syntactic(path, file, 0);
        model
            .idents
            .get_or_insert(key.clone(), || Identifier::new(key.clone(), ident_name, path, file, 0));
        model
            .edges
            .push(DataFlowEdge::new(key.clone(), key, EdgeKind::Read, "pkg"));
        model
    }

    #[test]
    fn merge_of_single_model_matches_input_modulo_path() {
        let m = sample("pkg", "f.go", "x");
        let original_files = m.files.clone();
        let merged = PackageModel::merge(vec![m]).unwrap();
        assert_eq!(merged.path, "");
        assert_eq!(merged.files, original_files);
        assert_eq!(merged.idents.len(), 1);
    }

    #[test]
    fn merge_concatenates_and_unions_keeping_first() {
        let a = sample("pkg/a", "a.go", "a-ident");
        let b = sample("pkg/b", "b.go", "b-ident");
        let merged = PackageModel::merge(vec![a, b]).unwrap();
        assert_eq!(merged.files, vec!["a.go".to_string(), "b.go".to_string()]);
        assert_eq!(merged.edges.len(), 2);
        assert_eq!(merged.idents.len(), 2);
    }

    #[test]
    fn merge_is_associative_over_concatenation_order() {
        let a = sample("pkg/a", "a.go", "a-ident");
        let b = sample("pkg/b", "b.go", "b-ident");
        let c = sample("pkg/c", "c.go", "c-ident");

        let left = PackageModel::merge(vec![
            PackageModel::merge(vec![a.clone(), b.clone()]).unwrap(),
            c.clone(),
        ])
        .unwrap();
        let right = PackageModel::merge(vec![a, PackageModel::merge(vec![b, c]).unwrap()]).unwrap();

        assert_eq!(left.files, right.files);
        assert_eq!(left.idents.len(), right.idents.len());
    }

    #[test]
    fn merge_of_empty_list_is_none() {
        assert!(PackageModel::merge(Vec::new()).is_none());
    }
}
