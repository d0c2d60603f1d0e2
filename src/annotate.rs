//! Annotation & tag parser (spec §4.1 component, §4.3 "Annotation hooks").
//!
//! Harvests preceding line-comment annotations, struct field tag strings,
//! and declaration-level annotations into an attribute mapping, and hosts
//! the `AnnotationHook`/`Plugin` extension points.

use crate::flow::{DataFlowEdge, EdgeKind};
use crate::ident::Identifier;
use crate::model::PackageModel;
use std::collections::BTreeMap;
use tree_sitter::Node;

/// Parses a Go-style struct tag string, e.g. `` `json:"id" db:"user_id"` ``,
/// into ordered `(key, value)` pairs. The value is kept exactly as it
/// appears between quotes (including any embedded options after a comma),
/// matching how the source's tag text reads in `Annotations`.
pub fn parse_go_struct_tag(raw: &str) -> Vec<(String, String)> {
    let trimmed = raw.trim().trim_matches('`');
    let mut out = Vec::new();
    let bytes = trimmed.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        while i < bytes.len() && bytes[i] == b' ' {
            i += 1;
        }
        let key_start = i;
        while i < bytes.len() && bytes[i] != b':' {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }
        let key = &trimmed[key_start..i];
        i += 1; // skip ':'
        if i >= bytes.len() || bytes[i] != b'"' {
            break;
        }
        i += 1; // skip opening quote
        let val_start = i;
        while i < bytes.len() && bytes[i] != b'"' {
            i += 1;
        }
        let value = &trimmed[val_start..i];
        i += 1; // skip closing quote
        if !key.is_empty() {
            out.push((key.to_string(), format!("\"{value}\"")));
        }
    }
    out
}

/// Parses a Java annotation's argument list text (e.g. `name="id"`) into
/// `(AnnotationName.argName, argValueText)` pairs. A bare marker
/// annotation with no arguments yields a single `(AnnotationName, "true")`
/// pair.
pub fn parse_java_annotation(annotation_name: &str, arguments_text: Option<&str>) -> Vec<(String, String)> {
    let Some(args) = arguments_text else {
        return vec![(annotation_name.to_string(), "true".to_string())];
    };
    let inner = args.trim().trim_start_matches('(').trim_end_matches(')');
    if inner.trim().is_empty() {
        return vec![(annotation_name.to_string(), "true".to_string())];
    }

    let mut out = Vec::new();
    for part in split_top_level_commas(inner) {
        let part = part.trim();
        if let Some(eq) = part.find('=') {
            let key = part[..eq].trim();
            let value = part[eq + 1..].trim();
            out.push((format!("{annotation_name}.{key}"), value.to_string()));
        } else {
            // Single-value annotation, e.g. @SuppressWarnings("x")
            out.push((annotation_name.to_string(), part.to_string()));
        }
    }
    out
}

fn split_top_level_commas(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' | '{' | '[' => depth += 1,
            ')' | '}' | ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Called on first resolution of an identifier carrying annotations:
/// emits one METADATA self-edge per `(key, value)` pair (spec §4.3).
pub fn emit_metadata_edges(ident: &Identifier, scope: &str, edges: &mut Vec<DataFlowEdge>) {
    for (key, value) in &ident.annotations {
        edges.push(
            DataFlowEdge::new(ident.id.clone(), ident.id.clone(), EdgeKind::Metadata, scope)
                .with_attr("annotationKey", key.clone())
                .with_attr("annotationValue", value.clone()),
        );
    }
}

/// Receives `BeforeWalk`/`AfterResolveIdent` callbacks. Implementors get a
/// short-lived `&mut PackageModel` only for the duration of the callback
/// and must not retain it (spec §5, §9).
pub trait Plugin: Send + Sync {
    fn before_walk(&self, _node: &Node, _model: &mut PackageModel) {}
    fn after_resolve_ident(&self, _node: &Node, _ident: &mut Identifier, _model: &mut PackageModel) {}
}

/// A narrower hook invoked specifically when an identifier's annotation
/// map is first populated; may append additional edges beyond the default
/// METADATA self-edges.
pub trait AnnotationHook: Send + Sync {
    fn on_annotations(&self, ident: &Identifier, annotations: &BTreeMap<String, String>, model: &mut PackageModel);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_go_struct_tag_with_multiple_keys() {
        let pairs = parse_go_struct_tag(r#"`json:"id" db:"user_id"`"#);
        assert_eq!(
            pairs,
            vec![
                ("json".to_string(), "\"id\"".to_string()),
                ("db".to_string(), "\"user_id\"".to_string()),
            ]
        );
    }

    #[test]
    fn parses_java_annotation_with_named_arg() {
        let pairs = parse_java_annotation("Column", Some("(name=\"id\")"));
        assert_eq!(pairs, vec![("Column.name".to_string(), "\"id\"".to_string())]);
    }

    #[test]
    fn parses_bare_marker_annotation() {
        let pairs = parse_java_annotation("Override", None);
        assert_eq!(pairs, vec![("Override".to_string(), "true".to_string())]);
    }
}
