//! Intermediate-representation graph projection (spec §4.6, §3).
//!
//! Flattens a [`PackageModel`] into a language/service-qualified node-and-
//! edge graph suitable for export to downstream graph stores, independent
//! of the scope graph and identifier arena it was built from.

pub mod exporter;

use crate::model::PackageModel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrNode {
    pub id: String,
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrEdge {
    pub src: String,
    pub dst: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IrGraph {
    pub nodes: Vec<IrNode>,
    pub edges: Vec<IrEdge>,
}

/// Qualifies an arena identifier key with `(language, service)` so that
/// nodes originating from different services never collide even if their
/// underlying arena keys happen to match.
fn node_id(language: &str, service: &str, ident_key: &str) -> String {
    format!("{language}:{service}:{ident_key}")
}

/// Projects a (possibly merged) [`PackageModel`] into an [`IrGraph`],
/// tagging every node and edge with `service` so a downstream store can
/// tell which deployable the data came from.
pub fn build_ir_graph(model: &PackageModel, service: &str) -> IrGraph {
    let language = model.language.as_str();

    let nodes = model
        .idents
        .values()
        .map(|ident| {
            let mut properties = BTreeMap::new();
            properties.insert("name".to_string(), ident.name.as_ref().to_string());
            properties.insert("package".to_string(), ident.package.as_ref().to_string());
            properties.insert("file".to_string(), ident.file.as_ref().to_string());
            properties.insert("startByte".to_string(), ident.start_byte.to_string());
            properties.insert("language".to_string(), language.to_string());
            properties.insert("service".to_string(), service.to_string());
            if let Some(kind) = &ident.kind {
                properties.insert("type".to_string(), kind.as_ref().to_string());
            }
            if let Some(selector) = &ident.selector {
                properties.insert("selector".to_string(), selector.display_chain());
            }

            IrNode {
                id: node_id(language, service, ident.id.as_str()),
                properties,
            }
        })
        .collect();

    let edges = model
        .edges
        .iter()
        .map(|edge| {
            let mut properties = edge.attributes.clone();
            properties.insert("scope".to_string(), edge.scope.clone());
            IrEdge {
                src: node_id(language, service, edge.src.as_str()),
                dst: node_id(language, service, edge.dst.as_str()),
                edge_type: edge.kind.as_str().to_string(),
                properties,
            }
        })
        .collect();

    IrGraph { nodes, edges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{DataFlowEdge, EdgeKind};
    use crate::ident::Identifier;
    use crate::types::{IdentKey, Language};

    #[test]
    fn node_ids_are_qualified_by_language_and_service() {
        let mut model = PackageModel::new("pkg", Language::Go);
        let key = IdentKey::syntactic("pkg", "f.go", 1);
        model
            .idents
            .get_or_insert(key.clone(), || Identifier::new(key.clone(), "x", "pkg", "f.go", 1));
        model.edges.push(DataFlowEdge::new(key.clone(), key, EdgeKind::Read, "pkg"));

        let graph = build_ir_graph(&model, "checkout-svc");
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.nodes[0].id.starts_with("go:checkout-svc:"));
        assert_eq!(graph.edges[0].edge_type, "READ");
        assert_eq!(graph.edges[0].properties.get("scope").unwrap(), "pkg");
    }

    #[test]
    fn node_type_property_comes_from_identifier_kind() {
        let mut model = PackageModel::new("pkg", Language::Go);
        let key = IdentKey::syntactic("pkg", "f.go", 1);
        let mut ident = Identifier::new(key.clone(), "x", "pkg", "f.go", 1);
        ident.kind = Some("parameter".into());
        model.idents.get_or_insert(key.clone(), || ident);

        let graph = build_ir_graph(&model, "checkout-svc");
        assert_eq!(graph.nodes[0].properties.get("type").unwrap(), "parameter");
    }
}
