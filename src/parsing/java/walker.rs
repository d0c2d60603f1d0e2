//! Tree-sitter-java-driven implementation of [`LanguageExtractor`].
//!
//! Mirrors `crate::parsing::go::walker`'s shape (shared resolution
//! helpers, the same `FnCtx` two-phase per-method pass) but maps onto
//! Java's grammar: classes, fields, methods, field access, method
//! invocation and annotations. Java has no goroutine/channel
//! equivalent, so the concurrent-call and channel rows of the emission
//! table don't apply here (spec §4.3, §9).

use crate::annotate::parse_java_annotation;
use crate::error::{AnalysisError, AnalysisResult};
use crate::flow::{DataFlowEdge, EdgeKind};
use crate::ident::Identifier;
use crate::model::PackageModel;
use crate::parsing::resolve::{attach_annotations, resolve_plain, resolve_selector, synthetic_index, synthetic_literal};
use crate::parsing::{
    check_recursion_depth, forwarded_call_sources, FuncSummary, LanguageExtractor, NodeTracker, NodeTrackingState,
};
use crate::scope::{ScopeGraph, ScopeKind};
use crate::types::{IdentKey, Language, Point};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser};

const CLASS_DECLARATION: &str = "class_declaration";
const INTERFACE_DECLARATION: &str = "interface_declaration";
const FIELD_DECLARATION: &str = "field_declaration";
const METHOD_DECLARATION: &str = "method_declaration";
const CONSTRUCTOR_DECLARATION: &str = "constructor_declaration";
const LOCAL_VARIABLE_DECLARATION: &str = "local_variable_declaration";
const VARIABLE_DECLARATOR: &str = "variable_declarator";
const ASSIGNMENT_EXPRESSION: &str = "assignment_expression";
const FIELD_ACCESS: &str = "field_access";
const METHOD_INVOCATION: &str = "method_invocation";
const OBJECT_CREATION_EXPRESSION: &str = "object_creation_expression";
const ARRAY_ACCESS: &str = "array_access";
const IF_STATEMENT: &str = "if_statement";
const FOR_STATEMENT: &str = "for_statement";
const ENHANCED_FOR_STATEMENT: &str = "enhanced_for_statement";
const WHILE_STATEMENT: &str = "while_statement";
const RETURN_STATEMENT: &str = "return_statement";
const MARKER_ANNOTATION: &str = "marker_annotation";
const ANNOTATION: &str = "annotation";
const IDENTIFIER: &str = "identifier";
const BLOCK: &str = "block";
const FORMAL_PARAMETER: &str = "formal_parameter";
const EXPRESSION_STATEMENT: &str = "expression_statement";

#[derive(Default)]
pub struct JavaExtractor;

impl JavaExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageExtractor for JavaExtractor {
    fn matches(&self, path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some("java")
    }

    fn language(&self) -> Language {
        Language::Java
    }

    fn analyze_file(
        &self,
        package: &str,
        file: &str,
        source: &str,
        scopes: &mut ScopeGraph,
        model: &mut PackageModel,
        interprocedural: bool,
    ) -> AnalysisResult<()> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .map_err(|e| parse_err(file, e.to_string()))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| parse_err(file, "parser returned no tree".to_string()))?;

        let pkg_scope = scopes.current().expect("package scope must be entered before analyzing files");
        scopes.enter_file(pkg_scope, file);

        let mut tracker = NodeTrackingState::new();
        {
            let mut ctx = Ctx {
                package,
                file,
                source,
                model,
                tracker: &mut tracker,
                interprocedural,
            };
            walk_top_level(&tree.root_node(), scopes, &mut ctx);
        }
        scopes.leave();
        tracing::debug!(file, handled_kinds = tracker.handled_nodes().len(), "java file walked");
        Ok(())
    }
}

fn parse_err(file: &str, reason: String) -> AnalysisError {
    AnalysisError::Parse {
        path: PathBuf::from(file),
        language: "java".to_string(),
        reason,
    }
}

struct Ctx<'a> {
    package: &'a str,
    file: &'a str,
    source: &'a str,
    model: &'a mut PackageModel,
    tracker: &'a mut NodeTrackingState,
    interprocedural: bool,
}

impl<'a> Ctx<'a> {
    fn text(&self, node: &Node) -> &'a str {
        &self.source[node.byte_range()]
    }

    fn register(&mut self, node: &Node) {
        self.tracker.register_handled(node);
    }
}

struct FnCtx {
    scope_id: String,
    summary: FuncSummary,
    returned: Vec<IdentKey>,
}

fn walk_top_level(node: &Node, scopes: &mut ScopeGraph, ctx: &mut Ctx) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            CLASS_DECLARATION | INTERFACE_DECLARATION => walk_class(&child, scopes, ctx),
            _ => walk_top_level(&child, scopes, ctx),
        }
    }
}

fn walk_class(node: &Node, scopes: &mut ScopeGraph, ctx: &mut Ctx) {
    ctx.register(node);
    let Some(name_node) = node.child_by_field_name("name") else { return };
    let class_name = ctx.text(&name_node).to_string();

    let Some(body) = node.child_by_field_name("body") else { return };
    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        match member.kind() {
            FIELD_DECLARATION => walk_field_declaration(&member, &class_name, scopes, ctx),
            METHOD_DECLARATION | CONSTRUCTOR_DECLARATION => walk_method(&member, scopes, ctx),
            CLASS_DECLARATION | INTERFACE_DECLARATION => walk_class(&member, scopes, ctx),
            _ => {}
        }
    }
}

fn walk_field_declaration(node: &Node, class_name: &str, scopes: &mut ScopeGraph, ctx: &mut Ctx) {
    ctx.register(node);
    let Some(type_node) = node.child_by_field_name("type") else { return };
    let field_type = ctx.text(&type_node).to_string();
    let annotations = collect_annotations(node, ctx);

    let mut cursor = node.walk();
    for declarator in node.named_children(&mut cursor) {
        if declarator.kind() != VARIABLE_DECLARATOR {
            continue;
        }
        let Some(name_node) = declarator.child_by_field_name("name") else { continue };
        let field_name = ctx.text(&name_node).to_string();
        ctx.model.declare_field(class_name, &field_name, &field_type);

        let key = resolve_plain(&field_name, name_node.start_byte() as u32, ctx.package, ctx.file, scopes, ctx.model);
        ctx.model.idents.get_mut(&key).unwrap().kind = Some("field".into());
        ctx.model.idents.get_mut(&key).unwrap().ty = Some(field_type.as_str().into());
        attach_annotations(&key, annotations.clone(), class_name, ctx.model);
    }
}

fn collect_annotations(node: &Node, ctx: &mut Ctx) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let Some(modifiers) = node.child(0).filter(|n| n.kind() == "modifiers") else { return out };
    let mut cursor = modifiers.walk();
    for child in modifiers.named_children(&mut cursor) {
        match child.kind() {
            MARKER_ANNOTATION => {
                let name = child.child_by_field_name("name").map(|n| ctx.text(&n).to_string()).unwrap_or_default();
                out.extend(parse_java_annotation(&name, None));
            }
            ANNOTATION => {
                let name = child.child_by_field_name("name").map(|n| ctx.text(&n).to_string()).unwrap_or_default();
                let args = child.child_by_field_name("arguments").map(|a| ctx.text(&a).to_string());
                out.extend(parse_java_annotation(&name, args.as_deref()));
            }
            _ => {}
        }
    }
    out
}

fn walk_method(node: &Node, scopes: &mut ScopeGraph, ctx: &mut Ctx) {
    ctx.register(node);
    let func_name = node
        .child_by_field_name("name")
        .map(|n| ctx.text(&n).to_string())
        .unwrap_or_else(|| "<init>".to_string());
    let name_start = node.child_by_field_name("name").map(|n| n.start_byte() as u32).unwrap_or(node.start_byte() as u32);
    let func_key = resolve_plain(&func_name, name_start, ctx.package, ctx.file, scopes, ctx.model);
    ctx.model.idents.get_mut(&func_key).unwrap().kind = Some("method".into());

    let return_type = node.child_by_field_name("type").map(|t| ctx.text(&t).to_string());

    let start = node.start_position();
    let end = node.end_position();
    scopes.enter(
        ScopeKind::Method,
        Some(&func_name),
        Point::new(start.row as u32, start.column as u32),
        Point::new(end.row as u32, end.column as u32),
    );
    let scope_id = scopes.current_id();

    let mut param_keys = Vec::new();
    let mut param_types = Vec::new();
    if let Some(params) = node.child_by_field_name("parameters") {
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            if param.kind() != FORMAL_PARAMETER {
                continue;
            }
            let ty = param.child_by_field_name("type").map(|t| ctx.text(&t).to_string()).unwrap_or_default();
            let Some(name_node) = param.child_by_field_name("name") else { continue };
            let name = ctx.text(&name_node).to_string();
            let key = resolve_plain(&name, name_node.start_byte() as u32, ctx.package, ctx.file, scopes, ctx.model);
            ctx.model.idents.get_mut(&key).unwrap().kind = Some("parameter".into());
            ctx.model.idents.get_mut(&key).unwrap().ty = Some(ty.as_str().into());
            param_keys.push(key);
            param_types.push(ty);
        }
    }

    let mut fnctx = FnCtx {
        scope_id: scope_id.clone(),
        summary: FuncSummary::new(param_keys, Vec::new()),
        returned: Vec::new(),
    };

    if let Some(body) = node.child_by_field_name("body") {
        walk_block(&body, scopes, ctx, Some(&mut fnctx));
    }

    fnctx.summary.returns = fnctx.returned.clone();
    trace_param_return_flows(ctx.model, &mut fnctx.summary, &fnctx.scope_id);
    tracing::debug!(
        method = func_name,
        identity = fnctx.summary.is_identity_signature(
            param_types.first().map(|s| s.as_str()),
            return_type.as_deref(),
        ),
        "method summary traced"
    );
    ctx.model.func_summaries.insert(func_key.clone(), fnctx.summary.clone());

    scopes.leave();
}

fn trace_param_return_flows(model: &PackageModel, summary: &mut FuncSummary, scope_id: &str) {
    let mut adjacency: HashMap<IdentKey, Vec<IdentKey>> = HashMap::new();
    for edge in &model.edges {
        if edge.scope != scope_id || edge.src == edge.dst {
            continue;
        }
        if matches!(edge.kind, EdgeKind::Read | EdgeKind::Xfer) {
            adjacency.entry(edge.src.clone()).or_default().push(edge.dst.clone());
            adjacency.entry(edge.dst.clone()).or_default().push(edge.src.clone());
        }
    }

    let params = summary.params.clone();
    for (param_idx, param_key) in params.iter().enumerate() {
        let mut visited = std::collections::HashSet::new();
        let mut queue = std::collections::VecDeque::new();
        visited.insert(param_key.clone());
        queue.push_back(param_key.clone());
        while let Some(current) = queue.pop_front() {
            if let Some(return_idx) = summary.returns.iter().position(|r| r == &current) {
                summary.record_flow(param_idx, return_idx);
            }
            if let Some(neighbors) = adjacency.get(&current) {
                for neighbor in neighbors {
                    if visited.insert(neighbor.clone()) {
                        queue.push_back(neighbor.clone());
                    }
                }
            }
        }
    }
}

fn walk_block(node: &Node, scopes: &mut ScopeGraph, ctx: &mut Ctx, mut fnctx: Option<&mut FnCtx>) {
    let mut cursor = node.walk();
    for stmt in node.named_children(&mut cursor) {
        walk_stmt(&stmt, scopes, ctx, fnctx.as_deref_mut(), 1);
    }
}

fn walk_stmt(node: &Node, scopes: &mut ScopeGraph, ctx: &mut Ctx, mut fnctx: Option<&mut FnCtx>, depth: usize) {
    if !check_recursion_depth(depth) {
        return;
    }
    ctx.register(node);
    match node.kind() {
        LOCAL_VARIABLE_DECLARATION => {
            let scope_id = scopes.current_id();
            let mut cursor = node.walk();
            for declarator in node.named_children(&mut cursor) {
                if declarator.kind() != VARIABLE_DECLARATOR {
                    continue;
                }
                let Some(name_node) = declarator.child_by_field_name("name") else { continue };
                let value_node = declarator.child_by_field_name("value");
                emit_binding(&name_node, value_node.as_ref(), scopes, ctx, &scope_id, fnctx.as_deref_mut(), depth);
            }
        }
        EXPRESSION_STATEMENT => {
            if let Some(expr) = node.named_child(0) {
                walk_stmt(&expr, scopes, ctx, fnctx, depth + 1);
            }
        }
        ASSIGNMENT_EXPRESSION => {
            let scope_id = scopes.current_id();
            let Some(left) = node.child_by_field_name("left") else { return };
            let Some(right) = node.child_by_field_name("right") else { return };
            emit_binding(&left, Some(&right), scopes, ctx, &scope_id, fnctx.as_deref_mut(), depth);
        }
        METHOD_INVOCATION => {
            let scope_id = scopes.current_id();
            handle_call(node, scopes, ctx, fnctx.as_deref_mut(), depth, &scope_id);
        }
        IF_STATEMENT => walk_if(node, scopes, ctx, fnctx, depth),
        FOR_STATEMENT | WHILE_STATEMENT => walk_loop(node, scopes, ctx, fnctx, depth, ScopeKind::For),
        ENHANCED_FOR_STATEMENT => walk_loop(node, scopes, ctx, fnctx, depth, ScopeKind::Range),
        RETURN_STATEMENT => {
            let scope_id = scopes.current_id();
            let mut cursor = node.walk();
            for expr in node.named_children(&mut cursor) {
                let keys = resolve_expr_keys(&expr, scopes, ctx, fnctx.as_deref_mut(), depth);
                for key in keys {
                    emit_read(ctx, &key, &scope_id);
                    if let Some(fc) = fnctx.as_deref_mut() {
                        fc.returned.push(key);
                    }
                }
            }
        }
        BLOCK => walk_block(node, scopes, ctx, fnctx),
        _ => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                walk_stmt(&child, scopes, ctx, fnctx.as_deref_mut(), depth + 1);
            }
        }
    }
}

fn emit_binding(
    name_node: &Node,
    value_node: Option<&Node>,
    scopes: &mut ScopeGraph,
    ctx: &mut Ctx,
    scope_id: &str,
    mut fnctx: Option<&mut FnCtx>,
    depth: usize,
) {
    let dst_keys = resolve_expr_keys(name_node, scopes, ctx, fnctx.as_deref_mut(), depth);
    let Some(dst_key) = dst_keys.into_iter().next() else { return };
    ctx.model
        .edges
        .push(DataFlowEdge::new(dst_key.clone(), dst_key.clone(), EdgeKind::Write, scope_id));

    let Some(value) = value_node else { return };
    let source_keys = resolve_expr_keys(value, scopes, ctx, fnctx.as_deref_mut(), depth);
    for src in &source_keys {
        emit_read(ctx, src, scope_id);
        if src != &dst_key {
            ctx.model
                .edges
                .push(DataFlowEdge::new(src.clone(), dst_key.clone(), EdgeKind::Xfer, scope_id));
        }
    }
}

fn emit_read(ctx: &mut Ctx, key: &IdentKey, scope_id: &str) {
    ctx.model.edges.push(DataFlowEdge::new(key.clone(), key.clone(), EdgeKind::Read, scope_id));
}

fn resolve_expr_keys(node: &Node, scopes: &mut ScopeGraph, ctx: &mut Ctx, mut fnctx: Option<&mut FnCtx>, depth: usize) -> Vec<IdentKey> {
    if !check_recursion_depth(depth) {
        return Vec::new();
    }
    match node.kind() {
        IDENTIFIER => {
            let name = ctx.text(node).to_string();
            vec![resolve_plain(&name, node.start_byte() as u32, ctx.package, ctx.file, scopes, ctx.model)]
        }
        FIELD_ACCESS => {
            let Some(operand) = node.child_by_field_name("object") else { return Vec::new() };
            let Some(field) = node.child_by_field_name("field") else { return Vec::new() };
            let operand_name = ctx.text(&operand).to_string();
            let operand_keys = resolve_expr_keys(&operand, scopes, ctx, fnctx.as_deref_mut(), depth + 1);
            let Some(operand_key) = operand_keys.into_iter().next() else { return Vec::new() };
            let operand_type = ctx.model.idents.get(&operand_key).and_then(|i| i.ty.as_ref()).map(|t| t.to_string());
            let field_name = ctx.text(&field).to_string();
            vec![resolve_selector(
                operand_key,
                &operand_name,
                operand_type,
                &field_name,
                field.start_byte() as u32,
                ctx.package,
                ctx.file,
                ctx.model,
            )]
        }
        ARRAY_ACCESS => {
            let Some(operand) = node.child_by_field_name("array") else { return Vec::new() };
            let Some(index) = node.child_by_field_name("index") else { return Vec::new() };
            let operand_name = ctx.text(&operand).to_string();
            let operand_keys = resolve_expr_keys(&operand, scopes, ctx, fnctx.as_deref_mut(), depth + 1);
            let Some(operand_key) = operand_keys.into_iter().next() else { return Vec::new() };
            let index_text = ctx.text(&index).to_string();
            vec![synthetic_index(
                &operand_key,
                &operand_name,
                &index_text,
                node.start_byte() as u32,
                ctx.package,
                ctx.file,
                ctx.model,
            )]
        }
        OBJECT_CREATION_EXPRESSION => {
            let header = node.child_by_field_name("type").map(|t| ctx.text(&t).to_string()).unwrap_or_else(|| "new".to_string());
            vec![synthetic_literal(ctx.package, ctx.file, node.start_byte() as u32, &header, ctx.model)]
        }
        METHOD_INVOCATION => {
            let scope_id = scopes.current_id();
            handle_call(node, scopes, ctx, fnctx, depth, &scope_id)
        }
        "decimal_integer_literal" | "decimal_floating_point_literal" | "string_literal" | "true" | "false" | "null_literal" => {
            let header = literal_type_name(node.kind());
            vec![synthetic_literal(ctx.package, ctx.file, node.start_byte() as u32, header, ctx.model)]
        }
        _ => {
            let mut out = Vec::new();
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                out.extend(resolve_expr_keys(&child, scopes, ctx, fnctx.as_deref_mut(), depth + 1));
            }
            out
        }
    }
}

fn literal_type_name(kind: &str) -> &'static str {
    match kind {
        "decimal_integer_literal" => "int",
        "decimal_floating_point_literal" => "double",
        "string_literal" => "String",
        "true" | "false" => "boolean",
        _ => "literal",
    }
}

fn handle_call(
    node: &Node,
    scopes: &mut ScopeGraph,
    ctx: &mut Ctx,
    mut fnctx: Option<&mut FnCtx>,
    depth: usize,
    scope_id: &str,
) -> Vec<IdentKey> {
    ctx.register(node);
    let fn_key = if let Some(object) = node.child_by_field_name("object") {
        let Some(name_node) = node.child_by_field_name("name") else { return Vec::new() };
        let operand_keys = resolve_expr_keys(&object, scopes, ctx, fnctx.as_deref_mut(), depth + 1);
        let Some(operand_key) = operand_keys.into_iter().next() else { return Vec::new() };
        let operand_name = ctx.text(&object).to_string();
        let operand_type = ctx.model.idents.get(&operand_key).and_then(|i| i.ty.as_ref()).map(|t| t.to_string());
        let method_name = ctx.text(&name_node).to_string();
        resolve_selector(
            operand_key,
            &operand_name,
            operand_type,
            &method_name,
            name_node.start_byte() as u32,
            ctx.package,
            ctx.file,
            ctx.model,
        )
    } else {
        let Some(name_node) = node.child_by_field_name("name") else { return Vec::new() };
        let name = ctx.text(&name_node).to_string();
        resolve_plain(&name, name_node.start_byte() as u32, ctx.package, ctx.file, scopes, ctx.model)
    };
    emit_read(ctx, &fn_key, scope_id);
    ctx.model
        .edges
        .push(DataFlowEdge::new(fn_key.clone(), fn_key.clone(), EdgeKind::Call, scope_id));

    let mut arg_keys = Vec::new();
    if let Some(args) = node.child_by_field_name("arguments") {
        let mut cursor = args.walk();
        for arg in args.named_children(&mut cursor) {
            let keys = resolve_expr_keys(&arg, scopes, ctx, fnctx.as_deref_mut(), depth + 1);
            for k in &keys {
                emit_read(ctx, k, scope_id);
            }
            arg_keys.extend(keys);
        }
    }

    forwarded_call_sources(&arg_keys, &fn_key, ctx.model, ctx.interprocedural)
}

fn walk_if(node: &Node, scopes: &mut ScopeGraph, ctx: &mut Ctx, mut fnctx: Option<&mut FnCtx>, depth: usize) {
    if let Some(condition) = node.child_by_field_name("condition") {
        let outer_scope = scopes.current_id();
        let keys = resolve_expr_keys(&condition, scopes, ctx, fnctx.as_deref_mut(), depth + 1);
        for key in keys {
            emit_read(ctx, &key, &outer_scope);
        }
    }
    let start = node.start_position();
    let end = node.end_position();
    scopes.enter(ScopeKind::If, None, Point::new(start.row as u32, start.column as u32), Point::new(end.row as u32, end.column as u32));
    if let Some(consequence) = node.child_by_field_name("consequence") {
        walk_stmt(&consequence, scopes, ctx, fnctx.as_deref_mut(), depth + 1);
    }
    scopes.leave();

    if let Some(alternative) = node.child_by_field_name("alternative") {
        scopes.enter(ScopeKind::Else, None, Point::new(start.row as u32, start.column as u32), Point::new(end.row as u32, end.column as u32));
        walk_stmt(&alternative, scopes, ctx, fnctx, depth + 1);
        scopes.leave();
    }
}

fn walk_loop(node: &Node, scopes: &mut ScopeGraph, ctx: &mut Ctx, fnctx: Option<&mut FnCtx>, depth: usize, kind: ScopeKind) {
    let start = node.start_position();
    let end = node.end_position();
    scopes.enter(kind, None, Point::new(start.row as u32, start.column as u32), Point::new(end.row as u32, end.column as u32));
    if let Some(body) = node.child_by_field_name("body") {
        walk_stmt(&body, scopes, ctx, fnctx, depth + 1);
    }
    scopes.leave();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Language as Lang;

    fn analyze(source: &str) -> PackageModel {
        let extractor = JavaExtractor::new();

        let mut scratch_scopes = ScopeGraph::new();
        scratch_scopes.enter_package("pkg");
        let mut scratch_model = PackageModel::new("pkg", Lang::Java);
        extractor.analyze_file("pkg", "F.java", source, &mut scratch_scopes, &mut scratch_model, true).unwrap();

        let mut scopes = ScopeGraph::new();
        scopes.enter_package("pkg");
        let mut model = PackageModel::new("pkg", Lang::Java);
        model.func_summaries = scratch_model.func_summaries;
        extractor.analyze_file("pkg", "F.java", source, &mut scopes, &mut model, true).unwrap();
        model
    }

    #[test]
    fn field_with_annotation_emits_metadata() {
        let model = analyze("class Person {\n  @Column(name=\"id\")\n  String id;\n}\n");
        assert!(model.edges.iter().any(|e| e.kind == EdgeKind::Metadata));
    }

    #[test]
    fn local_variable_assignment_emits_write_and_xfer() {
        let model = analyze("class F {\n  void run() {\n    int x = 1;\n    int y = x;\n  }\n}\n");
        assert!(model.edges.iter().any(|e| e.kind == EdgeKind::Xfer));
    }

    #[test]
    fn method_invocation_emits_call_self_edge() {
        let model = analyze("class F {\n  void run() {\n    helper();\n  }\n  void helper() {}\n}\n");
        assert!(model.edges.iter().any(|e| e.kind == EdgeKind::Call && e.is_self_edge()));
    }
}
