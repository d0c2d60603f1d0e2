//! Tree-sitter-go-driven implementation of [`LanguageExtractor`].
//!
//! Node-kind constants and the `register`/`text_for_node` helper style
//! follow the teacher's per-language parser modules
//! (`bartolli-codanna/src/parsing/java/parser.rs`,
//! `bartolli-codanna/src/parsing/kotlin/parser.rs`).

use crate::annotate::parse_go_struct_tag;
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

const FUNCTION_DECLARATION: &str = "function_declaration";
const METHOD_DECLARATION: &str = "method_declaration";
const SHORT_VAR_DECLARATION: &str = "short_var_declaration";
const VAR_DECLARATION: &str = "var_declaration";
const VAR_SPEC: &str = "var_spec";
const CONST_DECLARATION: &str = "const_declaration";
const ASSIGNMENT_STATEMENT: &str = "assignment_statement";
const SELECTOR_EXPRESSION: &str = "selector_expression";
const CALL_EXPRESSION: &str = "call_expression";
const GO_STATEMENT: &str = "go_statement";
const SEND_STATEMENT: &str = "send_statement";
const UNARY_EXPRESSION: &str = "unary_expression";
const SELECT_STATEMENT: &str = "select_statement";
const COMMUNICATION_CASE: &str = "communication_case";
const IF_STATEMENT: &str = "if_statement";
const FOR_STATEMENT: &str = "for_statement";
const RANGE_CLAUSE: &str = "range_clause";
const RETURN_STATEMENT: &str = "return_statement";
const COMPOSITE_LITERAL: &str = "composite_literal";
const INDEX_EXPRESSION: &str = "index_expression";
const FIELD_DECLARATION: &str = "field_declaration";
const STRUCT_TYPE: &str = "struct_type";
const TYPE_DECLARATION: &str = "type_declaration";
const TYPE_SPEC: &str = "type_spec";
const IDENTIFIER: &str = "identifier";
const FIELD_IDENTIFIER: &str = "field_identifier";
const RAW_STRING_LITERAL: &str = "raw_string_literal";
const PARAMETER_DECLARATION: &str = "parameter_declaration";
const BLOCK: &str = "block";

#[derive(Default)]
pub struct GoExtractor;

impl GoExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageExtractor for GoExtractor {
    fn matches(&self, path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some("go")
    }

    fn language(&self) -> Language {
        Language::Go
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
            .set_language(&tree_sitter_go::LANGUAGE.into())
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
            let root = tree.root_node();
            let mut cursor = root.walk();
            for child in root.children(&mut cursor) {
                walk_top_level(&child, scopes, &mut ctx);
            }
        }
        scopes.leave();
        tracing::debug!(file, handled_kinds = tracker.handled_nodes().len(), "go file walked");
        Ok(())
    }
}

fn parse_err(file: &str, reason: String) -> AnalysisError {
    AnalysisError::Parse {
        path: PathBuf::from(file),
        language: "go".to_string(),
        reason,
    }
}

/// Per-file traversal state that does not need to move with the scope
/// stack (package/file names, the source text, the package model, and
/// node-kind coverage tracking).
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

/// Accumulates per-function state needed to derive a `FuncSummary` after
/// the body walk completes (spec §4.3's two-phase per-function pass).
struct FnCtx {
    scope_id: String,
    summary: FuncSummary,
    param_names: Vec<String>,
    returned: Vec<IdentKey>,
}

fn walk_top_level(node: &Node, scopes: &mut ScopeGraph, ctx: &mut Ctx) {
    match node.kind() {
        FUNCTION_DECLARATION => walk_function(node, scopes, ctx, ScopeKind::Function, None),
        METHOD_DECLARATION => {
            let receiver_type = node
                .child_by_field_name("receiver")
                .and_then(|r| r.named_child(0))
                .and_then(|p| p.child_by_field_name("type"))
                .map(|t| ctx.text(&t).trim_start_matches('*').to_string());
            walk_function(node, scopes, ctx, ScopeKind::Method, receiver_type);
        }
        VAR_DECLARATION | CONST_DECLARATION => walk_package_level_decl(node, scopes, ctx),
        TYPE_DECLARATION => walk_type_declaration(node, ctx),
        _ => {}
    }
}

fn walk_type_declaration(node: &Node, ctx: &mut Ctx) {
    let mut cursor = node.walk();
    for spec in node.children(&mut cursor) {
        if spec.kind() != TYPE_SPEC {
            continue;
        }
        let Some(name_node) = spec.child_by_field_name("name") else { continue };
        let type_name = ctx.text(&name_node).to_string();
        let Some(type_node) = spec.child_by_field_name("type") else { continue };
        if type_node.kind() == STRUCT_TYPE {
            walk_struct_fields(&type_node, &type_name, ctx);
        }
    }
}

fn walk_struct_fields(struct_type: &Node, type_name: &str, ctx: &mut Ctx) {
    let Some(field_list) = struct_type.named_child(0) else { return };
    let mut cursor = field_list.walk();
    for field in field_list.children(&mut cursor) {
        if field.kind() != FIELD_DECLARATION {
            continue;
        }
        ctx.register(&field);
        let Some(field_type_node) = field.child_by_field_name("type") else { continue };
        let field_type = ctx.text(&field_type_node).to_string();

        let mut name_cursor = field.walk();
        let names: Vec<Node> = field
            .children(&mut name_cursor)
            .filter(|c| c.kind() == FIELD_IDENTIFIER || c.kind() == IDENTIFIER)
            .collect();
        let tag = field
            .children(&mut field.walk())
            .find(|c| c.kind() == RAW_STRING_LITERAL)
            .map(|t| ctx.text(&t).to_string());

        for name_node in names {
            let field_name = ctx.text(&name_node).to_string();
            ctx.model.declare_field(type_name, &field_name, &field_type);

            if let Some(tag_text) = &tag {
                let key = IdentKey::syntactic(ctx.package, ctx.file, name_node.start_byte() as u32);
                ctx.model.idents.get_or_insert(key.clone(), || {
                    Identifier::new(key.clone(), field_name.clone(), ctx.package, ctx.file, name_node.start_byte() as u32)
                        .with_kind("field")
                });
                let pairs = parse_go_struct_tag(tag_text);
                attach_annotations(&key, pairs, type_name, ctx.model);
            }
        }
    }
}

fn walk_package_level_decl(node: &Node, scopes: &mut ScopeGraph, ctx: &mut Ctx) {
    let mut cursor = node.walk();
    for spec in node.children(&mut cursor) {
        if spec.kind() != VAR_SPEC {
            continue;
        }
        emit_var_spec(&spec, scopes, ctx, None);
    }
}

fn emit_var_spec(spec: &Node, scopes: &mut ScopeGraph, ctx: &mut Ctx, fnctx: Option<&mut FnCtx>) {
    let scope_id = scopes.current_id();
    let names = field_children(spec, "name");
    let values = field_children(spec, "value");
    emit_bindings(&names, &values, scopes, ctx, &scope_id, fnctx, 0);
}

/// Returns every child of `node` registered under field name `field`
/// (tree-sitter repeats a field name for each element of a list field).
fn field_children<'t>(node: &Node<'t>, field: &str) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    let mut index = 0u32;
    for child in node.children(&mut cursor) {
        if node.field_name_for_child(index) == Some(field) {
            out.push(child);
        }
        index += 1;
    }
    out
}

fn walk_function(node: &Node, scopes: &mut ScopeGraph, ctx: &mut Ctx, kind: ScopeKind, receiver_type: Option<String>) {
    ctx.register(node);
    let Some(name_node) = node.child_by_field_name("name") else { return };
    let func_name = ctx.text(&name_node).to_string();
    let func_key = resolve_plain(&func_name, name_node.start_byte() as u32, ctx.package, ctx.file, scopes, ctx.model);
    ctx.model.idents.get_mut(&func_key).unwrap().kind = Some(
        match kind {
            ScopeKind::Method => "method",
            _ => "function",
        }
        .into(),
    );

    let start = node.start_position();
    let end = node.end_position();
    scopes.enter(
        kind,
        Some(&func_name),
        Point::new(start.row as u32, start.column as u32),
        Point::new(end.row as u32, end.column as u32),
    );
    let scope_id = scopes.current_id();

    let mut param_keys = Vec::new();
    let mut param_names = Vec::new();
    let mut param_types = Vec::new();
    if let Some(receiver) = node.child_by_field_name("receiver") {
        collect_params(&receiver, scopes, ctx, &mut param_keys, &mut param_names, &mut param_types);
    }
    if let Some(params) = node.child_by_field_name("parameters") {
        collect_params(&params, scopes, ctx, &mut param_keys, &mut param_names, &mut param_types);
    }
    let _ = receiver_type;

    let mut fnctx = FnCtx {
        scope_id: scope_id.clone(),
        summary: FuncSummary::new(param_keys, Vec::new()),
        param_names,
        returned: Vec::new(),
    };

    if let Some(body) = node.child_by_field_name("body") {
        walk_block(&body, scopes, ctx, Some(&mut fnctx), 0);
    }

    fnctx.summary.returns = fnctx.returned.clone();
    trace_param_return_flows(ctx.model, &mut fnctx.summary, &fnctx.scope_id);
    tracing::debug!(
        func = func_name,
        identity = fnctx.summary.is_identity_signature(
            param_types.first().map(|s| s.as_str()),
            fnctx.summary.returns.first().and_then(|r| ctx.model.idents.get(r)).and_then(|i| i.ty.as_deref()),
        ),
        "function summary traced"
    );
    ctx.model.func_summaries.insert(func_key.clone(), fnctx.summary.clone());

    scopes.leave();
}

fn collect_params(
    list: &Node,
    scopes: &mut ScopeGraph,
    ctx: &mut Ctx,
    keys: &mut Vec<IdentKey>,
    names: &mut Vec<String>,
    types: &mut Vec<String>,
) {
    let mut cursor = list.walk();
    for param in list.named_children(&mut cursor) {
        if param.kind() != PARAMETER_DECLARATION {
            continue;
        }
        let ty = param.child_by_field_name("type").map(|t| ctx.text(&t).to_string()).unwrap_or_default();
        let name_fields = field_children(&param, "name");
        for name_node in name_fields {
            let name = ctx.text(&name_node).to_string();
            let key = resolve_plain(&name, name_node.start_byte() as u32, ctx.package, ctx.file, scopes, ctx.model);
            ctx.model.idents.get_mut(&key).unwrap().kind = Some("parameter".into());
            ctx.model.idents.get_mut(&key).unwrap().ty = Some(ty.as_str().into());
            keys.push(key);
            names.push(name);
            types.push(ty.clone());
        }
    }
}

/// Traces READ/XFER edges recorded during the body walk (scoped to this
/// function only) from each parameter to each returned identifier via BFS
/// over an undirected adjacency built from those edges, and records every
/// reachable pair in the `FuncSummary`'s `flows` map (spec §4.3's
/// two-phase per-function pass).
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

fn walk_block(node: &Node, scopes: &mut ScopeGraph, ctx: &mut Ctx, mut fnctx: Option<&mut FnCtx>, depth: usize) {
    if !check_recursion_depth(depth) {
        return;
    }
    let mut cursor = node.walk();
    for stmt in node.named_children(&mut cursor) {
        walk_stmt(&stmt, scopes, ctx, fnctx.as_deref_mut(), depth + 1);
    }
}

fn walk_stmt(node: &Node, scopes: &mut ScopeGraph, ctx: &mut Ctx, mut fnctx: Option<&mut FnCtx>, depth: usize) {
    if !check_recursion_depth(depth) {
        return;
    }
    ctx.register(node);
    match node.kind() {
        SHORT_VAR_DECLARATION => {
            let scope_id = scopes.current_id();
            let names = field_children(node, "left");
            let values = field_children(node, "right");
            emit_bindings(&names, &values, scopes, ctx, &scope_id, fnctx.as_deref_mut(), depth);
        }
        VAR_DECLARATION | CONST_DECLARATION => {
            let mut cursor = node.walk();
            for spec in node.children(&mut cursor) {
                if spec.kind() == VAR_SPEC {
                    emit_var_spec(&spec, scopes, ctx, fnctx.as_deref_mut());
                }
            }
        }
        ASSIGNMENT_STATEMENT => {
            let scope_id = scopes.current_id();
            let op = node.child_by_field_name("operator").map(|n| ctx.text(&n)).unwrap_or("=");
            let names = field_children(node, "left");
            let values = field_children(node, "right");
            if op != "=" {
                for name in &names {
                    if let Some(key) = resolve_expr_keys(name, scopes, ctx, fnctx.as_deref_mut(), depth).into_iter().next() {
                        emit_read(ctx, &key, &scope_id);
                    }
                }
            }
            emit_bindings(&names, &values, scopes, ctx, &scope_id, fnctx.as_deref_mut(), depth);
        }
        GO_STATEMENT => {
            let scope_id = scopes.current_id();
            if let Some(call) = node.named_child(0) {
                if call.kind() == CALL_EXPRESSION {
                    handle_call(&call, scopes, ctx, fnctx.as_deref_mut(), depth, &scope_id, true);
                }
            }
        }
        SEND_STATEMENT => {
            let scope_id = scopes.current_id();
            let Some(channel) = node.child_by_field_name("channel") else { return };
            let Some(value) = node.child_by_field_name("value") else { return };
            let ch_keys = resolve_expr_keys(&channel, scopes, ctx, fnctx.as_deref_mut(), depth);
            let val_keys = resolve_expr_keys(&value, scopes, ctx, fnctx.as_deref_mut(), depth);
            for v in &val_keys {
                emit_read(ctx, v, &scope_id);
            }
            if let Some(ch) = ch_keys.first() {
                for v in &val_keys {
                    ctx.model.edges.push(DataFlowEdge::new(v.clone(), ch.clone(), EdgeKind::Xfer, scope_id.clone()));
                }
            }
        }
        SELECT_STATEMENT => walk_select(node, scopes, ctx, fnctx, depth),
        IF_STATEMENT => walk_if(node, scopes, ctx, fnctx, depth),
        FOR_STATEMENT => walk_for(node, scopes, ctx, fnctx, depth),
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
        CALL_EXPRESSION => {
            let scope_id = scopes.current_id();
            handle_call(node, scopes, ctx, fnctx.as_deref_mut(), depth, &scope_id, false);
        }
        BLOCK => walk_block(node, scopes, ctx, fnctx, depth),
        _ => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                walk_stmt(&child, scopes, ctx, fnctx.as_deref_mut(), depth + 1);
            }
        }
    }
}

fn emit_bindings(
    names: &[Node],
    values: &[Node],
    scopes: &mut ScopeGraph,
    ctx: &mut Ctx,
    scope_id: &str,
    mut fnctx: Option<&mut FnCtx>,
    depth: usize,
) {
    for (i, name) in names.iter().enumerate() {
        let dst_key = if name.kind() == IDENTIFIER {
            let dst_name = ctx.text(name).to_string();
            if dst_name == "_" {
                continue;
            }
            resolve_plain(&dst_name, name.start_byte() as u32, ctx.package, ctx.file, scopes, ctx.model)
        } else {
            // Selector/index assignment target (`p.Name = ...`, `arr[i] =
            // ...`): resolve it the same way a read would, so field and
            // element writes land on the same identifier a later read of
            // that target resolves to.
            let Some(key) = resolve_expr_keys(name, scopes, ctx, fnctx.as_deref_mut(), depth).into_iter().next() else {
                continue;
            };
            key
        };
        ctx.model.edges.push(DataFlowEdge::new(dst_key.clone(), dst_key.clone(), EdgeKind::Write, scope_id));

        let Some(value) = values.get(i).or_else(|| values.first().filter(|_| values.len() == 1 && names.len() > 1)) else {
            continue;
        };
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
}

fn emit_read(ctx: &mut Ctx, key: &IdentKey, scope_id: &str) {
    ctx.model.edges.push(DataFlowEdge::new(key.clone(), key.clone(), EdgeKind::Read, scope_id));
}

/// Resolves an expression to the identifier key(s) that represent it as a
/// data *source*: a plain reference resolves to itself; a selector
/// resolves to the field identifier; composite literals and basic
/// literals resolve to a synthetic identifier (spec §4.2) so a literal
/// initializer never self-loops onto its destination; calls resolve to
/// their argument and function identifiers.
fn resolve_expr_keys(node: &Node, scopes: &mut ScopeGraph, ctx: &mut Ctx, mut fnctx: Option<&mut FnCtx>, depth: usize) -> Vec<IdentKey> {
    if !check_recursion_depth(depth) {
        return Vec::new();
    }
    match node.kind() {
        IDENTIFIER => {
            let name = ctx.text(node).to_string();
            vec![resolve_plain(&name, node.start_byte() as u32, ctx.package, ctx.file, scopes, ctx.model)]
        }
        SELECTOR_EXPRESSION => {
            let Some(operand) = node.child_by_field_name("operand") else { return Vec::new() };
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
        UNARY_EXPRESSION => {
            let Some(operand) = node.child_by_field_name("operand") else { return Vec::new() };
            resolve_expr_keys(&operand, scopes, ctx, fnctx, depth + 1)
        }
        INDEX_EXPRESSION => {
            let Some(operand) = node.child_by_field_name("operand") else { return Vec::new() };
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
        COMPOSITE_LITERAL => {
            let header = node.child_by_field_name("type").map(|t| ctx.text(&t).to_string()).unwrap_or_else(|| "literal".to_string());
            vec![synthetic_literal(ctx.package, ctx.file, node.start_byte() as u32, &header, ctx.model)]
        }
        CALL_EXPRESSION => {
            let scope_id = scopes.current_id();
            handle_call(node, scopes, ctx, fnctx, depth, &scope_id, false)
        }
        "int_literal" | "float_literal" | "string_literal" | "interpreted_string_literal" | "raw_string_literal" | "true" | "false" | "nil" => {
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
        "int_literal" => "int",
        "float_literal" => "float64",
        "string_literal" | "interpreted_string_literal" | "raw_string_literal" => "string",
        "true" | "false" => "bool",
        _ => "literal",
    }
}

/// Handles a call expression: READ on every argument and on the callee
/// identifier, a CALL self-edge, and — when the callee has a known
/// `FuncSummary` and interprocedural analysis is enabled — returns the
/// argument keys so the caller (a declaration/assignment) can thread the
/// forwarded XFER edges. Returns the set of identifier keys that stand
/// in for this call's result when it appears as a nested source
/// expression (its argument identifiers, matching the generic "source
/// identifiers of E" rule).
fn handle_call(
    node: &Node,
    scopes: &mut ScopeGraph,
    ctx: &mut Ctx,
    mut fnctx: Option<&mut FnCtx>,
    depth: usize,
    scope_id: &str,
    is_goroutine: bool,
) -> Vec<IdentKey> {
    ctx.register(node);
    let Some(function) = node.child_by_field_name("function") else { return Vec::new() };
    let fn_keys = resolve_expr_keys(&function, scopes, ctx, fnctx.as_deref_mut(), depth + 1);
    let Some(fn_key) = fn_keys.into_iter().next() else { return Vec::new() };
    emit_read(ctx, &fn_key, scope_id);

    let call_scope = if is_goroutine { format!("{scope_id}#go") } else { scope_id.to_string() };
    ctx.model
        .edges
        .push(DataFlowEdge::new(fn_key.clone(), fn_key.clone(), EdgeKind::Call, call_scope));

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

fn walk_select(node: &Node, scopes: &mut ScopeGraph, ctx: &mut Ctx, mut fnctx: Option<&mut FnCtx>, depth: usize) {
    let mut cursor = node.walk();
    for case in node.named_children(&mut cursor) {
        if case.kind() != COMMUNICATION_CASE {
            continue;
        }
        let mut case_cursor = case.walk();
        for child in case.named_children(&mut case_cursor) {
            walk_stmt(&child, scopes, ctx, fnctx.as_deref_mut(), depth + 1);
        }
    }
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
        walk_block(&consequence, scopes, ctx, fnctx.as_deref_mut(), depth + 1);
    }
    scopes.leave();

    if let Some(alternative) = node.child_by_field_name("alternative") {
        scopes.enter(ScopeKind::Else, None, Point::new(start.row as u32, start.column as u32), Point::new(end.row as u32, end.column as u32));
        if alternative.kind() == IF_STATEMENT {
            walk_if(&alternative, scopes, ctx, fnctx, depth + 1);
        } else {
            walk_block(&alternative, scopes, ctx, fnctx, depth + 1);
        }
        scopes.leave();
    }
}

fn walk_for(node: &Node, scopes: &mut ScopeGraph, ctx: &mut Ctx, mut fnctx: Option<&mut FnCtx>, depth: usize) {
    let start = node.start_position();
    let end = node.end_position();
    let is_range = node.named_child(0).map(|c| c.kind() == RANGE_CLAUSE).unwrap_or(false);
    let kind = if is_range { ScopeKind::Range } else { ScopeKind::For };
    scopes.enter(kind, None, Point::new(start.row as u32, start.column as u32), Point::new(end.row as u32, end.column as u32));
    let scope_id = scopes.current_id();

    if is_range {
        if let Some(range_clause) = node.named_child(0) {
            let names = field_children(&range_clause, "left");
            for name in &names {
                if name.kind() != IDENTIFIER {
                    continue;
                }
                let text = ctx.text(name).to_string();
                if text == "_" {
                    continue;
                }
                let key = resolve_plain(&text, name.start_byte() as u32, ctx.package, ctx.file, scopes, ctx.model);
                ctx.model
                    .edges
                    .push(DataFlowEdge::new(key.clone(), key, EdgeKind::Write, scope_id.clone()));
            }
        }
    }

    if let Some(body) = node.child_by_field_name("body") {
        walk_block(&body, scopes, ctx, fnctx, depth + 1);
    }
    scopes.leave();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Language as Lang;

    fn analyze(source: &str) -> PackageModel {
        let extractor = GoExtractor::new();

        let mut scratch_scopes = ScopeGraph::new();
        scratch_scopes.enter_package("pkg");
        let mut scratch_model = PackageModel::new("pkg", Lang::Go);
        extractor.analyze_file("pkg", "f.go", source, &mut scratch_scopes, &mut scratch_model, true).unwrap();

        let mut scopes = ScopeGraph::new();
        scopes.enter_package("pkg");
        let mut model = PackageModel::new("pkg", Lang::Go);
        model.func_summaries = scratch_model.func_summaries;
        extractor.analyze_file("pkg", "f.go", source, &mut scopes, &mut model, true).unwrap();
        model
    }

    #[test]
    fn short_var_declaration_emits_write_and_xfer() {
        let model = analyze("package p\nfunc F() {\n\tx := 1\n\t_ = x\n}\n");
        assert!(model.edges.iter().any(|e| e.kind == EdgeKind::Write));
    }

    #[test]
    fn composite_literal_does_not_self_loop() {
        let model = analyze("package p\ntype Person struct{ Name string }\nfunc F() {\n\tp := Person{Name: \"n\"}\n\t_ = p\n}\n");
        assert!(!model.edges.iter().any(|e| e.is_self_edge() && e.kind == EdgeKind::Xfer));
    }

    #[test]
    fn goroutine_call_marks_scope_with_go_suffix() {
        let model = analyze("package p\nfunc worker(v int) {}\nfunc F() {\n\tv := 1\n\tgo worker(v)\n}\n");
        assert!(model.edges.iter().any(|e| e.kind == EdgeKind::Call && e.scope.ends_with("#go")));
    }

    #[test]
    fn struct_tag_produces_metadata_edge() {
        let model = analyze("package p\ntype Person struct{\n\tID string `json:\"id\"`\n}\n");
        assert!(model.edges.iter().any(|e| e.kind == EdgeKind::Metadata));
    }
}
