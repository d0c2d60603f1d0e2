//! End-to-end scenarios driving the real Go/Java tree-sitter grammars on
//! literal snippet strings through the public `Analyzer` API, asserting
//! the expected edge multisets.

use flowlens::config::Settings;
use flowlens::flow::EdgeKind;
use flowlens::indexing::Analyzer;
use flowlens::types::Language;

fn analyze(source: &str, language: Language) -> flowlens::PackageModel {
    let analyzer = Analyzer::new(Settings::default());
    analyzer
        .analyze_source_code("pkg", if language == Language::Go { "f.go" } else { "F.java" }, source, language)
        .expect("analysis should succeed")
}

#[test]
fn channel_send_transfers_the_sent_value_into_the_channel() {
    let model = analyze(
        "package p\nfunc F() {\n\tch := make(chan int)\n\tch <- 42\n}\n",
        Language::Go,
    );

    let ch_key = model
        .idents
        .values()
        .find(|i| i.name.as_ref() == "ch")
        .map(|i| i.id.clone())
        .expect("ch should be resolved");

    let found = model.edges.iter().any(|e| {
        e.kind == EdgeKind::Xfer
            && e.dst == ch_key
            && model
                .idents
                .get(&e.src)
                .map(|src| src.kind.as_deref() == Some("literal") && src.name.as_ref() == "int")
                .unwrap_or(false)
    });
    assert!(found, "expected XFER(literal(int) -> ch); edges: {:?}", model.edges);
}

#[test]
fn composite_literal_init_transfers_without_self_loop() {
    let model = analyze(
        "package p\ntype Person struct{ Name string\n\tAge int }\nfunc F() {\n\tp := Person{Name: \"n\", Age: 1}\n\t_ = p\n}\n",
        Language::Go,
    );

    let p_key = model
        .idents
        .values()
        .find(|i| i.name.as_ref() == "p")
        .map(|i| i.id.clone())
        .expect("p should be resolved");

    let found = model.edges.iter().any(|e| {
        e.kind == EdgeKind::Xfer
            && e.dst == p_key
            && model
                .idents
                .get(&e.src)
                .map(|src| src.kind.as_deref() == Some("literal") && src.name.as_ref() == "Person")
                .unwrap_or(false)
    });
    assert!(found, "expected XFER(synthetic(Person) -> p); edges: {:?}", model.edges);
    assert!(
        !model.edges.iter().any(|e| e.kind == EdgeKind::Xfer && e.src == p_key && e.dst == p_key),
        "p must never XFER-self-loop"
    );
}

#[test]
fn selector_write_under_conditional_emits_scoped_reads_and_a_field_transfer() {
    let model = analyze(
        "package p\ntype Person struct{ Score int\n\tName string }\nfunc F(p Person, b Person) {\n\tif p.Score > 18 {\n\t\tp.Name = \"A:\" + b.Name\n\t}\n}\n",
        Language::Go,
    );

    let p_score = model.idents.values().find(|i| i.name.as_ref() == "p.Score").expect("p.Score resolved");
    let p_name = model.idents.values().find(|i| i.name.as_ref() == "p.Name").expect("p.Name resolved");
    let b_name = model.idents.values().find(|i| i.name.as_ref() == "b.Name").expect("b.Name resolved");

    let func_scope = model
        .scopes
        .iter()
        .find(|s| s.kind == flowlens::scope::ScopeKind::Function)
        .map(|s| s.id.clone())
        .expect("function scope recorded");
    let if_scope = model
        .scopes
        .iter()
        .find(|s| s.kind == flowlens::scope::ScopeKind::If)
        .map(|s| s.id.clone())
        .expect("if scope recorded");

    assert!(model.edges.iter().any(|e| e.kind == EdgeKind::Read && e.src == p_score.id && e.scope == func_scope));
    assert!(model.edges.iter().any(|e| e.kind == EdgeKind::Read && e.src == b_name.id && e.scope == if_scope));
    assert!(model.edges.iter().any(|e| e.kind == EdgeKind::Write && e.src == p_name.id && e.scope == if_scope));
    assert!(model.edges.iter().any(|e| e.kind == EdgeKind::Xfer
        && e.src == b_name.id
        && e.dst == p_name.id
        && e.scope == if_scope));
}

#[test]
fn interprocedural_identity_forwarding_transfers_the_argument_into_the_result() {
    let model = analyze(
        "package p\nfunc id(x int) int {\n\treturn x\n}\nfunc F() {\n\tz := 1\n\ty := id(z)\n\t_ = y\n}\n",
        Language::Go,
    );

    let id_key = model.idents.values().find(|i| i.name.as_ref() == "id").expect("id resolved").id.clone();
    assert!(model.edges.iter().any(|e| e.kind == EdgeKind::Call && e.src == id_key && e.dst == id_key));

    let z_key = model.idents.values().find(|i| i.name.as_ref() == "z").expect("z resolved").id.clone();
    let y_key = model.idents.values().find(|i| i.name.as_ref() == "y").expect("y resolved").id.clone();
    assert!(model.edges.iter().any(|e| e.kind == EdgeKind::Xfer && e.src == z_key && e.dst == y_key));
}

#[test]
fn interprocedural_forwarding_only_follows_arguments_the_callee_actually_returns() {
    let model = analyze(
        "package p\nfunc first(a int, b int) int {\n\treturn a\n}\nfunc F() {\n\tp := 1\n\tq := 2\n\ty := first(p, q)\n\t_ = y\n}\n",
        Language::Go,
    );

    let p_key = model.idents.values().find(|i| i.name.as_ref() == "p").expect("p resolved").id.clone();
    let q_key = model.idents.values().find(|i| i.name.as_ref() == "q").expect("q resolved").id.clone();
    let y_key = model.idents.values().find(|i| i.name.as_ref() == "y").expect("y resolved").id.clone();

    assert!(
        model.edges.iter().any(|e| e.kind == EdgeKind::Xfer && e.src == p_key && e.dst == y_key),
        "p reaches the return and must XFER into y; edges: {:?}",
        model.edges
    );
    assert!(
        !model.edges.iter().any(|e| e.kind == EdgeKind::Xfer && e.src == q_key && e.dst == y_key),
        "q never reaches the return and must not XFER into y; edges: {:?}",
        model.edges
    );
}

#[test]
fn interprocedural_forwarding_disabled_by_setting_emits_no_call_xfer() {
    let mut settings = Settings::default();
    settings.analysis.interprocedural = false;
    let analyzer = Analyzer::new(settings);
    let model = analyzer
        .analyze_source_code(
            "pkg",
            "f.go",
            "package p\nfunc id(x int) int {\n\treturn x\n}\nfunc F() {\n\tz := 1\n\ty := id(z)\n\t_ = y\n}\n",
            Language::Go,
        )
        .expect("analysis should succeed");

    let z_key = model.idents.values().find(|i| i.name.as_ref() == "z").expect("z resolved").id.clone();
    let y_key = model.idents.values().find(|i| i.name.as_ref() == "y").expect("y resolved").id.clone();
    assert!(
        !model.edges.iter().any(|e| e.kind == EdgeKind::Xfer && e.src == z_key && e.dst == y_key),
        "interprocedural analysis is disabled, so no call-site XFER should be emitted; edges: {:?}",
        model.edges
    );
}

#[test]
fn concurrent_call_marks_the_goroutine_scope_and_reads_its_argument() {
    let model = analyze(
        "package p\nfunc worker(v int) {}\nfunc F() {\n\tv := 1\n\tgo worker(v)\n}\n",
        Language::Go,
    );

    let worker_key = model.idents.values().find(|i| i.name.as_ref() == "worker").expect("worker resolved").id.clone();
    assert!(model
        .edges
        .iter()
        .any(|e| e.kind == EdgeKind::Call && e.src == worker_key && e.dst == worker_key && e.scope.ends_with("#go")));

    let v_key = model.idents.values().find(|i| i.name.as_ref() == "v").expect("v resolved").id.clone();
    assert!(model.edges.iter().any(|e| e.kind == EdgeKind::Read && e.src == v_key));
}

#[test]
fn go_struct_tag_emits_metadata_self_edges() {
    let model = analyze(
        "package p\ntype Person struct{\n\tID string `json:\"id\" db:\"user_id\"`\n}\n",
        Language::Go,
    );

    let field = model.idents.values().find(|i| i.name.as_ref() == "ID").expect("ID field resolved");
    assert!(model.edges.iter().any(|e| {
        e.kind == EdgeKind::Metadata
            && e.is_self_edge()
            && e.src == field.id
            && e.attributes.get("annotationKey").map(String::as_str) == Some("json")
            && e.attributes.get("annotationValue").map(String::as_str) == Some("\"id\"")
    }));
    assert!(model.edges.iter().any(|e| {
        e.kind == EdgeKind::Metadata
            && e.attributes.get("annotationKey").map(String::as_str) == Some("db")
            && e.attributes.get("annotationValue").map(String::as_str) == Some("\"user_id\"")
    }));
}

#[test]
fn java_annotation_emits_metadata_self_edge() {
    let model = analyze(
        "class Person {\n  @Column(name=\"id\")\n  String id;\n}\n",
        Language::Java,
    );

    let field = model.idents.values().find(|i| i.name.as_ref() == "id").expect("id field resolved");
    assert!(model.edges.iter().any(|e| {
        e.kind == EdgeKind::Metadata
            && e.is_self_edge()
            && e.src == field.id
            && e.attributes.get("annotationKey").map(String::as_str) == Some("Column.name")
            && e.attributes.get("annotationValue").map(String::as_str) == Some("\"id\"")
    }));
}
