//! Parameter schema derivation through the public registration API

use openai_agents_lite::{
    derive_parameters, register_tool, AgentsError, ParamDecl, SchemaKind, ToolFn, ToolOutput,
    ToolOverrides, TypeHint,
};
use serde_json::{json, Value};

fn noop(name: &str) -> ToolFn {
    ToolFn::new(name, |_| Ok(ToolOutput::Json(Value::Null)))
}

#[test]
fn test_required_and_optional_counts() {
    for (required, optional) in [(0, 0), (1, 0), (0, 2), (3, 2)] {
        let mut decls = Vec::new();
        for i in 0..required {
            let name = format!("r{i}");
            decls.push(ParamDecl::new(name, TypeHint::Integer));
        }
        for i in 0..optional {
            let name = format!("o{i}");
            let decl = ParamDecl::new(name, TypeHint::String).with_default("x");
            decls.push(decl);
        }

        let schema = derive_parameters(&decls);
        assert_eq!(schema.required.len(), required);
        assert_eq!(schema.properties.len(), required + optional);
        for param in &schema.properties {
            // Exactly one of: has a default, is required
            assert_ne!(param.default.is_some(), param.required, "{}", param.name);
        }
    }
}

#[test]
fn test_kind_mapping_is_exact() {
    let cases = [
        ("String", SchemaKind::String),
        ("i64", SchemaKind::Integer),
        ("usize", SchemaKind::Integer),
        ("f64", SchemaKind::Number),
        ("bool", SchemaKind::Boolean),
        ("Vec<i64>", SchemaKind::Array),
        ("BTreeMap<String, Value>", SchemaKind::Object),
        ("Uuid", SchemaKind::String),
        ("", SchemaKind::String),
    ];
    for (text, kind) in cases {
        let schema = derive_parameters(&[ParamDecl::new("p", TypeHint::from_rust(text))]);
        assert_eq!(schema.properties[0].kind(), kind, "{text}");
    }

    let untyped = derive_parameters(&[ParamDecl::untyped("p")]);
    assert_eq!(untyped.properties[0].kind(), SchemaKind::String);
}

#[test]
fn test_nested_sequences_keep_items() {
    let schema = derive_parameters(&[
        ParamDecl::new("grid", TypeHint::from_rust("Vec<Vec<f32>>")),
        ParamDecl::new("bag", TypeHint::Sequence(None)),
    ]);
    assert_eq!(
        schema.to_json(),
        json!({
            "type": "object",
            "properties": {
                "grid": {"type": "array", "items": {"type": "array", "items": {"type": "number"}}},
                "bag": {"type": "array", "items": {"type": "string"}},
            },
            "required": ["grid", "bag"],
        })
    );
}

#[test]
fn test_receiver_is_skipped() {
    let tool = noop("method")
        .param(ParamDecl::receiver())
        .param(ParamDecl::new("x", TypeHint::Integer));
    let handle = register_tool(&tool, ToolOverrides::default()).unwrap();
    assert_eq!(handle.spec().parameters.required, vec!["x".to_string()]);
    assert_eq!(handle.spec().parameters.properties.len(), 1);
}

#[test]
fn test_zero_parameter_tool_has_valid_schema() {
    let tool = noop("ping");
    let handle = register_tool(&tool, ToolOverrides::default()).unwrap();
    assert_eq!(
        handle.spec().parameters.to_json(),
        json!({"type": "object", "properties": {}, "required": []})
    );
}

#[test]
fn test_registering_twice_is_identical() {
    let tool = noop("lookup")
        .doc("Look something up.")
        .param(ParamDecl::new("query", TypeHint::String))
        .param(ParamDecl::new("limit", TypeHint::Integer).with_default(5));
    let a = register_tool(&tool, ToolOverrides::default()).unwrap();
    let b = register_tool(&tool, ToolOverrides::default()).unwrap();
    assert_eq!(
        serde_json::to_string(&a.spec().to_json()).unwrap(),
        serde_json::to_string(&b.spec().to_json()).unwrap()
    );
}

#[test]
fn test_catch_all_is_rejected_at_registration() {
    let tool = noop("fmt")
        .param(ParamDecl::new("template", TypeHint::String))
        .param(ParamDecl::keyword_catch_all("values"));
    let err = register_tool(&tool, ToolOverrides::default()).unwrap_err();
    assert!(matches!(err, AgentsError::ToolRegistrationError { .. }));
}
