#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use common::{load, load_clean, router};
use http::Method;
use httpbind::codegen::{generate, CodegenOptions, GeneratedFile};
use httpbind::openapi::{generate_documents, DocumentFormat, DocumentVersion};
use httpbind::router::{MountTable, MountTarget};

const ITEMS: &str = r#"
api: { name: shop }
services:
  - name: items
    http:
      path: /items
      files:
        - { path: "/assets/{*rest}", source: ./public }
    methods:
      - name: show
        payload:
          fields:
            - { name: id, type: int, required: true }
            - { name: verbose, type: boolean }
        result: { type: string }
        errors:
          - { name: not_found, type: string }
        http:
          routes: ["GET /{id}", "GET /by-id/{id}"]
          errors:
            - { name: not_found, status: 404 }
      - name: list
        result: { type: "array<string>" }
        http:
          routes: ["GET /"]
  - name: health
    methods:
      - name: ping
        http:
          routes: ["GET /ping"]
"#;

fn file<'a>(files: &'a [GeneratedFile], path: &str) -> &'a str {
    files
        .iter()
        .find(|f| f.path.to_string_lossy() == path)
        .map(|f| f.contents.as_str())
        .unwrap_or_else(|| panic!("{path} was not generated"))
}

fn options() -> CodegenOptions {
    CodegenOptions {
        module_dir: String::new(),
        ..CodegenOptions::default()
    }
}

#[test]
fn test_modules_per_service() {
    let (model, res) = load_clean(ITEMS);
    let files = generate(&model, &res, &options()).unwrap();
    let root = file(&files, "mod.rs");
    assert!(root.contains("pub mod items;"));
    assert!(root.contains("pub mod health;"));
    for name in ["types.rs", "paths.rs", "server.rs", "client.rs", "mod.rs"] {
        file(&files, &format!("items/{name}"));
    }
}

#[test]
fn test_generated_functions_follow_naming() {
    let (model, res) = load_clean(ITEMS);
    let files = generate(&model, &res, &options()).unwrap();

    let paths = file(&files, "items/paths.rs");
    assert!(paths.contains("pub fn show_items_path("));
    assert!(paths.contains("pub fn show_items_path2("));
    assert!(paths.contains("pub fn list_items_path("));

    let server = file(&files, "items/server.rs");
    assert!(server.contains("pub trait ItemsService"));
    assert!(server.contains("pub fn decode_show_request("));
    assert!(server.contains("pub fn encode_show_response("));
    assert!(server.contains("pub fn encode_show_error("));
    assert!(server.contains("pub fn handle<"));
    assert!(server.contains("pub fn mounts()"));

    let client = file(&files, "items/client.rs");
    assert!(client.contains("pub fn build_show_request("));

    let types = file(&files, "items/types.rs");
    assert!(types.contains("pub struct ShowPayload"));
    assert!(types.contains("pub enum ShowError"));
}

#[test]
fn test_emit_flags_drop_sides() {
    let (model, res) = load_clean(ITEMS);
    let files = generate(
        &model,
        &res,
        &CodegenOptions {
            emit_client: false,
            ..options()
        },
    )
    .unwrap();
    assert!(files.iter().all(|f| !f.path.ends_with("client.rs")));
    assert!(!file(&files, "items/mod.rs").contains("pub mod client;"));
}

#[test]
fn test_failed_methods_generate_nothing() {
    let (model, res) = load(
        r#"
api: { name: shop }
services:
  - name: items
    methods:
      - name: ok
        http: { routes: ["GET /items"] }
      - name: broken
        payload: { fields: [{ name: id, type: int }] }
        http: { routes: ["GET /items/{missing}"] }
"#,
    );
    assert_eq!(res.failures.len(), 1);
    let files = generate(&model, &res, &options()).unwrap();
    let paths = file(&files, "items/paths.rs");
    assert!(paths.contains("ok_items_path"));
    assert!(!paths.contains("broken_items_path"));
}

#[test]
fn test_generation_is_deterministic() {
    let run = || {
        let (model, res) = load_clean(ITEMS);
        let mut files = generate(&model, &res, &options()).unwrap();
        files.extend(
            generate_documents(
                &model,
                &res,
                &[DocumentVersion::V2, DocumentVersion::V3],
                &[DocumentFormat::Json, DocumentFormat::Yaml],
            )
            .unwrap(),
        );
        files
    };
    assert_eq!(run(), run());
}

#[test]
fn test_mount_table_order_and_wildcards() {
    let (model, res) = load_clean(ITEMS);
    let table = MountTable::from_resolution(&model, &res);
    let listed: Vec<(String, String)> = table
        .records
        .iter()
        .map(|r| (r.verb.to_string(), r.path.clone()))
        .collect();
    assert_eq!(
        listed,
        vec![
            ("GET".to_string(), "/items/{id}".to_string()),
            ("GET".to_string(), "/items/by-id/{id}".to_string()),
            ("GET".to_string(), "/items".to_string()),
            ("GET".to_string(), "/items/assets/{*rest}".to_string()),
            ("GET".to_string(), "/ping".to_string()),
        ]
    );
    assert_eq!(table.service("health").count(), 1);

    let router = router(&model, &res);
    let matched = router.route(&Method::GET, "/items/assets/css/site.css").unwrap();
    assert_eq!(
        matched.record.target,
        MountTarget::Static {
            source: "./public".to_string()
        }
    );
    assert_eq!(matched.get_path_param("rest"), Some("css/site.css"));

    let matched = router.route(&Method::GET, "/items/by-id/9").unwrap();
    assert_eq!(matched.index, 1);
    assert_eq!(matched.record.operation().as_deref(), Some("items.show"));
}

const INHERITED: &str = r#"
api:
  name: shop
  errors:
    - name: unavailable
      temporary: true
      fields: [{ name: reason, type: string }]
services:
  - name: items
    errors:
      - name: locked
        fields: [{ name: until, type: string }]
    methods:
      - name: show
        payload:
          fields:
            - { name: ids, type: "array<int>", required: true }
            - { name: labels, type: "array<string>" }
        result: { type: string }
        errors:
          - { name: not_found, type: string }
        http:
          routes: ["GET /items"]
          params:
            - { attribute: labels, in: header, name: X-Labels }
          errors:
            - { name: not_found, status: 404 }
      - name: list
        result: { type: "array<string>" }
        http:
          routes: ["GET /all"]
"#;

#[test]
fn test_inherited_error_types_are_emitted_once() {
    let (model, res) = load_clean(INHERITED);
    let files = generate(&model, &res, &options()).unwrap();
    let types = file(&files, "items/types.rs");
    assert_eq!(types.matches("pub struct UnavailableError {").count(), 1, "{types}");
    assert_eq!(types.matches("pub struct LockedError {").count(), 1, "{types}");
    assert!(!types.contains("UnavailableError2"), "{types}");
    assert!(types.contains("Unavailable(UnavailableError),"), "{types}");
}

#[test]
fn test_required_lists_decode_absent_as_empty() {
    let (model, res) = load_clean(INHERITED);
    let files = generate(&model, &res, &options()).unwrap();
    let server = file(&files, "items/server.rs");
    let ids =
        "let ids_value: Vec<i64> = wire::query_values::<i64, _>(req, \"ids\")?.unwrap_or_default();";
    assert!(server.contains(ids), "{server}");
    assert!(server.contains("wire::header_values::<String, _>(req, \"X-Labels\")?"), "{server}");
}

#[test]
fn test_client_decodes_results_and_errors() {
    let (model, res) = load_clean(INHERITED);
    let files = generate(&model, &res, &options()).unwrap();
    let client = file(&files, "items/client.rs");
    for expected in [
        "pub fn decode_show_response(resp: &Response<Vec<u8>>, encoders: &EncoderSet) -> Result<String, ShowError> {",
        "(404, Some(\"not_found\")) => Err(ShowError::NotFound(decode_show_not_found_error(resp, encoders)?)),",
        "(503, Some(\"unavailable\")) => Err(ShowError::Unavailable(",
        "(_, Some(_)) => Err(ShowError::Generic(wire::generic_error(resp, encoders))),",
        "(200, None) => Ok(decode_show_result_200(resp, encoders)?),",
        "(404, None) => Err(ShowError::NotFound(",
        "_ => Err(ShowError::Generic(wire::unexpected_response(resp))),",
        "pub fn decode_list_response(",
    ] {
        assert!(client.contains(expected), "missing {expected} in {client}");
    }
}

#[test]
fn test_structs_carry_nested_validation() {
    let (model, res) = load_clean(
        r#"
api: { name: shop }
types:
  - name: Line
    fields:
      - { name: sku, type: string, required: true, min_length: 3 }
services:
  - name: orders
    methods:
      - name: place
        payload:
          fields:
            - { name: lines, type: "array<Line>", required: true }
        http:
          routes: ["POST /orders"]
"#,
    );
    let files = generate(&model, &res, &options()).unwrap();
    let types = file(&files, "orders/types.rs");
    assert!(types.contains("impl Line {"), "{types}");
    assert!(
        types.contains("pub fn validate(&self, field: &str) -> Result<(), DecodeError> {"),
        "{types}"
    );
    let server = file(&files, "orders/server.rs");
    assert!(server.contains("item0.validate(&format!(\"{}[{}]\", \"lines\", i0))?;"), "{server}");
}
