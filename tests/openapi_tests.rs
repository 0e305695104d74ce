#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::load_clean;
use httpbind::openapi::{generate_documents, v2, v3, DocumentFormat, DocumentVersion};
use serde_json::{json, Value};

const SHOP: &str = r#"
api:
  name: shop
  version: "2.1"
  meta:
    "openapi:extension:x-team": platform
  tags:
    - { name: Internal, meta: { "openapi:generate": false } }
security_schemes:
  - { name: jwt, kind: jwt }
services:
  - name: items
    http:
      path: /items
      files:
        - { path: "/assets/{*rest}", source: ./public }
    meta:
      "openapi:extension:x-team": catalog
    methods:
      - name: show
        payload:
          fields:
            - { name: id, type: int, required: true }
            - { name: token, type: string }
        result: { type: string }
        meta:
          "openapi:extension:x-rate": 10
        security: [{ schemes: [jwt] }]
        credentials: [{ scheme: jwt, attribute: token }]
        http:
          routes: ["GET /{id}", "GET /by-id/{id}"]
      - name: hidden
        meta: { "openapi:generate": false }
        http:
          routes: ["GET /hidden"]
      - name: internal
        meta: { "openapi:tag:Internal": "" }
        http:
          routes: ["GET /internal"]
"#;

fn v2_doc() -> Value {
    let (model, res) = load_clean(SHOP);
    serde_json::to_value(v2::synthesize(&model, &res)).unwrap()
}

fn v3_doc() -> Value {
    let (model, res) = load_clean(SHOP);
    serde_json::to_value(v3::synthesize(&model, &res)).unwrap()
}

#[test]
fn test_operation_ids_number_alternative_routes() {
    for doc in [v2_doc(), v3_doc()] {
        assert_eq!(doc["paths"]["/items/{id}"]["get"]["operationId"], "items#show");
        assert_eq!(doc["paths"]["/items/by-id/{id}"]["get"]["operationId"], "items#show#1");
        assert_eq!(doc["paths"]["/items/{id}"]["get"]["tags"], json!(["items"]));
    }
}

#[test]
fn test_suppressed_operations_are_left_out() {
    for doc in [v2_doc(), v3_doc()] {
        let paths = doc["paths"].as_object().unwrap();
        assert!(!paths.contains_key("/items/hidden"));
        assert!(!paths.contains_key("/items/internal"));
        assert_eq!(paths.len(), 3);
    }
    // suppressed tags are not listed either
    assert!(v3_doc().get("tags").is_none());
}

#[test]
fn test_extensions_merge_narrowest_scope_last() {
    let doc = v3_doc();
    assert_eq!(doc["x-team"], "platform");
    let show = &doc["paths"]["/items/{id}"]["get"];
    assert_eq!(show["x-team"], "catalog");
    assert_eq!(show["x-rate"], 10);
}

#[test]
fn test_static_mounts_become_downloads() {
    let doc = v3_doc();
    let download = &doc["paths"]["/items/assets/{rest}"]["get"];
    assert_eq!(download["parameters"][0]["name"], "rest");
    assert_eq!(download["parameters"][0]["in"], "path");
    assert!(download["responses"]["404"].is_object());

    let doc = v2_doc();
    assert!(doc["paths"]["/items/assets/{rest}"]["get"].is_object());
}

#[test]
fn test_credentials_are_not_parameters() {
    let doc = v3_doc();
    let show = &doc["paths"]["/items/{id}"]["get"];
    let names: Vec<&str> = show["parameters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["id"]);
    assert_eq!(show["security"], json!([{ "jwt": [] }]));

    let scheme = &doc["components"]["securitySchemes"]["jwt"];
    assert_eq!(scheme["type"], "http");
    assert_eq!(scheme["scheme"], "bearer");
    assert_eq!(scheme["bearerFormat"], "JWT");
}

#[test]
fn test_documents_are_named_by_version_and_format() {
    let (model, res) = load_clean(SHOP);
    let files = generate_documents(
        &model,
        &res,
        &[DocumentVersion::V2, DocumentVersion::V3],
        &[DocumentFormat::Json, DocumentFormat::Yaml],
    )
    .unwrap();
    let names: Vec<String> = files.iter().map(|f| f.path.display().to_string()).collect();
    assert_eq!(names, vec!["openapi.json", "openapi.yaml", "openapi3.json", "openapi3.yaml"]);

    let v2: Value = serde_json::from_str(&files[0].contents).unwrap();
    assert_eq!(v2["swagger"], "2.0");
    assert_eq!(v2["info"]["version"], "2.1");
    let v3: serde_yaml::Value = serde_yaml::from_str(&files[3].contents).unwrap();
    assert_eq!(v3["openapi"].as_str(), Some("3.0.3"));

    let again =
        generate_documents(&model, &res, &[DocumentVersion::V3], &[DocumentFormat::Json]).unwrap();
    assert_eq!(again[0].contents, files[2].contents);
}

#[test]
fn test_scope_notes_without_a_description() {
    let (model, res) = load_clean(
        r#"
api: { name: shop }
security_schemes:
  - { name: jwt, kind: jwt, scopes: [{ name: "items:read" }] }
services:
  - name: items
    methods:
      - name: list
        payload:
          fields:
            - { name: token, type: string }
        security: [{ schemes: [jwt], scopes: ["items:read"] }]
        credentials: [{ scheme: jwt, attribute: token }]
        http:
          routes: ["GET /items"]
"#,
    );
    let doc = serde_json::to_value(v3::synthesize(&model, &res)).unwrap();
    let description = doc["paths"]["/items"]["get"]["description"].as_str().unwrap();
    assert_eq!(description, "**Required security scopes for jwt**:\n  * `items:read`");
}
