#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{load, load_clean};
use httpbind::binding::{BodyShape, ErrorScope, PayloadShape, ResolutionErrorKind};
use httpbind::model::WireLocation;

const CATALOG: &str = r#"
api:
  name: catalog
  http:
    path: /v1
  errors:
    - { name: unavailable, temporary: true }
    - { name: too_slow, timeout: true }
    - { name: conflict }
types:
  - name: Filter
    fields:
      - { name: color, type: string }
services:
  - name: products
    http:
      path: /products
      errors:
        - { name: conflict, status: 409 }
    errors:
      - { name: invalid, type: string }
    methods:
      - name: show
        payload:
          fields:
            - { name: id, type: uint32, required: true }
            - { name: verbose, type: boolean }
            - { name: filter, type: Filter }
        result: { type: string }
        http:
          routes: ["GET /{id}"]
      - name: create
        payload:
          fields:
            - { name: name, type: string, required: true }
            - { name: trace, type: string }
        result: { type: string }
        errors:
          - { name: conflict, description: "name taken" }
        http:
          routes: ["POST /"]
          params:
            - { attribute: trace, in: header, name: X-Trace }
          errors:
            - { name: conflict, status: 400 }
            - { name: conflict, status: 422 }
      - name: remove
        payload: { type: uint32 }
        http:
          routes: ["DELETE /{id}"]
"#;

#[test]
fn test_routes_compose_base_paths() {
    let (_, res) = load(CATALOG);
    let show = res.endpoint("products", "show").unwrap();
    assert_eq!(show.routes[0].pattern, "/v1/products/{id}");
    assert_eq!(show.routes[0].params, vec!["id".to_string()]);
    let create = res.endpoint("products", "create").unwrap();
    assert_eq!(create.routes[0].pattern, "/v1/products");
}

#[test]
fn test_attribute_locations() {
    let (_, res) = load(CATALOG);
    let show = res.endpoint("products", "show").unwrap();
    assert_eq!(show.payload, PayloadShape::Object);
    let location = |name: &str| show.attribute(name).unwrap().location;
    assert_eq!(location("id"), WireLocation::Path);
    assert_eq!(location("verbose"), WireLocation::Query);
    assert_eq!(location("filter"), WireLocation::Body);
    assert!(show.attribute("id").unwrap().required);

    let create = res.endpoint("products", "create").unwrap();
    let trace = create.attribute("trace").unwrap();
    assert_eq!(trace.location, WireLocation::Header);
    assert_eq!(trace.wire_name, "X-Trace");
    assert_eq!(create.attribute("name").unwrap().location, WireLocation::Query);
    assert_eq!(create.body, BodyShape::None);
}

#[test]
fn test_single_payload_binds_route_param() {
    let (_, res) = load(CATALOG);
    let remove = res.endpoint("products", "remove").unwrap();
    assert_eq!(remove.payload, PayloadShape::Single);
    assert_eq!(remove.attributes.len(), 1);
    assert_eq!(remove.attributes[0].location, WireLocation::Path);
    // empty result
    assert_eq!(remove.responses[0].status, 204);
}

#[test]
fn test_error_statuses_and_scopes() {
    let (_, res) = load(CATALOG);
    let show = res.endpoint("products", "show").unwrap();
    let names: Vec<&str> = show.errors.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["invalid", "unavailable", "too_slow", "conflict"]);
    assert_eq!(show.error("invalid").unwrap().status, 500);
    assert_eq!(show.error("invalid").unwrap().scope, ErrorScope::Service);
    assert_eq!(show.error("unavailable").unwrap().status, 503);
    assert_eq!(show.error("too_slow").unwrap().status, 504);
    // api error mapped at the service scope
    assert_eq!(show.error("conflict").unwrap().status, 409);

    let create = res.endpoint("products", "create").unwrap();
    let conflict = create.error("conflict").unwrap();
    assert_eq!(conflict.scope, ErrorScope::Method);
    assert_eq!(conflict.description.as_deref(), Some("name taken"));
    // last mapping of the same scope wins
    assert_eq!(conflict.status, 422);
}

#[test]
fn test_failures_are_isolated_per_method() {
    let (_, res) = load(
        r#"
api: { name: shop }
types:
  - name: Filter
    fields: [{ name: color, type: string }]
security_schemes:
  - { name: token, kind: jwt }
services:
  - name: items
    methods:
      - name: ok
        http: { routes: ["GET /items"] }
      - name: secured
        security: [{ schemes: [nope] }]
        http: { routes: ["GET /secured"] }
      - name: taken
        http: { routes: ["GET /items"] }
      - name: by_filter
        payload:
          fields: [{ name: filter, type: Filter, required: true }]
        http: { routes: ["GET /by/{filter}"] }
      - name: conflicting
        payload:
          fields: [{ name: id, type: int }]
        http:
          routes: ["GET /c/{id}"]
          params: [{ attribute: id, in: header }]
      - name: ghost
        payload:
          fields: [{ name: id, type: int }]
        http:
          routes: ["GET /g/{missing}"]
"#,
    );
    assert_eq!(res.endpoints.len(), 1);
    assert_eq!(res.endpoints[0].method_name, "ok");

    let kind_of = |method: &str| {
        res.failures
            .iter()
            .find(|f| f.method.as_deref() == Some(method))
            .map(|f| f.kind)
    };
    assert_eq!(kind_of("secured"), Some(ResolutionErrorKind::UnknownSecurityScheme));
    assert_eq!(kind_of("taken"), Some(ResolutionErrorKind::DuplicateRoute));
    assert_eq!(kind_of("by_filter"), Some(ResolutionErrorKind::NonScalarPathParam));
    assert_eq!(kind_of("conflicting"), Some(ResolutionErrorKind::ConflictingLocation));
    assert_eq!(kind_of("ghost"), Some(ResolutionErrorKind::MissingPathAttribute));
    assert_eq!(res.failures.len(), 5);
}

#[test]
fn test_alternative_routes_share_parameters() {
    let (_, res) = load_clean(
        r#"
api: { name: shop }
services:
  - name: items
    methods:
      - name: show
        payload: { fields: [{ name: id, type: int, required: true }] }
        http:
          routes: ["GET /items/{id}", "GET /things/{id}"]
"#,
    );
    let show = res.endpoint("items", "show").unwrap();
    assert_eq!(show.routes.len(), 2);
    assert_eq!(show.routes[1].pattern, "/things/{id}");

    let (_, res) = load(
        r#"
api: { name: shop }
services:
  - name: items
    methods:
      - name: show
        payload: { fields: [{ name: id, type: int }, { name: sku, type: string }] }
        http:
          routes: ["GET /items/{id}", "GET /skus/{sku}"]
"#,
    );
    assert_eq!(res.failures[0].kind, ResolutionErrorKind::InvalidRoute);
}

#[test]
fn test_static_mounts() {
    let (_, res) = load_clean(
        r#"
api: { name: shop, http: { path: /api } }
services:
  - name: web
    http:
      files:
        - { path: "/assets/{*rest}", source: ./public }
        - { path: /favicon.ico, source: ./public/favicon.ico }
"#,
    );
    assert_eq!(res.mounts.len(), 2);
    assert_eq!(res.mounts[0].path, "/api/assets/{*rest}");
    assert_eq!(res.mounts[0].wildcard().as_deref(), Some("rest"));
    assert_eq!(res.mounts[1].wildcard(), None);
}
