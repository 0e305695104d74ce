#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{load_clean, router};
use http::header::AUTHORIZATION;
use http::Method;
use httpbind::runtime::{
    build_request, decode_request, encode_error, encode_generic_error, encode_result, DecodeError,
    DefaultErrorFormatter, EncoderSet, ErrorValue, GenericError, TypedValue, ERROR_NAME_HEADER,
};

const PRODUCTS: &str = r#"
api:
  name: catalog
  http: { path: /v1 }
types:
  - name: Dimensions
    fields:
      - { name: width, type: int }
      - { name: height, type: int }
services:
  - name: products
    http: { path: /products }
    methods:
      - name: update
        payload:
          fields:
            - { name: id, type: uint32, required: true }
            - { name: slug, type: string, required: true }
            - { name: limit, type: int32 }
            - { name: ratio, type: float64 }
            - { name: active, type: boolean }
            - { name: tags, type: "array<string>" }
            - { name: trace, type: string }
            - { name: blob, type: bytes }
            - { name: counts, type: "map<string, int>" }
            - { name: size, type: Dimensions }
        result: { type: string }
        http:
          routes: ["PUT /{id}/{slug}"]
          params:
            - { attribute: trace, in: header, name: X-Trace }
          body: [blob, counts, size]
"#;

#[test]
fn test_every_location_survives_a_round_trip() {
    let (model, res) = load_clean(PRODUCTS);
    let router = router(&model, &res);
    let encoders = EncoderSet::default();
    let update = res.endpoint("products", "update").unwrap();

    let payload = TypedValue::object([
        ("id", TypedValue::UInt32(7)),
        ("slug", TypedValue::string("red lamp/2")),
        ("limit", TypedValue::Int32(-3)),
        ("ratio", TypedValue::Float64(0.25)),
        ("active", TypedValue::Bool(true)),
        (
            "tags",
            TypedValue::Array(vec![TypedValue::string("new"), TypedValue::string("sale")]),
        ),
        ("trace", TypedValue::string("abc-123")),
        ("blob", TypedValue::Bytes(vec![0, 1, 2, 255])),
        (
            "counts",
            TypedValue::Map(vec![
                (TypedValue::string("a"), TypedValue::Int(1)),
                (TypedValue::string("b"), TypedValue::Int(2)),
            ]),
        ),
        (
            "size",
            TypedValue::object([("width", TypedValue::Int(3)), ("height", TypedValue::Int(4))]),
        ),
    ]);

    let req = build_request(&model, update, 0, &payload, &encoders).unwrap();
    assert_eq!(req.method(), Method::PUT);
    assert_eq!(req.uri().path(), "/v1/products/7/red%20lamp%2F2");
    assert_eq!(req.headers()["x-trace"], "abc-123");

    let matched = router.route(req.method(), req.uri().path()).unwrap();
    assert_eq!(matched.record.operation().as_deref(), Some("products.update"));
    assert_eq!(matched.get_path_param("id"), Some("7"));

    let decoded = decode_request(&model, update, &req, &matched.path_params, &encoders).unwrap();
    assert_eq!(decoded, payload);
}

#[test]
fn test_optional_attributes_may_be_omitted() {
    let (model, res) = load_clean(PRODUCTS);
    let router = router(&model, &res);
    let encoders = EncoderSet::default();
    let update = res.endpoint("products", "update").unwrap();

    let payload = TypedValue::object([
        ("id", TypedValue::UInt32(1)),
        ("slug", TypedValue::string("plain")),
    ]);
    let req = build_request(&model, update, 0, &payload, &encoders).unwrap();
    assert!(req.uri().query().is_none());
    let matched = router.route(req.method(), req.uri().path()).unwrap();
    let decoded = decode_request(&model, update, &req, &matched.path_params, &encoders).unwrap();
    assert_eq!(decoded, payload);
}

const ITEMS: &str = r#"
api: { name: shop }
services:
  - name: items
    http: { path: /items }
    methods:
      - name: get
        payload:
          fields:
            - { name: id, type: int, required: true }
        result: { type: string }
        errors:
          - { name: not_found, type: string }
        http:
          routes: ["GET /{id}"]
          errors:
            - { name: not_found, status: 404 }
"#;

#[test]
fn test_items_get_end_to_end() {
    let (model, res) = load_clean(ITEMS);
    let router = router(&model, &res);
    let encoders = EncoderSet::default();
    let get = res.endpoint("items", "get").unwrap();

    let ok = http::Request::get("/items/42").body(Vec::new()).unwrap();
    let matched = router.route(ok.method(), ok.uri().path()).unwrap();
    let payload = decode_request(&model, get, &ok, &matched.path_params, &encoders).unwrap();
    assert_eq!(payload.get("id"), Some(&TypedValue::Int(42)));

    let resp = encode_result(get, &TypedValue::string("lamp"), None, &encoders).unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.body().as_slice(), br#""lamp""#);

    let missing = encode_error(
        get,
        &ErrorValue::named("not_found", TypedValue::string("no such item")),
        None,
        &encoders,
        &DefaultErrorFormatter,
    );
    assert_eq!(missing.status(), 404);
    assert_eq!(missing.headers()[ERROR_NAME_HEADER], "not_found");

    let bad = http::Request::get("/items/abc").body(Vec::new()).unwrap();
    let matched = router.route(bad.method(), bad.uri().path()).unwrap();
    let err = decode_request(&model, get, &bad, &matched.path_params, &encoders).unwrap_err();
    assert!(matches!(&err, DecodeError::InvalidFieldType { field, .. } if field == "id"));

    let resp =
        encode_generic_error(&GenericError::from(err), None, &encoders, &DefaultErrorFormatter);
    assert_eq!(resp.status(), 400);
    assert_eq!(resp.headers()[ERROR_NAME_HEADER], "invalid_field_type");
    let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(body["name"], "invalid_field_type");
    assert_eq!(body["fault"], false);
}

#[test]
fn test_unmatched_requests_do_not_route() {
    let (model, res) = load_clean(ITEMS);
    let router = router(&model, &res);
    assert!(router.route(&Method::GET, "/items").is_none());
    assert!(router.route(&Method::POST, "/items/42").is_none());
    assert!(router.route(&Method::GET, "/items/42/extra").is_none());
}

const SECURED: &str = r#"
api: { name: vault }
security_schemes:
  - { name: jwt, kind: jwt }
  - { name: login, kind: basic }
services:
  - name: secrets
    methods:
      - name: read
        payload:
          fields:
            - { name: token, type: string, required: true }
            - { name: key, type: string, required: true }
        result: { type: string }
        security: [{ schemes: [jwt] }]
        credentials: [{ scheme: jwt, attribute: token }]
        http:
          routes: ["GET /secrets/{key}"]
      - name: login
        payload:
          fields:
            - { name: user, type: string, required: true }
            - { name: pass, type: string, required: true }
        result: { type: string }
        security: [{ schemes: [login] }]
        credentials:
          - { scheme: login, attribute: user, role: username }
          - { scheme: login, attribute: pass, role: password }
        http:
          routes: ["POST /login"]
"#;

#[test]
fn test_jwt_token_travels_as_bearer() {
    let (model, res) = load_clean(SECURED);
    let router = router(&model, &res);
    let encoders = EncoderSet::default();
    let read = res.endpoint("secrets", "read").unwrap();

    let payload = TypedValue::object([
        ("token", TypedValue::string("abc.def.ghi")),
        ("key", TypedValue::string("db")),
    ]);
    let req = build_request(&model, read, 0, &payload, &encoders).unwrap();
    assert_eq!(req.headers()[AUTHORIZATION], "Bearer abc.def.ghi");

    let matched = router.route(req.method(), req.uri().path()).unwrap();
    let decoded = decode_request(&model, read, &req, &matched.path_params, &encoders).unwrap();
    assert_eq!(decoded, payload);
}

#[test]
fn test_basic_credentials_share_one_header() {
    let (model, res) = load_clean(SECURED);
    let router = router(&model, &res);
    let encoders = EncoderSet::default();
    let login = res.endpoint("secrets", "login").unwrap();

    let payload = TypedValue::object([
        ("user", TypedValue::string("ada")),
        ("pass", TypedValue::string("s3cret:x")),
    ]);
    let req = build_request(&model, login, 0, &payload, &encoders).unwrap();
    assert_eq!(req.headers().get_all(AUTHORIZATION).iter().count(), 1);
    assert!(req.headers()[AUTHORIZATION].to_str().unwrap().starts_with("Basic "));

    let matched = router.route(req.method(), req.uri().path()).unwrap();
    let decoded = decode_request(&model, login, &req, &matched.path_params, &encoders).unwrap();
    assert_eq!(decoded, payload);
}

#[test]
fn test_missing_credentials_are_reported() {
    let (model, res) = load_clean(SECURED);
    let encoders = EncoderSet::default();
    let read = res.endpoint("secrets", "read").unwrap();
    let router = router(&model, &res);

    let req = http::Request::get("/secrets/db").body(Vec::new()).unwrap();
    let matched = router.route(req.method(), req.uri().path()).unwrap();
    let err = decode_request(&model, read, &req, &matched.path_params, &encoders).unwrap_err();
    assert!(matches!(err, DecodeError::MissingField { ref field, .. } if field == "token"));
}
