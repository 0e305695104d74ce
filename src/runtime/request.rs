//! Model-driven request codec.
//!
//! [`decode_request`] and [`build_request`] walk an [`EndpointBinding`]
//! instead of generated code. The CLI uses them to exercise a model without
//! compiling anything and the tests use them to check generated bindings
//! against the resolver.

use super::encoding::EncoderSet;
use super::error::{BuildError, DecodeError};
use super::format::{
    format_path_value, format_scalar, list_parts, list_texts, parse_scalar, unescape,
};
use super::validate::validate;
use super::value::{conforms, TypedValue};
use super::wire::{
    body_decoder, header_texts, parse_basic, query_pairs, raw_path_param, strip_bearer,
    RequestBuilder,
};
use crate::binding::{AttributeBinding, BodyShape, EndpointBinding, PayloadShape, RouteBinding};
use crate::model::{
    AttributeType, CredentialRole, Primitive, SchemeKind, ServiceModel, Validation, WireLocation,
};
use crate::router::ParamVec;
use http::Request;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::trace;

/// Element primitive of a scalar-like attribute: the primitive itself or the
/// element of an array of primitives.
fn scalar_primitive(model: &ServiceModel, ty: &AttributeType) -> (Primitive, bool) {
    match model.resolve(ty) {
        AttributeType::Array(elem) => (
            model.resolve(elem).as_primitive().unwrap_or(Primitive::String),
            true,
        ),
        other => (other.as_primitive().unwrap_or(Primitive::String), false),
    }
}

fn parse_text(field: &str, raw: &str, p: Primitive) -> Result<TypedValue, DecodeError> {
    parse_scalar(raw, p).ok_or_else(|| DecodeError::InvalidFieldType {
        field: field.to_string(),
        expected: p.name().to_string(),
        received: raw.to_string(),
    })
}

fn decode_path(
    model: &ServiceModel,
    ab: &AttributeBinding,
    raw: &str,
) -> Result<TypedValue, DecodeError> {
    let (p, array) = scalar_primitive(model, &ab.ty);
    let unescaped = |part: &str| {
        unescape(part).ok_or_else(|| DecodeError::InvalidFieldType {
            field: ab.attribute.clone(),
            expected: p.name().to_string(),
            received: part.to_string(),
        })
    };
    if array {
        raw.split(',')
            .map(|part| parse_text(&ab.attribute, &unescaped(part)?, p))
            .collect::<Result<Vec<_>, _>>()
            .map(TypedValue::Array)
    } else {
        parse_text(&ab.attribute, &unescaped(raw)?, p)
    }
}

/// Typed value of query or header texts: the first text for scalars, every
/// element for arrays.
pub(crate) fn decode_texts(
    model: &ServiceModel,
    ty: &AttributeType,
    field: &str,
    values: &[String],
) -> Result<Option<TypedValue>, DecodeError> {
    let Some(first) = values.first() else {
        return Ok(None);
    };
    let (p, array) = scalar_primitive(model, ty);
    if !array {
        return parse_text(field, first, p).map(Some);
    }
    list_parts(values, p)
        .into_iter()
        .map(|part| parse_text(field, part, p))
        .collect::<Result<Vec<_>, _>>()
        .map(|items| Some(TypedValue::Array(items)))
}

/// Header value of a credential attribute, with the scheme's framing removed.
fn decode_credential(
    model: &ServiceModel,
    ab: &AttributeBinding,
    values: &[String],
) -> Result<Option<TypedValue>, DecodeError> {
    let Some(slot) = &ab.credential else {
        return decode_texts(model, &ab.ty, &ab.attribute, values);
    };
    let Some(raw) = values.first() else {
        return Ok(None);
    };
    match (slot.kind, slot.role) {
        (SchemeKind::Basic, CredentialRole::Username | CredentialRole::Password) => {
            let (user, pass) = parse_basic(raw).ok_or_else(|| DecodeError::InvalidFieldType {
                field: ab.attribute.clone(),
                expected: "basic credentials".to_string(),
                received: raw.clone(),
            })?;
            let value = if slot.role == CredentialRole::Username { user } else { pass };
            Ok(Some(TypedValue::String(value)))
        }
        (SchemeKind::Jwt | SchemeKind::Oauth2, _) if ab.location == WireLocation::Header => {
            decode_texts(model, &ab.ty, &ab.attribute, &[strip_bearer(raw).to_string()])
        }
        _ => decode_texts(model, &ab.ty, &ab.attribute, values),
    }
}

/// Decode an incoming request into the method payload.
///
/// `params` are the raw path captures from the router. An empty payload
/// decodes to an empty object.
///
/// # Errors
///
/// The first [`DecodeError`] found: missing required attributes, values that
/// do not parse, bodies that do not decode and failed validations.
pub fn decode_request(
    model: &ServiceModel,
    endpoint: &EndpointBinding,
    req: &Request<Vec<u8>>,
    params: &ParamVec,
    encoders: &EncoderSet,
) -> Result<TypedValue, DecodeError> {
    trace!(
        service = %endpoint.service_name,
        method = %endpoint.method_name,
        uri = %req.uri(),
        "decoding request"
    );
    match endpoint.payload {
        PayloadShape::Empty => Ok(TypedValue::Object(BTreeMap::new())),
        PayloadShape::Single => decode_single(model, endpoint, req, params, encoders),
        PayloadShape::Object => decode_object(model, endpoint, req, params, encoders),
    }
}

fn decode_single(
    model: &ServiceModel,
    endpoint: &EndpointBinding,
    req: &Request<Vec<u8>>,
    params: &ParamVec,
    encoders: &EncoderSet,
) -> Result<TypedValue, DecodeError> {
    if let Some(ab) = endpoint.attributes.first() {
        let raw = raw_path_param(params, &ab.wire_name).ok_or_else(|| DecodeError::MissingField {
            field: ab.attribute.clone(),
            location: WireLocation::Path.to_string(),
        })?;
        let value = decode_path(model, ab, raw)?;
        validate(model, &ab.ty, &ab.validation, &value, &ab.attribute, "path")?;
        return Ok(value);
    }
    if req.body().is_empty() {
        return Err(DecodeError::MissingField {
            field: "body".to_string(),
            location: WireLocation::Body.to_string(),
        });
    }
    let encoder = body_decoder(req, encoders)?;
    let json = encoder.decode(req.body())?;
    let lenient = encoder.is_lenient();
    let value = TypedValue::from_json(model, &endpoint.payload_type, &json, "body", lenient)?;
    validate(model, &endpoint.payload_type, &Validation::default(), &value, "body", "body")?;
    Ok(value)
}

fn decode_object(
    model: &ServiceModel,
    endpoint: &EndpointBinding,
    req: &Request<Vec<u8>>,
    params: &ParamVec,
    encoders: &EncoderSet,
) -> Result<TypedValue, DecodeError> {
    let query = query_pairs(req);
    let mut fields: BTreeMap<String, TypedValue> = BTreeMap::new();

    for ab in &endpoint.attributes {
        let value = match ab.location {
            WireLocation::Path => raw_path_param(params, &ab.wire_name)
                .map(|raw| decode_path(model, ab, raw))
                .transpose()?,
            WireLocation::Query => {
                let values: Vec<String> = query
                    .iter()
                    .filter(|(k, _)| *k == ab.wire_name)
                    .map(|(_, v)| v.clone())
                    .collect();
                match &ab.credential {
                    Some(_) => decode_credential(model, ab, &values)?,
                    None => decode_texts(model, &ab.ty, &ab.attribute, &values)?,
                }
            }
            WireLocation::Header => {
                let values = header_texts(req, &ab.wire_name)?;
                decode_credential(model, ab, &values)?
            }
            WireLocation::Body => continue,
        };
        if let Some(value) = value {
            fields.insert(ab.attribute.clone(), value);
        }
    }

    if !endpoint.body.is_none() && !req.body().is_empty() {
        let encoder = body_decoder(req, encoders)?;
        let json = encoder.decode(req.body())?;
        let lenient = encoder.is_lenient();
        match &endpoint.body {
            BodyShape::Object(names) => {
                let Value::Object(entries) = &json else {
                    return Err(DecodeError::InvalidFieldType {
                        field: "body".to_string(),
                        expected: "object".to_string(),
                        received: json.to_string(),
                    });
                };
                for name in names {
                    let Some(ab) = endpoint.attribute(name) else { continue };
                    match entries.get(&ab.wire_name) {
                        None | Some(Value::Null) => {}
                        Some(v) => {
                            fields.insert(
                                name.clone(),
                                TypedValue::from_json(model, &ab.ty, v, name, lenient)?,
                            );
                        }
                    }
                }
            }
            BodyShape::Attribute(name) => {
                if let Some(ab) = endpoint.attribute(name) {
                    fields.insert(
                        name.clone(),
                        TypedValue::from_json(model, &ab.ty, &json, name, lenient)?,
                    );
                }
            }
            BodyShape::Whole | BodyShape::None => {}
        }
    }

    for ab in &endpoint.attributes {
        if !ab.required || fields.contains_key(&ab.attribute) {
            continue;
        }
        // a required list with no values on the wire is the empty list
        let list = matches!(ab.location, WireLocation::Query | WireLocation::Header)
            && ab.credential.is_none()
            && scalar_primitive(model, &ab.ty).1;
        if list {
            fields.insert(ab.attribute.clone(), TypedValue::Array(Vec::new()));
        } else {
            return Err(DecodeError::MissingField {
                field: ab.attribute.clone(),
                location: ab.location.to_string(),
            });
        }
    }
    let payload = TypedValue::Object(fields);
    validate(model, &endpoint.payload_type, &Validation::default(), &payload, "", "body")?;
    Ok(payload)
}

/// Expand a route template with the path attributes of `payload`.
///
/// # Errors
///
/// [`BuildError::MissingField`] when a path attribute is absent and
/// [`BuildError::TypeMismatch`] when it is not a scalar or array of scalars.
pub fn build_path(
    endpoint: &EndpointBinding,
    route: &RouteBinding,
    payload: &TypedValue,
) -> Result<String, BuildError> {
    let mut path = route.pattern.clone();
    for param in &route.params {
        let ab = endpoint
            .path_attribute(param)
            .ok_or_else(|| BuildError::MissingField { field: param.clone() })?;
        let value = match endpoint.payload {
            PayloadShape::Single => Some(payload),
            _ => payload.get(&ab.attribute),
        }
        .ok_or_else(|| BuildError::MissingField {
            field: ab.attribute.clone(),
        })?;
        let text = format_path_value(value).ok_or_else(|| BuildError::TypeMismatch {
            field: ab.attribute.clone(),
            expected: "path value".to_string(),
            received: value.kind().to_string(),
        })?;
        let placeholder = if route.wildcard.as_deref() == Some(param.as_str()) {
            format!("{{*{param}}}")
        } else {
            format!("{{{param}}}")
        };
        path = path.replace(&placeholder, &text);
    }
    Ok(path)
}

fn scalar_text(ab: &AttributeBinding, value: &TypedValue) -> Result<String, BuildError> {
    format_scalar(value).ok_or_else(|| BuildError::TypeMismatch {
        field: ab.attribute.clone(),
        expected: "scalar".to_string(),
        received: value.kind().to_string(),
    })
}

/// One text per wire value: the scalar itself or every array element.
fn texts(ab: &AttributeBinding, value: &TypedValue) -> Result<Vec<String>, BuildError> {
    match value {
        TypedValue::Array(items) => Ok(list_texts(
            items.iter().map(|v| scalar_text(ab, v)).collect::<Result<_, _>>()?,
        )),
        scalar => Ok(vec![scalar_text(ab, scalar)?]),
    }
}

/// Build the client request for route `route_index` of `endpoint`.
///
/// # Errors
///
/// [`BuildError::TypeMismatch`] when `payload` does not have the payload
/// type's shape, [`BuildError::MissingField`] for absent required attributes
/// and [`BuildError::UnknownRoute`] for an out of range route.
pub fn build_request(
    model: &ServiceModel,
    endpoint: &EndpointBinding,
    route_index: usize,
    payload: &TypedValue,
    encoders: &EncoderSet,
) -> Result<Request<Vec<u8>>, BuildError> {
    let route = endpoint
        .routes
        .get(route_index)
        .ok_or_else(|| BuildError::UnknownRoute {
            method: format!("{}.{}", endpoint.service_name, endpoint.method_name),
            index: route_index,
        })?;
    if endpoint.payload != PayloadShape::Empty {
        conforms(model, &endpoint.payload_type, payload, "")?;
    }
    let path = build_path(endpoint, route, payload)?;
    let mut builder = RequestBuilder::new(route.verb.clone(), path);
    let encoder = encoders.default_encoder();

    match endpoint.payload {
        PayloadShape::Empty => {}
        PayloadShape::Single => {
            if endpoint.body == BodyShape::Whole {
                builder.json_body(&payload.to_json(), encoder)?;
            }
        }
        PayloadShape::Object => {
            let mut basic: Option<(String, String, String)> = None;
            for ab in &endpoint.attributes {
                let Some(value) = payload.get(&ab.attribute) else {
                    if ab.required {
                        return Err(BuildError::MissingField {
                            field: ab.attribute.clone(),
                        });
                    }
                    continue;
                };
                match (ab.location, &ab.credential) {
                    (WireLocation::Path | WireLocation::Body, _) => {}
                    (_, Some(slot))
                        if slot.kind == SchemeKind::Basic
                            && matches!(
                                slot.role,
                                CredentialRole::Username | CredentialRole::Password
                            ) =>
                    {
                        let text = scalar_text(ab, value)?;
                        let entry = basic.get_or_insert_with(|| {
                            (ab.wire_name.clone(), String::new(), String::new())
                        });
                        if slot.role == CredentialRole::Username {
                            entry.1 = text;
                        } else {
                            entry.2 = text;
                        }
                    }
                    (WireLocation::Header, Some(slot))
                        if matches!(slot.kind, SchemeKind::Jwt | SchemeKind::Oauth2) =>
                    {
                        builder.bearer(&ab.wire_name, &scalar_text(ab, value)?);
                    }
                    (WireLocation::Query, _) => {
                        for text in texts(ab, value)? {
                            builder.query_text(&ab.wire_name, text);
                        }
                    }
                    (WireLocation::Header, _) => {
                        for text in texts(ab, value)? {
                            builder.header_text(&ab.wire_name, text);
                        }
                    }
                }
            }
            if let Some((header, user, pass)) = basic {
                builder.header_text(&header, super::wire::basic_header(&user, &pass));
            }
            match &endpoint.body {
                BodyShape::Object(names) => {
                    let mut body = Map::new();
                    for name in names {
                        let (Some(ab), Some(value)) =
                            (endpoint.attribute(name), payload.get(name))
                        else {
                            continue;
                        };
                        body.insert(ab.wire_name.clone(), value.to_json());
                    }
                    builder.json_body(&Value::Object(body), encoder)?;
                }
                BodyShape::Attribute(name) => {
                    if let Some(value) = payload.get(name) {
                        builder.json_body(&value.to_json(), encoder)?;
                    }
                }
                BodyShape::Whole | BodyShape::None => {}
            }
        }
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::binding::{resolve, SchemeRegistry};
    use crate::model::{parse_model, ModelFormat};
    use std::sync::Arc;

    const MODEL: &str = r#"
api:
  name: shop
services:
  - name: items
    http:
      path: /items
    methods:
      - name: get
        payload:
          type: object
          fields:
            - name: id
              type: int
              required: true
            - name: verbose
              type: boolean
        result:
          type: string
        http:
          routes: ["GET /{id}"]
      - name: create
        payload:
          type: object
          fields:
            - name: name
              type: string
              required: true
              min_length: 2
            - name: tags
              type: array<string>
            - name: trace
              type: string
        result:
          type: string
        http:
          routes: ["POST /"]
          params:
            - attribute: trace
              in: header
              name: X-Trace
          body: [name, tags]
"#;

    fn setup() -> (ServiceModel, crate::binding::Resolution) {
        let model = parse_model(MODEL, ModelFormat::Yaml).unwrap();
        let res = resolve(&model, &SchemeRegistry::from_model(&model));
        assert!(res.is_clean(), "{:?}", res.failures);
        (model, res)
    }

    fn params(pairs: &[(&str, &str)]) -> ParamVec {
        pairs
            .iter()
            .map(|(k, v)| (Arc::<str>::from(*k), (*v).to_string()))
            .collect()
    }

    #[test]
    fn path_and_query_decode() {
        let (model, res) = setup();
        let ep = res.endpoint("items", "get").unwrap();
        let req = Request::builder()
            .uri("/items/42?verbose=true")
            .body(Vec::new())
            .unwrap();
        let params = params(&[("id", "42")]);
        let payload = decode_request(&model, ep, &req, &params, &EncoderSet::default()).unwrap();
        assert_eq!(payload.get("id"), Some(&TypedValue::Int(42)));
        assert_eq!(payload.get("verbose"), Some(&TypedValue::Bool(true)));
    }

    #[test]
    fn non_numeric_id_is_invalid_field_type() {
        let (model, res) = setup();
        let ep = res.endpoint("items", "get").unwrap();
        let req = Request::builder().uri("/items/abc").body(Vec::new()).unwrap();
        let params = params(&[("id", "abc")]);
        let err = decode_request(&model, ep, &req, &params, &EncoderSet::default()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidFieldType { ref field, .. } if field == "id"));
    }

    #[test]
    fn build_places_header_and_body() {
        let (model, res) = setup();
        let ep = res.endpoint("items", "create").unwrap();
        let payload = TypedValue::object([
            ("name", TypedValue::string("lamp")),
            ("tags", TypedValue::Array(vec![TypedValue::string("x")])),
            ("trace", TypedValue::string("t-1")),
        ]);
        let req = build_request(&model, ep, 0, &payload, &EncoderSet::default()).unwrap();
        assert_eq!(req.uri().path(), "/items");
        assert_eq!(req.headers()["x-trace"], "t-1");
        let body: Value = serde_json::from_slice(req.body()).unwrap();
        assert_eq!(body, serde_json::json!({"name": "lamp", "tags": ["x"]}));

        let back =
            decode_request(&model, ep, &req, &ParamVec::new(), &EncoderSet::default()).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn body_validation_runs() {
        let (model, res) = setup();
        let ep = res.endpoint("items", "create").unwrap();
        let req = Request::builder()
            .method("POST")
            .uri("/items")
            .header("content-type", "application/json")
            .body(br#"{"name":"x"}"#.to_vec())
            .unwrap();
        let err = decode_request(&model, ep, &req, &ParamVec::new(), &EncoderSet::default())
            .unwrap_err();
        assert!(matches!(err, DecodeError::InvalidLength { .. }), "{err:?}");
    }

    #[test]
    fn missing_required_body_attribute() {
        let (model, res) = setup();
        let ep = res.endpoint("items", "create").unwrap();
        let req = Request::builder().method("POST").uri("/items").body(Vec::new()).unwrap();
        let err = decode_request(&model, ep, &req, &ParamVec::new(), &EncoderSet::default())
            .unwrap_err();
        assert_eq!(
            err,
            DecodeError::MissingField {
                field: "name".into(),
                location: "body".into()
            }
        );
    }

    #[test]
    fn wrong_payload_shape_fails_before_building() {
        let (model, res) = setup();
        let ep = res.endpoint("items", "get").unwrap();
        let payload = TypedValue::object([("id", TypedValue::string("42"))]);
        assert!(matches!(
            build_request(&model, ep, 0, &payload, &EncoderSet::default()),
            Err(BuildError::TypeMismatch { .. })
        ));
        assert!(matches!(
            build_request(&model, ep, 3, &payload, &EncoderSet::default()),
            Err(BuildError::UnknownRoute { index: 3, .. })
        ));
    }
}
