//! Response and error encoding, and the client side response decoder.

use super::encoding::{Encoder, EncoderSet};
use super::error::{
    DecodeError, EncodeError, ErrorFormatter, ErrorValue, GenericError, ERROR_NAME_HEADER,
};
use super::format::{format_scalar, list_texts, WireValue};
use super::request::decode_texts;
use super::validate::validate;
use super::value::TypedValue;
use super::wire::{decoder_for, error_name, generic_error, texts_of, unexpected_response};
use crate::binding::{BodyShape, EndpointBinding, ErrorBinding, HeaderBinding, ResponseBinding};
use crate::model::{AttributeType, ServiceModel, Validation};
use http::header::{HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use http::{Request, Response, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{trace, warn};

/// `Accept` header of a request, if it is text.
#[must_use]
pub fn accept_header<B>(req: &Request<B>) -> Option<&str> {
    req.headers().get(ACCEPT).and_then(|v| v.to_str().ok())
}

/// Encoder for a response body. A forced content type wins over the
/// `Accept` header.
///
/// # Errors
///
/// [`EncodeError::UnsupportedContentType`] when the forced type has no
/// encoder.
pub fn response_encoder<'a>(
    encoders: &'a EncoderSet,
    accept: Option<&str>,
    forced: Option<&str>,
) -> Result<&'a dyn Encoder, EncodeError> {
    match forced {
        Some(ct) => encoders
            .for_content_type(ct)
            .ok_or_else(|| EncodeError::UnsupportedContentType(ct.to_string())),
        None => Ok(encoders.negotiate(accept)),
    }
}

/// Response under construction.
#[derive(Debug)]
pub struct ResponseBuilder {
    status: u16,
    headers: Vec<(String, String)>,
    body: Option<(Vec<u8>, String)>,
}

impl ResponseBuilder {
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header_text(&mut self, name: &str, value: String) -> &mut Self {
        self.headers.push((name.to_string(), value));
        self
    }

    pub fn header<T: WireValue>(&mut self, name: &str, value: &T) -> &mut Self {
        self.header_text(name, value.to_wire())
    }

    /// One header value per element; the empty list is a single empty value.
    pub fn header_list<T: WireValue>(&mut self, name: &str, values: &[T]) -> &mut Self {
        for text in list_texts(values.iter().map(WireValue::to_wire).collect()) {
            self.header_text(name, text);
        }
        self
    }

    /// Sets the marker header naming the error this response encodes.
    pub fn error_name(&mut self, name: &str) -> &mut Self {
        self.header_text(ERROR_NAME_HEADER, name.to_string())
    }

    /// # Errors
    ///
    /// Fails when `value` cannot be serialised or encoded.
    pub fn body<T: Serialize>(
        &mut self,
        value: &T,
        encoder: &dyn Encoder,
        content_type: Option<&str>,
    ) -> Result<&mut Self, EncodeError> {
        let json = serde_json::to_value(value)?;
        self.json_body(&json, encoder, content_type)
    }

    /// `content_type` replaces the encoder's own media type in the
    /// `Content-Type` header (forced content types keep their parameters).
    ///
    /// # Errors
    ///
    /// Fails when the encoder rejects the value.
    pub fn json_body(
        &mut self,
        value: &Value,
        encoder: &dyn Encoder,
        content_type: Option<&str>,
    ) -> Result<&mut Self, EncodeError> {
        let bytes = encoder.encode(value)?;
        let ct = content_type.unwrap_or(encoder.content_type()).to_string();
        self.body = Some((bytes, ct));
        Ok(self)
    }

    /// # Errors
    ///
    /// [`EncodeError::Http`] for an invalid status, header name or value.
    pub fn finish(&self) -> Result<Response<Vec<u8>>, EncodeError> {
        let mut builder = Response::builder().status(self.status);
        for (name, value) in &self.headers {
            builder = builder.header(
                HeaderName::from_bytes(name.as_bytes()).map_err(http::Error::from)?,
                HeaderValue::from_str(value).map_err(http::Error::from)?,
            );
        }
        let body = match &self.body {
            Some((bytes, ct)) => {
                let value = HeaderValue::from_str(ct).map_err(http::Error::from)?;
                builder = builder.header(CONTENT_TYPE, value);
                bytes.clone()
            }
            None => Vec::new(),
        };
        Ok(builder.body(body)?)
    }
}

fn header_texts(field: &str, value: &TypedValue) -> Result<Vec<String>, EncodeError> {
    let scalar = |v: &TypedValue| {
        format_scalar(v).ok_or_else(|| EncodeError::Value {
            field: field.to_string(),
            reason: format!("{} cannot be written to a header", v.kind()),
        })
    };
    match value {
        TypedValue::Array(items) => {
            Ok(list_texts(items.iter().map(scalar).collect::<Result<_, _>>()?))
        }
        other => Ok(vec![scalar(other)?]),
    }
}

/// Headers, body and content type shared by result and error encoding.
#[allow(clippy::too_many_arguments)]
fn encode_parts(
    builder: &mut ResponseBuilder,
    headers: &[HeaderBinding],
    body: &BodyShape,
    content_type: Option<&str>,
    value: &TypedValue,
    accept: Option<&str>,
    encoders: &EncoderSet,
) -> Result<(), EncodeError> {
    for hb in headers {
        let v = match &hb.attribute {
            Some(attr) => value.get(attr),
            None => Some(value),
        };
        match v {
            Some(v) => {
                for text in header_texts(hb.attribute.as_deref().unwrap_or(&hb.name), v)? {
                    builder.header_text(&hb.name, text);
                }
            }
            None if hb.required => {
                return Err(EncodeError::Value {
                    field: hb.attribute.clone().unwrap_or_else(|| hb.name.clone()),
                    reason: format!("required header {} has no value", hb.name),
                })
            }
            None => {}
        }
    }
    let json = match body {
        BodyShape::None => return Ok(()),
        BodyShape::Whole => value.to_json(),
        BodyShape::Attribute(name) => match value.get(name) {
            Some(v) => v.to_json(),
            None => return Ok(()),
        },
        BodyShape::Object(names) => {
            let mut out = Map::new();
            for name in names {
                if let Some(v) = value.get(name) {
                    out.insert(name.clone(), v.to_json());
                }
            }
            Value::Object(out)
        }
    };
    let encoder = response_encoder(encoders, accept, content_type)?;
    builder.json_body(&json, encoder, content_type)?;
    Ok(())
}

/// Success response `result` selects: the first tagged response whose tag
/// attribute holds the tag value, else the untagged one.
#[must_use]
pub fn select_response<'a>(
    endpoint: &'a EndpointBinding,
    result: &TypedValue,
) -> Option<&'a ResponseBinding> {
    endpoint
        .responses
        .iter()
        .find(|r| {
            r.tag.as_ref().is_some_and(|tag| {
                result
                    .get(&tag.attribute)
                    .and_then(format_scalar)
                    .is_some_and(|v| v == tag.value)
            })
        })
        .or_else(|| endpoint.responses.iter().find(|r| r.tag.is_none()))
}

/// Encode a method result.
///
/// # Errors
///
/// [`EncodeError::Value`] when no response matches or a required header is
/// missing, plus any body encoding failure.
pub fn encode_result(
    endpoint: &EndpointBinding,
    result: &TypedValue,
    accept: Option<&str>,
    encoders: &EncoderSet,
) -> Result<Response<Vec<u8>>, EncodeError> {
    let response = select_response(endpoint, result).ok_or_else(|| EncodeError::Value {
        field: endpoint.method_name.clone(),
        reason: "result matches no tagged response and there is no default response".to_string(),
    })?;
    let mut builder = ResponseBuilder::new(response.status);
    encode_parts(
        &mut builder,
        &response.headers,
        &response.body,
        response.content_type.as_deref(),
        result,
        accept,
        encoders,
    )?;
    builder.finish()
}

fn encode_named(
    binding: &ErrorBinding,
    value: &TypedValue,
    accept: Option<&str>,
    encoders: &EncoderSet,
) -> Result<Response<Vec<u8>>, EncodeError> {
    let mut builder = ResponseBuilder::new(binding.status);
    builder.error_name(&binding.name);
    encode_parts(
        &mut builder,
        &binding.headers,
        &binding.body,
        binding.content_type.as_deref(),
        value,
        accept,
        encoders,
    )?;
    builder.finish()
}

/// Encode an error produced by a method.
///
/// Named errors the endpoint declares use their binding; everything else
/// goes through [`encode_generic_error`]. Never fails: encoding problems
/// degrade to a generic fault response.
pub fn encode_error(
    endpoint: &EndpointBinding,
    err: &ErrorValue<TypedValue>,
    accept: Option<&str>,
    encoders: &EncoderSet,
    formatter: &dyn ErrorFormatter,
) -> Response<Vec<u8>> {
    let generic = match err {
        ErrorValue::Named { name, value } => match endpoint.error(name) {
            Some(binding) => match encode_named(binding, value, accept, encoders) {
                Ok(resp) => return resp,
                Err(e) => {
                    warn!(error = %name, reason = %e, "error encoding failed, sending a fault");
                    GenericError::fault("encoding", e.to_string())
                }
            },
            None => {
                let message = value
                    .get("message")
                    .and_then(TypedValue::as_str)
                    .map_or_else(|| value.to_json().to_string(), str::to_string);
                GenericError::fault(name.clone(), message)
            }
        },
        ErrorValue::Generic(g) => g.clone(),
    };
    encode_generic_error(&generic, accept, encoders, formatter)
}

/// Encode an error without a declared mapping. Always carries the marker
/// header; falls back to a plain text body if the formatted body cannot be
/// encoded.
pub fn encode_generic_error(
    err: &GenericError,
    accept: Option<&str>,
    encoders: &EncoderSet,
    formatter: &dyn ErrorFormatter,
) -> Response<Vec<u8>> {
    let formatted = formatter.format(err);
    let mut builder = ResponseBuilder::new(formatted.status);
    builder.error_name(&err.name);
    let encoded = builder
        .json_body(&formatted.body, encoders.negotiate(accept), None)
        .map(|_| ())
        .and_then(|()| builder.finish());
    match encoded {
        Ok(resp) => resp,
        Err(e) => {
            warn!(error = %err.name, reason = %e, "falling back to a plain text error body");
            plain_text_error(formatted.status, &err.name, err.to_string())
        }
    }
}

fn plain_text_error(status: u16, name: &str, message: String) -> Response<Vec<u8>> {
    let mut resp = Response::new(message.into_bytes());
    *resp.status_mut() = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    let marker = HeaderValue::from_str(name).unwrap_or_else(|_| HeaderValue::from_static("error"));
    resp.headers_mut()
        .insert(HeaderName::from_static(ERROR_NAME_HEADER), marker);
    resp
}

/// Result or error value read back from the headers and body of a response.
fn decode_parts(
    model: &ServiceModel,
    ty: &AttributeType,
    headers: &[HeaderBinding],
    body: &BodyShape,
    resp: &Response<Vec<u8>>,
    encoders: &EncoderSet,
) -> Result<TypedValue, DecodeError> {
    let field_ty = |name: &str| {
        model
            .fields(ty)
            .and_then(|fields| fields.iter().find(|f| f.name == name))
            .map(|f| &f.attribute.ty)
    };
    let mut fields = BTreeMap::new();
    let mut whole = None;

    for hb in headers {
        let label = hb.attribute.as_deref().unwrap_or(&hb.name);
        let texts = texts_of(resp.headers(), &hb.name)?;
        match decode_texts(model, &hb.ty, label, &texts)? {
            Some(value) => match &hb.attribute {
                Some(attr) => {
                    fields.insert(attr.clone(), value);
                }
                None => whole = Some(value),
            },
            None if hb.required => {
                return Err(DecodeError::MissingField {
                    field: label.to_string(),
                    location: "header".to_string(),
                })
            }
            None => {}
        }
    }

    if !body.is_none() && !resp.body().is_empty() {
        let encoder = decoder_for(resp.headers(), encoders)?;
        let json = encoder.decode(resp.body())?;
        let lenient = encoder.is_lenient();
        match body {
            BodyShape::Whole => {
                whole = Some(TypedValue::from_json(model, ty, &json, "body", lenient)?);
            }
            BodyShape::Attribute(name) => {
                if let Some(fty) = field_ty(name.as_str()) {
                    let value = TypedValue::from_json(model, fty, &json, name, lenient)?;
                    fields.insert(name.clone(), value);
                }
            }
            BodyShape::Object(names) => {
                let Value::Object(entries) = &json else {
                    return Err(DecodeError::InvalidFieldType {
                        field: "body".to_string(),
                        expected: "object".to_string(),
                        received: json.to_string(),
                    });
                };
                for name in names {
                    let (Some(fty), Some(v)) = (field_ty(name.as_str()), entries.get(name)) else {
                        continue;
                    };
                    if !v.is_null() {
                        let value = TypedValue::from_json(model, fty, v, name, lenient)?;
                        fields.insert(name.clone(), value);
                    }
                }
            }
            BodyShape::None => {}
        }
    }

    let value = match (whole, model.resolve(ty)) {
        (Some(value), _) => value,
        (None, AttributeType::Object(_) | AttributeType::Empty) => TypedValue::Object(fields),
        (None, _) => {
            return Err(DecodeError::MissingField {
                field: "body".to_string(),
                location: "body".to_string(),
            })
        }
    };
    if !ty.is_empty() {
        validate(model, ty, &Validation::default(), &value, "", "body")?;
    }
    Ok(value)
}

fn decode_named(
    model: &ServiceModel,
    binding: &ErrorBinding,
    resp: &Response<Vec<u8>>,
    encoders: &EncoderSet,
) -> ErrorValue<TypedValue> {
    match decode_parts(model, &binding.ty, &binding.headers, &binding.body, resp, encoders) {
        Ok(value) => ErrorValue::named(binding.name.clone(), value),
        Err(err) => err.into(),
    }
}

/// Decode a response to `endpoint` on the client side.
///
/// The error name marker picks the declared error it names; a marked
/// response naming no declared error is a generic error. Unmarked responses
/// are matched by status against the success responses, then against the
/// declared errors when exactly one uses that status. Anything else is an
/// `invalid_response` fault. Decode failures come back as generic errors.
///
/// # Errors
///
/// The error value the response carries.
pub fn decode_response(
    model: &ServiceModel,
    endpoint: &EndpointBinding,
    resp: &Response<Vec<u8>>,
    encoders: &EncoderSet,
) -> Result<TypedValue, ErrorValue<TypedValue>> {
    let status = resp.status().as_u16();
    trace!(
        service = %endpoint.service_name,
        method = %endpoint.method_name,
        status,
        "decoding response"
    );
    if let Some(name) = error_name(resp) {
        return Err(match endpoint.error(name).filter(|b| b.status == status) {
            Some(binding) => decode_named(model, binding, resp, encoders),
            None => ErrorValue::Generic(generic_error(resp, encoders)),
        });
    }
    if let Some(response) = endpoint.responses.iter().find(|r| r.status == status) {
        return decode_parts(
            model,
            &endpoint.result_type,
            &response.headers,
            &response.body,
            resp,
            encoders,
        )
        .map_err(ErrorValue::from);
    }
    let mut declared = endpoint.errors.iter().filter(|e| e.status == status);
    match (declared.next(), declared.next()) {
        (Some(binding), None) => Err(decode_named(model, binding, resp, encoders)),
        _ => Err(ErrorValue::Generic(unexpected_response(resp))),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::binding::{resolve, Resolution, SchemeRegistry};
    use crate::model::{parse_model, ModelFormat};
    use crate::runtime::DefaultErrorFormatter;

    const MODEL: &str = r#"
api:
  name: shop
  errors:
    - { name: unavailable, temporary: true }
types:
  - name: Item
    fields:
      - { name: id, type: int, required: true }
      - { name: name, type: string }
      - { name: etag, type: string }
services:
  - name: items
    errors:
      - { name: bad_request, type: string }
    http:
      errors:
        - { name: bad_request, status: 400, body: none, headers: ["X-Reason"] }
    methods:
      - name: show
        payload: { fields: [{ name: id, type: int, required: true }] }
        result: { type: Item }
        errors:
          - { name: not_found, type: string }
        http:
          routes: ["GET /items/{id}"]
          responses: [{ status: 200, headers: ["etag:ETag"] }]
          errors:
            - { name: not_found, status: 404, content_type: application/xml }
"#;

    fn setup() -> Resolution {
        let model = parse_model(MODEL, ModelFormat::Yaml).unwrap();
        let res = resolve(&model, &SchemeRegistry::from_model(&model));
        assert!(res.is_clean(), "{:?}", res.failures);
        res
    }

    #[test]
    fn result_headers_and_body() {
        let res = setup();
        let ep = res.endpoint("items", "show").unwrap();
        let result = TypedValue::object([
            ("id", TypedValue::Int(1)),
            ("name", TypedValue::string("lamp")),
            ("etag", TypedValue::string("v1")),
        ]);
        let resp = encode_result(ep, &result, None, &EncoderSet::default()).unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["etag"], "v1");
        let body: Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body, serde_json::json!({"id": 1, "name": "lamp"}));
    }

    #[test]
    fn header_only_error() {
        let res = setup();
        let ep = res.endpoint("items", "show").unwrap();
        let err = ErrorValue::named("bad_request", TypedValue::string("id too large"));
        let resp = encode_error(ep, &err, None, &EncoderSet::default(), &DefaultErrorFormatter);
        assert_eq!(resp.status(), 400);
        assert_eq!(resp.headers()[ERROR_NAME_HEADER], "bad_request");
        assert_eq!(resp.headers()["x-reason"], "id too large");
        assert!(resp.body().is_empty());
    }

    #[test]
    fn forced_content_type_beats_accept() {
        let res = setup();
        let ep = res.endpoint("items", "show").unwrap();
        let err = ErrorValue::named("not_found", TypedValue::string("gone"));
        let resp = encode_error(
            ep,
            &err,
            Some("application/json"),
            &EncoderSet::default(),
            &DefaultErrorFormatter,
        );
        assert_eq!(resp.status(), 404);
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/xml");
    }

    fn model() -> ServiceModel {
        parse_model(MODEL, ModelFormat::Yaml).unwrap()
    }

    #[test]
    fn client_reads_back_results_and_named_errors() {
        let (model, res) = (model(), setup());
        let ep = res.endpoint("items", "show").unwrap();
        let encoders = EncoderSet::default();
        let result = TypedValue::object([
            ("id", TypedValue::Int(1)),
            ("etag", TypedValue::string("v1")),
        ]);
        let resp = encode_result(ep, &result, None, &encoders).unwrap();
        assert_eq!(decode_response(&model, ep, &resp, &encoders), Ok(result));

        let err = ErrorValue::named("bad_request", TypedValue::string("id too large"));
        let resp = encode_error(ep, &err, None, &encoders, &DefaultErrorFormatter);
        assert_eq!(decode_response(&model, ep, &resp, &encoders), Err(err));
    }

    #[test]
    fn client_reads_back_generic_and_unexpected_errors() {
        let (model, res) = (model(), setup());
        let ep = res.endpoint("items", "show").unwrap();
        let encoders = EncoderSet::default();
        let sent = GenericError::new("overloaded", "later").temporary();
        let resp = encode_generic_error(&sent, None, &encoders, &DefaultErrorFormatter);
        assert_eq!(
            decode_response(&model, ep, &resp, &encoders),
            Err(ErrorValue::Generic(sent))
        );

        let teapot = Response::builder().status(418).body(b"short and stout".to_vec()).unwrap();
        match decode_response(&model, ep, &teapot, &encoders) {
            Err(ErrorValue::Generic(err)) => {
                assert_eq!(err.name, "invalid_response");
                assert!(err.fault);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn undeclared_and_generic_errors_use_formatter() {
        let res = setup();
        let ep = res.endpoint("items", "show").unwrap();
        let err = ErrorValue::named("mystery", TypedValue::string("?"));
        let resp = encode_error(ep, &err, None, &EncoderSet::default(), &DefaultErrorFormatter);
        assert_eq!(resp.status(), 500);
        assert_eq!(resp.headers()[ERROR_NAME_HEADER], "mystery");

        let err: ErrorValue<TypedValue> =
            GenericError::new("unavailable", "later").temporary().into();
        let resp = encode_error(ep, &err, None, &EncoderSet::default(), &DefaultErrorFormatter);
        assert_eq!(resp.status(), 503);
        let body: Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body["name"], "unavailable");
        assert_eq!(body["temporary"], true);
    }
}
