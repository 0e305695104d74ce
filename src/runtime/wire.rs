//! Typed request helpers.
//!
//! Generated decoders and request builders call these with concrete Rust
//! types; the interpretive codecs in [`super::request`] reuse the same
//! credential and query handling.

use super::encoding::{Encoder, EncoderSet};
use super::error::{BuildError, DecodeError, GenericError, ERROR_NAME_HEADER};
use super::format::{list_parts, list_texts, unescape, WireValue};
use crate::router::ParamVec;
use base64::Engine as _;
use http::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, Method, Request, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

fn invalid<T: WireValue>(field: &str, raw: &str) -> DecodeError {
    DecodeError::InvalidFieldType {
        field: field.to_string(),
        expected: T::PRIMITIVE.name().to_string(),
        received: raw.to_string(),
    }
}

fn parse<T: WireValue>(field: &str, raw: &str) -> Result<T, DecodeError> {
    T::from_wire(raw).ok_or_else(|| invalid::<T>(field, raw))
}

/// Raw (still escaped) value of a path parameter. Later occurrences win.
#[must_use]
pub fn raw_path_param<'a>(params: &'a ParamVec, name: &str) -> Option<&'a str> {
    params
        .iter()
        .rfind(|(k, _)| k.as_ref() == name)
        .map(|(_, v)| v.as_str())
}

/// Decode one path parameter.
///
/// # Errors
///
/// [`DecodeError::MissingField`] when the router did not capture it,
/// [`DecodeError::InvalidFieldType`] when it does not parse.
pub fn path_value<T: WireValue>(params: &ParamVec, name: &str) -> Result<T, DecodeError> {
    let raw = raw_path_param(params, name).ok_or_else(|| DecodeError::MissingField {
        field: name.to_string(),
        location: "path".to_string(),
    })?;
    let text = unescape(raw).ok_or_else(|| invalid::<T>(name, raw))?;
    parse(name, &text)
}

/// Decode a comma separated path parameter.
///
/// # Errors
///
/// As [`path_value`], for every element.
pub fn path_values<T: WireValue>(params: &ParamVec, name: &str) -> Result<Vec<T>, DecodeError> {
    let raw = raw_path_param(params, name).ok_or_else(|| DecodeError::MissingField {
        field: name.to_string(),
        location: "path".to_string(),
    })?;
    raw.split(',')
        .map(|part| {
            let text = unescape(part).ok_or_else(|| invalid::<T>(name, part))?;
            parse(name, &text)
        })
        .collect()
}

/// Decoded query pairs in request order.
#[must_use]
pub fn query_pairs<B>(req: &Request<B>) -> Vec<(String, String)> {
    req.uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

/// First value of a query key.
///
/// # Errors
///
/// [`DecodeError::InvalidFieldType`] when the value does not parse.
pub fn query_value<T: WireValue, B>(
    req: &Request<B>,
    name: &str,
) -> Result<Option<T>, DecodeError> {
    query_pairs(req)
        .into_iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| parse(name, &v))
        .transpose()
}

/// All values of a repeated query key; `None` when the key is absent. A
/// key present with an empty value is the empty list.
///
/// # Errors
///
/// [`DecodeError::InvalidFieldType`] when any value does not parse.
pub fn query_values<T: WireValue, B>(
    req: &Request<B>,
    name: &str,
) -> Result<Option<Vec<T>>, DecodeError> {
    let values: Vec<String> = query_pairs(req)
        .into_iter()
        .filter(|(k, _)| k == name)
        .map(|(_, v)| v)
        .collect();
    parse_list(name, &values)
}

fn parse_list<T: WireValue>(name: &str, values: &[String]) -> Result<Option<Vec<T>>, DecodeError> {
    if values.is_empty() {
        return Ok(None);
    }
    list_parts(values, T::PRIMITIVE)
        .into_iter()
        .map(|v| parse(name, v))
        .collect::<Result<_, _>>()
        .map(Some)
}

/// Values of a header in a request or response, as text and in order.
///
/// # Errors
///
/// [`DecodeError::InvalidFieldType`] for values that are not visible ASCII.
pub fn texts_of(headers: &HeaderMap, name: &str) -> Result<Vec<String>, DecodeError> {
    headers
        .get_all(name)
        .iter()
        .map(|v| {
            v.to_str().map(str::to_string).map_err(|_| DecodeError::InvalidFieldType {
                field: name.to_string(),
                expected: "text header".to_string(),
                received: String::from_utf8_lossy(v.as_bytes()).into_owned(),
            })
        })
        .collect()
}

/// Request header values as text, in order.
///
/// # Errors
///
/// As [`texts_of`].
pub fn header_texts<B>(req: &Request<B>, name: &str) -> Result<Vec<String>, DecodeError> {
    texts_of(req.headers(), name)
}

/// # Errors
///
/// [`DecodeError::InvalidFieldType`] when the header does not parse.
pub fn header_value_of<T: WireValue>(
    headers: &HeaderMap,
    name: &str,
) -> Result<Option<T>, DecodeError> {
    texts_of(headers, name)?
        .first()
        .map(|v| parse(name, v))
        .transpose()
}

/// One element per header value. Numbers and booleans may also be comma
/// separated inside a value; other elements are taken verbatim.
///
/// # Errors
///
/// [`DecodeError::InvalidFieldType`] when any element does not parse.
pub fn header_values_of<T: WireValue>(
    headers: &HeaderMap,
    name: &str,
) -> Result<Option<Vec<T>>, DecodeError> {
    parse_list(name, &texts_of(headers, name)?)
}

/// # Errors
///
/// [`DecodeError::InvalidFieldType`] when the header does not parse.
pub fn header_value<T: WireValue, B>(
    req: &Request<B>,
    name: &str,
) -> Result<Option<T>, DecodeError> {
    header_value_of(req.headers(), name)
}

/// # Errors
///
/// [`DecodeError::InvalidFieldType`] when any element does not parse.
pub fn header_values<T: WireValue, B>(
    req: &Request<B>,
    name: &str,
) -> Result<Option<Vec<T>>, DecodeError> {
    header_values_of(req.headers(), name)
}

/// Token with an optional `Bearer` scheme prefix removed.
#[must_use]
pub fn strip_bearer(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token.trim(),
        _ => trimmed,
    }
}

/// Bearer token from a header (normally `Authorization`).
///
/// # Errors
///
/// [`DecodeError::InvalidFieldType`] for non-text header values.
pub fn bearer_token<B>(req: &Request<B>, name: &str) -> Result<Option<String>, DecodeError> {
    Ok(header_texts(req, name)?
        .first()
        .map(|v| strip_bearer(v).to_string()))
}

/// `Basic <base64(user:password)>` header value.
#[must_use]
pub fn basic_header(username: &str, password: &str) -> String {
    let encoded =
        base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {encoded}")
}

/// Parse a `Basic` authorization value into username and password.
#[must_use]
pub fn parse_basic(raw: &str) -> Option<(String, String)> {
    let (scheme, encoded) = raw.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (user, pass) = text.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

/// Basic credentials from a header.
///
/// # Errors
///
/// [`DecodeError::InvalidFieldType`] when the header is not a valid `Basic`
/// value.
pub fn basic_credentials<B>(
    req: &Request<B>,
    name: &str,
) -> Result<Option<(String, String)>, DecodeError> {
    let Some(raw) = header_texts(req, name)?.into_iter().next() else {
        return Ok(None);
    };
    parse_basic(&raw)
        .map(Some)
        .ok_or_else(|| DecodeError::InvalidFieldType {
            field: name.to_string(),
            expected: "basic credentials".to_string(),
            received: raw,
        })
}

/// Decoder for a body, chosen by `Content-Type`.
///
/// # Errors
///
/// [`DecodeError::UnsupportedContentType`] when no decoder matches.
pub fn decoder_for<'a>(
    headers: &HeaderMap,
    encoders: &'a EncoderSet,
) -> Result<&'a dyn Encoder, DecodeError> {
    match headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
        Some(ct) => encoders
            .for_content_type(ct)
            .ok_or_else(|| DecodeError::UnsupportedContentType {
                content_type: ct.to_string(),
            }),
        None => Ok(encoders.default_encoder()),
    }
}

/// Decoder for the request body.
///
/// # Errors
///
/// As [`decoder_for`].
pub fn body_decoder<'a>(
    req: &Request<Vec<u8>>,
    encoders: &'a EncoderSet,
) -> Result<&'a dyn Encoder, DecodeError> {
    decoder_for(req.headers(), encoders)
}

fn body_of<T: DeserializeOwned>(
    headers: &HeaderMap,
    bytes: &[u8],
    encoders: &EncoderSet,
) -> Result<Option<T>, DecodeError> {
    if bytes.is_empty() {
        return Ok(None);
    }
    let value = decoder_for(headers, encoders)?.decode(bytes)?;
    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| DecodeError::InvalidBody {
            reason: e.to_string(),
        })
}

/// Decode the request body into `T`; `None` for an empty body.
///
/// # Errors
///
/// [`DecodeError::InvalidBody`] when the body is malformed or does not match
/// `T`, [`DecodeError::UnsupportedContentType`] for unknown media types.
pub fn body<T: DeserializeOwned>(
    req: &Request<Vec<u8>>,
    encoders: &EncoderSet,
) -> Result<Option<T>, DecodeError> {
    body_of(req.headers(), req.body(), encoders)
}

/// Decode a response body into `T`; `None` for an empty body.
///
/// # Errors
///
/// As [`body`].
pub fn response_body<T: DeserializeOwned>(
    resp: &Response<Vec<u8>>,
    encoders: &EncoderSet,
) -> Result<Option<T>, DecodeError> {
    body_of(resp.headers(), resp.body(), encoders)
}

/// Remove `name` from a decoded body object. `null` reads as absent.
///
/// # Errors
///
/// [`DecodeError::InvalidFieldType`] when the value does not match `T`.
pub fn body_field<T: DeserializeOwned>(
    body: &mut Map<String, Value>,
    name: &str,
) -> Result<Option<T>, DecodeError> {
    match body.remove(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            let received = value.to_string();
            serde_json::from_value(value)
                .map(Some)
                .map_err(|e| DecodeError::InvalidFieldType {
                    field: name.to_string(),
                    expected: e.to_string(),
                    received,
                })
        }
    }
}

/// Error name marker of a response, if it carries one.
#[must_use]
pub fn error_name<B>(resp: &Response<B>) -> Option<&str> {
    resp.headers()
        .get(ERROR_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
}

/// Generic error carried by a response. The formatted `ServiceError` body
/// is used when it decodes; otherwise the status decides the flags and the
/// body text becomes the message.
#[must_use]
pub fn generic_error(resp: &Response<Vec<u8>>, encoders: &EncoderSet) -> GenericError {
    if let Ok(Some(err)) = response_body::<GenericError>(resp, encoders) {
        return err;
    }
    let status = resp.status().as_u16();
    let mut err = GenericError::new(
        error_name(resp).unwrap_or("unknown"),
        String::from_utf8_lossy(resp.body()).into_owned(),
    );
    err.fault = status >= 500;
    err.temporary = status == 503;
    err.timeout = status == 504;
    err
}

/// Fault for a response whose status the method does not declare.
#[must_use]
pub fn unexpected_response(resp: &Response<Vec<u8>>) -> GenericError {
    GenericError::fault(
        "invalid_response",
        format!(
            "unexpected status {}: {}",
            resp.status().as_u16(),
            String::from_utf8_lossy(resp.body())
        ),
    )
}

/// Turn an optional decoded value into a required one.
///
/// # Errors
///
/// [`DecodeError::MissingField`] when `value` is `None`.
pub fn required<T>(value: Option<T>, field: &str, location: &str) -> Result<T, DecodeError> {
    value.ok_or_else(|| DecodeError::MissingField {
        field: field.to_string(),
        location: location.to_string(),
    })
}

/// Client request under construction.
#[derive(Debug)]
pub struct RequestBuilder {
    verb: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<(Vec<u8>, &'static str)>,
}

impl RequestBuilder {
    #[must_use]
    pub fn new(verb: Method, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn query_text(&mut self, name: &str, value: String) -> &mut Self {
        self.query.push((name.to_string(), value));
        self
    }

    pub fn query<T: WireValue>(&mut self, name: &str, value: &T) -> &mut Self {
        self.query_text(name, value.to_wire())
    }

    /// Repeats the key once per element. The empty list is the key with an
    /// empty value.
    pub fn query_list<T: WireValue>(&mut self, name: &str, values: &[T]) -> &mut Self {
        for text in list_texts(values.iter().map(WireValue::to_wire).collect()) {
            self.query_text(name, text);
        }
        self
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

    /// Adds the `Bearer` prefix unless the token already carries a scheme.
    pub fn bearer(&mut self, name: &str, token: &str) -> &mut Self {
        let value = if token.contains(' ') {
            token.to_string()
        } else {
            format!("Bearer {token}")
        };
        self.header_text(name, value)
    }

    pub fn basic(&mut self, username: &str, password: &str) -> &mut Self {
        self.header_text(AUTHORIZATION.as_str(), basic_header(username, password))
    }

    /// Encode `value` as the body.
    ///
    /// # Errors
    ///
    /// [`BuildError::Encode`] when serialisation fails.
    pub fn body<T: Serialize>(
        &mut self,
        value: &T,
        encoder: &dyn Encoder,
    ) -> Result<&mut Self, BuildError> {
        let json = serde_json::to_value(value).map_err(super::error::EncodeError::from)?;
        self.json_body(&json, encoder)
    }

    /// # Errors
    ///
    /// [`BuildError::Encode`] when the encoder rejects the value.
    pub fn json_body(
        &mut self,
        value: &serde_json::Value,
        encoder: &dyn Encoder,
    ) -> Result<&mut Self, BuildError> {
        self.body = Some((encoder.encode(value)?, encoder.content_type()));
        Ok(self)
    }

    /// URI with the query string appended.
    #[must_use]
    pub fn uri(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{}?{}", self.path, query)
    }

    /// # Errors
    ///
    /// [`BuildError::Http`] for invalid header names, values or URIs.
    pub fn build(&self) -> Result<Request<Vec<u8>>, BuildError> {
        let mut builder = Request::builder().method(self.verb.clone()).uri(self.uri());
        for (name, value) in &self.headers {
            builder = builder.header(
                HeaderName::from_bytes(name.as_bytes()).map_err(http::Error::from)?,
                HeaderValue::from_str(value).map_err(http::Error::from)?,
            );
        }
        let body = match &self.body {
            Some((bytes, content_type)) => {
                builder = builder.header(CONTENT_TYPE, *content_type);
                bytes.clone()
            }
            None => Vec::new(),
        };
        Ok(builder.body(body)?)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use std::sync::Arc;

    fn params(pairs: &[(&str, &str)]) -> ParamVec {
        pairs
            .iter()
            .map(|(k, v)| (Arc::<str>::from(*k), (*v).to_string()))
            .collect()
    }

    #[test]
    fn path_values_parse_and_unescape() {
        let p = params(&[("id", "42"), ("name", "a%20b"), ("ids", "1,2,3")]);
        assert_eq!(path_value::<i64>(&p, "id").unwrap(), 42);
        assert_eq!(path_value::<String>(&p, "name").unwrap(), "a b");
        assert_eq!(path_values::<u32>(&p, "ids").unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            path_value::<i64>(&params(&[("id", "abc")]), "id"),
            Err(DecodeError::InvalidFieldType { .. })
        ));
    }

    #[test]
    fn query_and_headers() {
        let req = Request::builder()
            .uri("/x?tag=a&tag=b&limit=10")
            .header("x-ids", "1, 2")
            .header("authorization", "Bearer abc.def")
            .body(Vec::<u8>::new())
            .unwrap();
        assert_eq!(query_value::<i32, _>(&req, "limit").unwrap(), Some(10));
        assert_eq!(
            query_values::<String, _>(&req, "tag").unwrap(),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(query_value::<i32, _>(&req, "missing").unwrap(), None);
        assert_eq!(header_values::<u64, _>(&req, "x-ids").unwrap(), Some(vec![1, 2]));
        assert_eq!(
            bearer_token(&req, "authorization").unwrap().as_deref(),
            Some("abc.def")
        );
    }

    #[test]
    fn header_lists_keep_string_elements_verbatim() {
        let mut b = RequestBuilder::new(Method::GET, "/x");
        b.header_list("x-labels", &["a,b".to_string(), " c".to_string()]);
        let req = b.build().unwrap();
        assert_eq!(req.headers().get_all("x-labels").iter().count(), 2);
        assert_eq!(
            header_values::<String, _>(&req, "x-labels").unwrap(),
            Some(vec!["a,b".to_string(), " c".to_string()])
        );
    }

    #[test]
    fn empty_lists_are_present_but_empty() {
        let mut b = RequestBuilder::new(Method::GET, "/x");
        b.query_list::<i64>("ids", &[]).header_list::<String>("x-tags", &[]);
        let req = b.build().unwrap();
        assert_eq!(req.uri().to_string(), "/x?ids=");
        assert_eq!(query_values::<i64, _>(&req, "ids").unwrap(), Some(vec![]));
        assert_eq!(header_values::<String, _>(&req, "x-tags").unwrap(), Some(vec![]));
        assert_eq!(query_values::<i64, _>(&req, "other").unwrap(), None);
    }

    #[test]
    fn response_helpers() {
        let resp = Response::builder()
            .status(503)
            .header(ERROR_NAME_HEADER, "busy")
            .body(b"try later".to_vec())
            .unwrap();
        assert_eq!(error_name(&resp), Some("busy"));
        let err = generic_error(&resp, &EncoderSet::default());
        assert_eq!(err.name, "busy");
        assert!(err.temporary && err.fault);
        assert_eq!(unexpected_response(&resp).name, "invalid_response");

        let mut body: Map<String, Value> =
            serde_json::from_str(r#"{"n": 3, "gone": null}"#).unwrap();
        assert_eq!(body_field::<u32>(&mut body, "n").unwrap(), Some(3));
        assert_eq!(body_field::<u32>(&mut body, "gone").unwrap(), None);
        assert!(body.is_empty());
    }

    #[test]
    fn basic_credentials_round_trip() {
        let header = basic_header("alice", "s3cr:et");
        assert_eq!(
            parse_basic(&header),
            Some(("alice".to_string(), "s3cr:et".to_string()))
        );
        assert_eq!(parse_basic("Bearer x"), None);
    }

    #[test]
    fn builder_assembles_request() {
        let mut b = RequestBuilder::new(Method::GET, "/items/42");
        b.query("q", &"a b".to_string()).query_list("n", &[1i32, 2]).bearer("Authorization", "tok");
        let req = b.build().unwrap();
        assert_eq!(req.uri().to_string(), "/items/42?q=a+b&n=1&n=2");
        assert_eq!(req.headers()["authorization"], "Bearer tok");
    }
}
