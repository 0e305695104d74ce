// Code generated by httpbind-gen. DO NOT EDIT.
//! Client side HTTP transport of the `orders` service.
#![allow(dead_code, unused_imports, unused_variables, unused_mut, clippy::all)]

use super::paths;
use super::types::*;
use httpbind::runtime::wire;
use httpbind::runtime::{BuildError, Bytes, DecodeError, EncoderSet, GenericError, RequestBuilder, WireValue};
use http::{Method, Request, Response};
use serde::{Deserialize, Serialize};

/// Build the `search` request.
pub fn build_search_request(payload: &SearchPayload, _encoders: &EncoderSet) -> Result<Request<Vec<u8>>, BuildError> {
    let mut builder = RequestBuilder::new(Method::GET, paths::search_orders_path(payload.store));
    if let Some(v) = &payload.serial {
        builder.query("serial", v);
    }
    if let Some(v) = &payload.page {
        builder.query("page", v);
    }
    if let Some(v) = &payload.weight {
        builder.query("weight", v);
    }
    if let Some(v) = &payload.filter {
        builder.query("filter", v);
    }
    builder.query_list("ids", &payload.ids);
    if let Some(v) = &payload.prices {
        builder.query_list("prices", v);
    }
    if let Some(v) = &payload.tags {
        builder.header_list("X-Tags", v);
    }
    builder.header_list("X-Labels", &payload.labels);
    builder.build()
}

/// Decode the response to a `search` request.
pub fn decode_search_response(resp: &Response<Vec<u8>>, encoders: &EncoderSet) -> Result<SearchResult, SearchError> {
    match (resp.status().as_u16(), wire::error_name(resp)) {
        (500, Some("locked")) => Err(SearchError::Locked(decode_search_locked_error(resp, encoders)?)),
        (503, Some("unavailable")) => Err(SearchError::Unavailable(decode_search_unavailable_error(resp, encoders)?)),
        (_, Some(_)) => Err(SearchError::Generic(wire::generic_error(resp, encoders))),
        (200, None) => Ok(decode_search_result_200(resp, encoders)?),
        (500, None) => Err(SearchError::Locked(decode_search_locked_error(resp, encoders)?)),
        (503, None) => Err(SearchError::Unavailable(decode_search_unavailable_error(resp, encoders)?)),
        _ => Err(SearchError::Generic(wire::unexpected_response(resp))),
    }
}

fn decode_search_locked_error(resp: &Response<Vec<u8>>, encoders: &EncoderSet) -> Result<String, DecodeError> {
    let value: Option<String> = wire::response_body(resp, encoders)?;
    wire::required(value, "body", "body")
}

fn decode_search_unavailable_error(resp: &Response<Vec<u8>>, encoders: &EncoderSet) -> Result<UnavailableError, DecodeError> {
    let mut body: serde_json::Map<String, serde_json::Value> = wire::response_body(resp, encoders)?.unwrap_or_default();
    let reason_value: Option<String> = wire::body_field(&mut body, "reason")?;
    let value = UnavailableError { reason: wire::required(reason_value, "reason", "body")? };
    value.validate("")?;
    Ok(value)
}

fn decode_search_result_200(resp: &Response<Vec<u8>>, encoders: &EncoderSet) -> Result<SearchResult, DecodeError> {
    let mut body: serde_json::Map<String, serde_json::Value> = wire::response_body(resp, encoders)?.unwrap_or_default();
    let total_value: Option<u64> = wire::body_field(&mut body, "total")?;
    let cursor_value: Option<String> = wire::header_value_of::<String>(resp.headers(), "X-Cursor")?;
    let orders_value: Option<Vec<Order>> = wire::body_field(&mut body, "orders")?;
    let value = SearchResult { total: wire::required(total_value, "total", "body")?, cursor: cursor_value, orders: wire::required(orders_value, "orders", "body")? };
    value.validate("")?;
    Ok(value)
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PlaceRequestBody {
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    #[serde(rename = "lines", default, skip_serializing_if = "Option::is_none")]
    lines: Option<Vec<Line>>,
    #[serde(rename = "note", default, skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

/// Build the `place` request.
pub fn build_place_request(payload: &Order, encoders: &EncoderSet) -> Result<Request<Vec<u8>>, BuildError> {
    let mut builder = RequestBuilder::new(Method::POST, paths::place_orders_path());
    let body = PlaceRequestBody { id: Some(payload.id.clone()), lines: Some(payload.lines.clone()), note: payload.note.clone() };
    builder.body(&body, encoders.default_encoder())?;
    builder.build()
}

/// Decode the response to a `place` request.
pub fn decode_place_response(resp: &Response<Vec<u8>>, encoders: &EncoderSet) -> Result<u64, PlaceError> {
    match (resp.status().as_u16(), wire::error_name(resp)) {
        (422, Some("rejected")) => Err(PlaceError::Rejected(decode_place_rejected_error(resp, encoders)?)),
        (500, Some("locked")) => Err(PlaceError::Locked(decode_place_locked_error(resp, encoders)?)),
        (503, Some("unavailable")) => Err(PlaceError::Unavailable(decode_place_unavailable_error(resp, encoders)?)),
        (_, Some(_)) => Err(PlaceError::Generic(wire::generic_error(resp, encoders))),
        (201, None) => Ok(decode_place_result_201(resp, encoders)?),
        (422, None) => Err(PlaceError::Rejected(decode_place_rejected_error(resp, encoders)?)),
        (500, None) => Err(PlaceError::Locked(decode_place_locked_error(resp, encoders)?)),
        (503, None) => Err(PlaceError::Unavailable(decode_place_unavailable_error(resp, encoders)?)),
        _ => Err(PlaceError::Generic(wire::unexpected_response(resp))),
    }
}

fn decode_place_rejected_error(resp: &Response<Vec<u8>>, encoders: &EncoderSet) -> Result<String, DecodeError> {
    let value: Option<String> = wire::response_body(resp, encoders)?;
    wire::required(value, "body", "body")
}

fn decode_place_locked_error(resp: &Response<Vec<u8>>, encoders: &EncoderSet) -> Result<String, DecodeError> {
    let value: Option<String> = wire::response_body(resp, encoders)?;
    wire::required(value, "body", "body")
}

fn decode_place_unavailable_error(resp: &Response<Vec<u8>>, encoders: &EncoderSet) -> Result<UnavailableError, DecodeError> {
    let mut body: serde_json::Map<String, serde_json::Value> = wire::response_body(resp, encoders)?.unwrap_or_default();
    let reason_value: Option<String> = wire::body_field(&mut body, "reason")?;
    let value = UnavailableError { reason: wire::required(reason_value, "reason", "body")? };
    value.validate("")?;
    Ok(value)
}

fn decode_place_result_201(resp: &Response<Vec<u8>>, encoders: &EncoderSet) -> Result<u64, DecodeError> {
    let value: Option<u64> = wire::response_body(resp, encoders)?;
    wire::required(value, "body", "body")
}

/// Build the `ping` request.
pub fn build_ping_request(_payload: &(), _encoders: &EncoderSet) -> Result<Request<Vec<u8>>, BuildError> {
    let mut builder = RequestBuilder::new(Method::GET, paths::ping_orders_path());
    builder.build()
}

/// Decode the response to a `ping` request.
pub fn decode_ping_response(resp: &Response<Vec<u8>>, encoders: &EncoderSet) -> Result<(), PingError> {
    match (resp.status().as_u16(), wire::error_name(resp)) {
        (500, Some("locked")) => Err(PingError::Locked(decode_ping_locked_error(resp, encoders)?)),
        (503, Some("unavailable")) => Err(PingError::Unavailable(decode_ping_unavailable_error(resp, encoders)?)),
        (_, Some(_)) => Err(PingError::Generic(wire::generic_error(resp, encoders))),
        (204, None) => Ok(decode_ping_result_204(resp, encoders)?),
        (500, None) => Err(PingError::Locked(decode_ping_locked_error(resp, encoders)?)),
        (503, None) => Err(PingError::Unavailable(decode_ping_unavailable_error(resp, encoders)?)),
        _ => Err(PingError::Generic(wire::unexpected_response(resp))),
    }
}

fn decode_ping_locked_error(resp: &Response<Vec<u8>>, encoders: &EncoderSet) -> Result<String, DecodeError> {
    let value: Option<String> = wire::response_body(resp, encoders)?;
    wire::required(value, "body", "body")
}

fn decode_ping_unavailable_error(resp: &Response<Vec<u8>>, encoders: &EncoderSet) -> Result<UnavailableError, DecodeError> {
    let mut body: serde_json::Map<String, serde_json::Value> = wire::response_body(resp, encoders)?.unwrap_or_default();
    let reason_value: Option<String> = wire::body_field(&mut body, "reason")?;
    let value = UnavailableError { reason: wire::required(reason_value, "reason", "body")? };
    value.validate("")?;
    Ok(value)
}

fn decode_ping_result_204(resp: &Response<Vec<u8>>, encoders: &EncoderSet) -> Result<(), DecodeError> {
    Ok(())
}
