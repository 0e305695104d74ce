// Code generated by httpbind-gen. DO NOT EDIT.
//! Server side HTTP transport of the `orders` service.
#![allow(dead_code, unused_imports, unused_variables, unused_mut, clippy::all)]

use super::types::*;
use httpbind::runtime::wire;
use httpbind::runtime::{
    accept_header, check_enum, check_length, check_pattern, check_range, encode_generic_error,
    response_encoder, Bytes, DecodeError, EncodeError, EncoderSet, ErrorFormatter, GenericError,
    MountRecord, PathParams, ResponseBuilder, WireValue,
};
use http::{Method, Request, Response};
use serde::{Deserialize, Serialize};

/// Implementation of the `orders` service.
pub trait OrdersService: Send + Sync {
    fn search(&self, payload: SearchPayload) -> Result<SearchResult, SearchError>;
    fn place(&self, payload: Order) -> Result<u64, PlaceError>;
    fn ping(&self) -> Result<(), PingError>;
}

/// Decode the `search` payload from a request.
pub fn decode_search_request(req: &Request<Vec<u8>>, params: &PathParams, _encoders: &EncoderSet) -> Result<SearchPayload, DecodeError> {
    let store_value: i64 = wire::required(Some(wire::path_value::<i64>(params, "store")?), "store", "path")?;
    let serial_value: Option<u64> = wire::query_value::<u64, _>(req, "serial")?;
    let page_value: Option<u64> = wire::query_value::<u64, _>(req, "page")?;
    let weight_value: Option<f32> = wire::query_value::<f32, _>(req, "weight")?;
    let filter_value: Option<serde_json::Value> = wire::query_value::<serde_json::Value, _>(req, "filter")?;
    let ids_value: Vec<i32> = wire::query_values::<i32, _>(req, "ids")?.unwrap_or_default();
    let prices_value: Option<Vec<f64>> = wire::query_values::<f64, _>(req, "prices")?;
    let tags_value: Option<Vec<String>> = wire::header_values::<String, _>(req, "X-Tags")?;
    let labels_value: Vec<String> = wire::header_values::<String, _>(req, "X-Labels")?.unwrap_or_default();
    Ok(SearchPayload { store: store_value, serial: serial_value, page: page_value, weight: weight_value, filter: filter_value, ids: ids_value, prices: prices_value, tags: tags_value, labels: labels_value })
}

/// Encode a `search` result.
pub fn encode_search_response(result: &SearchResult, accept: Option<&str>, encoders: &EncoderSet) -> Result<Response<Vec<u8>>, EncodeError> {
    let mut builder = ResponseBuilder::new(200);
    if let Some(v) = &result.cursor {
        builder.header("X-Cursor", v);
    }
    let mut body = serde_json::Map::new();
    body.insert("total".to_string(), serde_json::to_value(&result.total)?);
    body.insert("orders".to_string(), serde_json::to_value(&result.orders)?);
    builder.json_body(&serde_json::Value::Object(body), response_encoder(encoders, accept, None)?, None)?;
    builder.finish()
}

/// Encode a `search` error. Always produces a response.
pub fn encode_search_error(err: &SearchError, accept: Option<&str>, encoders: &EncoderSet, formatter: &dyn ErrorFormatter) -> Response<Vec<u8>> {
    let encoded: Result<Response<Vec<u8>>, EncodeError> = match err {
        SearchError::Locked(value) => encode_search_locked(value, accept, encoders),
        SearchError::Unavailable(value) => encode_search_unavailable(value, accept, encoders),
        SearchError::Generic(generic) => return encode_generic_error(generic, accept, encoders, formatter),
    };
    encoded.unwrap_or_else(|e| {
        encode_generic_error(&GenericError::fault("encoding", e.to_string()), accept, encoders, formatter)
    })
}

fn encode_search_locked(value: &String, accept: Option<&str>, encoders: &EncoderSet) -> Result<Response<Vec<u8>>, EncodeError> {
    let mut builder = ResponseBuilder::new(500);
    builder.error_name("locked");
    builder.body(value, response_encoder(encoders, accept, None)?, None)?;
    builder.finish()
}

fn encode_search_unavailable(value: &UnavailableError, accept: Option<&str>, encoders: &EncoderSet) -> Result<Response<Vec<u8>>, EncodeError> {
    let mut builder = ResponseBuilder::new(503);
    builder.error_name("unavailable");
    let mut body = serde_json::Map::new();
    body.insert("reason".to_string(), serde_json::to_value(&value.reason)?);
    builder.json_body(&serde_json::Value::Object(body), response_encoder(encoders, accept, None)?, None)?;
    builder.finish()
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

/// Decode the `place` payload from a request.
pub fn decode_place_request(req: &Request<Vec<u8>>, _params: &PathParams, encoders: &EncoderSet) -> Result<Order, DecodeError> {
    let mut body: PlaceRequestBody = wire::body(req, encoders)?.unwrap_or_default();
    let id_value: u64 = wire::required(body.id.take(), "id", "body")?;
    let lines_value: Vec<Line> = wire::required(body.lines.take(), "lines", "body")?;
    { let v = &lines_value;
        for (i0, item0) in v.iter().enumerate() {
            item0.validate(&format!("{}[{}]", "lines", i0))?;
        }
    }
    let note_value: Option<String> = body.note.take();
    Ok(Order { id: id_value, lines: lines_value, note: note_value })
}

/// Encode a `place` result.
pub fn encode_place_response(result: &u64, accept: Option<&str>, encoders: &EncoderSet) -> Result<Response<Vec<u8>>, EncodeError> {
    let mut builder = ResponseBuilder::new(201);
    builder.body(result, response_encoder(encoders, accept, None)?, None)?;
    builder.finish()
}

/// Encode a `place` error. Always produces a response.
pub fn encode_place_error(err: &PlaceError, accept: Option<&str>, encoders: &EncoderSet, formatter: &dyn ErrorFormatter) -> Response<Vec<u8>> {
    let encoded: Result<Response<Vec<u8>>, EncodeError> = match err {
        PlaceError::Rejected(value) => encode_place_rejected(value, accept, encoders),
        PlaceError::Locked(value) => encode_place_locked(value, accept, encoders),
        PlaceError::Unavailable(value) => encode_place_unavailable(value, accept, encoders),
        PlaceError::Generic(generic) => return encode_generic_error(generic, accept, encoders, formatter),
    };
    encoded.unwrap_or_else(|e| {
        encode_generic_error(&GenericError::fault("encoding", e.to_string()), accept, encoders, formatter)
    })
}

fn encode_place_rejected(value: &String, accept: Option<&str>, encoders: &EncoderSet) -> Result<Response<Vec<u8>>, EncodeError> {
    let mut builder = ResponseBuilder::new(422);
    builder.error_name("rejected");
    builder.body(value, response_encoder(encoders, accept, None)?, None)?;
    builder.finish()
}

fn encode_place_locked(value: &String, accept: Option<&str>, encoders: &EncoderSet) -> Result<Response<Vec<u8>>, EncodeError> {
    let mut builder = ResponseBuilder::new(500);
    builder.error_name("locked");
    builder.body(value, response_encoder(encoders, accept, None)?, None)?;
    builder.finish()
}

fn encode_place_unavailable(value: &UnavailableError, accept: Option<&str>, encoders: &EncoderSet) -> Result<Response<Vec<u8>>, EncodeError> {
    let mut builder = ResponseBuilder::new(503);
    builder.error_name("unavailable");
    let mut body = serde_json::Map::new();
    body.insert("reason".to_string(), serde_json::to_value(&value.reason)?);
    builder.json_body(&serde_json::Value::Object(body), response_encoder(encoders, accept, None)?, None)?;
    builder.finish()
}

/// Decode the `ping` payload from a request.
pub fn decode_ping_request(_req: &Request<Vec<u8>>, _params: &PathParams, _encoders: &EncoderSet) -> Result<(), DecodeError> {
    Ok(())
}

/// Encode a `ping` result.
pub fn encode_ping_response(_result: &(), _accept: Option<&str>, _encoders: &EncoderSet) -> Result<Response<Vec<u8>>, EncodeError> {
    let mut builder = ResponseBuilder::new(204);
    builder.finish()
}

/// Encode a `ping` error. Always produces a response.
pub fn encode_ping_error(err: &PingError, accept: Option<&str>, encoders: &EncoderSet, formatter: &dyn ErrorFormatter) -> Response<Vec<u8>> {
    let encoded: Result<Response<Vec<u8>>, EncodeError> = match err {
        PingError::Locked(value) => encode_ping_locked(value, accept, encoders),
        PingError::Unavailable(value) => encode_ping_unavailable(value, accept, encoders),
        PingError::Generic(generic) => return encode_generic_error(generic, accept, encoders, formatter),
    };
    encoded.unwrap_or_else(|e| {
        encode_generic_error(&GenericError::fault("encoding", e.to_string()), accept, encoders, formatter)
    })
}

fn encode_ping_locked(value: &String, accept: Option<&str>, encoders: &EncoderSet) -> Result<Response<Vec<u8>>, EncodeError> {
    let mut builder = ResponseBuilder::new(500);
    builder.error_name("locked");
    builder.body(value, response_encoder(encoders, accept, None)?, None)?;
    builder.finish()
}

fn encode_ping_unavailable(value: &UnavailableError, accept: Option<&str>, encoders: &EncoderSet) -> Result<Response<Vec<u8>>, EncodeError> {
    let mut builder = ResponseBuilder::new(503);
    builder.error_name("unavailable");
    let mut body = serde_json::Map::new();
    body.insert("reason".to_string(), serde_json::to_value(&value.reason)?);
    builder.json_body(&serde_json::Value::Object(body), response_encoder(encoders, accept, None)?, None)?;
    builder.finish()
}

/// Serve one request routed to `method`. Returns `None` for methods this
/// service does not have.
pub fn handle<S: OrdersService + ?Sized>(service: &S, method: &str, req: &Request<Vec<u8>>, params: &PathParams, encoders: &EncoderSet, formatter: &dyn ErrorFormatter) -> Option<Response<Vec<u8>>> {
    let accept = accept_header(req);
    let response = match method {
        "search" => match decode_search_request(req, params, encoders) {
            Err(err) => encode_search_error(&SearchError::from(err), accept, encoders, formatter),
            Ok(payload) => match service.search(payload) {
                Ok(result) => encode_search_response(&result, accept, encoders).unwrap_or_else(|e| {
                    encode_generic_error(&GenericError::fault("encoding", e.to_string()), accept, encoders, formatter)
                }),
                Err(err) => encode_search_error(&err, accept, encoders, formatter),
            },
        },
        "place" => match decode_place_request(req, params, encoders) {
            Err(err) => encode_place_error(&PlaceError::from(err), accept, encoders, formatter),
            Ok(payload) => match service.place(payload) {
                Ok(result) => encode_place_response(&result, accept, encoders).unwrap_or_else(|e| {
                    encode_generic_error(&GenericError::fault("encoding", e.to_string()), accept, encoders, formatter)
                }),
                Err(err) => encode_place_error(&err, accept, encoders, formatter),
            },
        },
        "ping" => match decode_ping_request(req, params, encoders) {
            Err(err) => encode_ping_error(&PingError::from(err), accept, encoders, formatter),
            Ok(()) => match service.ping() {
                Ok(result) => encode_ping_response(&result, accept, encoders).unwrap_or_else(|e| {
                    encode_generic_error(&GenericError::fault("encoding", e.to_string()), accept, encoders, formatter)
                }),
                Err(err) => encode_ping_error(&err, accept, encoders, formatter),
            },
        },
        _ => return None,
    };
    Some(response)
}

/// Mount records of the service, in routing order.
pub fn mounts() -> Vec<MountRecord> {
    vec![
        MountRecord::endpoint("orders", "search", Method::GET, "/v1/orders/stores/{store}"),
        MountRecord::endpoint("orders", "place", Method::POST, "/v1/orders"),
        MountRecord::endpoint("orders", "ping", Method::GET, "/v1/orders/ping"),
    ]
}
