#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use http::{Request, Response};
use httpbind::router::{MountTable, MountTarget, Router};
use httpbind::runtime::{
    encode_generic_error, DecodeError, DefaultErrorFormatter, EncoderSet, GenericError, PathParams,
};
use serde_json::json;
use shop::orders::client::{
    build_place_request, build_ping_request, build_search_request, decode_place_response,
    decode_ping_response, decode_search_response,
};
use shop::orders::server::{
    decode_place_request, decode_search_request, handle, mounts, OrdersService,
};
use shop::orders::types::{
    Line, Order, PingError, PlaceError, SearchError, SearchPayload, SearchResult, UnavailableError,
};
use std::sync::Mutex;

/// Answers searches from the payload and records placed orders.
#[derive(Default)]
struct Orders {
    placed: Mutex<Vec<Order>>,
}

impl OrdersService for Orders {
    fn search(&self, payload: SearchPayload) -> Result<SearchResult, SearchError> {
        match payload.store {
            0 => Err(SearchError::Locked("store 0 is closed".to_string())),
            s if s < 0 => Err(SearchError::Unavailable(UnavailableError {
                reason: "maintenance".to_string(),
            })),
            _ => Ok(SearchResult {
                total: payload.ids.len() as u64,
                cursor: payload.tags.map(|tags| tags.join("|")),
                orders: payload
                    .ids
                    .iter()
                    .map(|id| Order {
                        id: u64::from(id.unsigned_abs()),
                        lines: vec![line("lamp", 1)],
                        note: None,
                    })
                    .collect(),
            }),
        }
    }

    fn place(&self, payload: Order) -> Result<u64, PlaceError> {
        if payload.lines.is_empty() {
            return Err(PlaceError::Rejected("empty order".to_string()));
        }
        let id = payload.id;
        self.placed.lock().unwrap().push(payload);
        Ok(id)
    }

    fn ping(&self) -> Result<(), PingError> {
        Ok(())
    }
}

fn line(sku: &str, quantity: u32) -> Line {
    Line {
        sku: sku.to_string(),
        quantity,
    }
}

fn search_payload() -> SearchPayload {
    SearchPayload {
        store: 7,
        serial: Some(u64::MAX),
        page: Some(3),
        weight: Some(0.5),
        filter: Some(json!({ "color": "red", "sizes": [1, 2] })),
        ids: vec![1, -2, i32::MAX],
        prices: Some(vec![1.5, 2.25]),
        tags: Some(vec!["a,b".to_string(), " c".to_string()]),
        labels: Vec::new(),
    }
}

/// Method name and path captures of the mount `req` routes to.
fn route(req: &Request<Vec<u8>>) -> (String, PathParams) {
    let router = Router::new(&MountTable::new(mounts())).unwrap();
    let matched = router.route(req.method(), req.uri().path()).unwrap();
    let MountTarget::Endpoint { method } = &matched.record.target else {
        panic!("{} routed to a static mount", req.uri());
    };
    (method.clone(), matched.path_params.clone())
}

fn serve(service: &Orders, req: &Request<Vec<u8>>) -> Response<Vec<u8>> {
    let (method, params) = route(req);
    handle(service, &method, req, &params, &EncoderSet::default(), &DefaultErrorFormatter).unwrap()
}

#[test]
fn test_search_payload_survives_every_location() {
    let encoders = EncoderSet::default();
    let payload = search_payload();
    let req = build_search_request(&payload, &encoders).unwrap();
    assert_eq!(req.uri().path(), "/v1/orders/stores/7");
    assert_eq!(req.headers().get_all("x-tags").iter().count(), 2);

    let (method, params) = route(&req);
    assert_eq!(method, "search");
    let decoded = decode_search_request(&req, &params, &encoders).unwrap();
    assert_eq!(decoded, payload);
}

#[test]
fn test_empty_lists_stay_distinct_from_absent_ones() {
    let encoders = EncoderSet::default();
    let payload = SearchPayload {
        ids: Vec::new(),
        prices: Some(Vec::new()),
        tags: Some(Vec::new()),
        labels: Vec::new(),
        ..search_payload()
    };
    let req = build_search_request(&payload, &encoders).unwrap();
    let (_, params) = route(&req);
    assert_eq!(decode_search_request(&req, &params, &encoders).unwrap(), payload);

    let absent = SearchPayload {
        serial: None,
        page: None,
        weight: None,
        filter: None,
        prices: None,
        tags: None,
        ..payload
    };
    let req = build_search_request(&absent, &encoders).unwrap();
    assert!(req.headers().get("x-tags").is_none());
    let (_, params) = route(&req);
    assert_eq!(decode_search_request(&req, &params, &encoders).unwrap(), absent);
}

#[test]
fn test_search_results_and_errors_come_back_typed() {
    let service = Orders::default();
    let encoders = EncoderSet::default();

    let req = build_search_request(&search_payload(), &encoders).unwrap();
    let resp = serve(&service, &req);
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["x-cursor"], "a,b| c");
    let result = decode_search_response(&resp, &encoders).unwrap();
    assert_eq!(result.total, 3);
    assert_eq!(result.cursor.as_deref(), Some("a,b| c"));
    assert_eq!(result.orders[1].id, 2);
    assert_eq!(result.orders[2].lines, vec![line("lamp", 1)]);

    let closed = SearchPayload {
        store: 0,
        ..search_payload()
    };
    let resp = serve(&service, &build_search_request(&closed, &encoders).unwrap());
    assert_eq!(resp.status(), 500);
    assert_eq!(
        decode_search_response(&resp, &encoders),
        Err(SearchError::Locked("store 0 is closed".to_string()))
    );

    let down = SearchPayload {
        store: -1,
        ..search_payload()
    };
    let resp = serve(&service, &build_search_request(&down, &encoders).unwrap());
    assert_eq!(resp.status(), 503);
    assert_eq!(
        decode_search_response(&resp, &encoders),
        Err(SearchError::Unavailable(UnavailableError {
            reason: "maintenance".to_string()
        }))
    );
}

#[test]
fn test_placed_orders_round_trip_through_the_body() {
    let service = Orders::default();
    let encoders = EncoderSet::default();
    let order = Order {
        id: 42,
        lines: vec![line("lamp", 2), line("desk", 1)],
        note: Some("leave at the door".to_string()),
    };

    let req = build_place_request(&order, &encoders).unwrap();
    let resp = serve(&service, &req);
    assert_eq!(resp.status(), 201);
    assert_eq!(decode_place_response(&resp, &encoders), Ok(42));
    assert_eq!(service.placed.lock().unwrap().as_slice(), &[order]);

    let empty = Order {
        id: 43,
        lines: Vec::new(),
        note: None,
    };
    let resp = serve(&service, &build_place_request(&empty, &encoders).unwrap());
    assert_eq!(resp.status(), 422);
    assert_eq!(
        decode_place_response(&resp, &encoders),
        Err(PlaceError::Rejected("empty order".to_string()))
    );
}

#[test]
fn test_nested_constraints_are_checked_by_generated_decoders() {
    let encoders = EncoderSet::default();
    let order = Order {
        id: 1,
        lines: vec![line("lamp", 1), line("ab", 1)],
        note: None,
    };
    let req = build_place_request(&order, &encoders).unwrap();
    let (_, params) = route(&req);
    let err = decode_place_request(&req, &params, &encoders).unwrap_err();
    assert!(
        matches!(
            &err,
            DecodeError::InvalidLength { field, length: 2, .. } if field == "lines[1].sku"
        ),
        "{err:?}"
    );

    let order = Order {
        lines: vec![line("lamp", 0)],
        ..order
    };
    let req = build_place_request(&order, &encoders).unwrap();
    let err = decode_place_request(&req, &params, &encoders).unwrap_err();
    assert!(
        matches!(&err, DecodeError::InvalidRange { field, .. } if field == "lines[0].quantity"),
        "{err:?}"
    );

    // the server reports the violation as a generic error the client reads back
    let resp = serve(&Orders::default(), &req);
    assert_eq!(resp.status(), 400);
    let Err(PlaceError::Generic(generic)) = decode_place_response(&resp, &encoders) else {
        panic!("expected a generic error");
    };
    assert_eq!(generic.name, "invalid_range");
    assert!(generic.message.contains("lines[0].quantity"), "{}", generic.message);
}

#[test]
fn test_undeclared_and_unexpected_responses_are_generic() {
    let encoders = EncoderSet::default();

    let resp = serve(&Orders::default(), &build_ping_request(&(), &encoders).unwrap());
    assert_eq!(resp.status(), 204);
    assert_eq!(decode_ping_response(&resp, &encoders), Ok(()));

    let overloaded = GenericError::new("overloaded", "try later").temporary();
    let resp = encode_generic_error(&overloaded, None, &encoders, &DefaultErrorFormatter);
    let Err(PingError::Generic(generic)) = decode_ping_response(&resp, &encoders) else {
        panic!("expected a generic error");
    };
    assert_eq!(generic.name, "overloaded");
    assert!(generic.temporary);

    let teapot = Response::builder().status(418).body(b"short and stout".to_vec()).unwrap();
    let Err(PingError::Generic(generic)) = decode_ping_response(&teapot, &encoders) else {
        panic!("expected a generic error");
    };
    assert_eq!(generic.name, "invalid_response");
    assert!(generic.fault);
}
