// Code generated by httpbind-gen. DO NOT EDIT.
//! Request paths of the `orders` service.
#![allow(dead_code, unused_imports, clippy::all)]

use httpbind::runtime::{escape, path_list, path_segment, Bytes};

/// Path of `/v1/orders/stores/{store}`.
pub fn search_orders_path(store: i64) -> String {
    format!("/v1/orders/stores/{}", store)
}

/// Path of `/v1/orders`.
pub fn place_orders_path() -> String {
    String::from("/v1/orders")
}

/// Path of `/v1/orders/ping`.
pub fn ping_orders_path() -> String {
    String::from("/v1/orders/ping")
}
