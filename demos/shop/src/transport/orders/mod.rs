// Code generated by httpbind-gen. DO NOT EDIT.
//! HTTP transport of the orders service.

pub mod types;
pub mod paths;
pub mod server;
pub mod client;