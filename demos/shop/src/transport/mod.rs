// Code generated by httpbind-gen. DO NOT EDIT.
//! Generated HTTP transport for shop.

pub mod orders;