//! Order service of the shop fixture. Its HTTP transport is generated from
//! `shop.yaml` by `build.rs`; this crate only compiles and exercises it.

pub mod transport;

pub use transport::orders;
