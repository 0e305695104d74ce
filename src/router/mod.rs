//! # Router Module
//!
//! The mount table lists every route a server must wire: one record per
//! endpoint route plus the static file mounts, in declaration order. It is
//! both the wiring input for generated servers and a diagnostic listing
//! (`httpbind-gen routes`).
//!
//! [`Router`] compiles a table into regex matchers:
//!
//! 1. **Compilation**: `/items/{id}` becomes `^/items/([^/]+)$`; a trailing
//!    `{*path}` takes the rest of the path.
//! 2. **Matching**: records are tried in table order and the first whose verb
//!    and pattern match wins, returning its raw captures.
//!
//! ## Example
//!
//! ```rust
//! use httpbind::router::{MountRecord, MountTable, Router};
//! use http::Method;
//!
//! let table = MountTable::new(vec![
//!     MountRecord::endpoint("items", "show", Method::GET, "/items/{id}"),
//! ]);
//! let router = Router::new(&table).unwrap();
//! let m = router.route(&Method::GET, "/items/42").unwrap();
//! assert_eq!(m.get_path_param("id"), Some("42"));
//! ```

mod core;
mod table;

pub use core::{ParamVec, RouteMatch, Router, MAX_INLINE_PARAMS};
pub use table::{MountRecord, MountTable, MountTarget};
