//! # httpbind
//!
//! **httpbind** resolves the HTTP binding of an abstract service model and
//! generates the transport layer from it: path builders, request codecs,
//! response and error codecs, the mount table, and Swagger 2.0 / OpenAPI
//! 3.0.3 documents.
//!
//! ## Overview
//!
//! A model declares services, methods and their payload, result and error
//! types, plus HTTP directives (routes, parameter locations, body selection,
//! response tags, error statuses). Resolution turns that into one
//! [`EndpointBinding`](binding::EndpointBinding) per method; every generator
//! reads the same [`Resolution`](binding::Resolution), so the server, the
//! client and the documents can never disagree about where an attribute
//! travels.
//!
//! ## Architecture
//!
//! - **[`model`]** - Service model arena and the YAML/JSON loader
//! - **[`binding`]** - Binding resolution: routes, attribute locations, responses, errors, security
//! - **[`runtime`]** - Wire helpers shared by generated code and the interpretive codecs
//! - **[`codegen`]** - Rust source generation (paths, server, client, types)
//! - **[`openapi`]** - Swagger 2.0 and OpenAPI 3.0.3 synthesis
//! - **[`router`]** - Mount table and the regex router over it
//! - **[`config`]** - `httpbind.toml` generator configuration
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`cli`]** - The `httpbind-gen` command line
//!
//! ### Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant User
//!     participant CLI as CLI<br/>(httpbind-gen)
//!     participant Model as model::load_model
//!     participant Resolve as binding::resolve
//!     participant Codegen as codegen::generate
//!     participant Docs as openapi::generate_documents
//!     participant FS as File System
//!
//!     User->>CLI: httpbind-gen generate --model api.yaml
//!     CLI->>Model: load_model("api.yaml")
//!     Model-->>CLI: ServiceModel
//!     CLI->>Resolve: resolve(&model, &schemes)
//!     Resolve->>Resolve: Compose routes,<br/>place attributes,<br/>merge error directives
//!     Resolve-->>CLI: Resolution<br/>(endpoints, mounts, failures)
//!     CLI->>Codegen: generate(&model, &resolution, &options)
//!     Codegen-->>CLI: Vec<GeneratedFile>
//!     CLI->>Docs: generate_documents(...)
//!     Docs-->>CLI: openapi.json, openapi3.yaml, ...
//!     CLI->>FS: Write changed files
//!     CLI-->>User: Failures (exit 1 unless --allow-failures)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use httpbind::{parse_model, resolve, ModelFormat, SchemeRegistry};
//!
//! let model = parse_model(
//!     r#"
//! api: { name: shop }
//! services:
//!   - name: items
//!     methods:
//!       - name: show
//!         payload:
//!           type: object
//!           fields: [{ name: id, type: int, required: true }]
//!         http:
//!           routes: ["GET /items/{id}"]
//! "#,
//!     ModelFormat::Yaml,
//! )
//! .unwrap();
//! let resolution = resolve(&model, &SchemeRegistry::from_model(&model));
//! assert!(resolution.is_clean());
//! assert_eq!(resolution.endpoints[0].routes[0].pattern, "/items/{id}");
//! ```
//!
//! ## Failures
//!
//! A method that cannot be bound fails on its own: it is reported in
//! [`Resolution::failures`](binding::Resolution) and nothing is generated for
//! it, while the rest of the model still resolves.

pub mod binding;
pub mod cli;
pub mod codegen;
pub mod config;
pub mod logging;
pub mod model;
pub mod openapi;
pub mod router;
pub mod runtime;

pub use binding::{resolve, Resolution, ResolutionError, SchemeRegistry};
pub use codegen::{generate, CodegenOptions, GeneratedFile};
pub use model::{load_model, parse_model, ModelFormat, ServiceModel};
