//! HTTP binding resolution.
//!
//! [`resolve`] turns every method of a [`ServiceModel`](crate::model::ServiceModel)
//! into an [`EndpointBinding`]: composed route patterns, the wire location of
//! each payload attribute, success responses and the effective error set.
//! Everything downstream (path builders, codecs, mount table, API documents)
//! reads the same [`Resolution`].

mod error;
mod paths;
mod resolve;
mod security;
mod types;

pub use error::{print_issues, ResolutionError, ResolutionErrorKind};
pub(crate) use paths::PARAM_RE;
pub use paths::{canonical_pattern, document_path, join_paths, path_params, PathParam};
pub use resolve::{default_error_status, resolve, Resolution};
pub use security::SchemeRegistry;
pub use types::{
    AttributeBinding, BodyShape, CredentialSlot, EndpointBinding, ErrorBinding, ErrorScope,
    HeaderBinding, PayloadShape, ResolvedRequirement, ResponseBinding, ResponseTag,
    RouteBinding, SchemeScopes, StaticMount,
};
