//! # API Documents
//!
//! Projects a [`Resolution`] into Swagger 2.0 ([`v2`]) and OpenAPI 3.0.3
//! ([`v3`]) documents. Both versions walk the same operation list:
//!
//! - one operation per route of every resolved, non-suppressed method;
//! - one `GET` operation per static file mount;
//! - `openapi:generate: false` on a method, a service or a declared tag
//!   drops the operations it covers and nothing else.
//!
//! Maps keep declaration order so the output is stable from run to run.

mod extensions;
mod ordered;
mod schema;
pub mod v2;
pub mod v3;

pub use extensions::{has_suppressed_tag, merged_extensions, tag_names};
pub use ordered::OrderedMap;
pub use schema::{primitive_schema, Schema, SchemaBuilder};

use crate::binding::{
    document_path, AttributeBinding, BodyShape, EndpointBinding, ErrorBinding, Resolution,
    ResolvedRequirement, ResponseBinding, RouteBinding, StaticMount,
};
use crate::codegen::GeneratedFile;
use crate::model::{
    Method, SchemeKind, Service, ServiceModel, WireLocation, META_OPERATION_ID, META_SUMMARY,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Document version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentVersion {
    /// Swagger 2.0
    V2,
    /// OpenAPI 3.0.3
    V3,
}

impl fmt::Display for DocumentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DocumentVersion::V2 => "v2",
            DocumentVersion::V3 => "v3",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Json => "json",
            DocumentFormat::Yaml => "yaml",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("JSON serialisation failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML serialisation failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Serialise a document.
///
/// # Errors
///
/// Fails when the serialiser does.
pub fn render_document<D: Serialize>(
    doc: &D,
    format: DocumentFormat,
) -> Result<String, DocumentError> {
    Ok(match format {
        DocumentFormat::Json => {
            let mut out = serde_json::to_string_pretty(doc)?;
            out.push('\n');
            out
        }
        DocumentFormat::Yaml => serde_yaml::to_string(doc)?,
    })
}

/// Base name of the file a version is written to.
#[must_use]
pub fn file_stem(version: DocumentVersion) -> &'static str {
    match version {
        DocumentVersion::V2 => "openapi",
        DocumentVersion::V3 => "openapi3",
    }
}

/// Every requested document in every requested format.
///
/// # Errors
///
/// Fails when a document cannot be serialised.
pub fn generate_documents(
    model: &ServiceModel,
    resolution: &Resolution,
    versions: &[DocumentVersion],
    formats: &[DocumentFormat],
) -> Result<Vec<GeneratedFile>, DocumentError> {
    let mut files = Vec::new();
    for version in versions {
        let rendered: Vec<(DocumentFormat, String)> = match version {
            DocumentVersion::V2 => {
                let doc = v2::synthesize(model, resolution);
                formats
                    .iter()
                    .map(|f| render_document(&doc, *f).map(|s| (*f, s)))
                    .collect::<Result<_, _>>()?
            }
            DocumentVersion::V3 => {
                let doc = v3::synthesize(model, resolution);
                formats
                    .iter()
                    .map(|f| render_document(&doc, *f).map(|s| (*f, s)))
                    .collect::<Result<_, _>>()?
            }
        };
        for (format, contents) in rendered {
            files.push(GeneratedFile::new(
                format!("{}.{}", file_stem(*version), format.extension()),
                contents,
            ));
        }
    }
    Ok(files)
}

/// A route of a method, with everything both versions derive from metadata.
pub(crate) struct OperationSource<'a> {
    pub ep: &'a EndpointBinding,
    pub method: &'a Method,
    pub route: &'a RouteBinding,
    /// Path key in the document.
    pub key: String,
    /// Lowercase verb.
    pub verb: String,
    pub operation_id: String,
    pub summary: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub extensions: OrderedMap<Value>,
}

/// A static mount as a download operation.
pub(crate) struct FileSource<'a> {
    pub mount: &'a StaticMount,
    pub key: String,
    pub operation_id: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub extensions: OrderedMap<Value>,
    pub wildcard: Option<String>,
}

fn service_tags(model: &ServiceModel, service: &Service, meta: &crate::model::Meta) -> Vec<String> {
    let tags = tag_names(&[&model.api.meta, &service.meta, meta]);
    if tags.is_empty() {
        vec![service.name.clone()]
    } else {
        tags
    }
}

/// Operations in service, method and route order.
pub(crate) fn operations<'a>(
    model: &'a ServiceModel,
    resolution: &'a Resolution,
) -> Vec<OperationSource<'a>> {
    let mut out = Vec::new();
    for service in model.services() {
        if !service.meta.generates() {
            debug!(service = %service.name, "service suppressed from documents");
            continue;
        }
        for ep in resolution.endpoints_of(service.id) {
            let method = model.method(ep.method);
            if !method.meta.generates() {
                debug!(
                    service = %service.name,
                    method = %method.name,
                    "method suppressed from documents"
                );
                continue;
            }
            let tags = service_tags(model, service, &method.meta);
            if has_suppressed_tag(model, &tags) {
                debug!(
                    service = %service.name,
                    method = %method.name,
                    "method carries a suppressed tag"
                );
                continue;
            }
            let base_id = method
                .meta
                .last(META_OPERATION_ID)
                .map_or_else(|| format!("{}#{}", service.name, method.name), str::to_string);
            let summary = method
                .meta
                .last(META_SUMMARY)
                .map_or_else(|| format!("{} {}", method.name, service.name), str::to_string);
            let extensions = merged_extensions(&[&model.api.meta, &service.meta, &method.meta]);
            for (index, route) in ep.routes.iter().enumerate() {
                let operation_id = if index > 0 {
                    format!("{base_id}#{index}")
                } else {
                    base_id.clone()
                };
                out.push(OperationSource {
                    ep,
                    method,
                    route,
                    key: document_path(&route.pattern),
                    verb: route.verb.as_str().to_ascii_lowercase(),
                    operation_id,
                    summary: summary.clone(),
                    description: operation_description(method, ep),
                    tags: tags.clone(),
                    extensions: extensions.clone(),
                });
            }
        }
    }
    out
}

/// Static mounts of non-suppressed services.
pub(crate) fn file_operations<'a>(
    model: &'a ServiceModel,
    resolution: &'a Resolution,
) -> Vec<FileSource<'a>> {
    let mut out = Vec::new();
    for service in model.services() {
        if !service.meta.generates() {
            continue;
        }
        for mount in resolution.mounts_of(service.id) {
            if !mount.meta.generates() {
                continue;
            }
            let tags = service_tags(model, service, &mount.meta);
            if has_suppressed_tag(model, &tags) {
                continue;
            }
            out.push(FileSource {
                mount,
                key: document_path(&mount.path),
                operation_id: format!("{}#{}", service.name, mount.path),
                summary: mount
                    .meta
                    .last(META_SUMMARY)
                    .map_or_else(|| format!("Download {}", mount.source), str::to_string),
                tags,
                extensions: merged_extensions(&[&mount.meta]),
                wildcard: mount.wildcard(),
            });
        }
    }
    out
}

/// Method description followed by the scopes of non-OAuth2 schemes, which
/// requirement objects cannot carry.
fn operation_description(method: &Method, ep: &EndpointBinding) -> Option<String> {
    let mut parts: Vec<String> = method
        .description
        .iter()
        .filter(|d| !d.is_empty())
        .cloned()
        .collect();
    for requirement in &ep.security {
        for scheme in &requirement.schemes {
            if scheme.kind == SchemeKind::Oauth2 || scheme.scopes.is_empty() {
                continue;
            }
            let lines: Vec<String> = scheme.scopes.iter().map(|s| format!("  * `{s}`")).collect();
            parts.push(format!(
                "**Required security scopes for {}**:\n{}",
                scheme.scheme,
                lines.join("\n")
            ));
        }
    }
    (!parts.is_empty()).then(|| parts.join("\n\n"))
}

/// Requirement objects: scheme name to scopes (OAuth2 only).
pub(crate) fn security_requirements(
    requirements: &[ResolvedRequirement],
) -> Vec<OrderedMap<Vec<String>>> {
    requirements
        .iter()
        .map(|req| {
            req.schemes
                .iter()
                .map(|s| {
                    let scopes = if s.kind == SchemeKind::Oauth2 {
                        s.scopes.clone()
                    } else {
                        Vec::new()
                    };
                    (s.scheme.clone(), scopes)
                })
                .collect()
        })
        .collect()
}

/// Non-body, non-credential attributes of a route: its path parameters in
/// pattern order, then query and header attributes in declaration order.
pub(crate) fn parameters<'a>(src: &OperationSource<'a>) -> Vec<&'a AttributeBinding> {
    let ep = src.ep;
    let mut out: Vec<&AttributeBinding> = src
        .route
        .params
        .iter()
        .filter_map(|p| ep.path_attribute(p))
        .collect();
    out.extend(
        ep.attributes
            .iter()
            .filter(|a| matches!(a.location, WireLocation::Query | WireLocation::Header))
            .filter(|a| a.credential.is_none()),
    );
    out
}

/// Schema of a non-body parameter, with its constraints.
pub(crate) fn parameter_schema(builder: &mut SchemaBuilder<'_>, ab: &AttributeBinding) -> Schema {
    let mut schema = builder.inline(&ab.ty);
    schema.constrain(&ab.validation);
    schema
}

pub(crate) fn parameter_description(
    builder: &SchemaBuilder<'_>,
    src: &OperationSource<'_>,
    ab: &AttributeBinding,
) -> Option<String> {
    builder
        .field_description(&src.ep.payload_type, &ab.attribute)
        .or_else(|| src.method.payload.description.clone().filter(|_| src.ep.attributes.len() == 1))
}

/// Schema of the request body, if the request has one.
pub(crate) fn request_body_schema(
    builder: &mut SchemaBuilder<'_>,
    ep: &EndpointBinding,
) -> Option<Schema> {
    match &ep.body {
        BodyShape::None => None,
        BodyShape::Whole => Some(builder.schema(&ep.payload_type)),
        BodyShape::Attribute(attr) => Some(builder.field(&ep.payload_type, attr)),
        BodyShape::Object(names) => Some(builder.subset(&ep.payload_type, names)),
    }
}

/// Schema of a success response body.
pub(crate) fn response_body_schema(
    builder: &mut SchemaBuilder<'_>,
    ep: &EndpointBinding,
    response: &ResponseBinding,
) -> Option<Schema> {
    match &response.body {
        BodyShape::None => None,
        BodyShape::Whole => Some(builder.view(&ep.result_type, ep.view.as_deref())),
        BodyShape::Attribute(attr) => Some(builder.field(&ep.result_type, attr)),
        BodyShape::Object(names) => {
            let view_names = ep
                .view
                .as_deref()
                .and_then(|view| builder.view_attributes(&ep.result_type, view));
            match view_names {
                Some(v) if &v == names => Some(builder.view(&ep.result_type, ep.view.as_deref())),
                _ => Some(builder.subset(&ep.result_type, names)),
            }
        }
    }
}

/// Schema of an error response body.
pub(crate) fn error_body_schema(
    builder: &mut SchemaBuilder<'_>,
    err: &ErrorBinding,
) -> Option<Schema> {
    match &err.body {
        BodyShape::None => None,
        BodyShape::Whole => Some(builder.schema(&err.ty)),
        BodyShape::Attribute(attr) => Some(builder.field(&err.ty, attr)),
        BodyShape::Object(names) => Some(builder.subset(&err.ty, names)),
    }
}

/// Reason phrase used as response description.
#[must_use]
pub fn status_description(status: u16) -> String {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map_or_else(|| format!("Status {status}"), str::to_string)
}
