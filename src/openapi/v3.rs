//! OpenAPI 3.0.3.

use super::{
    error_body_schema, file_operations, merged_extensions, operations, parameter_description,
    parameter_schema, parameters, request_body_schema, response_body_schema,
    security_requirements, status_description, OrderedMap, Schema, SchemaBuilder,
};
use crate::binding::{HeaderBinding, Resolution};
use crate::model::{AttributeType, SchemeKind, SecurityScheme, ServiceModel, WireLocation};
use crate::runtime::JSON;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
pub struct OpenApi {
    pub openapi: String,
    pub info: super::v2::Info,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    pub paths: OrderedMap<OrderedMap<Operation>>,
    #[serde(skip_serializing_if = "Components::is_empty")]
    pub components: Components,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<super::v2::Tag>,
    #[serde(flatten)]
    pub extensions: OrderedMap<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Server {
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(skip_serializing_if = "OrderedMap::is_empty")]
    pub schemas: OrderedMap<Schema>,
    #[serde(skip_serializing_if = "OrderedMap::is_empty")]
    pub security_schemes: OrderedMap<SecuritySchemeObject>,
}

impl Components {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty() && self.security_schemes.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub tags: Vec<String>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub operation_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    pub responses: OrderedMap<Response>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<OrderedMap<Vec<String>>>,
    #[serde(flatten)]
    pub extensions: OrderedMap<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    /// `form` with `explode` for repeated query keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,
    pub schema: Schema,
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaType {
    pub schema: Schema,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    pub content: OrderedMap<MediaType>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Header {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    pub schema: Schema,
}

#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "OrderedMap::is_empty")]
    pub headers: OrderedMap<Header>,
    #[serde(skip_serializing_if = "OrderedMap::is_empty")]
    pub content: OrderedMap<MediaType>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    pub scopes: OrderedMap<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySchemeObject {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flows: Option<OrderedMap<OAuthFlow>>,
}

fn security_scheme(scheme: &SecurityScheme) -> SecuritySchemeObject {
    let mut obj = SecuritySchemeObject {
        kind: "http".to_string(),
        description: scheme.description.clone(),
        scheme: None,
        bearer_format: None,
        name: None,
        location: None,
        flows: None,
    };
    match scheme.kind {
        SchemeKind::Basic => obj.scheme = Some("basic".to_string()),
        SchemeKind::Jwt => {
            obj.scheme = Some("bearer".to_string());
            obj.bearer_format = Some("JWT".to_string());
        }
        SchemeKind::ApiKey => {
            obj.kind = "apiKey".to_string();
            obj.name = Some(scheme.location.name.clone());
            obj.location = Some(match scheme.location.location {
                WireLocation::Query => "query".to_string(),
                _ => "header".to_string(),
            });
        }
        SchemeKind::Oauth2 => {
            obj.kind = "oauth2".to_string();
            let flow_name = match (&scheme.authorization_url, &scheme.token_url) {
                (Some(_), Some(_)) => "authorizationCode",
                (None, Some(_)) => "clientCredentials",
                _ => "implicit",
            };
            let mut flows = OrderedMap::new();
            flows.insert(
                flow_name,
                OAuthFlow {
                    authorization_url: scheme.authorization_url.clone(),
                    token_url: scheme.token_url.clone(),
                    scopes: scheme
                        .scopes
                        .iter()
                        .map(|s| (s.name.clone(), s.description.clone().unwrap_or_default()))
                        .collect(),
                },
            );
            obj.flows = Some(flows);
        }
    }
    obj
}

fn headers(
    builder: &mut SchemaBuilder<'_>,
    ty: &AttributeType,
    bindings: &[HeaderBinding],
) -> OrderedMap<Header> {
    bindings
        .iter()
        .map(|hb| {
            let header = Header {
                description: hb.attribute.as_deref().and_then(|a| builder.field_description(ty, a)),
                required: hb.required,
                schema: builder.inline(&hb.ty),
            };
            (hb.name.clone(), header)
        })
        .collect()
}

fn content(content_type: Option<&str>, schema: Option<Schema>) -> OrderedMap<MediaType> {
    let mut out = OrderedMap::new();
    if let Some(schema) = schema {
        out.insert(content_type.unwrap_or(JSON), MediaType { schema });
    }
    out
}

fn server_url(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

/// Build the OpenAPI 3.0.3 document.
#[must_use]
pub fn synthesize(model: &ServiceModel, resolution: &Resolution) -> OpenApi {
    let mut builder = SchemaBuilder::new(model, "#/components/schemas/");
    let mut paths: OrderedMap<OrderedMap<Operation>> = OrderedMap::new();

    for src in operations(model, resolution) {
        let ep = src.ep;
        let mut params = Vec::new();
        for ab in parameters(&src) {
            let schema = parameter_schema(&mut builder, ab);
            let repeated =
                ab.location == WireLocation::Query && schema.ty.as_deref() == Some("array");
            params.push(Parameter {
                name: ab.wire_name.clone(),
                location: ab.location.to_string(),
                description: parameter_description(&builder, &src, ab),
                required: ab.location == WireLocation::Path || ab.required,
                style: repeated.then(|| "form".to_string()),
                explode: repeated.then_some(true),
                schema,
            });
        }
        let request_body = request_body_schema(&mut builder, ep).map(|schema| RequestBody {
            description: src.method.payload.description.clone(),
            required: true,
            content: content(None, Some(schema)),
        });

        let mut responses = OrderedMap::new();
        for response in &ep.responses {
            let schema = response_body_schema(&mut builder, ep, response);
            responses.insert_new(
                response.status.to_string(),
                Response {
                    description: status_description(response.status),
                    headers: headers(&mut builder, &ep.result_type, &response.headers),
                    content: content(response.content_type.as_deref(), schema),
                },
            );
        }
        for err in &ep.errors {
            let schema = error_body_schema(&mut builder, err);
            responses.insert_new(
                err.status.to_string(),
                Response {
                    description: err
                        .description
                        .clone()
                        .unwrap_or_else(|| {
                            format!("{}: {}", err.name, status_description(err.status))
                        }),
                    headers: headers(&mut builder, &err.ty, &err.headers),
                    content: content(err.content_type.as_deref(), schema),
                },
            );
        }

        let operation = Operation {
            tags: src.tags.clone(),
            summary: src.summary.clone(),
            description: src.description.clone(),
            operation_id: src.operation_id.clone(),
            parameters: params,
            request_body,
            responses,
            security: security_requirements(&ep.security),
            extensions: src.extensions.clone(),
        };
        paths.entry_or_default(&src.key).insert(src.verb.clone(), operation);
    }

    for file in file_operations(model, resolution) {
        let mut responses = OrderedMap::new();
        let binary = Schema {
            format: Some("binary".to_string()),
            ..Schema::of_type("string")
        };
        responses.insert(
            "200",
            Response {
                description: "File downloaded".to_string(),
                headers: OrderedMap::new(),
                content: content(Some("application/octet-stream"), Some(binary)),
            },
        );
        let mut params = Vec::new();
        if let Some(wildcard) = &file.wildcard {
            params.push(Parameter {
                name: wildcard.clone(),
                location: "path".to_string(),
                description: Some("Relative file path".to_string()),
                required: true,
                style: None,
                explode: None,
                schema: Schema::of_type("string"),
            });
            responses.insert(
                "404",
                Response {
                    description: "File not found".to_string(),
                    headers: OrderedMap::new(),
                    content: OrderedMap::new(),
                },
            );
        }
        let operation = Operation {
            tags: file.tags.clone(),
            summary: file.summary.clone(),
            description: file.mount.description.clone(),
            operation_id: file.operation_id.clone(),
            parameters: params,
            request_body: None,
            responses,
            security: Vec::new(),
            extensions: file.extensions.clone(),
        };
        paths.entry_or_default(&file.key).insert("get", operation);
    }

    let api = &model.api;
    OpenApi {
        openapi: "3.0.3".to_string(),
        info: super::v2::Info {
            title: api.title.clone().unwrap_or_else(|| api.name.clone()),
            description: api.description.clone(),
            version: api.version.clone().unwrap_or_else(|| "1.0".to_string()),
        },
        servers: api
            .host
            .as_deref()
            .map(|h| vec![Server { url: server_url(h) }])
            .unwrap_or_default(),
        paths,
        components: Components {
            schemas: builder.into_definitions(),
            security_schemes: model
                .security_schemes()
                .iter()
                .map(|s| (s.name.clone(), security_scheme(s)))
                .collect(),
        },
        tags: api
            .tags
            .iter()
            .filter(|t| t.meta.generates())
            .map(|t| super::v2::Tag {
                name: t.name.clone(),
                description: t.description.clone(),
                extensions: merged_extensions(&[&t.meta]),
            })
            .collect(),
        extensions: merged_extensions(&[&api.meta]),
    }
}
