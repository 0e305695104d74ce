//! Swagger 2.0.

use super::{
    error_body_schema, file_operations, operations, parameter_description, parameter_schema,
    parameters, request_body_schema, response_body_schema, security_requirements,
    status_description, OrderedMap, Schema, SchemaBuilder,
};
use crate::binding::{HeaderBinding, Resolution};
use crate::runtime::{JSON, XML, YAML};
use crate::model::{AttributeType, SchemeKind, SecurityScheme, ServiceModel, WireLocation};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Swagger {
    pub swagger: String,
    pub info: Info,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    pub paths: OrderedMap<OrderedMap<Operation>>,
    #[serde(skip_serializing_if = "OrderedMap::is_empty")]
    pub definitions: OrderedMap<Schema>,
    #[serde(skip_serializing_if = "OrderedMap::is_empty")]
    pub security_definitions: OrderedMap<SecurityDefinition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(flatten)]
    pub extensions: OrderedMap<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Info {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extensions: OrderedMap<Value>,
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
    pub produces: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    pub responses: OrderedMap<Response>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<OrderedMap<Vec<String>>>,
    #[serde(flatten)]
    pub extensions: OrderedMap<Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    /// Body parameters only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    /// `multi` for repeated query keys, `csv` otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_format: Option<String>,
    /// Type and constraints of non-body parameters.
    #[serde(flatten)]
    pub inline: Schema,
}

#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(skip_serializing_if = "OrderedMap::is_empty")]
    pub headers: OrderedMap<Schema>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes: Option<OrderedMap<String>>,
}

fn media_types() -> Vec<String> {
    [JSON, XML, YAML].iter().map(|s| (*s).to_string()).collect()
}

fn security_definition(scheme: &SecurityScheme) -> SecurityDefinition {
    let mut def = SecurityDefinition {
        kind: String::new(),
        description: scheme.description.clone(),
        name: None,
        location: None,
        flow: None,
        authorization_url: None,
        token_url: None,
        scopes: None,
    };
    match scheme.kind {
        SchemeKind::Basic => def.kind = "basic".to_string(),
        SchemeKind::ApiKey | SchemeKind::Jwt => {
            def.kind = "apiKey".to_string();
            def.name = Some(scheme.location.name.clone());
            def.location = Some(match scheme.location.location {
                WireLocation::Query => "query".to_string(),
                _ => "header".to_string(),
            });
        }
        SchemeKind::Oauth2 => {
            def.kind = "oauth2".to_string();
            let flow = match (&scheme.authorization_url, &scheme.token_url) {
                (Some(_), Some(_)) => "accessCode",
                (None, Some(_)) => "application",
                _ => "implicit",
            };
            def.flow = Some(flow.to_string());
            def.authorization_url.clone_from(&scheme.authorization_url);
            def.token_url.clone_from(&scheme.token_url);
            def.scopes = Some(
                scheme
                    .scopes
                    .iter()
                    .map(|s| (s.name.clone(), s.description.clone().unwrap_or_default()))
                    .collect(),
            );
        }
    }
    def
}

fn headers(
    builder: &mut SchemaBuilder<'_>,
    ty: &AttributeType,
    bindings: &[HeaderBinding],
) -> OrderedMap<Schema> {
    bindings
        .iter()
        .map(|hb| {
            let mut schema = builder.inline(&hb.ty);
            if let Some(attr) = &hb.attribute {
                schema.description = builder.field_description(ty, attr);
            }
            (hb.name.clone(), schema)
        })
        .collect()
}

/// Build the Swagger 2.0 document.
#[must_use]
pub fn synthesize(model: &ServiceModel, resolution: &Resolution) -> Swagger {
    let mut builder = SchemaBuilder::new(model, "#/definitions/");
    let mut paths: OrderedMap<OrderedMap<Operation>> = OrderedMap::new();

    for src in operations(model, resolution) {
        let ep = src.ep;
        let mut params = Vec::new();
        for ab in parameters(&src) {
            let inline = parameter_schema(&mut builder, ab);
            let is_array = inline.ty.as_deref() == Some("array");
            params.push(Parameter {
                name: ab.wire_name.clone(),
                location: ab.location.to_string(),
                description: parameter_description(&builder, &src, ab),
                required: ab.location == WireLocation::Path || ab.required,
                schema: None,
                collection_format: is_array.then(|| {
                    if ab.location == WireLocation::Query {
                        "multi".to_string()
                    } else {
                        "csv".to_string()
                    }
                }),
                inline,
            });
        }
        if let Some(schema) = request_body_schema(&mut builder, ep) {
            params.push(Parameter {
                name: "body".to_string(),
                location: "body".to_string(),
                description: src.method.payload.description.clone(),
                required: true,
                schema: Some(schema),
                collection_format: None,
                inline: Schema::default(),
            });
        }

        let mut produces: Vec<String> = Vec::new();
        let mut responses = OrderedMap::new();
        for response in &ep.responses {
            if let Some(ct) = &response.content_type {
                if !produces.contains(ct) {
                    produces.push(ct.clone());
                }
            }
            responses.insert_new(
                response.status.to_string(),
                Response {
                    description: status_description(response.status),
                    schema: response_body_schema(&mut builder, ep, response),
                    headers: headers(&mut builder, &ep.result_type, &response.headers),
                },
            );
        }
        for err in &ep.errors {
            responses.insert_new(
                err.status.to_string(),
                Response {
                    description: err.description.clone().unwrap_or_else(|| {
                        format!("{}: {}", err.name, status_description(err.status))
                    }),
                    schema: error_body_schema(&mut builder, err),
                    headers: headers(&mut builder, &err.ty, &err.headers),
                },
            );
        }

        let operation = Operation {
            tags: src.tags.clone(),
            summary: src.summary.clone(),
            description: src.description.clone(),
            operation_id: src.operation_id.clone(),
            produces,
            parameters: params,
            responses,
            security: security_requirements(&ep.security),
            extensions: src.extensions.clone(),
        };
        paths.entry_or_default(&src.key).insert(src.verb.clone(), operation);
    }

    for file in file_operations(model, resolution) {
        let mut responses = OrderedMap::new();
        responses.insert(
            "200",
            Response {
                description: "File downloaded".to_string(),
                schema: Some(Schema::of_type("file")),
                headers: OrderedMap::new(),
            },
        );
        let mut params = Vec::new();
        if let Some(wildcard) = &file.wildcard {
            params.push(Parameter {
                name: wildcard.clone(),
                location: "path".to_string(),
                description: Some("Relative file path".to_string()),
                required: true,
                schema: None,
                collection_format: None,
                inline: Schema::of_type("string"),
            });
            responses.insert(
                "404",
                Response {
                    description: "File not found".to_string(),
                    schema: None,
                    headers: OrderedMap::new(),
                },
            );
        }
        let operation = Operation {
            tags: file.tags.clone(),
            summary: file.summary.clone(),
            description: file.mount.description.clone(),
            operation_id: file.operation_id.clone(),
            produces: Vec::new(),
            parameters: params,
            responses,
            security: Vec::new(),
            extensions: file.extensions.clone(),
        };
        paths.entry_or_default(&file.key).insert("get", operation);
    }

    let api = &model.api;
    Swagger {
        swagger: "2.0".to_string(),
        info: Info {
            title: api.title.clone().unwrap_or_else(|| api.name.clone()),
            description: api.description.clone(),
            version: api.version.clone().unwrap_or_else(|| "1.0".to_string()),
        },
        host: api.host.clone(),
        consumes: media_types(),
        produces: media_types(),
        paths,
        definitions: builder.into_definitions(),
        security_definitions: model
            .security_schemes()
            .iter()
            .map(|s| (s.name.clone(), security_definition(s)))
            .collect(),
        tags: api
            .tags
            .iter()
            .filter(|t| t.meta.generates())
            .map(|t| Tag {
                name: t.name.clone(),
                description: t.description.clone(),
                extensions: super::merged_extensions(&[&t.meta]),
            })
            .collect(),
        extensions: super::merged_extensions(&[&api.meta]),
    }
}
