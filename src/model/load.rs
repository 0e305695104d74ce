//! Loading a model document from YAML or JSON into a [`ServiceModel`].
//!
//! The loader resolves type expressions against the declared user types and
//! checks structural problems (duplicate names, bad verbs). HTTP binding
//! problems are left to the resolver so they fail a single method instead of
//! the whole document.

use super::document::*;
use super::typeexpr::{parse_type_expr, TypeExpr};
use super::*;
use anyhow::Context;
use http::Method as Verb;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Structural problems found while loading a model document.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to parse YAML model: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse JSON model: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{context}: invalid type expression {expr:?}: {reason}")]
    InvalidType {
        context: String,
        expr: String,
        reason: String,
    },

    #[error("{context}: unknown type {name:?}")]
    UnknownType { context: String, name: String },

    #[error("{context}: invalid HTTP route {route:?}")]
    InvalidRoute { context: String, route: String },

    #[error("{context}: status {status} is not a valid HTTP status")]
    InvalidStatus { context: String, status: u16 },

    #[error("duplicate {kind} {name:?}")]
    Duplicate { kind: &'static str, name: String },

    #[error("{context}: credential for scheme {scheme:?} needs an explicit role")]
    MissingRole { context: String, scheme: String },
}

/// Serialization format of a model document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Yaml,
    Json,
}

impl ModelFormat {
    /// Detect the format from the file extension, defaulting to YAML.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ModelFormat::Json,
            _ => ModelFormat::Yaml,
        }
    }
}

/// Load a model from disk.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the document is invalid.
pub fn load_model(path: &Path) -> anyhow::Result<ServiceModel> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read model {}", path.display()))?;
    let model = parse_model(&content, ModelFormat::from_path(path))
        .with_context(|| format!("invalid model {}", path.display()))?;
    debug!(
        path = %path.display(),
        services = model.services.len(),
        methods = model.methods.len(),
        types = model.types.len(),
        "model loaded"
    );
    Ok(model)
}

/// Parse a model document held in memory.
///
/// # Errors
///
/// Returns a [`ModelError`] describing the first structural problem.
pub fn parse_model(content: &str, format: ModelFormat) -> Result<ServiceModel, ModelError> {
    let doc: ModelDocument = match format {
        ModelFormat::Yaml => serde_yaml::from_str(content)?,
        ModelFormat::Json => serde_json::from_str(content)?,
    };
    Builder::new(&doc)?.build(doc)
}

struct Builder {
    type_ids: HashMap<String, TypeId>,
    scheme_kinds: HashMap<String, SchemeKind>,
}

impl Builder {
    fn new(doc: &ModelDocument) -> Result<Self, ModelError> {
        let mut type_ids = HashMap::new();
        for (i, t) in doc.types.iter().enumerate() {
            if type_ids.insert(t.name.clone(), TypeId(i)).is_some() {
                return Err(ModelError::Duplicate {
                    kind: "type",
                    name: t.name.clone(),
                });
            }
        }
        let mut scheme_kinds = HashMap::new();
        for s in &doc.security_schemes {
            if scheme_kinds.insert(s.name.clone(), s.kind).is_some() {
                return Err(ModelError::Duplicate {
                    kind: "security scheme",
                    name: s.name.clone(),
                });
            }
        }
        Ok(Self {
            type_ids,
            scheme_kinds,
        })
    }

    fn build(&self, doc: ModelDocument) -> Result<ServiceModel, ModelError> {
        let mut types = Vec::with_capacity(doc.types.len());
        for (i, t) in doc.types.into_iter().enumerate() {
            let context = format!("type {}", t.name);
            let attribute = self.attribute(&t.attribute, &context)?;
            types.push(UserType {
                id: TypeId(i),
                name: t.name,
                attribute,
                views: t
                    .views
                    .into_iter()
                    .map(|v| View {
                        name: v.name,
                        attributes: v.attributes,
                    })
                    .collect(),
            });
        }

        let schemes = doc.security_schemes.into_iter().map(scheme).collect();

        let api = Api {
            errors: self.errors(&doc.api.errors, "api")?,
            error_directives: error_directives(&doc.api.http.errors, "api")?,
            security: requirements(&doc.api.security),
            meta: meta(&doc.api.meta),
            tags: doc
                .api
                .tags
                .iter()
                .map(|t| TagDecl {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    meta: meta(&t.meta),
                })
                .collect(),
            name: doc.api.name,
            title: doc.api.title,
            version: doc.api.version,
            description: doc.api.description,
            host: doc.api.host,
            base_path: doc.api.http.path,
        };

        let mut services: Vec<Service> = Vec::with_capacity(doc.services.len());
        let mut methods: Vec<Method> = Vec::new();
        for (si, s) in doc.services.into_iter().enumerate() {
            if services.iter().any(|existing| existing.name == s.name) {
                return Err(ModelError::Duplicate {
                    kind: "service",
                    name: s.name,
                });
            }
            let service_id = ServiceId(si);
            let context = format!("service {}", s.name);
            let mut method_ids = Vec::with_capacity(s.methods.len());
            for m in &s.methods {
                if methods
                    .iter()
                    .any(|existing| existing.service == service_id && existing.name == m.name)
                {
                    return Err(ModelError::Duplicate {
                        kind: "method",
                        name: format!("{}.{}", s.name, m.name),
                    });
                }
                let id = MethodId(methods.len());
                methods.push(self.method(m, id, service_id, &s.name)?);
                method_ids.push(id);
            }
            services.push(Service {
                id: service_id,
                errors: self.errors(&s.errors, &context)?,
                error_directives: error_directives(&s.http.errors, &context)?,
                security: s.security.as_deref().map(requirements),
                meta: meta(&s.meta),
                files: s
                    .http
                    .files
                    .iter()
                    .map(|f| FileServer {
                        path: f.path.clone(),
                        source: f.source.clone(),
                        description: f.description.clone(),
                        meta: meta(&f.meta),
                    })
                    .collect(),
                methods: method_ids,
                name: s.name,
                description: s.description,
                base_path: s.http.path,
            });
        }

        Ok(ServiceModel {
            api,
            services,
            methods,
            types,
            schemes,
        })
    }

    fn method(
        &self,
        m: &MethodDoc,
        id: MethodId,
        service: ServiceId,
        service_name: &str,
    ) -> Result<Method, ModelError> {
        let context = format!("method {service_name}.{}", m.name);
        let payload = match &m.payload {
            Some(doc) => self.attribute(doc, &format!("{context} payload"))?,
            None => Attribute::empty(),
        };
        let (result, view) = match &m.result {
            Some(doc) => (
                self.attribute(&doc.attribute, &format!("{context} result"))?,
                doc.view.clone(),
            ),
            None => (Attribute::empty(), None),
        };

        let mut routes = Vec::with_capacity(m.http.routes.len());
        for r in &m.http.routes {
            routes.push(route(r, &context)?);
        }

        let mut responses = Vec::with_capacity(m.http.responses.len());
        for r in &m.http.responses {
            responses.push(ResponseDirective {
                status: status(r.status, &context)?,
                headers: r.headers.iter().map(header).collect(),
                body: body(r.body.as_ref()),
                content_type: r.content_type.clone(),
                tag: r.tag.as_ref().map(|t| TagMatch {
                    attribute: t.attribute.clone(),
                    value: t.value.clone(),
                }),
            });
        }

        let mut credentials = Vec::with_capacity(m.credentials.len());
        for c in &m.credentials {
            let role = match (c.role, self.scheme_kinds.get(&c.scheme)) {
                (Some(role), _) => role,
                (None, Some(SchemeKind::Jwt | SchemeKind::Oauth2)) => CredentialRole::Token,
                (None, Some(SchemeKind::ApiKey)) => CredentialRole::Key,
                // Unknown schemes are reported by the resolver for this method only.
                (None, None) => CredentialRole::Token,
                (None, Some(SchemeKind::Basic)) => {
                    return Err(ModelError::MissingRole {
                        context: context.clone(),
                        scheme: c.scheme.clone(),
                    })
                }
            };
            credentials.push(CredentialBinding {
                scheme: c.scheme.clone(),
                attribute: c.attribute.clone(),
                role,
            });
        }

        Ok(Method {
            id,
            service,
            name: m.name.clone(),
            description: m.description.clone(),
            payload,
            result,
            view,
            errors: self.errors(&m.errors, &context)?,
            http: HttpEndpoint {
                routes,
                params: m
                    .http
                    .params
                    .iter()
                    .map(|p| ParamDirective {
                        attribute: p.attribute.clone(),
                        location: p.location,
                        name: p.name.clone(),
                    })
                    .collect(),
                body: body(m.http.body.as_ref()),
                responses,
                errors: error_directives(&m.http.errors, &context)?,
            },
            security: m.security.as_deref().map(requirements),
            credentials,
            meta: meta(&m.meta),
        })
    }

    fn errors(&self, docs: &[ErrorDoc], context: &str) -> Result<Vec<ErrorDecl>, ModelError> {
        docs.iter()
            .map(|e| {
                let ctx = format!("{context} error {}", e.name);
                let mut attribute = if e.attribute.ty.is_none() && e.attribute.fields.is_none() {
                    Attribute::new(generic_error_shape())
                } else {
                    self.attribute(&e.attribute, &ctx)?
                };
                attribute.description = e.attribute.description.clone();
                Ok(ErrorDecl {
                    name: e.name.clone(),
                    description: e.attribute.description.clone(),
                    attribute,
                    temporary: e.temporary,
                    timeout: e.timeout,
                    fault: e.fault,
                })
            })
            .collect()
    }

    fn attribute(&self, doc: &AttributeDoc, context: &str) -> Result<Attribute, ModelError> {
        let ty = match (&doc.fields, &doc.ty) {
            (Some(fields), None) => self.object(fields, context)?,
            (Some(fields), Some(t)) if t == "object" => self.object(fields, context)?,
            (Some(_), Some(t)) => {
                return Err(ModelError::InvalidType {
                    context: context.to_string(),
                    expr: t.clone(),
                    reason: "fields are only allowed on object types".to_string(),
                })
            }
            (None, Some(t)) if t == "object" => AttributeType::Object(Vec::new()),
            (None, Some(t)) => self.type_expr(t, context)?,
            (None, None) => AttributeType::Empty,
        };
        Ok(Attribute {
            ty,
            description: doc.description.clone(),
            validation: Validation {
                min_length: doc.min_length,
                max_length: doc.max_length,
                minimum: doc.minimum,
                maximum: doc.maximum,
                enum_values: doc.enum_values.clone(),
                pattern: doc.pattern.clone(),
            },
            default: doc.default.clone(),
            meta: meta(&doc.meta),
        })
    }

    fn object(&self, fields: &[FieldDoc], context: &str) -> Result<AttributeType, ModelError> {
        let mut out: Vec<Field> = Vec::with_capacity(fields.len());
        for f in fields {
            if out.iter().any(|existing| existing.name == f.name) {
                return Err(ModelError::Duplicate {
                    kind: "field",
                    name: format!("{context}.{}", f.name),
                });
            }
            out.push(Field {
                name: f.name.clone(),
                attribute: self.attribute(&f.attribute, &format!("{context}.{}", f.name))?,
                required: f.required,
            });
        }
        Ok(AttributeType::Object(out))
    }

    fn type_expr(&self, expr: &str, context: &str) -> Result<AttributeType, ModelError> {
        let parsed = parse_type_expr(expr).map_err(|reason| ModelError::InvalidType {
            context: context.to_string(),
            expr: expr.to_string(),
            reason,
        })?;
        self.convert(parsed, context)
    }

    fn convert(&self, expr: TypeExpr, context: &str) -> Result<AttributeType, ModelError> {
        Ok(match expr {
            TypeExpr::Primitive(p) => AttributeType::Primitive(p),
            TypeExpr::Array(elem) => AttributeType::Array(Box::new(self.convert(*elem, context)?)),
            TypeExpr::Map(k, v) => AttributeType::Map(
                Box::new(self.convert(*k, context)?),
                Box::new(self.convert(*v, context)?),
            ),
            TypeExpr::Named(name) => match self.type_ids.get(&name) {
                Some(id) => AttributeType::User(*id),
                None => {
                    return Err(ModelError::UnknownType {
                        context: context.to_string(),
                        name,
                    })
                }
            },
        })
    }
}

/// Shape of errors declared without a type: the same fields the runtime's
/// generic error carries.
fn generic_error_shape() -> AttributeType {
    let field = |name: &str, p: Primitive| Field {
        name: name.to_string(),
        attribute: Attribute::new(AttributeType::Primitive(p)),
        required: true,
    };
    AttributeType::Object(vec![
        field("name", Primitive::String),
        field("id", Primitive::String),
        field("message", Primitive::String),
        field("temporary", Primitive::Boolean),
        field("timeout", Primitive::Boolean),
        field("fault", Primitive::Boolean),
    ])
}

fn scheme(doc: SchemeDoc) -> SecurityScheme {
    let default_location = CredentialLocation::default();
    let location = CredentialLocation {
        location: doc.location.unwrap_or(default_location.location),
        name: doc.param.unwrap_or(default_location.name),
    };
    SecurityScheme {
        scopes: doc
            .scopes
            .into_iter()
            .map(|s| match s {
                ScopeDoc::Name(name) => Scope {
                    name,
                    description: None,
                },
                ScopeDoc::Full { name, description } => Scope { name, description },
            })
            .collect(),
        name: doc.name,
        kind: doc.kind,
        description: doc.description,
        location,
        token_url: doc.token_url,
        authorization_url: doc.authorization_url,
    }
}

fn requirements(docs: &[RequirementDoc]) -> Vec<SecurityRequirement> {
    docs.iter()
        .map(|r| SecurityRequirement {
            schemes: r.schemes.clone(),
            scopes: r.scopes.clone(),
        })
        .collect()
}

fn route(doc: &RouteDoc, context: &str) -> Result<RouteDirective, ModelError> {
    let (verb, path) = match doc {
        RouteDoc::Full { method, path } => (method.as_str(), path.as_str()),
        RouteDoc::Short(s) => match s.trim().split_once(char::is_whitespace) {
            Some((verb, path)) => (verb, path.trim()),
            None => {
                return Err(ModelError::InvalidRoute {
                    context: context.to_string(),
                    route: s.clone(),
                })
            }
        },
    };
    let verb = Verb::from_bytes(verb.to_ascii_uppercase().as_bytes()).map_err(|_| {
        ModelError::InvalidRoute {
            context: context.to_string(),
            route: format!("{verb} {path}"),
        }
    })?;
    Ok(RouteDirective {
        verb,
        path: path.to_string(),
    })
}

fn status(status: Option<u16>, context: &str) -> Result<Option<u16>, ModelError> {
    match status {
        Some(code) if !(100..=599).contains(&code) => Err(ModelError::InvalidStatus {
            context: context.to_string(),
            status: code,
        }),
        other => Ok(other),
    }
}

fn error_directives(
    docs: &[ErrorDirectiveDoc],
    context: &str,
) -> Result<Vec<ErrorDirective>, ModelError> {
    docs.iter()
        .map(|d| {
            Ok(ErrorDirective {
                name: d.name.clone(),
                status: status(d.status, context)?,
                headers: d.headers.iter().map(header).collect(),
                body: body(d.body.as_ref()),
                content_type: d.content_type.clone(),
            })
        })
        .collect()
}

fn header(doc: &HeaderDoc) -> HeaderMapping {
    match doc {
        HeaderDoc::Short(s) => match s.split_once(':') {
            Some((attribute, name)) => HeaderMapping {
                attribute: Some(attribute.trim().to_string()),
                name: name.trim().to_string(),
            },
            None => HeaderMapping {
                attribute: Some(s.clone()),
                name: s.clone(),
            },
        },
        HeaderDoc::Full { attribute, name } => HeaderMapping {
            attribute: attribute.clone(),
            name: name.clone(),
        },
    }
}

fn body(doc: Option<&BodyDoc>) -> BodyDirective {
    match doc {
        None => BodyDirective::Default,
        Some(BodyDoc::Name(name)) if name == "none" => BodyDirective::None,
        Some(BodyDoc::Name(name)) => BodyDirective::Attribute(name.clone()),
        Some(BodyDoc::Names(names)) => BodyDirective::Attributes(names.clone()),
    }
}

fn meta(doc: &MetaDoc) -> Meta {
    let mut out = Meta::new();
    for (key, value) in doc {
        let values = match value {
            Value::Null => Vec::new(),
            Value::String(s) => vec![s.clone()],
            Value::Array(items) => items.iter().map(scalar_text).collect(),
            other => vec![scalar_text(other)],
        };
        out.push(key.clone(), values);
    }
    out
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn unknown_type_reference_is_reported() {
        let doc = r#"
api: { name: a }
services:
  - name: s
    methods:
      - name: m
        payload: { type: "array<Missing>" }
"#;
        let err = parse_model(doc, ModelFormat::Yaml).unwrap_err();
        match err {
            ModelError::UnknownType { name, context } => {
                assert_eq!(name, "Missing");
                assert!(context.contains("s.m"));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn route_shorthand_and_directives() {
        let doc = r#"
api:
  name: a
  http: { path: /api }
security_schemes:
  - { name: key, kind: api_key, in: query, param: api_key }
services:
  - name: s
    http:
      path: /s
      files:
        - { path: "/static/{*path}", source: public/ }
    methods:
      - name: m
        payload:
          fields:
            - { name: id, type: uint32, required: true }
            - { name: key, type: string }
        credentials: [{ scheme: key, attribute: key }]
        errors:
          - { name: not_found, type: string }
          - { name: boom, fault: true }
        http:
          routes: ["get /items/{id}", { method: PUT, path: "/items/{id}" }]
          body: none
          responses: [{ status: 204, headers: ["etag:ETag"] }]
          errors: [{ name: not_found, status: 404, body: none, headers: [{ name: X-Reason }] }]
"#;
        let model = parse_model(doc, ModelFormat::Yaml).unwrap();
        let method = model.method(MethodId(0));
        assert_eq!(method.http.routes[0].verb, Verb::GET);
        assert_eq!(method.http.routes[1].verb, Verb::PUT);
        assert_eq!(method.http.body, BodyDirective::None);
        assert_eq!(method.credentials[0].role, CredentialRole::Key);
        assert_eq!(
            method.http.responses[0].headers[0],
            HeaderMapping {
                attribute: Some("etag".into()),
                name: "ETag".into()
            }
        );
        assert_eq!(method.http.errors[0].headers[0].attribute, None);
        assert!(method.errors[1].fault);
        assert!(model.fields(&method.errors[1].attribute.ty).is_some());
        let scheme = &model.security_schemes()[0];
        assert_eq!(scheme.location.location, WireLocation::Query);
        assert_eq!(scheme.location.name, "api_key");
        assert_eq!(model.services()[0].files[0].source, "public/");
        assert_eq!(model.api.base_path.as_deref(), Some("/api"));
    }

    #[test]
    fn duplicate_methods_rejected() {
        let doc = r#"
api: { name: a }
services:
  - name: s
    methods: [{ name: m }, { name: m }]
"#;
        assert!(matches!(
            parse_model(doc, ModelFormat::Yaml),
            Err(ModelError::Duplicate { kind: "method", .. })
        ));
    }

    #[test]
    fn json_documents_load() {
        let doc = r#"{"api": {"name": "a", "meta": {
            "openapi:extension:x-a": "1", "openapi:generate": false
        }}}"#;
        let model = parse_model(doc, ModelFormat::Json).unwrap();
        assert_eq!(model.api.meta.last("openapi:extension:x-a"), Some("1"));
        assert!(!model.api.meta.generates());
    }
}
