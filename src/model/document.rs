//! Serde shapes of the model document. These mirror the YAML/JSON input
//! one-to-one and are turned into the arena by [`super::load`].

use super::WireLocation;
use super::{CredentialRole, SchemeKind};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Metadata as written in the document. `preserve_order` keeps the keys in
/// declaration order.
pub type MetaDoc = Map<String, Value>;

#[derive(Debug, Deserialize)]
pub struct ModelDocument {
    pub api: ApiDoc,
    #[serde(default)]
    pub security_schemes: Vec<SchemeDoc>,
    #[serde(default)]
    pub types: Vec<TypeDoc>,
    #[serde(default)]
    pub services: Vec<ServiceDoc>,
}

#[derive(Debug, Deserialize)]
pub struct ApiDoc {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub http: ScopeHttpDoc,
    #[serde(default)]
    pub errors: Vec<ErrorDoc>,
    #[serde(default)]
    pub security: Vec<RequirementDoc>,
    #[serde(default)]
    pub meta: MetaDoc,
    #[serde(default)]
    pub tags: Vec<TagDoc>,
}

/// HTTP block shared by the API and service scopes.
#[derive(Debug, Default, Deserialize)]
pub struct ScopeHttpDoc {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub errors: Vec<ErrorDirectiveDoc>,
    #[serde(default)]
    pub files: Vec<FileDoc>,
}

#[derive(Debug, Deserialize)]
pub struct TagDoc {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub meta: MetaDoc,
}

#[derive(Debug, Deserialize)]
pub struct FileDoc {
    pub path: String,
    pub source: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub meta: MetaDoc,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ScopeDoc {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        description: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
pub struct SchemeDoc {
    pub name: String,
    pub kind: SchemeKind,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub scopes: Vec<ScopeDoc>,
    #[serde(default, rename = "in")]
    pub location: Option<WireLocation>,
    /// Header or query parameter name carrying the credential.
    #[serde(default)]
    pub param: Option<String>,
    #[serde(default)]
    pub token_url: Option<String>,
    #[serde(default)]
    pub authorization_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RequirementDoc {
    pub schemes: Vec<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AttributeDoc {
    #[serde(rename = "type")]
    pub ty: Option<String>,
    pub fields: Option<Vec<FieldDoc>>,
    pub description: Option<String>,
    pub default: Option<Value>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    #[serde(rename = "enum")]
    pub enum_values: Vec<Value>,
    pub pattern: Option<String>,
    pub meta: MetaDoc,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldDoc {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(flatten)]
    pub attribute: AttributeDoc,
}

#[derive(Debug, Deserialize)]
pub struct ViewDoc {
    pub name: String,
    pub attributes: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TypeDoc {
    pub name: String,
    #[serde(default)]
    pub views: Vec<ViewDoc>,
    #[serde(flatten)]
    pub attribute: AttributeDoc,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDoc {
    pub name: String,
    #[serde(default)]
    pub temporary: bool,
    #[serde(default)]
    pub timeout: bool,
    #[serde(default)]
    pub fault: bool,
    #[serde(flatten)]
    pub attribute: AttributeDoc,
}

#[derive(Debug, Deserialize)]
pub struct ResultDoc {
    #[serde(default)]
    pub view: Option<String>,
    #[serde(flatten)]
    pub attribute: AttributeDoc,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServiceDoc {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub http: ScopeHttpDoc,
    #[serde(default)]
    pub errors: Vec<ErrorDoc>,
    #[serde(default)]
    pub security: Option<Vec<RequirementDoc>>,
    #[serde(default)]
    pub meta: MetaDoc,
    #[serde(default)]
    pub methods: Vec<MethodDoc>,
}

#[derive(Debug, Deserialize)]
pub struct MethodDoc {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub payload: Option<AttributeDoc>,
    #[serde(default)]
    pub result: Option<ResultDoc>,
    #[serde(default)]
    pub errors: Vec<ErrorDoc>,
    #[serde(default)]
    pub security: Option<Vec<RequirementDoc>>,
    #[serde(default)]
    pub credentials: Vec<CredentialDoc>,
    #[serde(default)]
    pub meta: MetaDoc,
    #[serde(default)]
    pub http: EndpointHttpDoc,
}

#[derive(Debug, Deserialize)]
pub struct CredentialDoc {
    pub scheme: String,
    pub attribute: String,
    #[serde(default)]
    pub role: Option<CredentialRole>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EndpointHttpDoc {
    #[serde(default)]
    pub routes: Vec<RouteDoc>,
    #[serde(default)]
    pub params: Vec<ParamDoc>,
    #[serde(default)]
    pub body: Option<BodyDoc>,
    #[serde(default)]
    pub responses: Vec<ResponseDoc>,
    #[serde(default)]
    pub errors: Vec<ErrorDirectiveDoc>,
}

/// Either `"GET /items/{id}"` or `{ method: GET, path: "/items/{id}" }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RouteDoc {
    Short(String),
    Full { method: String, path: String },
}

#[derive(Debug, Deserialize)]
pub struct ParamDoc {
    pub attribute: String,
    #[serde(rename = "in")]
    pub location: WireLocation,
    #[serde(default)]
    pub name: Option<String>,
}

/// `none`, a single attribute name, or a list of attribute names.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BodyDoc {
    Name(String),
    Names(Vec<String>),
}

/// Either `"attribute:Header-Name"` (or just `"name"`) or the long form. The
/// long form without `attribute` maps the whole value.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HeaderDoc {
    Short(String),
    Full {
        #[serde(default)]
        attribute: Option<String>,
        name: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagMatchDoc {
    pub attribute: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct ResponseDoc {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub headers: Vec<HeaderDoc>,
    #[serde(default)]
    pub body: Option<BodyDoc>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub tag: Option<TagMatchDoc>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDirectiveDoc {
    pub name: String,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub headers: Vec<HeaderDoc>,
    #[serde(default)]
    pub body: Option<BodyDoc>,
    #[serde(default)]
    pub content_type: Option<String>,
}
