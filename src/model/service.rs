use super::{Attribute, Meta, MethodId, ServiceId};
use http::Method as Verb;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire location of a payload or result attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireLocation {
    Path,
    Query,
    Header,
    Body,
}

impl fmt::Display for WireLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireLocation::Path => write!(f, "path"),
            WireLocation::Query => write!(f, "query"),
            WireLocation::Header => write!(f, "header"),
            WireLocation::Body => write!(f, "body"),
        }
    }
}

/// Which attributes make up a request or response body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BodyDirective {
    /// Let the resolver decide from the remaining attributes.
    #[default]
    Default,
    /// No body at all.
    None,
    /// The body is the raw value of one attribute.
    Attribute(String),
    /// The body is an object restricted to these attributes.
    Attributes(Vec<String>),
}

/// Maps an attribute (or the whole value when `attribute` is `None`) to an
/// HTTP header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMapping {
    pub attribute: Option<String>,
    pub name: String,
}

/// One `verb path` pair declared on a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDirective {
    pub verb: Verb,
    pub path: String,
}

/// Explicit location for a payload attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDirective {
    pub attribute: String,
    pub location: WireLocation,
    /// Wire name, defaults to the attribute name.
    pub name: Option<String>,
}

/// Discriminates between several success responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMatch {
    pub attribute: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseDirective {
    pub status: Option<u16>,
    pub headers: Vec<HeaderMapping>,
    pub body: BodyDirective,
    pub content_type: Option<String>,
    pub tag: Option<TagMatch>,
}

/// HTTP mapping of a declared error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDirective {
    pub name: String,
    pub status: Option<u16>,
    pub headers: Vec<HeaderMapping>,
    pub body: BodyDirective,
    pub content_type: Option<String>,
}

/// HTTP directives of a method.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HttpEndpoint {
    pub routes: Vec<RouteDirective>,
    pub params: Vec<ParamDirective>,
    pub body: BodyDirective,
    pub responses: Vec<ResponseDirective>,
    pub errors: Vec<ErrorDirective>,
}

/// Error a method may return.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDecl {
    pub name: String,
    pub attribute: Attribute,
    pub description: Option<String>,
    pub temporary: bool,
    pub timeout: bool,
    pub fault: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeKind {
    Basic,
    ApiKey,
    Jwt,
    Oauth2,
}

impl SchemeKind {
    /// Only token based schemes carry scopes.
    #[must_use]
    pub fn has_scopes(self) -> bool {
        matches!(self, SchemeKind::Jwt | SchemeKind::Oauth2)
    }
}

impl fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SchemeKind::Basic => "basic",
            SchemeKind::ApiKey => "api_key",
            SchemeKind::Jwt => "jwt",
            SchemeKind::Oauth2 => "oauth2",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub name: String,
    pub description: Option<String>,
}

/// Where a scheme expects its credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialLocation {
    pub location: WireLocation,
    pub name: String,
}

impl Default for CredentialLocation {
    fn default() -> Self {
        Self {
            location: WireLocation::Header,
            name: "Authorization".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityScheme {
    pub name: String,
    pub kind: SchemeKind,
    pub description: Option<String>,
    pub scopes: Vec<Scope>,
    pub location: CredentialLocation,
    pub token_url: Option<String>,
    pub authorization_url: Option<String>,
}

/// One alternative requirement: every listed scheme must be satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SecurityRequirement {
    pub schemes: Vec<String>,
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialRole {
    Token,
    Key,
    Username,
    Password,
}

/// Binds a payload attribute to the credential of a scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialBinding {
    pub scheme: String,
    pub attribute: String,
    pub role: CredentialRole,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub id: MethodId,
    pub service: ServiceId,
    pub name: String,
    pub description: Option<String>,
    pub payload: Attribute,
    pub result: Attribute,
    /// View applied to the result when encoding responses.
    pub view: Option<String>,
    pub errors: Vec<ErrorDecl>,
    pub http: HttpEndpoint,
    /// `None` inherits from the service, then the API.
    pub security: Option<Vec<SecurityRequirement>>,
    pub credentials: Vec<CredentialBinding>,
    pub meta: Meta,
}

/// Static file mount served by an external file server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileServer {
    pub path: String,
    pub source: String,
    pub description: Option<String>,
    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    pub description: Option<String>,
    pub base_path: Option<String>,
    pub errors: Vec<ErrorDecl>,
    pub error_directives: Vec<ErrorDirective>,
    pub security: Option<Vec<SecurityRequirement>>,
    pub meta: Meta,
    pub files: Vec<FileServer>,
    pub methods: Vec<MethodId>,
}

/// Documentation tag declared at API level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDecl {
    pub name: String,
    pub description: Option<String>,
    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Api {
    pub name: String,
    pub title: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub host: Option<String>,
    pub base_path: Option<String>,
    pub errors: Vec<ErrorDecl>,
    pub error_directives: Vec<ErrorDirective>,
    pub security: Vec<SecurityRequirement>,
    pub meta: Meta,
    pub tags: Vec<TagDecl>,
}
