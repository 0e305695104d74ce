use crate::model::{
    AttributeType, CredentialRole, Meta, MethodId, SchemeKind, ServiceId, Validation,
    WireLocation,
};
use http::Method as Verb;
use std::fmt;

/// One concrete route of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteBinding {
    pub verb: Verb,
    /// Fully composed path template (API base, service base, method path).
    pub pattern: String,
    /// Path parameter names in template order.
    pub params: Vec<String>,
    /// Name of the trailing `{*name}` parameter, if any.
    pub wildcard: Option<String>,
}

/// Credential role of an attribute bound to a security scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialSlot {
    pub scheme: String,
    pub kind: SchemeKind,
    pub role: CredentialRole,
}

/// Wire placement of one payload attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeBinding {
    /// Attribute name in the payload. For non-object payloads this is the
    /// wire name of the whole value.
    pub attribute: String,
    pub location: WireLocation,
    /// Path parameter, query key, header name or body key.
    pub wire_name: String,
    pub ty: AttributeType,
    pub required: bool,
    pub validation: Validation,
    pub credential: Option<CredentialSlot>,
}

/// How the payload maps onto the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    Empty,
    /// Object payload, attributes bound one by one.
    Object,
    /// Primitive, array or map payload bound wholesale to a single location.
    Single,
}

/// Which attributes make up a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyShape {
    None,
    /// Object made of these attributes.
    Object(Vec<String>),
    /// Raw value of one attribute.
    Attribute(String),
    /// The whole (non-object) value.
    Whole,
}

impl BodyShape {
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, BodyShape::None)
    }
}

/// Header carrying a result or error attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderBinding {
    /// `None` maps the whole value.
    pub attribute: Option<String>,
    pub name: String,
    pub ty: AttributeType,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseTag {
    pub attribute: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseBinding {
    pub status: u16,
    pub headers: Vec<HeaderBinding>,
    pub body: BodyShape,
    pub content_type: Option<String>,
    pub tag: Option<ResponseTag>,
}

/// Scope an error was declared at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
    Method,
    Service,
    Api,
}

impl fmt::Display for ErrorScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorScope::Method => write!(f, "method"),
            ErrorScope::Service => write!(f, "service"),
            ErrorScope::Api => write!(f, "api"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBinding {
    pub name: String,
    pub scope: ErrorScope,
    pub description: Option<String>,
    pub status: u16,
    pub ty: AttributeType,
    pub headers: Vec<HeaderBinding>,
    pub body: BodyShape,
    pub content_type: Option<String>,
    pub temporary: bool,
    pub timeout: bool,
    pub fault: bool,
}

impl ErrorBinding {
    /// Errors whose value travels only in headers.
    #[must_use]
    pub fn is_header_only(&self) -> bool {
        self.body.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeScopes {
    pub scheme: String,
    pub kind: SchemeKind,
    pub scopes: Vec<String>,
}

/// One alternative of the effective security requirements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequirement {
    pub schemes: Vec<SchemeScopes>,
}

/// Fully resolved HTTP binding of one method.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointBinding {
    pub service: ServiceId,
    pub method: MethodId,
    pub service_name: String,
    pub method_name: String,
    pub routes: Vec<RouteBinding>,
    pub payload: PayloadShape,
    pub payload_type: AttributeType,
    pub attributes: Vec<AttributeBinding>,
    pub body: BodyShape,
    pub result_type: AttributeType,
    pub view: Option<String>,
    pub responses: Vec<ResponseBinding>,
    pub errors: Vec<ErrorBinding>,
    pub security: Vec<ResolvedRequirement>,
}

impl EndpointBinding {
    pub fn attributes_in(&self, location: WireLocation) -> impl Iterator<Item = &AttributeBinding> {
        self.attributes.iter().filter(move |a| a.location == location)
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeBinding> {
        self.attributes.iter().find(|a| a.attribute == name)
    }

    #[must_use]
    pub fn error(&self, name: &str) -> Option<&ErrorBinding> {
        self.errors.iter().find(|e| e.name == name)
    }

    /// Attribute bound to a path parameter of `route`.
    #[must_use]
    pub fn path_attribute(&self, param: &str) -> Option<&AttributeBinding> {
        self.attributes
            .iter()
            .find(|a| a.location == WireLocation::Path && a.wire_name == param)
    }
}

/// A static file mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticMount {
    pub service: ServiceId,
    pub service_name: String,
    pub path: String,
    pub source: String,
    pub description: Option<String>,
    pub meta: Meta,
}

impl StaticMount {
    /// Wildcard parameter receiving the requested file path.
    #[must_use]
    pub fn wildcard(&self) -> Option<String> {
        super::path_params(&self.path)
            .into_iter()
            .find(|p| p.wildcard)
            .map(|p| p.name)
    }
}
