//! Abstract service model.
//!
//! The model is an immutable arena: services, methods, user types and
//! security schemes are stored in declaration order and refer to each other
//! through [`ServiceId`], [`MethodId`] and [`TypeId`]. It is built once per run
//! by [`load`] (or by hand in tests) and only read afterwards.

mod document;
mod ids;
pub mod load;
mod meta;
mod service;
mod typeexpr;
mod types;

pub use ids::{MethodId, ServiceId, TypeId};
pub use load::{load_model, parse_model, ModelError, ModelFormat};
pub use meta::{
    Meta, META_EXTENSION_PREFIX, META_GENERATE, META_OPERATION_ID, META_SUMMARY,
    META_TAG_PREFIX,
};
pub use service::{
    Api, BodyDirective, CredentialBinding, CredentialLocation, CredentialRole, ErrorDecl,
    ErrorDirective, FileServer, HeaderMapping, HttpEndpoint, Method, ParamDirective,
    ResponseDirective, RouteDirective, SchemeKind, Scope, SecurityRequirement,
    SecurityScheme, Service, TagDecl, TagMatch, WireLocation,
};
pub use typeexpr::parse_type_expr;
pub use types::{
    Attribute, AttributeType, Field, Primitive, UserType, Validation, View, DEFAULT_VIEW,
};

/// Read-only arena holding one API description.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceModel {
    pub api: Api,
    pub(crate) services: Vec<Service>,
    pub(crate) methods: Vec<Method>,
    pub(crate) types: Vec<UserType>,
    pub(crate) schemes: Vec<SecurityScheme>,
}

/// Nesting limit when following user type aliases.
const MAX_ALIAS_DEPTH: usize = 32;

impl ServiceModel {
    #[must_use]
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    #[must_use]
    pub fn service(&self, id: ServiceId) -> &Service {
        &self.services[id.index()]
    }

    #[must_use]
    pub fn method(&self, id: MethodId) -> &Method {
        &self.methods[id.index()]
    }

    /// Methods of a service in declaration order.
    pub fn methods_of(&self, id: ServiceId) -> impl Iterator<Item = &Method> {
        self.service(id).methods.iter().map(|m| self.method(*m))
    }

    #[must_use]
    pub fn user_types(&self) -> &[UserType] {
        &self.types
    }

    #[must_use]
    pub fn user_type(&self, id: TypeId) -> &UserType {
        &self.types[id.index()]
    }

    #[must_use]
    pub fn find_type(&self, name: &str) -> Option<&UserType> {
        self.types.iter().find(|t| t.name == name)
    }

    #[must_use]
    pub fn find_service(&self, name: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.name == name)
    }

    #[must_use]
    pub fn security_schemes(&self) -> &[SecurityScheme] {
        &self.schemes
    }

    /// Follows user type references to the underlying shape.
    #[must_use]
    pub fn resolve<'a>(&'a self, ty: &'a AttributeType) -> &'a AttributeType {
        let mut current = ty;
        for _ in 0..MAX_ALIAS_DEPTH {
            match current {
                AttributeType::User(id) => current = &self.user_type(*id).attribute.ty,
                _ => return current,
            }
        }
        current
    }

    /// Fields of an object type (inline or user-declared), `None` otherwise.
    #[must_use]
    pub fn fields<'a>(&'a self, ty: &'a AttributeType) -> Option<&'a [Field]> {
        match self.resolve(ty) {
            AttributeType::Object(fields) => Some(fields.as_slice()),
            _ => None,
        }
    }

    /// Name of the user type behind `ty`, if any.
    #[must_use]
    pub fn type_name(&self, ty: &AttributeType) -> Option<&str> {
        match ty {
            AttributeType::User(id) => Some(self.user_type(*id).name.as_str()),
            _ => None,
        }
    }
}
