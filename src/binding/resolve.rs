//! Resolution of methods into [`EndpointBinding`]s.
//!
//! Resolution walks the model top-down once: services in declaration order,
//! their methods in declaration order, then the service's static mounts. A
//! failure is recorded against the offending method and the walk continues.

use super::error::{ResolutionError, ResolutionErrorKind as Kind};
use super::paths::{canonical_pattern, join_paths, path_params};
use super::security::SchemeRegistry;
use super::types::*;
use crate::model::{
    AttributeType, BodyDirective, ErrorDecl, ErrorDirective, Field, HeaderMapping, Method,
    ResponseDirective, ServiceId, ServiceModel, Service, WireLocation, DEFAULT_VIEW,
};
use http::Method as Verb;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Everything the resolver produced for one model.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub endpoints: Vec<EndpointBinding>,
    pub mounts: Vec<StaticMount>,
    pub failures: Vec<ResolutionError>,
}

impl Resolution {
    pub fn endpoints_of(&self, service: ServiceId) -> impl Iterator<Item = &EndpointBinding> {
        self.endpoints.iter().filter(move |e| e.service == service)
    }

    pub fn mounts_of(&self, service: ServiceId) -> impl Iterator<Item = &StaticMount> {
        self.mounts.iter().filter(move |m| m.service == service)
    }

    #[must_use]
    pub fn endpoint(&self, service: &str, method: &str) -> Option<&EndpointBinding> {
        self.endpoints
            .iter()
            .find(|e| e.service_name == service && e.method_name == method)
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Resolve every method of every service.
///
/// # Arguments
///
/// * `model` - The service model
/// * `schemes` - Security schemes methods may reference
///
/// # Returns
///
/// A [`Resolution`] holding the bound endpoints, the static mounts and one
/// [`ResolutionError`] per method that could not be bound.
#[must_use]
pub fn resolve(model: &ServiceModel, schemes: &SchemeRegistry) -> Resolution {
    let mut resolution = Resolution::default();
    for service in model.services() {
        let mut claims: Vec<Claim> = Vec::new();
        for method in model.methods_of(service.id) {
            let ctx = Ctx {
                model,
                schemes,
                service,
                method,
            };
            let outcome = ctx.endpoint().and_then(|endpoint| {
                claim_routes(&mut claims, &endpoint.routes, &method.name)
                    .map_err(|message| ctx.fail(Kind::DuplicateRoute, message))?;
                Ok(endpoint)
            });
            match outcome {
                Ok(endpoint) => {
                    debug!(
                        service = %service.name,
                        method = %method.name,
                        routes = endpoint.routes.len(),
                        attributes = endpoint.attributes.len(),
                        errors = endpoint.errors.len(),
                        "endpoint resolved"
                    );
                    resolution.endpoints.push(endpoint);
                }
                Err(err) => {
                    warn!(
                        service = %service.name,
                        method = %method.name,
                        kind = %err.kind,
                        "{}",
                        err.message
                    );
                    resolution.failures.push(err);
                }
            }
        }
        for file in &service.files {
            match static_mount(model, service, file, &mut claims) {
                Ok(mount) => resolution.mounts.push(mount),
                Err(err) => {
                    warn!(service = %service.name, path = %file.path, "{}", err.message);
                    resolution.failures.push(err);
                }
            }
        }
    }
    info!(
        endpoints = resolution.endpoints.len(),
        mounts = resolution.mounts.len(),
        failures = resolution.failures.len(),
        "binding resolution complete"
    );
    resolution
}

struct Claim {
    verb: Verb,
    canonical: String,
    owner: String,
}

/// Reserve the (verb, path) pairs of a method. Nothing is reserved when any
/// pair is taken.
fn claim_routes(
    claims: &mut Vec<Claim>,
    routes: &[RouteBinding],
    owner: &str,
) -> Result<(), String> {
    let mut pending: Vec<Claim> = Vec::with_capacity(routes.len());
    for route in routes {
        let canonical = canonical_pattern(&route.pattern);
        if let Some(existing) = claims
            .iter()
            .chain(pending.iter())
            .find(|c| c.verb == route.verb && c.canonical == canonical)
        {
            return Err(format!(
                "{} {} is already bound to {}",
                route.verb, route.pattern, existing.owner
            ));
        }
        pending.push(Claim {
            verb: route.verb.clone(),
            canonical,
            owner: owner.to_string(),
        });
    }
    claims.extend(pending);
    Ok(())
}

fn static_mount(
    model: &ServiceModel,
    service: &Service,
    file: &crate::model::FileServer,
    claims: &mut Vec<Claim>,
) -> Result<StaticMount, ResolutionError> {
    let fail = |kind, message: String| {
        ResolutionError::new(service.name.clone(), None, kind, message)
            .with_attribute(file.path.clone())
    };
    let path = join_paths(&bases(model, service), &file.path);
    let params = path_params(&path);
    if params.iter().any(|p| !p.wildcard) || params.len() > 1 {
        return Err(fail(
            Kind::InvalidRoute,
            format!("file mount {path} may only declare a single trailing wildcard"),
        ));
    }
    if let Some(p) = params.first() {
        if !path.ends_with(&format!("{{*{}}}", p.name)) {
            return Err(fail(
                Kind::InvalidRoute,
                format!("wildcard {{*{}}} must be the last segment of {path}", p.name),
            ));
        }
    }
    let route = RouteBinding {
        verb: Verb::GET,
        pattern: path.clone(),
        params: params.iter().map(|p| p.name.clone()).collect(),
        wildcard: params.first().map(|p| p.name.clone()),
    };
    claim_routes(claims, std::slice::from_ref(&route), &format!("file mount {}", file.source))
        .map_err(|message| fail(Kind::DuplicateRoute, message))?;
    Ok(StaticMount {
        service: service.id,
        service_name: service.name.clone(),
        path,
        source: file.source.clone(),
        description: file.description.clone(),
        meta: file.meta.clone(),
    })
}

fn bases<'a>(model: &'a ServiceModel, service: &'a Service) -> Vec<&'a str> {
    [model.api.base_path.as_deref(), service.base_path.as_deref()]
        .into_iter()
        .flatten()
        .collect()
}

/// Candidate wire location for an attribute, with where it came from.
struct Placement {
    location: WireLocation,
    wire_name: String,
    source: &'static str,
}

struct Ctx<'a> {
    model: &'a ServiceModel,
    schemes: &'a SchemeRegistry,
    service: &'a Service,
    method: &'a Method,
}

impl<'a> Ctx<'a> {
    fn fail(&self, kind: Kind, message: impl Into<String>) -> ResolutionError {
        ResolutionError::new(
            self.service.name.clone(),
            Some(self.method.name.clone()),
            kind,
            message,
        )
    }

    fn fail_attr(
        &self,
        kind: Kind,
        attribute: &str,
        message: impl Into<String>,
    ) -> ResolutionError {
        self.fail(kind, message).with_attribute(attribute)
    }

    fn endpoint(&self) -> Result<EndpointBinding, ResolutionError> {
        let routes = self.routes()?;
        let (payload, attributes, body) = self.payload(&routes)?;
        let responses = self.responses()?;
        let errors = self.errors()?;
        let security = self.security()?;
        Ok(EndpointBinding {
            service: self.service.id,
            method: self.method.id,
            service_name: self.service.name.clone(),
            method_name: self.method.name.clone(),
            routes,
            payload,
            payload_type: self.method.payload.ty.clone(),
            attributes,
            body,
            result_type: self.method.result.ty.clone(),
            view: self.method.view.clone(),
            responses,
            errors,
            security,
        })
    }

    fn routes(&self) -> Result<Vec<RouteBinding>, ResolutionError> {
        if self.method.http.routes.is_empty() {
            return Err(self.fail(Kind::InvalidRoute, "method declares no HTTP route"));
        }
        let bases = bases(self.model, self.service);
        let mut routes = Vec::with_capacity(self.method.http.routes.len());
        for directive in &self.method.http.routes {
            let pattern = join_paths(&bases, &directive.path);
            let params = path_params(&pattern);
            let mut names: Vec<String> = Vec::with_capacity(params.len());
            let mut wildcard = None;
            for (i, p) in params.iter().enumerate() {
                if names.contains(&p.name) {
                    return Err(self.fail_attr(
                        Kind::InvalidRoute,
                        &p.name,
                        format!("path parameter {} appears twice in {pattern}", p.name),
                    ));
                }
                if p.wildcard {
                    let last = i + 1 == params.len()
                        && pattern.trim_end_matches('/').ends_with(&format!("{{*{}}}", p.name));
                    if !last {
                        return Err(self.fail_attr(
                            Kind::InvalidRoute,
                            &p.name,
                            format!(
                                "wildcard {{*{}}} must be the last segment of {pattern}",
                                p.name
                            ),
                        ));
                    }
                    wildcard = Some(p.name.clone());
                }
                names.push(p.name.clone());
            }
            routes.push(RouteBinding {
                verb: directive.verb.clone(),
                pattern,
                params: names,
                wildcard,
            });
        }

        let first: BTreeSet<&str> = routes[0].params.iter().map(String::as_str).collect();
        for route in &routes[1..] {
            let other: BTreeSet<&str> = route.params.iter().map(String::as_str).collect();
            if other != first {
                return Err(self.fail(
                    Kind::InvalidRoute,
                    format!(
                        "alternative route {} {} binds different path parameters than {} {}",
                        route.verb, route.pattern, routes[0].verb, routes[0].pattern
                    ),
                ));
            }
        }
        Ok(routes)
    }

    fn payload(
        &self,
        routes: &[RouteBinding],
    ) -> Result<(PayloadShape, Vec<AttributeBinding>, BodyShape), ResolutionError> {
        match self.model.resolve(&self.method.payload.ty) {
            AttributeType::Empty => {
                if let Some(param) = routes[0].params.first() {
                    return Err(self.fail_attr(
                        Kind::MissingPathAttribute,
                        param,
                        format!("path parameter {param} has no payload to bind to"),
                    ));
                }
                self.reject_attribute_directives()?;
                Ok((PayloadShape::Empty, Vec::new(), BodyShape::None))
            }
            AttributeType::Object(fields) => self.object_payload(fields, routes),
            other => self.single_payload(other, routes),
        }
    }

    /// Attribute directives make no sense on payloads without attributes.
    fn reject_attribute_directives(&self) -> Result<(), ResolutionError> {
        if let Some(p) = self.method.http.params.first() {
            return Err(self.fail_attr(
                Kind::UnknownAttribute,
                &p.attribute,
                "payload has no attributes to place",
            ));
        }
        if let Some(c) = self.method.credentials.first() {
            return Err(self.fail_attr(
                Kind::UnknownAttribute,
                &c.attribute,
                "payload has no attributes to carry credentials",
            ));
        }
        match &self.method.http.body {
            BodyDirective::Attribute(name) => Err(self.fail_attr(
                Kind::UnknownAttribute,
                name,
                "payload has no attributes to send in the body",
            )),
            BodyDirective::Attributes(names) if !names.is_empty() => Err(self.fail_attr(
                Kind::UnknownAttribute,
                &names[0],
                "payload has no attributes to send in the body",
            )),
            _ => Ok(()),
        }
    }

    fn single_payload(
        &self,
        ty: &AttributeType,
        routes: &[RouteBinding],
    ) -> Result<(PayloadShape, Vec<AttributeBinding>, BodyShape), ResolutionError> {
        self.reject_attribute_directives()?;
        let params = &routes[0].params;
        match params.len() {
            0 => {
                if self.method.http.body == BodyDirective::None {
                    return Err(self.fail(
                        Kind::InvalidDirective,
                        "payload must travel in the body but the body is disabled",
                    ));
                }
                Ok((PayloadShape::Single, Vec::new(), BodyShape::Whole))
            }
            1 => {
                let param = &params[0];
                let wildcard = routes.iter().any(|r| r.wildcard.as_deref() == Some(param));
                self.check_path_type(param, ty, wildcard)?;
                let binding = AttributeBinding {
                    attribute: param.clone(),
                    location: WireLocation::Path,
                    wire_name: param.clone(),
                    ty: self.method.payload.ty.clone(),
                    required: true,
                    validation: self.method.payload.validation.clone(),
                    credential: None,
                };
                Ok((PayloadShape::Single, vec![binding], BodyShape::None))
            }
            n => Err(self.fail_attr(
                Kind::MissingPathAttribute,
                &params[1],
                format!("payload is not an object but the route declares {n} path parameters"),
            )),
        }
    }

    fn check_path_type(
        &self,
        attribute: &str,
        ty: &AttributeType,
        wildcard: bool,
    ) -> Result<(), ResolutionError> {
        let resolved = self.model.resolve(ty);
        let ok = if wildcard {
            resolved.as_primitive().is_some()
        } else {
            resolved.is_scalar_like()
        };
        if ok {
            Ok(())
        } else {
            Err(self.fail_attr(
                Kind::NonScalarPathParam,
                attribute,
                if wildcard {
                    format!("wildcard parameter {attribute} must be a primitive")
                } else {
                    format!(
                        "path parameter {attribute} must be a primitive or an array of primitives"
                    )
                },
            ))
        }
    }

    fn object_payload(
        &self,
        fields: &[Field],
        routes: &[RouteBinding],
    ) -> Result<(PayloadShape, Vec<AttributeBinding>, BodyShape), ResolutionError> {
        let http = &self.method.http;
        let known = |name: &str| fields.iter().any(|f| f.name == name);

        for p in &http.params {
            if !known(&p.attribute) {
                return Err(self.fail_attr(
                    Kind::UnknownAttribute,
                    &p.attribute,
                    format!("{} directive names an unknown payload attribute", p.location),
                ));
            }
        }
        for c in &self.method.credentials {
            if !known(&c.attribute) {
                return Err(self.fail_attr(
                    Kind::UnknownAttribute,
                    &c.attribute,
                    format!("credential for {} names an unknown payload attribute", c.scheme),
                ));
            }
        }
        let body_named: Vec<&str> = match &http.body {
            BodyDirective::Attribute(name) => vec![name.as_str()],
            BodyDirective::Attributes(names) => names.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        };
        for name in &body_named {
            if !known(name) {
                return Err(self.fail_attr(
                    Kind::UnknownAttribute,
                    name,
                    "body directive names an unknown payload attribute",
                ));
            }
        }

        // Path parameters map to attributes through explicit path directives
        // first, then by name.
        let mut path_attrs: Vec<(&str, &str)> = Vec::new();
        for param in &routes[0].params {
            let explicit = http.params.iter().find(|p| {
                p.location == WireLocation::Path
                    && p.name.as_deref().unwrap_or(&p.attribute) == param.as_str()
            });
            let attribute = match explicit {
                Some(p) => p.attribute.as_str(),
                None if known(param) => param.as_str(),
                None => {
                    return Err(self.fail_attr(
                        Kind::MissingPathAttribute,
                        param,
                        format!("path parameter {param} has no matching payload attribute"),
                    ))
                }
            };
            path_attrs.push((param.as_str(), attribute));
        }

        let mut attributes = Vec::with_capacity(fields.len());
        let mut body_attrs: Vec<String> = Vec::new();
        for field in fields {
            let mut placements: Vec<Placement> = Vec::new();
            for p in http.params.iter().filter(|p| p.attribute == field.name) {
                placements.push(Placement {
                    location: p.location,
                    wire_name: p.name.clone().unwrap_or_else(|| field.name.clone()),
                    source: "explicit directive",
                });
            }
            if let Some((param, _)) = path_attrs.iter().find(|(_, a)| *a == field.name) {
                placements.push(Placement {
                    location: WireLocation::Path,
                    wire_name: (*param).to_string(),
                    source: "route parameter",
                });
            }
            let mut credential = None;
            if let Some(c) = self.method.credentials.iter().find(|c| c.attribute == field.name) {
                let scheme = self.schemes.get(&c.scheme).ok_or_else(|| {
                    self.fail_attr(
                        Kind::UnknownSecurityScheme,
                        &field.name,
                        format!("unknown security scheme {}", c.scheme),
                    )
                })?;
                placements.push(Placement {
                    location: scheme.location.location,
                    wire_name: scheme.location.name.clone(),
                    source: "security scheme",
                });
                credential = Some(CredentialSlot {
                    scheme: scheme.name.clone(),
                    kind: scheme.kind,
                    role: c.role,
                });
            }
            if body_named.contains(&field.name.as_str()) {
                placements.push(Placement {
                    location: WireLocation::Body,
                    wire_name: field.name.clone(),
                    source: "body directive",
                });
            }

            if let Some(conflict) = placements
                .iter()
                .find(|p| p.location != placements[0].location)
            {
                return Err(self.fail_attr(
                    Kind::ConflictingLocation,
                    &field.name,
                    format!(
                        "bound to {} by {} and to {} by {}",
                        placements[0].location,
                        placements[0].source,
                        conflict.location,
                        conflict.source
                    ),
                ));
            }

            let resolved = self.model.resolve(&field.attribute.ty);
            let (location, wire_name) = match placements.into_iter().next() {
                Some(p) => (p.location, p.wire_name),
                None if resolved.is_scalar_like() => (WireLocation::Query, field.name.clone()),
                None => (WireLocation::Body, field.name.clone()),
            };

            match location {
                WireLocation::Path => {
                    let wildcard = routes
                        .iter()
                        .any(|r| r.wildcard.as_deref() == Some(wire_name.as_str()));
                    self.check_path_type(&field.name, &field.attribute.ty, wildcard)?;
                }
                WireLocation::Query | WireLocation::Header if !resolved.is_scalar_like() => {
                    return Err(self.fail_attr(
                        Kind::InvalidDirective,
                        &field.name,
                        format!("{location} values must be primitives or arrays of primitives"),
                    ));
                }
                WireLocation::Body => {
                    if http.body == BodyDirective::None {
                        return Err(self.fail_attr(
                            Kind::InvalidDirective,
                            &field.name,
                            "attribute must travel in the body but the body is disabled",
                        ));
                    }
                    body_attrs.push(field.name.clone());
                }
                _ => {}
            }

            attributes.push(AttributeBinding {
                attribute: field.name.clone(),
                required: field.required || location == WireLocation::Path,
                location,
                wire_name,
                ty: field.attribute.ty.clone(),
                validation: field.attribute.validation.clone(),
                credential,
            });
        }

        let body = match &http.body {
            BodyDirective::None => BodyShape::None,
            BodyDirective::Attribute(name) => {
                if let Some(other) = body_attrs.iter().find(|a| *a != name) {
                    return Err(self.fail_attr(
                        Kind::InvalidDirective,
                        other,
                        format!("attribute defaults to the body but the body is bound to {name}"),
                    ));
                }
                BodyShape::Attribute(name.clone())
            }
            _ if body_attrs.is_empty() => BodyShape::None,
            _ => BodyShape::Object(body_attrs),
        };
        Ok((PayloadShape::Object, attributes, body))
    }

    fn headers(
        &self,
        mappings: &[HeaderMapping],
        ty: &AttributeType,
        what: &str,
    ) -> Result<Vec<HeaderBinding>, ResolutionError> {
        let fields = self.model.fields(ty);
        let mut out = Vec::with_capacity(mappings.len());
        for m in mappings {
            let (ty, required) = match (&m.attribute, fields) {
                (Some(attr), Some(fields)) => match fields.iter().find(|f| &f.name == attr) {
                    Some(f) => (f.attribute.ty.clone(), f.required),
                    None => {
                        return Err(self.fail_attr(
                            Kind::UnknownAttribute,
                            attr,
                            format!("header {} names an unknown {what} attribute", m.name),
                        ))
                    }
                },
                (Some(attr), None) => {
                    return Err(self.fail_attr(
                        Kind::UnknownAttribute,
                        attr,
                        format!(
                            "{what} is not an object, header {} cannot pick an attribute",
                            m.name
                        ),
                    ))
                }
                (None, _) => (ty.clone(), true),
            };
            if !self.model.resolve(&ty).is_scalar_like() {
                return Err(self.fail_attr(
                    Kind::InvalidDirective,
                    m.attribute.as_deref().unwrap_or(&m.name),
                    format!("header {} must carry a primitive or an array of primitives", m.name),
                ));
            }
            out.push(HeaderBinding {
                attribute: m.attribute.clone(),
                name: m.name.clone(),
                ty,
                required,
            });
        }
        Ok(out)
    }

    /// Body of a response or error after headers have taken their share.
    fn body_shape(
        &self,
        directive: &BodyDirective,
        ty: &AttributeType,
        headers: &[HeaderBinding],
        view: Option<&[String]>,
        what: &str,
    ) -> Result<BodyShape, ResolutionError> {
        let resolved = self.model.resolve(ty);
        let fields = self.model.fields(ty);
        let check = |name: &str| -> Result<(), ResolutionError> {
            match fields {
                Some(fields) if fields.iter().any(|f| f.name == name) => Ok(()),
                _ => Err(self.fail_attr(
                    Kind::UnknownAttribute,
                    name,
                    format!("body directive names an unknown {what} attribute"),
                )),
            }
        };
        Ok(match directive {
            BodyDirective::None => BodyShape::None,
            BodyDirective::Attribute(name) => {
                check(name)?;
                BodyShape::Attribute(name.clone())
            }
            BodyDirective::Attributes(names) => {
                for name in names {
                    check(name)?;
                }
                BodyShape::Object(names.clone())
            }
            BodyDirective::Default => match (resolved, fields) {
                (AttributeType::Empty, _) => BodyShape::None,
                (_, Some(fields)) => {
                    let names: Vec<String> = fields
                        .iter()
                        .filter(|f| {
                            !headers.iter().any(|h| h.attribute.as_deref() == Some(&f.name))
                        })
                        .filter(|f| view.is_none_or(|v| v.contains(&f.name)))
                        .map(|f| f.name.clone())
                        .collect();
                    if names.is_empty() {
                        BodyShape::None
                    } else {
                        BodyShape::Object(names)
                    }
                }
                (_, None) if headers.iter().any(|h| h.attribute.is_none()) => BodyShape::None,
                (_, None) => BodyShape::Whole,
            },
        })
    }

    fn responses(&self) -> Result<Vec<ResponseBinding>, ResolutionError> {
        let result_ty = &self.method.result.ty;
        let empty = self.model.resolve(result_ty).is_empty();
        let view = self.view_attributes()?;

        let defaults = [ResponseDirective::default()];
        let directives: &[ResponseDirective] = if self.method.http.responses.is_empty() {
            &defaults
        } else {
            &self.method.http.responses
        };
        if directives.iter().filter(|d| d.tag.is_none()).count() > 1 {
            return Err(self.fail(
                Kind::InvalidDirective,
                "only one success response may omit a tag",
            ));
        }

        let mut out = Vec::with_capacity(directives.len());
        for d in directives {
            let headers = self.headers(&d.headers, result_ty, "result")?;
            let body = self.body_shape(&d.body, result_ty, &headers, view.as_deref(), "result")?;
            let tag = match &d.tag {
                Some(t) => {
                    let known = self
                        .model
                        .fields(result_ty)
                        .is_some_and(|fields| fields.iter().any(|f| f.name == t.attribute));
                    if !known {
                        return Err(self.fail_attr(
                            Kind::UnknownAttribute,
                            &t.attribute,
                            "response tag names an unknown result attribute",
                        ));
                    }
                    Some(ResponseTag {
                        attribute: t.attribute.clone(),
                        value: t.value.clone(),
                    })
                }
                None => None,
            };
            out.push(ResponseBinding {
                status: d.status.unwrap_or(if empty { 204 } else { 200 }),
                headers,
                body,
                content_type: d.content_type.clone(),
                tag,
            });
        }
        // Tagged responses are checked first; the untagged one is the fallback.
        out.sort_by_key(|r| r.tag.is_none());
        Ok(out)
    }

    fn view_attributes(&self) -> Result<Option<Vec<String>>, ResolutionError> {
        let Some(view) = self.method.view.as_deref() else {
            return Ok(None);
        };
        if view == DEFAULT_VIEW {
            return Ok(None);
        }
        let AttributeType::User(id) = &self.method.result.ty else {
            return Err(self.fail(
                Kind::InvalidDirective,
                format!("view {view} requires a user-typed result"),
            ));
        };
        let user = self.model.user_type(*id);
        match user.view_attributes(view) {
            Some(attrs) => Ok(Some(attrs)),
            None => Err(self.fail(
                Kind::InvalidDirective,
                format!("type {} has no view {view}", user.name),
            )),
        }
    }

    /// Effective directive for an error: the narrowest scope declaring one.
    /// Within one scope the last declaration wins.
    fn error_directive(&self, name: &str) -> Option<&'a ErrorDirective> {
        let scopes: [(&'a [ErrorDirective], ErrorScope); 3] = [
            (&self.method.http.errors, ErrorScope::Method),
            (&self.service.error_directives, ErrorScope::Service),
            (&self.model.api.error_directives, ErrorScope::Api),
        ];
        for (directives, scope) in scopes {
            let mut matching = directives.iter().filter(|d| d.name == name);
            if let Some(last) = matching.next_back() {
                if matching.next().is_some() {
                    warn!(
                        service = %self.service.name,
                        method = %self.method.name,
                        error = name,
                        %scope,
                        "error mapped more than once in the same scope, using the last mapping"
                    );
                }
                return Some(last);
            }
        }
        None
    }

    fn errors(&self) -> Result<Vec<ErrorBinding>, ResolutionError> {
        let scopes: [(&[ErrorDecl], ErrorScope); 3] = [
            (&self.method.errors, ErrorScope::Method),
            (&self.service.errors, ErrorScope::Service),
            (&self.model.api.errors, ErrorScope::Api),
        ];
        let mut out: Vec<ErrorBinding> = Vec::new();
        for (decls, scope) in scopes {
            for decl in decls {
                if out.iter().any(|e| e.name == decl.name) {
                    continue;
                }
                out.push(self.error_binding(decl, scope)?);
            }
        }
        for d in &self.method.http.errors {
            if !out.iter().any(|e| e.name == d.name) {
                return Err(self.fail_attr(
                    Kind::InvalidDirective,
                    &d.name,
                    format!("HTTP mapping for undeclared error {}", d.name),
                ));
            }
        }
        Ok(out)
    }

    fn error_binding(
        &self,
        decl: &ErrorDecl,
        scope: ErrorScope,
    ) -> Result<ErrorBinding, ResolutionError> {
        let directive = self.error_directive(&decl.name);
        let ty = &decl.attribute.ty;
        let (status, headers, body, content_type) = match directive {
            Some(d) => {
                let headers = self.headers(&d.headers, ty, "error")?;
                let body = self.body_shape(&d.body, ty, &headers, None, "error")?;
                (d.status, headers, body, d.content_type.clone())
            }
            None => (
                None,
                Vec::new(),
                self.body_shape(&BodyDirective::Default, ty, &[], None, "error")?,
                None,
            ),
        };
        Ok(ErrorBinding {
            name: decl.name.clone(),
            scope,
            description: decl.description.clone(),
            status: status.unwrap_or_else(|| default_error_status(decl)),
            ty: ty.clone(),
            headers,
            body,
            content_type,
            temporary: decl.temporary,
            timeout: decl.timeout,
            fault: decl.fault,
        })
    }

    fn security(&self) -> Result<Vec<ResolvedRequirement>, ResolutionError> {
        let requirements = self
            .method
            .security
            .as_ref()
            .or(self.service.security.as_ref())
            .unwrap_or(&self.model.api.security);
        let mut out = Vec::with_capacity(requirements.len());
        for req in requirements {
            let mut schemes = Vec::with_capacity(req.schemes.len());
            for name in &req.schemes {
                let scheme = self.schemes.get(name).ok_or_else(|| {
                    self.fail(
                        Kind::UnknownSecurityScheme,
                        format!("unknown security scheme {name}"),
                    )
                })?;
                let scopes = if scheme.kind.has_scopes() {
                    for scope in &req.scopes {
                        if !scheme.scopes.iter().any(|s| &s.name == scope) {
                            return Err(self.fail(
                                Kind::UnknownScope,
                                format!("scope {scope} is not declared by security scheme {name}"),
                            ));
                        }
                    }
                    req.scopes.clone()
                } else {
                    Vec::new()
                };
                schemes.push(SchemeScopes {
                    scheme: name.clone(),
                    kind: scheme.kind,
                    scopes,
                });
            }
            out.push(ResolvedRequirement { schemes });
        }
        Ok(out)
    }
}

/// Status of an error without an explicit HTTP mapping.
#[must_use]
pub fn default_error_status(decl: &ErrorDecl) -> u16 {
    if decl.timeout {
        504
    } else if decl.temporary {
        503
    } else {
        500
    }
}
