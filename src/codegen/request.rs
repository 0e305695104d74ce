//! Request decoders (server) and request builders (client).

use super::names::type_ident;
use super::paths::path_call;
use super::rust_types::primitive_type;
use super::validate::{has_struct, nested_checks, validation_lines};
use super::{rust_str, scalar_info, Code, FieldDef, MethodCtx};
use crate::binding::{AttributeBinding, BodyShape, PayloadShape};
use crate::model::{CredentialRole, Primitive, SchemeKind, ServiceModel, WireLocation};

/// Name of the private struct a body object decodes into.
pub(crate) fn body_struct_name(m: &MethodCtx<'_>) -> String {
    format!("{}RequestBody", type_ident(&m.method.name))
}

/// Body struct of an object body: every attribute optional so missing ones
/// surface as `MissingField` rather than a serde error.
pub(crate) fn render_body_struct(m: &MethodCtx<'_>) -> Option<String> {
    let BodyShape::Object(names) = &m.ep.body else {
        return None;
    };
    let mut code = Code::new(0);
    code.line("#[derive(Debug, Default, Serialize, Deserialize)]");
    code.open(format!("struct {} {{", body_struct_name(m)));
    for name in names {
        let (Some(ab), Some(f)) = (m.ep.attribute(name), m.payload_field(name)) else {
            continue;
        };
        code.line(format!(
            "#[serde(rename = {}, default, skip_serializing_if = \"Option::is_none\")]",
            rust_str(&ab.wire_name)
        ));
        code.line(format!("{}: Option<{}>,", f.name, f.ty));
    }
    code.close("}");
    Some(code.finish())
}

fn emit_validation(
    model: &ServiceModel,
    ab: &AttributeBinding,
    f: &FieldDef,
    ident: &str,
    code: &mut Code,
) {
    let nested = has_struct(model, &ab.ty);
    if ab.validation.is_empty() && !nested {
        return;
    }
    if f.optional {
        code.open(format!("if let Some(v) = &{ident} {{"));
    } else {
        code.open(format!("{{ let v = &{ident};"));
    }
    let name = rust_str(&ab.attribute);
    validation_lines(&name, f, scalar_info(model, &ab.ty), &ab.validation, code);
    nested_checks(model, &ab.ty, "v", &name, 0, code);
    code.close("}");
}

/// Query and header lists read back as present-but-empty when absent.
fn defaults_to_empty(model: &ServiceModel, ab: &AttributeBinding) -> bool {
    ab.credential.is_none()
        && matches!(ab.location, WireLocation::Query | WireLocation::Header)
        && scalar_info(model, &ab.ty).is_some_and(|(_, array)| array)
}

/// Expression producing an `Option` of the attribute value.
fn optional_source(model: &ServiceModel, ab: &AttributeBinding) -> String {
    let (prim, array) = scalar_info(model, &ab.ty).unwrap_or((Primitive::String, false));
    let elem = primitive_type(prim);
    let wire = rust_str(&ab.wire_name);
    match ab.location {
        WireLocation::Path if array => {
            format!("Some(wire::path_values::<{elem}>(params, {wire})?)")
        }
        WireLocation::Path => format!("Some(wire::path_value::<{elem}>(params, {wire})?)"),
        WireLocation::Query if array => format!("wire::query_values::<{elem}, _>(req, {wire})?"),
        WireLocation::Query => format!("wire::query_value::<{elem}, _>(req, {wire})?"),
        WireLocation::Header if array => format!("wire::header_values::<{elem}, _>(req, {wire})?"),
        WireLocation::Header => format!("wire::header_value::<{elem}, _>(req, {wire})?"),
        WireLocation::Body => "None".to_string(),
    }
}

fn credential_source(model: &ServiceModel, ab: &AttributeBinding) -> Option<String> {
    let slot = ab.credential.as_ref()?;
    let wire = rust_str(&ab.wire_name);
    match (slot.kind, slot.role) {
        (SchemeKind::Basic, CredentialRole::Username) => {
            Some("basic.as_ref().map(|(user, _)| user.clone())".to_string())
        }
        (SchemeKind::Basic, CredentialRole::Password) => {
            Some("basic.as_ref().map(|(_, pass)| pass.clone())".to_string())
        }
        (SchemeKind::Jwt | SchemeKind::Oauth2, _)
            if ab.location == WireLocation::Header
                && scalar_info(model, &ab.ty) == Some((Primitive::String, false)) =>
        {
            Some(format!("wire::bearer_token(req, {wire})?"))
        }
        _ => None,
    }
}

/// `decode_{method}_request`.
pub(crate) fn render_decoder(model: &ServiceModel, m: &MethodCtx<'_>) -> String {
    let mut code = Code::new(0);
    let name = format!("decode_{}_request", m.ident);
    code.line(format!("/// Decode the `{}` payload from a request.", m.ep.method_name));
    match m.ep.payload {
        PayloadShape::Empty => {
            code.open(format!(
                "pub fn {name}(_req: &Request<Vec<u8>>, _params: &PathParams, _encoders: &EncoderSet) -> Result<(), DecodeError> {{"
            ));
            code.line("Ok(())");
        }
        PayloadShape::Single => {
            let (req, params, encoders) = if m.ep.attributes.is_empty() {
                ("req", "_params", "encoders")
            } else {
                ("_req", "params", "_encoders")
            };
            code.open(format!(
                "pub fn {name}({req}: &Request<Vec<u8>>, {params}: &PathParams, {encoders}: &EncoderSet) -> Result<{}, DecodeError> {{",
                m.payload_ty
            ));
            match m.ep.attributes.first() {
                Some(ab) => {
                    let (prim, array) =
                        scalar_info(model, &ab.ty).unwrap_or((Primitive::String, false));
                    let wire = rust_str(&ab.wire_name);
                    let call = if array { "path_values" } else { "path_value" };
                    code.line(format!(
                        "let payload: {} = wire::{call}(params, {wire})?;",
                        m.payload_ty
                    ));
                    let f = FieldDef {
                        name: "payload".to_string(),
                        wire_name: ab.attribute.clone(),
                        ty: m.payload_ty.clone(),
                        optional: false,
                        description: None,
                        model_ty: ab.ty.clone(),
                        validation: ab.validation.clone(),
                    };
                    if !ab.validation.is_empty() {
                        code.open("{ let v = &payload;");
                        validation_lines(
                            &rust_str(&ab.attribute),
                            &f,
                            Some((prim, array)),
                            &ab.validation,
                            &mut code,
                        );
                        code.close("}");
                    }
                }
                None => {
                    code.line(format!(
                        "let payload: {} = wire::required(wire::body(req, encoders)?, \"body\", \"body\")?;",
                        m.payload_ty
                    ));
                    nested_checks(model, &m.ep.payload_type, "payload", "\"body\"", 0, &mut code);
                }
            }
            code.line("Ok(payload)");
        }
        PayloadShape::Object => render_object_decoder(model, m, &name, &mut code),
    }
    code.close("}");
    code.finish()
}

fn render_object_decoder(model: &ServiceModel, m: &MethodCtx<'_>, name: &str, code: &mut Code) {
    let uses_body = !m.ep.body.is_none();
    let uses_params = m.ep.attributes.iter().any(|a| a.location == WireLocation::Path);
    code.open(format!(
        "pub fn {name}(req: &Request<Vec<u8>>, {}: &PathParams, {}: &EncoderSet) -> Result<{}, DecodeError> {{",
        if uses_params { "params" } else { "_params" },
        if uses_body { "encoders" } else { "_encoders" },
        m.payload_ty
    ));
    if m.ep.attributes.iter().any(|a| {
        a.credential.as_ref().is_some_and(|c| {
            c.kind == SchemeKind::Basic
                && matches!(c.role, CredentialRole::Username | CredentialRole::Password)
        })
    }) {
        let header = m
            .ep
            .attributes
            .iter()
            .find(|a| a.credential.as_ref().is_some_and(|c| c.kind == SchemeKind::Basic))
            .map_or("Authorization", |a| a.wire_name.as_str());
        code.line(format!("let basic = wire::basic_credentials(req, {})?;", rust_str(header)));
    }
    match &m.ep.body {
        BodyShape::Object(_) => {
            code.line(format!(
                "let mut body: {} = wire::body(req, encoders)?.unwrap_or_default();",
                body_struct_name(m)
            ));
        }
        BodyShape::Attribute(attr) => {
            let ty = m.payload_field(attr).map_or("serde_json::Value", |f| f.ty.as_str());
            code.line(format!("let body: Option<{ty}> = wire::body(req, encoders)?;"));
        }
        BodyShape::None | BodyShape::Whole => {}
    }

    let mut inits = Vec::with_capacity(m.ep.attributes.len());
    for ab in &m.ep.attributes {
        let Some(f) = m.payload_field(&ab.attribute) else { continue };
        let source = if ab.location == WireLocation::Body {
            match &m.ep.body {
                BodyShape::Object(_) => format!("body.{}.take()", f.name),
                _ => "body".to_string(),
            }
        } else {
            credential_source(model, ab).unwrap_or_else(|| optional_source(model, ab))
        };
        let ident = f.name.trim_start_matches("r#").to_string();
        let local = format!("{ident}_value");
        if f.optional {
            code.line(format!("let {local}: Option<{}> = {source};", f.ty));
        } else if defaults_to_empty(model, ab) {
            code.line(format!("let {local}: {} = {source}.unwrap_or_default();", f.ty));
        } else {
            code.line(format!(
                "let {local}: {} = wire::required({source}, {}, {})?;",
                f.ty,
                rust_str(&ab.attribute),
                rust_str(&ab.location.to_string())
            ));
        }
        emit_validation(model, ab, f, &local, code);
        inits.push(format!("{}: {local}", f.name));
    }
    code.line(format!("Ok({} {{ {} }})", m.payload_ty, inits.join(", ")));
}

fn query_or_header(ab: &AttributeBinding, array: bool, value: &str) -> String {
    let wire = rust_str(&ab.wire_name);
    match (ab.location, array) {
        (WireLocation::Query, false) => format!("builder.query({wire}, {value});"),
        (WireLocation::Query, true) => format!("builder.query_list({wire}, {value});"),
        (_, false) => format!("builder.header({wire}, {value});"),
        (_, true) => format!("builder.header_list({wire}, {value});"),
    }
}

/// `build_{method}_request`, using the first route.
pub(crate) fn render_builder(model: &ServiceModel, m: &MethodCtx<'_>) -> String {
    let mut code = Code::new(0);
    let name = format!("build_{}_request", m.ident);
    let route = m.ep.routes.first();
    let verb = route.map_or("GET", |r| r.verb.as_str());
    let uses_encoders = m.ep.payload != PayloadShape::Empty && !m.ep.body.is_none();
    let payload_param = if m.has_payload() {
        format!("payload: &{}", m.payload_ty)
    } else {
        "_payload: &()".to_string()
    };
    code.line(format!("/// Build the `{}` request.", m.ep.method_name));
    code.open(format!(
        "pub fn {name}({payload_param}, {}: &EncoderSet) -> Result<Request<Vec<u8>>, BuildError> {{",
        if uses_encoders { "encoders" } else { "_encoders" }
    ));
    let verb_expr = match verb {
        "GET" | "POST" | "PUT" | "DELETE" | "PATCH" | "HEAD" | "OPTIONS" | "TRACE" | "CONNECT" => {
            format!("Method::{verb}")
        }
        other => format!(
            "Method::from_bytes({}.as_bytes()).map_err(http::Error::from)?",
            rust_str(other)
        ),
    };
    code.line(format!(
        "let mut builder = RequestBuilder::new({verb_expr}, {});",
        path_call(model, m, 0)
    ));

    match m.ep.payload {
        PayloadShape::Empty => {}
        PayloadShape::Single => {
            if m.ep.body == BodyShape::Whole {
                code.line("builder.body(payload, encoders.default_encoder())?;");
            }
        }
        PayloadShape::Object => {
            let mut basic_user = None;
            let mut basic_pass = None;
            for ab in &m.ep.attributes {
                let Some(f) = m.payload_field(&ab.attribute) else { continue };
                if matches!(ab.location, WireLocation::Path | WireLocation::Body) {
                    continue;
                }
                let access = format!("payload.{}", f.name);
                if let Some(slot) = &ab.credential {
                    if slot.kind == SchemeKind::Basic {
                        let expr = if f.optional {
                            format!("{access}.as_deref().unwrap_or_default()")
                        } else {
                            format!("&{access}")
                        };
                        match slot.role {
                            CredentialRole::Username => basic_user = Some(expr),
                            CredentialRole::Password => basic_pass = Some(expr),
                            _ => {}
                        }
                        continue;
                    }
                    if matches!(slot.kind, SchemeKind::Jwt | SchemeKind::Oauth2)
                        && ab.location == WireLocation::Header
                        && f.ty == "String"
                    {
                        let wire = rust_str(&ab.wire_name);
                        if f.optional {
                            code.open(format!("if let Some(v) = &{access} {{"));
                            code.line(format!("builder.bearer({wire}, v);"));
                            code.close("}");
                        } else {
                            code.line(format!("builder.bearer({wire}, &{access});"));
                        }
                        continue;
                    }
                }
                let array = scalar_info(model, &ab.ty).is_some_and(|(_, a)| a);
                if f.optional {
                    code.open(format!("if let Some(v) = &{access} {{"));
                    code.line(query_or_header(ab, array, "v"));
                    code.close("}");
                } else {
                    code.line(query_or_header(ab, array, &format!("&{access}")));
                }
            }
            if basic_user.is_some() || basic_pass.is_some() {
                code.line(format!(
                    "builder.basic({}, {});",
                    basic_user.unwrap_or_else(|| "\"\"".to_string()),
                    basic_pass.unwrap_or_else(|| "\"\"".to_string())
                ));
            }
            match &m.ep.body {
                BodyShape::Object(names) => {
                    let inits: Vec<String> = names
                        .iter()
                        .filter_map(|n| m.payload_field(n))
                        .map(|f| {
                            if f.optional {
                                format!("{}: payload.{}.clone()", f.name, f.name)
                            } else {
                                format!("{}: Some(payload.{}.clone())", f.name, f.name)
                            }
                        })
                        .collect();
                    code.line(format!(
                        "let body = {} {{ {} }};",
                        body_struct_name(m),
                        inits.join(", ")
                    ));
                    code.line("builder.body(&body, encoders.default_encoder())?;");
                }
                BodyShape::Attribute(attr) => {
                    if let Some(f) = m.payload_field(attr) {
                        if f.optional {
                            code.open(format!("if let Some(v) = &payload.{} {{", f.name));
                            code.line("builder.body(v, encoders.default_encoder())?;");
                            code.close("}");
                        } else {
                            code.line(format!(
                                "builder.body(&payload.{}, encoders.default_encoder())?;",
                                f.name
                            ));
                        }
                    }
                }
                BodyShape::None | BodyShape::Whole => {}
            }
        }
    }
    code.line("builder.build()");
    code.close("}");
    code.finish()
}
