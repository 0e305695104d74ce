//! Success and error encoders.

use super::rust_types::primitive_type;
use super::validate::{has_struct, nested_checks};
use super::{rust_opt_str, rust_str, scalar_info, Code, FieldDef, MethodCtx};
use crate::binding::{BodyShape, HeaderBinding};
use crate::model::{AttributeType, ServiceModel};

/// Header and body statements for a value reachable as `root` (a reference).
fn render_parts(
    model: &ServiceModel,
    root: &str,
    fields: &[FieldDef],
    headers: &[HeaderBinding],
    body: &BodyShape,
    content_type: Option<&str>,
    code: &mut Code,
) {
    let field = |attr: &str| fields.iter().find(|f| f.wire_name == attr);
    for hb in headers {
        let array = scalar_info(model, &hb.ty).is_some_and(|(_, a)| a);
        let call = if array { "header_list" } else { "header" };
        let name = rust_str(&hb.name);
        match hb.attribute.as_deref().map(|a| (a, field(a))) {
            None => code.line(format!("builder.{call}({name}, {root});")),
            Some((_, Some(f))) if f.optional => {
                code.open(format!("if let Some(v) = &{root}.{} {{", f.name));
                code.line(format!("builder.{call}({name}, v);"));
                code.close("}");
            }
            Some((_, Some(f))) => code.line(format!("builder.{call}({name}, &{root}.{});", f.name)),
            Some((_, None)) => {}
        }
    }
    let ct = rust_opt_str(content_type);
    let encoder = format!("response_encoder(encoders, accept, {ct})?");
    match body {
        BodyShape::None => {}
        BodyShape::Whole => code.line(format!("builder.body({root}, {encoder}, {ct})?;")),
        BodyShape::Attribute(attr) => match field(attr) {
            Some(f) if f.optional => {
                code.open(format!("if let Some(v) = &{root}.{} {{", f.name));
                code.line(format!("builder.body(v, {encoder}, {ct})?;"));
                code.close("}");
            }
            Some(f) => code.line(format!("builder.body(&{root}.{}, {encoder}, {ct})?;", f.name)),
            None => {}
        },
        BodyShape::Object(names) => {
            code.line("let mut body = serde_json::Map::new();");
            for name in names {
                let Some(f) = field(name) else { continue };
                let wire = rust_str(&f.wire_name);
                if f.optional {
                    code.open(format!("if let Some(v) = &{root}.{} {{", f.name));
                    code.line(format!(
                        "body.insert({wire}.to_string(), serde_json::to_value(v)?);"
                    ));
                    code.close("}");
                } else {
                    code.line(format!(
                        "body.insert({wire}.to_string(), serde_json::to_value(&{root}.{})?);",
                        f.name
                    ));
                }
            }
            code.line(format!(
                "builder.json_body(&serde_json::Value::Object(body), {encoder}, {ct})?;"
            ));
        }
    }
}

fn uses_encoders(body: &BodyShape) -> bool {
    !body.is_none()
}

/// `encode_{method}_response`.
pub(crate) fn render_result_encoder(model: &ServiceModel, m: &MethodCtx<'_>) -> String {
    let mut code = Code::new(0);
    let needs_encoders = m.ep.responses.iter().any(|r| uses_encoders(&r.body));
    let (accept, encoders) = if needs_encoders {
        ("accept", "encoders")
    } else {
        ("_accept", "_encoders")
    };
    let result = if m.has_result() {
        format!("result: &{}", m.result_ty)
    } else {
        "_result: &()".to_string()
    };
    code.line(format!("/// Encode a `{}` result.", m.ep.method_name));
    code.open(format!(
        "pub fn encode_{}_response({result}, {accept}: Option<&str>, {encoders}: &EncoderSet) -> Result<Response<Vec<u8>>, EncodeError> {{",
        m.ident
    ));
    let fields = &m.result_fields;
    let mut has_default = false;
    for response in &m.ep.responses {
        let tagged = match &response.tag {
            Some(tag) => {
                let Some(f) = m.result_field(&tag.attribute) else { continue };
                let value = rust_str(&tag.value);
                if f.optional {
                    code.open(format!(
                        "if result.{}.as_ref().is_some_and(|v| v.to_wire() == {value}) {{",
                        f.name
                    ));
                } else {
                    code.open(format!("if result.{}.to_wire() == {value} {{", f.name));
                }
                true
            }
            None => {
                has_default = true;
                false
            }
        };
        code.line(format!("let mut builder = ResponseBuilder::new({});", response.status));
        render_parts(
            model,
            "result",
            fields,
            &response.headers,
            &response.body,
            response.content_type.as_deref(),
            &mut code,
        );
        if tagged {
            code.line("return builder.finish();");
            code.close("}");
        } else {
            code.line("builder.finish()");
            break;
        }
    }
    if !has_default {
        code.line(format!(
            "Err(EncodeError::Value {{ field: {}.to_string(), reason: \"no response matches the result\".to_string() }})",
            rust_str(&m.ep.method_name)
        ));
    }
    code.close("}");
    code.finish()
}

/// Error enum of a method, with its name dispatch.
pub(crate) fn render_error_enum(m: &MethodCtx<'_>) -> String {
    let mut code = Code::new(0);
    let name = &m.error_enum;
    code.line(format!("/// Errors `{}` can return.", m.ep.method_name));
    code.line("#[derive(Debug, Clone, PartialEq)]");
    code.open(format!("pub enum {name} {{"));
    for e in &m.errors {
        if let Some(d) = &e.binding.description {
            code.line(format!("/// {}", d.lines().next().unwrap_or_default()));
        }
        code.line(format!("{}({}),", e.variant, e.ty));
    }
    code.line("/// Any error without a declared HTTP mapping.");
    code.line("Generic(GenericError),");
    code.close("}");
    code.line("");
    code.open(format!("impl {name} {{"));
    code.line("/// Canonical name of the error.");
    code.open("pub fn name(&self) -> &str {");
    code.open("match self {");
    for e in &m.errors {
        code.line(format!("{name}::{}(_) => {},", e.variant, rust_str(&e.binding.name)));
    }
    code.line(format!("{name}::Generic(err) => &err.name,"));
    code.close("}");
    code.close("}");
    code.close("}");
    code.line("");
    code.open(format!("impl From<GenericError> for {name} {{"));
    code.open("fn from(err: GenericError) -> Self {");
    code.line(format!("{name}::Generic(err)"));
    code.close("}");
    code.close("}");
    code.line("");
    code.open(format!("impl From<DecodeError> for {name} {{"));
    code.open("fn from(err: DecodeError) -> Self {");
    code.line(format!("{name}::Generic(err.into())"));
    code.close("}");
    code.close("}");
    code.finish()
}

/// `encode_{method}_error` plus one private encoder per declared error.
pub(crate) fn render_error_encoder(model: &ServiceModel, m: &MethodCtx<'_>) -> String {
    let mut code = Code::new(0);
    let name = &m.error_enum;
    code.line(format!("/// Encode a `{}` error. Always produces a response.", m.ep.method_name));
    code.open(format!(
        "pub fn encode_{}_error(err: &{name}, accept: Option<&str>, encoders: &EncoderSet, formatter: &dyn ErrorFormatter) -> Response<Vec<u8>> {{",
        m.ident
    ));
    code.open("let encoded: Result<Response<Vec<u8>>, EncodeError> = match err {");
    for e in &m.errors {
        code.line(format!(
            "{name}::{}(value) => encode_{}_{}(value, accept, encoders),",
            e.variant,
            m.ident,
            super::fn_ident(&e.binding.name)
        ));
    }
    code.line(format!(
        "{name}::Generic(generic) => return encode_generic_error(generic, accept, encoders, formatter),"
    ));
    code.close("};");
    code.open("encoded.unwrap_or_else(|e| {");
    code.line(
        "encode_generic_error(&GenericError::fault(\"encoding\", e.to_string()), accept, encoders, formatter)",
    );
    code.close("})");
    code.close("}");

    for e in &m.errors {
        let b = e.binding;
        let (accept, encoders) = if uses_encoders(&b.body) {
            ("accept", "encoders")
        } else {
            ("_accept", "_encoders")
        };
        code.line("");
        code.open(format!(
            "fn encode_{}_{}(value: &{}, {accept}: Option<&str>, {encoders}: &EncoderSet) -> Result<Response<Vec<u8>>, EncodeError> {{",
            m.ident,
            super::fn_ident(&b.name),
            e.ty
        ));
        code.line(format!("let mut builder = ResponseBuilder::new({});", b.status));
        code.line(format!("builder.error_name({});", rust_str(&b.name)));
        render_parts(
            model,
            "value",
            &e.fields,
            &b.headers,
            &b.body,
            b.content_type.as_deref(),
            &mut code,
        );
        code.line("builder.finish()");
        code.close("}");
    }
    code.finish()
}

/// `Option` expression reading the header of `hb` from `resp`.
fn header_source(model: &ServiceModel, hb: &HeaderBinding) -> Option<String> {
    let (prim, array) = scalar_info(model, &hb.ty)?;
    let call = if array { "header_values_of" } else { "header_value_of" };
    Some(format!(
        "wire::{call}::<{}>(resp.headers(), {})?",
        primitive_type(prim),
        rust_str(&hb.name)
    ))
}

/// Decoder of one response shape into `target`, the Rust type of `ty`.
/// Mirrors [`render_parts`].
#[allow(clippy::too_many_arguments)]
fn render_part_decoder(
    model: &ServiceModel,
    name: &str,
    target: &str,
    ty: &AttributeType,
    fields: &[FieldDef],
    headers: &[HeaderBinding],
    body: &BodyShape,
    code: &mut Code,
) {
    code.line("");
    code.open(format!(
        "fn {name}(resp: &Response<Vec<u8>>, encoders: &EncoderSet) -> Result<{target}, DecodeError> {{"
    ));
    let is_struct =
        matches!(model.resolve(ty), AttributeType::Object(_)) && *body != BodyShape::Whole;
    if target == "()" {
        code.line("Ok(())");
    } else if is_struct {
        if let BodyShape::Object(_) = body {
            code.line(
                "let mut body: serde_json::Map<String, serde_json::Value> = wire::response_body(resp, encoders)?.unwrap_or_default();",
            );
        }
        let mut inits = Vec::with_capacity(fields.len());
        for f in fields {
            let header = headers
                .iter()
                .find(|hb| hb.attribute.as_deref() == Some(f.wire_name.as_str()));
            let (source, location) = match (header, body) {
                (Some(hb), _) => {
                    let source = header_source(model, hb).unwrap_or_else(|| "None".to_string());
                    (source, "header")
                }
                (None, BodyShape::Object(names)) if names.contains(&f.wire_name) => {
                    (format!("wire::body_field(&mut body, {})?", rust_str(&f.wire_name)), "body")
                }
                (None, BodyShape::Attribute(attr)) if *attr == f.wire_name => {
                    ("wire::response_body(resp, encoders)?".to_string(), "body")
                }
                _ => ("None".to_string(), "body"),
            };
            let local = format!("{}_value", f.name.trim_start_matches("r#"));
            code.line(format!("let {local}: Option<{}> = {source};", f.ty));
            if f.optional {
                inits.push(format!("{}: {local}", f.name));
            } else {
                inits.push(format!(
                    "{}: wire::required({local}, {}, {})?",
                    f.name,
                    rust_str(&f.wire_name),
                    rust_str(location)
                ));
            }
        }
        code.line(format!("let value = {target} {{ {} }};", inits.join(", ")));
        code.line("value.validate(\"\")?;");
        code.line("Ok(value)");
    } else {
        let first = if body.is_none() { "None" } else { "wire::response_body(resp, encoders)?" };
        code.line(format!("let value: Option<{target}> = {first};"));
        let whole = headers
            .iter()
            .filter(|hb| hb.attribute.is_none())
            .filter_map(|hb| header_source(model, hb));
        for source in whole {
            code.line(format!(
                "let value = match value {{ Some(v) => Some(v), None => {source} }};"
            ));
        }
        if has_struct(model, ty) {
            code.open("if let Some(v) = &value {");
            nested_checks(model, ty, "v", "\"body\"", 0, code);
            code.close("}");
        }
        code.line("wire::required(value, \"body\", \"body\")");
    }
    code.close("}");
}

/// `decode_{method}_response`: the client side of the result and error
/// encoders. Responses carrying an error name marker decode as that error
/// when it is declared with the response status, and as a generic error
/// otherwise. Unmarked responses match the success statuses first, then a
/// declared error owning the status alone.
pub(crate) fn render_response_decoder(model: &ServiceModel, m: &MethodCtx<'_>) -> String {
    let mut code = Code::new(0);
    let name = &m.error_enum;
    let mut parts = Code::new(0);
    let mut arms = Vec::new();

    for e in &m.errors {
        let b = e.binding;
        let decoder = format!("decode_{}_{}_error", m.ident, super::fn_ident(&b.name));
        arms.push(format!(
            "({}, Some({})) => Err({name}::{}({decoder}(resp, encoders)?)),",
            b.status,
            rust_str(&b.name),
            e.variant
        ));
        render_part_decoder(
            model,
            &decoder,
            &e.ty,
            &b.ty,
            &e.fields,
            &b.headers,
            &b.body,
            &mut parts,
        );
    }
    arms.push(format!(
        "(_, Some(_)) => Err({name}::Generic(wire::generic_error(resp, encoders))),"
    ));

    let mut statuses = Vec::new();
    for response in &m.ep.responses {
        if statuses.contains(&response.status) {
            continue;
        }
        statuses.push(response.status);
        let decoder = format!("decode_{}_result_{}", m.ident, response.status);
        arms.push(format!("({}, None) => Ok({decoder}(resp, encoders)?),", response.status));
        render_part_decoder(
            model,
            &decoder,
            &m.result_ty,
            &m.ep.result_type,
            &m.result_fields,
            &response.headers,
            &response.body,
            &mut parts,
        );
    }
    for e in &m.errors {
        let status = e.binding.status;
        let owners = m.errors.iter().filter(|o| o.binding.status == status).count();
        if owners == 1 && !statuses.contains(&status) {
            arms.push(format!(
                "({status}, None) => Err({name}::{}(decode_{}_{}_error(resp, encoders)?)),",
                e.variant,
                m.ident,
                super::fn_ident(&e.binding.name)
            ));
        }
    }
    arms.push(format!("_ => Err({name}::Generic(wire::unexpected_response(resp))),"));

    code.line(format!("/// Decode the response to a `{}` request.", m.ep.method_name));
    code.open(format!(
        "pub fn decode_{}_response(resp: &Response<Vec<u8>>, encoders: &EncoderSet) -> Result<{}, {name}> {{",
        m.ident, m.result_ty
    ));
    code.open("match (resp.status().as_u16(), wire::error_name(resp)) {");
    for arm in arms {
        code.line(arm);
    }
    code.close("}");
    code.close("}");
    let mut out = code.finish();
    out.push_str(&parts.finish());
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::model::{parse_model, ModelFormat, Primitive, Validation};

    #[test]
    fn parts_for_optional_header_and_object_body() {
        let model = parse_model("api: { name: a }", ModelFormat::Yaml).unwrap();
        let fields = vec![
            FieldDef {
                name: "id".into(),
                wire_name: "id".into(),
                ty: "i64".into(),
                optional: false,
                description: None,
                model_ty: AttributeType::Primitive(Primitive::Int64),
                validation: Validation::default(),
            },
            FieldDef {
                name: "etag".into(),
                wire_name: "etag".into(),
                ty: "String".into(),
                optional: true,
                description: None,
                model_ty: AttributeType::Primitive(Primitive::String),
                validation: Validation::default(),
            },
        ];
        let headers = vec![HeaderBinding {
            attribute: Some("etag".into()),
            name: "ETag".into(),
            ty: AttributeType::Primitive(Primitive::String),
            required: false,
        }];
        let mut code = Code::new(0);
        render_parts(
            &model,
            "result",
            &fields,
            &headers,
            &BodyShape::Object(vec!["id".into()]),
            None,
            &mut code,
        );
        let src = code.finish();
        assert!(src.contains("if let Some(v) = &result.etag {"), "{src}");
        assert!(src.contains("builder.header(\"ETag\", v);"), "{src}");
        assert!(
            src.contains("body.insert(\"id\".to_string(), serde_json::to_value(&result.id)?);"),
            "{src}"
        );
        assert!(src.contains("response_encoder(encoders, accept, None)?"), "{src}");
    }
}
