//! Service trait, dispatch and mount listing.

use super::{rust_str, Code, ServiceCtx};
use crate::binding::Resolution;

/// Rust expression for an HTTP verb.
pub(crate) fn verb_expr(verb: &str) -> String {
    match verb {
        "GET" | "POST" | "PUT" | "DELETE" | "PATCH" | "HEAD" | "OPTIONS" | "TRACE" | "CONNECT" => {
            format!("Method::{verb}")
        }
        other => format!("Method::from_bytes({}.as_bytes()).unwrap_or_default()", rust_str(other)),
    }
}

/// Name of the generated service trait.
pub(crate) fn trait_name(ctx: &ServiceCtx<'_>) -> String {
    format!("{}Service", super::type_ident(&ctx.service.name))
}

/// Trait the application implements, one function per resolved method.
pub(crate) fn render_trait(ctx: &ServiceCtx<'_>) -> String {
    let mut code = Code::new(0);
    match &ctx.service.description {
        Some(d) => {
            for line in d.lines() {
                code.line(format!("/// {line}").trim_end());
            }
        }
        None => code.line(format!("/// Implementation of the `{}` service.", ctx.service.name)),
    }
    code.open(format!("pub trait {}: Send + Sync {{", trait_name(ctx)));
    for m in &ctx.methods {
        if let Some(d) = &m.method.description {
            code.line(format!("/// {}", d.lines().next().unwrap_or_default()));
        }
        let payload = if m.has_payload() {
            format!(", payload: {}", m.payload_ty)
        } else {
            String::new()
        };
        code.line(format!(
            "fn {}(&self{payload}) -> Result<{}, {}>;",
            m.ident, m.result_ty, m.error_enum
        ));
    }
    code.close("}");
    code.finish()
}

/// `handle`: decode, call the service and encode whatever it returns.
pub(crate) fn render_handle(ctx: &ServiceCtx<'_>) -> String {
    let mut code = Code::new(0);
    let service_trait = trait_name(ctx);
    code.line("/// Serve one request routed to `method`. Returns `None` for methods this");
    code.line("/// service does not have.");
    code.open(format!(
        "pub fn handle<S: {service_trait} + ?Sized>(service: &S, method: &str, req: &Request<Vec<u8>>, params: &PathParams, encoders: &EncoderSet, formatter: &dyn ErrorFormatter) -> Option<Response<Vec<u8>>> {{"
    ));
    code.line("let accept = accept_header(req);");
    code.open("let response = match method {");
    for m in &ctx.methods {
        let ident = &m.ident;
        let call = if m.has_payload() {
            format!("service.{ident}(payload)")
        } else {
            format!("service.{ident}()")
        };
        let binding = if m.has_payload() { "payload" } else { "()" };
        code.open(format!(
            "{} => match decode_{ident}_request(req, params, encoders) {{",
            rust_str(&m.ep.method_name)
        ));
        code.line(format!(
            "Err(err) => encode_{ident}_error(&{}::from(err), accept, encoders, formatter),",
            m.error_enum
        ));
        code.open(format!("Ok({binding}) => match {call} {{"));
        code.open(format!(
            "Ok(result) => encode_{ident}_response(&result, accept, encoders).unwrap_or_else(|e| {{"
        ));
        code.line(
            "encode_generic_error(&GenericError::fault(\"encoding\", e.to_string()), accept, encoders, formatter)",
        );
        code.close("}),");
        code.line(format!("Err(err) => encode_{ident}_error(&err, accept, encoders, formatter),"));
        code.close("},");
        code.close("},");
    }
    code.line("_ => return None,");
    code.close("};");
    code.line("Some(response)");
    code.close("}");
    code.finish()
}

/// `mounts`: the routes and static mounts of the service in table order.
pub(crate) fn render_mounts(ctx: &ServiceCtx<'_>, resolution: &Resolution) -> String {
    let mut code = Code::new(0);
    let service = rust_str(&ctx.service.name);
    code.line("/// Mount records of the service, in routing order.");
    code.open("pub fn mounts() -> Vec<MountRecord> {");
    code.open("vec![");
    for m in &ctx.methods {
        for route in &m.ep.routes {
            code.line(format!(
                "MountRecord::endpoint({service}, {}, {}, {}),",
                rust_str(&m.ep.method_name),
                verb_expr(route.verb.as_str()),
                rust_str(&route.pattern)
            ));
        }
    }
    for mount in resolution.mounts_of(ctx.service.id) {
        code.line(format!(
            "MountRecord::file_server({service}, {}, {}),",
            rust_str(&mount.source),
            rust_str(&mount.path)
        ));
    }
    code.close("]");
    code.close("}");
    code.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbs() {
        assert_eq!(verb_expr("GET"), "Method::GET");
        assert_eq!(
            verb_expr("PURGE"),
            "Method::from_bytes(\"PURGE\".as_bytes()).unwrap_or_default()"
        );
    }
}
