//! Path builder functions.

use super::names::{fn_ident, path_fn_name};
use super::rust_types::{is_copy, primitive_type};
use super::{rust_str, scalar_info, Code, MethodCtx};
use crate::binding::{PayloadShape, RouteBinding, PARAM_RE};
use crate::model::{Primitive, ServiceModel};

/// One generated path builder.
#[derive(Debug, Clone)]
pub struct PathFn {
    pub name: String,
    pub pattern: String,
    /// `(parameter, Rust type)` in pattern order.
    pub params: Vec<(String, String)>,
    pub body: String,
}

impl PathFn {
    /// Function source.
    #[must_use]
    pub fn render(&self) -> String {
        let mut code = Code::new(0);
        code.line(format!("/// Path of `{}`.", self.pattern));
        let params = self
            .params
            .iter()
            .map(|(n, t)| format!("{n}: {t}"))
            .collect::<Vec<_>>()
            .join(", ");
        code.open(format!("pub fn {}({params}) -> String {{", self.name));
        code.line(&self.body);
        code.close("}");
        code.finish()
    }
}

/// Parameter type and formatting expression for a path value.
fn param_shape(prim: Primitive, array: bool, ident: &str) -> (String, String) {
    if array {
        return (format!("&[{}]", primitive_type(prim)), format!("path_list({ident})"));
    }
    match prim {
        Primitive::String => ("&str".to_string(), format!("escape({ident})")),
        p if is_copy(p) => (primitive_type(p).to_string(), ident.to_string()),
        p => (format!("&{}", primitive_type(p)), format!("path_segment({ident})")),
    }
}

/// Path builders for every route of a method.
#[must_use]
pub(crate) fn path_functions(model: &ServiceModel, m: &MethodCtx<'_>) -> Vec<PathFn> {
    m.ep.routes
        .iter()
        .enumerate()
        .map(|(i, route)| path_function(model, m, route, i))
        .collect()
}

fn path_function(
    model: &ServiceModel,
    m: &MethodCtx<'_>,
    route: &RouteBinding,
    index: usize,
) -> PathFn {
    let name = path_fn_name(&m.ep.service_name, &m.ep.method_name, index);
    let mut params = Vec::with_capacity(route.params.len());
    let mut args = Vec::with_capacity(route.params.len());
    for param in &route.params {
        let ident = fn_ident(param);
        let (prim, array) = m
            .ep
            .path_attribute(param)
            .and_then(|ab| scalar_info(model, &ab.ty))
            .unwrap_or((Primitive::String, false));
        let (ty, expr) = param_shape(prim, array, &ident);
        params.push((ident, ty));
        args.push(expr);
    }
    let body = match PARAM_RE.as_ref() {
        Ok(re) if !args.is_empty() => {
            let template = re.replace_all(&route.pattern, "{}");
            format!("format!({}, {})", rust_str(&template), args.join(", "))
        }
        _ => format!("String::from({})", rust_str(&route.pattern)),
    };
    PathFn {
        name,
        pattern: route.pattern.clone(),
        params,
        body,
    }
}

/// Arguments a client passes to the path builder of `route`, read from
/// `payload`.
#[must_use]
pub(crate) fn path_call(model: &ServiceModel, m: &MethodCtx<'_>, route_index: usize) -> String {
    let Some(route) = m.ep.routes.get(route_index) else {
        return String::new();
    };
    let name = path_fn_name(&m.ep.service_name, &m.ep.method_name, route_index);
    let mut args = Vec::with_capacity(route.params.len());
    for param in &route.params {
        let Some(ab) = m.ep.path_attribute(param) else { continue };
        let (prim, array) = scalar_info(model, &ab.ty).unwrap_or((Primitive::String, false));
        let by_value = !array && is_copy(prim);
        let arg = if m.ep.payload == PayloadShape::Single {
            if by_value { "*payload".to_string() } else { "payload".to_string() }
        } else {
            let field = m.payload_field(&ab.attribute);
            let ident = field.map_or_else(|| fn_ident(&ab.attribute), |f| f.name.clone());
            let access = format!("payload.{ident}");
            let optional = field.is_some_and(|f| f.optional);
            let missing = format!(
                "ok_or_else(|| BuildError::MissingField {{ field: {}.to_string() }})?",
                rust_str(&ab.attribute)
            );
            match (optional, by_value, prim == Primitive::String && !array) {
                (false, true, _) => access,
                (false, false, _) => format!("&{access}"),
                (true, true, _) => format!("{access}.{missing}"),
                (true, false, true) => format!("{access}.as_deref().{missing}"),
                (true, false, false) if array => format!("{access}.as_deref().{missing}"),
                (true, false, false) => format!("{access}.as_ref().{missing}"),
            }
        };
        args.push(arg);
    }
    format!("paths::{name}({})", args.join(", "))
}
