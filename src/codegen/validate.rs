//! Constraint checks in generated code: the calls decoders make for each
//! attribute and the `validate` method of every generated struct.

use super::{rust_str, scalar_info, Code, FieldDef, TypeDef};
use crate::model::{AttributeType, Primitive, ServiceModel, Validation};

/// Validation calls for one value. `v` is a reference to the value and
/// `name` a Rust expression for the field path.
pub(crate) fn validation_lines(
    name: &str,
    f: &FieldDef,
    prim: Option<(Primitive, bool)>,
    validation: &Validation,
    code: &mut Code,
) {
    if validation.is_empty() {
        return;
    }
    if validation.min_length.is_some() || validation.max_length.is_some() {
        let len = if f.ty == "String" {
            "v.chars().count()"
        } else if f.ty == "Bytes" {
            "v.0.len()"
        } else {
            "v.len()"
        };
        code.line(format!(
            "check_length({name}, {len}, {:?}, {:?})?;",
            validation.min_length, validation.max_length
        ));
    }
    let numeric = matches!(prim, Some((p, false)) if p.is_numeric());
    if numeric && (validation.minimum.is_some() || validation.maximum.is_some()) {
        let fmt =
            |b: Option<f64>| b.map_or_else(|| "None".to_string(), |b| format!("Some({b:?})"));
        code.line(format!(
            "check_range({name}, *v as f64, {}, {})?;",
            fmt(validation.minimum),
            fmt(validation.maximum)
        ));
    }
    if !validation.enum_values.is_empty() && matches!(prim, Some((_, false))) {
        let allowed: Vec<String> = validation
            .enum_values
            .iter()
            .map(|v| match v {
                serde_json::Value::String(s) => rust_str(s),
                other => rust_str(&other.to_string()),
            })
            .collect();
        code.line(format!("check_enum({name}, &v.to_wire(), &[{}])?;", allowed.join(", ")));
    }
    if let (Some(pattern), Some((Primitive::String, false))) = (&validation.pattern, prim) {
        code.line(format!("check_pattern({name}, v, {})?;", rust_str(pattern)));
    }
}

/// Whether values of `ty` contain a generated struct.
pub(crate) fn has_struct(model: &ServiceModel, ty: &AttributeType) -> bool {
    match model.resolve(ty) {
        AttributeType::Object(_) => true,
        AttributeType::Array(elem) => has_struct(model, elem),
        AttributeType::Map(_, value) => has_struct(model, value),
        _ => false,
    }
}

/// Calls the `validate` method of every struct reachable from `value`, a
/// reference of type `ty`. `path` is a `&str` expression.
pub(crate) fn nested_checks(
    model: &ServiceModel,
    ty: &AttributeType,
    value: &str,
    path: &str,
    depth: usize,
    code: &mut Code,
) {
    match model.resolve(ty) {
        AttributeType::Object(_) => code.line(format!("{value}.validate({path})?;")),
        AttributeType::Array(elem) if has_struct(model, elem) => {
            let (i, item) = (format!("i{depth}"), format!("item{depth}"));
            code.open(format!("for ({i}, {item}) in {value}.iter().enumerate() {{"));
            let indexed = format!("&format!(\"{{}}[{{}}]\", {path}, {i})");
            nested_checks(model, elem, &item, &indexed, depth + 1, code);
            code.close("}");
        }
        AttributeType::Map(_, elem) if has_struct(model, elem) => {
            let item = format!("item{depth}");
            code.open(format!("for {item} in {value}.values() {{"));
            nested_checks(model, elem, &item, path, depth + 1, code);
            code.close("}");
        }
        _ => {}
    }
}

/// `impl T { pub fn validate(..) }` for a generated struct; `None` for
/// aliases.
pub(crate) fn render_validate_impl(model: &ServiceModel, def: &TypeDef) -> Option<String> {
    if def.alias.is_some() {
        return None;
    }
    let mut code = Code::new(0);
    code.open(format!("impl {} {{", def.name));
    code.line("/// Check field constraints, then those of nested structs. `field` is");
    code.line("/// the path of this value, empty at the top level.");
    code.open("pub fn validate(&self, field: &str) -> Result<(), DecodeError> {");
    for f in &def.fields {
        let nested = has_struct(model, &f.model_ty);
        if f.validation.is_empty() && !nested {
            continue;
        }
        code.open("{");
        code.line(format!("let path = field_path(field, {});", rust_str(&f.wire_name)));
        if f.optional {
            code.open(format!("if let Some(v) = &self.{} {{", f.name));
        } else {
            code.line(format!("let v = &self.{};", f.name));
        }
        validation_lines("&path", f, scalar_info(model, &f.model_ty), &f.validation, &mut code);
        nested_checks(model, &f.model_ty, "v", "&path", 0, &mut code);
        if f.optional {
            code.close("}");
        }
        code.close("}");
    }
    code.line("Ok(())");
    code.close("}");
    code.close("}");
    Some(code.finish())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::codegen::TypeRegistry;
    use crate::model::{parse_model, ModelFormat};

    #[test]
    fn validation_calls() {
        let f = FieldDef {
            name: "name".into(),
            wire_name: "name".into(),
            ty: "String".into(),
            optional: false,
            description: None,
            model_ty: AttributeType::Primitive(Primitive::String),
            validation: Validation::default(),
        };
        let v = Validation {
            min_length: Some(2),
            pattern: Some("^[a-z]+$".into()),
            enum_values: vec![serde_json::json!("ab"), serde_json::json!("cd")],
            ..Validation::default()
        };
        let mut code = Code::new(0);
        validation_lines(&rust_str("name"), &f, Some((Primitive::String, false)), &v, &mut code);
        let src = code.finish();
        assert!(
            src.contains("check_length(\"name\", v.chars().count(), Some(2), None)?;"),
            "{src}"
        );
        assert!(src.contains("check_enum(\"name\", &v.to_wire(), &[\"ab\", \"cd\"])?;"), "{src}");
        assert!(src.contains("check_pattern(\"name\", v, \"^[a-z]+$\")?;"), "{src}");
    }

    #[test]
    fn structs_validate_their_nested_fields() {
        let model = parse_model(
            r#"
api: { name: shop }
types:
  - name: Line
    fields:
      - { name: sku, type: string, required: true, min_length: 3 }
  - name: Order
    fields:
      - { name: lines, type: "array<Line>", required: true }
      - { name: by_store, type: "map<string, Line>" }
      - { name: note, type: string }
"#,
            ModelFormat::Yaml,
        )
        .unwrap();
        let mut registry = TypeRegistry::new(&model);
        let order = model.find_type("Order").unwrap();
        registry.rust_type(&AttributeType::User(order.id), "unused");
        let defs = registry.into_defs();

        let order = defs.iter().find(|d| d.name == "Order").unwrap();
        let src = render_validate_impl(&model, order).unwrap();
        assert!(src.contains("let path = field_path(field, \"lines\");"), "{src}");
        assert!(src.contains("for (i0, item0) in v.iter().enumerate() {"), "{src}");
        assert!(src.contains("item0.validate(&format!(\"{}[{}]\", &path, i0))?;"), "{src}");
        assert!(src.contains("for item0 in v.values() {"), "{src}");
        assert!(!src.contains("\"note\""), "{src}");

        let line = defs.iter().find(|d| d.name == "Line").unwrap();
        let src = render_validate_impl(&model, line).unwrap();
        assert!(
            src.contains("check_length(&path, v.chars().count(), Some(3), None)?;"),
            "{src}"
        );
    }
}
