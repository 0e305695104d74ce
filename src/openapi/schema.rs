//! JSON schemas for attribute types, shared by both document versions.

use super::OrderedMap;
use crate::codegen::to_camel_case;
use crate::model::{
    Attribute, AttributeType, Field, Primitive, ServiceModel, Validation, DEFAULT_VIEW,
};
use serde::Serialize;
use serde_json::Value;

/// Subset of JSON schema used by Swagger 2.0 and OpenAPI 3.0.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "OrderedMap::is_empty")]
    pub properties: OrderedMap<Schema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl Schema {
    #[must_use]
    pub fn of_type(ty: &str) -> Self {
        Self {
            ty: Some(ty.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn reference(target: String) -> Self {
        Self {
            reference: Some(target),
            ..Self::default()
        }
    }

    /// Copy declared constraints onto the schema. Length bounds become item
    /// bounds on arrays.
    pub fn constrain(&mut self, validation: &Validation) {
        if self.ty.as_deref() == Some("array") {
            self.min_items = validation.min_length;
            self.max_items = validation.max_length;
        } else {
            self.min_length = validation.min_length;
            self.max_length = validation.max_length;
        }
        self.minimum = validation.minimum;
        self.maximum = validation.maximum;
        self.enum_values.clone_from(&validation.enum_values);
        self.pattern.clone_from(&validation.pattern);
    }
}

/// Schema of a primitive.
#[must_use]
pub fn primitive_schema(p: Primitive) -> Schema {
    let (ty, format) = match p {
        Primitive::String => ("string", None),
        Primitive::Int32 | Primitive::UInt32 => ("integer", Some("int32")),
        Primitive::Int | Primitive::Int64 | Primitive::UInt | Primitive::UInt64 => {
            ("integer", Some("int64"))
        }
        Primitive::Float32 => ("number", Some("float")),
        Primitive::Float64 => ("number", Some("double")),
        Primitive::Boolean => ("boolean", None),
        Primitive::Bytes => ("string", Some("byte")),
        Primitive::Any => return Schema::default(),
    };
    Schema {
        format: format.map(str::to_string),
        ..Schema::of_type(ty)
    }
}

/// Builds schemas and collects the named definitions they reference.
pub struct SchemaBuilder<'m> {
    model: &'m ServiceModel,
    /// `#/definitions/` or `#/components/schemas/`
    prefix: &'static str,
    definitions: OrderedMap<Schema>,
}

impl<'m> SchemaBuilder<'m> {
    #[must_use]
    pub fn new(model: &'m ServiceModel, prefix: &'static str) -> Self {
        Self {
            model,
            prefix,
            definitions: OrderedMap::new(),
        }
    }

    pub fn into_definitions(self) -> OrderedMap<Schema> {
        self.definitions
    }

    fn reference(&self, name: &str) -> Schema {
        Schema::reference(format!("{}{name}", self.prefix))
    }

    /// Schema of a type. User types are defined once and referenced.
    pub fn schema(&mut self, ty: &AttributeType) -> Schema {
        match ty {
            AttributeType::Empty => Schema::default(),
            AttributeType::Primitive(p) => primitive_schema(*p),
            AttributeType::Array(elem) => Schema {
                items: Some(Box::new(self.schema(elem))),
                ..Schema::of_type("array")
            },
            AttributeType::Map(_, value) => Schema {
                additional_properties: Some(Box::new(self.schema(value))),
                ..Schema::of_type("object")
            },
            AttributeType::Object(fields) => self.object(fields.iter()),
            AttributeType::User(id) => {
                let user = self.model.user_type(*id);
                let name = user.name.clone();
                if !self.definitions.contains_key(&name) {
                    // placeholder first: recursive types reference themselves
                    self.definitions.insert(name.clone(), Schema::default());
                    let mut def = self.attribute(&user.attribute);
                    if def.description.is_none() {
                        def.description.clone_from(&user.attribute.description);
                    }
                    self.definitions.insert(name.clone(), def);
                }
                self.reference(&name)
            }
        }
    }

    /// Schema of a path, query or header value. Aliases are resolved since
    /// parameters cannot refer to definitions.
    pub fn inline(&mut self, ty: &AttributeType) -> Schema {
        let model = self.model;
        match model.resolve(ty) {
            AttributeType::Array(elem) => Schema {
                items: Some(Box::new(self.inline(elem))),
                ..Schema::of_type("array")
            },
            other => self.schema(other),
        }
    }

    /// Schema of an attribute with its description, default and constraints.
    pub fn attribute(&mut self, attribute: &Attribute) -> Schema {
        let mut schema = self.schema(&attribute.ty);
        if schema.reference.is_some() {
            return schema;
        }
        schema.description.clone_from(&attribute.description);
        schema.default.clone_from(&attribute.default);
        schema.constrain(&attribute.validation);
        schema
    }

    /// Inline object made of `fields`.
    pub fn object<'f>(&mut self, fields: impl Iterator<Item = &'f Field>) -> Schema {
        let mut schema = Schema::of_type("object");
        for field in fields {
            if field.required {
                schema.required.push(field.name.clone());
            }
            let property = self.attribute(&field.attribute);
            schema.properties.insert(field.name.clone(), property);
        }
        schema
    }

    /// Object restricted to the named attributes of `ty`. Refers to the full
    /// type when nothing is left out.
    pub fn subset(&mut self, ty: &AttributeType, names: &[String]) -> Schema {
        let Some(fields) = self.model.fields(ty) else {
            return self.schema(ty);
        };
        let complete =
            fields.len() == names.len() && fields.iter().all(|f| names.contains(&f.name));
        if complete {
            return self.schema(ty);
        }
        let selected: Vec<&Field> = names
            .iter()
            .filter_map(|n| fields.iter().find(|f| &f.name == n))
            .collect();
        self.object(selected.into_iter())
    }

    /// Schema of a result rendered with `view`. A non-default view of a user
    /// type gets its own definition named `{Type}{View}`.
    pub fn view(&mut self, ty: &AttributeType, view: Option<&str>) -> Schema {
        let (AttributeType::User(id), Some(view)) = (ty, view) else {
            return self.schema(ty);
        };
        if view == DEFAULT_VIEW {
            return self.schema(ty);
        }
        let user = self.model.user_type(*id);
        let Some(attributes) = user.view_attributes(view) else {
            return self.schema(ty);
        };
        let name = format!("{}{}", user.name, to_camel_case(view));
        if !self.definitions.contains_key(&name) {
            let fields: Vec<&Field> = self
                .model
                .fields(ty)
                .map(|fs| fs.iter().filter(|f| attributes.contains(&f.name)).collect())
                .unwrap_or_default();
            let mut def = self.object(fields.into_iter());
            def.description.clone_from(&user.attribute.description);
            self.definitions.insert(name.clone(), def);
        }
        self.reference(&name)
    }

    /// Attributes `view` projects out of a user type.
    #[must_use]
    pub fn view_attributes(&self, ty: &AttributeType, view: &str) -> Option<Vec<String>> {
        match ty {
            AttributeType::User(id) => self.model.user_type(*id).view_attributes(view),
            _ => None,
        }
    }

    /// Schema of one named attribute of an object type.
    pub fn field(&mut self, ty: &AttributeType, name: &str) -> Schema {
        let attribute = self
            .model
            .fields(ty)
            .and_then(|fs| fs.iter().find(|f| f.name == name))
            .map(|f| f.attribute.clone());
        match attribute {
            Some(a) => self.attribute(&a),
            None => Schema::default(),
        }
    }

    /// Description of a named attribute of an object type.
    #[must_use]
    pub fn field_description(&self, ty: &AttributeType, name: &str) -> Option<String> {
        self.model
            .fields(ty)
            .and_then(|fs| fs.iter().find(|f| f.name == name))
            .and_then(|f| f.attribute.description.clone())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::model::{parse_model, ModelFormat};
    use serde_json::json;

    const MODEL: &str = r#"
api: { name: store }
types:
  - name: Item
    views:
      - { name: tiny, attributes: [id] }
    fields:
      - { name: id, type: uint32, required: true }
      - { name: name, type: string, min_length: 1 }
      - { name: tags, type: "array<string>", max_length: 5 }
"#;

    #[test]
    fn primitives_keep_their_width() {
        let s = serde_json::to_value(primitive_schema(Primitive::UInt32)).unwrap();
        assert_eq!(s, json!({"type": "integer", "format": "int32"}));
        let s = serde_json::to_value(primitive_schema(Primitive::Float64)).unwrap();
        assert_eq!(s, json!({"type": "number", "format": "double"}));
        let s = serde_json::to_value(primitive_schema(Primitive::Any)).unwrap();
        assert_eq!(s, json!({}));
    }

    #[test]
    fn user_types_and_views() {
        let model = parse_model(MODEL, ModelFormat::Yaml).unwrap();
        let item = AttributeType::User(model.find_type("Item").unwrap().id);
        let mut builder = SchemaBuilder::new(&model, "#/definitions/");
        let full = serde_json::to_value(builder.schema(&item)).unwrap();
        assert_eq!(full, json!({"$ref": "#/definitions/Item"}));
        let tiny = serde_json::to_value(builder.view(&item, Some("tiny"))).unwrap();
        assert_eq!(tiny, json!({"$ref": "#/definitions/ItemTiny"}));

        let defs = serde_json::to_value(builder.into_definitions()).unwrap();
        assert_eq!(
            defs["Item"],
            json!({
                "type": "object",
                "properties": {
                    "id": {"type": "integer", "format": "int32"},
                    "name": {"type": "string", "minLength": 1},
                    "tags": {"type": "array", "items": {"type": "string"}, "maxItems": 5}
                },
                "required": ["id"]
            })
        );
        assert_eq!(
            defs["ItemTiny"]["properties"],
            json!({"id": {"type": "integer", "format": "int32"}})
        );
    }
}
