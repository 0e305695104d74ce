//! Dynamic payload/result values used by the interpretive codecs.

use super::error::{BuildError, DecodeError};
use super::format::{format_scalar, parse_scalar};
use crate::model::{AttributeType, Primitive, ServiceModel};
use base64::Engine as _;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// A value shaped by an [`AttributeType`].
///
/// Primitive widths are kept: an `int32` attribute holds
/// [`TypedValue::Int32`], never a widened integer, so a build/decode round
/// trip can be compared exactly.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    String(String),
    Int(i64),
    Int32(i32),
    Int64(i64),
    UInt(u64),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Bool(bool),
    Bytes(Vec<u8>),
    Any(Value),
    Array(Vec<TypedValue>),
    Map(Vec<(TypedValue, TypedValue)>),
    Object(BTreeMap<String, TypedValue>),
}

impl TypedValue {
    /// Object from `(name, value)` pairs.
    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, TypedValue)>) -> Self {
        TypedValue::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    #[must_use]
    pub fn string(s: impl Into<String>) -> Self {
        TypedValue::String(s.into())
    }

    #[must_use]
    pub fn primitive(&self) -> Option<Primitive> {
        Some(match self {
            TypedValue::String(_) => Primitive::String,
            TypedValue::Int(_) => Primitive::Int,
            TypedValue::Int32(_) => Primitive::Int32,
            TypedValue::Int64(_) => Primitive::Int64,
            TypedValue::UInt(_) => Primitive::UInt,
            TypedValue::UInt32(_) => Primitive::UInt32,
            TypedValue::UInt64(_) => Primitive::UInt64,
            TypedValue::Float32(_) => Primitive::Float32,
            TypedValue::Float64(_) => Primitive::Float64,
            TypedValue::Bool(_) => Primitive::Boolean,
            TypedValue::Bytes(_) => Primitive::Bytes,
            TypedValue::Any(_) => Primitive::Any,
            _ => return None,
        })
    }

    /// Short description used in mismatch errors.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            TypedValue::Array(_) => "array",
            TypedValue::Map(_) => "map",
            TypedValue::Object(_) => "object",
            other => other.primitive().map_or("value", Primitive::name),
        }
    }

    /// Field of an object value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&TypedValue> {
        match self {
            TypedValue::Object(fields) => fields.get(field),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view used by range validation.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        Some(match self {
            TypedValue::Int(v) | TypedValue::Int64(v) => *v as f64,
            TypedValue::Int32(v) => f64::from(*v),
            TypedValue::UInt(v) | TypedValue::UInt64(v) => *v as f64,
            TypedValue::UInt32(v) => f64::from(*v),
            TypedValue::Float32(v) => f64::from(*v),
            TypedValue::Float64(v) => *v,
            _ => return None,
        })
    }

    /// JSON representation written into bodies.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            TypedValue::String(s) => Value::String(s.clone()),
            TypedValue::Int(v) | TypedValue::Int64(v) => Value::from(*v),
            TypedValue::Int32(v) => Value::from(*v),
            TypedValue::UInt(v) | TypedValue::UInt64(v) => Value::from(*v),
            TypedValue::UInt32(v) => Value::from(*v),
            TypedValue::Float32(v) => {
                Number::from_f64(f64::from(*v)).map_or(Value::Null, Value::Number)
            }
            TypedValue::Float64(v) => Number::from_f64(*v).map_or(Value::Null, Value::Number),
            TypedValue::Bool(b) => Value::Bool(*b),
            TypedValue::Bytes(b) => {
                Value::String(base64::engine::general_purpose::STANDARD.encode(b))
            }
            TypedValue::Any(v) => v.clone(),
            TypedValue::Array(items) => {
                Value::Array(items.iter().map(TypedValue::to_json).collect())
            }
            TypedValue::Map(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (k, v) in entries {
                    let key = format_scalar(k).unwrap_or_else(|| k.to_json().to_string());
                    map.insert(key, v.to_json());
                }
                Value::Object(map)
            }
            TypedValue::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Shape a decoded body according to `ty`.
    ///
    /// `lenient` accepts string encodings of numbers and booleans, which is
    /// all text-only formats such as XML can carry.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidFieldType`] naming the offending field.
    pub fn from_json(
        model: &ServiceModel,
        ty: &AttributeType,
        value: &Value,
        field: &str,
        lenient: bool,
    ) -> Result<TypedValue, DecodeError> {
        let mismatch = |expected: &str| DecodeError::InvalidFieldType {
            field: field.to_string(),
            expected: expected.to_string(),
            received: value.to_string(),
        };
        match model.resolve(ty) {
            AttributeType::Empty => Err(mismatch("no value")),
            AttributeType::Primitive(p) => {
                json_primitive(*p, value, lenient).ok_or_else(|| mismatch(p.name()))
            }
            AttributeType::Array(elem) => {
                let Value::Array(items) = value else {
                    return Err(mismatch("array"));
                };
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        TypedValue::from_json(model, elem, item, &format!("{field}[{i}]"), lenient)
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(TypedValue::Array)
            }
            AttributeType::Map(key_ty, value_ty) => {
                let Value::Object(entries) = value else {
                    return Err(mismatch("map"));
                };
                let key_prim = model.resolve(key_ty).as_primitive().unwrap_or(Primitive::String);
                let mut out = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    let path = format!("{field}.{k}");
                    let key =
                        parse_scalar(k, key_prim).ok_or_else(|| DecodeError::InvalidFieldType {
                            field: path.clone(),
                            expected: key_prim.name().to_string(),
                            received: k.clone(),
                        })?;
                    let val = TypedValue::from_json(model, value_ty, v, &path, lenient)?;
                    out.push((key, val));
                }
                Ok(TypedValue::Map(out))
            }
            AttributeType::Object(fields) => {
                let Value::Object(entries) = value else {
                    return Err(mismatch("object"));
                };
                let mut out = BTreeMap::new();
                for f in fields {
                    match entries.get(&f.name) {
                        None | Some(Value::Null) => {}
                        Some(v) => {
                            let path = join_field(field, &f.name);
                            out.insert(
                                f.name.clone(),
                                TypedValue::from_json(model, &f.attribute.ty, v, &path, lenient)?,
                            );
                        }
                    }
                }
                Ok(TypedValue::Object(out))
            }
            // resolve never returns a user reference
            AttributeType::User(_) => Err(mismatch("user type")),
        }
    }
}

/// `parent.child`, or just `child` at the top level.
pub(crate) fn join_field(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}.{child}")
    }
}

fn json_primitive(p: Primitive, value: &Value, lenient: bool) -> Option<TypedValue> {
    if lenient {
        if let Value::String(s) = value {
            if p != Primitive::String && p != Primitive::Any {
                return parse_scalar(s, p);
            }
        }
    }
    match p {
        Primitive::String => value.as_str().map(TypedValue::string),
        Primitive::Int => value.as_i64().map(TypedValue::Int),
        Primitive::Int64 => value.as_i64().map(TypedValue::Int64),
        Primitive::Int32 => value
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(TypedValue::Int32),
        Primitive::UInt => value.as_u64().map(TypedValue::UInt),
        Primitive::UInt64 => value.as_u64().map(TypedValue::UInt64),
        Primitive::UInt32 => value
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .map(TypedValue::UInt32),
        Primitive::Float32 => value.as_f64().map(|v| TypedValue::Float32(v as f32)),
        Primitive::Float64 => value.as_f64().map(TypedValue::Float64),
        Primitive::Boolean => value.as_bool().map(TypedValue::Bool),
        Primitive::Bytes => value
            .as_str()
            .and_then(|s| base64::engine::general_purpose::STANDARD.decode(s).ok())
            .map(TypedValue::Bytes),
        Primitive::Any => Some(TypedValue::Any(value.clone())),
    }
}

/// Check that `value` has the shape `ty` describes. Used before a client
/// request is built so type errors surface as errors, not garbled wire data.
pub(crate) fn conforms(
    model: &ServiceModel,
    ty: &AttributeType,
    value: &TypedValue,
    field: &str,
) -> Result<(), BuildError> {
    let mismatch = |expected: &str| {
        Err(BuildError::TypeMismatch {
            field: field.to_string(),
            expected: expected.to_string(),
            received: value.kind().to_string(),
        })
    };
    match (model.resolve(ty), value) {
        (AttributeType::Primitive(p), v) => {
            if v.primitive() == Some(*p) {
                Ok(())
            } else {
                mismatch(p.name())
            }
        }
        (AttributeType::Array(elem), TypedValue::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                conforms(model, elem, item, &format!("{field}[{i}]"))?;
            }
            Ok(())
        }
        (AttributeType::Map(k, v), TypedValue::Map(entries)) => {
            for (key, val) in entries {
                conforms(model, k, key, field)?;
                conforms(model, v, val, field)?;
            }
            Ok(())
        }
        (AttributeType::Object(fields), TypedValue::Object(values)) => {
            for (name, val) in values {
                match fields.iter().find(|f| &f.name == name) {
                    Some(f) => conforms(model, &f.attribute.ty, val, &join_field(field, name))?,
                    None => {
                        return Err(BuildError::TypeMismatch {
                            field: join_field(field, name),
                            expected: "no such attribute".to_string(),
                            received: val.kind().to_string(),
                        })
                    }
                }
            }
            Ok(())
        }
        (AttributeType::Array(_), _) => mismatch("array"),
        (AttributeType::Map(_, _), _) => mismatch("map"),
        (AttributeType::Object(_), _) => mismatch("object"),
        (AttributeType::Empty, _) | (AttributeType::User(_), _) => mismatch("no value"),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::model::{parse_model, ModelFormat};
    use serde_json::json;

    fn model() -> ServiceModel {
        parse_model("api: { name: t }", ModelFormat::Yaml).unwrap()
    }

    #[test]
    fn json_keeps_widths() {
        let m = model();
        let ty = AttributeType::Primitive(Primitive::UInt32);
        let v = TypedValue::from_json(&m, &ty, &json!(7), "n", false).unwrap();
        assert_eq!(v, TypedValue::UInt32(7));
        assert!(TypedValue::from_json(&m, &ty, &json!(-1), "n", false).is_err());
        assert!(TypedValue::from_json(&m, &ty, &json!("7"), "n", false).is_err());
        assert_eq!(
            TypedValue::from_json(&m, &ty, &json!("7"), "n", true).unwrap(),
            TypedValue::UInt32(7)
        );
    }

    #[test]
    fn float32_survives_json() {
        let m = model();
        let ty = AttributeType::Primitive(Primitive::Float32);
        let original = TypedValue::Float32(1.1);
        let back = TypedValue::from_json(&m, &ty, &original.to_json(), "f", false).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn mismatch_names_nested_field() {
        let m = model();
        let ty = AttributeType::Array(Box::new(AttributeType::Primitive(Primitive::Int)));
        let err = TypedValue::from_json(&m, &ty, &json!([1, "x"]), "ids", false).unwrap_err();
        assert_eq!(err.field(), Some("ids[1]"));
    }

    #[test]
    fn conformance_reports_width_mismatch() {
        let m = model();
        let ty = AttributeType::Primitive(Primitive::Int32);
        assert!(conforms(&m, &ty, &TypedValue::Int32(1), "x").is_ok());
        match conforms(&m, &ty, &TypedValue::Int64(1), "x").unwrap_err() {
            BuildError::TypeMismatch { field, expected, received } => {
                assert_eq!(
                    (field.as_str(), expected.as_str(), received.as_str()),
                    ("x", "int32", "int64")
                );
            }
            other => panic!("unexpected error {other}"),
        }
    }
}
