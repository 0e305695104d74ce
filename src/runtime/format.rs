//! Text encodings of scalar values for paths, query strings and headers.
//!
//! Numbers are written base-10 with their declared width, booleans as
//! `true`/`false`, bytes as standard base64 and `any` values as JSON text.
//! Strings, bytes and `any` values are percent-escaped inside paths; numbers
//! and booleans never need it.

use super::value::TypedValue;
use crate::model::Primitive;
use base64::Engine as _;
use std::borrow::Cow;

/// A Rust type generated code can place on the wire as a single scalar.
pub trait WireValue: Sized {
    /// Model primitive the type stands for.
    const PRIMITIVE: Primitive;

    fn to_wire(&self) -> String;

    fn from_wire(raw: &str) -> Option<Self>;
}

macro_rules! wire_number {
    ($($ty:ty => $prim:ident),* $(,)?) => {
        $(
            impl WireValue for $ty {
                const PRIMITIVE: Primitive = Primitive::$prim;

                fn to_wire(&self) -> String {
                    self.to_string()
                }

                fn from_wire(raw: &str) -> Option<Self> {
                    raw.trim().parse().ok()
                }
            }
        )*
    };
}

wire_number!(
    i32 => Int32,
    i64 => Int64,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
);

impl WireValue for bool {
    const PRIMITIVE: Primitive = Primitive::Boolean;

    fn to_wire(&self) -> String {
        self.to_string()
    }

    fn from_wire(raw: &str) -> Option<Self> {
        match raw.trim() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }
}

impl WireValue for String {
    const PRIMITIVE: Primitive = Primitive::String;

    fn to_wire(&self) -> String {
        self.clone()
    }

    fn from_wire(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl WireValue for Vec<u8> {
    const PRIMITIVE: Primitive = Primitive::Bytes;

    fn to_wire(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self)
    }

    fn from_wire(raw: &str) -> Option<Self> {
        base64::engine::general_purpose::STANDARD.decode(raw.trim()).ok()
    }
}

/// Bytes that serialise as standard base64 text, in bodies and on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bytes(pub Vec<u8>);

impl From<Vec<u8>> for Bytes {
    fn from(v: Vec<u8>) -> Self {
        Bytes(v)
    }
}

impl serde::Serialize for Bytes {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_wire())
    }
}

impl<'de> serde::Deserialize<'de> for Bytes {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Vec::<u8>::from_wire(&text)
            .map(Bytes)
            .ok_or_else(|| serde::de::Error::custom("invalid base64"))
    }
}

impl WireValue for Bytes {
    const PRIMITIVE: Primitive = Primitive::Bytes;

    fn to_wire(&self) -> String {
        self.0.to_wire()
    }

    fn from_wire(raw: &str) -> Option<Self> {
        Vec::<u8>::from_wire(raw).map(Bytes)
    }
}

impl WireValue for serde_json::Value {
    const PRIMITIVE: Primitive = Primitive::Any;

    fn to_wire(&self) -> String {
        self.to_string()
    }

    fn from_wire(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

/// Percent-escape a path segment.
#[must_use]
pub fn escape(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

/// Reverse of [`escape`]. `None` when the result is not UTF-8.
#[must_use]
pub fn unescape(raw: &str) -> Option<String> {
    urlencoding::decode(raw).ok().map(Cow::into_owned)
}

/// Path segment for one scalar, escaped when its primitive requires it.
#[must_use]
pub fn path_segment<T: WireValue>(value: &T) -> String {
    let raw = value.to_wire();
    if T::PRIMITIVE.needs_escape() {
        escape(&raw)
    } else {
        raw
    }
}

/// Path segment for an array: element encodings joined with `,`.
#[must_use]
pub fn path_list<T: WireValue>(values: &[T]) -> String {
    values.iter().map(path_segment).collect::<Vec<_>>().join(",")
}

/// Wire texts of a list. The empty list travels as one empty value so it
/// stays distinct from an absent attribute.
pub(crate) fn list_texts(texts: Vec<String>) -> Vec<String> {
    if texts.is_empty() {
        vec![String::new()]
    } else {
        texts
    }
}

/// Element texts of a received list. A lone empty value is the empty list;
/// numbers and booleans may also arrive comma separated.
pub(crate) fn list_parts(values: &[String], p: Primitive) -> Vec<&str> {
    if let [only] = values {
        if only.is_empty() {
            return Vec::new();
        }
    }
    if p.is_numeric() || p == Primitive::Boolean {
        values.iter().flat_map(|v| v.split(',')).map(str::trim).collect()
    } else {
        values.iter().map(String::as_str).collect()
    }
}

/// Text of a scalar [`TypedValue`]; `None` for arrays, maps and objects.
#[must_use]
pub fn format_scalar(value: &TypedValue) -> Option<String> {
    Some(match value {
        TypedValue::String(s) => s.clone(),
        TypedValue::Int(v) | TypedValue::Int64(v) => v.to_wire(),
        TypedValue::Int32(v) => v.to_wire(),
        TypedValue::UInt(v) | TypedValue::UInt64(v) => v.to_wire(),
        TypedValue::UInt32(v) => v.to_wire(),
        TypedValue::Float32(v) => v.to_wire(),
        TypedValue::Float64(v) => v.to_wire(),
        TypedValue::Bool(v) => v.to_wire(),
        TypedValue::Bytes(v) => v.to_wire(),
        TypedValue::Any(v) => v.to_wire(),
        TypedValue::Array(_) | TypedValue::Map(_) | TypedValue::Object(_) => return None,
    })
}

/// Parse a scalar of primitive `p`.
#[must_use]
pub fn parse_scalar(raw: &str, p: Primitive) -> Option<TypedValue> {
    match p {
        Primitive::String => Some(TypedValue::String(raw.to_string())),
        Primitive::Int => i64::from_wire(raw).map(TypedValue::Int),
        Primitive::Int32 => i32::from_wire(raw).map(TypedValue::Int32),
        Primitive::Int64 => i64::from_wire(raw).map(TypedValue::Int64),
        Primitive::UInt => u64::from_wire(raw).map(TypedValue::UInt),
        Primitive::UInt32 => u32::from_wire(raw).map(TypedValue::UInt32),
        Primitive::UInt64 => u64::from_wire(raw).map(TypedValue::UInt64),
        Primitive::Float32 => f32::from_wire(raw).map(TypedValue::Float32),
        Primitive::Float64 => f64::from_wire(raw).map(TypedValue::Float64),
        Primitive::Boolean => bool::from_wire(raw).map(TypedValue::Bool),
        Primitive::Bytes => Vec::<u8>::from_wire(raw).map(TypedValue::Bytes),
        Primitive::Any => serde_json::Value::from_wire(raw).map(TypedValue::Any),
    }
}

/// Path encoding of a scalar or array value.
#[must_use]
pub fn format_path_value(value: &TypedValue) -> Option<String> {
    match value {
        TypedValue::Array(items) => items
            .iter()
            .map(format_path_value)
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.join(",")),
        scalar => {
            let raw = format_scalar(scalar)?;
            let escaped = scalar.primitive().is_some_and(Primitive::needs_escape);
            Some(if escaped { escape(&raw) } else { raw })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_not_escaped() {
        assert_eq!(path_segment(&42i64), "42");
        assert_eq!(path_segment(&-7i32), "-7");
        assert_eq!(path_segment(&1.5f64), "1.5");
        assert_eq!(path_segment(&true), "true");
    }

    #[test]
    fn strings_are_escaped() {
        assert_eq!(path_segment(&"a b/c".to_string()), "a%20b%2Fc");
        assert_eq!(
            path_list(&["x,y".to_string(), "z".to_string()]),
            "x%2Cy,z"
        );
        assert_eq!(path_list(&[1u32, 2, 3]), "1,2,3");
    }

    #[test]
    fn scalar_parsing_respects_width() {
        assert_eq!(parse_scalar("300", Primitive::UInt32), Some(TypedValue::UInt32(300)));
        assert_eq!(parse_scalar("-1", Primitive::UInt32), None);
        assert_eq!(parse_scalar("4294967296", Primitive::UInt32), None);
        assert_eq!(parse_scalar("abc", Primitive::Int), None);
        assert_eq!(parse_scalar("0", Primitive::Boolean), Some(TypedValue::Bool(false)));
    }

    #[test]
    fn any_values_use_json_text() {
        let v = TypedValue::Any(serde_json::json!("42"));
        let text = format_scalar(&v).unwrap_or_default();
        assert_eq!(text, "\"42\"");
        assert_eq!(parse_scalar(&text, Primitive::Any), Some(v));
    }

    #[test]
    fn list_texts_and_parts() {
        assert_eq!(list_texts(Vec::new()), vec![String::new()]);
        let values = vec!["1, 2".to_string(), "3".to_string()];
        assert_eq!(list_parts(&values, Primitive::Int), vec!["1", "2", "3"]);
        let values = vec!["a,b".to_string(), " c".to_string()];
        assert_eq!(list_parts(&values, Primitive::String), vec!["a,b", " c"]);
        assert!(list_parts(&[String::new()], Primitive::String).is_empty());
    }

    #[test]
    fn unescape_reverses_escape() {
        let raw = "ünïcode & spaces/slashes";
        assert_eq!(unescape(&escape(raw)).as_deref(), Some(raw));
    }
}
