//! Constraint checks shared by the interpretive decoder and generated code.

use super::error::DecodeError;
use super::value::{join_field, TypedValue};
use crate::model::{AttributeType, ServiceModel, Validation};
use regex::Regex;

/// # Errors
///
/// [`DecodeError::InvalidLength`] when `length` is outside the bounds.
pub fn check_length(
    field: &str,
    length: usize,
    min: Option<u64>,
    max: Option<u64>,
) -> Result<(), DecodeError> {
    let len = length as u64;
    if min.is_some_and(|m| len < m) || max.is_some_and(|m| len > m) {
        return Err(DecodeError::InvalidLength {
            field: field.to_string(),
            length,
            min,
            max,
        });
    }
    Ok(())
}

/// # Errors
///
/// [`DecodeError::InvalidRange`] when `value` is outside the bounds.
pub fn check_range(
    field: &str,
    value: f64,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<(), DecodeError> {
    if min.is_some_and(|m| value < m) || max.is_some_and(|m| value > m) {
        return Err(DecodeError::InvalidRange {
            field: field.to_string(),
            received: value.to_string(),
            min,
            max,
        });
    }
    Ok(())
}

/// `received` is the wire text of the value, `allowed` the wire text of each
/// enum member.
///
/// # Errors
///
/// [`DecodeError::InvalidEnum`] when the value is not a member.
pub fn check_enum(field: &str, received: &str, allowed: &[&str]) -> Result<(), DecodeError> {
    if allowed.contains(&received) {
        return Ok(());
    }
    Err(DecodeError::InvalidEnum {
        field: field.to_string(),
        received: received.to_string(),
        allowed: allowed.iter().map(|s| (*s).to_string()).collect(),
    })
}

/// # Errors
///
/// [`DecodeError::InvalidPattern`] when `value` does not match, or the
/// pattern itself is not a valid regular expression.
pub fn check_pattern(field: &str, value: &str, pattern: &str) -> Result<(), DecodeError> {
    let matches = Regex::new(pattern).map(|re| re.is_match(value)).unwrap_or(false);
    if matches {
        return Ok(());
    }
    Err(DecodeError::InvalidPattern {
        field: field.to_string(),
        pattern: pattern.to_string(),
        received: value.to_string(),
    })
}

/// Path of `child` inside `parent`, as reported in [`DecodeError`] fields.
pub fn field_path(parent: &str, child: &str) -> String {
    join_field(parent, child)
}

/// Enum members as the wire text used by [`check_enum`].
fn enum_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn check_constraints(
    validation: &Validation,
    value: &TypedValue,
    field: &str,
) -> Result<(), DecodeError> {
    if validation.is_empty() {
        return Ok(());
    }
    let length = match value {
        TypedValue::String(s) => Some(s.chars().count()),
        TypedValue::Bytes(b) => Some(b.len()),
        TypedValue::Array(items) => Some(items.len()),
        TypedValue::Map(entries) => Some(entries.len()),
        _ => None,
    };
    if let Some(length) = length {
        check_length(field, length, validation.min_length, validation.max_length)?;
    }
    if let Some(n) = value.as_f64() {
        check_range(field, n, validation.minimum, validation.maximum)?;
    }
    if !validation.enum_values.is_empty() {
        let received = enum_text(&value.to_json());
        let allowed: Vec<String> = validation.enum_values.iter().map(enum_text).collect();
        let allowed: Vec<&str> = allowed.iter().map(String::as_str).collect();
        check_enum(field, &received, &allowed)?;
    }
    if let (Some(pattern), TypedValue::String(s)) = (&validation.pattern, value) {
        check_pattern(field, s, pattern)?;
    }
    Ok(())
}

/// Validate a decoded value: required fields present, constraints met,
/// recursively through objects, arrays and maps.
///
/// # Errors
///
/// The first [`DecodeError`] found, in field declaration order.
pub fn validate(
    model: &ServiceModel,
    ty: &AttributeType,
    validation: &Validation,
    value: &TypedValue,
    field: &str,
    location: &str,
) -> Result<(), DecodeError> {
    check_constraints(validation, value, field)?;
    match (model.resolve(ty), value) {
        (AttributeType::Object(fields), TypedValue::Object(values)) => {
            for f in fields {
                let path = join_field(field, &f.name);
                match values.get(&f.name) {
                    Some(v) => {
                        let attr = &f.attribute;
                        validate(model, &attr.ty, &attr.validation, v, &path, location)?
                    }
                    None if f.required => {
                        return Err(DecodeError::MissingField {
                            field: path,
                            location: location.to_string(),
                        })
                    }
                    None => {}
                }
            }
            Ok(())
        }
        (AttributeType::Array(elem), TypedValue::Array(items)) => {
            let none = Validation::default();
            for (i, item) in items.iter().enumerate() {
                validate(model, elem, &none, item, &format!("{field}[{i}]"), location)?;
            }
            Ok(())
        }
        (AttributeType::Map(_, value_ty), TypedValue::Map(entries)) => {
            let none = Validation::default();
            for (_, v) in entries {
                validate(model, value_ty, &none, v, field, location)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
