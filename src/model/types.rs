use super::{Meta, TypeId};
use serde_json::Value;
use std::fmt;

/// Primitive attribute types. Widths are kept distinct all the way to the
/// wire so that a `uint32` never silently becomes an `int64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Int,
    Int32,
    Int64,
    UInt,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Boolean,
    Bytes,
    Any,
}

impl Primitive {
    pub const ALL: [Primitive; 12] = [
        Primitive::String,
        Primitive::Int,
        Primitive::Int32,
        Primitive::Int64,
        Primitive::UInt,
        Primitive::UInt32,
        Primitive::UInt64,
        Primitive::Float32,
        Primitive::Float64,
        Primitive::Boolean,
        Primitive::Bytes,
        Primitive::Any,
    ];

    /// Name used in model documents.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Int => "int",
            Primitive::Int32 => "int32",
            Primitive::Int64 => "int64",
            Primitive::UInt => "uint",
            Primitive::UInt32 => "uint32",
            Primitive::UInt64 => "uint64",
            Primitive::Float32 => "float32",
            Primitive::Float64 => "float64",
            Primitive::Boolean => "boolean",
            Primitive::Bytes => "bytes",
            Primitive::Any => "any",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = match name {
            "bool" => "boolean",
            "float" => "float64",
            "double" => "float64",
            other => other,
        };
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    #[must_use]
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Primitive::Int
                | Primitive::Int32
                | Primitive::Int64
                | Primitive::UInt
                | Primitive::UInt32
                | Primitive::UInt64
        )
    }

    #[must_use]
    pub fn is_numeric(self) -> bool {
        self.is_integer() || matches!(self, Primitive::Float32 | Primitive::Float64)
    }

    /// Whether path and query encodings of this primitive must be
    /// percent-escaped. Numbers and booleans never contain reserved
    /// characters.
    #[must_use]
    pub fn needs_escape(self) -> bool {
        matches!(self, Primitive::String | Primitive::Any | Primitive::Bytes)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shape of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    /// No value at all (empty payload or result).
    Empty,
    Primitive(Primitive),
    Array(Box<AttributeType>),
    Map(Box<AttributeType>, Box<AttributeType>),
    /// Inline object with ordered fields.
    Object(Vec<Field>),
    /// Reference to a declared user type.
    User(TypeId),
}

impl AttributeType {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, AttributeType::Empty)
    }

    #[must_use]
    pub fn as_primitive(&self) -> Option<Primitive> {
        match self {
            AttributeType::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Element primitive of an array of primitives.
    #[must_use]
    pub fn array_element(&self) -> Option<Primitive> {
        match self {
            AttributeType::Array(elem) => elem.as_primitive(),
            _ => None,
        }
    }

    /// Primitive or array of primitives. Only these shapes may live in the
    /// path, the query string or a header.
    #[must_use]
    pub fn is_scalar_like(&self) -> bool {
        self.as_primitive().is_some() || self.array_element().is_some()
    }
}

/// Constraints declared on an attribute. Checked by the runtime decoders and
/// projected into document schemas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validation {
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub enum_values: Vec<Value>,
    pub pattern: Option<String>,
}

impl Validation {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Validation::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub ty: AttributeType,
    pub description: Option<String>,
    pub validation: Validation,
    pub default: Option<Value>,
    pub meta: Meta,
}

impl Attribute {
    #[must_use]
    pub fn new(ty: AttributeType) -> Self {
        Self {
            ty,
            description: None,
            validation: Validation::default(),
            default: None,
            meta: Meta::default(),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::new(AttributeType::Empty)
    }
}

/// Named member of an object type.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub attribute: Attribute,
    pub required: bool,
}

/// Named subset of a result type's attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub name: String,
    pub attributes: Vec<String>,
}

/// Name of the view that every user type implicitly has.
pub const DEFAULT_VIEW: &str = "default";

#[derive(Debug, Clone, PartialEq)]
pub struct UserType {
    pub id: TypeId,
    pub name: String,
    pub attribute: Attribute,
    /// Explicitly declared views. The `default` view is implicit.
    pub views: Vec<View>,
}

impl UserType {
    /// Attribute names projected by `view`. `None` when the view is unknown;
    /// the default view projects everything.
    #[must_use]
    pub fn view_attributes(&self, view: &str) -> Option<Vec<String>> {
        if let Some(v) = self.views.iter().find(|v| v.name == view) {
            return Some(v.attributes.clone());
        }
        if view == DEFAULT_VIEW {
            let names = match &self.attribute.ty {
                AttributeType::Object(fields) => fields.iter().map(|f| f.name.clone()).collect(),
                _ => Vec::new(),
            };
            return Some(names);
        }
        None
    }
}
