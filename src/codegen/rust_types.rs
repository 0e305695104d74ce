//! Rust type definitions for payloads, results and errors.

use super::names::{fn_ident, type_ident};
use crate::model::{AttributeType, Field, Primitive, ServiceModel, Validation};
use std::collections::BTreeSet;

/// A field of a generated struct.
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Rust field name.
    pub name: String,
    /// Attribute name in the model, used on the wire.
    pub wire_name: String,
    /// Type without the `Option` wrapper.
    pub ty: String,
    pub optional: bool,
    pub description: Option<String>,
    /// Model type of the attribute.
    pub model_ty: AttributeType,
    pub validation: Validation,
}

impl FieldDef {
    #[must_use]
    pub fn full_type(&self) -> String {
        if self.optional {
            format!("Option<{}>", self.ty)
        } else {
            self.ty.clone()
        }
    }

    #[must_use]
    pub fn needs_rename(&self) -> bool {
        self.name.trim_start_matches("r#") != self.wire_name
    }
}

/// A generated struct or alias.
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub name: String,
    pub description: Option<String>,
    /// `Some` for aliases of non-object types.
    pub alias: Option<String>,
    pub fields: Vec<FieldDef>,
}

/// Rust type for a primitive.
#[must_use]
pub fn primitive_type(p: Primitive) -> &'static str {
    match p {
        Primitive::String => "String",
        Primitive::Int | Primitive::Int64 => "i64",
        Primitive::Int32 => "i32",
        Primitive::UInt | Primitive::UInt64 => "u64",
        Primitive::UInt32 => "u32",
        Primitive::Float32 => "f32",
        Primitive::Float64 => "f64",
        Primitive::Boolean => "bool",
        Primitive::Bytes => "Bytes",
        Primitive::Any => "serde_json::Value",
    }
}

/// Whether values of the primitive are passed by value (`Copy`).
#[must_use]
pub fn is_copy(p: Primitive) -> bool {
    p.is_numeric() || p == Primitive::Boolean
}

/// Collects the definitions one generated module needs, in first-use order.
pub struct TypeRegistry<'m> {
    model: &'m ServiceModel,
    defs: Vec<TypeDef>,
    names: BTreeSet<String>,
    users: Vec<(usize, String)>,
}

impl<'m> TypeRegistry<'m> {
    #[must_use]
    pub fn new(model: &'m ServiceModel) -> Self {
        Self {
            model,
            defs: Vec::new(),
            names: BTreeSet::new(),
            users: Vec::new(),
        }
    }

    #[must_use]
    pub fn defs(&self) -> &[TypeDef] {
        &self.defs
    }

    pub fn into_defs(self) -> Vec<TypeDef> {
        self.defs
    }

    fn unique(&mut self, base: &str) -> String {
        let mut name = base.to_string();
        let mut n = 2;
        while self.names.contains(&name) {
            name = format!("{base}{n}");
            n += 1;
        }
        self.names.insert(name.clone());
        name
    }

    /// Rust type for `ty`. Inline objects become structs named after `hint`.
    pub fn rust_type(&mut self, ty: &AttributeType, hint: &str) -> String {
        match ty {
            AttributeType::Empty => "()".to_string(),
            AttributeType::Primitive(p) => primitive_type(*p).to_string(),
            AttributeType::Array(elem) => {
                format!("Vec<{}>", self.rust_type(elem, &format!("{hint}Item")))
            }
            AttributeType::Map(k, v) => {
                let key = match self.model.resolve(k).as_primitive() {
                    Some(p)
                        if !matches!(p, Primitive::Float32 | Primitive::Float64 | Primitive::Any) =>
                    {
                        primitive_type(p).to_string()
                    }
                    _ => "String".to_string(),
                };
                let value = self.rust_type(v, &format!("{hint}Value"));
                format!("std::collections::BTreeMap<{key}, {value}>")
            }
            AttributeType::Object(fields) => {
                let name = self.unique(&type_ident(hint));
                self.define_struct(name.clone(), None, fields);
                name
            }
            AttributeType::User(id) => {
                if let Some((_, name)) = self.users.iter().find(|(i, _)| *i == id.index()) {
                    return name.clone();
                }
                let user = self.model.user_type(*id);
                let name = self.unique(&type_ident(&user.name));
                self.users.push((id.index(), name.clone()));
                match &user.attribute.ty {
                    AttributeType::Object(fields) => {
                        let description = user.attribute.description.clone();
                        self.define_struct(name.clone(), description, fields);
                    }
                    other => {
                        let slot = self.defs.len();
                        self.defs.push(TypeDef {
                            name: name.clone(),
                            description: user.attribute.description.clone(),
                            alias: Some(String::new()),
                            fields: Vec::new(),
                        });
                        let target = self.rust_type(other, &format!("{name}Inner"));
                        self.defs[slot].alias = Some(target);
                    }
                }
                name
            }
        }
    }

    fn define_struct(&mut self, name: String, description: Option<String>, fields: &[Field]) {
        // reserve the slot first so definitions read outside-in
        let slot = self.defs.len();
        self.defs.push(TypeDef {
            name: name.clone(),
            description,
            alias: None,
            fields: Vec::new(),
        });
        let defs: Vec<FieldDef> = fields
            .iter()
            .map(|f| FieldDef {
                name: fn_ident(&f.name),
                wire_name: f.name.clone(),
                ty: self.rust_type(&f.attribute.ty, &format!("{name}_{}", f.name)),
                optional: !f.required,
                description: f.attribute.description.clone(),
                model_ty: f.attribute.ty.clone(),
                validation: f.attribute.validation.clone(),
            })
            .collect();
        self.defs[slot].fields = defs;
    }

    /// Reserve a name for an item defined outside the registry.
    pub fn reserve(&mut self, base: &str) -> String {
        self.unique(base)
    }

    /// Fields of the struct named `rust_name`, following aliases.
    #[must_use]
    pub fn fields_of(&self, rust_name: &str) -> Option<&[FieldDef]> {
        let mut name = rust_name;
        for _ in 0..32 {
            let def = self.defs.iter().find(|d| d.name == name)?;
            match &def.alias {
                None => return Some(&def.fields),
                Some(target) => name = target,
            }
        }
        None
    }
}
