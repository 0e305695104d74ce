//! # Code Generator
//!
//! Renders Rust sources from a [`Resolution`]. Every resolved service gets a
//! module:
//!
//! ```text
//! gen/
//! ├── mod.rs              # one `pub mod` per service
//! └── <service>/
//!     ├── mod.rs
//!     ├── types.rs        # payload, result and error types
//!     ├── paths.rs        # `{method}_{service}_path[N]` builders
//!     ├── server.rs       # decoders, encoders, service trait, mounts
//!     └── client.rs       # request builders and response decoders
//! ```
//!
//! Generated code links against the runtime (`httpbind::runtime` unless
//! configured otherwise). Module skeletons are askama templates under
//! `templates/`; function bodies are assembled here.
//!
//! Methods that failed resolution are skipped; nothing is emitted for them.

mod names;
mod paths;
mod request;
mod response;
mod rust_types;
mod service;
mod templates;
mod validate;

pub use names::{
    fn_ident, path_fn_name, sanitize_identifier, to_camel_case, to_snake_case, type_ident,
};
pub use paths::PathFn;
pub use rust_types::{primitive_type, FieldDef, TypeDef, TypeRegistry};

use crate::binding::{EndpointBinding, ErrorBinding, ErrorScope, Resolution};
use crate::model::{AttributeType, Method, Primitive, Service, ServiceModel};
use askama::Template;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A file produced by generation. Writing it is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the output directory.
    pub path: PathBuf,
    pub contents: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Path generated code imports the runtime from.
    pub runtime_crate: String,
    /// Directory (relative to the output) holding the generated modules.
    pub module_dir: String,
    pub emit_server: bool,
    pub emit_client: bool,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            runtime_crate: "httpbind::runtime".to_string(),
            module_dir: "gen".to_string(),
            emit_server: true,
            emit_client: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    #[error("template rendering failed: {0}")]
    Template(#[from] askama::Error),
}

/// Source text being assembled, with indentation.
pub(crate) struct Code {
    out: String,
    indent: usize,
}

impl Code {
    pub(crate) fn new(indent: usize) -> Self {
        Self {
            out: String::new(),
            indent,
        }
    }

    pub(crate) fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            self.out.push('\n');
            return;
        }
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    pub(crate) fn open(&mut self, text: impl AsRef<str>) {
        self.line(text);
        self.indent += 1;
    }

    pub(crate) fn close(&mut self, text: impl AsRef<str>) {
        self.indent = self.indent.saturating_sub(1);
        self.line(text);
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }
}

/// Rust string literal for `s`.
pub(crate) fn rust_str(s: &str) -> String {
    format!("{s:?}")
}

/// `Some(lit)` / `None` for an optional string.
pub(crate) fn rust_opt_str(s: Option<&str>) -> String {
    s.map_or_else(|| "None".to_string(), |s| format!("Some({})", rust_str(s)))
}

/// Primitive of a scalar-like type and whether it is an array of it.
pub(crate) fn scalar_info(model: &ServiceModel, ty: &AttributeType) -> Option<(Primitive, bool)> {
    match model.resolve(ty) {
        AttributeType::Primitive(p) => Some((*p, false)),
        AttributeType::Array(elem) => model.resolve(elem).as_primitive().map(|p| (p, true)),
        _ => None,
    }
}

/// A declared error as seen by one method.
pub(crate) struct ErrorCtx<'a> {
    pub binding: &'a ErrorBinding,
    pub variant: String,
    pub ty: String,
    pub fields: Vec<FieldDef>,
}

/// Generated names and types of one method.
pub(crate) struct MethodCtx<'a> {
    pub ep: &'a EndpointBinding,
    pub method: &'a Method,
    pub ident: String,
    pub payload_ty: String,
    pub payload_fields: Vec<FieldDef>,
    pub result_ty: String,
    pub result_fields: Vec<FieldDef>,
    pub error_enum: String,
    pub errors: Vec<ErrorCtx<'a>>,
}

impl MethodCtx<'_> {
    pub(crate) fn payload_field(&self, attribute: &str) -> Option<&FieldDef> {
        self.payload_fields.iter().find(|f| f.wire_name == attribute)
    }

    pub(crate) fn result_field(&self, attribute: &str) -> Option<&FieldDef> {
        self.result_fields.iter().find(|f| f.wire_name == attribute)
    }

    pub(crate) fn has_payload(&self) -> bool {
        self.payload_ty != "()"
    }

    pub(crate) fn has_result(&self) -> bool {
        self.result_ty != "()"
    }
}

/// Types and per-method context of one service.
pub(crate) struct ServiceCtx<'a> {
    pub model: &'a ServiceModel,
    pub service: &'a Service,
    pub module: String,
    pub methods: Vec<MethodCtx<'a>>,
    pub types: Vec<TypeDef>,
    pub runtime: String,
}

impl<'a> ServiceCtx<'a> {
    fn new(
        model: &'a ServiceModel,
        resolution: &'a Resolution,
        service: &'a Service,
        options: &CodegenOptions,
    ) -> Self {
        let mut registry = TypeRegistry::new(model);
        let mut error_types: BTreeMap<(String, String, String), String> = BTreeMap::new();
        let mut methods = Vec::new();
        for ep in resolution.endpoints_of(service.id) {
            let method = model.method(ep.method);
            let camel = type_ident(&method.name);
            let payload_ty = registry.rust_type(&ep.payload_type, &format!("{camel}Payload"));
            let payload_fields = registry
                .fields_of(&payload_ty)
                .map(<[FieldDef]>::to_vec)
                .unwrap_or_default();
            let result_ty = registry.rust_type(&ep.result_type, &format!("{camel}Result"));
            let result_fields = registry
                .fields_of(&result_ty)
                .map(<[FieldDef]>::to_vec)
                .unwrap_or_default();
            let error_enum = registry.reserve(&format!("{camel}Error"));
            let errors = ep
                .errors
                .iter()
                .map(|binding| {
                    let variant = type_ident(&binding.name);
                    // api and service errors are shared by every method inheriting them
                    let owner = match binding.scope {
                        ErrorScope::Method => method.name.as_str(),
                        ErrorScope::Service | ErrorScope::Api => "",
                    };
                    let key = (binding.scope.to_string(), owner.to_string(), binding.name.clone());
                    let ty = error_types
                        .entry(key)
                        .or_insert_with(|| {
                            registry.rust_type(&binding.ty, &format!("{variant}Error"))
                        })
                        .clone();
                    let fields =
                        registry.fields_of(&ty).map(<[FieldDef]>::to_vec).unwrap_or_default();
                    ErrorCtx {
                        binding,
                        variant,
                        ty,
                        fields,
                    }
                })
                .collect();
            methods.push(MethodCtx {
                ep,
                method,
                ident: fn_ident(&method.name),
                payload_ty,
                payload_fields,
                result_ty,
                result_fields,
                error_enum,
                errors,
            });
        }
        Self {
            model,
            service,
            module: fn_ident(&service.name),
            methods,
            types: registry.into_defs(),
            runtime: options.runtime_crate.clone(),
        }
    }
}

/// Generate the Rust modules for every service with at least one resolved
/// endpoint or static mount.
///
/// # Errors
///
/// Fails only when a template cannot be rendered.
pub fn generate(
    model: &ServiceModel,
    resolution: &Resolution,
    options: &CodegenOptions,
) -> Result<Vec<GeneratedFile>, CodegenError> {
    let root = Path::new(&options.module_dir);
    let mut files = Vec::new();
    let mut modules = Vec::new();
    for service in model.services() {
        let has_mounts = resolution.mounts_of(service.id).next().is_some();
        if resolution.endpoints_of(service.id).next().is_none() && !has_mounts {
            debug!(service = %service.name, "no resolved endpoints, skipping");
            continue;
        }
        let ctx = ServiceCtx::new(model, resolution, service, options);
        let dir = root.join(&ctx.module);
        let mut submodules = vec!["types".to_string(), "paths".to_string()];
        files.push(GeneratedFile::new(dir.join("types.rs"), templates::render_types(&ctx)?));
        files.push(GeneratedFile::new(dir.join("paths.rs"), templates::render_paths(&ctx)?));
        if options.emit_server {
            files.push(GeneratedFile::new(
                dir.join("server.rs"),
                templates::render_server(&ctx, resolution)?,
            ));
            submodules.push("server".to_string());
        }
        if options.emit_client {
            files.push(GeneratedFile::new(dir.join("client.rs"), templates::render_client(&ctx)?));
            submodules.push("client".to_string());
        }
        files.push(GeneratedFile::new(
            dir.join("mod.rs"),
            templates::ModRsTemplate {
                doc: service
                    .description
                    .clone()
                    .unwrap_or_else(|| format!("HTTP transport of the {} service.", service.name)),
                modules: submodules,
            }
            .render()?,
        ));
        info!(service = %service.name, methods = ctx.methods.len(), "generated service module");
        modules.push(ctx.module);
    }
    files.push(GeneratedFile::new(
        root.join("mod.rs"),
        templates::ModRsTemplate {
            doc: format!("Generated HTTP transport for {}.", model.api.name),
            modules,
        }
        .render()?,
    ));
    Ok(files)
}
