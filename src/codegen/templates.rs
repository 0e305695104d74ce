use askama::Template;

use super::paths::path_functions;
use super::request::{render_body_struct, render_builder, render_decoder};
use super::response::{
    render_error_encoder, render_error_enum, render_response_decoder, render_result_encoder,
};
use super::service::{render_handle, render_mounts, render_trait};
use super::validate::render_validate_impl;
use super::{rust_str, ServiceCtx, TypeDef};
use crate::binding::Resolution;

/// Module declarations (`gen/mod.rs` and `gen/<service>/mod.rs`).
#[derive(Template)]
#[template(path = "mod.rs.txt", escape = "none")]
pub struct ModRsTemplate {
    /// Module documentation
    pub doc: String,
    /// Submodules to declare
    pub modules: Vec<String>,
}

/// A struct field as the types template prints it.
#[derive(Debug, Clone)]
pub struct FieldView {
    pub name: String,
    pub ty: String,
    pub docs: Vec<String>,
    /// Wire name literal, empty when it equals the field name
    pub rename: String,
    pub optional: bool,
}

/// A generated struct or alias.
#[derive(Debug, Clone)]
pub struct TypeView {
    pub name: String,
    pub docs: Vec<String>,
    pub is_alias: bool,
    pub target: String,
    pub fields: Vec<FieldView>,
}

#[derive(Template)]
#[template(path = "types.rs.txt", escape = "none")]
pub struct TypesTemplate {
    pub runtime: String,
    pub service: String,
    pub types: Vec<TypeView>,
    /// `validate` impls and error enums, already rendered
    pub blocks: Vec<String>,
}

#[derive(Template)]
#[template(path = "paths.rs.txt", escape = "none")]
pub struct PathsTemplate {
    pub runtime: String,
    pub service: String,
    pub blocks: Vec<String>,
}

#[derive(Template)]
#[template(path = "server.rs.txt", escape = "none")]
pub struct ServerTemplate {
    pub runtime: String,
    pub service: String,
    pub blocks: Vec<String>,
}

#[derive(Template)]
#[template(path = "client.rs.txt", escape = "none")]
pub struct ClientTemplate {
    pub runtime: String,
    pub service: String,
    pub blocks: Vec<String>,
}

fn doc_lines(text: Option<&str>) -> Vec<String> {
    text.map(|t| t.lines().map(|l| l.trim_end().to_string()).collect())
        .unwrap_or_default()
}

fn type_view(def: &TypeDef) -> TypeView {
    TypeView {
        name: def.name.clone(),
        docs: doc_lines(def.description.as_deref()),
        is_alias: def.alias.is_some(),
        target: def.alias.clone().unwrap_or_default(),
        fields: def
            .fields
            .iter()
            .map(|f| FieldView {
                name: f.name.clone(),
                ty: f.full_type(),
                docs: doc_lines(f.description.as_deref()),
                rename: if f.needs_rename() { rust_str(&f.wire_name) } else { String::new() },
                optional: f.optional,
            })
            .collect(),
    }
}

pub(crate) fn render_types(ctx: &ServiceCtx<'_>) -> askama::Result<String> {
    let mut blocks: Vec<String> = ctx
        .types
        .iter()
        .filter_map(|def| render_validate_impl(ctx.model, def))
        .collect();
    blocks.extend(ctx.methods.iter().map(render_error_enum));
    TypesTemplate {
        runtime: ctx.runtime.clone(),
        service: ctx.service.name.clone(),
        types: ctx.types.iter().map(type_view).collect(),
        blocks,
    }
    .render()
}

pub(crate) fn render_paths(ctx: &ServiceCtx<'_>) -> askama::Result<String> {
    let blocks = ctx
        .methods
        .iter()
        .flat_map(|m| path_functions(ctx.model, m))
        .map(|f| f.render())
        .collect();
    PathsTemplate {
        runtime: ctx.runtime.clone(),
        service: ctx.service.name.clone(),
        blocks,
    }
    .render()
}

pub(crate) fn render_server(
    ctx: &ServiceCtx<'_>,
    resolution: &Resolution,
) -> askama::Result<String> {
    let mut blocks = vec![render_trait(ctx)];
    for m in &ctx.methods {
        blocks.extend(render_body_struct(m));
        blocks.push(render_decoder(ctx.model, m));
        blocks.push(render_result_encoder(ctx.model, m));
        blocks.push(render_error_encoder(ctx.model, m));
    }
    blocks.push(render_handle(ctx));
    blocks.push(render_mounts(ctx, resolution));
    ServerTemplate {
        runtime: ctx.runtime.clone(),
        service: ctx.service.name.clone(),
        blocks,
    }
    .render()
}

pub(crate) fn render_client(ctx: &ServiceCtx<'_>) -> askama::Result<String> {
    let mut blocks = Vec::new();
    for m in &ctx.methods {
        if m.ep.routes.is_empty() {
            continue;
        }
        blocks.extend(render_body_struct(m));
        blocks.push(render_builder(ctx.model, m));
        blocks.push(render_response_decoder(ctx.model, m));
    }
    ClientTemplate {
        runtime: ctx.runtime.clone(),
        service: ctx.service.name.clone(),
        blocks,
    }
    .render()
}
