//! Route/handler emitter.
//!
//! Flattens every RPC's parameter tree into binding statements and renders
//! them with the handler source template. Assignment order follows the tree:
//! query values first (verbs without a body), then path values, so a path
//! value always wins over anything decoded from the body.

use super::naming::{
    assignment_target, controller_name, enum_table_name, method_ident, register_fn_name,
    rust_type_path, trait_name,
};
use super::templates::{EnumTableView, EnumValueView, HttpServerTemplate, MethodView, ServiceView};
use crate::config::GeneratorConfig;
use crate::descriptor::{FileDescriptor, MethodDescriptor, SchemaGraph};
use crate::error::GenerateResult;
use crate::model::{Parameter, RpcPathSpec, ServerSpec, TypeTag};
use askama::Template;
use heck::ToSnakeCase;
use tracing::debug;

/// Where a binder reads a raw value from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingSource {
    Query,
    Path,
}

impl BindingSource {
    fn accessor(self) -> &'static str {
        match self {
            BindingSource::Query => "req.query()",
            BindingSource::Path => "req.path_params()",
        }
    }
}

/// Parser expression of a bindable tag; `None` for body-only tags
#[must_use]
pub fn parser_expr(tag: &TypeTag, graph: &SchemaGraph<'_>) -> Option<String> {
    let parser = match tag {
        TypeTag::Int32 => "rt::parse::int32",
        TypeTag::UInt32 => "rt::parse::uint32",
        TypeTag::Int64 => "rt::parse::int64",
        TypeTag::UInt64 => "rt::parse::uint64",
        TypeTag::Float32 => "rt::parse::float32",
        TypeTag::Float64 => "rt::parse::float64",
        TypeTag::Bytes => "rt::parse::bytes",
        TypeTag::String => "rt::parse::string",
        TypeTag::Bool => "rt::parse::boolean",
        TypeTag::Time => "rt::parse::timestamp",
        TypeTag::Enum(name) => {
            return Some(format!(
                "|v: &str| rt::parse::enumeration({}, v)",
                enum_table_name(graph, name)
            ))
        }
        TypeTag::Any | TypeTag::AnySlice | TypeTag::Struct(_) => return None,
    };
    Some(parser.to_string())
}

/// Statement binding one leaf from `source` into `body`.
///
/// Lists collect every query value; optional leaves assign `None` when
/// absent; required timestamps are wrapped in `Some` since message-typed
/// fields are optional in generated types.
#[must_use]
pub fn binding_statement(
    leaf: &Parameter<'_>,
    source: BindingSource,
    graph: &SchemaGraph<'_>,
) -> Option<String> {
    let tag = leaf.tag.as_ref()?;
    let parser = parser_expr(tag, graph)?;
    let target = assignment_target("body", &leaf.full_path);
    let key = format!("{:?}", leaf.requested_key);
    let from = source.accessor();
    let statement = if leaf.is_list {
        format!("{target} = {from}.list({key}, {parser})?;")
    } else if leaf.is_optional {
        format!("{target} = {from}.optional({key}, {parser})?;")
    } else if *tag == TypeTag::Time {
        format!("{target} = Some({from}.required({key}, {parser})?);")
    } else {
        format!("{target} = {from}.required({key}, {parser})?;")
    };
    Some(statement)
}

fn doc_lines(method: &MethodDescriptor) -> Vec<String> {
    [&method.leading_comments, &method.trailing_comments]
        .into_iter()
        .flatten()
        .flat_map(|c| c.trim_end().lines().map(str::to_string).collect::<Vec<_>>())
        .map(|line| {
            let line = line.trim_end();
            if line.is_empty() || line.starts_with(' ') {
                line.to_string()
            } else {
                format!(" {line}")
            }
        })
        .collect()
}

fn method_view(rpc: &RpcPathSpec<'_>, graph: &SchemaGraph<'_>, config: &GeneratorConfig) -> MethodView {
    let query_bindings = rpc
        .query_leaves()
        .filter_map(|leaf| binding_statement(leaf, BindingSource::Query, graph))
        .collect();
    let path_bindings = rpc
        .path_leaves()
        .filter_map(|leaf| binding_statement(leaf, BindingSource::Path, graph))
        .collect();
    MethodView {
        name: method_ident(&rpc.method.name),
        binder_name: format!("bind_{}", rpc.method.name.to_snake_case()),
        input_type: rust_type_path(graph, &rpc.input.full_name, &config.types_path),
        output_type: rust_type_path(graph, &rpc.output.full_name, &config.types_path),
        docs: doc_lines(rpc.method),
        verb: rpc.verb.as_str().to_string(),
        path: rpc.path.clone(),
        path_literal: format!("{:?}", rpc.path),
        has_body: rpc.has_body(),
        query_bindings,
        path_bindings,
    }
}

fn enum_tables(servers: &[ServerSpec<'_>], graph: &SchemaGraph<'_>) -> Vec<EnumTableView> {
    let mut tables: Vec<EnumTableView> = Vec::new();
    for en in servers.iter().flat_map(|s| s.rpcs.iter()).flat_map(|r| r.enums.iter()) {
        if tables.iter().any(|t| t.full_name == en.full_name) {
            continue;
        }
        tables.push(EnumTableView {
            full_name: en.full_name.clone(),
            const_name: enum_table_name(graph, &en.full_name),
            values: en
                .values
                .iter()
                .map(|v| EnumValueView {
                    name: v.name.clone(),
                    number: v.number,
                })
                .collect(),
        });
    }
    tables
}

/// Render the handler source of one IDL file
pub fn render_handlers(
    file: &FileDescriptor,
    servers: &[ServerSpec<'_>],
    graph: &SchemaGraph<'_>,
    config: &GeneratorConfig,
) -> GenerateResult<String> {
    let services: Vec<ServiceView> = servers
        .iter()
        .map(|server| {
            let full_name = if file.package.is_empty() {
                server.service.name.clone()
            } else {
                format!("{}.{}", file.package, server.service.name)
            };
            ServiceView {
                full_name,
                trait_name: trait_name(&server.service.name),
                controller_name: controller_name(&server.service.name),
                register_fn: register_fn_name(&server.service.name),
                methods: server
                    .rpcs
                    .iter()
                    .map(|rpc| method_view(rpc, graph, config))
                    .collect(),
            }
        })
        .collect();

    let template = HttpServerTemplate {
        source: file.name.clone(),
        package: file.package.clone(),
        runtime_path: config.runtime_path.clone(),
        enums: enum_tables(servers, graph),
        services,
    };
    let rendered = template.render()?;
    debug!(
        file = %file.name,
        services = servers.len(),
        bytes = rendered.len(),
        "Rendered handler source"
    );
    Ok(rendered)
}
