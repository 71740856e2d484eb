//! # Generator Module
//!
//! Renders the artifacts of one generation pass from the parameter model.
//!
//! ## Overview
//!
//! For every IDL file with routed RPCs the pass produces:
//! - **Handler source** (`<stem>_http.rs`) - a handler trait per service, a
//!   private controller with one binder per RPC, and a
//!   `register_<service>_http_server` function wiring verbs and paths
//! - **OpenAPI document** (`<stem>.openapi.yaml`, `<stem>.openapi.json`)
//! - **Permission map** (`<stem>.permissions.json`)
//!
//! ## Architecture
//!
//! ```text
//! Descriptor bundle → SchemaGraph → ServerSpecs (parameter trees)
//!                                      ├→ handlers (askama template)
//!                                      ├→ openapi (YAML value tree → YAML → JSON)
//!                                      └→ permissions
//! ```
//!
//! Both the handler source and the document are rendered from the same
//! [`ServerSpec`](crate::model::ServerSpec)s, so a path or query binding in
//! the code always has a matching parameter in the document.
//!
//! Every pass runs in memory; [`write_outputs`] is only called once every
//! file of the bundle has generated successfully.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use protoroute::config::GeneratorConfig;
//! use protoroute::descriptor::load_bundle;
//! use protoroute::generator::{generate_bundle, write_outputs};
//!
//! let bundle = load_bundle("widgets.yaml".as_ref())?;
//! let files = generate_bundle(&bundle, &GeneratorConfig::default())?;
//! write_outputs("gen".as_ref(), &files, false)?;
//! ```
//!
//! The handler template lives in `templates/http_server.rs.txt`.

mod handlers;
mod naming;
mod openapi;
mod pass;
mod permissions;
mod templates;

pub use handlers::{binding_statement, parser_expr, render_handlers, BindingSource};
pub use naming::*;
pub use openapi::{
    build_document, component_name, emit_message_schema, emit_parameter_schema, render_openapi,
    quote_timestamps, schema_ref, strip_nulls, tag_fragment, yaml_to_json, OpenApiDocument,
    SchemaRegistry, OPENAPI_VERSION,
};
pub use pass::{
    generate_bundle, generate_file, output_stem, write_outputs, ArtifactKind, GeneratedFile,
    WriteSummary,
};
pub use permissions::{build_permission_map, render_permissions, Permission, PermissionMap};
pub use templates::*;
