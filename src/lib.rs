//! # protoroute
//!
//! **protoroute** turns compiled protobuf service descriptors into an HTTP
//! surface: Rust handler source that binds path, query and body values into
//! typed request messages, an OpenAPI 3 document (YAML and JSON) describing the
//! same routes, and a permission map of the roles and features each RPC
//! requires.
//!
//! ## Overview
//!
//! Generation is schema-driven. Every RPC carrying a routing annotation is
//! analysed once into a parameter tree; the handler emitter and the document
//! emitter both read that tree, so the binding code and the published schema
//! cannot disagree about which field comes from where.
//!
//! ## Architecture
//!
//! - **[`descriptor`]** - Descriptor bundle model, loading and the schema graph index
//! - **[`model`]** - Field classification, parameter trees and per-RPC route specs
//! - **[`generator`]** - Handler, OpenAPI and permission map emitters; the per-file pass
//! - **[`runtime`]** - Support library the emitted handler source links against
//! - **[`config`]** - `protoroute.toml` generator configuration
//! - **[`logging`]** - `tracing` subscriber setup for the binary
//! - **[`cli`]** - `protoroute-gen` command-line interface
//!
//! ### Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant User
//!     participant CLI as CLI<br/>(protoroute-gen)
//!     participant Load as descriptor::load_bundle
//!     participant Model as model::build_server_specs
//!     participant Handlers as generator::handlers
//!     participant OpenApi as generator::openapi
//!     participant Perms as generator::permissions
//!     participant FS as File System
//!
//!     User->>CLI: protoroute-gen generate --bundle api.yaml --output gen/
//!     CLI->>Load: load_bundle("api.yaml")
//!     Load-->>CLI: DescriptorBundle
//!     loop every file with routed RPCs
//!         CLI->>Model: build_server_specs(file, graph)
//!         Model->>Model: classify fields, build parameter trees,<br/>check path templates
//!         Model-->>CLI: Vec<ServerSpec>
//!         CLI->>Handlers: render_handlers (askama)
//!         CLI->>OpenApi: render_openapi (YAML, then JSON)
//!         CLI->>Perms: render_permissions
//!     end
//!     CLI->>FS: write_outputs (only after every pass succeeded)
//! ```
//!
//! ### Request Binding Flow
//!
//! The emitted source registers one binder per RPC on an
//! [`runtime::HttpRouter`]. A binder decodes the JSON body (verbs other than
//! GET/DELETE) or binds query values (GET/DELETE), then binds path values,
//! calls the service and serialises its output:
//!
//! ```rust,ignore
//! let mut table = protoroute::runtime::RouteTable::new();
//! widgets_http::register_widget_service_http_server(&mut table, Arc::new(MyWidgets));
//! let response = table.dispatch(&request);
//! ```
//!
//! Missing or unparsable parameters answer 400 with a problem body:
//!
//! ```json
//! {"code": 400, "message": "MissingRequiredParametersError", "detail": "missing field(s): id"}
//! ```
//!
//! ## Code Generation
//!
//! ```bash
//! cargo run --bin protoroute-gen -- generate --bundle widgets.yaml --output src/gen
//! ```
//!
//! For a file `widgets/v1/widgets.proto` this writes
//! `widgets_v1_widgets_http.rs`, `widgets_v1_widgets.openapi.yaml`,
//! `widgets_v1_widgets.openapi.json` and `widgets_v1_widgets.permissions.json`.

pub mod cli;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod generator;
pub mod logging;
pub mod model;
pub mod runtime;

pub use error::{GenerateError, GenerateResult};
