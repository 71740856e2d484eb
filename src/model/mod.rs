//! # Parameter Model
//!
//! The shared model both renderers consume. [`classify`] maps a field to a
//! [`TypeTag`] or marks it as a nested message; [`ParameterTreeBuilder`] walks
//! an input message into a tree of [`Parameter`] nodes, marking the leaves
//! bound to URL placeholders; [`build_server_specs`] assembles one
//! [`RpcPathSpec`] per routed RPC and rejects every misconfigured annotation
//! before any output is rendered.
//!
//! The handler emitter and the document emitter never look at the raw fields
//! of an input message for binding purposes, only at these trees, so the two
//! artifacts cannot disagree on which value comes from where.

mod classify;
mod parameter;
mod spec;

pub use classify::{classify, Classification, TypeTag};
pub use parameter::{
    build_parameters, count_path_parameters, leaves, Parameter, ParameterTreeBuilder,
};
pub use spec::{build_server_specs, template_placeholders, verb_has_body, RpcPathSpec, ServerSpec};
