use askama::Template;

/// One value row of an enum table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValueView {
    pub name: String,
    pub number: i32,
}

/// Name→ordinal table emitted for an enum bound from path or query text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumTableView {
    pub full_name: String,
    pub const_name: String,
    pub values: Vec<EnumValueView>,
}

/// Template data of one routed RPC
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodView {
    /// Trait method name
    pub name: String,
    /// Controller binder method name
    pub binder_name: String,
    pub input_type: String,
    pub output_type: String,
    /// Doc comment lines (each either empty or starting with a space)
    pub docs: Vec<String>,
    /// Upper-case verb, also the `Method` constant name
    pub verb: String,
    pub path: String,
    /// `path` as a Rust string literal
    pub path_literal: String,
    pub has_body: bool,
    /// Statements binding query values (verbs without a body only)
    pub query_bindings: Vec<String>,
    /// Statements binding path values
    pub path_bindings: Vec<String>,
}

/// Template data of one service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceView {
    pub full_name: String,
    pub trait_name: String,
    pub controller_name: String,
    pub register_fn: String,
    pub methods: Vec<MethodView>,
}

/// Handler source of one IDL file
#[derive(Template)]
#[template(path = "http_server.rs.txt", escape = "none")]
pub struct HttpServerTemplate {
    /// IDL file name
    pub source: String,
    pub package: String,
    /// Rust path of the runtime support module
    pub runtime_path: String,
    pub enums: Vec<EnumTableView>,
    pub services: Vec<ServiceView>,
}
