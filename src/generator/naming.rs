//! Identifier mapping from IDL names to emitted Rust names.
//!
//! Message and enum names follow the layout prost gives generated types:
//! nested definitions live in a snake_case module named after their parent.

use crate::descriptor::SchemaGraph;
use heck::{ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};

const KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "else", "enum", "extern", "false", "fn", "for", "if",
    "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "static",
    "struct", "trait", "true", "type", "unsafe", "use", "where", "while", "async", "await", "dyn",
    "abstract", "become", "box", "do", "final", "macro", "override", "priv", "typeof", "unsized",
    "virtual", "yield", "try", "gen",
];

/// Names that cannot be raw identifiers get a trailing underscore instead
const NON_RAW: &[&str] = &["self", "Self", "super", "crate"];

/// Make `name` usable as a Rust identifier.
///
/// ```rust
/// use protoroute::generator::sanitize_ident;
/// assert_eq!(sanitize_ident("type"), "r#type");
/// assert_eq!(sanitize_ident("self"), "self_");
/// assert_eq!(sanitize_ident("name"), "name");
/// ```
#[must_use]
pub fn sanitize_ident(name: &str) -> String {
    if NON_RAW.contains(&name) {
        format!("{name}_")
    } else if KEYWORDS.contains(&name) {
        format!("r#{name}")
    } else {
        name.to_string()
    }
}

/// Struct field of a generated message type
#[must_use]
pub fn field_ident(name: &str) -> String {
    sanitize_ident(&name.to_snake_case())
}

/// Trait/controller method of an RPC
#[must_use]
pub fn method_ident(rpc: &str) -> String {
    sanitize_ident(&rpc.to_snake_case())
}

#[must_use]
pub fn trait_name(service: &str) -> String {
    format!("{}HttpServer", service.to_upper_camel_case())
}

#[must_use]
pub fn controller_name(service: &str) -> String {
    format!("{}Controller", service.to_upper_camel_case())
}

#[must_use]
pub fn register_fn_name(service: &str) -> String {
    format!("register_{}_http_server", service.to_snake_case())
}

/// Name→ordinal table constant of an enum (`WIDGET_COLOR_VALUES`)
#[must_use]
pub fn enum_table_name(graph: &SchemaGraph<'_>, full_name: &str) -> String {
    let relative = graph.relative_name(full_name).replace('.', "_");
    format!("{}_VALUES", relative.to_shouty_snake_case())
}

/// Rust path of a message type relative to `types_path`.
///
/// `Outer.Inner` becomes `outer::Inner`; an empty `types_path` yields a path
/// relative to the current module.
#[must_use]
pub fn rust_type_path(graph: &SchemaGraph<'_>, full_name: &str, types_path: &str) -> String {
    let relative = graph.relative_name(full_name);
    let mut parts: Vec<String> = relative.split('.').map(str::to_string).collect();
    let last = parts.pop().unwrap_or_default();
    let mut segments: Vec<String> = Vec::with_capacity(parts.len() + 2);
    if !types_path.is_empty() {
        segments.push(types_path.to_string());
    }
    segments.extend(parts.iter().map(|p| sanitize_ident(&p.to_snake_case())));
    segments.push(sanitize_ident(&last.to_upper_camel_case()));
    segments.join("::")
}

/// Assignment target of a structural key (`filter.owner_id`) on `root`.
///
/// Intermediate messages are `Option`s in prost output and get materialised
/// on first assignment.
#[must_use]
pub fn assignment_target(root: &str, full_path: &str) -> String {
    let mut target = root.to_string();
    let mut segments = full_path.split('.').peekable();
    while let Some(segment) = segments.next() {
        target.push('.');
        target.push_str(&field_ident(segment));
        if segments.peek().is_some() {
            target.push_str(".get_or_insert_with(Default::default)");
        }
    }
    target
}
