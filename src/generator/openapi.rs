//! OpenAPI schema emitter.
//!
//! The document is assembled as an ordered `serde_yaml` value tree from the
//! same [`RpcPathSpec`]s the handler emitter consumes. Component schemas go
//! through one [`SchemaRegistry`] per document: a name is reserved before its
//! properties are rendered, so shared and self-referential messages produce
//! exactly one entry each. The JSON artifact is produced from the YAML *text*,
//! parsed back generically.

use crate::config::GeneratorConfig;
use crate::descriptor::{FieldDescriptor, FileDescriptor, MessageDescriptor, SchemaGraph};
use crate::error::{GenerateError, GenerateResult};
use crate::model::{classify, leaves, Classification, Parameter, RpcPathSpec, ServerSpec, TypeTag};
use heck::ToUpperCamelCase;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use tracing::debug;

/// OpenAPI version written to every document
pub const OPENAPI_VERSION: &str = "3.0.3";

const JSON_MEDIA_TYPE: &str = "application/json";
const TIME_EXAMPLE: &str = "2017-07-21T17:32:28Z";

/// Name-keyed accumulator of `components/schemas`, scoped to one document.
///
/// Every name remembers the shape that claimed it; a second, different shape
/// asking for the same name is a [`GenerateError::SchemaNameCollision`].
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: Mapping,
    owners: HashMap<String, String>,
}

impl SchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Claim `name` for the shape described by `owner`.
    ///
    /// Answers `false` when the same shape already holds the name (emitted or
    /// being emitted). The placeholder keeps the entry at the position of its
    /// first claim.
    fn reserve(&mut self, name: &str, owner: String) -> GenerateResult<bool> {
        if let Some(first) = self.owners.get(name) {
            if *first == owner {
                return Ok(false);
            }
            return Err(GenerateError::SchemaNameCollision {
                name: name.to_string(),
                first: first.clone(),
                second: owner,
            });
        }
        self.owners.insert(name.to_string(), owner);
        self.schemas.insert(Value::from(name), Value::Null);
        Ok(true)
    }

    fn define(&mut self, name: &str, schema: Value) {
        self.schemas.insert(Value::from(name), schema);
    }

    /// Schema registered under `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    #[must_use]
    pub fn into_mapping(self) -> Mapping {
        self.schemas
    }
}

/// Rendered YAML and JSON forms of one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenApiDocument {
    pub yaml: String,
    pub json: String,
    pub schema_count: usize,
}

fn object<'k>(entries: impl IntoIterator<Item = (&'k str, Value)>) -> Value {
    Value::Mapping(
        entries
            .into_iter()
            .map(|(k, v)| (Value::from(k), v))
            .collect(),
    )
}

fn text_or_null(s: &str) -> Value {
    if s.is_empty() {
        Value::Null
    } else {
        Value::from(s)
    }
}

/// Component name of a message (`Outer_Inner` for nested messages)
#[must_use]
pub fn component_name(graph: &SchemaGraph<'_>, full_name: &str) -> String {
    graph.relative_name(full_name).replace('.', "_")
}

/// `$ref` object pointing at a component
#[must_use]
pub fn schema_ref(name: &str) -> Value {
    object([("$ref", Value::from(format!("#/components/schemas/{name}")))])
}

/// Schema fragment of a tag.
///
/// `Struct` tags register the referenced message component and answer a
/// `$ref` to it.
pub fn tag_fragment(
    tag: &TypeTag,
    graph: &SchemaGraph<'_>,
    registry: &mut SchemaRegistry,
) -> GenerateResult<Value> {
    let fragment = match tag {
        TypeTag::Int32 | TypeTag::UInt32 => object([
            ("type", Value::from("integer")),
            ("format", Value::from("int32")),
            ("example", Value::from(1)),
        ]),
        TypeTag::Int64 | TypeTag::UInt64 => object([
            ("type", Value::from("integer")),
            ("format", Value::from("int64")),
            ("example", Value::from(1)),
        ]),
        TypeTag::Float32 => object([
            ("type", Value::from("number")),
            ("format", Value::from("float")),
            ("example", Value::from(1.0)),
        ]),
        TypeTag::Float64 => object([
            ("type", Value::from("number")),
            ("format", Value::from("double")),
            ("example", Value::from(1.0)),
        ]),
        TypeTag::Bytes => object([
            ("type", Value::from("string")),
            ("format", Value::from("byte")),
            ("example", Value::from("sample")),
        ]),
        TypeTag::String => object([
            ("type", Value::from("string")),
            ("example", Value::from("sample")),
        ]),
        TypeTag::Bool => object([
            ("type", Value::from("boolean")),
            ("example", Value::from(false)),
        ]),
        TypeTag::Time => object([
            ("type", Value::from("string")),
            ("format", Value::from("date-time")),
            ("example", Value::from(TIME_EXAMPLE)),
        ]),
        TypeTag::Enum(name) => {
            let en = graph.require_enum(name, name)?;
            let names: Vec<Value> = en.values.iter().map(|v| Value::from(v.name.as_str())).collect();
            let example = names.first().cloned().unwrap_or(Value::Null);
            object([
                ("type", Value::from("string")),
                ("enum", Value::Sequence(names)),
                ("example", example),
            ])
        }
        TypeTag::Any => object([("type", Value::from("object"))]),
        TypeTag::AnySlice => object([
            ("type", Value::from("array")),
            ("items", Value::Mapping(Mapping::new())),
        ]),
        TypeTag::Struct(name) => {
            let msg = graph.require_message(name, name)?;
            let component = emit_message_schema(msg, graph, registry)?;
            schema_ref(&component)
        }
    };
    Ok(fragment)
}

fn array_of(items: Value) -> Value {
    object([("type", Value::from("array")), ("items", items)])
}

/// Schema of a message field as the message component describes it
fn field_schema(
    owner: &MessageDescriptor,
    field: &FieldDescriptor,
    graph: &SchemaGraph<'_>,
    registry: &mut SchemaRegistry,
) -> GenerateResult<Value> {
    let location = format!("{}.{}", owner.full_name, field.name);
    if field.map {
        let entry_name = field.type_ref().unwrap_or_default();
        let entry = graph.require_message(entry_name, &location)?;
        let value_schema = match entry.field("value") {
            Some(value) => field_schema(entry, value, graph, registry)?,
            None => Value::Mapping(Mapping::new()),
        };
        return Ok(object([
            ("type", Value::from("object")),
            ("additionalProperties", value_schema),
        ]));
    }

    let base = match classify(field, graph, &location)? {
        Classification::Leaf { tag, .. } => tag_fragment(&tag, graph, registry)?,
        Classification::Nested(msg) => schema_ref(&emit_message_schema(msg, graph, registry)?),
    };
    Ok(if field.is_list() { array_of(base) } else { base })
}

/// Register the component of `message` (and everything it references).
///
/// Returns the component name. Visiting a message a second time, including
/// re-entering it through a cycle, only answers the name.
pub fn emit_message_schema(
    message: &MessageDescriptor,
    graph: &SchemaGraph<'_>,
    registry: &mut SchemaRegistry,
) -> GenerateResult<String> {
    let name = component_name(graph, &message.full_name);
    if !registry.reserve(&name, format!("message '{}'", message.full_name))? {
        return Ok(name);
    }
    let mut properties = Mapping::new();
    for field in &message.fields {
        let schema = field_schema(message, field, graph, registry)?;
        properties.insert(Value::from(field.json_name.as_str()), schema);
    }
    registry.define(
        &name,
        object([
            ("type", Value::from("object")),
            ("properties", Value::Mapping(properties)),
        ]),
    );
    Ok(name)
}

/// Register a component derived from a parameter tree, leaving out
/// path-bound fields.
///
/// Branches that still contain path-bound leaves become their own
/// `<name><Field>` components; other branches reference the plain message
/// component. Fails when `name` already belongs to a message or to a
/// differently bound tree.
pub fn emit_parameter_schema(
    name: &str,
    owner: &MessageDescriptor,
    params: &[Parameter<'_>],
    graph: &SchemaGraph<'_>,
    registry: &mut SchemaRegistry,
) -> GenerateResult<()> {
    let path_fields: Vec<&str> = leaves(params)
        .filter(|p| p.is_path)
        .map(|p| p.full_path.as_str())
        .collect();
    let shape = format!(
        "message '{}' without path fields [{}]",
        owner.full_name,
        path_fields.join(", ")
    );
    if !registry.reserve(name, shape)? {
        return Ok(());
    }
    let mut properties = Mapping::new();
    for param in params.iter().filter(|p| !p.is_path) {
        let schema = match param.message {
            Some(msg) if param.contains_path() => {
                let child = format!("{name}{}", param.field.name.to_upper_camel_case());
                emit_parameter_schema(&child, msg, &param.children, graph, registry)?;
                schema_ref(&child)
            }
            Some(msg) => schema_ref(&emit_message_schema(msg, graph, registry)?),
            None => field_schema(owner, param.field, graph, registry)?,
        };
        properties.insert(Value::from(param.field.json_name.as_str()), schema);
    }
    registry.define(
        name,
        object([
            ("type", Value::from("object")),
            ("properties", Value::Mapping(properties)),
        ]),
    );
    Ok(())
}

fn parameter_object(
    leaf: &Parameter<'_>,
    tag: &TypeTag,
    graph: &SchemaGraph<'_>,
    registry: &mut SchemaRegistry,
) -> GenerateResult<Value> {
    let fragment = tag_fragment(tag, graph, registry)?;
    let schema = if leaf.is_list { array_of(fragment) } else { fragment };
    let required = leaf.is_path || !(leaf.is_optional || leaf.is_list);
    Ok(object([
        ("in", Value::from(if leaf.is_path { "path" } else { "query" })),
        ("name", Value::from(leaf.requested_key.as_str())),
        ("required", Value::from(required)),
        ("schema", schema),
    ]))
}

fn json_content(schema: Value) -> Value {
    object([(JSON_MEDIA_TYPE, object([("schema", schema)]))])
}

fn operation(
    rpc: &RpcPathSpec<'_>,
    graph: &SchemaGraph<'_>,
    registry: &mut SchemaRegistry,
) -> GenerateResult<Value> {
    let mut op = Mapping::new();
    if !rpc.tags.is_empty() {
        op.insert(
            Value::from("tags"),
            Value::Sequence(rpc.tags.iter().map(|t| Value::from(t.as_str())).collect()),
        );
    }
    op.insert(Value::from("summary"), text_or_null(&rpc.summary));
    op.insert(Value::from("description"), text_or_null(&rpc.description));
    op.insert(Value::from("operationId"), Value::from(rpc.operation_id()));

    let has_body = rpc.has_body();
    let mut parameters = Vec::new();
    for leaf in leaves(&rpc.parameters) {
        let Some(tag) = leaf.tag.as_ref() else {
            continue;
        };
        if leaf.is_path || (!has_body && tag.is_bindable()) {
            parameters.push(parameter_object(leaf, tag, graph, registry)?);
        }
    }
    if !parameters.is_empty() {
        op.insert(Value::from("parameters"), Value::Sequence(parameters));
    }

    let input_name = component_name(graph, &rpc.input.full_name);
    if has_body {
        let body_component = if rpc.parameters.iter().any(Parameter::contains_path) {
            let name = format!("{input_name}Body");
            emit_parameter_schema(&name, rpc.input, &rpc.parameters, graph, registry)?;
            name
        } else {
            emit_message_schema(rpc.input, graph, registry)?
        };
        op.insert(
            Value::from("requestBody"),
            object([
                ("description", Value::from(input_name.as_str())),
                ("content", json_content(schema_ref(&body_component))),
                ("required", Value::from(true)),
            ]),
        );
    }

    let output_name = emit_message_schema(rpc.output, graph, registry)?;
    op.insert(
        Value::from("responses"),
        object([(
            "200",
            object([
                ("description", Value::from(output_name.as_str())),
                ("content", json_content(schema_ref(&output_name))),
            ]),
        )]),
    );
    Ok(Value::Mapping(op))
}

/// Assemble the document of one IDL file as a YAML value tree
pub fn build_document(
    file: &FileDescriptor,
    servers: &[ServerSpec<'_>],
    graph: &SchemaGraph<'_>,
    config: &GeneratorConfig,
    registry: &mut SchemaRegistry,
) -> GenerateResult<Value> {
    let mut paths = Mapping::new();
    for rpc in servers.iter().flat_map(|s| s.rpcs.iter()) {
        let op = operation(rpc, graph, registry)?;
        let verb = Value::from(rpc.verb.as_str().to_lowercase());
        let key = Value::from(rpc.doc_path.as_str());
        match paths.get_mut(&key) {
            Some(Value::Mapping(item)) => {
                item.insert(verb, op);
            }
            _ => {
                let mut item = Mapping::new();
                item.insert(verb, op);
                paths.insert(key, Value::Mapping(item));
            }
        }
    }

    let schemas = std::mem::take(registry).into_mapping();
    Ok(object([
        ("openapi", Value::from(OPENAPI_VERSION)),
        (
            "info",
            object([
                ("title", Value::from(file.package.as_str())),
                ("version", Value::from(config.openapi_version.as_str())),
            ]),
        ),
        ("paths", Value::Mapping(paths)),
        ("components", object([("schemas", Value::Mapping(schemas))])),
    ]))
}

/// Plain scalar lines a YAML 1.1 reader would load as a timestamp
static PLAIN_TIMESTAMP: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| {
    Regex::new(
        r#"^( *(?:- )*(?:[^\s:#'"][^:]*: )?)(\d{4}-\d{1,2}-\d{1,2}(?:(?:[Tt]|[ \t]+)\d{1,2}:\d{2}:\d{2}(?:\.\d*)?(?:[ \t]*(?:Z|[-+]\d{1,2}(?::\d{2})?))?)?)$"#,
    )
});

/// Header line of a literal or folded block scalar
static BLOCK_HEADER: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"(?:^|: |- )[|>][-+]?[0-9]?$"));

/// Single-quote plain scalars that look like timestamps.
///
/// `serde_yaml` writes them bare, which YAML 1.1 readers turn into dates.
/// Block scalar bodies are left alone.
#[must_use]
pub fn quote_timestamps(yaml: &str) -> String {
    let (Ok(timestamp), Ok(block_header)) = (PLAIN_TIMESTAMP.as_ref(), BLOCK_HEADER.as_ref())
    else {
        return yaml.to_string();
    };
    let mut out = String::with_capacity(yaml.len() + 16);
    let mut block_indent: Option<usize> = None;
    for line in yaml.split_inclusive('\n') {
        let content = line.trim_end_matches('\n');
        let indent = content.len() - content.trim_start_matches(' ').len();
        if let Some(header) = block_indent {
            if content.trim().is_empty() || indent > header {
                out.push_str(line);
                continue;
            }
            block_indent = None;
        }
        if block_header.is_match(content) {
            block_indent = Some(indent);
        }
        out.push_str(&timestamp.replace(content, "$1'$2'"));
        if line.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

/// Remove null-valued entries from every object, recursively.
///
/// Array elements are visited but never removed.
pub fn strip_nulls(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

/// Transcode YAML document text to JSON
pub fn yaml_to_json(yaml: &str, strip: bool, pretty: bool) -> GenerateResult<String> {
    let mut value: serde_json::Value =
        serde_yaml::from_str(yaml).map_err(|e| GenerateError::Document {
            detail: format!("failed to re-read YAML document: {e}"),
        })?;
    if strip {
        strip_nulls(&mut value);
    }
    let json = if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    };
    json.map_err(|e| GenerateError::Document {
        detail: format!("failed to write JSON document: {e}"),
    })
}

/// Render both forms of the document of one IDL file
pub fn render_openapi(
    file: &FileDescriptor,
    servers: &[ServerSpec<'_>],
    graph: &SchemaGraph<'_>,
    config: &GeneratorConfig,
) -> GenerateResult<OpenApiDocument> {
    let mut registry = SchemaRegistry::new();
    let document = build_document(file, servers, graph, config, &mut registry)?;
    let schema_count = document
        .get("components")
        .and_then(|c| c.get("schemas"))
        .and_then(Value::as_mapping)
        .map_or(0, Mapping::len);
    let yaml = serde_yaml::to_string(&document).map_err(|e| GenerateError::Document {
        detail: format!("failed to write YAML document: {e}"),
    })?;
    let yaml = quote_timestamps(&yaml);
    let json = yaml_to_json(&yaml, config.strip_nulls, config.pretty_json)?;
    debug!(
        file = %file.name,
        schemas = schema_count,
        yaml_bytes = yaml.len(),
        json_bytes = json.len(),
        "Rendered OpenAPI document"
    );
    Ok(OpenApiDocument {
        yaml,
        json,
        schema_count,
    })
}
