use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Full name of the timestamp wrapper
pub const TIMESTAMP_TYPE: &str = "google.protobuf.Timestamp";
/// Full name of the generic struct wrapper
pub const STRUCT_TYPE: &str = "google.protobuf.Struct";
/// Full name of the generic list wrapper
pub const LIST_VALUE_TYPE: &str = "google.protobuf.ListValue";

/// Field kinds of the IDL type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Bool,
    String,
    Int32,
    Sint32,
    Sfixed32,
    Uint32,
    Fixed32,
    Int64,
    Sint64,
    Sfixed64,
    Uint64,
    Fixed64,
    Float,
    Double,
    Bytes,
    Enum,
    Message,
    Group,
}

impl FieldKind {
    /// Kinds that reference a nested definition through `type_name`
    #[must_use]
    pub fn is_reference(self) -> bool {
        matches!(self, FieldKind::Enum | FieldKind::Message | FieldKind::Group)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldKind::Bool => "bool",
            FieldKind::String => "string",
            FieldKind::Int32 => "int32",
            FieldKind::Sint32 => "sint32",
            FieldKind::Sfixed32 => "sfixed32",
            FieldKind::Uint32 => "uint32",
            FieldKind::Fixed32 => "fixed32",
            FieldKind::Int64 => "int64",
            FieldKind::Sint64 => "sint64",
            FieldKind::Sfixed64 => "sfixed64",
            FieldKind::Uint64 => "uint64",
            FieldKind::Fixed64 => "fixed64",
            FieldKind::Float => "float",
            FieldKind::Double => "double",
            FieldKind::Bytes => "bytes",
            FieldKind::Enum => "enum",
            FieldKind::Message => "message",
            FieldKind::Group => "group",
        };
        write!(f, "{s}")
    }
}

/// A single field of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Declared (snake_case) field name
    pub name: String,
    /// JSON name; filled with the lowerCamelCase form of `name` when absent
    #[serde(default)]
    pub json_name: String,
    pub kind: FieldKind,
    /// Full name of the referenced message/enum (message, group and enum kinds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Declared with the explicit `optional` keyword
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub repeated: bool,
    /// Map field; `type_name` then points at the synthetic entry message
    #[serde(default)]
    pub map: bool,
}

impl FieldDescriptor {
    /// Whether the field is a list (repeated and not a map)
    #[must_use]
    pub fn is_list(&self) -> bool {
        self.repeated && !self.map
    }

    /// Referenced type name without a leading dot
    #[must_use]
    pub fn type_ref(&self) -> Option<&str> {
        self.type_name
            .as_deref()
            .map(|name| name.strip_prefix('.').unwrap_or(name))
    }
}

/// A value of an enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValueDescriptor {
    pub name: String,
    pub number: i32,
}

/// An enum definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDescriptor {
    pub name: String,
    /// Computed at load time (`package.Outer.Name`)
    #[serde(skip)]
    pub full_name: String,
    #[serde(default)]
    pub values: Vec<EnumValueDescriptor>,
}

impl EnumDescriptor {
    /// Ordinal of a value name
    #[must_use]
    pub fn ordinal(&self, name: &str) -> Option<i32> {
        self.values.iter().find(|v| v.name == name).map(|v| v.number)
    }
}

/// A message definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDescriptor {
    pub name: String,
    /// Computed at load time (`package.Outer.Name`)
    #[serde(skip)]
    pub full_name: String,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    /// Nested message definitions
    #[serde(default)]
    pub messages: Vec<MessageDescriptor>,
    /// Nested enum definitions
    #[serde(default)]
    pub enums: Vec<EnumDescriptor>,
    /// Synthetic `key`/`value` entry message of a map field
    #[serde(default)]
    pub map_entry: bool,
}

impl MessageDescriptor {
    /// Field by declared name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Routing annotation attached to an RPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HttpRule {
    /// HTTP verb (`GET`, `POST`, ...)
    pub method: String,
    /// URL template in the form handed to the runtime router
    pub path: String,
    /// URL template in the form written to the document (defaults to `path`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_path: Option<String>,
    /// Requested (dotted JSON) key → literal URL placeholder name
    #[serde(default)]
    pub path_keys: BTreeMap<String, String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
}

/// An RPC of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    /// Full name of the input message
    pub input_type: String,
    /// Full name of the output message
    pub output_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leading_comments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing_comments: Option<String>,
    /// Routing annotation; methods without one are not exposed over HTTP
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpRule>,
}

/// A service definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub name: String,
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
}

/// One compiled IDL file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// File name as passed to the compiler (e.g. `widgets/v1/widgets.proto`)
    pub name: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub messages: Vec<MessageDescriptor>,
    #[serde(default)]
    pub enums: Vec<EnumDescriptor>,
    #[serde(default)]
    pub services: Vec<ServiceDescriptor>,
}

impl FileDescriptor {
    /// Whether any RPC of the file carries a routing annotation
    #[must_use]
    pub fn has_routes(&self) -> bool {
        self.services
            .iter()
            .flat_map(|s| s.methods.iter())
            .any(|m| m.http.is_some())
    }
}

/// The compiled schema graph handed to the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DescriptorBundle {
    #[serde(default)]
    pub files: Vec<FileDescriptor>,
    /// Files to generate for; defaults to every file with routed RPCs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generate: Vec<String>,
}

impl DescriptorBundle {
    /// Files selected for generation
    #[must_use]
    pub fn targets(&self) -> Vec<&FileDescriptor> {
        if self.generate.is_empty() {
            self.files.iter().filter(|f| f.has_routes()).collect()
        } else {
            self.files
                .iter()
                .filter(|f| self.generate.iter().any(|g| g == &f.name))
                .collect()
        }
    }
}
