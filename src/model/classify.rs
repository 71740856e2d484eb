use crate::descriptor::{
    FieldDescriptor, FieldKind, MessageDescriptor, SchemaGraph, LIST_VALUE_TYPE, STRUCT_TYPE,
    TIMESTAMP_TYPE,
};
use crate::error::{GenerateError, GenerateResult};
use std::fmt;

/// Wire type of a leaf parameter.
///
/// Every consumer (binder emitter, document emitter, runtime parsers) matches
/// on this enum exhaustively, so a new variant cannot be added without every
/// table being extended.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    Bytes,
    /// Enum with the full name of its definition
    Enum(String),
    String,
    Bool,
    /// `google.protobuf.Timestamp`
    Time,
    /// `google.protobuf.Struct`
    Any,
    /// `google.protobuf.ListValue`
    AnySlice,
    /// Opaque message carried only in bodies (full name of the message)
    Struct(String),
}

impl TypeTag {
    /// Whether values of this tag can be bound from path or query text
    #[must_use]
    pub fn is_bindable(&self) -> bool {
        !matches!(self, TypeTag::Any | TypeTag::AnySlice | TypeTag::Struct(_))
    }

    /// Short name used in diagnostics and `inspect` output
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Int32 => "int32",
            TypeTag::UInt32 => "uint32",
            TypeTag::Int64 => "int64",
            TypeTag::UInt64 => "uint64",
            TypeTag::Float32 => "float32",
            TypeTag::Float64 => "float64",
            TypeTag::Bytes => "bytes",
            TypeTag::Enum(_) => "enum",
            TypeTag::String => "string",
            TypeTag::Bool => "bool",
            TypeTag::Time => "time",
            TypeTag::Any => "any",
            TypeTag::AnySlice => "any_slice",
            TypeTag::Struct(_) => "struct",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Enum(name) => write!(f, "enum({name})"),
            TypeTag::Struct(name) => write!(f, "struct({name})"),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Outcome of classifying one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification<'a> {
    /// Terminal value with its tag and modifiers
    Leaf {
        tag: TypeTag,
        list: bool,
        optional: bool,
    },
    /// Non-well-known message to expand as a branch
    Nested(&'a MessageDescriptor),
}

/// Classify a field into a [`TypeTag`] or a nested message.
///
/// Well-known wrappers are checked before generic message handling. Map
/// fields, repeated messages and messages without fields cannot be expanded
/// into bindable leaves and classify as [`TypeTag::Struct`].
///
/// `location` names the field in error messages (e.g. `shop.v1.Order.line`).
pub fn classify<'a>(
    field: &FieldDescriptor,
    graph: &SchemaGraph<'a>,
    location: &str,
) -> GenerateResult<Classification<'a>> {
    let list = field.is_list();
    let optional = field.optional;
    let leaf = |tag| Classification::Leaf {
        tag,
        list,
        optional,
    };

    let tag = match field.kind {
        FieldKind::Bool => TypeTag::Bool,
        FieldKind::String => TypeTag::String,
        FieldKind::Int32 | FieldKind::Sint32 | FieldKind::Sfixed32 => TypeTag::Int32,
        FieldKind::Uint32 | FieldKind::Fixed32 => TypeTag::UInt32,
        FieldKind::Int64 | FieldKind::Sint64 | FieldKind::Sfixed64 => TypeTag::Int64,
        FieldKind::Uint64 | FieldKind::Fixed64 => TypeTag::UInt64,
        FieldKind::Float => TypeTag::Float32,
        FieldKind::Double => TypeTag::Float64,
        FieldKind::Bytes => TypeTag::Bytes,
        FieldKind::Enum => {
            let name = referenced_type(field, location)?;
            let en = graph.require_enum(name, location)?;
            TypeTag::Enum(en.full_name.clone())
        }
        FieldKind::Message | FieldKind::Group => {
            let name = referenced_type(field, location)?;
            match name {
                TIMESTAMP_TYPE => TypeTag::Time,
                STRUCT_TYPE => TypeTag::Any,
                LIST_VALUE_TYPE => TypeTag::AnySlice,
                _ => {
                    let msg = graph.require_message(name, location)?;
                    if field.map || field.repeated || msg.fields.is_empty() {
                        TypeTag::Struct(msg.full_name.clone())
                    } else {
                        return Ok(Classification::Nested(msg));
                    }
                }
            }
        }
    };
    Ok(leaf(tag))
}

fn referenced_type<'f>(field: &'f FieldDescriptor, location: &str) -> GenerateResult<&'f str> {
    field.type_ref().ok_or_else(|| GenerateError::MissingTypeName {
        field: location.to_string(),
    })
}
