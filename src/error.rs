use std::fmt;

/// Generation-time failure.
///
/// Every variant describes a misconfigured schema or routing annotation. Any of
/// them aborts the whole generation run: the handler source and the OpenAPI
/// document must describe the same bindings, so a partially generated file set
/// is never written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// A message or enum reference could not be found in the schema graph
    UnresolvedType {
        /// Full name as written on the field or method
        type_name: String,
        /// Where the reference was found (e.g. `widgets.v1.Widget.owner`)
        referenced_from: String,
    },
    /// A message/enum/group field carries no `type_name`
    MissingTypeName {
        /// Dotted location of the field
        field: String,
    },
    /// An enum declares no values, so it has no name→ordinal table
    EmptyEnum {
        /// Enum full name
        enum_name: String,
    },
    /// A URL template the runtime router cannot compile
    InvalidPathTemplate {
        /// `Service.Method`
        rpc: String,
        /// URL template as annotated
        template: String,
        /// Parser message
        detail: String,
    },
    /// The URL template placeholders and the path-key table disagree
    PathTemplateMismatch {
        /// `Service.Method`
        rpc: String,
        /// URL template as annotated
        template: String,
        /// Human readable description of the mismatch
        detail: String,
    },
    /// The number of path-bound leaves differs from the path-key table size
    UnmatchedPathKeys {
        /// `Service.Method`
        rpc: String,
        /// Entries in the path-key table
        expected: usize,
        /// Path-bound leaves found in the parameter tree
        found: usize,
    },
    /// A list-typed field is bound to a path position
    ListPathParameter {
        /// `Service.Method`
        rpc: String,
        /// Requested key of the offending field
        key: String,
    },
    /// A leaf whose tag has no path parser (Any, AnySlice, Struct) is path-bound
    UnsupportedPathParameter {
        /// `Service.Method`
        rpc: String,
        /// Requested key of the offending field
        key: String,
        /// Tag name of the offending field
        tag: String,
    },
    /// Repeated bytes cannot be bound from the query string
    RepeatedBytesQueryParameter {
        /// `Service.Method`
        rpc: String,
        /// Requested key of the offending field
        key: String,
    },
    /// The HTTP verb of an annotation is not one the emitters know
    UnsupportedVerb {
        /// `Service.Method`
        rpc: String,
        /// Verb as annotated
        verb: String,
    },
    /// Two RPCs of one file register the same verb on the same document path
    DuplicateOperation {
        /// Document path template
        path: String,
        /// Lower-case verb
        verb: String,
    },
    /// Two different shapes claim the same `components/schemas` name
    SchemaNameCollision {
        /// Component name
        name: String,
        /// Shape that claimed the name first
        first: String,
        /// Shape that asked for it again
        second: String,
    },
    /// The assembled OpenAPI document could not be serialised or transcoded
    Document {
        /// Underlying serializer/parser message
        detail: String,
    },
    /// The handler template failed to render
    Template {
        /// Underlying askama message
        detail: String,
    },
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::UnresolvedType {
                type_name,
                referenced_from,
            } => write!(
                f,
                "unresolved type '{type_name}' referenced from '{referenced_from}'"
            ),
            GenerateError::MissingTypeName { field } => {
                write!(f, "field '{field}' has a message/enum kind but no type_name")
            }
            GenerateError::EmptyEnum { enum_name } => {
                write!(f, "enum '{enum_name}' declares no values")
            }
            GenerateError::InvalidPathTemplate {
                rpc,
                template,
                detail,
            } => write!(f, "{rpc}: invalid path template '{template}': {detail}"),
            GenerateError::PathTemplateMismatch {
                rpc,
                template,
                detail,
            } => write!(f, "{rpc}: path template '{template}' {detail}"),
            GenerateError::UnmatchedPathKeys {
                rpc,
                expected,
                found,
            } => write!(
                f,
                "{rpc}: unmatched path keys (expected {expected} path-bound fields, found {found}); \
                some of the path keys do not match request fields"
            ),
            GenerateError::ListPathParameter { rpc, key } => {
                write!(f, "{rpc}: list field '{key}' cannot be bound to a path parameter")
            }
            GenerateError::UnsupportedPathParameter { rpc, key, tag } => write!(
                f,
                "{rpc}: field '{key}' of type {tag} cannot be bound to a path parameter"
            ),
            GenerateError::RepeatedBytesQueryParameter { rpc, key } => write!(
                f,
                "{rpc}: repeated bytes field '{key}' is not supported as a query parameter"
            ),
            GenerateError::UnsupportedVerb { rpc, verb } => {
                write!(f, "{rpc}: unsupported HTTP verb '{verb}'")
            }
            GenerateError::DuplicateOperation { path, verb } => {
                write!(f, "operation '{verb} {path}' is declared more than once")
            }
            GenerateError::SchemaNameCollision {
                name,
                first,
                second,
            } => write!(
                f,
                "component schema '{name}' is claimed by both {first} and {second}"
            ),
            GenerateError::Document { detail } => {
                write!(f, "failed to assemble OpenAPI document: {detail}")
            }
            GenerateError::Template { detail } => {
                write!(f, "failed to render handler source: {detail}")
            }
        }
    }
}

impl std::error::Error for GenerateError {}

impl From<askama::Error> for GenerateError {
    fn from(err: askama::Error) -> Self {
        GenerateError::Template {
            detail: err.to_string(),
        }
    }
}

/// Result alias for generation passes
pub type GenerateResult<T> = Result<T, GenerateError>;
