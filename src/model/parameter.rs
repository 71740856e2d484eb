use super::classify::{classify, Classification, TypeTag};
use crate::descriptor::{FieldDescriptor, MessageDescriptor, SchemaGraph};
use crate::error::{GenerateError, GenerateResult};
use heck::ToSnakeCase;
use std::collections::BTreeMap;

/// One node of a parameter tree.
///
/// A node is either a branch (a nested message, `children` non-empty and
/// `tag` unset) or a typed leaf (`tag` set, no children). Trees are built once
/// per RPC and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter<'a> {
    /// Source field
    pub field: &'a FieldDescriptor,
    /// Dotted JSON key the request and the document use; the literal URL
    /// placeholder name when the field is path-bound
    pub requested_key: String,
    /// Dotted structural key of the generated assignment target
    pub full_path: String,
    /// Property name on the generated message type
    pub property_name: String,
    /// Leaf tag; `None` for branches
    pub tag: Option<TypeTag>,
    pub is_optional: bool,
    pub is_list: bool,
    pub is_path: bool,
    /// Message expanded by a branch
    pub message: Option<&'a MessageDescriptor>,
    pub children: Vec<Parameter<'a>>,
}

impl<'a> Parameter<'a> {
    /// Whether the node is a typed leaf
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.tag.is_some()
    }

    /// Whether this node or any descendant is path-bound
    #[must_use]
    pub fn contains_path(&self) -> bool {
        if self.is_leaf() {
            self.is_path
        } else {
            self.children.iter().any(Parameter::contains_path)
        }
    }

    /// Depth-first iterator over the leaves below (and including) this node
    pub fn leaves(&self) -> Box<dyn Iterator<Item = &Parameter<'a>> + '_> {
        if self.is_leaf() {
            Box::new(std::iter::once(self))
        } else {
            Box::new(self.children.iter().flat_map(Parameter::leaves))
        }
    }
}

/// Leaves of a whole tree in declaration order
pub fn leaves<'p, 'a>(params: &'p [Parameter<'a>]) -> impl Iterator<Item = &'p Parameter<'a>> {
    params.iter().flat_map(Parameter::leaves)
}

/// Number of path-bound leaves in a tree
#[must_use]
pub fn count_path_parameters(params: &[Parameter<'_>]) -> usize {
    leaves(params).filter(|p| p.is_path).count()
}

/// Recursive builder of parameter trees.
///
/// The builder keeps the stack of messages currently being expanded; a field
/// that refers back to one of them becomes a body-only `Struct` leaf so that
/// self and mutually recursive messages terminate.
pub struct ParameterTreeBuilder<'a, 'g> {
    graph: &'g SchemaGraph<'a>,
    path_keys: &'g BTreeMap<String, String>,
    stack: Vec<&'a str>,
    rpc: String,
}

impl<'a, 'g> ParameterTreeBuilder<'a, 'g> {
    #[must_use]
    pub fn new(graph: &'g SchemaGraph<'a>, path_keys: &'g BTreeMap<String, String>) -> Self {
        Self {
            graph,
            path_keys,
            stack: Vec::new(),
            rpc: String::new(),
        }
    }

    /// Name the RPC (`Service.Method`) reported in errors
    #[must_use]
    pub fn with_rpc(mut self, rpc: impl Into<String>) -> Self {
        self.rpc = rpc.into();
        self
    }

    /// Build the parameter list of `message`.
    ///
    /// `key_prefix` is prepended to structural keys and `requested_prefix` to
    /// requested keys; both are empty for the root input message.
    pub fn build(
        &mut self,
        message: &'a MessageDescriptor,
        key_prefix: &str,
        requested_prefix: &str,
    ) -> GenerateResult<Vec<Parameter<'a>>> {
        self.stack.push(message.full_name.as_str());
        let result = message
            .fields
            .iter()
            .map(|field| self.build_field(message, field, key_prefix, requested_prefix))
            .collect();
        self.stack.pop();
        result
    }

    fn build_field(
        &mut self,
        parent: &'a MessageDescriptor,
        field: &'a FieldDescriptor,
        key_prefix: &str,
        requested_prefix: &str,
    ) -> GenerateResult<Parameter<'a>> {
        let property_name = field.name.to_snake_case();
        let full_path = format!("{key_prefix}{property_name}");
        let mut requested_key = format!("{requested_prefix}{}", field.json_name);
        let mut is_path = false;
        if let Some(placeholder) = self.path_keys.get(&requested_key) {
            is_path = true;
            requested_key = placeholder.clone();
        }

        let location = format!("{}.{}", parent.full_name, field.name);
        let (tag, message, children) = match classify(field, self.graph, &location)? {
            Classification::Leaf { tag, .. } => (Some(tag), None, Vec::new()),
            Classification::Nested(msg) if self.stack.contains(&msg.full_name.as_str()) => {
                (Some(TypeTag::Struct(msg.full_name.clone())), None, Vec::new())
            }
            Classification::Nested(msg) => {
                if is_path {
                    return Err(GenerateError::UnsupportedPathParameter {
                        rpc: self.rpc.clone(),
                        key: requested_key,
                        tag: "message".to_string(),
                    });
                }
                let children =
                    self.build(msg, &format!("{full_path}."), &format!("{requested_key}."))?;
                (None, Some(msg), children)
            }
        };

        Ok(Parameter {
            field,
            requested_key,
            full_path,
            property_name,
            tag,
            is_optional: field.optional,
            is_list: field.is_list(),
            is_path,
            message,
            children,
        })
    }
}

/// Build the tree of `message` against a path-key table
pub fn build_parameters<'a>(
    message: &'a MessageDescriptor,
    path_keys: &BTreeMap<String, String>,
    graph: &SchemaGraph<'a>,
) -> GenerateResult<Vec<Parameter<'a>>> {
    ParameterTreeBuilder::new(graph, path_keys).build(message, "", "")
}
