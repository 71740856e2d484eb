use super::types::{DescriptorBundle, EnumDescriptor, FileDescriptor, MessageDescriptor};
use crate::error::{GenerateError, GenerateResult};
use std::collections::HashMap;

/// Read-only index over every message and enum of a descriptor bundle.
///
/// The graph borrows the bundle; it is built once per run and shared by every
/// per-file generation pass.
#[derive(Debug, Default)]
pub struct SchemaGraph<'a> {
    messages: HashMap<&'a str, &'a MessageDescriptor>,
    enums: HashMap<&'a str, &'a EnumDescriptor>,
    packages: HashMap<&'a str, &'a str>,
}

impl<'a> SchemaGraph<'a> {
    /// Index a normalized bundle (full names must already be computed)
    #[must_use]
    pub fn new(bundle: &'a DescriptorBundle) -> Self {
        let mut graph = SchemaGraph::default();
        for file in &bundle.files {
            graph.add_file(file);
        }
        graph
    }

    fn add_file(&mut self, file: &'a FileDescriptor) {
        for msg in &file.messages {
            self.add_message(msg, &file.package);
        }
        for en in &file.enums {
            self.enums.insert(en.full_name.as_str(), en);
            self.packages.insert(en.full_name.as_str(), file.package.as_str());
        }
    }

    fn add_message(&mut self, msg: &'a MessageDescriptor, package: &'a str) {
        self.messages.insert(msg.full_name.as_str(), msg);
        self.packages.insert(msg.full_name.as_str(), package);
        for nested in &msg.messages {
            self.add_message(nested, package);
        }
        for en in &msg.enums {
            self.enums.insert(en.full_name.as_str(), en);
            self.packages.insert(en.full_name.as_str(), package);
        }
    }

    /// Look up a message by full name (a leading `.` is accepted)
    #[must_use]
    pub fn message(&self, full_name: &str) -> Option<&'a MessageDescriptor> {
        let name = full_name.strip_prefix('.').unwrap_or(full_name);
        self.messages.get(name).copied()
    }

    /// Look up an enum by full name (a leading `.` is accepted)
    #[must_use]
    pub fn enumeration(&self, full_name: &str) -> Option<&'a EnumDescriptor> {
        let name = full_name.strip_prefix('.').unwrap_or(full_name);
        self.enums.get(name).copied()
    }

    /// Resolve a message reference or fail the pass
    pub fn require_message(
        &self,
        full_name: &str,
        referenced_from: &str,
    ) -> GenerateResult<&'a MessageDescriptor> {
        self.message(full_name)
            .ok_or_else(|| GenerateError::UnresolvedType {
                type_name: full_name.to_string(),
                referenced_from: referenced_from.to_string(),
            })
    }

    /// Resolve an enum reference or fail the pass
    pub fn require_enum(
        &self,
        full_name: &str,
        referenced_from: &str,
    ) -> GenerateResult<&'a EnumDescriptor> {
        let en = self
            .enumeration(full_name)
            .ok_or_else(|| GenerateError::UnresolvedType {
                type_name: full_name.to_string(),
                referenced_from: referenced_from.to_string(),
            })?;
        if en.values.is_empty() {
            return Err(GenerateError::EmptyEnum {
                enum_name: en.full_name.clone(),
            });
        }
        Ok(en)
    }

    /// Name of a type relative to its package (`Outer.Inner`)
    #[must_use]
    pub fn relative_name<'n>(&self, full_name: &'n str) -> &'n str {
        let name = full_name.strip_prefix('.').unwrap_or(full_name);
        match self.packages.get(name) {
            Some(pkg) if !pkg.is_empty() => name
                .strip_prefix(pkg)
                .and_then(|rest| rest.strip_prefix('.'))
                .unwrap_or(name),
            _ => name,
        }
    }

    /// Number of indexed messages
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}
