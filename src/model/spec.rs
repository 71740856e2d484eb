use super::classify::TypeTag;
use super::parameter::{count_path_parameters, leaves, Parameter, ParameterTreeBuilder};
use crate::descriptor::{
    EnumDescriptor, FileDescriptor, HttpRule, MessageDescriptor, MethodDescriptor, SchemaGraph,
    ServiceDescriptor,
};
use crate::error::{GenerateError, GenerateResult};
use crate::runtime::{parse_template, placeholder_names, TemplateError};
use http::Method;
use std::collections::HashSet;
use tracing::debug;

/// Placeholder names of a URL template in order of appearance.
///
/// The grammar is the one the runtime router compiles (see
/// [`parse_template`]), so a template that passes here also routes.
///
/// ```rust
/// use protoroute::model::template_placeholders;
/// assert_eq!(template_placeholders("/a/{id}/b/:sub").unwrap(), vec!["id", "sub"]);
/// assert_eq!(template_placeholders("/files/{id}.json").unwrap(), vec!["id"]);
/// ```
pub fn template_placeholders(template: &str) -> Result<Vec<String>, TemplateError> {
    parse_template(template).map(|parts| placeholder_names(&parts))
}

/// Whether requests with this verb carry a body to decode
#[must_use]
pub fn verb_has_body(verb: &Method) -> bool {
    *verb != Method::GET && *verb != Method::DELETE
}

/// Everything both emitters need to know about one routed RPC.
#[derive(Debug, Clone)]
pub struct RpcPathSpec<'a> {
    pub service: &'a ServiceDescriptor,
    pub method: &'a MethodDescriptor,
    pub input: &'a MessageDescriptor,
    pub output: &'a MessageDescriptor,
    pub verb: Method,
    /// URL template handed to the runtime router
    pub path: String,
    /// URL template written to the document
    pub doc_path: String,
    pub tags: Vec<String>,
    pub roles: Vec<String>,
    pub features: Vec<String>,
    pub summary: String,
    pub description: String,
    /// Root parameter list of the input message
    pub parameters: Vec<Parameter<'a>>,
    /// Enums whose name→ordinal tables the binder needs, in first-use order
    pub enums: Vec<&'a EnumDescriptor>,
}

impl<'a> RpcPathSpec<'a> {
    /// `Service.Method`
    #[must_use]
    pub fn rpc_name(&self) -> String {
        format!("{}.{}", self.service.name, self.method.name)
    }

    /// `Service_Method`
    #[must_use]
    pub fn operation_id(&self) -> String {
        format!("{}_{}", self.service.name, self.method.name)
    }

    #[must_use]
    pub fn has_body(&self) -> bool {
        verb_has_body(&self.verb)
    }

    /// Path-bound leaves in declaration order
    pub fn path_leaves(&self) -> impl Iterator<Item = &Parameter<'a>> {
        leaves(&self.parameters).filter(|p| p.is_path)
    }

    /// Leaves bound from the query string (none for verbs with a body)
    pub fn query_leaves(&self) -> impl Iterator<Item = &Parameter<'a>> {
        let has_body = self.has_body();
        leaves(&self.parameters).filter(move |p| {
            !has_body && !p.is_path && p.tag.as_ref().is_some_and(TypeTag::is_bindable)
        })
    }
}

/// The routed RPCs of one service.
#[derive(Debug, Clone)]
pub struct ServerSpec<'a> {
    pub service: &'a ServiceDescriptor,
    pub rpcs: Vec<RpcPathSpec<'a>>,
}

/// Build the server specs of every service in `file` that has routed RPCs.
///
/// Fails on the first misconfigured annotation; nothing is built for the file
/// in that case.
pub fn build_server_specs<'a>(
    file: &'a FileDescriptor,
    graph: &SchemaGraph<'a>,
) -> GenerateResult<Vec<ServerSpec<'a>>> {
    let mut seen = HashSet::new();
    let mut servers = Vec::new();
    for service in &file.services {
        let mut rpcs = Vec::new();
        for method in &service.methods {
            let Some(rule) = method.http.as_ref() else {
                continue;
            };
            let spec = build_rpc_spec(service, method, rule, graph)?;
            if !seen.insert((spec.doc_path.clone(), spec.verb.clone())) {
                return Err(GenerateError::DuplicateOperation {
                    path: spec.doc_path,
                    verb: spec.verb.as_str().to_lowercase(),
                });
            }
            rpcs.push(spec);
        }
        if !rpcs.is_empty() {
            debug!(
                file = %file.name,
                service = %service.name,
                rpcs = rpcs.len(),
                "Built server spec"
            );
            servers.push(ServerSpec { service, rpcs });
        }
    }
    Ok(servers)
}

fn parse_verb(rpc: &str, verb: &str) -> GenerateResult<Method> {
    let upper = verb.trim().to_uppercase();
    let method = Method::from_bytes(upper.as_bytes()).ok();
    match method {
        Some(m)
            if m == Method::GET
                || m == Method::POST
                || m == Method::PUT
                || m == Method::PATCH
                || m == Method::DELETE =>
        {
            Ok(m)
        }
        _ => Err(GenerateError::UnsupportedVerb {
            rpc: rpc.to_string(),
            verb: verb.to_string(),
        }),
    }
}

fn check_template(rpc: &str, template: &str, rule: &HttpRule) -> GenerateResult<()> {
    let placeholders =
        template_placeholders(template).map_err(|e| GenerateError::InvalidPathTemplate {
            rpc: rpc.to_string(),
            template: template.to_string(),
            detail: e.to_string(),
        })?;
    let mismatch = |detail: String| GenerateError::PathTemplateMismatch {
        rpc: rpc.to_string(),
        template: template.to_string(),
        detail,
    };
    if placeholders.len() != rule.path_keys.len() {
        return Err(mismatch(format!(
            "{} placeholder(s) but {} path key(s)",
            placeholders.len(),
            rule.path_keys.len()
        )));
    }
    for placeholder in rule.path_keys.values() {
        if !placeholders.contains(placeholder) {
            return Err(mismatch(format!("no placeholder named '{placeholder}'")));
        }
    }
    Ok(())
}

fn build_rpc_spec<'a>(
    service: &'a ServiceDescriptor,
    method: &'a MethodDescriptor,
    rule: &'a HttpRule,
    graph: &SchemaGraph<'a>,
) -> GenerateResult<RpcPathSpec<'a>> {
    let rpc = format!("{}.{}", service.name, method.name);
    let verb = parse_verb(&rpc, &rule.method)?;
    let doc_path = rule.doc_path.clone().unwrap_or_else(|| rule.path.clone());
    check_template(&rpc, &rule.path, rule)?;
    if doc_path != rule.path {
        check_template(&rpc, &doc_path, rule)?;
    }

    let input = graph.require_message(&method.input_type, &rpc)?;
    let output = graph.require_message(&method.output_type, &rpc)?;
    let parameters = ParameterTreeBuilder::new(graph, &rule.path_keys)
        .with_rpc(rpc.clone())
        .build(input, "", "")?;

    let found = count_path_parameters(&parameters);
    if found != rule.path_keys.len() {
        return Err(GenerateError::UnmatchedPathKeys {
            rpc,
            expected: rule.path_keys.len(),
            found,
        });
    }

    let has_body = verb_has_body(&verb);
    let mut enums: Vec<&'a EnumDescriptor> = Vec::new();
    for leaf in leaves(&parameters) {
        let Some(tag) = leaf.tag.as_ref() else {
            continue;
        };
        if leaf.is_path {
            if leaf.is_list {
                return Err(GenerateError::ListPathParameter {
                    rpc,
                    key: leaf.requested_key.clone(),
                });
            }
            if !tag.is_bindable() {
                return Err(GenerateError::UnsupportedPathParameter {
                    rpc,
                    key: leaf.requested_key.clone(),
                    tag: tag.name().to_string(),
                });
            }
        } else if !has_body && leaf.is_list && *tag == TypeTag::Bytes {
            return Err(GenerateError::RepeatedBytesQueryParameter {
                rpc,
                key: leaf.requested_key.clone(),
            });
        }

        let bound = leaf.is_path || !has_body;
        if let (true, TypeTag::Enum(name)) = (bound, tag) {
            let en = graph.require_enum(name, &rpc)?;
            if !enums.iter().any(|e| e.full_name == en.full_name) {
                enums.push(en);
            }
        }
    }

    Ok(RpcPathSpec {
        service,
        method,
        input,
        output,
        verb,
        path: rule.path.clone(),
        doc_path,
        tags: rule.tags.clone(),
        roles: rule.roles.clone(),
        features: rule.features.clone(),
        summary: rule.summary.clone(),
        description: rule.description.clone(),
        parameters,
        enums,
    })
}
