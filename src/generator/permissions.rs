//! Permission map emitter.
//!
//! `{Service: {InputType: {"Roles": [...], "Features": [...]}}}`, read only
//! from RPC-level metadata.

use super::openapi::component_name;
use crate::descriptor::SchemaGraph;
use crate::error::{GenerateError, GenerateResult};
use crate::model::ServerSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Roles and features required to call one RPC
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    #[serde(rename = "Roles")]
    pub roles: Vec<String>,
    #[serde(rename = "Features")]
    pub features: Vec<String>,
}

/// Service name → input type name → permission
pub type PermissionMap = BTreeMap<String, BTreeMap<String, Permission>>;

/// Collect the permission map of a file's services.
///
/// Entries are keyed by input type; when two RPCs of a service share an
/// input type the later one wins.
#[must_use]
pub fn build_permission_map(servers: &[ServerSpec<'_>], graph: &SchemaGraph<'_>) -> PermissionMap {
    let mut map = PermissionMap::new();
    for server in servers {
        let entries = map.entry(server.service.name.clone()).or_default();
        for rpc in &server.rpcs {
            let input = component_name(graph, &rpc.input.full_name);
            let permission = Permission {
                roles: rpc.roles.clone(),
                features: rpc.features.clone(),
            };
            if let Some(previous) = entries.insert(input.clone(), permission) {
                warn!(
                    service = %server.service.name,
                    input = %input,
                    replaced_roles = ?previous.roles,
                    "Input type shared by several RPCs; keeping the last permission entry"
                );
            }
        }
    }
    map
}

/// Render the permission map as JSON
pub fn render_permissions(
    servers: &[ServerSpec<'_>],
    graph: &SchemaGraph<'_>,
    pretty: bool,
) -> GenerateResult<String> {
    let map = build_permission_map(servers, graph);
    let json = if pretty {
        serde_json::to_string_pretty(&map)
    } else {
        serde_json::to_string(&map)
    };
    json.map_err(|e| GenerateError::Document {
        detail: format!("failed to write permission map: {e}"),
    })
}
