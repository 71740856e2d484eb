use super::handlers::render_handlers;
use super::openapi::render_openapi;
use super::permissions::render_permissions;
use crate::config::GeneratorConfig;
use crate::descriptor::{DescriptorBundle, FileDescriptor, SchemaGraph};
use crate::error::GenerateResult;
use crate::model::build_server_specs;
use anyhow::Context;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Kind of a generated artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Handlers,
    OpenApiYaml,
    OpenApiJson,
    Permissions,
}

impl ArtifactKind {
    fn suffix(self) -> &'static str {
        match self {
            ArtifactKind::Handlers => "_http.rs",
            ArtifactKind::OpenApiYaml => ".openapi.yaml",
            ArtifactKind::OpenApiJson => ".openapi.json",
            ArtifactKind::Permissions => ".permissions.json",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArtifactKind::Handlers => "handlers",
            ArtifactKind::OpenApiYaml => "openapi-yaml",
            ArtifactKind::OpenApiJson => "openapi-json",
            ArtifactKind::Permissions => "permissions",
        };
        write!(f, "{s}")
    }
}

/// One output buffer, named relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub name: PathBuf,
    pub kind: ArtifactKind,
    /// IDL file the artifact was generated from
    pub source: String,
    pub contents: String,
}

/// Output stem of an IDL file: extension dropped, directories flattened
/// with `_` unless `preserve_paths`.
///
/// ```rust
/// use protoroute::generator::output_stem;
/// assert_eq!(output_stem("widgets/v1/widgets.proto", false), "widgets_v1_widgets");
/// assert_eq!(output_stem("widgets/v1/widgets.proto", true), "widgets/v1/widgets");
/// ```
#[must_use]
pub fn output_stem(file_name: &str, preserve_paths: bool) -> String {
    let stem = file_name
        .rsplit_once('.')
        .filter(|(_, ext)| !ext.contains('/'))
        .map_or(file_name, |(stem, _)| stem);
    if preserve_paths {
        stem.to_string()
    } else {
        stem.replace('/', "_")
    }
}

/// Run the generation pass of one IDL file.
///
/// Returns no artifacts for a file without routed RPCs. The pass has its own
/// schema registry; nothing is shared with other files.
pub fn generate_file(
    file: &FileDescriptor,
    graph: &SchemaGraph<'_>,
    config: &GeneratorConfig,
) -> GenerateResult<Vec<GeneratedFile>> {
    let servers = build_server_specs(file, graph)?;
    if servers.is_empty() {
        debug!(file = %file.name, "No routed RPCs; skipping");
        return Ok(Vec::new());
    }

    let stem = output_stem(&file.name, config.preserve_paths);
    let artifact = |kind: ArtifactKind, contents: String| GeneratedFile {
        name: PathBuf::from(format!("{stem}{}", kind.suffix())),
        kind,
        source: file.name.clone(),
        contents,
    };

    let handlers = render_handlers(file, &servers, graph, config)?;
    let document = render_openapi(file, &servers, graph, config)?;
    let mut out = vec![
        artifact(ArtifactKind::Handlers, handlers),
        artifact(ArtifactKind::OpenApiYaml, document.yaml),
        artifact(ArtifactKind::OpenApiJson, document.json),
    ];
    if config.emit_permissions {
        let permissions = render_permissions(&servers, graph, config.pretty_json)?;
        out.push(artifact(ArtifactKind::Permissions, permissions));
    }

    info!(
        file = %file.name,
        services = servers.len(),
        rpcs = servers.iter().map(|s| s.rpcs.len()).sum::<usize>(),
        schemas = document.schema_count,
        artifacts = out.len(),
        "Generated file"
    );
    Ok(out)
}

/// Run every file pass of a bundle in memory.
///
/// The first failing pass aborts the run; no partial result is returned.
pub fn generate_bundle(
    bundle: &DescriptorBundle,
    config: &GeneratorConfig,
) -> GenerateResult<Vec<GeneratedFile>> {
    for requested in &bundle.generate {
        if !bundle.files.iter().any(|f| &f.name == requested) {
            warn!(file = %requested, "Requested file is not part of the bundle");
        }
    }

    let graph = SchemaGraph::new(bundle);
    debug!(messages = graph.message_count(), "Indexed schema graph");
    let mut out = Vec::new();
    for file in bundle.targets() {
        out.extend(generate_file(file, &graph, config)?);
    }
    Ok(out)
}

/// Files written and skipped by [`write_outputs`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Write generated files below `dir`.
///
/// Existing files are left alone unless `force` is set.
pub fn write_outputs(
    dir: &Path,
    files: &[GeneratedFile],
    force: bool,
) -> anyhow::Result<WriteSummary> {
    let mut summary = WriteSummary::default();
    for file in files {
        let path = dir.join(&file.name);
        if path.exists() && !force {
            warn!(path = %path.display(), "Skipping existing file");
            summary.skipped.push(path);
            continue;
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(&path, &file.contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), kind = %file.kind, "Wrote artifact");
        summary.written.push(path);
    }
    Ok(summary)
}
