use crate::config::{resolve_config, GeneratorConfig};
use crate::descriptor::{load_bundle, SchemaGraph};
use crate::generator::{generate_bundle, write_outputs, ArtifactKind, GeneratedFile};
use crate::model::{build_server_specs, Parameter, ServerSpec};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

/// Command-line interface for protoroute
///
/// Generates HTTP binding code, OpenAPI documents and permission maps from
/// a descriptor bundle.
#[derive(Parser, Debug)]
#[command(name = "protoroute-gen", version)]
#[command(about = "protoroute HTTP binding generator", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate handler source, OpenAPI documents and permission maps
    Generate {
        /// Path to the descriptor bundle (YAML or JSON)
        #[arg(short, long)]
        bundle: PathBuf,

        /// Output directory for the generated artifacts
        #[arg(short, long)]
        output: PathBuf,

        /// Path to the generator config (protoroute.toml)
        /// If not provided, will auto-detect alongside the bundle
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Overwrite existing files
        #[arg(short, long, default_value_t = false)]
        force: bool,

        /// Print what would be written without touching the filesystem
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Rust path of the generated message types (overrides the config)
        #[arg(long)]
        types_path: Option<String>,

        /// Do not emit permission maps (overrides the config)
        #[arg(long, default_value_t = false)]
        no_permissions: bool,
    },
    /// Run every generation pass and report, writing nothing
    Check {
        /// Path to the descriptor bundle (YAML or JSON)
        #[arg(short, long)]
        bundle: PathBuf,
    },
    /// Print the parameter trees of every routed RPC
    Inspect {
        /// Path to the descriptor bundle (YAML or JSON)
        #[arg(short, long)]
        bundle: PathBuf,

        /// Only show this service
        #[arg(short, long)]
        service: Option<String>,
    },
}

/// Config of a `generate` run: file values with CLI overrides applied
pub fn generate_config(
    bundle: &Path,
    config: Option<&Path>,
    types_path: Option<&str>,
    no_permissions: bool,
) -> anyhow::Result<GeneratorConfig> {
    let mut resolved = resolve_config(config, bundle)?;
    if let Some(types_path) = types_path {
        resolved.types_path = types_path.to_string();
    }
    if no_permissions {
        resolved.emit_permissions = false;
    }
    Ok(resolved)
}

fn parameter_flags(param: &Parameter<'_>) -> String {
    let mut flags = Vec::new();
    if param.is_path {
        flags.push("path");
    }
    if param.is_optional {
        flags.push("optional");
    }
    if param.is_list {
        flags.push("list");
    }
    if flags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", flags.join(", "))
    }
}

fn describe_parameters(out: &mut String, params: &[Parameter<'_>], depth: usize) {
    let indent = "  ".repeat(depth);
    for param in params {
        let kind = match &param.tag {
            Some(tag) => tag.to_string(),
            None => "message".to_string(),
        };
        out.push_str(&format!(
            "{indent}{} -> {}  {kind}{}\n",
            param.requested_key,
            param.full_path,
            parameter_flags(param)
        ));
        describe_parameters(out, &param.children, depth + 1);
    }
}

/// Human-readable parameter trees, optionally limited to one service
#[must_use]
pub fn describe_servers(servers: &[ServerSpec<'_>], service: Option<&str>) -> String {
    let mut out = String::new();
    for server in servers
        .iter()
        .filter(|s| service.is_none_or(|name| s.service.name == name))
    {
        for rpc in &server.rpcs {
            out.push_str(&format!("{}  {} {}\n", rpc.rpc_name(), rpc.verb, rpc.path));
            describe_parameters(&mut out, &rpc.parameters, 1);
        }
    }
    out
}

fn count_kind(files: &[GeneratedFile], kind: ArtifactKind) -> usize {
    files.iter().filter(|f| f.kind == kind).count()
}

/// Execute a parsed CLI command
///
/// # Errors
///
/// Returns an error if:
/// - The bundle or config cannot be read or parsed
/// - A generation pass fails (nothing is written in that case)
/// - Writing an artifact fails
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate {
            bundle,
            output,
            config,
            force,
            dry_run,
            types_path,
            no_permissions,
        } => {
            let descriptors = load_bundle(&bundle)?;
            let config = generate_config(
                &bundle,
                config.as_deref(),
                types_path.as_deref(),
                no_permissions,
            )?;
            let files = generate_bundle(&descriptors, &config)
                .with_context(|| format!("Generation failed for {}", bundle.display()))?;

            if dry_run {
                for file in &files {
                    println!(
                        "{} ({}, {} bytes)",
                        output.join(&file.name).display(),
                        file.kind,
                        file.contents.len()
                    );
                }
                return Ok(());
            }

            let summary = write_outputs(&output, &files, force)?;
            info!(
                output = %output.display(),
                written = summary.written.len(),
                skipped = summary.skipped.len(),
                "Generation complete"
            );
            Ok(())
        }
        Commands::Check { bundle } => {
            let descriptors = load_bundle(&bundle)?;
            let config = resolve_config(None, &bundle)?;
            let files = generate_bundle(&descriptors, &config)
                .with_context(|| format!("Generation failed for {}", bundle.display()))?;
            println!(
                "{}: {} file(s) with routes, {} artifact(s)",
                bundle.display(),
                count_kind(&files, ArtifactKind::Handlers),
                files.len()
            );
            Ok(())
        }
        Commands::Inspect { bundle, service } => {
            let descriptors = load_bundle(&bundle)?;
            let graph = SchemaGraph::new(&descriptors);
            for file in descriptors.targets() {
                let servers = build_server_specs(file, &graph)
                    .with_context(|| format!("Failed to build routes of {}", file.name))?;
                let text = describe_servers(&servers, service.as_deref());
                if !text.is_empty() {
                    println!("# {}", file.name);
                    print!("{text}");
                }
            }
            Ok(())
        }
    }
}
