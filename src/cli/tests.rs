//! Unit tests for CLI commands

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::cli::{describe_servers, generate_config, Cli, Commands};
use crate::descriptor::{parse_bundle, SchemaGraph};
use crate::model::build_server_specs;
use clap::Parser;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_generate_command_parses() {
    let cli = Cli::try_parse_from([
        "protoroute-gen",
        "generate",
        "--bundle",
        "widgets.yaml",
        "--output",
        "gen",
    ])
    .unwrap();

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
            assert_eq!(bundle.to_string_lossy(), "widgets.yaml");
            assert_eq!(output.to_string_lossy(), "gen");
            assert!(config.is_none());
            assert!(!force);
            assert!(!dry_run);
            assert!(types_path.is_none());
            assert!(!no_permissions);
        }
        _ => panic!("Expected Generate command"),
    }
}

#[test]
fn test_generate_command_with_flags() {
    let cli = Cli::try_parse_from([
        "protoroute-gen",
        "generate",
        "-b",
        "widgets.yaml",
        "-o",
        "gen",
        "--config",
        "custom.toml",
        "--force",
        "--dry-run",
        "--types-path",
        "crate::pb",
        "--no-permissions",
    ])
    .unwrap();

    match cli.command {
        Commands::Generate {
            config,
            force,
            dry_run,
            types_path,
            no_permissions,
            ..
        } => {
            assert_eq!(config.unwrap().to_string_lossy(), "custom.toml");
            assert!(force);
            assert!(dry_run);
            assert_eq!(types_path.as_deref(), Some("crate::pb"));
            assert!(no_permissions);
        }
        _ => panic!("Expected Generate command"),
    }
}

#[test]
fn test_generate_requires_output() {
    let result = Cli::try_parse_from(["protoroute-gen", "generate", "--bundle", "w.yaml"]);
    assert!(result.is_err());
}

#[test]
fn test_check_and_inspect_commands() {
    let cli = Cli::try_parse_from(["protoroute-gen", "check", "--bundle", "w.yaml"]).unwrap();
    assert!(matches!(cli.command, Commands::Check { .. }));

    let cli = Cli::try_parse_from([
        "protoroute-gen",
        "inspect",
        "--bundle",
        "w.yaml",
        "--service",
        "WidgetService",
    ])
    .unwrap();
    match cli.command {
        Commands::Inspect { service, .. } => {
            assert_eq!(service.as_deref(), Some("WidgetService"));
        }
        _ => panic!("Expected Inspect command"),
    }
}

#[test]
fn test_cli_flags_override_config_file() {
    let dir = tempdir().unwrap();
    let bundle = dir.path().join("w.yaml");
    fs::write(dir.path().join("protoroute.toml"), "types_path = \"crate::a\"\n").unwrap();

    let config = generate_config(&bundle, None, None, false).unwrap();
    assert_eq!(config.types_path, "crate::a");
    assert!(config.emit_permissions);

    let config = generate_config(&bundle, None, Some("crate::b"), true).unwrap();
    assert_eq!(config.types_path, "crate::b");
    assert!(!config.emit_permissions);
}

#[test]
fn test_describe_servers() {
    let bundle = parse_bundle(
        r#"
files:
  - name: w.proto
    package: w
    messages:
      - name: Filter
        fields:
          - { name: owner_id, kind: string }
      - name: Req
        fields:
          - { name: id, kind: int64 }
          - { name: filter, kind: message, type_name: w.Filter }
          - { name: tags, kind: string, repeated: true }
    services:
      - name: Svc
        methods:
          - name: Find
            input_type: w.Req
            output_type: w.Req
            http: { method: GET, path: "/w/{id}", path_keys: { id: id } }
      - name: Other
        methods:
          - name: Find
            input_type: w.Req
            output_type: w.Req
            http: { method: DELETE, path: "/o/{id}", path_keys: { id: id } }
"#,
        true,
    )
    .unwrap();
    let graph = SchemaGraph::new(&bundle);
    let servers = build_server_specs(&bundle.files[0], &graph).unwrap();

    let text = describe_servers(&servers, Some("Svc"));
    assert_eq!(
        text,
        "Svc.Find  GET /w/{id}\n  id -> id  int64 [path]\n  filter -> filter  message\n    filter.ownerId -> filter.owner_id  string\n  tags -> tags  string [list]\n"
    );
    assert!(describe_servers(&servers, None).contains("Other.Find  DELETE /o/{id}"));
    assert!(describe_servers(&servers, Some("Missing")).is_empty());
}
