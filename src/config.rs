//! Generator configuration
//!
//! Settings that shape the emitted artifacts, read from a TOML file that sits
//! alongside the descriptor bundle (`protoroute.toml`) or is passed with
//! `--config`. Every key is optional.
//!
//! ```toml
//! types_path = "crate::pb::widgets"
//! runtime_path = "protoroute::runtime"
//! openapi_version = "1.0"
//! strip_nulls = true
//! pretty_json = true
//! emit_permissions = true
//! preserve_paths = false
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up beside the bundle
pub const CONFIG_FILE_NAME: &str = "protoroute.toml";

/// Options of one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Rust path the generated message types live under (prost output)
    pub types_path: String,
    /// Rust path of this crate's runtime module as seen by generated code
    pub runtime_path: String,
    /// `info.version` of the OpenAPI document
    pub openapi_version: String,
    /// Drop null values from the JSON document
    pub strip_nulls: bool,
    /// Pretty-print JSON artifacts
    pub pretty_json: bool,
    /// Emit the permission map artifact
    pub emit_permissions: bool,
    /// Keep the IDL file's directories in output names instead of flattening
    pub preserve_paths: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            types_path: "super".to_string(),
            runtime_path: "protoroute::runtime".to_string(),
            openapi_version: "1.0".to_string(),
            strip_nulls: true,
            pretty_json: true,
            emit_permissions: true,
            preserve_paths: false,
        }
    }
}

/// Load a configuration file
///
/// Returns `Ok(None)` if the file does not exist, `Err` if it exists but
/// fails to parse.
pub fn load_config(config_path: &Path) -> anyhow::Result<Option<GeneratorConfig>> {
    if !config_path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(config_path).with_context(|| {
        format!("Failed to read generator config: {}", config_path.display())
    })?;

    let config: GeneratorConfig = toml::from_str(&contents).with_context(|| {
        format!("Failed to parse generator config: {}", config_path.display())
    })?;

    Ok(Some(config))
}

/// Look for `protoroute.toml` in the bundle's directory
#[must_use]
pub fn auto_detect_config_path(bundle_path: &Path) -> Option<PathBuf> {
    let dir = bundle_path.parent()?;
    let config_path = dir.join(CONFIG_FILE_NAME);
    config_path.exists().then_some(config_path)
}

/// Resolve and load the configuration of a run
///
/// Priority:
/// 1. Explicitly provided path (via CLI); it must exist
/// 2. Auto-detected alongside the bundle
/// 3. Defaults
pub fn resolve_config(explicit: Option<&Path>, bundle_path: &Path) -> anyhow::Result<GeneratorConfig> {
    if let Some(path) = explicit {
        return load_config(path)?
            .with_context(|| format!("Config file not found: {}", path.display()));
    }
    match auto_detect_config_path(bundle_path) {
        Some(path) => Ok(load_config(&path)?.unwrap_or_default()),
        None => Ok(GeneratorConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.runtime_path, "protoroute::runtime");
        assert_eq!(config.openapi_version, "1.0");
        assert!(config.strip_nulls);
        assert!(config.emit_permissions);
        assert!(!config.preserve_paths);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "types_path = \"crate::pb\"\nstrip_nulls = false\n").unwrap();
        let config = load_config(&path).unwrap().unwrap();
        assert_eq!(config.types_path, "crate::pb");
        assert!(!config.strip_nulls);
        assert!(config.pretty_json);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "typo_path = \"x\"\n").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_resolution_order() {
        let dir = tempdir().unwrap();
        let bundle = dir.path().join("bundle.yaml");
        assert_eq!(
            resolve_config(None, &bundle).unwrap(),
            GeneratorConfig::default()
        );

        fs::write(dir.path().join(CONFIG_FILE_NAME), "openapi_version = \"2.1\"\n").unwrap();
        assert_eq!(resolve_config(None, &bundle).unwrap().openapi_version, "2.1");

        let explicit = dir.path().join("missing.toml");
        assert!(resolve_config(Some(&explicit), &bundle).is_err());
    }
}
