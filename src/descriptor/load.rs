use super::types::{DescriptorBundle, EnumDescriptor, MessageDescriptor};
use anyhow::Context;
use std::path::Path;
use tracing::debug;

/// Load a descriptor bundle from a YAML or JSON file.
///
/// The extension decides the format: `.yaml`/`.yml` are read with
/// `serde_yaml`, anything else as JSON. Full names and JSON names are filled in
/// before the bundle is returned.
pub fn load_bundle(path: &Path) -> anyhow::Result<DescriptorBundle> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read descriptor bundle {path:?}"))?;
    let is_yaml = path
        .extension()
        .map(|ext| ext == "yaml" || ext == "yml")
        .unwrap_or(false);
    let bundle = parse_bundle(&content, is_yaml)
        .with_context(|| format!("Failed to parse descriptor bundle {path:?}"))?;
    debug!(
        path = %path.display(),
        files = bundle.files.len(),
        "Loaded descriptor bundle"
    );
    Ok(bundle)
}

/// Parse and normalize a descriptor bundle from text
pub fn parse_bundle(content: &str, is_yaml: bool) -> anyhow::Result<DescriptorBundle> {
    let mut bundle: DescriptorBundle = if is_yaml {
        serde_yaml::from_str(content)?
    } else {
        serde_json::from_str(content)?
    };
    normalize_bundle(&mut bundle);
    Ok(bundle)
}

/// Compute full names of every message/enum and default JSON names of fields.
pub fn normalize_bundle(bundle: &mut DescriptorBundle) {
    for file in &mut bundle.files {
        let prefix = file.package.clone();
        for msg in &mut file.messages {
            normalize_message(msg, &prefix);
        }
        for en in &mut file.enums {
            normalize_enum(en, &prefix);
        }
    }
}

fn qualify(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn normalize_message(msg: &mut MessageDescriptor, prefix: &str) {
    msg.full_name = qualify(prefix, &msg.name);
    for field in &mut msg.fields {
        if field.json_name.is_empty() {
            field.json_name = json_name(&field.name);
        }
    }
    let own = msg.full_name.clone();
    for nested in &mut msg.messages {
        normalize_message(nested, &own);
    }
    for en in &mut msg.enums {
        normalize_enum(en, &own);
    }
}

fn normalize_enum(en: &mut EnumDescriptor, prefix: &str) {
    en.full_name = qualify(prefix, &en.name);
}

/// JSON name of a field as the protobuf compiler derives it.
///
/// Underscores are dropped and the following character upper-cased; every
/// other character is kept as written.
///
/// ```rust
/// use protoroute::descriptor::json_name;
/// assert_eq!(json_name("created_at"), "createdAt");
/// assert_eq!(json_name("id"), "id");
/// ```
#[must_use]
pub fn json_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
