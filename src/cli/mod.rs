//! # CLI Module
//!
//! Command-line interface of the `protoroute-gen` binary.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! Generate handler source, OpenAPI documents and permission maps:
//!
//! ```bash
//! protoroute-gen generate --bundle widgets.yaml --output gen/
//! ```
//!
//! Options:
//! - `--bundle <FILE>` - Descriptor bundle (required)
//! - `--output <DIR>` - Output directory (required)
//! - `--config <FILE>` - Generator config; defaults to `protoroute.toml` beside the bundle
//! - `--force` - Overwrite existing files
//! - `--dry-run` - List the artifacts without writing them
//! - `--types-path <PATH>` - Rust path of the generated message types
//! - `--no-permissions` - Skip the permission map
//!
//! ### `check`
//!
//! Run every generation pass without writing anything:
//!
//! ```bash
//! protoroute-gen check --bundle widgets.yaml
//! ```
//!
//! ### `inspect`
//!
//! Print the parameter trees of the routed RPCs:
//!
//! ```bash
//! protoroute-gen inspect --bundle widgets.yaml --service WidgetService
//! ```
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use protoroute::cli::{Cli, run_cli};
//! use clap::Parser;
//!
//! run_cli(Cli::parse())?;
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{describe_servers, generate_config, run_cli, Cli, Commands};
