//! # Descriptor Module
//!
//! The compiled IDL schema graph the generator consumes: files, services,
//! RPCs with their routing annotations, messages, fields and enums.
//!
//! The plugin host that talks to the IDL compiler is not part of this crate.
//! Its output is accepted as a *descriptor bundle*, a YAML or JSON document
//! with the same information, loaded by [`load_bundle`]. Every descriptor is
//! immutable once loaded; [`SchemaGraph`] indexes them by full name.

mod graph;
mod load;
mod types;

pub use graph::SchemaGraph;
pub use load::{json_name, load_bundle, normalize_bundle, parse_bundle};
pub use types::*;
