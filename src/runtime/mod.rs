//! # Runtime Module
//!
//! Support library linked by generated handler source. Generated binders read
//! parameters through [`ParamSource`], parse them with the functions in
//! [`parse`], report failures as [`RouteError`] and register themselves on any
//! [`HttpRouter`]. [`RouteTable`] is a small regex router implementing
//! [`HttpRouter`] for tests and simple embeddings; real servers implement the
//! trait over their own routing layer.

mod error;
pub mod parse;
mod params;
mod request;
mod router;
mod template;

pub use error::{ApiError, RouteError};
pub use params::{ParamSource, ParamVec, PathParams, QueryParams, MAX_INLINE_PARAMS};
pub use request::{HttpRequest, HttpResponse, RequestContext, RequestId, REQUEST_ID_HEADER};
pub use router::{Binder, HttpRouter, RouteTable};
pub use template::{
    parse_template, placeholder_names, template_pattern, PatternSegment, TemplateError,
    TemplatePart,
};

/// Error type of handler methods
pub use anyhow::Error as HandlerError;
pub use http::Method;
