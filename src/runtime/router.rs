//! Route registration seam and a regex-backed route table.

use super::error::RouteError;
use super::params::{ParamVec, PathParams};
use super::request::{HttpRequest, HttpResponse};
use super::template::{parse_template, placeholder_names, template_pattern, TemplateError};
use http::Method;
use percent_encoding::percent_decode_str;
use regex::{Captures, Regex};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A generated binder: extracts the input, calls the handler, renders JSON.
pub type Binder = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse, RouteError> + Send + Sync>;

/// Anything generated `register_*_http_server` functions can wire routes into.
///
/// `template` is the runtime URL template of the route as annotated, in the
/// grammar of [`parse_template`](super::parse_template).
pub trait HttpRouter {
    fn route(&mut self, method: Method, template: &str, binder: Binder);
}

struct CompiledRoute {
    method: Method,
    template: String,
    regex: Regex,
    param_names: Vec<Arc<str>>,
    binder: Binder,
}

/// Minimal router matching requests against compiled URL templates in
/// registration order.
#[derive(Default)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Registered `(method, template)` pairs in registration order
    pub fn routes(&self) -> impl Iterator<Item = (&Method, &str)> {
        self.routes.iter().map(|r| (&r.method, r.template.as_str()))
    }

    /// Compile a URL template into an anchored regex and its placeholder names.
    ///
    /// Uses the grammar of [`parse_template`], so every template the
    /// generator accepts routes here.
    pub fn path_to_regex(template: &str) -> Result<(Regex, Vec<String>), TemplateError> {
        let parts = parse_template(template)?;
        let regex = Regex::new(&template_pattern(&parts)).map_err(|e| TemplateError::Regex {
            detail: e.to_string(),
        })?;
        Ok((regex, placeholder_names(&parts)))
    }

    /// Percent-decode the captured values of a matched route.
    ///
    /// A value that does not decode to UTF-8 is unparsable for its parameter.
    fn decode_params(route: &CompiledRoute, caps: &Captures<'_>) -> Result<ParamVec, RouteError> {
        route
            .param_names
            .iter()
            .enumerate()
            .filter_map(|(i, name)| caps.get(i + 1).map(|m| (name, m.as_str())))
            .map(|(name, raw)| {
                percent_decode_str(raw)
                    .decode_utf8()
                    .map(|value| (Arc::clone(name), value.into_owned()))
                    .map_err(|_| RouteError::UnparsableParameter(name.to_string()))
            })
            .collect()
    }

    fn match_route(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(&CompiledRoute, Result<ParamVec, RouteError>)> {
        self.routes
            .iter()
            .filter(|r| r.method == *method)
            .find_map(|r| {
                let caps = r.regex.captures(path)?;
                Some((r, Self::decode_params(r, &caps)))
            })
    }

    /// Route a request to its binder and render the outcome.
    ///
    /// Unmatched requests answer 404; binder errors are rendered through
    /// [`RouteError::into_response`].
    pub fn dispatch(&self, req: HttpRequest) -> HttpResponse {
        let Some((route, params)) = self.match_route(&req.method, &req.path) else {
            debug!(method = %req.method, path = %req.path, "No route matched");
            return HttpResponse::json_value(
                404,
                &serde_json::json!({ "error": "Not Found", "path": req.path }),
            );
        };

        let params = match params {
            Ok(params) => params,
            Err(err) => {
                debug!(
                    method = %req.method,
                    template = %route.template,
                    error = %err,
                    "Path value rejected"
                );
                return err.into_response();
            }
        };
        let req = req.with_path_params(PathParams::new(params));
        match (route.binder)(&req) {
            Ok(resp) => {
                debug!(
                    method = %req.method,
                    template = %route.template,
                    status = resp.status,
                    "Request handled"
                );
                resp
            }
            Err(err) => {
                debug!(
                    method = %req.method,
                    template = %route.template,
                    error = %err,
                    "Binder failed"
                );
                err.into_response()
            }
        }
    }
}

impl HttpRouter for RouteTable {
    fn route(&mut self, method: Method, template: &str, binder: Binder) {
        match Self::path_to_regex(template) {
            Ok((regex, names)) => {
                info!(method = %method, template, "Route registered");
                self.routes.push(CompiledRoute {
                    method,
                    template: template.to_string(),
                    regex,
                    param_names: names.into_iter().map(Arc::from).collect(),
                    binder,
                });
            }
            Err(err) => {
                warn!(method = %method, template, error = %err, "Skipping route with invalid template");
            }
        }
    }
}
