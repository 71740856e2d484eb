use super::error::RouteError;
use super::params::{PathParams, QueryParams};
use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use http::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Header carrying a caller supplied request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Strongly typed request identifier backed by ULID.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(pub ulid::Ulid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Parse from a header value; a missing or invalid value yields a new id.
    #[must_use]
    pub fn from_header_or_new(header_value: Option<&str>) -> Self {
        header_value
            .and_then(|s| s.parse::<RequestId>().ok())
            .unwrap_or_default()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RequestId(ulid::Ulid::from_string(s)?))
    }
}

impl Serialize for RequestId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RequestId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<RequestId>()
            .map_err(|_| serde::de::Error::custom("invalid request id"))
    }
}

/// Request-scoped context handed to every handler call.
///
/// Middleware may install one on the request; otherwise the binder derives
/// one from the request itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub method: Method,
    pub path: String,
    /// Values attached by middleware (caller identity, tenant, ...)
    pub attributes: BTreeMap<String, String>,
}

impl RequestContext {
    /// Context derived from the request line and the request id header
    #[must_use]
    pub fn from_request(req: &HttpRequest) -> Self {
        let header = req
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok());
        Self {
            request_id: RequestId::from_header_or_new(header),
            method: req.method.clone(),
            path: req.path.clone(),
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Transport-neutral HTTP request as seen by a generated binder.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Path without the query string
    pub path: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    query: QueryParams,
    path_params: PathParams,
    context: Option<RequestContext>,
}

impl HttpRequest {
    /// Build a request from a method and a request target (`/path?query`)
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (target, ""),
        };
        Self {
            method,
            path: path.to_string(),
            headers: HeaderMap::new(),
            body: Vec::new(),
            query: QueryParams::parse(query),
            path_params: PathParams::default(),
            context: None,
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Install a context (normally done by middleware)
    #[must_use]
    pub fn with_context(mut self, ctx: RequestContext) -> Self {
        self.context = Some(ctx);
        self
    }

    /// Replace the extracted path parameters (normally done by the router)
    #[must_use]
    pub fn with_path_params(mut self, params: PathParams) -> Self {
        self.path_params = params;
        self
    }

    #[must_use]
    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    #[must_use]
    pub fn path_params(&self) -> &PathParams {
        &self.path_params
    }

    /// Installed context, or one derived from the request
    #[must_use]
    pub fn context(&self) -> RequestContext {
        self.context
            .clone()
            .unwrap_or_else(|| RequestContext::from_request(self))
    }

    /// Decode the JSON body into the input message; an empty body yields the
    /// default message.
    pub fn decode_body<T: DeserializeOwned + Default>(&self) -> Result<T, RouteError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }
        serde_json::from_slice(&self.body).map_err(|e| RouteError::InvalidBody(e.to_string()))
    }
}

/// Response produced by a binder or the router.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Serialise `value` as a JSON response
    pub fn json<T: Serialize>(status: u16, value: &T) -> Result<Self, RouteError> {
        let body = serde_json::to_vec(value).map_err(|e| RouteError::Write(e.to_string()))?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(Self {
            status,
            headers,
            body,
        })
    }

    /// JSON response for values whose serialisation cannot fail
    #[must_use]
    pub fn json_value<T: Serialize>(status: u16, value: &T) -> Self {
        Self::json(status, value).unwrap_or_else(|_| Self {
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
        })
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct Input {
        #[serde(default)]
        name: String,
    }

    #[test]
    fn test_target_is_split() {
        let req = HttpRequest::new(Method::GET, "/widgets/7?name=a&name=b");
        assert_eq!(req.path, "/widgets/7");
        assert_eq!(req.query().get("name"), Some("a"));
    }

    #[test]
    fn test_context_falls_back_to_request() {
        let id = RequestId::new();
        let req = HttpRequest::new(Method::GET, "/x").with_header(REQUEST_ID_HEADER, &id.to_string());
        let ctx = req.context();
        assert_eq!(ctx.request_id, id);
        assert_eq!(ctx.path, "/x");

        let mut installed = RequestContext::from_request(&req);
        installed.attributes.insert("tenant".into(), "acme".into());
        let req = req.with_context(installed);
        assert_eq!(req.context().attribute("tenant"), Some("acme"));
    }

    #[test]
    fn test_invalid_request_id_header_yields_new_id() {
        let req = HttpRequest::new(Method::GET, "/x").with_header(REQUEST_ID_HEADER, "nope");
        let a = req.context().request_id;
        let b = req.context().request_id;
        assert_ne!(a, b);
    }

    #[test]
    fn test_decode_body() {
        let req = HttpRequest::new(Method::POST, "/x");
        assert_eq!(req.decode_body::<Input>().unwrap(), Input::default());
        let req = req.with_body(r#"{"name":"w"}"#);
        assert_eq!(req.decode_body::<Input>().unwrap().name, "w");
        let req = HttpRequest::new(Method::POST, "/x").with_body("{oops");
        assert!(matches!(
            req.decode_body::<Input>(),
            Err(RouteError::InvalidBody(_))
        ));
    }

    #[test]
    fn test_json_response() {
        let resp = HttpResponse::json(200, &serde_json::json!({"ok": true})).unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.content_type(), Some("application/json"));
        assert_eq!(resp.body, br#"{"ok":true}"#);
    }
}
