use super::request::HttpResponse;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structured client-facing error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Application error code
    pub code: u16,
    /// Error class name (e.g. `MissingRequiredParametersError`)
    pub message: String,
    /// HTTP status to answer with
    pub status: u16,
    /// Human readable detail naming the offending field
    pub detail: String,
}

impl ApiError {
    #[must_use]
    pub fn new(status: u16, message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            code: status,
            message: message.into(),
            status,
            detail: detail.into(),
        }
    }

    /// A required path or query parameter was absent
    #[must_use]
    pub fn missing_required_parameter(key: &str) -> Self {
        Self::new(
            400,
            "MissingRequiredParametersError",
            format!("missing field(s): {key}"),
        )
    }

    /// A parameter was present but did not parse as its type
    #[must_use]
    pub fn unparsable_parameter(key: &str) -> Self {
        Self::new(
            400,
            "UnparsableParametersError",
            format!("failed to parse field(s): {key}"),
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.message, self.status, self.detail)
    }
}

impl std::error::Error for ApiError {}

/// Failure of a generated binder.
#[derive(Debug)]
pub enum RouteError {
    /// A required path/query parameter is absent (key as requested)
    MissingRequiredParameter(String),
    /// A path/query parameter failed its parser (key as requested)
    UnparsableParameter(String),
    /// The request body could not be decoded into the input message
    InvalidBody(String),
    /// The handler returned an error; passed through unchanged
    Handler(anyhow::Error),
    /// The result could not be serialised
    Write(String),
}

impl RouteError {
    /// HTTP status this error answers with
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            RouteError::MissingRequiredParameter(_)
            | RouteError::UnparsableParameter(_)
            | RouteError::InvalidBody(_) => 400,
            RouteError::Handler(err) => err
                .downcast_ref::<ApiError>()
                .map(|api| api.status)
                .unwrap_or(500),
            RouteError::Write(_) => 500,
        }
    }

    /// Structured body for this error
    #[must_use]
    pub fn to_api_error(&self) -> ApiError {
        match self {
            RouteError::MissingRequiredParameter(key) => ApiError::missing_required_parameter(key),
            RouteError::UnparsableParameter(key) => ApiError::unparsable_parameter(key),
            RouteError::InvalidBody(detail) => {
                ApiError::new(400, "InvalidBodyError", detail.clone())
            }
            RouteError::Handler(err) => match err.downcast_ref::<ApiError>() {
                Some(api) => api.clone(),
                None => ApiError::new(500, "InternalError", err.to_string()),
            },
            RouteError::Write(detail) => ApiError::new(500, "WriteError", detail.clone()),
        }
    }

    /// Render the error as a JSON response
    #[must_use]
    pub fn into_response(self) -> HttpResponse {
        let api = self.to_api_error();
        HttpResponse::json_value(self.status(), &api)
    }
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::MissingRequiredParameter(key) => {
                write!(f, "missing required parameter '{key}'")
            }
            RouteError::UnparsableParameter(key) => write!(f, "unparsable parameter '{key}'"),
            RouteError::InvalidBody(detail) => write!(f, "invalid request body: {detail}"),
            RouteError::Handler(err) => write!(f, "handler error: {err}"),
            RouteError::Write(detail) => write!(f, "failed to write response: {detail}"),
        }
    }
}

impl std::error::Error for RouteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouteError::Handler(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for RouteError {
    fn from(err: anyhow::Error) -> Self {
        RouteError::Handler(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binder_errors_are_client_errors() {
        let missing = RouteError::MissingRequiredParameter("createdAt".to_string());
        assert_eq!(missing.status(), 400);
        let body = missing.to_api_error();
        assert_eq!(body.message, "MissingRequiredParametersError");
        assert_eq!(body.detail, "missing field(s): createdAt");

        let bad = RouteError::UnparsableParameter("colors".to_string());
        assert_eq!(bad.to_api_error().detail, "failed to parse field(s): colors");
    }

    #[test]
    fn test_handler_api_error_keeps_status() {
        let err = RouteError::Handler(anyhow::Error::new(ApiError::new(
            404,
            "NotFound",
            "no such widget",
        )));
        assert_eq!(err.status(), 404);
        let resp = err.into_response();
        assert_eq!(resp.status, 404);
        let v: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
        assert_eq!(v["detail"], "no such widget");
    }

    #[test]
    fn test_other_handler_errors_are_internal() {
        let err = RouteError::from(anyhow::anyhow!("database down"));
        assert_eq!(err.status(), 500);
        assert_eq!(err.to_api_error().detail, "database down");
    }
}
