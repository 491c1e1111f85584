//! API request value
//!
//! One inbound invocation, with every field the router needs made
//! explicit. Gateway-style event JSON is parsed here and rejected early
//! when it lacks a method or path.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Malformed invocation event
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("Invalid event JSON: {0}")]
    InvalidJson(String),

    #[error("Event has no HTTP method")]
    MissingMethod,

    #[error("Event has no request path")]
    MissingPath,

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Invalid request path: {0}")]
    InvalidPath(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Invalid base64 body: {0}")]
    InvalidBody(String),
}

/// An inbound request
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Path without query string, starting with `/`
    pub path: String,
    /// Decoded query parameters
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: HashMap::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `payload` as the JSON body
    pub fn with_json(self, payload: &Value) -> Self {
        self.with_body(payload.to_string())
    }

    /// Parse a gateway event from JSON text
    pub fn from_event_str(json: &str) -> Result<Self, EventError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| EventError::InvalidJson(e.to_string()))?;
        Self::from_event(value)
    }

    /// Parse a gateway event.
    ///
    /// Accepts REST-style events (`httpMethod`, `path`), HTTP-API-style
    /// events (`requestContext.http.method`, `rawPath`), and falls back to
    /// `routeKey` (`"POST /users"`) for either part that is still missing.
    pub fn from_event(event: Value) -> Result<Self, EventError> {
        let raw: RawEvent =
            serde_json::from_value(event).map_err(|e| EventError::InvalidJson(e.to_string()))?;

        let route_key = raw
            .route_key
            .as_deref()
            .and_then(|key| key.split_once(' '))
            .map(|(method, path)| (method.to_string(), path.to_string()));
        let context_http = raw.request_context.and_then(|ctx| ctx.http);

        let method = raw
            .http_method
            .or_else(|| context_http.as_ref().and_then(|http| http.method.clone()))
            .or_else(|| route_key.as_ref().map(|(method, _)| method.clone()))
            .ok_or(EventError::MissingMethod)?;
        let path = raw
            .path
            .or(raw.raw_path)
            .or_else(|| context_http.and_then(|http| http.path))
            .or_else(|| route_key.map(|(_, path)| path))
            .ok_or(EventError::MissingPath)?;

        let method = Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
            .map_err(|_| EventError::InvalidMethod(method))?;
        if !path.starts_with('/') {
            return Err(EventError::InvalidPath(path));
        }

        let mut headers = HeaderMap::new();
        for (name, value) in raw.headers.unwrap_or_default() {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| EventError::InvalidHeader(name.clone()))?;
            let header_value =
                HeaderValue::from_str(&value).map_err(|_| EventError::InvalidHeader(name))?;
            headers.insert(header_name, header_value);
        }

        let body = match raw.body {
            Some(body) if raw.is_base64_encoded => Some(Bytes::from(
                STANDARD
                    .decode(body.as_bytes())
                    .map_err(|e| EventError::InvalidBody(e.to_string()))?,
            )),
            Some(body) => Some(Bytes::from(body)),
            None => None,
        };

        Ok(Self {
            method,
            path,
            query: raw.query_string_parameters.unwrap_or_default(),
            headers,
            body,
        })
    }
}

/// Raw event for parsing; every field optional, resolved above
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    #[serde(default)]
    http_method: Option<String>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    raw_path: Option<String>,
    #[serde(default)]
    route_key: Option<String>,
    #[serde(default)]
    request_context: Option<RawRequestContext>,
    #[serde(default)]
    query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    headers: Option<HashMap<String, String>>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    is_base64_encoded: bool,
}

#[derive(Debug, Default, Deserialize)]
struct RawRequestContext {
    #[serde(default)]
    http: Option<RawHttp>,
}

#[derive(Debug, Default, Deserialize)]
struct RawHttp {
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rest_style_event() {
        let request = Request::from_event(json!({
            "httpMethod": "POST",
            "path": "/users",
            "headers": {"Content-Type": "application/json"},
            "queryStringParameters": null,
            "body": "{\"name\":\"Ada\"}"
        }))
        .unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/users");
        assert_eq!(request.headers["content-type"], "application/json");
        assert_eq!(request.body.as_deref(), Some(&b"{\"name\":\"Ada\"}"[..]));
        assert!(request.query.is_empty());
    }

    #[test]
    fn test_http_api_style_event() {
        let request = Request::from_event(json!({
            "routeKey": "GET /users",
            "rawPath": "/prod/users",
            "requestContext": {"http": {"method": "GET", "path": "/prod/users"}},
            "queryStringParameters": {"limit": "5"}
        }))
        .unwrap();

        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "/prod/users");
        assert_eq!(request.query.get("limit").map(String::as_str), Some("5"));
    }

    #[test]
    fn test_route_key_fallback() {
        let request = Request::from_event(json!({"routeKey": "delete /users/abc"})).unwrap();
        assert_eq!(request.method, Method::DELETE);
        assert_eq!(request.path, "/users/abc");
    }

    #[test]
    fn test_base64_body() {
        let request = Request::from_event(json!({
            "httpMethod": "POST",
            "path": "/users",
            "isBase64Encoded": true,
            "body": STANDARD.encode("{}")
        }))
        .unwrap();
        assert_eq!(request.body.as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn test_missing_parts_fail_fast() {
        assert_eq!(
            Request::from_event(json!({"path": "/users"})).unwrap_err(),
            EventError::MissingMethod
        );
        assert_eq!(
            Request::from_event(json!({"httpMethod": "GET"})).unwrap_err(),
            EventError::MissingPath
        );
        assert_eq!(
            Request::from_event(json!({"routeKey": "$default"})).unwrap_err(),
            EventError::MissingMethod
        );
    }

    #[test]
    fn test_invalid_parts() {
        assert!(matches!(
            Request::from_event(json!({"httpMethod": "GET", "path": "users"})),
            Err(EventError::InvalidPath(_))
        ));
        assert!(matches!(
            Request::from_event(json!({"httpMethod": "G E T", "path": "/users"})),
            Err(EventError::InvalidMethod(_))
        ));
        assert!(matches!(
            Request::from_event(json!({
                "httpMethod": "POST", "path": "/users",
                "isBase64Encoded": true, "body": "***"
            })),
            Err(EventError::InvalidBody(_))
        ));
        assert!(matches!(
            Request::from_event_str("{not json"),
            Err(EventError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_builder() {
        let request = Request::new(Method::GET, "/users").with_query("limit", "2");
        assert_eq!(request.query["limit"], "2");
        assert!(request.body.is_none());
    }
}
