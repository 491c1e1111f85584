//! API response envelope
//!
//! Every reply, success or failure, leaves the service as an
//! [`Envelope`]: the status code verbatim, a fixed set of CORS headers,
//! and a JSON (or empty) body.

use std::collections::BTreeMap;

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::store::{Cursor, UserPage};
use crate::user::User;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// CORS headers attached to every envelope
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET,POST,DELETE,OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

const FALLBACK_BODY: &str = r#"{"message":"Internal Server Error"}"#;

/// Uniform response envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    status: StatusCode,
    headers: BTreeMap<String, String>,
    body: String,
}

impl Envelope {
    fn with_body(status: StatusCode, body: String, json: bool) -> Self {
        let mut headers: BTreeMap<String, String> = CORS_HEADERS
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        if json {
            headers.insert(CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string());
        }
        Self { status, headers, body }
    }

    /// JSON body with `Content-Type: application/json`
    pub fn json<T: Serialize + ?Sized>(status: StatusCode, payload: &T) -> Self {
        match serde_json::to_string(payload) {
            Ok(body) => Self::with_body(status, body, true),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response body");
                Self::with_body(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    FALLBACK_BODY.to_string(),
                    true,
                )
            }
        }
    }

    /// Empty body, no content type (204 and friends)
    pub fn empty(status: StatusCode) -> Self {
        Self::with_body(status, String::new(), false)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Gateway proxy shape: `{statusCode, headers, body}`
impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Envelope", 3)?;
        state.serialize_field("statusCode", &self.status.as_u16())?;
        state.serialize_field("headers", &self.headers)?;
        state.serialize_field("body", &self.body)?;
        state.end()
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!(header = %name, "Dropping unrepresentable header"),
            }
        }
        response
    }
}

/// Body of a successful list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub users: Vec<User>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Cursor>,
}

impl From<UserPage> for UserListResponse {
    fn from(page: UserPage) -> Self {
        Self {
            count: page.users.len(),
            users: page.users,
            next_cursor: page.next_cursor,
        }
    }
}
