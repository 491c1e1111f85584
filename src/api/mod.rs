//! API layer
//!
//! Turns an explicit [`Request`] into a response [`Envelope`]:
//!
//! - `GET /users` - list (paginated)
//! - `GET /users/{id}` - read one
//! - `POST /users` - create
//! - `DELETE /users/{id}` - delete
//! - `OPTIONS *` - CORS preflight

mod errors;
mod handler;
mod params;
mod request;
mod response;
mod router;

pub use errors::{ApiError, ApiResult};
pub use handler::UserHandler;
pub use params::{ListParams, CURSOR_PARAM, LIMIT_PARAM, MAX_LIMIT};
pub use request::{EventError, Request};
pub use response::{Envelope, UserListResponse, CORS_HEADERS, JSON_CONTENT_TYPE};
pub use router::{Route, Router};
