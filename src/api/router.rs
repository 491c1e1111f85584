//! Request routing
//!
//! Maps a method and path to exactly one operation. Holds no state
//! besides the base path it was configured with.

use axum::http::Method;

/// Collection segment every user route lives under
pub const USERS_SEGMENT: &str = "users";

/// The operation a request resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    ListUsers,
    GetUser(String),
    CreateUser,
    DeleteUser(String),
    /// CORS preflight for any path
    Preflight,
    /// Id-scoped route with an absent or empty id
    MissingId,
    NotFound,
}

/// Method + path router
#[derive(Debug, Clone, Default)]
pub struct Router {
    base_path: String,
}

impl Router {
    /// `base_path` is stripped from every request path before matching
    /// (e.g. a gateway stage like `/prod`). Empty means none.
    pub fn new(base_path: impl Into<String>) -> Self {
        let base_path = base_path.into().trim_end_matches('/').to_string();
        Self { base_path }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    fn strip_base<'a>(&self, path: &'a str) -> Option<&'a str> {
        if self.base_path.is_empty() {
            return Some(path);
        }
        match path.strip_prefix(&self.base_path) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => Some(rest),
            _ => None,
        }
    }

    pub fn route(&self, method: &Method, path: &str) -> Route {
        if *method == Method::OPTIONS {
            return Route::Preflight;
        }

        let Some(rest) = self.strip_base(path) else {
            return Route::NotFound;
        };
        let rest = rest.strip_prefix('/').unwrap_or(rest);

        let mut segments = rest.split('/');
        if segments.next() != Some(USERS_SEGMENT) {
            return Route::NotFound;
        }
        let id = segments.next();
        if segments.next().is_some() {
            return Route::NotFound;
        }

        match id {
            None => match *method {
                Method::GET => Route::ListUsers,
                Method::POST => Route::CreateUser,
                Method::DELETE => Route::MissingId,
                _ => Route::NotFound,
            },
            Some("") => match *method {
                Method::POST => Route::CreateUser,
                Method::GET | Method::DELETE => Route::MissingId,
                _ => Route::NotFound,
            },
            Some(id) => match *method {
                Method::GET => Route::GetUser(id.to_string()),
                Method::DELETE => Route::DeleteUser(id.to_string()),
                _ => Route::NotFound,
            },
        }
    }
}
