//! API handler - the request entry point
//!
//! Every invocation flows through [`UserHandler::handle`]:
//! route, validate, one store call, envelope. Errors and panics are
//! caught here and nowhere else.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::http::StatusCode;
use futures_util::FutureExt;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use super::errors::{ApiError, ApiResult};
use super::params::ListParams;
use super::request::Request;
use super::response::{Envelope, UserListResponse};
use super::router::{Route, Router};
use crate::config::AppConfig;
use crate::store::{FileTable, MemoryTable, Table, UserStore};
use crate::user::CreateUser;
use crate::validation::validate_user;

/// Stateless request handler over an injected [`UserStore`].
///
/// Built once at startup and shared by every request.
#[derive(Debug, Clone)]
pub struct UserHandler {
    store: UserStore,
    router: Router,
}

impl UserHandler {
    pub fn new(store: UserStore) -> Self {
        Self::with_router(store, Router::default())
    }

    pub fn with_router(store: UserStore, router: Router) -> Self {
        Self { store, router }
    }

    /// Build the handler a configuration describes: a file-backed table
    /// when `data_dir` is set, otherwise an in-memory one.
    pub fn from_config(config: &AppConfig) -> Self {
        let table: Arc<dyn Table> = match &config.data_dir {
            Some(dir) => {
                info!(data_dir = %dir.display(), "Using file-backed table");
                Arc::new(FileTable::new(dir))
            }
            None => {
                info!("Using in-memory table");
                Arc::new(MemoryTable::new())
            }
        };
        let store = UserStore::new(table, config.table_name.clone());
        Self::with_router(store, Router::new(config.base_path.clone()))
    }

    pub fn store(&self) -> &UserStore {
        &self.store
    }

    /// Handle one request. Never fails: every outcome is an envelope.
    pub async fn handle(&self, request: Request) -> Envelope {
        let method = request.method.clone();
        let path = request.path.clone();
        debug!(%method, %path, "Handling request");

        let outcome = AssertUnwindSafe(self.dispatch(request)).catch_unwind().await;
        let result = match outcome {
            Ok(result) => result,
            Err(panic) => Err(ApiError::Panic(panic_message(&*panic))),
        };

        match result {
            Ok(envelope) => envelope,
            Err(err) => {
                if err.is_server_error() {
                    error!(%method, %path, error = %err, "Request failed");
                } else {
                    debug!(%method, %path, error = %err, "Request rejected");
                }
                err.into_envelope()
            }
        }
    }

    async fn dispatch(&self, request: Request) -> ApiResult<Envelope> {
        match self.router.route(&request.method, &request.path) {
            Route::ListUsers => self.list_users(&request).await,
            Route::GetUser(id) => self.get_user(&id).await,
            Route::CreateUser => self.create_user(&request).await,
            Route::DeleteUser(id) => self.delete_user(&id).await,
            Route::Preflight => Ok(Envelope::json(StatusCode::OK, &json!({}))),
            Route::MissingId => Err(ApiError::bad_request("User id is required")),
            Route::NotFound => Err(ApiError::not_found("Not Found")),
        }
    }

    async fn list_users(&self, request: &Request) -> ApiResult<Envelope> {
        let params = ListParams::parse(&request.query)?;
        let page = self.store.list(params.limit, params.cursor.as_ref()).await?;
        Ok(Envelope::json(StatusCode::OK, &UserListResponse::from(page)))
    }

    async fn get_user(&self, user_id: &str) -> ApiResult<Envelope> {
        match self.store.get_by_id(user_id).await? {
            Some(user) => Ok(Envelope::json(StatusCode::OK, &user)),
            None => Err(ApiError::not_found("User not found")),
        }
    }

    async fn create_user(&self, request: &Request) -> ApiResult<Envelope> {
        let payload = parse_body(request)?;

        let validation = validate_user(&payload);
        if !validation.is_valid {
            return Err(ApiError::Validation(validation.errors));
        }

        let input: CreateUser = serde_json::from_value(payload)
            .map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))?;
        let user = self.store.create(&input.name, &input.email).await?;
        info!(user_id = %user.user_id, "User created");

        Ok(Envelope::json(StatusCode::CREATED, &user))
    }

    async fn delete_user(&self, user_id: &str) -> ApiResult<Envelope> {
        self.store.delete_by_id(user_id).await?;
        info!(user_id = %user_id, "User deleted");
        Ok(Envelope::empty(StatusCode::NO_CONTENT))
    }
}

/// Decode the JSON body; an absent or blank body reads as `{}`
fn parse_body(request: &Request) -> ApiResult<Value> {
    match request.body.as_deref() {
        Some(bytes) if !bytes.iter().all(u8::is_ascii_whitespace) => serde_json::from_slice(bytes)
            .map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e))),
        _ => Ok(json!({})),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTable;
    use axum::http::Method;

    fn handler() -> UserHandler {
        UserHandler::new(UserStore::new(Arc::new(MemoryTable::new()), "users"))
    }

    fn body(envelope: &Envelope) -> Value {
        serde_json::from_str(envelope.body()).unwrap()
    }

    #[tokio::test]
    async fn test_preflight() {
        let envelope = handler().handle(Request::new(Method::OPTIONS, "/users")).await;
        assert_eq!(envelope.status(), StatusCode::OK);
        assert_eq!(envelope.body(), "{}");
    }

    #[tokio::test]
    async fn test_create_returns_created_user() {
        let request = Request::new(Method::POST, "/users")
            .with_json(&json!({"name": "Ada", "email": "ada@example.com"}));
        let envelope = handler().handle(request).await;

        assert_eq!(envelope.status(), StatusCode::CREATED);
        let user = body(&envelope);
        assert!(!user["userId"].as_str().unwrap().is_empty());
        assert_eq!(user["name"], "Ada");
        assert_eq!(user["email"], "ada@example.com");
    }

    #[tokio::test]
    async fn test_create_without_body_is_validation_error() {
        let envelope = handler().handle(Request::new(Method::POST, "/users")).await;
        assert_eq!(envelope.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body(&envelope)["errors"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_with_malformed_json() {
        let request = Request::new(Method::POST, "/users").with_body("{\"name\":");
        let envelope = handler().handle(request).await;
        assert_eq!(envelope.status(), StatusCode::BAD_REQUEST);
        assert!(body(&envelope)["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let envelope = handler().handle(Request::new(Method::GET, "/users/nope")).await;
        assert_eq!(envelope.status(), StatusCode::NOT_FOUND);
        assert_eq!(body(&envelope)["message"], "User not found");
    }

    #[tokio::test]
    async fn test_missing_id() {
        let envelope = handler().handle(Request::new(Method::DELETE, "/users/")).await;
        assert_eq!(envelope.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body(&envelope)["message"], "User id is required");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let envelope = handler().handle(Request::new(Method::PATCH, "/users")).await;
        assert_eq!(envelope.status(), StatusCode::NOT_FOUND);
        assert_eq!(body(&envelope)["message"], "Not Found");
    }

    #[tokio::test]
    async fn test_list_rejects_bad_limit() {
        let request = Request::new(Method::GET, "/users").with_query("limit", "lots");
        let envelope = handler().handle(request).await;
        assert_eq!(envelope.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_from_config_uses_base_path() {
        let config = AppConfig {
            base_path: "/prod".to_string(),
            ..Default::default()
        };
        let handler = UserHandler::from_config(&config);
        assert_eq!(handler.store().table_name(), "users");

        let envelope = handler.handle(Request::new(Method::GET, "/prod/users")).await;
        assert_eq!(envelope.status(), StatusCode::OK);
        let envelope = handler.handle(Request::new(Method::GET, "/users")).await;
        assert_eq!(envelope.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
        let boxed: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}
