//! # List Query Parameters
//!
//! Parses the query string of `GET /users` into a bounded page request.

use std::collections::HashMap;

use super::errors::{ApiError, ApiResult};
use crate::store::Cursor;

/// Maximum number of users one page may return
pub const MAX_LIMIT: usize = 1000;

/// Query parameter carrying the page size
pub const LIMIT_PARAM: &str = "limit";

/// Query parameter carrying the continuation token
pub const CURSOR_PARAM: &str = "lastKey";

/// Parsed list parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    /// Page size; `None` means the store default
    pub limit: Option<usize>,

    /// Continuation token from a previous page
    pub cursor: Option<Cursor>,
}

impl ListParams {
    /// Parse list parameters from decoded query pairs.
    ///
    /// Unknown parameters are ignored. Empty values count as absent.
    pub fn parse(params: &HashMap<String, String>) -> ApiResult<Self> {
        let limit = params
            .get(LIMIT_PARAM)
            .filter(|v| !v.is_empty())
            .map(|v| parse_limit(v))
            .transpose()?;

        let cursor = params
            .get(CURSOR_PARAM)
            .filter(|v| !v.is_empty())
            .map(|v| Cursor::parse(v))
            .transpose()?;

        Ok(Self { limit, cursor })
    }
}

/// Parse limit parameter
fn parse_limit(value: &str) -> ApiResult<usize> {
    let limit: usize = value
        .trim()
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid limit: {}", value)))?;

    if limit == 0 {
        return Err(ApiError::bad_request("Limit must be at least 1"));
    }
    if limit > MAX_LIMIT {
        return Err(ApiError::bad_request(format!(
            "Limit {} exceeds maximum {}",
            limit, MAX_LIMIT
        )));
    }
    Ok(limit)
}
