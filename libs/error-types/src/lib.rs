//! Shared API envelope and stable error codes
//!
//! Every HTTP response in the platform uses the same JSON shape:
//! `{ "success": bool, "data": ..., "message": ... }`. Services attach
//! one of the `error_codes` constants when a client needs to branch on
//! the failure programmatically.

use serde::{Deserialize, Serialize};

/// Stable, machine-readable error codes shared across services
pub mod error_codes {
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
    pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub const AUTHORIZATION_ERROR: &str = "AUTHORIZATION_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
}

/// Uniform JSON envelope for all API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            code: None,
        }
    }

    pub fn err(message: impl Into<String>, code: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            code: Some(code.to_string()),
        }
    }
}
