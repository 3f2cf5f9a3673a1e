// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    Validation {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    InvalidCredentials,
    Conflict(String),
    UploadRejected(String),

    // 401 Unauthorized
    CredentialMissing(String),

    // 403 Forbidden
    CredentialInvalid(String),
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation { .. } => 400,
            ApiError::InvalidCredentials => 400,
            ApiError::Conflict(_) => 400,
            ApiError::UploadRejected(_) => 400,
            ApiError::CredentialMissing(_) => 401,
            ApiError::CredentialInvalid(_) => 403,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Internal(_) => 500,
        }
    }

    /// Get client-safe error message. Internal details never cross this boundary.
    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation { message, .. } => message,
            ApiError::InvalidCredentials => "Invalid email or password",
            ApiError::Conflict(msg) => msg,
            ApiError::UploadRejected(msg) => msg,
            ApiError::CredentialMissing(msg) => msg,
            ApiError::CredentialInvalid(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Internal(_) => "An internal error occurred",
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::UploadRejected(_) => "UPLOAD_REJECTED",
            ApiError::CredentialMissing(_) => "CREDENTIAL_MISSING",
            ApiError::CredentialInvalid(_) => "CREDENTIAL_INVALID",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to the uniform JSON error envelope
    pub fn to_json(&self) -> Value {
        let mut envelope = json!({
            "success": false,
            "message": self.message(),
            "error_code": self.error_code(),
            "timestamp": chrono::Utc::now(),
        });

        if let ApiError::Validation {
            field_errors: Some(field_errors),
            ..
        } = self
        {
            envelope["details"] = json!(field_errors);
        }

        envelope
    }
}

// Static constructor methods
impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    pub fn validation_fields(
        message: impl Into<String>,
        field_errors: HashMap<String, String>,
    ) -> Self {
        ApiError::Validation {
            message: message.into(),
            field_errors: Some(field_errors),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn upload_rejected(message: impl Into<String>) -> Self {
        ApiError::UploadRejected(message.into())
    }

    pub fn credential_missing(message: impl Into<String>) -> Self {
        ApiError::CredentialMissing(message.into())
    }

    pub fn credential_invalid(message: impl Into<String>) -> Self {
        ApiError::CredentialInvalid(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

// Convert store-level failures into API errors
impl From<crate::store::StoreError> for ApiError {
    fn from(err: crate::store::StoreError) -> Self {
        match err {
            crate::store::StoreError::NotFound(what) => {
                ApiError::not_found(format!("{} not found", what))
            }
            crate::store::StoreError::Conflict(what) => {
                ApiError::conflict(format!("{} already exists", what))
            }
            crate::store::StoreError::Sqlx(sqlx_err) => {
                // Logged once at response conversion; the client sees a generic message
                ApiError::internal(sqlx_err.to_string())
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!("internal error: {}", detail);
        }
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
