//! API error handling
//!
//! Maps escrow and database errors onto HTTP statuses with a uniform
//! error envelope. Gateway failures are reported as an upstream problem
//! without leaking provider detail to clients.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use studymart_escrow::EscrowError;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// API error
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(Vec<String>),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid OTP")]
    InvalidOtp,

    #[error("OTP expired; the payment has been refunded to the buyer")]
    OtpExpired,

    #[error("Invalid webhook signature")]
    InvalidSignature,

    #[error("Missing x-signature header")]
    MissingSignature,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("Payment gateway unavailable")]
    GatewayUnavailable,

    #[error("Database error")]
    DatabaseError,

    #[error("Internal server error")]
    InternalError,
}

impl ApiError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::InvalidOtp => StatusCode::UNAUTHORIZED,
            Self::OtpExpired => StatusCode::GONE,
            Self::InvalidSignature | Self::MissingSignature => StatusCode::BAD_REQUEST,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Duplicate(_) => StatusCode::CONFLICT,
            Self::GatewayUnavailable => StatusCode::BAD_GATEWAY,
            Self::DatabaseError | Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Uniform error envelope
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,
    /// Human-readable error message
    pub error: String,
    /// Individual violations for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        let details = match err {
            ApiError::Validation(violations) => Some(violations.clone()),
            _ => None,
        };
        Self {
            success: false,
            error: err.to_string(),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::from(&self);
        (status, Json(body)).into_response()
    }
}

impl From<EscrowError> for ApiError {
    fn from(err: EscrowError) -> Self {
        match err {
            EscrowError::Validation(violations) => Self::Validation(violations),
            EscrowError::NotFound(what) => Self::NotFound(what),
            EscrowError::StateConflict { .. } => Self::Conflict(err.to_string()),
            EscrowError::InvalidOtp => Self::InvalidOtp,
            EscrowError::OtpExpired => Self::OtpExpired,
            EscrowError::InvalidSignature => Self::InvalidSignature,
            EscrowError::MalformedEvent(msg) => Self::BadRequest(msg),
            EscrowError::Gateway(e) => {
                tracing::error!(error = %e, "Gateway error");
                Self::GatewayUnavailable
            }
            EscrowError::Store(msg) => {
                tracing::error!(error = %msg, "Store error");
                Self::DatabaseError
            }
        }
    }
}

impl From<studymart_db::DbError> for ApiError {
    fn from(err: studymart_db::DbError) -> Self {
        match err {
            studymart_db::DbError::NotFound(msg) => Self::NotFound(msg),
            studymart_db::DbError::Duplicate(msg) => Self::Duplicate(msg),
            other => {
                tracing::error!(error = ?other, "Database error");
                Self::DatabaseError
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    format!(
                        "{}: {}",
                        field,
                        e.message.as_ref().map(|m| m.as_ref()).unwrap_or("invalid")
                    )
                })
            })
            .collect();
        Self::Validation(messages)
    }
}
