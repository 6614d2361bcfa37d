//! Error types for Bookshelf server

use std::collections::BTreeMap;

use axum::{
    extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection},
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("A book with this ISBN already exists")]
    DuplicateIsbn,

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Could not validate credentials")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Inactive user")]
    InactiveUser,

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// Request body, path or query could not be decoded
    #[error("Invalid request {field}: {message}")]
    InvalidRequest { field: String, message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    /// Per-field messages for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, Vec<String>>>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateIsbn | AppError::DuplicateEmail => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) | AppError::InactiveUser => StatusCode::FORBIDDEN,
            AppError::Validation(_) | AppError::InvalidRequest { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NotFound",
            AppError::DuplicateIsbn => "DuplicateIsbn",
            AppError::DuplicateEmail => "DuplicateEmail",
            AppError::InvalidCredentials => "InvalidCredentials",
            AppError::Unauthorized => "Unauthorized",
            AppError::Forbidden(_) => "Forbidden",
            AppError::InactiveUser => "InactiveUser",
            AppError::Validation(_) | AppError::InvalidRequest { .. } => "Validation",
            AppError::Database(_) | AppError::Internal(_) => "Internal",
        }
    }
}

fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

/// Name the offending field when serde reports one, otherwise `fallback`.
fn rejected_field(text: &str, fallback: &str) -> String {
    text.split("field `")
        .nth(1)
        .and_then(|rest| rest.split('`').next())
        .filter(|name| !name.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        AppError::InvalidRequest {
            field: rejected_field(&message, "body"),
            message,
        }
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        let message = rejection.body_text();
        AppError::InvalidRequest {
            field: rejected_field(&message, "body"),
            message,
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidRequest {
            field: "path".to_string(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        let message = rejection.body_text();
        AppError::InvalidRequest {
            field: rejected_field(&message, "query"),
            message,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (message, fields) = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                ("Internal server error".to_string(), None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("Internal server error".to_string(), None)
            }
            AppError::Validation(errors) => {
                ("Invalid input".to_string(), Some(field_messages(errors)))
            }
            AppError::InvalidRequest { field, message } => (
                "Invalid input".to_string(),
                Some(BTreeMap::from([(field.clone(), vec![message.clone()])])),
            ),
            AppError::NotFound(msg) | AppError::Forbidden(msg) => (msg.clone(), None),
            other => (other.to_string(), None),
        };

        let body = Json(ErrorResponse {
            error: self.kind().to_string(),
            message,
            fields,
        });

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
