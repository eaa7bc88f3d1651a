use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};

/// Application error, translated into an HTTP response at the boundary.
///
/// Credential failures (bad login, wrong current password, dead reset token)
/// deliberately map to 400 with a low-detail message; 401 is reserved for
/// requests that lack a valid session on a protected route.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or malformed input, keyed by field name.
    #[error("validation failed")]
    Validation(Map<String, Value>),
    /// Uniqueness conflict on the named field.
    #[error("{message}")]
    Conflict { field: &'static str, message: String },
    /// Bad credentials or a consumed/expired reset token.
    #[error("{0}")]
    Auth(String),
    /// No valid session on a protected route.
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    /// A collaborating service (mail delivery) failed.
    #[error("dependency failure")]
    Dependency(anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn conflict(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Conflict {
            field,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            AppError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                Some(fields),
            ),
            AppError::Conflict { field, message } => {
                let mut fields = Map::new();
                fields.insert(field.to_string(), Value::String(message.clone()));
                (StatusCode::BAD_REQUEST, message, Some(fields))
            }
            AppError::Auth(message) => (StatusCode::BAD_REQUEST, message, None),
            AppError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message, None),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message, None),
            AppError::Dependency(err) => {
                tracing::error!("Dependency failure: {:?}", err);
                (
                    StatusCode::BAD_GATEWAY,
                    "Email could not be sent, please try again later".to_string(),
                    None,
                )
            }
            AppError::Internal(err) => {
                tracing::error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let mut body = json!({ "message": message });
        if let Some(fields) = errors {
            body["errors"] = Value::Object(fields);
        }

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            _ => AppError::Internal(err.into()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = Map::new();
        for (field, errs) in errors.field_errors() {
            let Some(first) = errs.first() else { continue };
            let message = first
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| first.code.to_string());
            fields.insert(field.to_string(), Value::String(message));
        }
        AppError::Validation(fields)
    }
}
