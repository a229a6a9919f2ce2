use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use jotter_core::accounts::{DUPLICATE_EMAIL_MESSAGE, UNIQUE_EMAIL_CONSTRAINT};
use jotter_core::categories::{DUPLICATE_NAME_MESSAGE, UNIQUE_NAME_CONSTRAINT};
use jotter_core::error::{CoreError, FieldErrors, NON_FIELD_ERRORS};
use jotter_core::storage::StorageError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses:
/// `{"error", "code"}` plus `"fields"` for per-field validation failures.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `jotter_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Request DTO failed `validator` checks.
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Reading or writing uploaded media failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Malformed or unparsable JSON body.
    #[error("Invalid JSON body: {0}")]
    Json(#[from] JsonRejection),

    /// Malformed query string.
    #[error("Invalid query string: {0}")]
    Query(#[from] QueryRejection),

    /// Path parameter that does not parse as an id.
    #[error("Invalid path: {0}")]
    Path(#[from] PathRejection),

    /// Body is not a readable `multipart/form-data` stream.
    #[error("Invalid multipart body: {0}")]
    Multipart(#[from] MultipartRejection),

    /// A multipart field could not be read.
    #[error("Invalid multipart field: {0}")]
    MultipartField(#[from] MultipartError),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Status, machine-readable code, message, and optional per-field details.
type ErrorParts = (StatusCode, &'static str, String, Option<FieldErrors>);

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, fields) = match self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, .. } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} not found."),
                    None,
                ),
                CoreError::InvalidFields(fields) => validation_failed(fields),
                CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg, None),
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(&err),

            // --- Request errors ---
            AppError::Validation(errors) => validation_failed(errors.into()),
            AppError::Json(rejection) => rejected(rejection.status(), rejection.body_text()),
            AppError::Query(rejection) => rejected(rejection.status(), rejection.body_text()),
            AppError::Multipart(rejection) => rejected(rejection.status(), rejection.body_text()),
            AppError::MultipartField(err) => rejected(err.status(), err.body_text()),
            // An id that cannot exist is reported like a missing row.
            AppError::Path(PathRejection::FailedToDeserializePathParams(_)) => not_found(),
            AppError::Path(rejection) => rejected(rejection.status(), rejection.body_text()),

            // --- Server-side failures ---
            AppError::Storage(err) => {
                tracing::error!(error = %err, "Media storage error");
                internal()
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(fields) = fields {
            body["fields"] = json!(fields);
        }

        (status, axum::Json(body)).into_response()
    }
}

fn validation_failed(fields: FieldErrors) -> ErrorParts {
    (
        StatusCode::BAD_REQUEST,
        "VALIDATION_ERROR",
        "Validation failed".to_string(),
        Some(fields),
    )
}

/// Keep the status an axum rejection chose (400, 413, 415, ...).
fn rejected(status: StatusCode, message: String) -> ErrorParts {
    let code = match status {
        StatusCode::PAYLOAD_TOO_LARGE => "PAYLOAD_TOO_LARGE",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
        s if s.is_server_error() => {
            tracing::error!(error = %message, "Request extraction failed");
            return internal();
        }
        _ => "BAD_REQUEST",
    };
    (status, code, message, None)
}

fn not_found() -> ErrorParts {
    (
        StatusCode::NOT_FOUND,
        "NOT_FOUND",
        "Not found.".to_string(),
        None,
    )
}

fn internal() -> ErrorParts {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
        None,
    )
}

/// Classify a sqlx error into an HTTP response.
///
/// - `RowNotFound` maps to 404.
/// - Unique violations on known constraints map to a 400 on the offending
///   field; other `uq_` constraints map to a 400 non-field error.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> ErrorParts {
    match err {
        sqlx::Error::RowNotFound => not_found(),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let fields = match db_err.constraint() {
                    Some(UNIQUE_NAME_CONSTRAINT) => {
                        Some(FieldErrors::single("name", DUPLICATE_NAME_MESSAGE))
                    }
                    Some(UNIQUE_EMAIL_CONSTRAINT) => {
                        Some(FieldErrors::single("email", DUPLICATE_EMAIL_MESSAGE))
                    }
                    Some(constraint) if constraint.starts_with("uq_") => Some(FieldErrors::single(
                        NON_FIELD_ERRORS,
                        "A record with these values already exists.",
                    )),
                    _ => None,
                };
                if let Some(fields) = fields {
                    return validation_failed(fields);
                }
            }
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}
