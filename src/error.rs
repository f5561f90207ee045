use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use validator::ValidationErrorsKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, message, errors) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            Error::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            Error::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            Error::Validation(err) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                Some(flatten_validation_errors(&err)),
            ),
            Error::Database(err) => {
                tracing::error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                    None,
                )
            }
            Error::Json(err) => (StatusCode::BAD_REQUEST, err.to_string(), None),
            Error::Reqwest(err) => (
                StatusCode::BAD_GATEWAY,
                format!("External service error: {}", err),
                None,
            ),
            Error::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                    None,
                )
            }
            Error::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
            Error::Anyhow(err) => (StatusCode::BAD_REQUEST, err.to_string(), None),
        };

        let mut body = json!({ "success": false, "message": message });
        if let Some(errors) = errors {
            body["errors"] = json!(errors);
        }
        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}

/// Flattens nested validation errors into "field: message" lines, sorted so
/// the output is stable regardless of hash map iteration order.
fn flatten_validation_errors(errors: &validator::ValidationErrors) -> Vec<String> {
    let mut out = Vec::new();
    collect_validation_errors("", errors, &mut out);
    out.sort();
    out
}

fn collect_validation_errors(prefix: &str, errors: &validator::ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(items) => {
                for item in items {
                    let message = item
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| item.code.to_string());
                    out.push(format!("{}: {}", path, message));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_validation_errors(&path, nested, out),
            ValidationErrorsKind::List(map) => {
                for (index, nested) in map {
                    collect_validation_errors(&format!("{}[{}]", path, index), nested, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 1, message = "title must not be empty"))]
        title: String,
        #[validate(range(min = 1, message = "points must be at least 1"))]
        points: i32,
    }

    #[tokio::test]
    async fn not_found_maps_to_404_with_failure_body() {
        let response = Error::NotFound("Exam not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Exam not found");
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn forbidden_maps_to_403() {
        let response = Error::Forbidden("Only the exam author can do that".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn validation_errors_are_flattened_into_field_messages() {
        let probe = Probe {
            title: String::new(),
            points: 0,
        };
        let err = probe.validate().unwrap_err();

        let response = Error::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Validation failed");

        let errors: Vec<String> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            errors,
            vec![
                "points: points must be at least 1".to_string(),
                "title: title must not be empty".to_string(),
            ]
        );
    }

    #[test]
    fn row_not_found_becomes_not_found() {
        let err = Error::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, Error::NotFound(_)));
    }
}
